//! Tree reconstruction from a flat term list.
//!
//! A taxonomy arrives as a flat, name-ordered list where each term names its
//! parent. [`TreeBuilder`] computes every term's depth by walking parent
//! links and records each term as a child of its parent, producing a
//! [`TermTree`] that keeps the source order of the input.
//!
//! # Depth walk
//!
//! Depth is the number of parent links followed until a root is reached.
//! Parents are looked up in the fetched set first and then through a
//! [`ParentResolver`], so a term whose ancestor was filtered out upstream
//! still gets its real depth. The walk stops early, without error, when:
//!
//! - a parent cannot be resolved (the level reached so far is the depth),
//! - a parent was already visited during this walk (cyclic parent graph),
//! - the configured maximum depth is reached.
//!
//! Depths of terms whose walk ended cleanly are memoised, so a subtree's
//! depths are computed in amortised O(n).

use std::collections::{HashMap, HashSet};

use crate::defaults;
use crate::term::{Term, TermId, ROOT_PARENT};
use crate::traits::{NoParentResolver, ParentResolver};

// =============================================================================
// TERM TREE
// =============================================================================

/// Terms indexed by id, in source order, with depths and children computed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermTree {
    terms: Vec<Term>,
    index: HashMap<TermId, usize>,
}

impl TermTree {
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn contains(&self, id: TermId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: TermId) -> Option<&Term> {
        self.index.get(&id).map(|&i| &self.terms[i])
    }

    /// All terms in source order, including ones not placed in the hierarchy.
    pub fn iter(&self) -> impl Iterator<Item = &Term> {
        self.terms.iter()
    }

    /// Root terms (`parent == 0`) in source order.
    pub fn roots(&self) -> impl Iterator<Item = &Term> {
        self.terms.iter().filter(|t| t.is_root())
    }

    /// Direct children of `term`, in source order.
    pub fn children<'a>(&'a self, term: &'a Term) -> impl Iterator<Item = &'a Term> + 'a {
        term.children.iter().filter_map(move |id| self.get(*id))
    }

    /// Terms whose non-zero parent is absent from the tree. They keep their
    /// depth but cannot be placed under a parent.
    pub fn detached(&self) -> impl Iterator<Item = &Term> {
        self.terms
            .iter()
            .filter(|t| !t.is_root() && !self.contains(t.parent))
    }

    /// Consume the tree, returning the terms in source order.
    pub fn into_terms(self) -> Vec<Term> {
        self.terms
    }

    fn get_mut(&mut self, id: TermId) -> Option<&mut Term> {
        match self.index.get(&id) {
            Some(&i) => self.terms.get_mut(i),
            None => None,
        }
    }

    /// Insert a term, replacing an earlier term with the same id in place.
    fn upsert(&mut self, term: Term) {
        match self.index.get(&term.id) {
            Some(&i) => self.terms[i] = term,
            None => {
                self.index.insert(term.id, self.terms.len());
                self.terms.push(term);
            }
        }
    }
}

// =============================================================================
// TREE BUILDER
// =============================================================================

/// Builds a [`TermTree`] from a flat term list.
///
/// # Example
///
/// ```
/// use facetbar_core::{Term, TreeBuilder};
///
/// let tree = TreeBuilder::new().build(vec![
///     Term::new(1, "Jazz", "jazz", 0),
///     Term::new(2, "Jazz:Live", "jazz-live", 1),
///     Term::new(3, "Rock", "rock", 0),
/// ]);
///
/// assert_eq!(tree.get(2).map(|t| t.depth), Some(1));
/// assert_eq!(tree.get(1).map(|t| t.children.clone()), Some(vec![2]));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TreeBuilder {
    max_depth: u32,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self {
            max_depth: defaults::MAX_TERM_DEPTH,
        }
    }
}

/// Outcome of one depth walk.
#[derive(Debug, Clone, Copy)]
struct Walk {
    depth: u32,
    /// Ended at a root or an unresolvable link (safe to memoise).
    clean: bool,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of parent links followed per term.
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Build a tree resolving parents only within `terms`.
    pub fn build(&self, terms: impl IntoIterator<Item = Term>) -> TermTree {
        self.build_with_resolver(terms, &NoParentResolver)
    }

    /// Build a tree, resolving parents missing from `terms` through `resolver`.
    pub fn build_with_resolver<P: ParentResolver + ?Sized>(
        &self,
        terms: impl IntoIterator<Item = Term>,
        resolver: &P,
    ) -> TermTree {
        let mut tree = TermTree::default();
        for mut term in terms {
            term.depth = 0;
            term.children.clear();
            tree.upsert(term);
        }

        let mut memo: HashMap<TermId, u32> = tree
            .roots()
            .map(|t| (t.id, 0))
            .collect();

        let order: Vec<(TermId, TermId)> = tree.terms.iter().map(|t| (t.id, t.parent)).collect();
        for (id, parent) in order {
            if parent == ROOT_PARENT {
                continue;
            }

            let walk = self.walk_depth(&tree, id, parent, &memo, resolver);
            if walk.clean {
                memo.insert(id, walk.depth);
            }
            tracing::trace!(
                subsystem = "core",
                component = "tree_builder",
                op = "depth",
                term_id = id,
                parent_id = parent,
                depth = walk.depth,
                "Computed term depth"
            );

            if let Some(term) = tree.get_mut(id) {
                term.depth = walk.depth;
            }

            // A self-parented term would become its own child.
            if parent == id {
                continue;
            }
            if let Some(parent_term) = tree.get_mut(parent) {
                parent_term.children.push(id);
            }
        }

        tracing::debug!(
            subsystem = "core",
            component = "tree_builder",
            op = "build",
            term_count = tree.len(),
            "Built term tree"
        );
        tree
    }

    fn walk_depth<P: ParentResolver + ?Sized>(
        &self,
        tree: &TermTree,
        id: TermId,
        parent: TermId,
        memo: &HashMap<TermId, u32>,
        resolver: &P,
    ) -> Walk {
        let mut visited = HashSet::from([id]);
        let mut level = 0u32;
        let mut next = parent;

        loop {
            if next == ROOT_PARENT {
                return Walk {
                    depth: level,
                    clean: true,
                };
            }
            if level >= self.max_depth {
                tracing::warn!(
                    subsystem = "core",
                    component = "tree_builder",
                    term_id = id,
                    depth = level,
                    "Term depth bound reached, truncating walk"
                );
                return Walk {
                    depth: level,
                    clean: false,
                };
            }

            level += 1;
            if !visited.insert(next) {
                tracing::warn!(
                    subsystem = "core",
                    component = "tree_builder",
                    term_id = id,
                    parent_id = next,
                    "Cyclic parent chain, truncating walk"
                );
                return Walk {
                    depth: level,
                    clean: false,
                };
            }

            if let Some(&known) = memo.get(&next) {
                let depth = level.saturating_add(known);
                return if depth > self.max_depth {
                    Walk {
                        depth: self.max_depth,
                        clean: false,
                    }
                } else {
                    Walk { depth, clean: true }
                };
            }

            let resolved = match tree.get(next) {
                Some(term) => Some(term.parent),
                None => resolver.resolve_parent(next).map(|t| t.parent),
            };
            match resolved {
                Some(grandparent) => next = grandparent,
                None => {
                    return Walk {
                        depth: level,
                        clean: true,
                    }
                }
            }
        }
    }
}
