//! Pre-order flattening of a term tree into display rows.
//!
//! The selection widget renders a collapsible, indented list. Each row is
//! emitted right after its parent and before the parent's next sibling, and
//! carries a class string the front end uses to wire up expand/collapse:
//!
//! ```text
//! tribe-parent-cat tribe-events-category-jazz parent-1 has-child closed
//! tribe-child-cat tribe-events-category-jazz-live child-1
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::hooks::{identity_class_hook, CategoryClassHook};
use crate::markup::escape_html;
use crate::term::{Term, TermId};
use crate::tree::TermTree;

// =============================================================================
// DISPLAY ROW
// =============================================================================

/// Extra data attached to a display row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowData {
    pub slug: String,
}

/// One display-ready row of the selection widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlattenedRow {
    pub name: String,
    /// Indentation level.
    pub depth: u32,
    /// Term id submitted when the row is selected.
    pub value: TermId,
    pub data: RowData,
    pub class: String,
}

// =============================================================================
// FLATTENER
// =============================================================================

/// Walks a [`TermTree`] from its roots and emits one row per reachable term.
#[derive(Clone)]
pub struct Flattener {
    class_hook: CategoryClassHook,
}

impl Default for Flattener {
    fn default() -> Self {
        Self {
            class_hook: identity_class_hook(),
        }
    }
}

impl std::fmt::Debug for Flattener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Flattener").finish_non_exhaustive()
    }
}

/// Depth class before the class hook runs.
///
/// Depth 1 always yields the child class; every deeper level yields the
/// grandchild class annotated with its depth.
pub fn depth_class(depth: u32) -> String {
    match depth {
        0 => defaults::PARENT_CLASS.to_string(),
        1 => defaults::CHILD_CLASS.to_string(),
        n => format!("tribe-grandchild-cat tribe-depth-{n} "),
    }
}

/// Parent/child markers for a term, e.g. `" parent-4 child-1"`.
fn relation_markers(term: &Term) -> String {
    match (term.is_root(), term.has_children()) {
        (true, true) => format!(" parent-{}", term.id),
        (true, false) => String::new(),
        (false, true) => format!(" parent-{} child-{}", term.id, term.parent),
        (false, false) => format!(" child-{}", term.parent),
    }
}

impl Flattener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `hook` to transform each row's depth class.
    pub fn with_class_hook(mut self, hook: CategoryClassHook) -> Self {
        self.class_hook = hook;
        self
    }

    /// Flatten every root of `tree` and its descendants, in pre-order.
    pub fn flatten(&self, tree: &TermTree) -> Vec<FlattenedRow> {
        let mut rows = Vec::with_capacity(tree.len());
        let mut emitted = HashSet::new();

        for root in tree.roots() {
            self.push_subtree(tree, root, &mut rows, &mut emitted);
        }

        tracing::debug!(
            subsystem = "core",
            component = "flattener",
            op = "flatten",
            term_count = tree.len(),
            row_count = rows.len(),
            "Flattened term tree"
        );
        rows
    }

    /// Build the class string of a single row.
    pub fn row_class(&self, term: &Term) -> String {
        let depth_class = (self.class_hook)(depth_class(term.depth), term.depth);
        let mut class = escape_html(&depth_class);
        class.push_str(defaults::SLUG_CLASS_PREFIX);
        class.push_str(&term.slug);
        class.push_str(&relation_markers(term));
        if term.has_children() {
            class.push_str(defaults::HAS_CHILD_CLASS);
        }
        class
    }

    fn push_subtree(
        &self,
        tree: &TermTree,
        term: &Term,
        rows: &mut Vec<FlattenedRow>,
        emitted: &mut HashSet<TermId>,
    ) {
        if !emitted.insert(term.id) {
            return;
        }

        tracing::trace!(
            subsystem = "core",
            component = "flattener",
            term_id = term.id,
            depth = term.depth,
            "Emitting row"
        );
        rows.push(FlattenedRow {
            name: term.name.clone(),
            depth: term.depth,
            value: term.id,
            data: RowData {
                slug: term.slug.clone(),
            },
            class: self.row_class(term),
        });

        for child in tree.children(term) {
            self.push_subtree(tree, child, rows, emitted);
        }
    }
}
