//! Merging a taxonomy clause into an existing predicate tree.
//!
//! Other code (the host framework, other filters, site customisations) may
//! already have placed taxonomy restrictions on the query. The merger adds
//! the filter's clause without disturbing them, using one of two strategies:
//!
//! - **Nested**: the clause goes into its own named group, merged by key
//!   into the tree. Re-applying the filter updates that group in place.
//! - **Flat**: the clause is appended to the top-level list unless an
//!   identical clause is already there. Placeholder entries are dropped.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::defaults;
use crate::predicate::{
    is_reserved_key, PredicateGroup, PredicateNode, PredicateTree, TaxonomyClause,
};

// =============================================================================
// MERGE CONFIGURATION
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    Nested,
    Flat,
}

impl MergeStrategy {
    pub fn from_nested(nested: bool) -> Self {
        if nested {
            MergeStrategy::Nested
        } else {
            MergeStrategy::Flat
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MergeStrategy::Nested => "nested",
            MergeStrategy::Flat => "flat",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeConfig {
    pub strategy: MergeStrategy,
    /// Relation to set; `None` leaves relations untouched.
    pub relation: Option<String>,
    /// Key of the group written by the nested strategy.
    pub group_key: String,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            strategy: MergeStrategy::from_nested(defaults::NESTED_MERGE),
            relation: Some(defaults::RELATION.to_string()),
            group_key: defaults::GROUP_KEY.to_string(),
        }
    }
}

impl MergeConfig {
    pub fn nested(group_key: impl Into<String>) -> Self {
        Self {
            strategy: MergeStrategy::Nested,
            group_key: group_key.into(),
            ..Self::default()
        }
    }

    pub fn flat() -> Self {
        Self {
            strategy: MergeStrategy::Flat,
            ..Self::default()
        }
    }

    /// Set the relation; an empty string counts as no relation.
    pub fn with_relation(mut self, relation: Option<String>) -> Self {
        self.relation = relation.filter(|r| !r.is_empty());
        self
    }
}

// =============================================================================
// MERGER
// =============================================================================

/// Merges filter clauses into predicate trees. Never fails.
#[derive(Debug, Clone, Default)]
pub struct PredicateMerger {
    config: MergeConfig,
}

impl PredicateMerger {
    pub fn new(config: MergeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    pub fn merge(&self, existing: PredicateTree, clause: TaxonomyClause) -> PredicateTree {
        tracing::debug!(
            subsystem = "core",
            component = "predicate_merger",
            op = "merge",
            strategy = self.config.strategy.as_str(),
            group_key = %self.config.group_key,
            taxonomy = %clause.taxonomy,
            value_count = clause.terms.len(),
            relation = self.config.relation.as_deref().unwrap_or(""),
            "Merging taxonomy clause"
        );

        match self.config.strategy {
            MergeStrategy::Nested => self.merge_nested(existing, clause),
            MergeStrategy::Flat => self.merge_flat(existing, clause),
        }
    }

    fn merge_nested(&self, mut tree: PredicateTree, clause: TaxonomyClause) -> PredicateTree {
        let key = self.group_key();
        let incoming =
            PredicateNode::Group(PredicateGroup::keyed(key, vec![PredicateNode::Leaf(clause)]));

        let slot = match tree.entries.iter().position(|e| e.key() == Some(key)) {
            Some(i) => {
                replace_recursive(&mut tree.entries[i], incoming);
                i
            }
            None => {
                tree.entries.push(incoming);
                tree.entries.len() - 1
            }
        };

        if let (Some(relation), PredicateNode::Group(group)) =
            (&self.config.relation, &mut tree.entries[slot])
        {
            group.relation = Some(relation.clone());
        }
        tree
    }

    /// The configured group key, or the default when the configured one
    /// would serialise as a positional entry or the relation.
    fn group_key(&self) -> &str {
        let key = self.config.group_key.as_str();
        if is_reserved_key(key) {
            tracing::warn!(
                subsystem = "core",
                component = "predicate_merger",
                group_key = %key,
                "Group key collides with positional or relation keys, using default"
            );
            return defaults::GROUP_KEY;
        }
        key
    }

    fn merge_flat(&self, existing: PredicateTree, clause: TaxonomyClause) -> PredicateTree {
        let mut present = false;
        let mut entries = Vec::with_capacity(existing.entries.len() + 1);

        for entry in existing.entries {
            if entry.is_empty_marker() {
                continue;
            }
            if entry.as_leaf().is_some_and(|leaf| leaf.matches(&clause)) {
                present = true;
            }
            entries.push(entry);
        }

        if present {
            tracing::debug!(
                subsystem = "core",
                component = "predicate_merger",
                taxonomy = %clause.taxonomy,
                "Identical clause already present, not appending"
            );
        } else {
            entries.push(PredicateNode::Leaf(clause));
        }

        PredicateTree {
            relation: self.config.relation.clone().or(existing.relation),
            entries,
        }
    }
}

/// Merge `right` into `left`, right side winning on conflicts.
///
/// Groups merge child by child: keyed children by key, positional children
/// by position among positional children. Clauses merge attribute by
/// attribute, with the term list overwritten position by position. Any other
/// pairing is replaced outright.
fn replace_recursive(left: &mut PredicateNode, right: PredicateNode) {
    match (left, right) {
        (PredicateNode::Group(l), PredicateNode::Group(r)) => {
            if r.relation.is_some() {
                l.relation = r.relation;
            }
            let mut position = 0usize;
            for child in r.children {
                let target = match child.key() {
                    Some(key) => l.children.iter().position(|c| c.key() == Some(key)),
                    None => {
                        let nth = position;
                        position += 1;
                        l.children
                            .iter()
                            .enumerate()
                            .filter(|(_, c)| c.key().is_none())
                            .nth(nth)
                            .map(|(i, _)| i)
                    }
                };
                match target {
                    Some(i) => replace_recursive(&mut l.children[i], child),
                    None => l.children.push(child),
                }
            }
        }
        (PredicateNode::Leaf(l), PredicateNode::Leaf(r)) => {
            l.taxonomy = r.taxonomy;
            if r.operator.is_some() {
                l.operator = r.operator;
            }
            for (i, term) in r.terms.into_iter().enumerate() {
                match l.terms.get_mut(i) {
                    Some(slot) => *slot = term,
                    None => l.terms.push(term),
                }
            }
            for (name, value) in r.extra {
                match l.extra.get_mut(&name) {
                    Some(existing) => replace_recursive_value(existing, value),
                    None => {
                        l.extra.insert(name, value);
                    }
                }
            }
        }
        (left, right) => *left = right,
    }
}

fn replace_recursive_value(left: &mut Value, right: Value) {
    match (left, right) {
        (Value::Object(l), Value::Object(r)) => {
            for (name, value) in r {
                match l.get_mut(&name) {
                    Some(existing) => replace_recursive_value(existing, value),
                    None => {
                        l.insert(name, value);
                    }
                }
            }
        }
        (Value::Array(l), Value::Array(r)) => {
            for (i, value) in r.into_iter().enumerate() {
                match l.get_mut(i) {
                    Some(existing) => replace_recursive_value(existing, value),
                    None => l.push(value),
                }
            }
        }
        (left, right) => *left = right,
    }
}
