//! The part of a query under construction that the filter reads and writes.

use serde::{Deserialize, Serialize};

use crate::predicate::PredicateTree;

/// Query state handed to the filter by the host framework.
///
/// The filter takes it by value and returns it, so no query state is shared
/// between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Content type the query selects.
    #[serde(default, alias = "post_type")]
    pub subject_type: String,

    /// Taxonomy restrictions.
    #[serde(default, alias = "tax_query")]
    pub predicates: PredicateTree,

    /// Results depend on per-request input and must not be served from or
    /// written to a result cache.
    #[serde(default, alias = "tribe_suppress_transient")]
    pub bypass_cache: bool,
}

impl Query {
    pub fn new(subject_type: impl Into<String>) -> Self {
        Self {
            subject_type: subject_type.into(),
            ..Self::default()
        }
    }

    pub fn with_predicates(mut self, predicates: PredicateTree) -> Self {
        self.predicates = predicates;
        self
    }
}
