//! Taxonomy term value types and term query arguments.

use serde::{Deserialize, Serialize};

use crate::defaults;

/// Identifier of a term, unique within its taxonomy.
pub type TermId = u64;

/// Parent id marking a root term.
pub const ROOT_PARENT: TermId = 0;

// =============================================================================
// TERM
// =============================================================================

/// One entry of a single-parent hierarchical taxonomy.
///
/// `depth` and `children` are computed by [`crate::tree::TreeBuilder`];
/// terms read from a repository arrive with both at their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub id: TermId,
    pub name: String,
    pub slug: String,

    /// Parent term id, `0` for a root.
    #[serde(default)]
    pub parent: TermId,

    /// Taxonomy the term belongs to.
    #[serde(default)]
    pub taxonomy: String,

    /// Number of objects tagged with the term.
    #[serde(default)]
    pub count: u64,

    /// Distance from the nearest root ancestor (root = 0).
    #[serde(default)]
    pub depth: u32,

    /// Direct children in source order, resolved through the owning tree.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TermId>,
}

impl Term {
    /// Create a term with no computed depth or children.
    pub fn new(
        id: TermId,
        name: impl Into<String>,
        slug: impl Into<String>,
        parent: TermId,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            slug: slug.into(),
            parent,
            taxonomy: String::new(),
            count: 0,
            depth: 0,
            children: Vec::new(),
        }
    }

    /// Set the taxonomy.
    pub fn in_taxonomy(mut self, taxonomy: impl Into<String>) -> Self {
        self.taxonomy = taxonomy.into();
        self
    }

    /// Set the tagged object count.
    pub fn with_count(mut self, count: u64) -> Self {
        self.count = count;
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent == ROOT_PARENT
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

// =============================================================================
// TERM QUERY ARGUMENTS
// =============================================================================

/// Arguments for fetching the full term list of a taxonomy.
///
/// The filter controller builds these from its configuration and passes them
/// through the `term_query_args` hook before handing them to the repository.
/// Repositories return terms ordered by name, ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermQueryArgs {
    pub taxonomy: String,

    /// Maximum number of terms returned. `None` = no limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,

    /// Exclude terms with no tagged objects.
    #[serde(default = "default_hide_empty")]
    pub hide_empty: bool,
}

fn default_hide_empty() -> bool {
    defaults::HIDE_EMPTY
}

impl TermQueryArgs {
    /// Arguments for `taxonomy` with the default limit and emptiness rule.
    pub fn new(taxonomy: impl Into<String>) -> Self {
        Self {
            taxonomy: taxonomy.into(),
            limit: Some(defaults::TERM_LIMIT),
            hide_empty: defaults::HIDE_EMPTY,
        }
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_hide_empty(mut self, hide_empty: bool) -> Self {
        self.hide_empty = hide_empty;
        self
    }
}
