//! # facetbar-core
//!
//! Hierarchical taxonomy facet filter.
//!
//! Given the flat term list of a single-parent taxonomy, this crate
//! reconstructs the hierarchy, flattens it into indented display rows for a
//! selection widget, and turns a user's selection into a taxonomy clause
//! merged into the predicate tree of a query under construction.
//!
//! ```
//! use facetbar_core::{Flattener, Term, TreeBuilder};
//!
//! let tree = TreeBuilder::new().build(vec![
//!     Term::new(1, "Jazz", "jazz", 0),
//!     Term::new(2, "Jazz:Live", "jazz-live", 1),
//!     Term::new(3, "Rock", "rock", 0),
//! ]);
//! let rows = Flattener::new().flatten(&tree);
//!
//! let order: Vec<u64> = rows.iter().map(|r| r.value).collect();
//! assert_eq!(order, vec![1, 2, 3]);
//! ```

pub mod config;
pub mod controller;
pub mod defaults;
pub mod error;
pub mod flatten;
pub mod hooks;
pub mod logging;
pub mod markup;
pub mod merge;
pub mod predicate;
pub mod query;
pub mod selection;
pub mod term;
pub mod traits;
pub mod tree;

// Re-export commonly used types at crate root
pub use config::{FilterConfig, FilterType};
pub use controller::{FilterController, FilterState};
pub use error::{Error, Result};
pub use flatten::{depth_class, FlattenedRow, Flattener, RowData};
pub use hooks::FilterHooks;
pub use markup::AdminForm;
pub use merge::{MergeConfig, MergeStrategy, PredicateMerger};
pub use predicate::{
    ClauseOperator, PredicateGroup, PredicateNode, PredicateTree, TaxonomyClause, TermRef,
};
pub use query::Query;
pub use selection::Selection;
pub use term::{Term, TermId, TermQueryArgs, ROOT_PARENT};
pub use traits::{
    Capability, FilterCapabilities, NoParentResolver, ParentResolver, RepositoryParentResolver,
    TermRepository,
};
pub use tree::{TermTree, TreeBuilder};
