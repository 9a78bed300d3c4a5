//! Structured logging schema and field name constants for facetbar.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation can query by the same names whichever component
//! emitted the event.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | WARN  | Recoverable issue, fallback applied (repository error, cycle truncated) |
//! | INFO  | Lifecycle events (CLI start, file loaded) |
//! | DEBUG | Decision points (merge strategy, no-op reasons, selection bound) |
//! | TRACE | Per-term iteration (depth walks, emitted rows) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "core", "store", "cli"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "tree_builder", "flattener", "predicate_merger", "controller"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "build", "flatten", "merge", "apply_to_query"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Taxonomy slug being filtered.
pub const TAXONOMY: &str = "taxonomy";

/// Term id being operated on.
pub const TERM_ID: &str = "term_id";

/// Parent term id referenced by a term.
pub const PARENT_ID: &str = "parent_id";

/// Subject (content) type of the query under construction.
pub const SUBJECT_TYPE: &str = "subject_type";

/// Group key used by nested merges.
pub const GROUP_KEY: &str = "group_key";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Number of terms fetched or built.
pub const TERM_COUNT: &str = "term_count";

/// Number of flattened display rows.
pub const ROW_COUNT: &str = "row_count";

/// Number of term ids in a merged predicate.
pub const VALUE_COUNT: &str = "value_count";

/// Computed term depth.
pub const DEPTH: &str = "depth";

// ─── Decision fields ───────────────────────────────────────────────────────

/// Merge strategy used ("nested", "flat").
pub const STRATEGY: &str = "strategy";

/// Relation operator applied to a group ("AND", "OR").
pub const RELATION: &str = "relation";
