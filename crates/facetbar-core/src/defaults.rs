//! Centralized default constants for facetbar.
//!
//! **This module is the single source of truth** for shared default values.
//! `FilterConfig::default()`, the in-memory store and the CLI all reference
//! these constants instead of repeating literals.

// =============================================================================
// TAXONOMY
// =============================================================================

/// Taxonomy the filter reads its terms from.
pub const TAXONOMY: &str = "event_festival";

/// Content type the filter restricts. Queries for any other subject type are
/// left untouched.
pub const CONTENT_TYPE: &str = "tribe_events";

/// Human-readable filter title shown in the admin form.
pub const TITLE: &str = "Festival";

/// Request context key holding the raw selection.
pub const CONTEXT_KEY: &str = "tribe_filterbar_event_festival";

/// Key of the named group the nested merge strategy writes to.
pub const GROUP_KEY: &str = "EventFestival";

// =============================================================================
// TERM RETRIEVAL
// =============================================================================

/// Maximum number of terms fetched for the display list.
pub const TERM_LIMIT: usize = 200;

/// Whether terms without any tagged objects are excluded from the display list.
pub const HIDE_EMPTY: bool = true;

// =============================================================================
// TREE
// =============================================================================

/// Upper bound on parent links followed while computing a term depth.
///
/// Real taxonomies are a handful of levels deep; the bound only matters for
/// corrupt parent graphs.
pub const MAX_TERM_DEPTH: u32 = 64;

// =============================================================================
// DISPLAY CLASSES
// =============================================================================

/// Prefix joined to a term slug to build its per-term CSS class.
pub const SLUG_CLASS_PREFIX: &str = "tribe-events-category-";

/// Depth class for root terms.
pub const PARENT_CLASS: &str = "tribe-parent-cat ";

/// Depth class for depth-1 terms.
pub const CHILD_CLASS: &str = "tribe-child-cat ";

/// Marker appended to rows that have children (collapsed by default).
pub const HAS_CHILD_CLASS: &str = " has-child closed";

// =============================================================================
// PREDICATES
// =============================================================================

/// Relation operator applied when the relation hook is left at its default.
pub const RELATION: &str = "AND";

/// Whether merges nest the new clause in its own named group by default.
pub const NESTED_MERGE: bool = true;
