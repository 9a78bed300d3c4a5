//! # facetbar-store
//!
//! In-memory term repository for facetbar.
//!
//! Holds the terms of one or more taxonomies and answers the
//! [`TermRepository`](facetbar_core::TermRepository) queries the filter
//! controller makes: ordered, limited listings, descendant lookups and
//! single-term resolution. Terms are loaded from JSON term files.
//!
//! ## Example
//!
//! ```rust
//! use facetbar_core::{FilterConfig, FilterController};
//! use facetbar_store::InMemoryTermRepository;
//!
//! let repo = InMemoryTermRepository::from_json_str(
//!     r#"[{"id": 1, "name": "Jazz", "slug": "jazz", "count": 4}]"#,
//! )?;
//! let controller = FilterController::new(repo, FilterConfig::default());
//!
//! assert_eq!(controller.display_values().len(), 1);
//! # Ok::<(), facetbar_core::Error>(())
//! ```

pub mod document;
pub mod memory;

pub use document::TermDocument;
pub use memory::InMemoryTermRepository;
