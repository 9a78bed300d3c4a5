//! Term file format.
//!
//! A term file is either a bare JSON array of terms or an object naming a
//! taxonomy:
//!
//! ```json
//! {"taxonomy": "event_festival", "terms": [{"id": 1, "name": "Jazz", "slug": "jazz"}]}
//! ```
//!
//! Terms without a taxonomy of their own belong to the document's taxonomy,
//! or to the default taxonomy for a bare array.

use serde::{Deserialize, Serialize};

use facetbar_core::{defaults, Term};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TermDocument {
    List(Vec<Term>),
    Taxonomy {
        #[serde(default)]
        taxonomy: Option<String>,
        terms: Vec<Term>,
    },
}

impl TermDocument {
    /// Taxonomy implied for terms that name none.
    pub fn taxonomy(&self) -> &str {
        match self {
            TermDocument::Taxonomy {
                taxonomy: Some(taxonomy),
                ..
            } if !taxonomy.is_empty() => taxonomy,
            _ => defaults::TAXONOMY,
        }
    }

    /// Consume the document, filling in missing taxonomies.
    pub fn into_terms(self) -> Vec<Term> {
        let taxonomy = self.taxonomy().to_string();
        let terms = match self {
            TermDocument::List(terms) | TermDocument::Taxonomy { terms, .. } => terms,
        };
        terms
            .into_iter()
            .map(|mut term| {
                if term.taxonomy.is_empty() {
                    term.taxonomy = taxonomy.clone();
                }
                term
            })
            .collect()
    }
}
