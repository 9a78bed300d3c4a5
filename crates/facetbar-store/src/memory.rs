//! In-memory implementation of TermRepository.

use std::collections::{BTreeSet, HashSet};
use std::io::Read;
use std::path::Path;

use facetbar_core::{Error, Result, Term, TermId, TermQueryArgs, TermRepository};

use crate::document::TermDocument;

/// Term repository backed by a term list held in memory.
///
/// Taxonomies are known once they have been loaded, even when empty; asking
/// for any other taxonomy is an error.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTermRepository {
    terms: Vec<Term>,
    taxonomies: BTreeSet<String>,
}

impl InMemoryTermRepository {
    /// Create a repository over `terms`. Every taxonomy they mention is known.
    pub fn new(terms: Vec<Term>) -> Self {
        let taxonomies = terms.iter().map(|t| t.taxonomy.clone()).collect();
        Self { terms, taxonomies }
    }

    /// Load a term document from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let document: TermDocument = serde_json::from_str(json)?;
        Ok(Self::from_document(document))
    }

    /// Load a term document from a reader.
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let document: TermDocument = serde_json::from_reader(reader)?;
        Ok(Self::from_document(document))
    }

    /// Load a term document from a file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let repo = Self::from_reader(std::io::BufReader::new(file))?;
        tracing::debug!(
            subsystem = "store",
            component = "memory",
            op = "load",
            path = %path.display(),
            term_count = repo.len(),
            "Loaded term file"
        );
        Ok(repo)
    }

    pub fn from_document(document: TermDocument) -> Self {
        let taxonomy = document.taxonomy().to_string();
        let mut repo = Self::new(document.into_terms());
        repo.taxonomies.insert(taxonomy);
        repo
    }

    /// Add a term, replacing any term with the same id in the same taxonomy.
    pub fn insert(&mut self, term: Term) {
        self.taxonomies.insert(term.taxonomy.clone());
        match self
            .terms
            .iter_mut()
            .find(|t| t.id == term.id && t.taxonomy == term.taxonomy)
        {
            Some(existing) => *existing = term,
            None => self.terms.push(term),
        }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn taxonomies(&self) -> impl Iterator<Item = &str> {
        self.taxonomies.iter().map(String::as_str)
    }

    fn in_taxonomy<'a>(&'a self, taxonomy: &'a str) -> Result<impl Iterator<Item = &'a Term> + 'a> {
        if !self.taxonomies.contains(taxonomy) {
            return Err(Error::TaxonomyNotFound(taxonomy.to_string()));
        }
        Ok(self.terms.iter().filter(move |t| t.taxonomy == taxonomy))
    }

    /// All descendants of `parent` in pre-order. Cyclic links are followed
    /// once.
    fn descendants<'a>(&'a self, taxonomy: &'a str, parent: TermId) -> Result<Vec<&'a Term>> {
        let members: Vec<&Term> = self.in_taxonomy(taxonomy)?.collect();
        let mut out = Vec::new();
        let mut visited = HashSet::from([parent]);
        let mut stack = vec![parent];

        while let Some(current) = stack.pop() {
            // Push in reverse so the first child is visited first.
            for child in members.iter().rev().filter(|t| t.parent == current) {
                if visited.insert(child.id) {
                    stack.push(child.id);
                }
            }
            if current != parent {
                if let Some(term) = members.iter().find(|t| t.id == current) {
                    out.push(*term);
                }
            }
        }
        Ok(out)
    }

    /// A term is listed when it is tagged on something or when one of its
    /// descendants is.
    fn is_listed(&self, term: &Term, descendants_in_use: &HashSet<TermId>) -> bool {
        term.count > 0 || descendants_in_use.contains(&term.id)
    }

    /// Ids of terms with at least one tagged descendant.
    fn ancestors_of_used(&self, members: &[&Term]) -> HashSet<TermId> {
        let mut ancestors = HashSet::new();
        for term in members.iter().filter(|t| t.count > 0) {
            let mut visited = HashSet::from([term.id]);
            let mut next = term.parent;
            while next != 0 && visited.insert(next) {
                ancestors.insert(next);
                next = match members.iter().find(|t| t.id == next) {
                    Some(parent) => parent.parent,
                    None => break,
                };
            }
        }
        ancestors
    }
}

impl TermRepository for InMemoryTermRepository {
    fn fetch_all(&self, args: &TermQueryArgs) -> Result<Vec<Term>> {
        let members: Vec<&Term> = self.in_taxonomy(&args.taxonomy)?.collect();

        let mut terms: Vec<Term> = if args.hide_empty {
            let in_use = self.ancestors_of_used(&members);
            members
                .into_iter()
                .filter(|t| self.is_listed(t, &in_use))
                .cloned()
                .collect()
        } else {
            members.into_iter().cloned().collect()
        };

        terms.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        if let Some(limit) = args.limit {
            terms.truncate(limit);
        }

        tracing::debug!(
            subsystem = "store",
            component = "memory",
            op = "fetch_all",
            taxonomy = %args.taxonomy,
            term_count = terms.len(),
            "Fetched terms"
        );
        Ok(terms)
    }

    fn children_of(&self, taxonomy: &str, parent: TermId) -> Result<Vec<Term>> {
        let terms: Vec<Term> = self
            .descendants(taxonomy, parent)?
            .into_iter()
            .cloned()
            .collect();
        tracing::trace!(
            subsystem = "store",
            component = "memory",
            op = "children_of",
            taxonomy = %taxonomy,
            parent_id = parent,
            term_count = terms.len(),
            "Collected descendants"
        );
        Ok(terms)
    }

    fn resolve_by_id(&self, taxonomy: &str, id: TermId) -> Result<Option<Term>> {
        Ok(self.in_taxonomy(taxonomy)?.find(|t| t.id == id).cloned())
    }
}
