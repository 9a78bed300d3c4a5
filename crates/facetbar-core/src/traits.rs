//! Core traits for facetbar abstractions.
//!
//! These traits define the interfaces the filter consumes and advertises,
//! enabling pluggable term stores and capability checks by the host.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::term::{Term, TermId, TermQueryArgs};

// =============================================================================
// TERM REPOSITORY
// =============================================================================

/// Read-only source of taxonomy terms.
///
/// Implementations must give snapshot-consistent reads for the duration of
/// one filter evaluation; the filter never writes.
pub trait TermRepository: Send + Sync {
    /// Fetch every term of `args.taxonomy`, honouring order, limit and the
    /// hide-empty rule.
    fn fetch_all(&self, args: &TermQueryArgs) -> Result<Vec<Term>>;

    /// Fetch every descendant of `parent` (children, grandchildren, ...).
    fn children_of(&self, taxonomy: &str, parent: TermId) -> Result<Vec<Term>>;

    /// Look up a single term by id. `Ok(None)` when it does not exist.
    fn resolve_by_id(&self, taxonomy: &str, id: TermId) -> Result<Option<Term>>;
}

impl<R: TermRepository + ?Sized> TermRepository for std::sync::Arc<R> {
    fn fetch_all(&self, args: &TermQueryArgs) -> Result<Vec<Term>> {
        (**self).fetch_all(args)
    }

    fn children_of(&self, taxonomy: &str, parent: TermId) -> Result<Vec<Term>> {
        (**self).children_of(taxonomy, parent)
    }

    fn resolve_by_id(&self, taxonomy: &str, id: TermId) -> Result<Option<Term>> {
        (**self).resolve_by_id(taxonomy, id)
    }
}

/// Resolves parent links that fall outside an already-fetched term set.
///
/// The tree builder only needs single-term lookups, so it depends on this
/// narrower trait rather than the full repository.
pub trait ParentResolver {
    fn resolve_parent(&self, id: TermId) -> Option<Term>;
}

/// Resolver that knows no terms; depth walks stop at the fetched set.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoParentResolver;

impl ParentResolver for NoParentResolver {
    fn resolve_parent(&self, _id: TermId) -> Option<Term> {
        None
    }
}

/// Adapts a [`TermRepository`] for one taxonomy into a [`ParentResolver`].
///
/// Lookup errors are logged and treated as "not found".
pub struct RepositoryParentResolver<'a, R: ?Sized> {
    repository: &'a R,
    taxonomy: &'a str,
}

impl<'a, R: TermRepository + ?Sized> RepositoryParentResolver<'a, R> {
    pub fn new(repository: &'a R, taxonomy: &'a str) -> Self {
        Self {
            repository,
            taxonomy,
        }
    }
}

impl<R: TermRepository + ?Sized> ParentResolver for RepositoryParentResolver<'_, R> {
    fn resolve_parent(&self, id: TermId) -> Option<Term> {
        match self.repository.resolve_by_id(self.taxonomy, id) {
            Ok(term) => term,
            Err(e) => {
                tracing::warn!(
                    subsystem = "core",
                    component = "tree_builder",
                    op = "resolve_parent",
                    taxonomy = self.taxonomy,
                    term_id = id,
                    error = %e,
                    "Parent lookup failed, stopping depth walk"
                );
                None
            }
        }
    }
}

// =============================================================================
// FILTER CAPABILITIES
// =============================================================================

/// Capabilities a filter can advertise to its host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Reads its selection from the request context.
    ContextValue,
    /// Produces display rows for a selection widget.
    DisplayValues,
    /// Rewrites the predicate tree of matching queries.
    QueryModifier,
    /// Renders an admin configuration form.
    AdminForm,
}

/// Explicit capability surface checked by the host before calling into a
/// filter.
pub trait FilterCapabilities {
    fn capabilities(&self) -> &[Capability];

    fn supports(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    struct FailingRepository;

    impl TermRepository for FailingRepository {
        fn fetch_all(&self, _args: &TermQueryArgs) -> Result<Vec<Term>> {
            Err(Error::Repository("offline".to_string()))
        }

        fn children_of(&self, _taxonomy: &str, _parent: TermId) -> Result<Vec<Term>> {
            Err(Error::Repository("offline".to_string()))
        }

        fn resolve_by_id(&self, _taxonomy: &str, _id: TermId) -> Result<Option<Term>> {
            Err(Error::Repository("offline".to_string()))
        }
    }

    struct Fixed;

    impl FilterCapabilities for Fixed {
        fn capabilities(&self) -> &[Capability] {
            &[Capability::DisplayValues]
        }
    }

    #[test]
    fn test_no_parent_resolver_finds_nothing() {
        assert!(NoParentResolver.resolve_parent(1).is_none());
    }

    #[test]
    fn test_repository_resolver_swallows_errors() {
        let repo = FailingRepository;
        let resolver = RepositoryParentResolver::new(&repo, "genre");
        assert!(resolver.resolve_parent(7).is_none());
    }

    #[test]
    fn test_supports_checks_membership() {
        assert!(Fixed.supports(Capability::DisplayValues));
        assert!(!Fixed.supports(Capability::QueryModifier));
    }
}
