//! Filter orchestration: display values for the widget and query rewriting.
//!
//! A [`FilterController`] is either idle (no selection) or active (a
//! selection is bound). Only an active controller rewrites queries, and only
//! queries whose subject type is the configured content type.

use serde_json::{Map, Value};
use tracing::instrument;

use crate::config::{FilterConfig, FilterType};
use crate::flatten::{FlattenedRow, Flattener};
use crate::hooks::FilterHooks;
use crate::markup::AdminForm;
use crate::merge::{MergeConfig, MergeStrategy, PredicateMerger};
use crate::predicate::TaxonomyClause;
use crate::query::Query;
use crate::selection::{dedup_ids, Selection};
use crate::term::TermId;
use crate::traits::{Capability, FilterCapabilities, RepositoryParentResolver, TermRepository};
use crate::tree::{TermTree, TreeBuilder};

const CAPABILITIES: &[Capability] = &[
    Capability::ContextValue,
    Capability::DisplayValues,
    Capability::QueryModifier,
    Capability::AdminForm,
];

/// Whether a selection is bound.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FilterState {
    #[default]
    Idle,
    Active(Selection),
}

/// One taxonomy facet filter bound to a term repository.
#[derive(Debug)]
pub struct FilterController<R> {
    repository: R,
    config: FilterConfig,
    hooks: FilterHooks,
    state: FilterState,
}

impl<R: TermRepository> FilterController<R> {
    pub fn new(repository: R, config: FilterConfig) -> Self {
        Self {
            repository,
            config,
            hooks: FilterHooks::default(),
            state: FilterState::Idle,
        }
    }

    pub fn with_hooks(mut self, hooks: FilterHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn hooks(&self) -> &FilterHooks {
        &self.hooks
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, FilterState::Active(_))
    }

    // =========================================================================
    // STATE
    // =========================================================================

    /// Bind a selection. An empty selection leaves the controller idle.
    pub fn bind_selection(&mut self, selection: impl Into<Selection>) {
        let selection = selection.into();
        if selection.is_empty() {
            self.reset();
            return;
        }
        tracing::debug!(
            subsystem = "core",
            component = "controller",
            op = "bind_selection",
            taxonomy = %self.config.taxonomy,
            value_count = selection.raw().len(),
            "Selection bound"
        );
        self.state = FilterState::Active(selection);
    }

    /// Bind whatever the request context holds under the configured context
    /// key; with nothing there the controller becomes idle.
    pub fn bind_from_context(&mut self, context: &Map<String, Value>) {
        match context
            .get(&self.config.context_key)
            .and_then(Selection::from_value)
        {
            Some(selection) => self.bind_selection(selection),
            None => self.reset(),
        }
    }

    pub fn reset(&mut self) {
        self.state = FilterState::Idle;
    }

    // =========================================================================
    // DISPLAY VALUES
    // =========================================================================

    /// Fetch the taxonomy's terms and build their tree. Retrieval errors
    /// yield an empty tree.
    pub fn term_tree(&self) -> TermTree {
        let args = self.hooks.term_query_args(self.config.term_query_args());
        let terms = match self.repository.fetch_all(&args) {
            Ok(terms) => terms,
            Err(e) => {
                tracing::warn!(
                    subsystem = "core",
                    component = "controller",
                    op = "fetch_all",
                    taxonomy = %args.taxonomy,
                    error = %e,
                    "Term retrieval failed, showing no values"
                );
                return TermTree::default();
            }
        };
        if terms.is_empty() {
            return TermTree::default();
        }

        let resolver = RepositoryParentResolver::new(&self.repository, &self.config.taxonomy);
        TreeBuilder::new()
            .with_max_depth(self.config.max_depth)
            .build_with_resolver(terms, &resolver)
    }

    /// Rows for the selection widget, in display order.
    pub fn display_values(&self) -> Vec<FlattenedRow> {
        let tree = self.term_tree();
        if tree.is_empty() {
            return Vec::new();
        }
        Flattener::new()
            .with_class_hook(self.hooks.category_class_hook())
            .flatten(&tree)
    }

    // =========================================================================
    // QUERY REWRITING
    // =========================================================================

    /// Term ids the bound selection matches, `None` when idle.
    ///
    /// Single-select expands the first selected term to all of its
    /// descendants; multi-select uses exactly the selected terms.
    pub fn selected_term_ids(&self) -> Option<Vec<TermId>> {
        let FilterState::Active(selection) = &self.state else {
            return None;
        };

        let ids = match self.config.filter_type {
            FilterType::Select => {
                let mut ids = selection.ids();
                if let Some(anchor) = selection.first_id() {
                    ids.extend(self.descendant_ids(anchor));
                }
                dedup_ids(ids)
            }
            FilterType::MultiSelect => selection.list_ids(),
        };
        Some(ids)
    }

    /// The clause this filter contributes, `None` when idle or when the
    /// selection normalises to no ids.
    pub fn clause(&self) -> Option<TaxonomyClause> {
        let ids = self.selected_term_ids()?;
        if ids.is_empty() {
            return None;
        }
        Some(TaxonomyClause::including(self.config.taxonomy.clone(), ids))
    }

    /// Merge configuration as chosen by the hooks.
    pub fn merge_config(&self) -> MergeConfig {
        MergeConfig {
            strategy: MergeStrategy::from_nested(self.hooks.nested_merge()),
            relation: self.hooks.relation(),
            group_key: self.config.group_key.clone(),
        }
    }

    /// Restrict `query` to the bound selection.
    ///
    /// Returns the query unchanged when idle, when the query targets another
    /// subject type, or when the selection has no usable ids. Otherwise the
    /// clause is merged into the query's predicates and the query is marked
    /// to bypass result caches.
    #[instrument(skip_all, fields(
        subsystem = "core",
        component = "controller",
        op = "apply_to_query",
        subject_type = %query.subject_type,
    ))]
    pub fn apply_to_query(&self, mut query: Query) -> Query {
        if query.subject_type != self.config.content_type {
            tracing::debug!(
                expected = %self.config.content_type,
                "Query targets another subject type, leaving untouched"
            );
            return query;
        }
        if !self.is_active() {
            tracing::debug!("No selection bound, leaving query untouched");
            return query;
        }
        let Some(clause) = self.clause() else {
            tracing::debug!("Selection has no usable term ids, leaving query untouched");
            return query;
        };

        let merger = PredicateMerger::new(self.merge_config());
        query.predicates = merger.merge(std::mem::take(&mut query.predicates), clause);
        query.bypass_cache = true;
        query
    }

    // =========================================================================
    // ADMIN
    // =========================================================================

    pub fn admin_form(&self) -> String {
        AdminForm::new(
            self.config.taxonomy.clone(),
            self.config.title.clone(),
            self.config.filter_type,
        )
        .render()
    }

    fn descendant_ids(&self, anchor: TermId) -> Vec<TermId> {
        match self.repository.children_of(&self.config.taxonomy, anchor) {
            Ok(children) => children.into_iter().map(|t| t.id).collect(),
            Err(e) => {
                tracing::warn!(
                    subsystem = "core",
                    component = "controller",
                    op = "children_of",
                    taxonomy = %self.config.taxonomy,
                    term_id = anchor,
                    error = %e,
                    "Descendant lookup failed, matching the selected term only"
                );
                Vec::new()
            }
        }
    }
}

impl<R> FilterCapabilities for FilterController<R> {
    fn capabilities(&self) -> &[Capability] {
        CAPABILITIES
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::predicate::{PredicateNode, PredicateTree};
    use crate::term::{Term, TermQueryArgs};
    use serde_json::json;
    use std::sync::Mutex;

    /// Repository over a fixed term list that records the fetch arguments.
    #[derive(Default)]
    struct FixedRepository {
        terms: Vec<Term>,
        fail: bool,
        last_args: Mutex<Option<TermQueryArgs>>,
    }

    impl FixedRepository {
        fn new(terms: Vec<Term>) -> Self {
            Self {
                terms,
                ..Self::default()
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }
    }

    impl TermRepository for FixedRepository {
        fn fetch_all(&self, args: &TermQueryArgs) -> Result<Vec<Term>> {
            *self.last_args.lock().unwrap() = Some(args.clone());
            if self.fail {
                return Err(Error::Repository("offline".to_string()));
            }
            Ok(self.terms.clone())
        }

        fn children_of(&self, _taxonomy: &str, parent: TermId) -> Result<Vec<Term>> {
            if self.fail {
                return Err(Error::Repository("offline".to_string()));
            }
            let mut out = Vec::new();
            let mut frontier = vec![parent];
            while let Some(id) = frontier.pop() {
                for term in self.terms.iter().filter(|t| t.parent == id) {
                    out.push(term.clone());
                    frontier.push(term.id);
                }
            }
            Ok(out)
        }

        fn resolve_by_id(&self, _taxonomy: &str, id: TermId) -> Result<Option<Term>> {
            Ok(self.terms.iter().find(|t| t.id == id).cloned())
        }
    }

    fn festival_terms() -> Vec<Term> {
        vec![
            Term::new(1, "Jazz", "jazz", 0),
            Term::new(2, "Jazz:Live", "jazz-live", 1),
            Term::new(3, "Rock", "rock", 0),
        ]
    }

    fn controller() -> FilterController<FixedRepository> {
        FilterController::new(FixedRepository::new(festival_terms()), FilterConfig::default())
    }

    #[test]
    fn test_starts_idle() {
        let c = controller();
        assert_eq!(c.state(), &FilterState::Idle);
        assert!(c.selected_term_ids().is_none());
    }

    #[test]
    fn test_bind_and_reset() {
        let mut c = controller();
        c.bind_selection("1");
        assert!(c.is_active());

        c.reset();
        assert!(!c.is_active());

        c.bind_selection("");
        assert!(!c.is_active());
    }

    #[test]
    fn test_bind_from_context() {
        let mut c = controller();
        let mut context = Map::new();
        context.insert(c.config().context_key.clone(), json!(["3"]));
        c.bind_from_context(&context);
        assert_eq!(c.state(), &FilterState::Active(Selection::new(["3"])));

        c.bind_from_context(&Map::new());
        assert_eq!(c.state(), &FilterState::Idle);
    }

    #[test]
    fn test_display_values_use_hooked_args() {
        let hooks = FilterHooks::new().with_term_query_args(|args| args.with_limit(Some(10)));
        let c = controller().with_hooks(hooks);
        let rows = c.display_values();

        assert_eq!(rows.iter().map(|r| r.value).collect::<Vec<_>>(), vec![1, 2, 3]);
        let args = c.repository().last_args.lock().unwrap().clone().unwrap();
        assert_eq!(args.limit, Some(10));
        assert_eq!(args.taxonomy, "event_festival");
    }

    #[test]
    fn test_display_values_on_repository_error() {
        let c = FilterController::new(FixedRepository::failing(), FilterConfig::default());
        assert!(c.display_values().is_empty());
    }

    #[test]
    fn test_select_expands_descendants() {
        let mut c = controller();
        c.bind_selection(1u64);
        assert_eq!(c.selected_term_ids(), Some(vec![1, 2]));
    }

    #[test]
    fn test_select_expansion_failure_keeps_selected_term() {
        let mut c = FilterController::new(FixedRepository::failing(), FilterConfig::default());
        c.bind_selection(1u64);
        assert_eq!(c.selected_term_ids(), Some(vec![1]));
    }

    #[test]
    fn test_multiselect_does_not_expand() {
        let config = FilterConfig::default().with_filter_type(FilterType::MultiSelect);
        let mut c = FilterController::new(FixedRepository::new(festival_terms()), config);
        c.bind_selection(Selection::single("1,3"));
        assert_eq!(c.selected_term_ids(), Some(vec![1, 3]));
    }

    #[test]
    fn test_apply_idle_is_noop() {
        let query = Query::new("tribe_events");
        assert_eq!(controller().apply_to_query(query.clone()), query);
    }

    #[test]
    fn test_apply_other_subject_type_is_noop() {
        let mut c = controller();
        c.bind_selection(1u64);
        let query = Query::new("post");
        assert_eq!(c.apply_to_query(query.clone()), query);
    }

    #[test]
    fn test_apply_merges_and_bypasses_cache() {
        let mut c = controller();
        c.bind_selection(1u64);
        let query = c.apply_to_query(Query::new("tribe_events"));

        assert!(query.bypass_cache);
        let group = query
            .predicates
            .get("EventFestival")
            .and_then(PredicateNode::as_group)
            .unwrap();
        assert_eq!(group.relation.as_deref(), Some("AND"));
        assert_eq!(group.children[0].as_leaf().unwrap().term_ids(), vec![1, 2]);
    }

    #[test]
    fn test_apply_flat_strategy_from_hook() {
        let mut c = controller().with_hooks(FilterHooks::new().with_nested_merge(|| false));
        c.bind_selection(3u64);
        let query = c.apply_to_query(Query::new("tribe_events"));

        assert_eq!(
            query.predicates,
            PredicateTree::new()
                .with_relation("AND")
                .with_entry(TaxonomyClause::including("event_festival", [3]))
        );
    }

    #[test]
    fn test_apply_unusable_selection_is_noop() {
        let config = FilterConfig::default().with_filter_type(FilterType::MultiSelect);
        let mut c = FilterController::new(FixedRepository::new(festival_terms()), config);
        c.bind_selection(Selection::single("abc"));

        let query = c.apply_to_query(Query::new("tribe_events"));
        assert!(!query.bypass_cache);
        assert!(query.predicates.is_empty());
    }

    #[test]
    fn test_capabilities() {
        let c = controller();
        assert!(c.supports(Capability::QueryModifier));
        assert!(c.supports(Capability::AdminForm));
    }

    #[test]
    fn test_admin_form_contains_title() {
        let c = FilterController::new(
            FixedRepository::default(),
            FilterConfig::default().with_title("Festivals"),
        );
        assert!(c.admin_form().contains(r#"value="Festivals""#));
    }
}
