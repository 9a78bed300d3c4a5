//! Injected value transforms applied at fixed points of the filter.
//!
//! Hosts customise the filter through these hooks instead of subclassing it.
//! Every hook is a pure function of its input; none of them can alter
//! control flow beyond the value it returns.
//!
//! | Hook | Applied to | Default |
//! |------|------------|---------|
//! | `term_query_args` | arguments of the display-list term fetch | identity |
//! | `category_class` | depth class of each display row | identity |
//! | `relation` | relation operator of the merged predicate | `Some("AND")` |
//! | `nested_merge` | merge strategy choice | `true` (nested) |

use std::fmt;
use std::sync::Arc;

use crate::defaults;
use crate::term::TermQueryArgs;

pub type TermQueryArgsHook = Arc<dyn Fn(TermQueryArgs) -> TermQueryArgs + Send + Sync>;
pub type CategoryClassHook = Arc<dyn Fn(String, u32) -> String + Send + Sync>;
pub type RelationHook = Arc<dyn Fn() -> Option<String> + Send + Sync>;
pub type NestedMergeHook = Arc<dyn Fn() -> bool + Send + Sync>;

/// The set of hooks a filter controller consults.
#[derive(Clone)]
pub struct FilterHooks {
    term_query_args: TermQueryArgsHook,
    category_class: CategoryClassHook,
    relation: RelationHook,
    nested_merge: NestedMergeHook,
}

impl Default for FilterHooks {
    fn default() -> Self {
        Self {
            term_query_args: Arc::new(|args| args),
            category_class: identity_class_hook(),
            relation: Arc::new(|| Some(defaults::RELATION.to_string())),
            nested_merge: Arc::new(|| defaults::NESTED_MERGE),
        }
    }
}

impl fmt::Debug for FilterHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterHooks")
            .field("relation", &self.relation())
            .field("nested_merge", &self.nested_merge())
            .finish_non_exhaustive()
    }
}

/// Class hook that returns the depth class unchanged.
pub fn identity_class_hook() -> CategoryClassHook {
    Arc::new(|class, _depth| class)
}

impl FilterHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_term_query_args(
        mut self,
        hook: impl Fn(TermQueryArgs) -> TermQueryArgs + Send + Sync + 'static,
    ) -> Self {
        self.term_query_args = Arc::new(hook);
        self
    }

    pub fn with_category_class(
        mut self,
        hook: impl Fn(String, u32) -> String + Send + Sync + 'static,
    ) -> Self {
        self.category_class = Arc::new(hook);
        self
    }

    pub fn with_relation(mut self, hook: impl Fn() -> Option<String> + Send + Sync + 'static) -> Self {
        self.relation = Arc::new(hook);
        self
    }

    pub fn with_nested_merge(mut self, hook: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.nested_merge = Arc::new(hook);
        self
    }

    pub fn term_query_args(&self, args: TermQueryArgs) -> TermQueryArgs {
        (self.term_query_args)(args)
    }

    pub fn category_class_hook(&self) -> CategoryClassHook {
        Arc::clone(&self.category_class)
    }

    /// Relation operator to apply, `None` when the hook returns nothing or
    /// an empty string.
    pub fn relation(&self) -> Option<String> {
        (self.relation)().filter(|r| !r.is_empty())
    }

    pub fn nested_merge(&self) -> bool {
        (self.nested_merge)()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let hooks = FilterHooks::default();
        assert_eq!(hooks.relation().as_deref(), Some("AND"));
        assert!(hooks.nested_merge());

        let args = TermQueryArgs::new("genre");
        assert_eq!(hooks.term_query_args(args.clone()), args);
        assert_eq!((hooks.category_class_hook())("x ".to_string(), 3), "x ");
    }

    #[test]
    fn test_empty_relation_is_none() {
        let hooks = FilterHooks::new().with_relation(|| Some(String::new()));
        assert!(hooks.relation().is_none());
    }

    #[test]
    fn test_overrides() {
        let hooks = FilterHooks::new()
            .with_term_query_args(|args| args.with_limit(Some(5)))
            .with_category_class(|class, depth| format!("{class}d{depth} "))
            .with_relation(|| Some("OR".to_string()))
            .with_nested_merge(|| false);

        assert_eq!(hooks.term_query_args(TermQueryArgs::new("g")).limit, Some(5));
        assert_eq!((hooks.category_class_hook())("c ".to_string(), 2), "c d2 ");
        assert_eq!(hooks.relation().as_deref(), Some("OR"));
        assert!(!hooks.nested_merge());
    }

    #[test]
    fn test_debug_does_not_panic() {
        let rendered = format!("{:?}", FilterHooks::default());
        assert!(rendered.contains("FilterHooks"));
    }
}
