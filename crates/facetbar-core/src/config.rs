//! Filter configuration.
//!
//! [`FilterConfig`] can be built in code, deserialized from JSON, or loaded
//! from `FACETBAR_*` environment variables with fallback to
//! [`crate::defaults`].

use serde::{Deserialize, Deserializer, Serialize};

use crate::defaults;
use crate::predicate::is_reserved_key;
use crate::term::TermQueryArgs;

// =============================================================================
// FILTER TYPE
// =============================================================================

/// Selection widget type, which also decides how a selection is expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    /// Single choice. The selected term matches together with all of its
    /// descendants.
    #[default]
    Select,
    /// Multiple choice. Exactly the selected terms match.
    #[serde(rename = "multiselect")]
    MultiSelect,
}

impl FilterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterType::Select => "select",
            FilterType::MultiSelect => "multiselect",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FilterType::Select => "Dropdown",
            FilterType::MultiSelect => "Multi-select",
        }
    }

    /// Parse a filter type, accepting common spellings.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "select" | "dropdown" | "single" => Some(FilterType::Select),
            "multiselect" | "multi_select" | "multi-select" | "multi" => {
                Some(FilterType::MultiSelect)
            }
            _ => None,
        }
    }
}

// =============================================================================
// FILTER CONFIG
// =============================================================================

/// Configuration of one taxonomy facet filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Taxonomy providing the terms.
    pub taxonomy: String,
    /// Subject type of the queries this filter restricts.
    pub content_type: String,
    /// Title shown in the admin form.
    pub title: String,
    pub filter_type: FilterType,
    /// Key of the named group used by the nested merge strategy.
    #[serde(deserialize_with = "deserialize_group_key")]
    pub group_key: String,
    /// Request context key holding the raw selection.
    pub context_key: String,
    /// Maximum number of terms in the display list. `None` = unlimited.
    pub term_limit: Option<usize>,
    /// Exclude terms with no tagged objects from the display list.
    pub hide_empty: bool,
    /// Maximum parent links followed per term.
    pub max_depth: u32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            taxonomy: defaults::TAXONOMY.to_string(),
            content_type: defaults::CONTENT_TYPE.to_string(),
            title: defaults::TITLE.to_string(),
            filter_type: FilterType::default(),
            group_key: defaults::GROUP_KEY.to_string(),
            context_key: defaults::CONTEXT_KEY.to_string(),
            term_limit: Some(defaults::TERM_LIMIT),
            hide_empty: defaults::HIDE_EMPTY,
            max_depth: defaults::MAX_TERM_DEPTH,
        }
    }
}

impl FilterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables with fallback to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, falling back to defaults for
    /// missing or invalid values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(val) = non_empty(lookup("FACETBAR_TAXONOMY")) {
            config.taxonomy = val;
        }
        if let Some(val) = non_empty(lookup("FACETBAR_CONTENT_TYPE")) {
            config.content_type = val;
        }
        if let Some(val) = non_empty(lookup("FACETBAR_TITLE")) {
            config.title = val;
        }
        if let Some(val) = non_empty(lookup("FACETBAR_GROUP_KEY")) {
            if is_reserved_key(&val) {
                tracing::warn!(value = %val, "Invalid FACETBAR_GROUP_KEY, using default");
            } else {
                config.group_key = val;
            }
        }
        if let Some(val) = non_empty(lookup("FACETBAR_CONTEXT_KEY")) {
            config.context_key = val;
        }

        if let Some(val) = lookup("FACETBAR_FILTER_TYPE") {
            if let Some(filter_type) = FilterType::from_str_loose(&val) {
                config.filter_type = filter_type;
            } else {
                tracing::warn!(value = %val, "Invalid FACETBAR_FILTER_TYPE, using default");
            }
        }

        if let Some(val) = lookup("FACETBAR_TERM_LIMIT") {
            match val.trim().parse::<usize>() {
                Ok(0) => config.term_limit = None,
                Ok(limit) => config.term_limit = Some(limit),
                Err(_) => {
                    tracing::warn!(value = %val, "Invalid FACETBAR_TERM_LIMIT, using default")
                }
            }
        }

        if let Some(val) = lookup("FACETBAR_HIDE_EMPTY") {
            config.hide_empty = val != "false" && val != "0";
        }

        if let Some(val) = lookup("FACETBAR_MAX_DEPTH") {
            match val.trim().parse::<u32>() {
                Ok(depth) => config.max_depth = depth.clamp(1, 1024),
                Err(_) => {
                    tracing::warn!(value = %val, "Invalid FACETBAR_MAX_DEPTH, using default")
                }
            }
        }

        config
    }

    pub fn with_taxonomy(mut self, taxonomy: impl Into<String>) -> Self {
        self.taxonomy = taxonomy.into();
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn with_filter_type(mut self, filter_type: FilterType) -> Self {
        self.filter_type = filter_type;
        self
    }

    pub fn with_group_key(mut self, group_key: impl Into<String>) -> Self {
        self.group_key = group_key.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Term fetch arguments for the display list, before hooks run.
    pub fn term_query_args(&self) -> TermQueryArgs {
        TermQueryArgs::new(self.taxonomy.clone())
            .with_limit(self.term_limit)
            .with_hide_empty(self.hide_empty)
    }
}

/// Group keys that would serialise as positional entries or the relation
/// fall back to the default.
fn deserialize_group_key<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let key = String::deserialize(deserializer)?;
    if is_reserved_key(&key) {
        tracing::warn!(value = %key, "Invalid group_key, using default");
        return Ok(defaults::GROUP_KEY.to_string());
    }
    Ok(key)
}

fn non_empty(val: Option<String>) -> Option<String> {
    val.filter(|v| !v.trim().is_empty())
}
