//! Boolean predicate trees over taxonomy membership.
//!
//! The host query framework describes taxonomy restrictions as a JSON
//! structure: a list of clauses and named sub-groups, plus an optional
//! `"relation"` combining them.
//!
//! ```json
//! {
//!   "relation": "AND",
//!   "0": {"taxonomy": "genre", "operator": "IN", "terms": [3]},
//!   "EventFestival": {
//!     "relation": "AND",
//!     "0": {"taxonomy": "event_festival", "operator": "IN", "terms": [1, 2]}
//!   }
//! }
//! ```
//!
//! [`PredicateTree`] is the typed form of that structure. Conversion from
//! JSON never fails: a top-level value that is neither an object nor an
//! array becomes an empty tree, `""` placeholders become
//! [`PredicateNode::Empty`], and values that are not recognisable clauses or
//! groups are carried through untouched as [`PredicateNode::Raw`].

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::term::TermId;

// =============================================================================
// CLAUSE OPERATOR
// =============================================================================

/// Comparison between a clause's term list and an object's terms.
///
/// The filter only writes `IN`. Operators of other clauses are carried
/// verbatim, so a re-serialised clause is unchanged and dedup compares them
/// exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ClauseOperator {
    /// Object has at least one of the terms.
    #[default]
    In,
    Other(String),
}

impl ClauseOperator {
    pub fn as_str(&self) -> &str {
        match self {
            ClauseOperator::In => "IN",
            ClauseOperator::Other(op) => op,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "IN" => ClauseOperator::In,
            other => ClauseOperator::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ClauseOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// TERM REFERENCE
// =============================================================================

/// A term named by a clause: a numeric id or any other value (usually a slug).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TermRef {
    Id(TermId),
    Name(String),
}

impl TermRef {
    /// Equality that treats `Id(5)` and `Name("5")` as the same term.
    pub fn loosely_eq(&self, other: &TermRef) -> bool {
        match (self, other) {
            (TermRef::Id(a), TermRef::Id(b)) => a == b,
            (TermRef::Name(a), TermRef::Name(b)) => a == b,
            (TermRef::Id(id), TermRef::Name(name)) | (TermRef::Name(name), TermRef::Id(id)) => {
                name.trim().parse::<TermId>().is_ok_and(|n| n == *id)
            }
        }
    }

    fn from_value(value: &Value) -> Self {
        match value {
            Value::Number(n) => match n.as_u64() {
                Some(id) => TermRef::Id(id),
                None => TermRef::Name(n.to_string()),
            },
            Value::String(s) => TermRef::Name(s.clone()),
            other => TermRef::Name(other.to_string()),
        }
    }

    fn to_value(&self) -> Value {
        match self {
            TermRef::Id(id) => Value::from(*id),
            TermRef::Name(name) => Value::String(name.clone()),
        }
    }
}

impl From<TermId> for TermRef {
    fn from(id: TermId) -> Self {
        TermRef::Id(id)
    }
}

// =============================================================================
// TAXONOMY CLAUSE (LEAF)
// =============================================================================

/// A single taxonomy membership test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyClause {
    /// Name of the entry in its parent, for named clauses.
    pub key: Option<String>,
    pub taxonomy: String,
    /// `None` when the source clause named no operator; the host then
    /// applies its own default and the clause is written back without one.
    pub operator: Option<ClauseOperator>,
    pub terms: Vec<TermRef>,
    /// Attributes this crate does not interpret (`field`, `include_children`, ...).
    pub extra: Map<String, Value>,
}

impl TaxonomyClause {
    /// An `IN` clause over term ids.
    pub fn including(taxonomy: impl Into<String>, ids: impl IntoIterator<Item = TermId>) -> Self {
        Self {
            key: None,
            taxonomy: taxonomy.into(),
            operator: Some(ClauseOperator::In),
            terms: ids.into_iter().map(TermRef::Id).collect(),
            extra: Map::new(),
        }
    }

    pub fn with_operator(mut self, operator: ClauseOperator) -> Self {
        self.operator = Some(operator);
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_extra(mut self, name: impl Into<String>, value: Value) -> Self {
        self.extra.insert(name.into(), value);
        self
    }

    /// Term ids named by the clause, skipping non-numeric references.
    pub fn term_ids(&self) -> Vec<TermId> {
        self.terms
            .iter()
            .filter_map(|t| match t {
                TermRef::Id(id) => Some(*id),
                TermRef::Name(name) => name.trim().parse().ok(),
            })
            .collect()
    }

    /// Structural identity: same taxonomy, operator, terms (in order) and
    /// extra attributes. The entry key is not compared.
    pub fn matches(&self, other: &TaxonomyClause) -> bool {
        self.taxonomy == other.taxonomy
            && self.operator == other.operator
            && self.extra == other.extra
            && self.terms.len() == other.terms.len()
            && self
                .terms
                .iter()
                .zip(&other.terms)
                .all(|(a, b)| a.loosely_eq(b))
    }

    fn from_map(key: Option<String>, mut map: Map<String, Value>) -> Self {
        let taxonomy = match map.remove("taxonomy") {
            Some(Value::String(s)) => s,
            Some(other) => other.to_string(),
            None => String::new(),
        };
        // A non-string operator stays among the extra attributes, untouched.
        let operator = match map.get("operator") {
            Some(Value::String(s)) => {
                let operator = ClauseOperator::parse(s);
                map.remove("operator");
                Some(operator)
            }
            _ => None,
        };
        let terms = match map.remove("terms") {
            Some(Value::Array(values)) => values.iter().map(TermRef::from_value).collect(),
            Some(Value::Null) | None => Vec::new(),
            Some(single) => vec![TermRef::from_value(&single)],
        };

        Self {
            key,
            taxonomy,
            operator,
            terms,
            extra: map,
        }
    }

    fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("taxonomy".to_string(), Value::String(self.taxonomy.clone()));
        if let Some(operator) = &self.operator {
            map.insert(
                "operator".to_string(),
                Value::String(operator.as_str().to_string()),
            );
        }
        map.insert(
            "terms".to_string(),
            Value::Array(self.terms.iter().map(TermRef::to_value).collect()),
        );
        for (k, v) in &self.extra {
            map.insert(k.clone(), v.clone());
        }
        Value::Object(map)
    }
}

// =============================================================================
// PREDICATE NODES
// =============================================================================

/// A named or positional sub-group of predicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredicateGroup {
    pub key: Option<String>,
    /// How the children combine (`"AND"`, `"OR"`). `None` = framework default.
    pub relation: Option<String>,
    pub children: Vec<PredicateNode>,
}

impl PredicateGroup {
    /// A named group holding `children`.
    pub fn keyed(key: impl Into<String>, children: Vec<PredicateNode>) -> Self {
        Self {
            key: Some(key.into()),
            relation: None,
            children,
        }
    }

    pub fn with_relation(mut self, relation: impl Into<String>) -> Self {
        self.relation = Some(relation.into());
        self
    }
}

/// One entry of a predicate tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredicateNode {
    Leaf(TaxonomyClause),
    Group(PredicateGroup),
    /// Placeholder entry (`""`), dropped by flat merges.
    Empty { key: Option<String> },
    /// Unrecognised value, preserved verbatim.
    Raw { key: Option<String>, value: Value },
}

impl PredicateNode {
    pub fn key(&self) -> Option<&str> {
        match self {
            PredicateNode::Leaf(clause) => clause.key.as_deref(),
            PredicateNode::Group(group) => group.key.as_deref(),
            PredicateNode::Empty { key } | PredicateNode::Raw { key, .. } => key.as_deref(),
        }
    }

    pub fn is_empty_marker(&self) -> bool {
        matches!(self, PredicateNode::Empty { .. })
    }

    pub fn as_leaf(&self) -> Option<&TaxonomyClause> {
        match self {
            PredicateNode::Leaf(clause) => Some(clause),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&PredicateGroup> {
        match self {
            PredicateNode::Group(group) => Some(group),
            _ => None,
        }
    }

    /// Convert one JSON entry stored under `key`.
    pub fn from_value(key: Option<String>, value: Value) -> Self {
        match value {
            Value::String(s) if s.is_empty() => PredicateNode::Empty { key },
            Value::Object(map) if map.contains_key("taxonomy") => {
                PredicateNode::Leaf(TaxonomyClause::from_map(key, map))
            }
            Value::Object(_) | Value::Array(_) => {
                let (relation, children) = parse_entries(value);
                PredicateNode::Group(PredicateGroup {
                    key,
                    relation,
                    children,
                })
            }
            other => PredicateNode::Raw { key, value: other },
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            PredicateNode::Leaf(clause) => clause.to_value(),
            PredicateNode::Group(group) => entries_to_value(group.relation.as_deref(), &group.children),
            PredicateNode::Empty { .. } => Value::String(String::new()),
            PredicateNode::Raw { value, .. } => value.clone(),
        }
    }
}

impl From<TaxonomyClause> for PredicateNode {
    fn from(clause: TaxonomyClause) -> Self {
        PredicateNode::Leaf(clause)
    }
}

impl From<PredicateGroup> for PredicateNode {
    fn from(group: PredicateGroup) -> Self {
        PredicateNode::Group(group)
    }
}

// =============================================================================
// PREDICATE TREE
// =============================================================================

/// Top level of a query's taxonomy restrictions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredicateTree {
    pub relation: Option<String>,
    pub entries: Vec<PredicateNode>,
}

impl PredicateTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_relation(mut self, relation: impl Into<String>) -> Self {
        self.relation = Some(relation.into());
        self
    }

    pub fn with_entry(mut self, entry: impl Into<PredicateNode>) -> Self {
        self.entries.push(entry.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.relation.is_none()
    }

    pub fn get(&self, key: &str) -> Option<&PredicateNode> {
        self.entries.iter().find(|e| e.key() == Some(key))
    }

    /// Top-level leaves structurally identical to `clause`.
    pub fn count_matching(&self, clause: &TaxonomyClause) -> usize {
        self.entries
            .iter()
            .filter_map(PredicateNode::as_leaf)
            .filter(|leaf| leaf.matches(clause))
            .count()
    }

    /// Convert a host JSON value, coercing malformed shapes to an empty tree.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(_) | Value::Array(_) => {
                let (relation, entries) = parse_entries(value);
                Self { relation, entries }
            }
            Value::Null => Self::default(),
            other => {
                tracing::debug!(
                    subsystem = "core",
                    component = "predicate",
                    value = %other,
                    "Malformed predicate tree coerced to empty"
                );
                Self::default()
            }
        }
    }

    pub fn to_value(&self) -> Value {
        entries_to_value(self.relation.as_deref(), &self.entries)
    }
}

impl Serialize for PredicateTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PredicateTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(value))
    }
}

/// True for object keys that do not name an entry when serialised:
/// `"relation"` and integer-like (positional) keys.
pub fn is_reserved_key(key: &str) -> bool {
    key == "relation" || key.parse::<usize>().is_ok()
}

/// Split an object or array into its relation and entries. Integer-like
/// object keys are positional; other keys name their entry.
fn parse_entries(value: Value) -> (Option<String>, Vec<PredicateNode>) {
    match value {
        Value::Array(values) => (
            None,
            values
                .into_iter()
                .map(|v| PredicateNode::from_value(None, v))
                .collect(),
        ),
        Value::Object(map) => {
            let mut relation = None;
            let mut entries = Vec::with_capacity(map.len());
            for (key, value) in map {
                if key == "relation" {
                    match value {
                        Value::String(r) => relation = Some(r),
                        other => entries.push(PredicateNode::Raw {
                            key: Some(key),
                            value: other,
                        }),
                    }
                } else if is_reserved_key(&key) {
                    entries.push(PredicateNode::from_value(None, value));
                } else {
                    entries.push(PredicateNode::from_value(Some(key), value));
                }
            }
            (relation, entries)
        }
        _ => (None, Vec::new()),
    }
}

/// Inverse of [`parse_entries`]. Emits an array when there is nothing but
/// positional entries, otherwise an object with positional entries renumbered
/// from zero.
fn entries_to_value(relation: Option<&str>, entries: &[PredicateNode]) -> Value {
    if relation.is_none() && entries.iter().all(|e| e.key().is_none()) {
        return Value::Array(entries.iter().map(PredicateNode::to_value).collect());
    }

    let mut map = Map::new();
    if let Some(relation) = relation {
        map.insert("relation".to_string(), Value::String(relation.to_string()));
    }
    let mut position = 0usize;
    for entry in entries {
        let key = match entry.key() {
            Some(key) => key.to_string(),
            None => {
                let key = position.to_string();
                position += 1;
                key
            }
        };
        map.insert(key, entry.to_value());
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operator_parse_and_display() {
        assert_eq!(ClauseOperator::parse("IN"), ClauseOperator::In);
        assert_eq!(
            ClauseOperator::parse("not in"),
            ClauseOperator::Other("not in".to_string())
        );
        assert_eq!(ClauseOperator::parse("NOT IN").to_string(), "NOT IN");
        assert_eq!(ClauseOperator::In.to_string(), "IN");
    }

    #[test]
    fn test_clause_without_operator_round_trips_unchanged() {
        let source = json!([{"taxonomy": "venue", "terms": [4]}]);
        let tree = PredicateTree::from_value(source.clone());

        assert_eq!(tree.entries[0].as_leaf().unwrap().operator, None);
        assert_eq!(tree.to_value(), source);
    }

    #[test]
    fn test_non_string_operator_is_kept_verbatim() {
        let source = json!([{"taxonomy": "venue", "operator": 3, "terms": [4]}]);
        let tree = PredicateTree::from_value(source.clone());
        assert_eq!(tree.to_value(), source);
    }

    #[test]
    fn test_missing_operator_does_not_match_explicit_in() {
        let implicit = PredicateTree::from_value(json!([{"taxonomy": "genre", "terms": [1]}]));
        let explicit = TaxonomyClause::including("genre", [1]);
        assert!(!implicit.entries[0].as_leaf().unwrap().matches(&explicit));
    }

    #[test]
    fn test_loose_term_equality() {
        assert!(TermRef::Id(5).loosely_eq(&TermRef::Name("5".to_string())));
        assert!(!TermRef::Id(5).loosely_eq(&TermRef::Name("five".to_string())));
        assert!(TermRef::Name("rock".to_string()).loosely_eq(&TermRef::Name("rock".to_string())));
    }

    #[test]
    fn test_clause_matches_ignores_key() {
        let a = TaxonomyClause::including("genre", [1, 2]);
        let b = TaxonomyClause::including("genre", [1, 2]).with_key("named");
        assert!(a.matches(&b));

        let reordered = TaxonomyClause::including("genre", [2, 1]);
        assert!(!a.matches(&reordered));

        let with_field = TaxonomyClause::including("genre", [1, 2]).with_extra("field", json!("term_id"));
        assert!(!a.matches(&with_field));
    }

    #[test]
    fn test_parse_positional_keyed_and_relation() {
        let tree = PredicateTree::from_value(json!({
            "relation": "OR",
            "0": {"taxonomy": "genre", "terms": [3], "field": "term_id"},
            "custom": {"relation": "AND", "0": {"taxonomy": "venue", "operator": "NOT IN", "terms": ["hall"]}},
            "1": ""
        }));

        assert_eq!(tree.relation.as_deref(), Some("OR"));
        assert_eq!(tree.entries.len(), 3);

        let leaf = tree.entries[0].as_leaf().unwrap();
        assert_eq!(leaf.taxonomy, "genre");
        assert_eq!(leaf.operator, None);
        assert_eq!(leaf.term_ids(), vec![3]);
        assert_eq!(leaf.extra.get("field"), Some(&json!("term_id")));

        let group = tree.get("custom").and_then(PredicateNode::as_group).unwrap();
        assert_eq!(group.relation.as_deref(), Some("AND"));
        let inner = group.children[0].as_leaf().unwrap();
        assert_eq!(inner.operator, Some(ClauseOperator::parse("NOT IN")));
        assert_eq!(inner.terms, vec![TermRef::Name("hall".to_string())]);

        assert!(tree.entries[2].is_empty_marker());
    }

    #[test]
    fn test_malformed_top_level_is_empty() {
        assert!(PredicateTree::from_value(json!("oops")).is_empty());
        assert!(PredicateTree::from_value(json!(17)).is_empty());
        assert!(PredicateTree::from_value(Value::Null).is_empty());
    }

    #[test]
    fn test_unrecognised_entries_are_preserved() {
        let tree = PredicateTree::from_value(json!([42, true, {"taxonomy": "genre", "terms": 7}]));

        assert_eq!(tree.entries[0], PredicateNode::Raw { key: None, value: json!(42) });
        assert_eq!(tree.entries[1], PredicateNode::Raw { key: None, value: json!(true) });
        assert_eq!(tree.entries[2].as_leaf().unwrap().term_ids(), vec![7]);
        assert_eq!(tree.to_value()[0], json!(42));
    }

    #[test]
    fn test_to_value_shapes() {
        let positional = PredicateTree::new().with_entry(TaxonomyClause::including("genre", [1]));
        assert_eq!(
            positional.to_value(),
            json!([{"taxonomy": "genre", "operator": "IN", "terms": [1]}])
        );

        let keyed = PredicateTree::new()
            .with_relation("AND")
            .with_entry(TaxonomyClause::including("genre", [1]))
            .with_entry(PredicateGroup::keyed(
                "EventFestival",
                vec![TaxonomyClause::including("event_festival", [2]).into()],
            ));
        assert_eq!(
            keyed.to_value(),
            json!({
                "relation": "AND",
                "0": {"taxonomy": "genre", "operator": "IN", "terms": [1]},
                "EventFestival": [{"taxonomy": "event_festival", "operator": "IN", "terms": [2]}]
            })
        );
    }

    #[test]
    fn test_serde_round_trip_preserves_structure() {
        let source = json!({
            "relation": "AND",
            "0": {"taxonomy": "genre", "operator": "IN", "terms": [1, 2]},
            "EventFestival": {
                "relation": "OR",
                "0": {"taxonomy": "event_festival", "operator": "IN", "terms": [5]}
            }
        });

        let tree: PredicateTree = serde_json::from_value(source.clone()).unwrap();
        assert_eq!(serde_json::to_value(&tree).unwrap(), source);
    }
}
