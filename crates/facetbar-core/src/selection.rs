//! User selections and their normalisation to term ids.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::term::TermId;

/// Coerce a raw value to a non-negative term id.
///
/// Leading whitespace and a sign are accepted, the longest run of digits
/// that follows is used, the sign is dropped and anything non-numeric is 0.
/// Values beyond the id range saturate.
///
/// ```
/// use facetbar_core::selection::absint;
///
/// assert_eq!(absint("12"), 12);
/// assert_eq!(absint(" -7"), 7);
/// assert_eq!(absint("4abc"), 4);
/// assert_eq!(absint("abc"), 0);
/// ```
pub fn absint(raw: &str) -> TermId {
    let s = raw.trim_start();
    let s = s.strip_prefix(['-', '+']).unwrap_or(s);
    s.chars()
        .take_while(|c| c.is_ascii_digit())
        .fold(0u64, |acc, c| {
            acc.saturating_mul(10)
                .saturating_add(u64::from(c as u8 - b'0'))
        })
}

/// A selection as submitted by the user: one or more raw values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection {
    raw: Vec<String>,
}

impl Selection {
    pub fn new<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self {
            raw: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn single(value: impl Into<String>) -> Self {
        Self {
            raw: vec![value.into()],
        }
    }

    /// Read a selection from a request value: a string, a number, or an
    /// array of those. Returns `None` when nothing was selected.
    pub fn from_value(value: &Value) -> Option<Self> {
        let raw: Vec<String> = match value {
            Value::Array(values) => values.iter().filter_map(scalar_to_string).collect(),
            other => scalar_to_string(other).into_iter().collect(),
        };
        let selection = Self { raw };
        (!selection.is_empty()).then_some(selection)
    }

    pub fn raw(&self) -> &[String] {
        &self.raw
    }

    /// True when nothing usable was selected: no values, or a single blank
    /// or `"0"` value.
    pub fn is_empty(&self) -> bool {
        match self.raw.as_slice() {
            [] => true,
            [only] => {
                let only = only.trim();
                only.is_empty() || only == "0"
            }
            _ => false,
        }
    }

    /// The first selected value as an id; the anchor of single-select
    /// descendant expansion.
    pub fn first_id(&self) -> Option<TermId> {
        self.raw.first().map(|v| absint(v)).filter(|id| *id != 0)
    }

    /// Every raw value coerced to an id, zeros and repeats dropped.
    pub fn ids(&self) -> Vec<TermId> {
        dedup_ids(self.raw.iter().map(|v| absint(v)))
    }

    /// Multi-select normalisation: each raw value may itself be a
    /// comma-separated list; blank and `"0"` items are dropped before
    /// coercion, zeros and repeats after.
    pub fn list_ids(&self) -> Vec<TermId> {
        dedup_ids(
            self.raw
                .iter()
                .flat_map(|v| v.split(','))
                .map(str::trim)
                .filter(|item| !item.is_empty() && *item != "0")
                .map(absint),
        )
    }
}

impl From<TermId> for Selection {
    fn from(id: TermId) -> Self {
        Self::single(id.to_string())
    }
}

impl From<&str> for Selection {
    fn from(value: &str) -> Self {
        Self::single(value)
    }
}

/// Keep the first occurrence of each non-zero id, in order.
pub(crate) fn dedup_ids(ids: impl IntoIterator<Item = TermId>) -> Vec<TermId> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter()
        .filter(|id| *id != 0 && seen.insert(*id))
        .collect()
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absint_edge_cases() {
        assert_eq!(absint(""), 0);
        assert_eq!(absint("+15"), 15);
        assert_eq!(absint("3.9"), 3);
        assert_eq!(absint("99999999999999999999999"), u64::MAX);
    }

    #[test]
    fn test_empty_selections() {
        assert!(Selection::default().is_empty());
        assert!(Selection::single("").is_empty());
        assert!(Selection::single(" 0 ").is_empty());
        assert!(!Selection::single("3").is_empty());
        assert!(!Selection::new(["0", "4"]).is_empty());
    }

    #[test]
    fn test_from_value() {
        assert_eq!(Selection::from_value(&json!("5")), Some(Selection::single("5")));
        assert_eq!(Selection::from_value(&json!(5)), Some(Selection::single("5")));
        assert_eq!(
            Selection::from_value(&json!(["1", 2, null])),
            Some(Selection::new(["1", "2"]))
        );
        assert_eq!(Selection::from_value(&json!("")), None);
        assert_eq!(Selection::from_value(&json!(null)), None);
        assert_eq!(Selection::from_value(&json!([])), None);
    }

    #[test]
    fn test_first_id() {
        assert_eq!(Selection::new(["7", "8"]).first_id(), Some(7));
        assert_eq!(Selection::single("jazz").first_id(), None);
    }

    #[test]
    fn test_list_ids_splits_and_filters() {
        let selection = Selection::new(["1, 2,,0", "3", "2", " "]);
        assert_eq!(selection.list_ids(), vec![1, 2, 3]);
    }

    #[test]
    fn test_ids_coerces_each_value() {
        let selection = Selection::new(["-4", "x", "4", "5"]);
        assert_eq!(selection.ids(), vec![4, 5]);
    }

    #[test]
    fn test_serde_is_transparent() {
        let selection: Selection = serde_json::from_value(json!(["1", "2"])).unwrap();
        assert_eq!(selection.raw(), ["1", "2"]);
        assert_eq!(serde_json::to_value(&selection).unwrap(), json!(["1", "2"]));
    }
}
