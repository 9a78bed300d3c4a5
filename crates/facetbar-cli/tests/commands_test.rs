//! Running facetbar commands against term and query files.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use facetbar_cli::{run, Cli};
use facetbar_core::FilterConfig;
use serde_json::{json, Value};
use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
    terms: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let terms = dir.path().join("terms.json");
        let doc = json!([
            {"id": 1, "name": "Jazz", "slug": "jazz", "count": 2},
            {"id": 2, "name": "Jazz:Live", "slug": "jazz-live", "parent": 1, "count": 1},
            {"id": 3, "name": "Rock", "slug": "rock", "count": 0}
        ]);
        fs::write(&terms, doc.to_string()).expect("write terms");
        Self { dir, terms }
    }

    fn write_query(&self, query: Value) -> PathBuf {
        let path = self.dir.path().join("query.json");
        fs::write(&path, query.to_string()).expect("write query");
        path
    }

    fn run(&self, args: &[&str]) -> Value {
        let terms = self.terms.to_string_lossy().into_owned();
        let mut argv = vec!["facetbar", args[0], "--terms", terms.as_str()];
        argv.extend_from_slice(&args[1..]);
        let cli = Cli::try_parse_from(argv).expect("valid arguments");
        let output = run(&cli, FilterConfig::default()).expect("command succeeds");
        serde_json::from_str(&output).expect("json output")
    }
}

#[test]
fn test_values_hides_empty_terms() {
    let fixture = Fixture::new();
    let rows = fixture.run(&["values"]);

    let values: Vec<u64> = rows
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|r| r["value"].as_u64())
        .collect();
    assert_eq!(values, vec![1, 2]);
    assert_eq!(rows[1]["depth"], 1);
    assert_eq!(rows[1]["data"]["slug"], "jazz-live");
}

#[test]
fn test_values_show_empty() {
    let fixture = Fixture::new();
    let rows = fixture.run(&["values", "--show-empty"]);
    assert_eq!(rows.as_array().map(Vec::len), Some(3));
}

#[test]
fn test_apply_nested_default() {
    let fixture = Fixture::new();
    let query = fixture.run(&["apply", "--select", "1"]);

    assert_eq!(query["subject_type"], "tribe_events");
    assert_eq!(query["bypass_cache"], true);
    assert_eq!(
        query["predicates"],
        json!({
            "EventFestival": {
                "relation": "AND",
                "0": {"taxonomy": "event_festival", "operator": "IN", "terms": [1, 2]}
            }
        })
    );
}

#[test]
fn test_apply_flat_with_relation_into_existing_query() {
    let fixture = Fixture::new();
    let query_file = fixture.write_query(json!({
        "post_type": "tribe_events",
        "tax_query": [{"taxonomy": "venue", "terms": ["main"], "operator": "IN"}, ""]
    }));
    let query_path = query_file.to_string_lossy().into_owned();

    let query = fixture.run(&[
        "apply",
        "--query",
        &query_path,
        "--select",
        "1,3",
        "--multiselect",
        "--flat",
        "--relation",
        "OR",
    ]);

    assert_eq!(
        query["predicates"],
        json!({
            "relation": "OR",
            "0": {"taxonomy": "venue", "operator": "IN", "terms": ["main"]},
            "1": {"taxonomy": "event_festival", "operator": "IN", "terms": [1, 3]}
        })
    );
}

#[test]
fn test_apply_other_subject_type_is_untouched() {
    let fixture = Fixture::new();
    let query = fixture.run(&["apply", "--select", "1", "--subject-type", "post"]);

    assert_eq!(query["subject_type"], "post");
    assert_eq!(query["bypass_cache"], false);
    assert_eq!(query["predicates"], json!([]));
}

#[test]
fn test_apply_without_relation_emits_positional_list() {
    let fixture = Fixture::new();
    let query = fixture.run(&["apply", "--select", "2", "--flat", "--no-relation"]);

    assert_eq!(
        query["predicates"],
        json!([{"taxonomy": "event_festival", "operator": "IN", "terms": [2]}])
    );
}
