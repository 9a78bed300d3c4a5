//! Loading term files from disk and driving the filter controller with them.

use std::io::Write;

use facetbar_core::{Error, FilterConfig, FilterController, Query, TermQueryArgs, TermRepository};
use facetbar_store::InMemoryTermRepository;
use tempfile::NamedTempFile;

const FESTIVALS: &str = r#"{
    "taxonomy": "event_festival",
    "terms": [
        {"id": 3, "name": "Rock", "slug": "rock", "count": 2},
        {"id": 1, "name": "Jazz", "slug": "jazz", "count": 0},
        {"id": 2, "name": "Jazz:Live", "slug": "jazz-live", "parent": 1, "count": 7}
    ]
}"#;

fn write_term_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write term file");
    file
}

#[test]
fn test_load_from_file() {
    let file = write_term_file(FESTIVALS);
    let repo = InMemoryTermRepository::from_json_file(file.path()).unwrap();

    assert_eq!(repo.len(), 3);
    let names: Vec<String> = repo
        .fetch_all(&TermQueryArgs::new("event_festival"))
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, ["Jazz", "Jazz:Live", "Rock"]);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = InMemoryTermRepository::from_json_file(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn test_malformed_file_is_serialization_error() {
    let file = write_term_file(r#"{"terms": "nope"}"#);
    let err = InMemoryTermRepository::from_json_file(file.path()).unwrap_err();
    assert!(matches!(err, Error::Serialization(_)));
}

#[test]
fn test_controller_over_loaded_terms() {
    let file = write_term_file(FESTIVALS);
    let repo = InMemoryTermRepository::from_json_file(file.path()).unwrap();
    let mut controller = FilterController::new(repo, FilterConfig::default());

    let rows = controller.display_values();
    let values: Vec<u64> = rows.iter().map(|r| r.value).collect();
    assert_eq!(values, vec![1, 2, 3]);
    assert!(rows[0].class.contains("has-child"));
    assert!(rows[1].class.contains("tribe-child-cat"));

    controller.bind_selection(1u64);
    let query = controller.apply_to_query(Query::new("tribe_events"));
    let value = serde_json::to_value(&query).unwrap();

    assert_eq!(value["bypass_cache"], true);
    assert_eq!(
        value["predicates"]["EventFestival"]["0"]["terms"],
        serde_json::json!([1, 2])
    );
    assert_eq!(value["predicates"]["EventFestival"]["relation"], "AND");
}
