use filearray::construct::Store;
use filearray::error::FileArrayError;
use filearray::persist::parse_records;
use serde_json::{json, Value};

fn setup() -> Store {
    let records = parse_records(
        r#"[
            {"Name": "Al", "Age": 30, "ID": 1},
            {"Name": "Bo", "Age": 25, "ID": 2},
            {"Name": "Alma", "Age": 25, "ID": 3},
            {"Name": "Cy", "Age": 41, "ID": 4}
        ]"#,
    )
    .unwrap();
    Store::from_records(records).expect("store loads")
}

fn names(records: &[serde_json::Map<String, Value>]) -> Vec<&str> {
    records.iter().map(|r| r["Name"].as_str().unwrap()).collect()
}

#[test]
fn regex_search_matches_prefix() {
    let mut store = setup();
    let found = store.search("Name", &json!("^A")).expect("search ok").expect("matches");
    assert_eq!(names(&found), vec!["Al", "Alma"]);
    assert_eq!(store.last_match(), &[0, 2]);
}

#[test]
fn regex_search_is_unanchored_and_case_sensitive() {
    let mut store = setup();
    let found = store.search("Name", &json!("l")).unwrap().unwrap();
    assert_eq!(names(&found), vec!["Al", "Alma"]);
    assert!(store.search("Name", &json!("^a")).unwrap().is_none());
}

#[test]
fn string_pattern_matches_stringified_numbers() {
    let mut store = setup();
    let found = store.search("Age", &json!("^2")).unwrap().unwrap();
    assert_eq!(names(&found), vec!["Bo", "Alma"]);
}

#[test]
fn non_string_value_requires_strict_equality() {
    let mut store = setup();
    let found = store.search("Age", &json!(25)).unwrap().unwrap();
    assert_eq!(names(&found), vec!["Bo", "Alma"]);
    // a number never equals a string holding the same digits
    assert!(store.search("Name", &json!(30)).unwrap().is_none());
    assert!(store.search("Age", &json!(25.5)).unwrap().is_none());
}

#[test]
fn no_match_is_none_and_clears_cache() {
    let mut store = setup();
    store.search("Name", &json!("^A")).unwrap();
    assert!(store.search("Name", &json!("Zed")).unwrap().is_none());
    assert!(store.last_match().is_empty(), "cache replaced by the empty result");
}

#[test]
fn unknown_field_fails() {
    let mut store = setup();
    let err = store.search("Nope", &json!("x")).unwrap_err();
    assert!(matches!(err, FileArrayError::UnknownField(ref f) if f == "Nope"));
}

#[test]
fn invalid_pattern_fails() {
    let mut store = setup();
    let err = store.search("Name", &json!("(")).unwrap_err();
    assert!(matches!(err, FileArrayError::InvalidPattern(_)));
}

#[test]
fn unloaded_store_fails() {
    let mut store = Store::new(filearray::persist::PersistenceMode::InMemory.persistor());
    assert!(!store.is_loaded());
    let err = store.search("Name", &json!("x")).unwrap_err();
    assert!(matches!(err, FileArrayError::NotLoaded(_)));
}

#[test]
fn sort_is_stable_and_does_not_mutate() {
    let store = setup();
    let ascending = store.sort("Age", true).expect("sort ok");
    assert_eq!(names(&ascending), vec!["Bo", "Alma", "Al", "Cy"]);
    let descending = store.sort("Age", false).expect("sort ok");
    // ties keep their input order in both directions
    assert_eq!(names(&descending), vec!["Cy", "Al", "Bo", "Alma"]);
    assert_eq!(names(store.records().unwrap()), vec!["Al", "Bo", "Alma", "Cy"]);
}

#[test]
fn sort_strings_lexicographically() {
    let store = setup();
    let sorted = store.sort("Name", true).unwrap();
    assert_eq!(names(&sorted), vec!["Al", "Alma", "Bo", "Cy"]);
}

#[test]
fn descending_reversed_equals_ascending_without_ties() {
    let store = setup();
    let mut descending = store.sort("ID", false).unwrap();
    descending.reverse();
    assert_eq!(descending, store.sort("ID", true).unwrap());
}

#[test]
fn sort_with_mixed_and_missing_values() {
    let records = parse_records(r#"[{"V": "b", "ID": 1}, {"V": 2, "ID": 2}, {"ID": 3}, {"V": null, "ID": 4}, {"V": 1.5, "ID": 5}]"#).unwrap();
    let store = Store::from_records(records).unwrap();
    let ids: Vec<i64> = store
        .sort("V", true)
        .unwrap()
        .iter()
        .map(|r| r["ID"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![3, 4, 5, 2, 1]);
}
