use filearray::command::{Command, Engine, Outcome};
use filearray::construct::Store;
use filearray::error::FileArrayError;
use filearray::persist::{parse_records, InMemory};
use serde_json::json;

fn setup() -> Store {
    let records = parse_records(
        r#"[
            {"Name": "Al", "Age": 30, "Date": "31.12.1999", "ID": 1},
            {"Name": "Bo", "Age": 0, "Date": "01.01.2000", "ID": 2}
        ]"#,
    )
    .unwrap();
    Store::from_records(records).expect("store loads")
}

#[test]
fn absent_arguments_are_missing() {
    let mut store = setup();
    let mut engine = Engine::new(&mut store);
    let err = engine.execute(Command::Search { field: None, value: None }).unwrap_err();
    assert!(matches!(err, FileArrayError::MissingArgument("field")));
    let err = engine.execute_str(r#"{"op": "search", "field": "Name"}"#).unwrap_err();
    assert!(matches!(err, FileArrayError::MissingArgument("value")));
    let err = engine.execute_str(r#"{"op": "add"}"#).unwrap_err();
    assert!(matches!(err, FileArrayError::MissingArgument("record")));
}

#[test]
fn falsy_arguments_are_present() {
    let mut store = setup();
    let mut engine = Engine::new(&mut store);
    let found = engine.execute_str(r#"{"op": "search", "field": "Age", "value": 0}"#).unwrap();
    assert_eq!(found.to_json(), json!([{"Name": "Bo", "Age": 0, "Date": "01.01.2000", "ID": 2}]));
    let none = engine.execute_str(r#"{"op": "search", "field": "Age", "value": null}"#).unwrap();
    assert_eq!(none, Outcome::Nothing);
    let empty = engine.execute_str(r#"{"op": "search", "field": "Name", "value": ""}"#).unwrap();
    assert!(matches!(empty, Outcome::Records(records) if records.len() == 2));
}

#[test]
fn unloaded_store_is_checked_first() {
    let mut store = Store::new(Box::new(InMemory::default()));
    let err = Engine::new(&mut store).execute(Command::Search { field: None, value: None }).unwrap_err();
    assert!(matches!(err, FileArrayError::NotLoaded(_)));
}

#[test]
fn malformed_commands_fail_to_parse() {
    assert!(matches!(Command::parse("{"), Err(FileArrayError::Parse { .. })));
    assert!(matches!(Command::parse(r#"{"op": "drop"}"#), Err(FileArrayError::Parse { .. })));
    assert_eq!(Command::parse(r#"{"op": "write"}"#).unwrap(), Command::Write);
}

#[test]
fn mutations_are_flagged() {
    assert!(Command::parse(r#"{"op": "add", "record": {}}"#).unwrap().is_mutation());
    assert!(Command::parse(r#"{"op": "delete"}"#).unwrap().is_mutation());
    assert!(!Command::parse(r#"{"op": "sort", "field": "Name"}"#).unwrap().is_mutation());
    assert!(!Command::Write.is_mutation());
}

#[test]
fn mutating_commands_report_confirmations() {
    let mut store = setup();
    let mut engine = Engine::new(&mut store);
    let added = engine
        .execute_str(r#"{"op": "add", "record": {"Name": "Cy", "Age": 41, "Date": "02.02.2002"}}"#)
        .unwrap();
    assert_eq!(added.to_json(), json!("record was successfully added ID:3"));
    let edited = engine
        .execute_str(r#"{"op": "edit", "id": 3, "record": {"Name": "Cy", "Age": 42, "Date": "02.02.2002", "ID": 3}}"#)
        .unwrap();
    assert_eq!(edited.to_json(), json!("record with ID:3 was successfully edited"));
    let deleted = engine.execute_str(r#"{"op": "delete", "field": "Name", "value": "^[AB]"}"#).unwrap();
    assert_eq!(deleted.to_json(), json!("2 record(s) with Name: ^[AB] were successfully deleted"));
    let written = engine.execute_str(r#"{"op": "write"}"#).unwrap();
    assert_eq!(written.to_json(), json!("1 record(s) written"));
    assert_eq!(store.len(), 1);
}

#[test]
fn edit_id_must_be_integer_or_string() {
    let mut store = setup();
    let err = Engine::new(&mut store)
        .execute_str(r#"{"op": "edit", "id": true, "record": {}}"#)
        .unwrap_err();
    assert!(matches!(err, FileArrayError::InvalidArgument(_)));
}

#[test]
fn sort_defaults_to_ascending() {
    let mut store = setup();
    let sorted = Engine::new(&mut store).execute_str(r#"{"op": "sort", "field": "Age"}"#).unwrap();
    assert_eq!(sorted.to_json()[0]["Name"], json!("Bo"));
}

#[test]
fn date_and_time_commands() {
    let mut store = setup();
    let mut engine = Engine::new(&mut store);
    let found = engine.execute_str(r#"{"op": "date_now", "date": "31.12.1999"}"#).unwrap();
    assert_eq!(found.to_json()[0]["Name"], json!("Al"));
    let sorted = engine
        .execute_str(r#"{"op": "date_sort", "field": "Date", "ascending": false, "by": "year"}"#)
        .unwrap();
    assert_eq!(sorted.to_json()[0]["Name"], json!("Bo"));
    let err = engine
        .execute_str(r#"{"op": "date_sort", "field": "Date", "by": "week"}"#)
        .unwrap_err();
    assert!(matches!(err, FileArrayError::InvalidArgument(_)));
    let err = engine.execute_str(r#"{"op": "time_near", "time": "08:00"}"#).unwrap_err();
    assert!(matches!(err, FileArrayError::MissingArgument("field")));
}

#[test]
fn date_field_is_configurable() {
    let records = parse_records(r#"[{"Due": "05.05.2005", "ID": 1}]"#).unwrap();
    let mut store = Store::from_records(records).unwrap();
    let found = Engine::new(&mut store)
        .with_date_field("Due")
        .execute_str(r#"{"op": "date_now", "date": "05.05.2005"}"#)
        .unwrap();
    assert!(matches!(found, Outcome::Records(records) if records.len() == 1));
}

#[test]
fn time_commands_return_single_records() {
    let records = parse_records(r#"[{"Start": "08:00", "End": "09:00", "ID": 1}]"#).unwrap();
    let mut store = Store::from_records(records).unwrap();
    let mut engine = Engine::new(&mut store);
    let now = engine
        .execute_str(r#"{"op": "time_now", "start": "Start", "end": "End", "time": "08:30"}"#)
        .unwrap();
    assert_eq!(now.to_json()["ID"], json!(1));
    let near = engine.execute_str(r#"{"op": "time_near", "time": "07:00", "field": "Start"}"#).unwrap();
    assert!(matches!(near, Outcome::Record(_)));
}
