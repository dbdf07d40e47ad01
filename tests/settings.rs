use std::fs;
use std::path::PathBuf;

use filearray::error::FileArrayError;
use filearray::settings::Settings;

#[test]
fn file_values_override_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("filearray.toml");
    fs::write(&path, "data_dir = \"records\"\nautosave = false\n").unwrap();
    let settings = Settings::load(Some(path.as_path())).expect("settings load");
    assert_eq!(settings.data_dir, PathBuf::from("records"));
    assert!(!settings.autosave);
    // untouched keys keep their defaults
    assert_eq!(settings.listen, "127.0.0.1:5000");
    assert_eq!(settings.date_field, "Date");
}

#[test]
fn explicit_file_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    let err = Settings::load(Some(dir.path().join("absent.toml").as_path())).unwrap_err();
    assert!(matches!(err, FileArrayError::Config(_)));
}
