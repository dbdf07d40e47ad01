// used for persistence
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::construct::Record;
use crate::error::{FileArrayError, Result};

// ------------- Persistence -------------
/// Loads and writes back the records of one store.
///
/// A store acquires its collection through [`Persistor::load`] once, uses it
/// exclusively, and hands the mutated collection to [`Persistor::write`].
pub trait Persistor: Send {
    fn load(&mut self) -> Result<Vec<Record>>;
    fn write(&mut self, records: &[Record]) -> Result<()>;
    /// Human readable origin of the records, used in messages.
    fn source(&self) -> String;
}

#[derive(Debug, Clone)]
pub enum PersistenceMode {
    InMemory,
    File(PathBuf),
}

impl PersistenceMode {
    pub fn persistor(self) -> Box<dyn Persistor> {
        match self {
            PersistenceMode::InMemory => Box::new(InMemory::default()),
            PersistenceMode::File(path) => Box::new(JsonFile::new(path)),
        }
    }
}

/// Parses the text of a record file: a JSON array whose elements are all objects.
pub fn parse_records(text: &str) -> Result<Vec<Record>> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Array(items) = value else {
        return Err(FileArrayError::Parse {
            message: "expected a JSON array of records".to_string(),
            line: None,
            col: None,
        });
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(record) => Ok(record),
            other => Err(FileArrayError::Parse {
                message: format!("element {} is not a record: {}", i, other),
                line: None,
                col: None,
            }),
        })
        .collect()
}

/// A JSON file holding a single array of records.
#[derive(Debug)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Persistor for JsonFile {
    fn load(&mut self) -> Result<Vec<Record>> {
        let text = fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => FileArrayError::FileNotFound(self.path.display().to_string()),
            _ => FileArrayError::Parse {
                message: format!("failed to read {}: {}", self.path.display(), e),
                line: None,
                col: None,
            },
        })?;
        let records = parse_records(&text)?;
        info!(file = %self.path.display(), records = records.len(), "file was loaded");
        Ok(records)
    }
    fn write(&mut self, records: &[Record]) -> Result<()> {
        // serde_json pretty printing indents with two spaces
        let text = serde_json::to_string_pretty(records)
            .map_err(|e| FileArrayError::Write(e.to_string()))?;
        fs::write(&self.path, text).map_err(|e| {
            FileArrayError::Write(format!("failed to write {}: {}", self.path.display(), e))
        })?;
        info!(file = %self.path.display(), records = records.len(), "records written");
        Ok(())
    }
    fn source(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Keeps the written records in memory; handy for tests and scratch stores.
#[derive(Debug, Default)]
pub struct InMemory {
    records: Vec<Record>,
}

impl InMemory {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }
}

impl Persistor for InMemory {
    fn load(&mut self) -> Result<Vec<Record>> {
        Ok(self.records.clone())
    }
    fn write(&mut self, records: &[Record]) -> Result<()> {
        self.records = records.to_vec();
        Ok(())
    }
    fn source(&self) -> String {
        "memory".to_string()
    }
}
