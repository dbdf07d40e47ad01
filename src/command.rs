//! JSON commands executed against a [`Store`].
//!
//! A command is a JSON object tagged by `op`, for example
//! `{"op": "search", "field": "Name", "value": "^A"}`. Arguments are optional
//! on the wire so that an absent argument can be told apart from a falsy one:
//! `{"op": "search", "field": "Age", "value": null}` searches for `null`,
//! while leaving `value` out fails with a missing-argument error.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::construct::{required, Confirmation, Identity, Record, Store};
use crate::error::{FileArrayError, Result};
use crate::matcher::{DatePart, DEFAULT_DATE_FIELD};

// Present-but-null deserializes to Some(Value::Null) instead of None.
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    Search {
        #[serde(default, deserialize_with = "present")]
        field: Option<String>,
        #[serde(default, deserialize_with = "present")]
        value: Option<Value>,
    },
    Sort {
        #[serde(default, deserialize_with = "present")]
        field: Option<String>,
        #[serde(default)]
        ascending: Option<bool>,
    },
    Add {
        #[serde(default, deserialize_with = "present")]
        record: Option<Value>,
    },
    Delete {
        #[serde(default, deserialize_with = "present")]
        field: Option<String>,
        #[serde(default, deserialize_with = "present")]
        value: Option<Value>,
    },
    Edit {
        #[serde(default, deserialize_with = "present")]
        id: Option<Value>,
        #[serde(default, deserialize_with = "present")]
        record: Option<Value>,
    },
    Write,
    DateSort {
        #[serde(default, deserialize_with = "present")]
        field: Option<String>,
        #[serde(default)]
        ascending: Option<bool>,
        #[serde(default)]
        by: Option<String>,
    },
    DateNow {
        #[serde(default)]
        date: Option<String>,
        #[serde(default)]
        field: Option<String>,
    },
    TimeNow {
        #[serde(default, deserialize_with = "present")]
        start: Option<String>,
        #[serde(default, deserialize_with = "present")]
        end: Option<String>,
        #[serde(default)]
        time: Option<String>,
    },
    TimeNear {
        #[serde(default, deserialize_with = "present")]
        time: Option<String>,
        #[serde(default, deserialize_with = "present")]
        field: Option<String>,
    },
}

impl Command {
    pub fn parse(text: &str) -> Result<Command> {
        Ok(serde_json::from_str(text)?)
    }
    /// Commands that change the collection and should be written back.
    pub fn is_mutation(&self) -> bool {
        matches!(self, Command::Add { .. } | Command::Delete { .. } | Command::Edit { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Records(Vec<Record>),
    Record(Record),
    Nothing,
    Confirmed(Confirmation),
}

impl Outcome {
    pub fn to_json(&self) -> Value {
        match self {
            Outcome::Records(records) => {
                Value::Array(records.iter().cloned().map(Value::Object).collect())
            }
            Outcome::Record(record) => Value::Object(record.clone()),
            Outcome::Nothing => Value::Null,
            Outcome::Confirmed(confirmation) => Value::String(confirmation.to_string()),
        }
    }
}

impl From<Option<Vec<Record>>> for Outcome {
    fn from(found: Option<Vec<Record>>) -> Self {
        found.map_or(Outcome::Nothing, Outcome::Records)
    }
}

pub struct Engine<'s> {
    store: &'s mut Store,
    date_field: String,
}

impl<'s> Engine<'s> {
    pub fn new(store: &'s mut Store) -> Self {
        Self {
            store,
            date_field: DEFAULT_DATE_FIELD.to_string(),
        }
    }
    pub fn with_date_field<F: Into<String>>(mut self, field: F) -> Self {
        self.date_field = field.into();
        self
    }
    pub fn execute_str(&mut self, text: &str) -> Result<Outcome> {
        let command = Command::parse(text)?;
        self.execute(command)
    }
    pub fn execute(&mut self, command: Command) -> Result<Outcome> {
        self.store.validate_loaded()?;
        let outcome = match command {
            Command::Search { field, value } => {
                let (field, value) = (required("field", field)?, required("value", value)?);
                self.store.search(&field, &value)?.into()
            }
            Command::Sort { field, ascending } => {
                let field = required("field", field)?;
                Outcome::Records(self.store.sort(&field, ascending.unwrap_or(true))?)
            }
            Command::Add { record } => {
                let record = required("record", record)?;
                Outcome::Confirmed(self.store.add(record)?)
            }
            Command::Delete { field, value } => {
                let (field, value) = (required("field", field)?, required("value", value)?);
                Outcome::Confirmed(self.store.delete(&field, &value)?)
            }
            Command::Edit { id, record } => {
                let (id, record) = (required("id", id)?, required("record", record)?);
                let id = Identity::from_value(&id).ok_or_else(|| {
                    FileArrayError::InvalidArgument(format!("{} is not a valid ID", id))
                })?;
                Outcome::Confirmed(self.store.edit(id, record)?)
            }
            Command::Write => Outcome::Confirmed(self.store.write()?),
            Command::DateSort { field, ascending, by } => {
                let field = required("field", field)?;
                let by = by.as_deref().map(str::parse::<DatePart>).transpose()?;
                Outcome::Records(self.store.dates().sort(&field, ascending.unwrap_or(true), by)?)
            }
            Command::DateNow { date, field } => {
                let field = field.unwrap_or_else(|| self.date_field.clone());
                self.store.dates().on(field).now(date.as_deref())?.into()
            }
            Command::TimeNow { start, end, time } => {
                let (start, end) = (required("start", start)?, required("end", end)?);
                Outcome::Record(self.store.times().now(&start, &end, time.as_deref())?)
            }
            Command::TimeNear { time, field } => {
                let (time, field) = (required("time", time)?, required("field", field)?);
                Outcome::Record(self.store.times().near(&time, &field)?)
            }
        };
        Ok(outcome)
    }
}
