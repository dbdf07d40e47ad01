// records are plain JSON objects
use serde_json::{Map, Value};

// the set of retained identities uses a fast hasher
use core::hash::BuildHasherDefault;
use seahash::SeaHasher;
use std::collections::HashSet;

// custom ordering of records by a field
use std::cmp::Ordering;

// used to print out readable forms of a construct
use std::fmt;

use regex::Regex;
use tracing::{debug, info, warn};

// our own stuff that we need
use crate::datatype::{natural_order, strictly_equal, stringify, Class, Shape};
use crate::error::{FileArrayError, Result};
use crate::persist::{InMemory, PersistenceMode, Persistor};

// ------------- Record -------------
pub type Record = Map<String, Value>;

/// Name of the field holding the unique identifier of a record.
pub const ID: &str = "ID";

/// Unwraps an optional argument, failing with `MissingArgument` only when it
/// is truly absent. Falsy values such as `0`, `""` or `null` are present.
pub fn required<T>(name: &'static str, argument: Option<T>) -> Result<T> {
    argument.ok_or(FileArrayError::MissingArgument(name))
}

// ------------- Identity -------------
#[derive(Eq, PartialEq, Hash, PartialOrd, Ord, Debug, Clone)]
pub enum Identity {
    Number(i64),
    Text(String),
}

impl Identity {
    pub fn from_value(value: &Value) -> Option<Identity> {
        match value {
            Value::Number(n) => n.as_i64().map(Identity::Number),
            Value::String(s) => Some(Identity::Text(s.clone())),
            _ => None,
        }
    }
    pub fn to_value(&self) -> Value {
        match self {
            Identity::Number(n) => Value::from(*n),
            Identity::Text(s) => Value::from(s.as_str()),
        }
    }
    fn of(record: &Record) -> Option<Identity> {
        record.get(ID).and_then(Identity::from_value)
    }
}
impl From<i64> for Identity {
    fn from(n: i64) -> Self {
        Identity::Number(n)
    }
}
impl From<&str> for Identity {
    fn from(s: &str) -> Self {
        Identity::Text(s.to_string())
    }
}
impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Identity::Number(n) => write!(f, "{}", n),
            Identity::Text(s) => write!(f, "{}", s),
        }
    }
}

pub type IdentityHasher = BuildHasherDefault<SeaHasher>;

#[derive(Debug, Default)]
pub struct IdentityGenerator {
    lower_bound: i64,
    retained: HashSet<Identity, IdentityHasher>,
}

impl IdentityGenerator {
    pub fn new() -> Self {
        Self::default()
    }
    // Identities found in loaded records are retained rather than generated.
    // Returns false if the identity was already retained.
    pub fn retain(&mut self, id: Identity) -> bool {
        let n = match &id {
            Identity::Number(n) => Some(*n),
            Identity::Text(t) => t.parse::<i64>().ok(),
        };
        if let Some(n) = n.filter(|n| *n > self.lower_bound) {
            self.lower_bound = n;
        }
        self.retained.insert(id)
    }
    pub fn check(&self, id: &Identity) -> bool {
        self.retained.contains(id)
    }
    // Released identities are forgotten but never handed out again.
    pub fn release(&mut self, id: &Identity) {
        self.retained.remove(id);
    }
    fn next(&self, textual: bool) -> Result<(i64, Identity)> {
        let mut n = self.lower_bound;
        loop {
            n = n
                .checked_add(1)
                .ok_or(FileArrayError::IdentitiesExhausted(self.lower_bound))?;
            let id = if textual { Identity::Text(n.to_string()) } else { Identity::Number(n) };
            if !self.retained.contains(&id) {
                return Ok((n, id));
            }
        }
    }
    // Next identity above the lower bound, as text when the records use text IDs.
    pub fn peek(&self, textual: bool) -> Result<Identity> {
        Ok(self.next(textual)?.1)
    }
    pub fn generate(&mut self, textual: bool) -> Result<Identity> {
        let (n, id) = self.next(textual)?;
        self.lower_bound = n;
        self.retained.insert(id.clone());
        Ok(id)
    }
    pub fn len(&self) -> usize {
        self.retained.len()
    }
}

// ------------- Confirmation -------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    Added(Identity),
    Deleted { field: String, value: String, count: usize },
    Edited(Identity),
    Written { records: usize },
}

impl fmt::Display for Confirmation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Confirmation::Added(id) => write!(f, "record was successfully added ID:{}", id),
            Confirmation::Deleted { field, value, count } => write!(
                f,
                "{} record(s) with {}: {} were successfully deleted",
                count, field, value
            ),
            Confirmation::Edited(id) => write!(f, "record with ID:{} was successfully edited", id),
            Confirmation::Written { records } => write!(f, "{} record(s) written", records),
        }
    }
}

// ------------- Store -------------
// One store holds the records of one file. The collection is absent until
// loaded, and once loaded it stays loaded.
pub struct Store {
    persistor: Box<dyn Persistor>,
    records: Option<Vec<Record>>,
    // shape every added or edited record must match
    template: Option<Shape>,
    identities: IdentityGenerator,
    // positions matched by the most recent search
    last_match: Vec<usize>,
}

impl Store {
    pub fn new(persistor: Box<dyn Persistor>) -> Self {
        Self {
            persistor,
            records: None,
            template: None,
            identities: IdentityGenerator::new(),
            last_match: Vec::new(),
        }
    }
    pub fn open(mode: PersistenceMode) -> Result<Self> {
        let mut store = Self::new(mode.persistor());
        store.load()?;
        Ok(store)
    }
    pub fn from_records(records: Vec<Record>) -> Result<Self> {
        let mut store = Self::new(Box::new(InMemory::new(records)));
        store.load()?;
        Ok(store)
    }

    // functions to move the collection in and out of the persistence layer
    pub fn load(&mut self) -> Result<()> {
        let mut records = self.persistor.load()?;
        let mut identities = IdentityGenerator::new();
        let mut unidentified = Vec::new();
        for (index, record) in records.iter().enumerate() {
            match record.get(ID) {
                None => unidentified.push(index),
                Some(value) => {
                    let id = Identity::from_value(value).ok_or_else(|| FileArrayError::Parse {
                        message: format!("record {} has an ID that is neither an integer nor a string: {}", index, value),
                        line: None,
                        col: None,
                    })?;
                    if !identities.retain(id.clone()) {
                        return Err(FileArrayError::DuplicateIdentity(id.to_string()));
                    }
                }
            }
        }
        let textual = records
            .iter()
            .find_map(|record| record.get(ID))
            .is_some_and(Value::is_string);
        for index in unidentified {
            let id = identities.generate(textual)?;
            warn!(record = index, id = %id, "record without ID was given one");
            records[index].insert(ID.to_string(), id.to_value());
        }
        self.template = records.first().map(Shape::of_record);
        info!(source = %self.persistor.source(), records = records.len(), "records loaded");
        self.records = Some(records);
        self.identities = identities;
        self.last_match.clear();
        Ok(())
    }
    pub fn write(&mut self) -> Result<Confirmation> {
        let Some(records) = self.records.as_ref() else {
            return Err(FileArrayError::NotLoaded(self.persistor.source()));
        };
        self.persistor.write(records)?;
        Ok(Confirmation::Written { records: records.len() })
    }

    // functions to access the owned state
    pub fn is_loaded(&self) -> bool {
        self.records.is_some()
    }
    pub fn records(&self) -> Result<&[Record]> {
        self.validate_loaded()?;
        Ok(self.records.as_deref().unwrap_or_default())
    }
    pub fn len(&self) -> usize {
        self.records.as_ref().map_or(0, Vec::len)
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    pub fn template(&self) -> Option<&Shape> {
        self.template.as_ref()
    }
    pub fn last_match(&self) -> &[usize] {
        &self.last_match
    }
    pub fn identities(&self) -> &IdentityGenerator {
        &self.identities
    }
    pub fn source(&self) -> String {
        self.persistor.source()
    }

    // validation that precedes every operation
    pub fn validate_loaded(&self) -> Result<()> {
        if self.records.is_none() {
            return Err(FileArrayError::NotLoaded(self.persistor.source()));
        }
        Ok(())
    }
    pub fn validate_field_exists(&self, field: &str) -> Result<()> {
        if !self.records()?.iter().any(|record| record.contains_key(field)) {
            return Err(FileArrayError::UnknownField(field.to_string()));
        }
        Ok(())
    }

    /// Finds the records whose `field` matches `value`.
    ///
    /// A string value is a regular expression tested against the textual form
    /// of the field (unanchored, case-sensitive). Any other value must be
    /// strictly equal. The matched positions replace the search index cache.
    /// Zero matches is `None`, not an error.
    pub fn search(&mut self, field: &str, value: &Value) -> Result<Option<Vec<Record>>> {
        self.validate_field_exists(field)?;
        let found = match value {
            Value::String(pattern) => {
                let regex = Regex::new(pattern)?;
                self.search_by(field, |candidate| regex.is_match(&stringify(candidate)))
            }
            other => self.search_by(field, |candidate| strictly_equal(candidate, other)),
        };
        debug!(field, value = %value, matches = self.last_match.len(), "search");
        Ok(found)
    }
    fn search_by<F>(&mut self, field: &str, predicate: F) -> Option<Vec<Record>>
    where
        F: Fn(&Value) -> bool,
    {
        self.last_match.clear();
        let mut found = Vec::new();
        for (index, record) in self.records.iter().flatten().enumerate() {
            if record.get(field).is_some_and(&predicate) {
                self.last_match.push(index);
                found.push(record.clone());
            }
        }
        if found.is_empty() { None } else { Some(found) }
    }

    /// Returns the records ordered by `field`, leaving the stored order intact.
    /// The sort is stable, and descending reverses the comparator so ties keep
    /// their input order either way.
    pub fn sort(&self, field: &str, ascending: bool) -> Result<Vec<Record>> {
        self.validate_field_exists(field)?;
        let mut sorted = self.records()?.to_vec();
        sorted.sort_by(|a, b| directed(natural_order(a.get(field), b.get(field)), ascending));
        Ok(sorted)
    }

    pub fn add(&mut self, record: Value) -> Result<Confirmation> {
        self.validate_loaded()?;
        let expected = self.template.as_ref().map_or(Class::Structured, Shape::class);
        let found = Class::of(&record);
        if found != expected {
            return Err(FileArrayError::TypeMismatch {
                expected: expected.data_type(),
                found: found.data_type(),
            });
        }
        let Value::Object(mut record) = record else {
            return Err(FileArrayError::SchemaMismatch);
        };
        let textual = self
            .template
            .as_ref()
            .and_then(|template| template.field(ID))
            .is_some_and(|shape| shape.class() == Class::Text);
        let id = self.identities.peek(textual)?;
        record.insert(ID.to_string(), id.to_value());
        let shape = Shape::of_record(&record);
        match &self.template {
            Some(template) if !shape.matches(template) => return Err(FileArrayError::SchemaMismatch),
            Some(_) => (),
            None => {
                debug!(template = %shape, "template taken from first added record");
                self.template = Some(shape);
            }
        }
        let id = self.identities.generate(textual)?;
        if let Some(records) = self.records.as_mut() {
            records.push(record);
        }
        debug!(id = %id, "record added");
        Ok(Confirmation::Added(id))
    }

    pub fn delete(&mut self, field: &str, value: &Value) -> Result<Confirmation> {
        self.search(field, value)?;
        if self.last_match.is_empty() {
            return Err(FileArrayError::NotFound {
                field: field.to_string(),
                value: stringify(value),
            });
        }
        let count = self.last_match.len();
        if let Some(records) = self.records.as_mut() {
            // highest position first so the remaining positions stay valid
            for &index in self.last_match.iter().rev() {
                let removed = records.remove(index);
                if let Some(id) = Identity::of(&removed) {
                    self.identities.release(&id);
                }
            }
        }
        self.last_match.clear();
        debug!(field, value = %value, count, "records deleted");
        Ok(Confirmation::Deleted {
            field: field.to_string(),
            value: stringify(value),
            count,
        })
    }

    pub fn edit(&mut self, id: Identity, record: Value) -> Result<Confirmation> {
        self.validate_loaded()?;
        let found = Class::of(&record);
        if found != Class::Structured {
            return Err(FileArrayError::TypeMismatch {
                expected: Class::Structured.data_type(),
                found: found.data_type(),
            });
        }
        let Value::Object(record) = record else {
            return Err(FileArrayError::SchemaMismatch);
        };
        match &self.template {
            Some(template) if Shape::of_record(&record).matches(template) => (),
            _ => return Err(FileArrayError::SchemaMismatch),
        }
        match Identity::of(&record) {
            Some(carried) if carried == id => (),
            carried => {
                return Err(FileArrayError::IdentityMismatch {
                    expected: id.to_string(),
                    found: carried.map_or_else(|| "no ID".to_string(), |c| c.to_string()),
                });
            }
        }
        self.search_by(ID, |candidate| Identity::from_value(candidate).as_ref() == Some(&id));
        let Some(&index) = self.last_match.first() else {
            return Err(FileArrayError::NotFound {
                field: ID.to_string(),
                value: id.to_string(),
            });
        };
        if let Some(records) = self.records.as_mut() {
            records[index] = record;
        }
        debug!(id = %id, "record edited");
        Ok(Confirmation::Edited(id))
    }
}

pub(crate) fn directed(ordering: Ordering, ascending: bool) -> Ordering {
    if ascending { ordering } else { ordering.reverse() }
}
