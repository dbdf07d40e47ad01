//! Date and time views over a [`Store`].
//!
//! Both views borrow a store and add format checks and domain comparisons on
//! top of its search and sort. Dates are `dd.mm.yyyy`, times are zero padded
//! `hh:mm`, so plain string comparison of two times is chronological within
//! a day.

use std::str::FromStr;

use chrono::Local;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::construct::{directed, Record, Store};
use crate::datatype::stringify;
use crate::error::{FileArrayError, Result};

lazy_static! {
    static ref DATE: Regex = Regex::new(r"^[0-9]{2}\.[0-9]{2}\.[0-9]{4}$").unwrap();
    static ref TIME: Regex = Regex::new(r"^[0-9]{2}:[0-9]{2}$").unwrap();
}

pub const DEFAULT_DATE_FIELD: &str = "Date";

// ------------- Dates -------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePart {
    Day,
    Month,
    Year,
}

impl FromStr for DatePart {
    type Err = FileArrayError;
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "day" => Ok(DatePart::Day),
            "month" => Ok(DatePart::Month),
            "year" => Ok(DatePart::Year),
            other => Err(FileArrayError::InvalidArgument(format!(
                "invalid sort criterion \"{}\"",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Date {
    day: u32,
    month: u32,
    year: u32,
}

impl Date {
    fn of(field: &str, record: &Record) -> Result<Date> {
        let value = record.get(field);
        let invalid = || FileArrayError::InvalidDateFormat {
            field: field.to_string(),
            value: value.map(stringify).unwrap_or_default(),
        };
        let text = value
            .and_then(Value::as_str)
            .filter(|text| DATE.is_match(text))
            .ok_or_else(invalid)?;
        let number = |range: std::ops::Range<usize>| text[range].parse::<u32>().map_err(|_| invalid());
        Ok(Date {
            day: number(0..2)?,
            month: number(3..5)?,
            year: number(6..10)?,
        })
    }
    fn part(&self, part: DatePart) -> u32 {
        match part {
            DatePart::Day => self.day,
            DatePart::Month => self.month,
            DatePart::Year => self.year,
        }
    }
}

pub struct DateWindow<'s> {
    store: &'s mut Store,
    field: String,
}

impl<'s> DateWindow<'s> {
    pub fn new(store: &'s mut Store) -> Self {
        Self {
            store,
            field: DEFAULT_DATE_FIELD.to_string(),
        }
    }
    /// Field used by [`now`](Self::now) and [`today`](Self::today).
    pub fn on<F: Into<String>>(mut self, field: F) -> Self {
        self.field = field.into();
        self
    }

    /// Sorts by a date component, or by the whole field when `by` is `None`.
    /// Every record's field must be a `dd.mm.yyyy` date before anything is sorted.
    pub fn sort(&self, field: &str, ascending: bool, by: Option<DatePart>) -> Result<Vec<Record>> {
        let Some(part) = by else {
            return self.store.sort(field, ascending);
        };
        self.store.validate_field_exists(field)?;
        let mut keyed = self
            .store
            .records()?
            .iter()
            .map(|record| Ok((Date::of(field, record)?.part(part), record.clone())))
            .collect::<Result<Vec<(u32, Record)>>>()?;
        keyed.sort_by(|a, b| directed(a.0.cmp(&b.0), ascending));
        Ok(keyed.into_iter().map(|(_, record)| record).collect())
    }

    /// Records whose date field contains `date`, or today's date when none is
    /// given. The date is matched literally, so `"31.12.1999 10:00"` is found
    /// by `"31.12.1999"`.
    pub fn now(&mut self, date: Option<&str>) -> Result<Option<Vec<Record>>> {
        let date = match date {
            Some(date) if DATE.is_match(date) => date.to_string(),
            Some(date) => {
                return Err(FileArrayError::InvalidDateFormat {
                    field: self.field.clone(),
                    value: date.to_string(),
                });
            }
            None => Local::now().format("%d.%m.%Y").to_string(),
        };
        self.store.search(&self.field, &Value::String(regex::escape(&date)))
    }
    pub fn today(&mut self) -> Result<Option<Vec<Record>>> {
        self.now(None)
    }
}

// ------------- Times -------------
fn checked_time(field: &str, time: &str) -> Result<()> {
    if TIME.is_match(time) {
        Ok(())
    } else {
        Err(FileArrayError::InvalidTimeFormat {
            field: field.to_string(),
            value: time.to_string(),
        })
    }
}

fn time_of<'r>(field: &str, record: &'r Record) -> Result<&'r str> {
    let value = record.get(field);
    match value.and_then(Value::as_str) {
        Some(time) if TIME.is_match(time) => Ok(time),
        _ => Err(FileArrayError::InvalidTimeFormat {
            field: field.to_string(),
            value: value.map(stringify).unwrap_or_default(),
        }),
    }
}

pub struct TimeWindow<'s> {
    store: &'s Store,
}

impl<'s> TimeWindow<'s> {
    pub fn new(store: &'s Store) -> Self {
        Self { store }
    }

    /// First record whose `[start, end]` interval contains `time`, defaulting
    /// to the current local time. Records lacking either field are skipped.
    pub fn now(&self, start: &str, end: &str, time: Option<&str>) -> Result<Record> {
        let time = match time {
            Some(time) => {
                checked_time("time", time)?;
                time.to_string()
            }
            None => Local::now().format("%H:%M").to_string(),
        };
        self.store.validate_field_exists(start)?;
        self.store.validate_field_exists(end)?;
        for record in self.store.records()? {
            if !(record.contains_key(start) && record.contains_key(end)) {
                continue;
            }
            let (from, to) = (time_of(start, record)?, time_of(end, record)?);
            if from <= time.as_str() && time.as_str() <= to {
                return Ok(record.clone());
            }
        }
        Err(FileArrayError::NotFound {
            field: format!("[{},{}]", start, end),
            value: time,
        })
    }

    /// First record, in ascending `field` order, strictly later than `time`.
    /// Records without the field are skipped.
    pub fn near(&self, time: &str, field: &str) -> Result<Record> {
        checked_time("time", time)?;
        for record in self.store.sort(field, true)? {
            if !record.contains_key(field) {
                continue;
            }
            if time_of(field, &record)? > time {
                return Ok(record);
            }
        }
        Err(FileArrayError::NotFound {
            field: field.to_string(),
            value: format!("> {}", time),
        })
    }
}

impl Store {
    pub fn dates(&mut self) -> DateWindow<'_> {
        DateWindow::new(self)
    }
    pub fn times(&self) -> TimeWindow<'_> {
        TimeWindow::new(self)
    }
}
