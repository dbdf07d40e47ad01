// used for the values held by records
use serde_json::{Map, Value};

// used to order values of the same class
use std::cmp::Ordering;
// used to print out readable forms of a shape
use std::fmt;

// ------------- Class -------------
// The coarse type of a value. Objects, arrays and null share a class, so a
// candidate record is only refined past this point by its shape.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Class {
    Boolean,
    Number,
    Text,
    Structured,
}

impl Class {
    pub fn of(value: &Value) -> Class {
        match value {
            Value::Bool(_) => Class::Boolean,
            Value::Number(_) => Class::Number,
            Value::String(_) => Class::Text,
            Value::Null | Value::Array(_) | Value::Object(_) => Class::Structured,
        }
    }
    pub fn data_type(&self) -> &'static str {
        match self {
            Class::Boolean => "boolean",
            Class::Number => "number",
            Class::Text => "string",
            Class::Structured => "object",
        }
    }
}
impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.data_type())
    }
}

// ------------- Shape -------------
/// Recursive descriptor of the field names and per-field classes of a value.
///
/// The template of a store is the shape of the first record it sees. Later
/// records are accepted only if their shape [`matches`](Shape::matches) it.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Shape {
    Null,
    Scalar(Class),
    List,
    Record(Vec<(String, Shape)>),
}

impl Shape {
    pub fn of(value: &Value) -> Shape {
        match value {
            Value::Null => Shape::Null,
            Value::Array(_) => Shape::List,
            Value::Object(fields) => Shape::of_record(fields),
            other => Shape::Scalar(Class::of(other)),
        }
    }
    pub fn of_record(fields: &Map<String, Value>) -> Shape {
        let mut fields: Vec<(String, Shape)> = fields
            .iter()
            .map(|(name, value)| (name.clone(), Shape::of(value)))
            .collect();
        fields.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        Shape::Record(fields)
    }
    pub fn class(&self) -> Class {
        match self {
            Shape::Scalar(class) => *class,
            Shape::Null | Shape::List | Shape::Record(_) => Class::Structured,
        }
    }
    pub fn field(&self, name: &str) -> Option<&Shape> {
        match self {
            Shape::Record(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, shape)| shape),
            _ => None,
        }
    }
    /// Structural comparison: records need identical field sets whose fields
    /// match recursively, a record never matches a non-record, and any other
    /// pair only needs the same class.
    pub fn matches(&self, template: &Shape) -> bool {
        match (self, template) {
            (Shape::Record(candidate), Shape::Record(template)) => {
                candidate.len() == template.len()
                    && candidate
                        .iter()
                        .zip(template.iter())
                        .all(|((cn, cs), (tn, ts))| cn == tn && cs.matches(ts))
            }
            (Shape::Record(_), _) | (_, Shape::Record(_)) => false,
            (candidate, template) => candidate.class() == template.class(),
        }
    }
}
impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Shape::Null => write!(f, "null"),
            Shape::List => write!(f, "array"),
            Shape::Scalar(class) => write!(f, "{}", class),
            Shape::Record(fields) => {
                let mut s = String::new();
                for (name, shape) in fields {
                    s += &format!("{}: {},", name, shape);
                }
                s.pop();
                write!(f, "{{{}}}", s)
            }
        }
    }
}

// ------------- Comparisons -------------

/// Compares two values by type and, when `strict`, by value or structure.
///
/// Non-strict only compares classes. Strict requires equal values for
/// primitives, and identical field sets with recursively matching fields for
/// records. Null never matches a record.
pub fn is_equal_by_type(candidate: &Value, template: &Value, strict: bool) -> bool {
    if Class::of(candidate) != Class::of(template) {
        return false;
    }
    if !strict {
        return true;
    }
    match (candidate, template) {
        (Value::Object(_), Value::Object(_)) => Shape::of(candidate).matches(&Shape::of(template)),
        _ => strictly_equal(candidate, template),
    }
}

/// Same class and same value. Numbers compare numerically, so `1` equals `1.0`.
pub fn strictly_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        _ => a == b,
    }
}

/// The text a pattern is tested against.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// missing < null < boolean < number < string < array < object
fn rank(value: Option<&Value>) -> u8 {
    match value {
        None => 0,
        Some(Value::Null) => 1,
        Some(Value::Bool(_)) => 2,
        Some(Value::Number(_)) => 3,
        Some(Value::String(_)) => 4,
        Some(Value::Array(_)) => 5,
        Some(Value::Object(_)) => 6,
    }
}

/// Total order over (possibly missing) field values: natural order within a
/// class, class rank across classes. Arrays and objects of equal rank tie.
pub fn natural_order(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x
                .as_f64()
                .unwrap_or(f64::NAN)
                .total_cmp(&y.as_f64().unwrap_or(f64::NAN)),
        },
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

