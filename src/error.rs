use thiserror::Error;

#[derive(Error, Debug)]
pub enum FileArrayError {
    #[error("JSON data not loaded from {0}")]
    NotLoaded(String),
    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("Field \"{0}\" does not exist")]
    UnknownField(String),
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: &'static str, found: &'static str },
    #[error("Structure of the record does not match the existing records")]
    SchemaMismatch,
    #[error("No record with {field}: {value}")]
    NotFound { field: String, value: String },
    #[error("Field \"{field}\" does not match the date format dd.mm.yyyy: {value}")]
    InvalidDateFormat { field: String, value: String },
    #[error("Field \"{field}\" does not match the time format hh:mm: {value}")]
    InvalidTimeFormat { field: String, value: String },
    #[error("File not found: {0}")]
    FileNotFound(String),
    #[error("Parse error: {message}")]
    Parse { message: String, line: Option<usize>, col: Option<usize> },
    #[error("Write error: {0}")]
    Write(String),
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Identity mismatch: expected ID {expected}, record carries {found}")]
    IdentityMismatch { expected: String, found: String },
    #[error("Identity {0} is not unique")]
    DuplicateIdentity(String),
    #[error("No identity left above {0}")]
    IdentitiesExhausted(i64),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Lock poisoned: {0}")]
    Lock(String),
}

impl FileArrayError {
    /// True for failures caused by the caller's input rather than the environment.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            Self::FileNotFound(_)
                | Self::Write(_)
                | Self::Config(_)
                | Self::Lock(_)
                | Self::NotLoaded(_)
                | Self::IdentitiesExhausted(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, FileArrayError>;

// Helper conversions
impl From<serde_json::Error> for FileArrayError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse {
            message: e.to_string(),
            line: Some(e.line()),
            col: Some(e.column()),
        }
    }
}

impl From<regex::Error> for FileArrayError {
    fn from(e: regex::Error) -> Self { Self::InvalidPattern(e.to_string()) }
}

impl From<config::ConfigError> for FileArrayError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
