use crate::config::ConfigError;
use crate::schema::types::SchemaError;
use std::fmt;
use std::io;

/// Unified error type for the crate.
///
/// Form-level problems surface as [`SchemaError`]; everything that touches the
/// outside world (storage, files, configuration) gets its own variant.
#[derive(Debug)]
pub enum FormError {
    /// Errors related to forms, fields and formulas
    Schema(SchemaError),

    /// Errors raised by the key-value storage backend
    Storage(String),

    /// Errors related to IO operations
    Io(io::Error),

    /// Errors related to serialization/deserialization
    Serialization(String),

    /// Errors related to configuration
    Config(String),

    /// Other errors that don't fit into the above categories
    Other(String),
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema(err) => write!(f, "Schema error: {}", err),
            Self::Storage(msg) => write!(f, "Storage error: {}", msg),
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for FormError {}

impl From<SchemaError> for FormError {
    fn from(error: SchemaError) -> Self {
        FormError::Schema(error)
    }
}

impl From<io::Error> for FormError {
    fn from(error: io::Error) -> Self {
        FormError::Io(error)
    }
}

impl From<serde_json::Error> for FormError {
    fn from(error: serde_json::Error) -> Self {
        FormError::Serialization(error.to_string())
    }
}

impl From<sled::Error> for FormError {
    fn from(error: sled::Error) -> Self {
        FormError::Storage(error.to_string())
    }
}

impl From<ConfigError> for FormError {
    fn from(error: ConfigError) -> Self {
        FormError::Config(error.to_string())
    }
}

/// Result type alias for operations that can result in a FormError
pub type FormResult<T> = Result<T, FormError>;
