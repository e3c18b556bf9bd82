use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaError {
    NotFound(String),
    InvalidField(String),
    InvalidTransform(String),
    InvalidRule(String),
    InvalidData(String),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SchemaError::NotFound(msg) => write!(f, "Not found: {}", msg),
            SchemaError::InvalidField(msg) => write!(f, "Invalid field: {}", msg),
            SchemaError::InvalidTransform(msg) => write!(f, "Invalid transform: {}", msg),
            SchemaError::InvalidRule(msg) => write!(f, "Invalid rule: {}", msg),
            SchemaError::InvalidData(msg) => write!(f, "Invalid data: {}", msg),
        }
    }
}

impl std::error::Error for SchemaError {}
