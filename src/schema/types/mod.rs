pub mod errors;
pub mod field;
pub mod schema;
pub mod validation_rule;

pub use errors::SchemaError;
pub use field::{
    format_number, DerivedConfig, Field, FieldId, FieldType, FieldValue,
    SubmissionData,
};
pub use schema::{FormSchema, WorkingForm};
pub use validation_rule::{default_message, RuleKind, RuleValue, ValidationRule};
