pub mod editor;
pub mod types;
pub mod validator;

pub use validator::SchemaValidator;

// Re-export all types at the schema module level
pub use types::{
    DerivedConfig, Field, FieldId, FieldType, FieldValue, FormSchema, RuleKind, RuleValue,
    SchemaError, SubmissionData, ValidationRule, WorkingForm,
};
