//! Formsmith: a form-builder core.
//!
//! Forms are assembled from typed fields, may carry validation rules and
//! derived fields computed by a small formula language, can be previewed as an
//! interactive session, and are persisted as one JSON collection in a
//! key-value store.

pub mod config;
pub mod error;
pub mod logging;
pub mod preview;
pub mod schema;
pub mod store;
pub mod transform;
pub mod validation;

pub use config::{load_config, ConfigError, FormsmithConfig, StorageConfig};
pub use error::{FormError, FormResult};
pub use logging::LogConfig;
pub use preview::{Control, ControlKind, PreviewSession, PreviewStatus, SubmitOutcome};
pub use schema::{
    DerivedConfig, Field, FieldId, FieldType, FieldValue, FormSchema, RuleKind, RuleValue,
    SchemaError, SchemaValidator, SubmissionData, ValidationRule, WorkingForm,
};
pub use store::{
    FormBuilderState, FormBuilderStore, KeyValueStore, MemoryStore, SaveOutcome, SledStore,
    SAVED_FORMS_KEY,
};
pub use transform::{evaluate, FormulaExecutor};
pub use validation::{validate, ValidationEngine, ValidationError};
