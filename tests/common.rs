//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use formsmith::{
    Field, FieldType, FieldValue, FormBuilderStore, FormulaExecutor, RuleKind, SledStore,
    ValidationRule, WorkingForm,
};
use tempfile::TempDir;

/// A form builder store over a temporary sled database.
pub struct StoreFixture {
    pub store: FormBuilderStore<SledStore>,
    pub db: sled::Db,
    pub _temp_dir: TempDir,
}

impl StoreFixture {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let db = sled::Config::new()
            .path(temp_dir.path())
            .temporary(true)
            .open()
            .expect("Failed to open temporary database");
        let backend = SledStore::new(db.clone(), "form_builder").expect("Failed to open tree");
        Self {
            store: FormBuilderStore::new(backend),
            db,
            _temp_dir: temp_dir,
        }
    }

    /// A second store over the same database, as a fresh process would see it.
    pub fn reopen(&self) -> FormBuilderStore<SledStore> {
        let backend = SledStore::new(self.db.clone(), "form_builder").expect("Failed to open tree");
        FormBuilderStore::new(backend)
    }
}

pub fn fixed_executor() -> FormulaExecutor {
    FormulaExecutor::with_today(NaiveDate::from_ymd_opt(2025, 6, 15).expect("valid date"))
}

/// A sign-up form with plain, validated and derived fields.
pub fn signup_form() -> WorkingForm {
    WorkingForm {
        name: "Sign up".to_string(),
        fields: vec![
            Field::new("first", FieldType::Text, "First Name").required(),
            Field::new("last", FieldType::Text, "Last Name").required(),
            Field::new("email", FieldType::Text, "Email")
                .required()
                .with_rule(ValidationRule::new(
                    RuleKind::Email,
                    "Please enter a valid email address",
                )),
            Field::new("password", FieldType::Text, "Password")
                .with_rule(ValidationRule::min_length(8, "Too short"))
                .with_rule(ValidationRule::new(RuleKind::Password, "Weak password")),
            Field::new("dob", FieldType::Date, "Date of Birth"),
            Field::new("rooms", FieldType::Number, "Rooms").with_default(FieldValue::Number(1.0)),
            Field::new("guests", FieldType::Number, "Guests"),
            Field::new("full", FieldType::Text, "Full Name").derived(
                vec!["first".into(), "last".into()],
                r#"CONCAT(first_name, " ", last_name)"#,
            ),
            Field::new("age", FieldType::Number, "Age")
                .derived(vec!["dob".into()], "AGE(date_of_birth)"),
            Field::new("total", FieldType::Number, "Occupancy")
                .derived(vec!["rooms".into(), "guests".into()], "SUM(rooms, guests)"),
        ],
    }
}
