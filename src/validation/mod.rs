//! Rule-based validation of submitted form values.
//!
//! Every non-derived field is checked in form order. A required field without
//! a value reports `"<label> is required"` and nothing else; otherwise each of
//! the field's rules runs in order against the value's text and every failing
//! rule contributes its own message.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::schema::types::{Field, FieldId, RuleKind, SubmissionData, ValidationRule};

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex"));

/// Minimum password length accepted by the `password` rule.
pub const PASSWORD_MIN_LENGTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub field_id: FieldId,
    pub message: String,
}

impl ValidationError {
    pub fn new(field_id: impl Into<FieldId>, message: impl Into<String>) -> Self {
        Self {
            field_id: field_id.into(),
            message: message.into(),
        }
    }
}

pub struct ValidationEngine;

impl ValidationEngine {
    pub fn validate(fields: &[Field], values: &SubmissionData) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for field in fields.iter().filter(|f| !f.is_derived) {
            let value = values.get(&field.id).filter(|v| !v.is_empty());

            if field.required && value.is_none() {
                errors.push(ValidationError::new(
                    field.id.clone(),
                    format!("{} is required", field.label),
                ));
                continue;
            }

            let text = value.map(|v| v.to_text()).unwrap_or_default();
            for rule in &field.validation_rules {
                if !Self::rule_passes(rule, &text) {
                    errors.push(ValidationError::new(field.id.clone(), rule.message.clone()));
                }
            }
        }

        debug!("Validated {} fields: {} errors", fields.len(), errors.len());
        errors
    }

    pub fn rule_passes(rule: &ValidationRule, text: &str) -> bool {
        match rule.kind {
            RuleKind::NotEmpty => !text.trim().is_empty(),
            RuleKind::MinLength => match rule.threshold() {
                Some(min) => (text.chars().count() as f64) >= min,
                None => true,
            },
            RuleKind::MaxLength => match rule.threshold() {
                Some(max) => (text.chars().count() as f64) <= max,
                None => true,
            },
            RuleKind::Email => text.is_empty() || EMAIL.is_match(text),
            RuleKind::Password => text.is_empty() || is_acceptable_password(text),
        }
    }
}

/// At least [`PASSWORD_MIN_LENGTH`] characters including one digit.
fn is_acceptable_password(text: &str) -> bool {
    text.chars().count() >= PASSWORD_MIN_LENGTH && text.chars().any(|c| c.is_ascii_digit())
}

/// Convenience wrapper around [`ValidationEngine::validate`].
pub fn validate(fields: &[Field], values: &SubmissionData) -> Vec<ValidationError> {
    ValidationEngine::validate(fields, values)
}
