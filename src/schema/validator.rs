use std::collections::HashSet;

use log::debug;

use super::types::{Field, SchemaError, WorkingForm};

/// Validates the structure of a form before it is imported or previewed.
///
/// The validator checks that field ids are unique, that choice fields carry
/// options, that length rules carry a numeric threshold and that no derived
/// field reads itself or another derived field. A parent id that no longer
/// exists is allowed: removing a field leaves it behind, and the formula reads
/// it as empty text.
pub struct SchemaValidator<'a> {
    form: &'a WorkingForm,
}

impl<'a> SchemaValidator<'a> {
    pub fn new(form: &'a WorkingForm) -> Self {
        Self { form }
    }

    /// Validate the whole form, stopping at the first problem.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut seen = HashSet::new();
        for field in &self.form.fields {
            if field.id.is_empty() {
                return Err(SchemaError::InvalidField(format!(
                    "Field '{}' has an empty id",
                    field.label
                )));
            }
            if !seen.insert(field.id.as_str()) {
                return Err(SchemaError::InvalidField(format!(
                    "Duplicate field id {}",
                    field.id
                )));
            }
        }

        for field in &self.form.fields {
            self.validate_field(field)?;
        }

        Ok(())
    }

    fn validate_field(&self, field: &Field) -> Result<(), SchemaError> {
        if field.field_type.has_options() && field.options.is_empty() {
            return Err(SchemaError::InvalidField(format!(
                "Field {} of type {} needs at least one option",
                field.id, field.field_type
            )));
        }

        for rule in &field.validation_rules {
            if rule.kind.takes_threshold() && rule.threshold().is_none() {
                return Err(SchemaError::InvalidRule(format!(
                    "Rule {} on field {} requires a numeric value",
                    rule.kind, field.id
                )));
            }
        }

        if field.is_derived {
            self.validate_derivation(field)?;
        }

        Ok(())
    }

    fn validate_derivation(&self, field: &Field) -> Result<(), SchemaError> {
        let config = field.derived_config.as_ref().ok_or_else(|| {
            SchemaError::InvalidTransform(format!(
                "Derived field {} has no formula configuration",
                field.id
            ))
        })?;

        for parent_id in &config.parent_fields {
            if parent_id == &field.id {
                return Err(SchemaError::InvalidTransform(format!(
                    "Derived field {} cannot read itself",
                    field.id
                )));
            }
            match self.form.field(parent_id) {
                Some(parent) if parent.is_derived => {
                    return Err(SchemaError::InvalidTransform(format!(
                        "Derived field {} reads derived field {}",
                        field.id, parent_id
                    )));
                }
                Some(_) => {}
                None => {
                    debug!(
                        "Derived field {} reads removed field {}",
                        field.id, parent_id
                    );
                }
            }
        }

        Ok(())
    }
}

impl WorkingForm {
    pub fn validator(&self) -> SchemaValidator<'_> {
        SchemaValidator::new(self)
    }

    pub fn validate_structure(&self) -> Result<(), SchemaError> {
        self.validator().validate()
    }
}
