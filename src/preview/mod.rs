//! Preview runtime: one interactive session over a form's values.
//!
//! A session seeds its values from field defaults, keeps derived fields in
//! step with their parents and validates on submit.
//!
//! Derived values are recomputed in at most two sequential passes per
//! triggering event. Derived fields only read non-derived fields, so the
//! second pass exists to settle, not to chase chains.

pub mod control;

use log::{debug, info};

use crate::schema::types::{Field, FieldId, FieldValue, SchemaError, SubmissionData, WorkingForm};
use crate::transform::FormulaExecutor;
use crate::validation::{ValidationEngine, ValidationError};

pub use control::{Control, ControlKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewStatus {
    Editing,
    Submitted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Submitted,
    Rejected(Vec<ValidationError>),
}

#[derive(Debug, Clone)]
pub struct PreviewSession {
    name: String,
    fields: Vec<Field>,
    values: SubmissionData,
    errors: Vec<ValidationError>,
    status: PreviewStatus,
    executor: FormulaExecutor,
}

impl PreviewSession {
    pub fn new(form: &WorkingForm) -> Self {
        Self::with_executor(form, FormulaExecutor::new())
    }

    /// Starts a session evaluating formulas with `executor`.
    pub fn with_executor(form: &WorkingForm, executor: FormulaExecutor) -> Self {
        let mut session = Self {
            name: form.name.clone(),
            fields: form.fields.clone(),
            values: SubmissionData::new(),
            errors: Vec::new(),
            status: PreviewStatus::Editing,
            executor,
        };
        session.reset();
        session
    }

    /// Title shown above the form.
    pub fn title(&self) -> &str {
        if self.name.is_empty() {
            "Form Preview"
        } else {
            &self.name
        }
    }

    /// A form without fields has nothing to preview.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn values(&self) -> &SubmissionData {
        &self.values
    }

    pub fn value(&self, field_id: &str) -> Option<&FieldValue> {
        self.values.get(field_id)
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn status(&self) -> PreviewStatus {
        self.status
    }

    /// Discards all input, reseeds defaults and recomputes derived fields.
    pub fn reset(&mut self) {
        self.values = self
            .fields
            .iter()
            .filter_map(|f| f.default_value.clone().map(|v| (f.id.clone(), v)))
            .collect();
        self.errors.clear();
        self.status = PreviewStatus::Editing;
        self.recompute();
    }

    /// Brings derived fields up to date. Returns how many values changed.
    pub fn recompute(&mut self) -> usize {
        let mut changed = self.recompute_pass();
        if changed > 0 {
            changed += self.recompute_pass();
        }
        changed
    }

    /// Evaluates every derived field against one snapshot of the values and
    /// commits the ones that differ together.
    fn recompute_pass(&mut self) -> usize {
        let staged: Vec<(FieldId, FieldValue)> = self
            .fields
            .iter()
            .filter_map(|field| {
                let result = self
                    .executor
                    .evaluate_field(field, &self.fields, &self.values)?;
                let value = FieldValue::Text(result);
                if self.values.get(&field.id) == Some(&value) {
                    None
                } else {
                    Some((field.id.clone(), value))
                }
            })
            .collect();

        let count = staged.len();
        if count > 0 {
            debug!("Committing {} derived value(s)", count);
            self.values.extend(staged);
        }
        count
    }

    /// Records user input for a non-derived field, drops that field's errors
    /// and recomputes derived fields.
    pub fn set_value(
        &mut self,
        field_id: &str,
        value: impl Into<FieldValue>,
    ) -> Result<(), SchemaError> {
        if self.status == PreviewStatus::Submitted {
            return Err(SchemaError::InvalidData(
                "Form has been submitted; resume editing first".to_string(),
            ));
        }
        let field = self
            .fields
            .iter()
            .find(|f| f.id == field_id)
            .ok_or_else(|| SchemaError::NotFound(format!("Field {}", field_id)))?;
        if field.is_derived {
            return Err(SchemaError::InvalidField(format!(
                "Field '{}' is derived and cannot be edited",
                field.label
            )));
        }

        self.values.insert(field_id.to_string(), value.into());
        self.errors.retain(|e| e.field_id != field_id);
        self.recompute();
        Ok(())
    }

    /// Ticks or unticks `option` of a checkbox group.
    pub fn toggle_option(&mut self, field_id: &str, option: &str) -> Result<(), SchemaError> {
        let mut checked = match self.values.get(field_id) {
            Some(FieldValue::List(items)) => items.clone(),
            _ => Vec::new(),
        };
        if let Some(pos) = checked.iter().position(|o| o == option) {
            checked.remove(pos);
        } else {
            checked.push(option.to_string());
        }
        self.set_value(field_id, FieldValue::List(checked))
    }

    /// Validates all values. On success the session moves to the submitted
    /// state; otherwise the errors are kept for display.
    pub fn submit(&mut self) -> SubmitOutcome {
        let errors = ValidationEngine::validate(&self.fields, &self.values);
        if errors.is_empty() {
            info!("Form '{}' submitted", self.title());
            self.errors.clear();
            self.status = PreviewStatus::Submitted;
            SubmitOutcome::Submitted
        } else {
            info!(
                "Form '{}' rejected with {} error(s)",
                self.title(),
                errors.len()
            );
            self.errors = errors.clone();
            SubmitOutcome::Rejected(errors)
        }
    }

    /// Leaves the submitted state keeping the entered values.
    pub fn resume_editing(&mut self) {
        self.status = PreviewStatus::Editing;
    }

    /// First error recorded for `field_id`.
    pub fn error_for(&self, field_id: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field_id == field_id)
            .map(|e| e.message.as_str())
    }

    /// Aggregate message shown after a rejected submit.
    pub fn failure_summary(&self) -> Option<String> {
        if self.errors.is_empty() {
            None
        } else {
            Some(format!(
                "Please fix {} error(s) and try again.",
                self.errors.len()
            ))
        }
    }

    pub fn controls(&self) -> Vec<Control> {
        self.fields
            .iter()
            .map(|f| Control::new(f, self.values.get(&f.id), self.error_for(&f.id)))
            .collect()
    }
}
