//! High-level evaluation of derived-field formulas against a form's values.
//!
//! The executor resolves each parent id to the token its label produces,
//! compiles and renders the formula, and interprets the result. Evaluation
//! never fails towards the caller: any error yields an empty string.

use chrono::NaiveDate;
use log::debug;

use super::ast::Template;
use super::interpreter::Interpreter;
use super::parser::{Binding, TransformParser};
use crate::schema::types::{Field, FieldId, SchemaError, SubmissionData};

#[derive(Debug, Clone, Default)]
pub struct FormulaExecutor {
    interpreter: Interpreter,
}

impl FormulaExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Executor whose `AGE` is computed relative to `today`.
    pub fn with_today(today: NaiveDate) -> Self {
        Self {
            interpreter: Interpreter::with_today(today),
        }
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    /// Evaluates `formula` reading `parents` from `values`.
    ///
    /// `fields` supplies the labels that name each parent in the formula; a
    /// parent id missing from `fields` is referred to by the id itself and,
    /// having no value, renders as the empty string.
    pub fn evaluate(
        &self,
        formula: &str,
        parents: &[FieldId],
        fields: &[Field],
        values: &SubmissionData,
    ) -> String {
        match self.try_evaluate(formula, parents, fields, values) {
            Ok(result) => result,
            Err(e) => {
                debug!("Formula '{}' failed to evaluate: {}", formula, e);
                String::new()
            }
        }
    }

    pub fn try_evaluate(
        &self,
        formula: &str,
        parents: &[FieldId],
        fields: &[Field],
        values: &SubmissionData,
    ) -> Result<String, SchemaError> {
        let template = Self::compile(formula, parents, fields)?;
        let rendered = template.render(values);
        let expr = TransformParser::parse(&rendered);
        Ok(self.interpreter.evaluate(&expr))
    }

    /// Value of a derived field, or `None` for fields that are not derived.
    pub fn evaluate_field(
        &self,
        field: &Field,
        fields: &[Field],
        values: &SubmissionData,
    ) -> Option<String> {
        let config = field.active_derivation()?;
        Some(self.evaluate(&config.formula, &config.parent_fields, fields, values))
    }

    pub fn compile(
        formula: &str,
        parents: &[FieldId],
        fields: &[Field],
    ) -> Result<Template, SchemaError> {
        let bindings: Vec<Binding> = parents
            .iter()
            .map(|id| {
                let token = fields
                    .iter()
                    .find(|f| &f.id == id)
                    .map(Field::formula_token)
                    .unwrap_or_else(|| id.clone());
                Binding::new(id.clone(), token)
            })
            .collect();
        TransformParser::compile(formula, &bindings)
    }
}

/// Evaluates a formula relative to the current local date.
pub fn evaluate(
    formula: &str,
    parents: &[FieldId],
    fields: &[Field],
    values: &SubmissionData,
) -> String {
    FormulaExecutor::new().evaluate(formula, parents, fields, values)
}
