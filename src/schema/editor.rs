//! Field editing helpers used by callers of the form store.
//!
//! The store applies whatever field it is given; the rules the builder UI
//! enforces before dispatching an update live here:
//! - new fields start from a per-type template
//! - a field may only become derived once the form has at least two fields
//! - derived parents are chosen among the other, non-derived fields
//! - options and validation rules are edited through small drafts

use once_cell::sync::Lazy;
use regex::Regex;

use crate::schema::types::{
    default_message, DerivedConfig, Field, FieldId, FieldType, FieldValue, RuleKind, RuleValue,
    SchemaError, ValidationRule, WorkingForm,
};

static LEADING_INT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?\d+").expect("static regex"));

/// Minimum number of fields before any field may be marked derived.
pub const MIN_FIELDS_FOR_DERIVED: usize = 2;

/// Builds the starting field for `field_type`. The id is left empty; the store
/// assigns one on insertion.
pub fn field_template(field_type: FieldType) -> Field {
    let name = field_type.as_str();
    let mut chars = name.chars();
    let capitalised = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
    };

    let placeholder = if field_type == FieldType::Textarea {
        "Enter your text here...".to_string()
    } else {
        format!("Enter {}...", name)
    };

    let mut field = Field::new(String::new(), field_type.clone(), format!("{} Field", capitalised));
    field.placeholder = Some(placeholder);
    if field_type.has_options() {
        field.options = vec![
            "Option 1".to_string(),
            "Option 2".to_string(),
            "Option 3".to_string(),
        ];
    }
    field
}

pub fn can_toggle_derived(form: &WorkingForm) -> bool {
    form.fields.len() >= MIN_FIELDS_FOR_DERIVED
}

/// Partial update of a field. `None` leaves the attribute untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldPatch {
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub default_value: Option<FieldValue>,
    pub required: Option<bool>,
    pub is_derived: Option<bool>,
    pub options: Option<Vec<String>>,
    pub derived_config: Option<DerivedConfig>,
    pub validation_rules: Option<Vec<ValidationRule>>,
}

impl FieldPatch {
    /// Merges the patch over `field` and returns the updated copy.
    ///
    /// A patch that turns derivation on is refused as a whole while the form
    /// has fewer than [`MIN_FIELDS_FOR_DERIVED`] fields.
    pub fn apply(self, form: &WorkingForm, field: &Field) -> Result<Field, SchemaError> {
        if self.is_derived == Some(true) && !can_toggle_derived(form) {
            return Err(SchemaError::InvalidField(format!(
                "At least {} fields are required to enable derived fields",
                MIN_FIELDS_FOR_DERIVED
            )));
        }

        let mut updated = field.clone();
        if let Some(label) = self.label {
            updated.label = label;
        }
        if let Some(placeholder) = self.placeholder {
            updated.placeholder = Some(placeholder);
        }
        if let Some(value) = self.default_value {
            updated.default_value = Some(value);
        }
        if let Some(required) = self.required {
            updated.required = required;
        }
        if let Some(is_derived) = self.is_derived {
            updated.is_derived = is_derived;
        }
        if let Some(options) = self.options {
            updated.options = options;
        }
        if let Some(config) = self.derived_config {
            updated.derived_config = Some(config);
        }
        if let Some(rules) = self.validation_rules {
            updated.validation_rules = rules;
        }
        Ok(updated)
    }
}

/// Fields that `field` may read from: every other non-derived field that is
/// not already a parent.
pub fn derived_parent_candidates<'a>(form: &'a WorkingForm, field: &Field) -> Vec<&'a Field> {
    let selected: &[FieldId] = field
        .derived_config
        .as_ref()
        .map(|c| c.parent_fields.as_slice())
        .unwrap_or(&[]);

    form.fields
        .iter()
        .filter(|f| f.id != field.id && !f.is_derived && !selected.contains(&f.id))
        .collect()
}

pub fn add_parent(config: &mut DerivedConfig, parent: &str) {
    if !config.parent_fields.iter().any(|p| p == parent) {
        config.parent_fields.push(parent.to_string());
    }
}

pub fn remove_parent(config: &mut DerivedConfig, parent: &str) {
    config.parent_fields.retain(|p| p != parent);
}

/// Appends a trimmed option. Blank input is ignored.
pub fn add_option(options: &mut Vec<String>, option: &str) -> bool {
    let option = option.trim();
    if option.is_empty() {
        return false;
    }
    options.push(option.to_string());
    true
}

pub fn update_option(options: &mut [String], index: usize, value: impl Into<String>) -> bool {
    match options.get_mut(index) {
        Some(slot) => {
            *slot = value.into();
            true
        }
        None => false,
    }
}

pub fn remove_option(options: &mut Vec<String>, index: usize) -> bool {
    if index < options.len() {
        options.remove(index);
        true
    } else {
        false
    }
}

/// A validation rule being composed in the builder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleDraft {
    pub kind: Option<RuleKind>,
    pub value: String,
    pub message: String,
}

impl RuleDraft {
    /// Starts a draft with the suggested message for `kind`.
    pub fn new(kind: RuleKind) -> Self {
        Self {
            kind: Some(kind),
            value: String::new(),
            message: default_message(kind, None),
        }
    }

    /// Updates the threshold text, refreshing the suggested message for
    /// length rules.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        if let Some(kind) = self.kind.filter(|k| k.takes_threshold()) {
            self.message = default_message(kind, Some(&self.value));
        }
    }

    /// Finalises the draft. A kind and a message are mandatory; a length
    /// threshold is kept only when the value starts with an integer, which
    /// is then read up to the first non-digit.
    pub fn build(&self) -> Result<ValidationRule, SchemaError> {
        let kind = self
            .kind
            .ok_or_else(|| SchemaError::InvalidRule("Rule type is required".to_string()))?;
        if self.message.is_empty() {
            return Err(SchemaError::InvalidRule("Rule message is required".to_string()));
        }

        let value = if kind.takes_threshold() {
            LEADING_INT
                .find(self.value.trim_start())
                .and_then(|m| m.as_str().parse::<f64>().ok())
                .map(RuleValue::Number)
        } else {
            None
        };

        Ok(ValidationRule {
            kind,
            value,
            message: self.message.clone(),
        })
    }
}
