use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::validation_rule::ValidationRule;

/// Opaque, stable field identifier (a v4 UUID for fields minted by the store).
pub type FieldId = String;

/// Current value of every filled-in field, keyed by field id.
pub type SubmissionData = HashMap<FieldId, FieldValue>;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

/// Input control family of a field.
///
/// Persisted as the lower-case type name. Names this crate does not know are
/// kept verbatim in [`FieldType::Unsupported`] so that saved forms written by a
/// newer builder still load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Text,
    Number,
    Textarea,
    Select,
    Radio,
    Checkbox,
    Date,
    Unsupported(String),
}

impl FieldType {
    /// All field types the builder can create, in palette order.
    pub const ALL: [FieldType; 7] = [
        FieldType::Text,
        FieldType::Number,
        FieldType::Textarea,
        FieldType::Select,
        FieldType::Radio,
        FieldType::Checkbox,
        FieldType::Date,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Textarea => "textarea",
            FieldType::Select => "select",
            FieldType::Radio => "radio",
            FieldType::Checkbox => "checkbox",
            FieldType::Date => "date",
            FieldType::Unsupported(name) => name,
        }
    }

    /// Select, radio and checkbox fields choose from a list of options.
    pub fn has_options(&self) -> bool {
        matches!(self, FieldType::Select | FieldType::Radio | FieldType::Checkbox)
    }
}

impl From<String> for FieldType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "text" => FieldType::Text,
            "number" => FieldType::Number,
            "textarea" => FieldType::Textarea,
            "select" => FieldType::Select,
            "radio" => FieldType::Radio,
            "checkbox" => FieldType::Checkbox,
            "date" => FieldType::Date,
            _ => FieldType::Unsupported(name),
        }
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        field_type.as_str().to_string()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value held by a field: user input, a default, or a computed result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    /// Whether the value counts as "not filled in" for a required field.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Bool(b) => !b,
            FieldValue::Number(n) => *n == 0.0 || n.is_nan(),
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::List(items) => items.is_empty(),
        }
    }

    /// Renders the value as text: lists are comma-joined, numbers drop a
    /// trailing `.0`.
    pub fn to_text(&self) -> String {
        match self {
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Number(n) => format_number(*n),
            FieldValue::Text(s) => s.clone(),
            FieldValue::List(items) => items.join(","),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::List(value)
    }
}

/// Formats a number the way form values are displayed: integral values without
/// a fractional part, `Infinity`/`NaN` spelled out. Magnitudes of `1e21` and
/// above or below `1e-7` use exponent form, as in `1e+21` or `1.5e-8`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-7 {
        let exp = format!("{:e}", n);
        match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => {
                format!("{}e+{}", mantissa, power)
            }
            _ => exp,
        }
    } else {
        n.to_string()
    }
}

/// Configuration of a computed field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedConfig {
    /// Non-derived fields the formula reads, in selection order.
    #[serde(default)]
    pub parent_fields: Vec<FieldId>,
    #[serde(default)]
    pub formula: String,
}

impl DerivedConfig {
    pub fn new(parent_fields: Vec<FieldId>, formula: impl Into<String>) -> Self {
        Self {
            parent_fields,
            formula: formula.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: FieldId,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default)]
    pub is_derived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived_config: Option<DerivedConfig>,
    #[serde(default)]
    pub validation_rules: Vec<ValidationRule>,
}

impl Field {
    pub fn new(id: impl Into<FieldId>, field_type: FieldType, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            field_type,
            label: label.into(),
            required: false,
            default_value: None,
            placeholder: None,
            options: Vec::new(),
            is_derived: false,
            derived_config: None,
            validation_rules: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<FieldValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_rule(mut self, rule: ValidationRule) -> Self {
        self.validation_rules.push(rule);
        self
    }

    /// Turns the field into a computed field reading `parents`.
    pub fn derived(mut self, parents: Vec<FieldId>, formula: impl Into<String>) -> Self {
        self.is_derived = true;
        self.derived_config = Some(DerivedConfig::new(parents, formula));
        self
    }

    /// The token a formula uses to refer to this field: the label lower-cased
    /// with whitespace runs collapsed to `_`, or the id when that is empty.
    pub fn formula_token(&self) -> String {
        let token = WHITESPACE_RUN
            .replace_all(&self.label.to_lowercase(), "_")
            .into_owned();
        if token.is_empty() {
            self.id.clone()
        } else {
            token
        }
    }

    /// Derived configuration, only when the field is actually marked derived.
    pub fn active_derivation(&self) -> Option<&DerivedConfig> {
        if self.is_derived {
            self.derived_config.as_ref()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formula_token_collapses_whitespace() {
        let field = Field::new("f1", FieldType::Text, "First   Name");
        assert_eq!(field.formula_token(), "first_name");

        let field = Field::new("f2", FieldType::Date, " Date of\tBirth");
        assert_eq!(field.formula_token(), "_date_of_birth");
    }

    #[test]
    fn test_formula_token_falls_back_to_id() {
        let field = Field::new("abc-123", FieldType::Text, "");
        assert_eq!(field.formula_token(), "abc-123");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(7.5), "7.5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(-2.5e22), "-2.5e+22");
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(1.5e-8), "1.5e-8");
        assert_eq!(format_number(0.000001), "0.000001");
    }

    #[test]
    fn test_unknown_field_type_survives_round_trip() {
        let json = r#"{"id":"x","type":"rating","label":"Stars","validationRules":[]}"#;
        let field: Field = serde_json::from_str(json).unwrap();
        assert_eq!(field.field_type, FieldType::Unsupported("rating".to_string()));

        let back = serde_json::to_value(&field).unwrap();
        assert_eq!(back["type"], "rating");
    }

    #[test]
    fn test_field_value_untagged_forms() {
        let values: Vec<FieldValue> =
            serde_json::from_str(r#"[true, 4.5, "hi", ["a", "b"]]"#).unwrap();
        assert_eq!(
            values,
            vec![
                FieldValue::Bool(true),
                FieldValue::Number(4.5),
                FieldValue::text("hi"),
                FieldValue::List(vec!["a".to_string(), "b".to_string()]),
            ]
        );
    }

    #[test]
    fn test_emptiness_and_text() {
        assert!(FieldValue::text("").is_empty());
        assert!(FieldValue::Bool(false).is_empty());
        assert!(FieldValue::Number(0.0).is_empty());
        assert!(FieldValue::List(vec![]).is_empty());
        assert!(!FieldValue::text(" ").is_empty());

        assert_eq!(FieldValue::Number(7.0).to_text(), "7");
        assert_eq!(FieldValue::Number(7.5).to_text(), "7.5");
        assert_eq!(
            FieldValue::List(vec!["a".into(), "b".into()]).to_text(),
            "a,b"
        );
    }
}
