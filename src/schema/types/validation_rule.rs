use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleKind {
    NotEmpty,
    MinLength,
    MaxLength,
    Email,
    Password,
}

impl RuleKind {
    pub const ALL: [RuleKind; 5] = [
        RuleKind::NotEmpty,
        RuleKind::MinLength,
        RuleKind::MaxLength,
        RuleKind::Email,
        RuleKind::Password,
    ];

    /// Whether the rule is parameterised by a length threshold.
    pub fn takes_threshold(self) -> bool {
        matches!(self, RuleKind::MinLength | RuleKind::MaxLength)
    }

    pub fn label(self) -> &'static str {
        match self {
            RuleKind::NotEmpty => "Not Empty",
            RuleKind::MinLength => "Minimum Length",
            RuleKind::MaxLength => "Maximum Length",
            RuleKind::Email => "Email Format",
            RuleKind::Password => "Password",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            RuleKind::NotEmpty => "Field cannot be empty",
            RuleKind::MinLength => "Minimum number of characters",
            RuleKind::MaxLength => "Maximum number of characters",
            RuleKind::Email => "Must be a valid email address",
            RuleKind::Password => "Minimum 8 characters with at least one number",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RuleKind::NotEmpty => "notEmpty",
            RuleKind::MinLength => "minLength",
            RuleKind::MaxLength => "maxLength",
            RuleKind::Email => "email",
            RuleKind::Password => "password",
        };
        f.write_str(name)
    }
}

/// Rule parameter as persisted. Only numeric values constrain anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(rename = "type")]
    pub kind: RuleKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<RuleValue>,
    pub message: String,
}

impl ValidationRule {
    pub fn new(kind: RuleKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            value: None,
            message: message.into(),
        }
    }

    pub fn min_length(len: usize, message: impl Into<String>) -> Self {
        Self {
            kind: RuleKind::MinLength,
            value: Some(RuleValue::Number(len as f64)),
            message: message.into(),
        }
    }

    pub fn max_length(len: usize, message: impl Into<String>) -> Self {
        Self {
            kind: RuleKind::MaxLength,
            value: Some(RuleValue::Number(len as f64)),
            message: message.into(),
        }
    }

    /// The numeric threshold, if the rule carries one.
    pub fn threshold(&self) -> Option<f64> {
        match self.value {
            Some(RuleValue::Number(n)) => Some(n),
            _ => None,
        }
    }
}

/// Message the builder suggests for a new rule of `kind`.
pub fn default_message(kind: RuleKind, value: Option<&str>) -> String {
    let value = value.filter(|v| !v.is_empty()).unwrap_or("X");
    match kind {
        RuleKind::NotEmpty => "This field is required".to_string(),
        RuleKind::MinLength => format!("Must be at least {} characters long", value),
        RuleKind::MaxLength => format!("Must be no more than {} characters long", value),
        RuleKind::Email => "Please enter a valid email address".to_string(),
        RuleKind::Password => {
            "Password must be at least 8 characters long and contain at least one number"
                .to_string()
        }
    }
}
