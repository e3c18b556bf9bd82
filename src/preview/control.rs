use serde::Serialize;

use crate::schema::types::{Field, FieldId, FieldType, FieldValue};

/// Input control a field renders as, selected by its type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "control", rename_all = "camelCase")]
pub enum ControlKind {
    TextInput,
    NumberInput,
    TextArea,
    Select { options: Vec<String> },
    RadioGroup { options: Vec<String> },
    CheckboxGroup { options: Vec<String> },
    DatePicker,
    /// Visible stand-in for a type this crate cannot render.
    Unsupported { message: String },
}

impl ControlKind {
    pub fn for_field(field: &Field) -> Self {
        match &field.field_type {
            FieldType::Text => ControlKind::TextInput,
            FieldType::Number => ControlKind::NumberInput,
            FieldType::Textarea => ControlKind::TextArea,
            FieldType::Select => ControlKind::Select {
                options: field.options.clone(),
            },
            FieldType::Radio => ControlKind::RadioGroup {
                options: field.options.clone(),
            },
            FieldType::Checkbox => ControlKind::CheckboxGroup {
                options: field.options.clone(),
            },
            FieldType::Date => ControlKind::DatePicker,
            FieldType::Unsupported(name) => ControlKind::Unsupported {
                message: format!("Unsupported field type: {}", name),
            },
        }
    }

    /// Radio and checkbox groups label themselves; other controls get a
    /// separate label line.
    pub fn has_own_label(&self) -> bool {
        matches!(
            self,
            ControlKind::RadioGroup { .. } | ControlKind::CheckboxGroup { .. }
        )
    }
}

/// Everything a renderer needs to draw one field of the preview.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Control {
    pub field_id: FieldId,
    pub label: String,
    pub kind: ControlKind,
    pub required: bool,
    /// Derived fields are computed and never edited directly.
    pub read_only: bool,
    pub placeholder: Option<String>,
    pub value: Option<FieldValue>,
    pub error: Option<String>,
}

impl Control {
    pub fn new(field: &Field, value: Option<&FieldValue>, error: Option<&str>) -> Self {
        Self {
            field_id: field.id.clone(),
            label: field.label.clone(),
            kind: ControlKind::for_field(field),
            required: field.required,
            read_only: field.is_derived,
            placeholder: field.placeholder.clone(),
            value: value.cloned(),
            error: error.map(str::to_string),
        }
    }

    /// Options currently ticked in a checkbox group.
    pub fn checked_options(&self) -> Vec<String> {
        match &self.value {
            Some(FieldValue::List(items)) => items.clone(),
            _ => Vec::new(),
        }
    }
}
