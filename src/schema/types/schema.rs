use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::field::{Field, FieldId, FieldType};

/// The form under construction. It receives an id and creation time only when
/// it is saved as a [`FormSchema`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkingForm {
    pub name: String,
    pub fields: Vec<Field>,
}

impl WorkingForm {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.fields.is_empty()
    }
}

/// A named, saved form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSchema {
    pub id: String,
    pub name: String,
    pub fields: Vec<Field>,
    pub created_at: DateTime<Utc>,
}

impl FormSchema {
    /// Snapshots a working form under a fresh id.
    pub fn from_working(form: &WorkingForm, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: form.name.clone(),
            fields: form.fields.clone(),
            created_at,
        }
    }

    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Distinct field types in first-seen order.
    pub fn field_types(&self) -> Vec<FieldType> {
        let mut types: Vec<FieldType> = Vec::new();
        for field in &self.fields {
            if !types.contains(&field.field_type) {
                types.push(field.field_type.clone());
            }
        }
        types
    }

    /// Creation date as shown in form listings, e.g. `Mar 4, 2025`.
    pub fn created_label(&self) -> String {
        self.created_at.format("%b %-d, %Y").to_string()
    }

    pub fn field_ids(&self) -> Vec<FieldId> {
        self.fields.iter().map(|f| f.id.clone()).collect()
    }
}
