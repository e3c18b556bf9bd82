use std::collections::HashMap;
use uuid::Uuid;

use crate::schema::types::{Field, FieldId, FormSchema, WorkingForm};

/// Everything the form builder keeps between edits: the form under
/// construction, the saved collection and builder-level error messages.
///
/// The methods are plain reducers over owned state; nothing here touches
/// storage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormBuilderState {
    pub current_form: WorkingForm,
    pub saved_forms: Vec<FormSchema>,
    pub errors: HashMap<String, String>,
}

impl FormBuilderState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_form_name(&mut self, name: impl Into<String>) {
        self.current_form.name = name.into();
    }

    /// Appends `field` under a freshly minted id and returns that id. Any id
    /// the field already carries is discarded.
    pub fn add_field(&mut self, mut field: Field) -> FieldId {
        let id = Uuid::new_v4().to_string();
        field.id = id.clone();
        self.current_form.fields.push(field);
        id
    }

    /// Replaces the field with the same id. Returns `false` when no such field
    /// exists.
    pub fn update_field(&mut self, field: Field) -> bool {
        match self.current_form.fields.iter_mut().find(|f| f.id == field.id) {
            Some(slot) => {
                *slot = field;
                true
            }
            None => false,
        }
    }

    /// Removes a field. Derived fields that listed it as a parent keep the
    /// dangling id.
    pub fn remove_field(&mut self, id: &str) -> bool {
        let before = self.current_form.fields.len();
        self.current_form.fields.retain(|f| f.id != id);
        self.current_form.fields.len() != before
    }

    pub fn reorder_fields(&mut self, fields: Vec<Field>) {
        self.current_form.fields = fields;
    }

    /// Copies a saved form's name and fields into the working form, keeping
    /// their ids.
    pub fn load_form(&mut self, id: &str) -> bool {
        match self.saved_forms.iter().find(|f| f.id == id) {
            Some(schema) => {
                self.current_form = WorkingForm {
                    name: schema.name.clone(),
                    fields: schema.fields.clone(),
                };
                true
            }
            None => false,
        }
    }

    pub fn clear_current_form(&mut self) {
        self.current_form = WorkingForm::default();
    }

    pub fn saved_form(&self, id: &str) -> Option<&FormSchema> {
        self.saved_forms.iter().find(|f| f.id == id)
    }

    pub fn set_error(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.errors.insert(key.into(), message.into());
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }
}
