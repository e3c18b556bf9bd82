//! Form builder state and its persistence.
//!
//! [`FormBuilderState`] holds the reducers. [`FormBuilderStore`] owns a state
//! together with a [`KeyValueStore`] and writes the saved collection back
//! after every change to it. Concurrent writers to the same key overwrite
//! each other; the last write wins.

pub mod persistence;
pub mod state;

use chrono::Utc;
use log::{info, warn};

use crate::error::FormResult;
use crate::schema::types::{FormSchema, SchemaError};

pub use persistence::{KeyValueStore, MemoryStore, SledStore, SAVED_FORMS_KEY};
pub use state::FormBuilderState;

/// Result of [`FormBuilderStore::save_form`].
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Saved(FormSchema),
    /// The form has no name; nothing was saved.
    MissingName,
    /// The form has no fields; nothing was saved.
    NoFields,
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved(_))
    }

    pub fn message(&self) -> String {
        match self {
            SaveOutcome::Saved(schema) => {
                format!("\"{}\" has been saved to your forms.", schema.name)
            }
            SaveOutcome::MissingName => "Please enter a form name".to_string(),
            SaveOutcome::NoFields => "Please add at least one field to your form".to_string(),
        }
    }
}

pub struct FormBuilderStore<S: KeyValueStore> {
    state: FormBuilderState,
    backend: S,
    key: String,
}

impl<S: KeyValueStore> FormBuilderStore<S> {
    pub fn new(backend: S) -> Self {
        Self::with_key(backend, SAVED_FORMS_KEY)
    }

    /// Store writing its collection under `key` instead of the default.
    pub fn with_key(backend: S, key: impl Into<String>) -> Self {
        Self {
            state: FormBuilderState::new(),
            backend,
            key: key.into(),
        }
    }

    /// Opens the store and immediately loads the saved collection.
    pub fn open(backend: S, key: impl Into<String>) -> Self {
        let mut store = Self::with_key(backend, key);
        store.load_saved_forms();
        store
    }

    pub fn state(&self) -> &FormBuilderState {
        &self.state
    }

    /// Working-state reducers. Changes made here to `saved_forms` are not
    /// persisted until the next save or delete.
    pub fn state_mut(&mut self) -> &mut FormBuilderState {
        &mut self.state
    }

    pub fn saved_forms(&self) -> &[FormSchema] {
        &self.state.saved_forms
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Saves the working form as a new schema when it has a name and at least
    /// one field. The working form itself is left untouched.
    pub fn save_form(&mut self) -> FormResult<SaveOutcome> {
        let form = &self.state.current_form;
        if form.name.trim().is_empty() {
            return Ok(SaveOutcome::MissingName);
        }
        if form.fields.is_empty() {
            return Ok(SaveOutcome::NoFields);
        }

        let schema = FormSchema::from_working(form, Utc::now());
        let mut forms = self.state.saved_forms.clone();
        forms.push(schema.clone());
        self.commit(forms)?;
        info!("Saved form '{}' with id {}", schema.name, schema.id);
        Ok(SaveOutcome::Saved(schema))
    }

    /// Replaces the saved collection with what the backend holds. Missing,
    /// unreadable or corrupt data yields an empty collection.
    pub fn load_saved_forms(&mut self) -> &[FormSchema] {
        self.state.saved_forms = match self.backend.get(&self.key) {
            Ok(Some(json)) => match serde_json::from_str::<Vec<FormSchema>>(&json) {
                Ok(forms) => forms,
                Err(e) => {
                    warn!("Ignoring corrupt saved forms under '{}': {}", self.key, e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Failed to read saved forms under '{}': {}", self.key, e);
                Vec::new()
            }
        };
        info!("Loaded {} saved form(s)", self.state.saved_forms.len());
        &self.state.saved_forms
    }

    /// Deletes one saved form. Returns `false` when the id is unknown, in
    /// which case nothing is written.
    pub fn delete_form(&mut self, id: &str) -> FormResult<bool> {
        if !self.state.saved_forms.iter().any(|f| f.id == id) {
            return Ok(false);
        }
        let forms = self
            .state
            .saved_forms
            .iter()
            .filter(|f| f.id != id)
            .cloned()
            .collect();
        self.commit(forms)?;
        info!("Deleted form {}", id);
        Ok(true)
    }

    pub fn delete_all_forms(&mut self) -> FormResult<()> {
        self.commit(Vec::new())?;
        info!("Deleted all saved forms");
        Ok(())
    }

    /// Copies a saved form into the working form.
    pub fn load_form(&mut self, id: &str) -> Result<(), SchemaError> {
        if self.state.load_form(id) {
            Ok(())
        } else {
            Err(SchemaError::NotFound(format!("Form {}", id)))
        }
    }

    /// Structural check of the working form.
    pub fn validate_current_form(&self) -> Result<(), SchemaError> {
        self.state.current_form.validate_structure()
    }

    /// Writes `forms` to the backend and only then makes it the saved
    /// collection. A failed write leaves the collection as it was.
    fn commit(&mut self, forms: Vec<FormSchema>) -> FormResult<()> {
        let json = serde_json::to_string(&forms)?;
        self.backend.set(&self.key, &json)?;
        self.state.saved_forms = forms;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormError;
    use crate::schema::types::{Field, FieldType};

    /// Backend whose writes fail once `broken` is set.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        broken: bool,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> FormResult<Option<String>> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> FormResult<()> {
            if self.broken {
                return Err(FormError::Storage("disk full".to_string()));
            }
            self.inner.set(key, value)
        }
    }

    fn store_with_form(name: &str) -> FormBuilderStore<MemoryStore> {
        let mut store = FormBuilderStore::new(MemoryStore::new());
        store.state_mut().set_form_name(name);
        store
            .state_mut()
            .add_field(Field::new("", FieldType::Text, "Name"));
        store
    }

    #[test]
    fn test_save_preconditions() {
        let mut store = FormBuilderStore::new(MemoryStore::new());
        store.state_mut().set_form_name("   ");
        store
            .state_mut()
            .add_field(Field::new("", FieldType::Text, "A"));
        assert_eq!(store.save_form().unwrap(), SaveOutcome::MissingName);

        store.state_mut().set_form_name("Survey");
        store.state_mut().reorder_fields(Vec::new());
        assert_eq!(store.save_form().unwrap(), SaveOutcome::NoFields);
        assert!(store.saved_forms().is_empty());
        assert_eq!(store.backend().get(SAVED_FORMS_KEY).unwrap(), None);
    }

    #[test]
    fn test_save_persists_collection() {
        let mut store = store_with_form("Survey");
        let outcome = store.save_form().unwrap();
        assert!(outcome.is_saved());
        assert_eq!(outcome.message(), "\"Survey\" has been saved to your forms.");

        let raw = store.backend().get(SAVED_FORMS_KEY).unwrap().unwrap();
        let parsed: Vec<FormSchema> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, store.saved_forms());
        assert_eq!(store.state().current_form.name, "Survey");
    }

    #[test]
    fn test_reload_reproduces_collection() {
        let mut store = store_with_form("One");
        store.save_form().unwrap();
        store.state_mut().set_form_name("Two");
        store.save_form().unwrap();
        let saved = store.saved_forms().to_vec();

        let mut reloaded = FormBuilderStore::new(store.backend().clone());
        assert_eq!(reloaded.load_saved_forms(), saved.as_slice());
    }

    #[test]
    fn test_corrupt_or_missing_data_loads_empty() {
        let mut backend = MemoryStore::new();
        let mut store = FormBuilderStore::new(backend.clone());
        assert!(store.load_saved_forms().is_empty());

        backend.set(SAVED_FORMS_KEY, "{not json").unwrap();
        let mut store = FormBuilderStore::new(backend);
        assert!(store.load_saved_forms().is_empty());
    }

    #[test]
    fn test_delete_operations() {
        let mut store = store_with_form("One");
        let id = match store.save_form().unwrap() {
            SaveOutcome::Saved(schema) => schema.id,
            other => panic!("Expected save, got {:?}", other),
        };
        store.save_form().unwrap();

        assert!(!store.delete_form("missing").unwrap());
        assert!(store.delete_form(&id).unwrap());
        assert_eq!(store.saved_forms().len(), 1);

        store.delete_all_forms().unwrap();
        let raw = store.backend().get(SAVED_FORMS_KEY).unwrap();
        assert_eq!(raw.as_deref(), Some("[]"));
    }

    #[test]
    fn test_load_form_into_working_state() {
        let mut store = store_with_form("One");
        let schema = match store.save_form().unwrap() {
            SaveOutcome::Saved(schema) => schema,
            other => panic!("Expected save, got {:?}", other),
        };
        store.state_mut().clear_current_form();
        assert!(matches!(store.load_form("nope"), Err(SchemaError::NotFound(_))));
        store.load_form(&schema.id).unwrap();
        assert_eq!(store.state().current_form.fields, schema.fields);
        assert!(store.validate_current_form().is_ok());
    }

    #[test]
    fn test_failed_write_leaves_collection_unchanged() {
        let mut store = FormBuilderStore::new(FlakyStore::default());
        store.state_mut().set_form_name("One");
        store
            .state_mut()
            .add_field(Field::new("", FieldType::Text, "Name"));
        let kept = match store.save_form().unwrap() {
            SaveOutcome::Saved(schema) => schema,
            other => panic!("Expected save, got {:?}", other),
        };
        let on_disk = store.backend.get(SAVED_FORMS_KEY).unwrap();

        store.backend.broken = true;
        assert!(matches!(store.save_form(), Err(FormError::Storage(_))));
        assert_eq!(store.saved_forms().len(), 1);
        assert!(store.delete_form(&kept.id).is_err());
        assert!(store.delete_all_forms().is_err());
        assert_eq!(store.saved_forms(), &[kept.clone()][..]);
        assert_eq!(store.backend.get(SAVED_FORMS_KEY).unwrap(), on_disk);

        // The next successful write carries only what was reported as saved.
        store.backend.broken = false;
        store.save_form().unwrap();
        let raw = store.backend.get(SAVED_FORMS_KEY).unwrap().unwrap();
        let parsed: Vec<FormSchema> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0], kept);
    }

    #[test]
    fn test_form_with_removed_parent_still_validates() {
        let mut store = FormBuilderStore::new(MemoryStore::new());
        let state = store.state_mut();
        state.set_form_name("Totals");
        let a = state.add_field(Field::new("", FieldType::Number, "A"));
        state.add_field(Field::new("", FieldType::Number, "B"));
        state.add_field(Field::new("", FieldType::Text, "T").derived(vec![a.clone()], "SUM(a)"));
        assert!(state.remove_field(&a));

        assert!(store.validate_current_form().is_ok());
        assert!(store.save_form().unwrap().is_saved());
    }
}
