mod common;

use common::{signup_form, StoreFixture};
use formsmith::{
    FieldType, FormBuilderStore, KeyValueStore, MemoryStore, SaveOutcome, SAVED_FORMS_KEY,
};
use formsmith::schema::editor::field_template;

#[test]
fn test_save_then_reload_reproduces_collection() {
    let mut fixture = StoreFixture::new();
    fixture.store.state_mut().current_form = signup_form();
    assert!(fixture.store.save_form().unwrap().is_saved());

    fixture.store.state_mut().set_form_name("Sign up copy");
    assert!(fixture.store.save_form().unwrap().is_saved());

    let saved = fixture.store.saved_forms().to_vec();
    let mut reloaded = fixture.reopen();
    let loaded = reloaded.load_saved_forms().to_vec();

    assert_eq!(loaded.len(), 2);
    for (a, b) in saved.iter().zip(&loaded) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.name, b.name);
        assert_eq!(a.fields, b.fields);
    }
    assert_ne!(loaded[0].id, loaded[1].id);
}

#[test]
fn test_build_save_edit_resave() {
    let mut fixture = StoreFixture::new();
    let state = fixture.store.state_mut();
    state.set_form_name("Feedback");
    let rating = state.add_field(field_template(FieldType::Radio));
    state.add_field(field_template(FieldType::Textarea));

    let first = match fixture.store.save_form().unwrap() {
        SaveOutcome::Saved(schema) => schema,
        other => panic!("Expected save, got {:?}", other),
    };

    fixture.store.state_mut().clear_current_form();
    fixture.store.load_form(&first.id).unwrap();
    assert_eq!(fixture.store.state().current_form.fields[0].id, rating);

    fixture.store.state_mut().remove_field(&rating);
    fixture.store.state_mut().set_form_name("Feedback v2");
    let second = match fixture.store.save_form().unwrap() {
        SaveOutcome::Saved(schema) => schema,
        other => panic!("Expected save, got {:?}", other),
    };

    assert_ne!(first.id, second.id);
    assert_eq!(fixture.store.saved_forms().len(), 2);
    assert_eq!(fixture.store.saved_forms()[0].fields.len(), 2);
    assert_eq!(second.fields.len(), 1);
}

#[test]
fn test_deletes_are_persisted() {
    let mut fixture = StoreFixture::new();
    fixture.store.state_mut().current_form = signup_form();
    fixture.store.save_form().unwrap();
    fixture.store.save_form().unwrap();
    let doomed = fixture.store.saved_forms()[0].id.clone();

    assert!(fixture.store.delete_form(&doomed).unwrap());
    let mut reloaded = fixture.reopen();
    assert_eq!(reloaded.load_saved_forms().len(), 1);
    assert!(reloaded.state().saved_form(&doomed).is_none());

    fixture.store.delete_all_forms().unwrap();
    let mut reloaded = fixture.reopen();
    assert!(reloaded.load_saved_forms().is_empty());
}

#[test]
fn test_corrupt_collection_yields_empty() {
    let mut backend = MemoryStore::new();
    backend.set(SAVED_FORMS_KEY, "[{\"id\": 42}]").unwrap();
    let mut store = FormBuilderStore::new(backend);
    assert!(store.load_saved_forms().is_empty());

    // The next save overwrites the corrupt value.
    store.state_mut().current_form = signup_form();
    store.save_form().unwrap();
    let mut reloaded = FormBuilderStore::new(store.backend().clone());
    assert_eq!(reloaded.load_saved_forms().len(), 1);
}

#[test]
fn test_unknown_field_types_survive_reload() {
    let mut backend = MemoryStore::new();
    let raw = r#"[{
        "id": "f-1",
        "name": "Legacy",
        "createdAt": "2024-03-05T10:00:00Z",
        "fields": [
            {"id": "a", "type": "signature", "label": "Sign here"},
            {"id": "b", "type": "text", "label": "Name", "required": true}
        ]
    }]"#;
    backend.set(SAVED_FORMS_KEY, raw).unwrap();

    let mut store = FormBuilderStore::new(backend);
    let forms = store.load_saved_forms();
    assert_eq!(forms.len(), 1);
    assert_eq!(forms[0].fields[0].field_type, FieldType::Unsupported("signature".into()));
    assert_eq!(forms[0].created_label(), "Mar 5, 2024");
}
