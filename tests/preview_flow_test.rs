mod common;

use common::{fixed_executor, signup_form};
use formsmith::{
    FieldValue, PreviewSession, PreviewStatus, SchemaError, SubmitOutcome, ValidationError,
};

fn text(value: &str) -> Option<FieldValue> {
    Some(FieldValue::text(value))
}

#[test]
fn test_initial_values() {
    let session = PreviewSession::with_executor(&signup_form(), fixed_executor());
    assert_eq!(session.title(), "Sign up");
    assert_eq!(session.value("rooms"), Some(&FieldValue::Number(1.0)));
    assert_eq!(session.value("first"), None);
    assert_eq!(session.value("total").cloned(), text("1"));
    // Unparseable AGE arguments fall back to the rendered text.
    assert_eq!(session.value("age").cloned(), text("AGE()"));
}

#[test]
fn test_edits_drive_derived_fields() {
    let mut session = PreviewSession::with_executor(&signup_form(), fixed_executor());
    session.set_value("first", "Jane").unwrap();
    session.set_value("last", "Doe").unwrap();
    session.set_value("dob", "2000-01-01").unwrap();
    session.set_value("guests", FieldValue::Number(2.0)).unwrap();

    assert_eq!(session.value("full").cloned(), text("Jane Doe"));
    assert_eq!(session.value("age").cloned(), text("25"));
    assert_eq!(session.value("total").cloned(), text("3"));

    let snapshot = session.values().clone();
    assert_eq!(session.recompute(), 0);
    assert_eq!(session.values(), &snapshot);
}

#[test]
fn test_derived_fields_are_read_only() {
    let mut session = PreviewSession::with_executor(&signup_form(), fixed_executor());
    assert!(matches!(
        session.set_value("full", "Someone"),
        Err(SchemaError::InvalidField(_))
    ));
    assert!(session.controls().iter().any(|c| c.field_id == "full" && c.read_only));
}

#[test]
fn test_submit_until_valid() {
    let mut session = PreviewSession::with_executor(&signup_form(), fixed_executor());
    session.set_value("first", "Jane").unwrap();
    session.set_value("last", "Doe").unwrap();

    let outcome = session.submit();
    assert_eq!(
        outcome,
        SubmitOutcome::Rejected(vec![
            ValidationError::new("email", "Email is required"),
            ValidationError::new("password", "Too short"),
        ])
    );
    assert_eq!(
        session.failure_summary().as_deref(),
        Some("Please fix 2 error(s) and try again.")
    );

    session.set_value("email", "jane@example").unwrap();
    assert_eq!(session.error_for("email"), None);
    assert_eq!(session.error_for("password"), Some("Too short"));
    session.set_value("password", "secretpass").unwrap();

    assert_eq!(
        session.submit(),
        SubmitOutcome::Rejected(vec![
            ValidationError::new("email", "Please enter a valid email address"),
            ValidationError::new("password", "Weak password"),
        ])
    );

    session.set_value("email", "jane@example.com").unwrap();
    session.set_value("password", "secret123").unwrap();
    assert_eq!(session.submit(), SubmitOutcome::Submitted);
    assert_eq!(session.status(), PreviewStatus::Submitted);
    assert!(session.failure_summary().is_none());

    session.resume_editing();
    assert_eq!(session.status(), PreviewStatus::Editing);
    assert_eq!(session.value("full").cloned(), text("Jane Doe"));
}

#[test]
fn test_reset_restores_defaults() {
    let mut session = PreviewSession::with_executor(&signup_form(), fixed_executor());
    session.set_value("rooms", FieldValue::Number(4.0)).unwrap();
    session.set_value("first", "Jane").unwrap();
    session.submit();

    session.reset();
    assert_eq!(session.value("rooms"), Some(&FieldValue::Number(1.0)));
    assert_eq!(session.value("first"), None);
    assert!(session.errors().is_empty());
    assert_eq!(session.value("total").cloned(), text("1"));
}
