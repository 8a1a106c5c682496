//! Integration tests for the error type.
//!
//! Tests kind categorization, constructor helpers, and display formatting.

use nocturne_foundation::{Error, ErrorKind, Result};

#[test]
fn helpers_build_matching_kinds() {
    assert!(matches!(
        Error::invalid_parameter("key").kind,
        ErrorKind::InvalidParameter(_)
    ));
    assert!(matches!(
        Error::not_registered("Ghost").kind,
        ErrorKind::ComponentNotRegistered(_)
    ));
    assert!(matches!(
        Error::storage("disk on fire").kind,
        ErrorKind::Storage(_)
    ));
    assert!(matches!(
        Error::internal("unreachable").kind,
        ErrorKind::Internal(_)
    ));
}

#[test]
fn decode_errors_name_component_and_field() {
    let missing = Error::missing_field("Health", "current");
    let msg = format!("{missing}");
    assert!(msg.contains("Health"));
    assert!(msg.contains("current"));

    let wrong = Error::field_type("Name", "text", "string");
    let msg = format!("{wrong}");
    assert!(msg.contains("Name"));
    assert!(msg.contains("string"));
}

#[test]
fn errors_flow_through_question_mark() {
    fn inner() -> Result<()> {
        Err(Error::storage("write failed"))
    }
    fn outer() -> Result<()> {
        inner()?;
        Ok(())
    }
    assert!(matches!(outer().unwrap_err().kind, ErrorKind::Storage(_)));
}

#[test]
fn error_is_a_std_error() {
    let err = Error::internal("boxed");
    let boxed: Box<dyn std::error::Error> = Box::new(err);
    assert!(format!("{boxed}").contains("boxed"));
}
