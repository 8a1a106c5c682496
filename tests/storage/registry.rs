//! Integration tests for the component registry.
//!
//! Tests registration idempotence and decode dispatch.

use nocturne_foundation::{ErrorKind, Payload};
use nocturne_storage::testing::{Health, Marker, Name};
use nocturne_storage::{ComponentRegistry, ComponentType};

#[test]
fn registration_is_idempotent() {
    let registry = ComponentRegistry::new();
    registry.register::<Health>();
    registry.register::<Health>();
    assert_eq!(registry.len(), 1);

    // A later, different registration still lands.
    registry.register::<Name>();
    assert_eq!(registry.len(), 2);
    assert!(registry.is_registered("Health"));
    assert!(registry.is_registered("Name"));
}

#[test]
fn decode_dispatches_by_kind_name() {
    let registry = ComponentRegistry::new();
    registry.register::<Health>();
    registry.register::<Name>();

    let decoded = registry.decode("Health", &Health::new(12).encode()).unwrap();
    assert_eq!(decoded.downcast_ref::<Health>().unwrap().current(), 12);

    let decoded = registry.decode("Name", &Name::new("tam").encode()).unwrap();
    assert_eq!(decoded.downcast_ref::<Name>().unwrap().text(), "tam");
}

#[test]
fn unknown_kind_fails_with_not_registered() {
    let registry = ComponentRegistry::new();
    let err = registry.decode("Ghost", &Payload::new()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ComponentNotRegistered(_)));
}

#[test]
fn malformed_payload_surfaces_the_decoder_error() {
    let registry = ComponentRegistry::new();
    registry.register::<Health>();
    let err = registry.decode("Health", &Payload::new()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::MissingField { .. }));
}

#[test]
fn global_registry_is_process_wide() {
    ComponentRegistry::global().register::<Marker>();
    assert!(ComponentRegistry::global().is_registered("Marker"));
}
