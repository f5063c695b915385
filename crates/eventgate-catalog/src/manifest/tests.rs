//! Unit tests for module and type descriptors.

use rstest::rstest;

use super::*;

// ---------------------------------------------------------------------------
// TypeKind
// ---------------------------------------------------------------------------

#[rstest]
#[case::class(TypeKind::Class, true)]
#[case::interface(TypeKind::Interface, true)]
#[case::value_type(TypeKind::ValueType, false)]
#[case::enumeration(TypeKind::Enumeration, false)]
#[case::delegate(TypeKind::Delegate, false)]
fn only_classes_and_interfaces_are_registrable(#[case] kind: TypeKind, #[case] expected: bool) {
    assert_eq!(kind.is_registrable(), expected);
}

#[test]
fn capability_uses_kebab_case() {
    let parsed: Capability = serde_json::from_str("\"domain-event\"").expect("deserialise");
    assert_eq!(parsed, Capability::DomainEvent);
    assert_eq!(Capability::DomainEvent.to_string(), "domain-event");
    assert!(serde_json::from_str::<Capability>("\"aggregate-root\"").is_err());
}

// ---------------------------------------------------------------------------
// ModuleDescriptor
// ---------------------------------------------------------------------------

#[test]
fn new_module_is_static_without_location() {
    let module = ModuleDescriptor::new(ModuleIdentity::new("sales", "1.0"));
    assert_eq!(module.origin(), ModuleOrigin::Static);
    assert!(!module.is_generated());
    assert!(module.location().is_none());
    assert!(module.references().is_empty());
    assert!(module.declared_types().is_empty());
}

#[test]
fn builder_records_location_and_references() {
    let module = ModuleDescriptor::new(ModuleIdentity::new("sales", "1.0"))
        .located_at("/opt/plugins/libsales.so")
        .with_references(vec![ModuleIdentity::new("common", "0.3")])
        .generated();
    assert!(module.is_generated());
    assert_eq!(
        module.location(),
        Some(std::path::Path::new("/opt/plugins/libsales.so"))
    );
    assert_eq!(module.references(), &[ModuleIdentity::new("common", "0.3")]);
}

#[test]
fn descriptor_deserialises_with_defaults() {
    let module: ModuleDescriptor =
        serde_json::from_str(r#"{"identity":{"name":"sales","version":"1.0"}}"#)
            .expect("deserialise");
    assert_eq!(module, ModuleDescriptor::new(ModuleIdentity::new("sales", "1.0")));
}

// ---------------------------------------------------------------------------
// TypeDescriptor
// ---------------------------------------------------------------------------

#[test]
fn capabilities_are_deduplicated() {
    let descriptor = TypeDescriptor::new("Sales.OrderPlaced", TypeKind::Class)
        .with_capability(Capability::DomainEvent)
        .with_capability(Capability::DomainEvent);
    assert_eq!(descriptor.capabilities(), &[Capability::DomainEvent]);
    assert!(descriptor.is_domain_event());
}

#[test]
fn plain_class_is_not_a_domain_event() {
    let descriptor = TypeDescriptor::new("Sales.Customer", TypeKind::Class);
    assert!(!descriptor.is_domain_event());
    assert!(!descriptor.has_capability(Capability::DomainEvent));
}
