//! Crate-level integration and BDD tests.

use std::sync::Arc;

use crate::exclusion::ExclusionPolicy;
use crate::manifest::{Capability, ModuleIdentity, TypeDescriptor, TypeKind};
use crate::registry::TypeRegistry;
use crate::source::{ModuleManifest, PluginManifest};


#[test]
fn end_to_end_lookup_through_manifest() {
    let mut manifest = PluginManifest::new();
    manifest
        .register(
            ModuleManifest::new(ModuleIdentity::new("billing", "2.1"))
                .references(ModuleIdentity::new("shared", "1.0"))
                .declare(
                    TypeDescriptor::new("Billing.InvoiceIssued", TypeKind::Class)
                        .with_capability(Capability::DomainEvent),
                )
                .declare(TypeDescriptor::new("Billing.Invoice", TypeKind::Class)),
        )
        .expect("register billing");
    manifest
        .register(
            ModuleManifest::new(ModuleIdentity::new("shared", "1.0"))
                .declare(TypeDescriptor::new("Shared.IClock", TypeKind::Interface)),
        )
        .expect("register shared");

    let registry = TypeRegistry::new(Arc::new(manifest), ExclusionPolicy::default());
    let issued = registry
        .find("Billing.InvoiceIssued")
        .expect("scan")
        .expect("event registered");
    assert!(issued.is_domain_event());
    assert_eq!(issued.module(), Some(&ModuleIdentity::new("billing", "2.1")));

    let invoice = registry
        .find("Billing.Invoice")
        .expect("cached")
        .expect("class registered");
    assert!(!invoice.is_domain_event());
    assert!(registry.find("Billing.Missing").expect("cached").is_none());
}
