//! Unit tests for the type registry.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use rstest::{fixture, rstest};

use super::*;
use crate::manifest::{Capability, TypeKind};
use crate::source::{MockModuleSource, ModuleManifest, PluginManifest};

fn identity(name: &str) -> ModuleIdentity {
    ModuleIdentity::new(name, "1.0")
}

fn event(name: &str) -> TypeDescriptor {
    TypeDescriptor::new(name, TypeKind::Class).with_capability(Capability::DomainEvent)
}

fn sales_module() -> ModuleManifest {
    ModuleManifest::new(identity("sales"))
        .references(identity("common"))
        .declare(event("Sales.OrderPlaced"))
        .declare(TypeDescriptor::new("Sales.Customer", TypeKind::Class))
        .declare(TypeDescriptor::new("Sales.Money", TypeKind::ValueType))
        .declare(TypeDescriptor::new("Sales.Status", TypeKind::Enumeration))
}

fn common_module() -> ModuleManifest {
    ModuleManifest::new(identity("common"))
        .declare(TypeDescriptor::new("Common.IIdentifiable", TypeKind::Interface))
}

#[fixture]
fn manifest() -> PluginManifest {
    let mut manifest = PluginManifest::new();
    manifest.register(sales_module()).expect("register sales");
    manifest.register(common_module()).expect("register common");
    manifest
}

/// Mock delegating to `manifest` while expecting exactly `scans` discoveries.
fn counting_source(manifest: PluginManifest, scans: usize) -> MockModuleSource {
    let manifest = Arc::new(manifest);
    let mut source = MockModuleSource::new();
    let loaded = Arc::clone(&manifest);
    source
        .expect_loaded_modules()
        .times(scans)
        .returning(move || loaded.loaded_modules());
    let resolver = Arc::clone(&manifest);
    source
        .expect_load()
        .returning(move |identity| resolver.load(identity));
    let types = Arc::clone(&manifest);
    source
        .expect_declared_types()
        .returning(move |module| types.declared_types(module));
    source
}

fn names(types: &TypeSet) -> Vec<&str> {
    types.iter().map(TypeDescriptor::qualified_name).collect()
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

#[rstest]
fn keeps_only_classes_and_interfaces(manifest: PluginManifest) {
    let registry = TypeRegistry::new(Arc::new(manifest), ExclusionPolicy::default());
    let types = registry.all_types().expect("scan");
    assert_eq!(
        names(&types),
        vec!["Sales.OrderPlaced", "Sales.Customer", "Common.IIdentifiable"]
    );
}

#[rstest]
fn references_are_deduplicated(manifest: PluginManifest) {
    // `common` is both loaded and referenced by `sales`.
    let registry = TypeRegistry::new(Arc::new(manifest), ExclusionPolicy::default());
    let modules: Vec<String> = registry
        .modules()
        .iter()
        .map(|module| module.identity().to_string())
        .collect();
    assert_eq!(modules, vec!["sales@1.0", "common@1.0"]);
}

#[test]
fn unresolvable_reference_is_skipped() {
    let mut manifest = PluginManifest::new();
    manifest
        .register(sales_module())
        .expect("register sales only");
    let registry = TypeRegistry::new(Arc::new(manifest), ExclusionPolicy::default());

    assert_eq!(registry.modules().len(), 1);
    let types = registry.all_types().expect("scan despite missing reference");
    assert!(types.find("Sales.OrderPlaced").is_some());
}

#[test]
fn generated_modules_are_never_scanned() {
    let mut source = MockModuleSource::new();
    source.expect_loaded_modules().times(1).returning(|| {
        vec![ModuleDescriptor::new(ModuleIdentity::new("proxies", "0.0")).generated()]
    });
    source.expect_load().never();
    source.expect_declared_types().never();

    let registry = TypeRegistry::new(Arc::new(source), ExclusionPolicy::default());
    assert!(registry.all_types().expect("empty scan").is_empty());
}

#[rstest]
#[case::by_file(ExclusionPolicy::default().with_file_pattern("libsales*"))]
#[case::by_name(ExclusionPolicy::default().with_module_prefix("SALES"))]
fn excluded_modules_are_skipped(#[case] exclusions: ExclusionPolicy) {
    let mut manifest = PluginManifest::new();
    manifest
        .register(sales_module().located_at("/opt/plugins/libsales.so"))
        .expect("register sales");
    manifest.register(common_module()).expect("register common");

    let registry = TypeRegistry::new(Arc::new(manifest), exclusions);
    let types = registry.all_types().expect("scan");
    assert_eq!(names(&types), vec!["Common.IIdentifiable"]);
}

#[test]
fn first_declaration_wins_lookup() {
    let mut manifest = PluginManifest::new();
    manifest
        .register(ModuleManifest::new(identity("first")).declare(event("Shared.Event")))
        .expect("register first");
    manifest
        .register(ModuleManifest::new(identity("second")).declare(event("Shared.Event")))
        .expect("register second");
    let registry = TypeRegistry::new(Arc::new(manifest), ExclusionPolicy::default());

    let found = registry
        .find("Shared.Event")
        .expect("scan")
        .expect("type present");
    assert_eq!(found.module(), Some(&identity("first")));
    assert_eq!(registry.all_types().expect("cached").len(), 2);
}

// ---------------------------------------------------------------------------
// Caching
// ---------------------------------------------------------------------------

#[rstest]
fn repeated_calls_do_not_rescan(manifest: PluginManifest) {
    let registry = TypeRegistry::new(
        Arc::new(counting_source(manifest, 1)),
        ExclusionPolicy::default(),
    );

    let first = registry.all_types().expect("first scan");
    let second = registry.all_types().expect("cached");
    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&registry.modules(), &registry.modules()));
}

#[test]
fn later_source_changes_are_ignored() {
    let mut source = MockModuleSource::new();
    let mut calls = 0_usize;
    source.expect_loaded_modules().returning(move || {
        calls += 1;
        vec![ModuleDescriptor::new(ModuleIdentity::new(format!("scan{calls}"), "1.0"))]
    });
    source
        .expect_load()
        .returning(|identity| Ok(ModuleDescriptor::new(identity.clone())));
    source.expect_declared_types().returning(|module| {
        Ok(vec![TypeDescriptor::new(
            format!("{}.Event", module.identity().name()),
            TypeKind::Class,
        )])
    });

    let registry = TypeRegistry::new(Arc::new(source), ExclusionPolicy::default());
    let first = registry.all_types().expect("first scan");
    let second = registry.all_types().expect("second call");
    assert_eq!(names(&first), vec!["scan1.Event"]);
    assert_eq!(names(&second), vec!["scan1.Event"]);
}

#[rstest]
fn concurrent_first_calls_commit_once(manifest: PluginManifest) {
    const CALLERS: usize = 8;
    let registry = TypeRegistry::new(
        Arc::new(counting_source(manifest, 1)),
        ExclusionPolicy::default(),
    );
    let barrier = Barrier::new(CALLERS);

    let results: Vec<Arc<TypeSet>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..CALLERS)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    registry.all_types().expect("scan")
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("thread"))
            .collect()
    });

    let first = results.first().expect("at least one result");
    assert!(results.iter().all(|types| Arc::ptr_eq(types, first)));
}

// ---------------------------------------------------------------------------
// Scan failure
// ---------------------------------------------------------------------------

fn broken_module(failures: usize) -> ModuleManifest {
    (1..=failures).fold(
        ModuleManifest::new(identity("broken")).declare(event("Broken.Event")),
        |module, n| module.with_type_failure(format!("unresolved dependency {n}")),
    )
}

#[test]
fn scan_failure_names_module_and_first_five_failures() {
    let mut manifest = PluginManifest::new();
    manifest.register(broken_module(7)).expect("register broken");
    let registry = TypeRegistry::new(Arc::new(manifest), ExclusionPolicy::default());

    let err = registry.all_types().expect_err("scan should fail");
    let message = err.to_string();
    assert!(message.contains("broken@1.0"), "unexpected message: {message}");
    assert!(message.contains("unresolved dependency 5"));
    assert!(!message.contains("unresolved dependency 6"));
}

#[rstest]
fn scan_failure_resets_and_later_scan_can_succeed(mut manifest: PluginManifest) {
    manifest.register(broken_module(1)).expect("register broken");
    // Discovery runs once per attempt: the failed scan, the module listing
    // below, and the rescan after the exclusion.
    let registry = TypeRegistry::new(
        Arc::new(counting_source(manifest, 3)),
        ExclusionPolicy::default(),
    );

    let err = registry.all_types().expect_err("broken module aborts scan");
    assert!(matches!(err, CatalogError::ScanFailure { .. }));
    assert_eq!(registry.modules().len(), 3);

    registry.exclude_module("broken");
    let types = registry.all_types().expect("rescan without broken module");
    assert!(types.find("Broken.Event").is_none());
    assert!(types.find("Sales.OrderPlaced").is_some());
    assert_eq!(registry.modules().len(), 2);
}

/// Source whose first type enumeration stalls and then fails, counting
/// discoveries in `discoveries`.
fn flaky_source(manifest: PluginManifest, discoveries: &Arc<AtomicUsize>) -> MockModuleSource {
    let manifest = Arc::new(manifest);
    let mut source = MockModuleSource::new();
    let loaded = Arc::clone(&manifest);
    let counter = Arc::clone(discoveries);
    source.expect_loaded_modules().returning(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        loaded.loaded_modules()
    });
    let resolver = Arc::clone(&manifest);
    source
        .expect_load()
        .returning(move |identity| resolver.load(identity));
    let failed_once = AtomicBool::new(false);
    let types = Arc::clone(&manifest);
    source.expect_declared_types().returning(move |module| {
        if failed_once.swap(true, Ordering::SeqCst) {
            types.declared_types(module)
        } else {
            thread::sleep(Duration::from_millis(300));
            Err(crate::error::TypeLoadError::new(vec!["transient failure".to_owned()]))
        }
    });
    source
}

#[rstest]
fn failed_scan_keeps_sibling_result(manifest: PluginManifest) {
    let discoveries = Arc::new(AtomicUsize::new(0));
    let registry = TypeRegistry::new(
        Arc::new(flaky_source(manifest, &discoveries)),
        ExclusionPolicy::default(),
    );

    let (first, second) = thread::scope(|scope| {
        let first = scope.spawn(|| registry.all_types());
        thread::sleep(Duration::from_millis(100));
        let second = scope.spawn(|| registry.all_types());
        (
            first.join().expect("first thread"),
            second.join().expect("second thread"),
        )
    });

    assert!(first.is_err(), "stalled scan should fail");
    let built = second.expect("sibling scan succeeds");
    assert_eq!(discoveries.load(Ordering::SeqCst), 2);

    let cached = registry.all_types().expect("cached");
    assert!(Arc::ptr_eq(&built, &cached));
    assert_eq!(discoveries.load(Ordering::SeqCst), 2);
}

#[rstest]
#[case::empty("")]
#[case::whitespace("  ")]
fn blank_exclusion_is_ignored(manifest: PluginManifest, #[case] prefix: &str) {
    let registry = TypeRegistry::new(Arc::new(manifest), ExclusionPolicy::default());
    registry.exclude_module(prefix);
    assert_eq!(registry.all_types().expect("scan").len(), 3);
}

#[test]
fn exclusions_do_not_affect_a_built_catalog() {
    let mut manifest = PluginManifest::new();
    manifest.register(sales_module()).expect("register sales");
    let registry = TypeRegistry::new(Arc::new(manifest), ExclusionPolicy::default());
    let before = registry.all_types().expect("scan");

    registry.exclude_module("sales");
    let after = registry.all_types().expect("cached");
    assert!(Arc::ptr_eq(&before, &after));
}
