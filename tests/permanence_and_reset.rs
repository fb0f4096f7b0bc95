//! Integration tests for permanence protection, bulk deletion, and reset.

use instance_registry::{Lifecycle, Registration, Registry, RegistryError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct Tracked {
    closes: Arc<AtomicUsize>,
}

impl Lifecycle for Tracked {
    fn on_close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_permanent_entry_survives_delete() {
    let registry = Registry::new();
    registry
        .put(Registration::instance("config".to_string()).permanent())
        .unwrap();

    let err = registry.delete::<String>(None).unwrap_err();
    assert!(matches!(err, RegistryError::PermanentProtected { .. }));

    // Still resolvable after the failed delete.
    assert_eq!(&*registry.find::<String>(None).unwrap(), "config");
}

#[test]
fn test_force_delete_removes_permanent_entry() {
    let registry = Registry::new();
    let closes = Arc::new(AtomicUsize::new(0));
    registry
        .put(
            Registration::instance(Tracked {
                closes: Arc::clone(&closes),
            })
            .permanent()
            .lifecycle(),
        )
        .unwrap();

    registry.force_delete::<Tracked>(None).unwrap();

    assert!(!registry.is_registered::<Tracked>(None));
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[test]
fn test_delete_all_spares_permanent_entries() {
    let registry = Registry::new();
    let closes = Arc::new(AtomicUsize::new(0));

    registry
        .put(Registration::instance(1u16).permanent())
        .unwrap();
    registry
        .put(
            Registration::instance(Tracked {
                closes: Arc::clone(&closes),
            })
            .lifecycle(),
        )
        .unwrap();
    registry.register_factory(|| "scoped".to_string()).unwrap();

    registry.delete_all();

    // Permanent singleton untouched; everything else gone and closed.
    assert!(registry.is_registered::<u16>(None));
    assert!(!registry.is_registered::<Tracked>(None));
    assert!(!registry.is_registered::<String>(None));
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[test]
fn test_reset_clears_everything() {
    let registry = Registry::new();
    let closes = Arc::new(AtomicUsize::new(0));

    registry
        .put(
            Registration::instance(Tracked {
                closes: Arc::clone(&closes),
            })
            .permanent()
            .lifecycle(),
        )
        .unwrap();
    let captured = Arc::clone(&closes);
    registry
        .put(
            Registration::instance(Tracked {
                closes: captured,
            })
            .tag("scoped")
            .lifecycle(),
        )
        .unwrap();
    registry.register(42i32).unwrap();

    registry.reset();

    assert!(!registry.is_registered::<Tracked>(None));
    assert!(!registry.is_registered::<Tracked>(Some("scoped")));
    assert!(!registry.is_registered::<i32>(None));
    // Both materialized lifecycle values observed close exactly once.
    assert_eq!(closes.load(Ordering::SeqCst), 2);
}

#[test]
fn test_reset_leaves_registry_usable() {
    let registry = Registry::new();
    registry.register(1i32).unwrap();
    registry.reset();

    registry.register(2i32).unwrap();
    assert_eq!(*registry.find::<i32>(None).unwrap(), 2);
}

#[test]
fn test_unmaterialized_lazy_closes_nothing() {
    let registry = Registry::new();
    let closes = Arc::new(AtomicUsize::new(0));

    let captured = Arc::clone(&closes);
    registry
        .put(
            Registration::lazy(move || Tracked {
                closes: Arc::clone(&captured),
            })
            .lifecycle(),
        )
        .unwrap();

    // Never looked up, so there is no value to close.
    registry.reset();
    assert_eq!(closes.load(Ordering::SeqCst), 0);
}

#[test]
fn test_delete_absent_key_fails() {
    let registry = Registry::new();
    assert!(matches!(
        registry.delete::<String>(None),
        Err(RegistryError::NotRegistered { .. })
    ));
}
