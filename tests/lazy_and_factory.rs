//! Integration tests for the lazy-singleton and factory creation strategies.
//!
//! Every test builds its own registry instance, so no serialization is
//! needed.

use instance_registry::{Registry, RegistryError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug)]
struct Session {
    id: usize,
}

#[test]
fn test_lazy_materialization_is_idempotent() {
    let registry = Registry::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    registry
        .register_lazy(move || Session {
            id: counter.fetch_add(1, Ordering::SeqCst),
        })
        .unwrap();

    // Builder must not run at registration time.
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    for _ in 0..5 {
        let session: Arc<Session> = registry.find(None).unwrap();
        assert_eq!(session.id, 0);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_singleton_lookups_share_identity() {
    let registry = Registry::new();
    registry.register_lazy(|| Session { id: 7 }).unwrap();

    let first: Arc<Session> = registry.find(None).unwrap();
    let second: Arc<Session> = registry.find(None).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_factory_produces_fresh_values() {
    let registry = Registry::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    registry
        .register_factory(move || Session {
            id: counter.fetch_add(1, Ordering::SeqCst),
        })
        .unwrap();

    let mut produced: Vec<Arc<Session>> = Vec::new();
    for expected in 0..4 {
        let session: Arc<Session> = registry.find(None).unwrap();
        assert_eq!(session.id, expected);
        produced.push(session);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 4);

    // Distinct object identities every time.
    for (i, a) in produced.iter().enumerate() {
        for b in &produced[i + 1..] {
            assert!(!Arc::ptr_eq(a, b));
        }
    }
}

#[test]
fn test_factory_stays_prepared() {
    let registry = Registry::new();
    registry.register_factory(|| Session { id: 0 }).unwrap();

    assert!(registry.is_prepared::<Session>(None));
    let _ = registry.find::<Session>(None).unwrap();
    // Nothing is cached between factory lookups.
    assert!(registry.is_prepared::<Session>(None));
}

#[test]
fn test_try_find_variants() {
    let registry = Registry::new();
    assert!(registry.try_find::<Session>(None).is_none());

    registry.register_lazy(|| Session { id: 3 }).unwrap();
    let session = registry.try_find::<Session>(None).unwrap();
    assert_eq!(session.id, 3);
    // try_find materializes exactly as find does.
    assert!(!registry.is_prepared::<Session>(None));
}

#[test]
fn test_find_absent_is_not_registered() {
    let registry = Registry::new();
    let err = registry.find::<Session>(None).unwrap_err();
    assert!(matches!(err, RegistryError::NotRegistered { .. }));
}

#[test]
fn test_get_sugar_matches_find() {
    let registry = Registry::new();
    registry.register(99usize).unwrap();

    let via_find: Arc<usize> = registry.find(None).unwrap();
    let via_get: Arc<usize> = registry.get().unwrap();
    assert!(Arc::ptr_eq(&via_find, &via_get));
}

#[test]
fn test_builder_may_resolve_other_keys() {
    // A lazy builder resolving a dependency from the same registry must not
    // deadlock: builders run outside the registry lock.
    let registry = Registry::new();
    registry.register("postgres://localhost".to_string()).unwrap();

    let handle = registry.clone();
    registry
        .register_lazy(move || {
            let url: Arc<String> = handle.find(None).unwrap();
            Session { id: url.len() }
        })
        .unwrap();

    let session: Arc<Session> = registry.find(None).unwrap();
    assert_eq!(session.id, "postgres://localhost".len());
}
