//! Optional lifecycle capability for registered values.
//!
//! A registered value may implement [`Lifecycle`] to receive hook calls at
//! the points the registry drives: `on_init` when the value is materialized,
//! `on_ready` when an external collaborator signals readiness, and
//! `on_close` when the entry is disposed. Values that don't implement the
//! capability are never called.
//!
//! Participation is declared per registration with
//! [`Registration::lifecycle`](crate::Registration::lifecycle), which
//! captures a monomorphized caster. The registry checks capability presence
//! through that caster rather than through any inspection of the value.

use std::sync::Arc;

use crate::entry::ErasedValue;

/// Hook set a registered value may implement. All hooks default to no-ops,
/// so implementors override only the transitions they care about.
///
/// # Examples
///
/// ```rust
/// use instance_registry::{Lifecycle, Registration, Registry};
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// #[derive(Default)]
/// struct Database {
///     connected: AtomicBool,
/// }
///
/// impl Lifecycle for Database {
///     fn on_init(&self) {
///         self.connected.store(true, Ordering::SeqCst);
///     }
///     fn on_close(&self) {
///         self.connected.store(false, Ordering::SeqCst);
///     }
/// }
///
/// let registry = Registry::new();
/// registry
///     .put(Registration::instance(Database::default()).lifecycle())
///     .unwrap();
///
/// let db = registry.find::<Database>(None).unwrap();
/// assert!(db.connected.load(Ordering::SeqCst));
/// ```
pub trait Lifecycle: Send + Sync + 'static {
    /// Invoked exactly once per materialized value, at materialization time.
    fn on_init(&self) {}

    /// Invoked when an external collaborator signals readiness via
    /// [`Registry::signal_ready`](crate::Registry::signal_ready). The
    /// registry never drives this transition itself.
    fn on_ready(&self) {}

    /// Invoked when the entry is disposed (delete, bulk delete, reset,
    /// reload). Terminal: the value is not returned by later lookups.
    fn on_close(&self) {}
}

/// Monomorphized capability caster stored per entry.
pub(crate) type HookCast = fn(&ErasedValue) -> Option<Arc<dyn Lifecycle>>;

/// Recover the lifecycle handle from an erased value known to be `T`.
pub(crate) fn hook_cast<T: Lifecycle>(value: &ErasedValue) -> Option<Arc<dyn Lifecycle>> {
    Arc::clone(value)
        .downcast::<T>()
        .ok()
        .map(|value| value as Arc<dyn Lifecycle>)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Probe {
        inits: AtomicUsize,
    }

    impl Lifecycle for Probe {
        fn on_init(&self) {
            self.inits.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_hook_cast_round_trip() {
        let erased: ErasedValue = Arc::new(Probe {
            inits: AtomicUsize::new(0),
        });
        let hook = hook_cast::<Probe>(&erased).expect("caster should recover the value");
        hook.on_init();
        let probe = erased.downcast::<Probe>().unwrap();
        assert_eq!(probe.inits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_hook_cast_wrong_type_is_none() {
        let erased: ErasedValue = Arc::new(42i32);
        assert!(hook_cast::<Probe>(&erased).is_none());
    }
}
