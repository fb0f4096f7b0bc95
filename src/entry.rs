//! Internal entry representation and the public status snapshot.
//!
//! An entry is one registration slot, keyed by logical type plus an optional
//! tag. Values and builders are stored type-erased; the public surface in
//! `registry.rs` restores the concrete type on the way out.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

use crate::lifecycle::{HookCast, Lifecycle};

/// Type-erased instance storage, shared with every caller that looked it up.
pub(crate) type ErasedValue = Arc<dyn Any + Send + Sync>;

/// Type-erased zero-argument builder producing an [`ErasedValue`].
pub(crate) type ErasedBuilder = Arc<dyn Fn() -> ErasedValue + Send + Sync>;

/// Registry key: the logical type the instance was registered under, plus an
/// optional tag. The same logical type under two different tags (including
/// absent vs present) forms two independent entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct Key {
    pub(crate) type_id: TypeId,
    pub(crate) tag: Option<String>,
}

impl Key {
    pub(crate) fn of<T: 'static>(tag: Option<&str>) -> Self {
        Key {
            type_id: TypeId::of::<T>(),
            tag: tag.map(str::to_owned),
        }
    }
}

/// Whether an entry caches its realized value or rebuilds it on every lookup.
///
/// Permanence is not a third kind: it is an independent flag, so permanent
/// factories are expressible and the status query can report both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Realized at most once and reused for every subsequent lookup.
    Singleton,
    /// Builder re-invoked on every lookup; nothing is retained.
    Factory,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Singleton => write!(f, "singleton"),
            EntryKind::Factory => write!(f, "factory"),
        }
    }
}

/// Completion token state for deferred (async) registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Gate {
    Pending,
    Ready,
}

/// One registration slot.
pub(crate) struct Entry {
    pub(crate) kind: EntryKind,
    pub(crate) permanent: bool,
    pub(crate) fenix: bool,
    pub(crate) builder: Option<ErasedBuilder>,
    pub(crate) value: Option<ErasedValue>,
    /// Capability caster captured at registration when the value opted into
    /// the lifecycle contract; `None` means no hooks are ever invoked.
    pub(crate) hooks: Option<HookCast>,
    pub(crate) init: bool,
    pub(crate) ready: bool,
    pub(crate) pending: Option<watch::Receiver<Gate>>,
}

impl Entry {
    /// True while the entry has no durable value. Factories count as
    /// prepared always, since each lookup performs an isolated realization.
    pub(crate) fn is_prepared(&self) -> bool {
        self.kind == EntryKind::Factory || self.value.is_none()
    }

    /// The lifecycle handle of the materialized value, if the entry holds a
    /// value and the registration opted into the capability.
    pub(crate) fn lifecycle_hook(&self) -> Option<Arc<dyn Lifecycle>> {
        match (&self.value, self.hooks) {
            (Some(value), Some(cast)) => cast(value),
            _ => None,
        }
    }

    /// Return the entry to its prepared state with the same builder. Starts
    /// a fresh lifecycle for the next realized value, so the flags reset.
    pub(crate) fn re_prepare(&mut self) {
        self.value = None;
        self.init = false;
        self.ready = false;
        self.pending = None;
    }

    pub(crate) fn status(&self) -> Status {
        Status {
            kind: self.kind,
            prepared: self.is_prepared(),
            permanent: self.permanent,
            initialized: self.init,
            ready: self.ready,
            pending: self.pending.is_some() && self.value.is_none(),
        }
    }
}

/// Side-effect-free snapshot of one entry, returned by [`Registry::status`].
///
/// [`Registry::status`]: crate::Registry::status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    /// Singleton or factory registration.
    pub kind: EntryKind,
    /// True for un-materialized lazy entries and for every factory.
    pub prepared: bool,
    /// Exempt from bulk deletion unless forced.
    pub permanent: bool,
    /// The materialized value has had its init hook run.
    pub initialized: bool,
    /// An external collaborator signaled readiness.
    pub ready: bool,
    /// A deferred builder is still in flight.
    pub pending: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_distinguishes_tags() {
        let untagged = Key::of::<String>(None);
        let tagged = Key::of::<String>(Some("a"));
        let other = Key::of::<String>(Some("b"));
        assert_ne!(untagged, tagged);
        assert_ne!(tagged, other);
        assert_eq!(tagged, Key::of::<String>(Some("a")));
    }

    #[test]
    fn test_key_distinguishes_types() {
        assert_ne!(Key::of::<String>(None), Key::of::<i32>(None));
    }

    #[test]
    fn test_entry_kind_display() {
        assert_eq!(EntryKind::Singleton.to_string(), "singleton");
        assert_eq!(EntryKind::Factory.to_string(), "factory");
    }
}
