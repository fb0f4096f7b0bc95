//! The instance registry core.
//!
//! A [`Registry`] owns all registration entries, resolves lookups, drives
//! lifecycle transitions, and enforces permanence, replacement, and deletion
//! rules. Entries are keyed by logical type plus an optional tag and stored
//! type-erased; the generic surface restores concrete types on the way out.
//!
//! Handles are cheap to clone and share one underlying map. All map mutation
//! is a single atomic step under the internal lock; builders and lifecycle
//! hooks run outside it, so a builder may resolve other keys from the same
//! registry.
//!
//! # Examples
//!
//! ```rust
//! use instance_registry::Registry;
//! use std::sync::Arc;
//!
//! let registry = Registry::new();
//! registry.register("Hello, World!".to_string()).unwrap();
//!
//! let message: Arc<String> = registry.find(None).unwrap();
//! assert_eq!(&*message, "Hello, World!");
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard};

use tokio::sync::watch;
use tracing::{debug, trace};

use crate::bindings::Bindings;
use crate::entry::{Entry, EntryKind, ErasedBuilder, ErasedValue, Gate, Key, Status};
use crate::lifecycle::{HookCast, Lifecycle};
use crate::registration::{Registration, Source};
use crate::registry_error::RegistryError;
use crate::registry_event::RegistryEvent;

/// Type alias for the user-supplied tracing callback.
///
/// The callback receives a reference to a [`RegistryEvent`] for every
/// mutating registry operation. It must be thread-safe because registry
/// handles are shared across threads.
pub type TraceCallback = dyn Fn(&RegistryEvent) + Send + Sync + 'static;

struct Inner {
    entries: Mutex<HashMap<Key, Entry>>,
    trace: Mutex<Option<Arc<TraceCallback>>>,
}

/// Typed instance registry and lifecycle manager.
///
/// Cloning produces another handle to the same registry.
#[derive(Clone)]
pub struct Registry {
    inner: Arc<Inner>,
}

/// Process-wide default registry.
static GLOBAL: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Returns the process-wide default registry.
///
/// Offered as a convenience for applications that want one ambient
/// instance; internal logic should keep accepting an injected [`Registry`]
/// to stay testable. Tests sharing this instance must serialize themselves
/// and call [`Registry::reset`] between runs.
pub fn global() -> &'static Registry {
    &GLOBAL
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Registry {
            inner: Arc::new(Inner {
                entries: Mutex::new(HashMap::new()),
                trace: Mutex::new(None),
            }),
        }
    }

    /// Poisoning only occurs if a thread panicked while holding the lock;
    /// recover the inner value and keep going.
    fn entries(&self) -> MutexGuard<'_, HashMap<Key, Entry>> {
        self.inner.entries.lock().unwrap_or_else(|p| p.into_inner())
    }

    // -------------------------------------------------------------------------------------------------
    // Tracing
    // -------------------------------------------------------------------------------------------------

    /// Sets a tracing callback invoked on every mutating registry operation.
    ///
    /// The callback must NOT call methods on the same registry: it is
    /// invoked while the trace lock is held and would deadlock.
    pub fn set_trace_callback(&self, callback: impl Fn(&RegistryEvent) + Send + Sync + 'static) {
        let mut guard = self.inner.trace.lock().unwrap_or_else(|p| p.into_inner());
        *guard = Some(Arc::new(callback));
    }

    /// Clears the tracing callback; no further events are emitted.
    pub fn clear_trace_callback(&self) {
        let mut guard = self.inner.trace.lock().unwrap_or_else(|p| p.into_inner());
        *guard = None;
    }

    fn emit(&self, event: &RegistryEvent) {
        let guard = self.inner.trace.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(callback) = guard.as_ref() {
            callback(event);
        }
    }

    // -------------------------------------------------------------------------------------------------
    // Registration
    // -------------------------------------------------------------------------------------------------

    /// Registers an entry described by a [`Registration`].
    ///
    /// Fails with [`RegistryError::DuplicateRegistration`] if the key is
    /// occupied and the registration carries no overwrite intent; the map is
    /// left untouched in that case.
    ///
    /// Deferred registrations spawn their builder onto the ambient tokio
    /// runtime, so `put` must run inside one for those.
    pub fn put<T: Send + Sync + 'static>(
        &self,
        registration: Registration<T>,
    ) -> Result<(), RegistryError> {
        let Registration {
            source,
            tag,
            permanent,
            fenix,
            overwrite,
            hooks,
        } = registration;
        let key = Key::of::<T>(tag.as_deref());
        let type_name = std::any::type_name::<T>();

        match source {
            Source::Instance(value) => {
                self.put_materialized(key, Arc::new(value), type_name, permanent, fenix, overwrite, hooks)
            }
            Source::Shared(value) => {
                self.put_materialized(key, value, type_name, permanent, fenix, overwrite, hooks)
            }
            Source::Lazy(builder) => {
                let builder: ErasedBuilder = Arc::new(move || Arc::new(builder()) as ErasedValue);
                self.put_prepared(
                    key,
                    EntryKind::Singleton,
                    builder,
                    type_name,
                    permanent,
                    fenix,
                    overwrite,
                    hooks,
                )
            }
            Source::Factory(builder) => {
                let builder: ErasedBuilder = Arc::new(move || Arc::new(builder()) as ErasedValue);
                self.put_prepared(
                    key,
                    EntryKind::Factory,
                    builder,
                    type_name,
                    permanent,
                    fenix,
                    overwrite,
                    hooks,
                )
            }
            Source::Deferred(future) => {
                let (tx, rx) = watch::channel(Gate::Pending);
                {
                    let mut entries = self.entries();
                    if entries.contains_key(&key) && !overwrite {
                        return Err(RegistryError::DuplicateRegistration {
                            type_name,
                            tag: key.tag,
                        });
                    }
                    entries.insert(
                        key.clone(),
                        Entry {
                            kind: EntryKind::Singleton,
                            permanent,
                            fenix,
                            builder: None,
                            value: None,
                            hooks,
                            init: false,
                            ready: false,
                            pending: Some(rx),
                        },
                    );
                }
                self.emit(&RegistryEvent::Register {
                    type_name,
                    tag: key.tag.clone(),
                    kind: EntryKind::Singleton,
                    prepared: true,
                });
                debug!(type_name, tag = ?key.tag, "registered deferred singleton");

                let registry = self.clone();
                tokio::spawn(async move {
                    let value: ErasedValue = Arc::new(future.await);
                    let hook = hooks.and_then(|cast| cast(&value));
                    if let Some(hook) = &hook {
                        hook.on_init();
                    }
                    let committed = {
                        let mut entries = registry.entries();
                        match entries.get_mut(&key) {
                            // Commit only if the entry is still awaiting us;
                            // a replacement or deletion in the meantime wins.
                            Some(entry) if entry.pending.is_some() && entry.value.is_none() => {
                                entry.value = Some(value);
                                entry.init = hook.is_some();
                                true
                            }
                            _ => false,
                        }
                    };
                    if committed {
                        registry.emit(&RegistryEvent::Materialize {
                            type_name,
                            tag: key.tag.clone(),
                        });
                        debug!(type_name, tag = ?key.tag, "deferred singleton settled");
                    }
                    let _ = tx.send(Gate::Ready);
                });
                Ok(())
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn put_materialized(
        &self,
        key: Key,
        value: ErasedValue,
        type_name: &'static str,
        permanent: bool,
        fenix: bool,
        overwrite: bool,
        hooks: Option<HookCast>,
    ) -> Result<(), RegistryError> {
        let hook = {
            let mut entries = self.entries();
            if entries.contains_key(&key) && !overwrite {
                return Err(RegistryError::DuplicateRegistration {
                    type_name,
                    tag: key.tag,
                });
            }
            let hook = hooks.and_then(|cast| cast(&value));
            entries.insert(
                key.clone(),
                Entry {
                    kind: EntryKind::Singleton,
                    permanent,
                    fenix,
                    builder: None,
                    value: Some(value),
                    hooks,
                    init: hook.is_some(),
                    ready: false,
                    pending: None,
                },
            );
            hook
        };
        self.emit(&RegistryEvent::Register {
            type_name,
            tag: key.tag.clone(),
            kind: EntryKind::Singleton,
            prepared: false,
        });
        debug!(type_name, tag = ?key.tag, permanent, "registered eager singleton");
        if let Some(hook) = hook {
            hook.on_init();
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn put_prepared(
        &self,
        key: Key,
        kind: EntryKind,
        builder: ErasedBuilder,
        type_name: &'static str,
        permanent: bool,
        fenix: bool,
        overwrite: bool,
        hooks: Option<HookCast>,
    ) -> Result<(), RegistryError> {
        {
            let mut entries = self.entries();
            if entries.contains_key(&key) && !overwrite {
                return Err(RegistryError::DuplicateRegistration {
                    type_name,
                    tag: key.tag,
                });
            }
            entries.insert(
                key.clone(),
                Entry {
                    kind,
                    permanent,
                    fenix,
                    builder: Some(builder),
                    value: None,
                    hooks,
                    init: false,
                    ready: false,
                    pending: None,
                },
            );
        }
        self.emit(&RegistryEvent::Register {
            type_name,
            tag: key.tag.clone(),
            kind,
            prepared: true,
        });
        debug!(type_name, tag = ?key.tag, %kind, "registered prepared entry");
        Ok(())
    }

    /// Registers an eager singleton under the untagged key.
    pub fn register<T: Send + Sync + 'static>(&self, value: T) -> Result<(), RegistryError> {
        self.put(Registration::instance(value))
    }

    /// Registers an eager singleton from an existing `Arc`, avoiding an
    /// additional wrap.
    pub fn register_arc<T: Send + Sync + 'static>(&self, value: Arc<T>) -> Result<(), RegistryError> {
        self.put(Registration::shared(value))
    }

    /// Registers a lazy singleton; `builder` runs on the first lookup.
    pub fn register_lazy<T, F>(&self, builder: F) -> Result<(), RegistryError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.put(Registration::lazy(builder))
    }

    /// Registers a factory; `builder` runs fresh on every lookup.
    pub fn register_factory<T, F>(&self, builder: F) -> Result<(), RegistryError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.put(Registration::factory(builder))
    }

    /// Registers a deferred singleton; `builder` is spawned immediately and
    /// commits its value when it settles. Must run inside a tokio runtime.
    pub fn register_deferred<T, F>(&self, builder: F) -> Result<(), RegistryError>
    where
        T: Send + Sync + 'static,
        F: Future<Output = T> + Send + 'static,
    {
        self.put(Registration::deferred(builder))
    }

    // -------------------------------------------------------------------------------------------------
    // Lookup
    // -------------------------------------------------------------------------------------------------

    /// Looks up the entry for `T` under `tag`.
    ///
    /// A prepared singleton is materialized at this point: the builder runs
    /// now, `on_init` fires if the registration opted into the lifecycle
    /// capability, and every later lookup returns the same value identity.
    /// Factory entries re-invoke their builder on every call.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotRegistered`] if the key is absent
    /// - [`RegistryError::NotReady`] if a deferred builder has not settled
    pub fn find<T: Send + Sync + 'static>(
        &self,
        tag: Option<&str>,
    ) -> Result<Arc<T>, RegistryError> {
        let result = self.lookup::<T>(tag);
        self.emit(&RegistryEvent::Find {
            type_name: std::any::type_name::<T>(),
            tag: tag.map(str::to_owned),
            found: result.is_ok(),
        });
        result
    }

    fn lookup<T: Send + Sync + 'static>(
        &self,
        tag: Option<&str>,
    ) -> Result<Arc<T>, RegistryError> {
        let key = Key::of::<T>(tag);
        let type_name = std::any::type_name::<T>();

        enum Hit {
            Value(ErasedValue),
            Build {
                builder: ErasedBuilder,
                hooks: Option<HookCast>,
                factory: bool,
            },
            Pending,
        }

        let hit = {
            let entries = self.entries();
            let entry = entries
                .get(&key)
                .ok_or_else(|| RegistryError::NotRegistered {
                    type_name,
                    tag: key.tag.clone(),
                })?;
            match (&entry.value, &entry.builder, entry.kind) {
                (_, Some(builder), EntryKind::Factory) => Hit::Build {
                    builder: Arc::clone(builder),
                    hooks: entry.hooks,
                    factory: true,
                },
                (Some(value), _, _) => Hit::Value(Arc::clone(value)),
                (None, Some(builder), _) => Hit::Build {
                    builder: Arc::clone(builder),
                    hooks: entry.hooks,
                    factory: false,
                },
                (None, None, _) => Hit::Pending,
            }
        };

        match hit {
            Hit::Value(value) => downcast::<T>(value),
            Hit::Pending => Err(RegistryError::NotReady {
                type_name,
                tag: key.tag,
            }),
            Hit::Build {
                builder,
                hooks,
                factory,
            } => {
                // Builder and init hook run outside the lock so they may
                // resolve other keys from this registry.
                let value = builder();
                let hook = hooks.and_then(|cast| cast(&value));
                if let Some(hook) = &hook {
                    hook.on_init();
                }
                self.emit(&RegistryEvent::Materialize {
                    type_name,
                    tag: key.tag.clone(),
                });
                if factory {
                    trace!(type_name, tag = ?key.tag, "factory produced a fresh value");
                    return downcast::<T>(value);
                }
                let committed = {
                    let mut entries = self.entries();
                    match entries.get_mut(&key) {
                        Some(entry) => match &entry.value {
                            // Lost a (contract-violating) race: the first
                            // committed value keeps its identity.
                            Some(existing) => Arc::clone(existing),
                            None => {
                                entry.value = Some(Arc::clone(&value));
                                entry.init = hook.is_some();
                                value
                            }
                        },
                        // Entry deleted mid-materialization; hand the built
                        // value to the caller who initiated it.
                        None => value,
                    }
                };
                debug!(type_name, tag = ?key.tag, "materialized lazy singleton");
                downcast::<T>(committed)
            }
        }
    }

    /// Null-safe lookup variant: `None` where [`Registry::find`] would fail.
    /// Still materializes prepared singletons.
    pub fn try_find<T: Send + Sync + 'static>(&self, tag: Option<&str>) -> Option<Arc<T>> {
        self.find(tag).ok()
    }

    /// Looks up `T`, cooperatively awaiting a deferred builder's completion
    /// token first. Suspends only the calling task; unrelated registry
    /// operations proceed. A deferred builder that failed leaves
    /// [`RegistryError::NotReady`] and discards the entry, unless the key
    /// was replaced or overwritten in the meantime; then the lookup resolves
    /// against the current entry.
    pub async fn find_ready<T: Send + Sync + 'static>(
        &self,
        tag: Option<&str>,
    ) -> Result<Arc<T>, RegistryError> {
        let key = Key::of::<T>(tag);
        let type_name = std::any::type_name::<T>();
        let pending = {
            let entries = self.entries();
            entries
                .get(&key)
                .filter(|entry| entry.value.is_none())
                .and_then(|entry| entry.pending.clone())
        };
        if let Some(mut rx) = pending {
            loop {
                if *rx.borrow() == Gate::Ready {
                    break;
                }
                if rx.changed().await.is_err() {
                    // Sender dropped without settling: the builder failed.
                    // Discard only while the entry still carries this token;
                    // an overwrite or replace in the meantime owns the key
                    // now, and a failed operation must not touch it.
                    let discarded = {
                        let mut entries = self.entries();
                        let stale = entries.get(&key).is_some_and(|entry| {
                            entry.value.is_none()
                                && entry
                                    .pending
                                    .as_ref()
                                    .is_some_and(|token| token.same_channel(&rx))
                        });
                        if stale {
                            entries.remove(&key);
                        }
                        stale
                    };
                    if discarded {
                        debug!(type_name, tag = ?key.tag, "deferred builder failed; entry discarded");
                        return Err(RegistryError::NotReady {
                            type_name,
                            tag: key.tag,
                        });
                    }
                    break;
                }
            }
        }
        self.find(tag)
    }

    /// Call-style sugar: untagged [`Registry::find`].
    pub fn get<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, RegistryError> {
        self.find(None)
    }

    /// Untagged lookup returning an owned clone of the stored value.
    pub fn get_cloned<T: Send + Sync + Clone + 'static>(&self) -> Result<T, RegistryError> {
        let value = self.find::<T>(None)?;
        Ok((*value).clone())
    }

    // -------------------------------------------------------------------------------------------------
    // Replacement
    // -------------------------------------------------------------------------------------------------

    /// Substitutes a materialized value for an existing key, preserving the
    /// tag, permanence, fenix flag, and lifecycle opt-in.
    ///
    /// The old value's `on_close` is NOT invoked: replacement is a swap, not
    /// a close. Callers needing cleanup of the old value handle it
    /// themselves. The new value gets `on_init` if the entry carries the
    /// lifecycle capability.
    pub fn replace<T: Send + Sync + 'static>(
        &self,
        value: T,
        tag: Option<&str>,
    ) -> Result<(), RegistryError> {
        let key = Key::of::<T>(tag);
        let type_name = std::any::type_name::<T>();
        let erased: ErasedValue = Arc::new(value);
        let hook = {
            let mut entries = self.entries();
            let entry = entries
                .get_mut(&key)
                .ok_or_else(|| RegistryError::NotRegistered {
                    type_name,
                    tag: key.tag.clone(),
                })?;
            let hook = entry.hooks.and_then(|cast| cast(&erased));
            entry.kind = EntryKind::Singleton;
            entry.builder = None;
            entry.value = Some(erased);
            entry.init = hook.is_some();
            entry.ready = false;
            entry.pending = None;
            hook
        };
        self.emit(&RegistryEvent::Replace {
            type_name,
            tag: key.tag.clone(),
        });
        debug!(type_name, tag = ?key.tag, "replaced with eager value");
        if let Some(hook) = hook {
            hook.on_init();
        }
        Ok(())
    }

    /// Substitutes the builder for an existing key, returning the entry to
    /// its prepared state; the next lookup re-materializes. Preserves the
    /// tag, kind, permanence, fenix flag, and lifecycle opt-in. As with
    /// [`Registry::replace`], the old value's `on_close` is not invoked.
    pub fn replace_lazy<T, F>(&self, builder: F, tag: Option<&str>) -> Result<(), RegistryError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let key = Key::of::<T>(tag);
        let type_name = std::any::type_name::<T>();
        let erased: ErasedBuilder = Arc::new(move || Arc::new(builder()) as ErasedValue);
        {
            let mut entries = self.entries();
            let entry = entries
                .get_mut(&key)
                .ok_or_else(|| RegistryError::NotRegistered {
                    type_name,
                    tag: key.tag.clone(),
                })?;
            entry.builder = Some(erased);
            entry.re_prepare();
        }
        self.emit(&RegistryEvent::Replace {
            type_name,
            tag: key.tag.clone(),
        });
        debug!(type_name, tag = ?key.tag, "replaced with lazy builder");
        Ok(())
    }

    // -------------------------------------------------------------------------------------------------
    // Deletion
    // -------------------------------------------------------------------------------------------------

    /// Deletes the entry for `T` under `tag`, invoking `on_close` on a
    /// materialized lifecycle-aware value. Fenix entries are re-prepared
    /// with their retained builder instead of removed.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotRegistered`] if the key is absent
    /// - [`RegistryError::PermanentProtected`] for permanent entries; use
    ///   [`Registry::force_delete`]
    pub fn delete<T: Send + Sync + 'static>(&self, tag: Option<&str>) -> Result<(), RegistryError> {
        self.remove::<T>(tag, false)
    }

    /// Deletes the entry even if it is permanent or fenix.
    pub fn force_delete<T: Send + Sync + 'static>(
        &self,
        tag: Option<&str>,
    ) -> Result<(), RegistryError> {
        self.remove::<T>(tag, true)
    }

    fn remove<T: Send + Sync + 'static>(
        &self,
        tag: Option<&str>,
        force: bool,
    ) -> Result<(), RegistryError> {
        let key = Key::of::<T>(tag);
        let type_name = std::any::type_name::<T>();
        let hook = {
            let mut entries = self.entries();
            let entry = entries
                .get(&key)
                .ok_or_else(|| RegistryError::NotRegistered {
                    type_name,
                    tag: key.tag.clone(),
                })?;
            if entry.permanent && !force {
                return Err(RegistryError::PermanentProtected {
                    type_name,
                    tag: key.tag.clone(),
                });
            }
            let fenix = entry.fenix && entry.builder.is_some() && !force;
            if fenix {
                match entries.get_mut(&key) {
                    Some(entry) => {
                        let hook = entry.lifecycle_hook();
                        entry.re_prepare();
                        hook
                    }
                    None => None,
                }
            } else {
                entries.remove(&key).and_then(|entry| entry.lifecycle_hook())
            }
        };
        self.emit(&RegistryEvent::Delete {
            type_name,
            tag: key.tag.clone(),
            forced: force,
        });
        debug!(type_name, tag = ?key.tag, forced = force, "deleted entry");
        if let Some(hook) = hook {
            hook.on_close();
        }
        Ok(())
    }

    /// Disposes every non-permanent entry: materialized lifecycle-aware
    /// values get `on_close`, fenix entries are re-prepared, everything else
    /// is removed. Permanent entries are untouched; [`Registry::reset`] is
    /// the forced variant.
    pub fn delete_all(&self) {
        let hooks: Vec<Arc<dyn Lifecycle>> = {
            let mut entries = self.entries();
            let mut hooks = Vec::new();
            entries.retain(|_, entry| {
                if entry.permanent {
                    return true;
                }
                if let Some(hook) = entry.lifecycle_hook() {
                    hooks.push(hook);
                }
                if entry.fenix && entry.builder.is_some() {
                    entry.re_prepare();
                    true
                } else {
                    false
                }
            });
            hooks
        };
        self.emit(&RegistryEvent::DeleteAll {});
        debug!(closed = hooks.len(), "deleted all non-permanent entries");
        for hook in hooks {
            hook.on_close();
        }
    }

    /// Clears the entire registry including permanent entries, invoking
    /// `on_close` on every materialized lifecycle-aware value. Returns the
    /// registry to its empty initial state; the canonical operation for
    /// test isolation between independent runs.
    pub fn reset(&self) {
        let hooks: Vec<Arc<dyn Lifecycle>> = {
            let mut entries = self.entries();
            let hooks = entries
                .values()
                .filter_map(Entry::lifecycle_hook)
                .collect();
            entries.clear();
            hooks
        };
        self.emit(&RegistryEvent::Reset {});
        debug!(closed = hooks.len(), "reset registry");
        for hook in hooks {
            hook.on_close();
        }
    }

    // -------------------------------------------------------------------------------------------------
    // Reload
    // -------------------------------------------------------------------------------------------------

    /// Disposes the current materialized value (close hook included) and
    /// re-prepares the entry from its retained builder, so the next lookup
    /// re-materializes.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotRegistered`] if the key is absent
    /// - [`RegistryError::NotReloadable`] if no builder was retained
    ///   (eager singletons)
    pub fn reload<T: Send + Sync + 'static>(&self, tag: Option<&str>) -> Result<(), RegistryError> {
        let key = Key::of::<T>(tag);
        let type_name = std::any::type_name::<T>();
        let hook = {
            let mut entries = self.entries();
            let entry = entries
                .get_mut(&key)
                .ok_or_else(|| RegistryError::NotRegistered {
                    type_name,
                    tag: key.tag.clone(),
                })?;
            if entry.builder.is_none() {
                return Err(RegistryError::NotReloadable {
                    type_name,
                    tag: key.tag.clone(),
                });
            }
            let hook = entry.lifecycle_hook();
            entry.re_prepare();
            hook
        };
        self.emit(&RegistryEvent::Reload {
            type_name,
            tag: key.tag.clone(),
        });
        debug!(type_name, tag = ?key.tag, "reloaded entry");
        if let Some(hook) = hook {
            hook.on_close();
        }
        Ok(())
    }

    /// Reloads every entry that retains a builder; entries without one
    /// (eager singletons) are left untouched.
    pub fn reload_all(&self) {
        let hooks: Vec<Arc<dyn Lifecycle>> = {
            let mut entries = self.entries();
            let mut hooks = Vec::new();
            for entry in entries.values_mut() {
                if entry.builder.is_some() {
                    if let Some(hook) = entry.lifecycle_hook() {
                        hooks.push(hook);
                    }
                    entry.re_prepare();
                }
            }
            hooks
        };
        self.emit(&RegistryEvent::ReloadAll {});
        debug!(closed = hooks.len(), "reloaded all rebuildable entries");
        for hook in hooks {
            hook.on_close();
        }
    }

    // -------------------------------------------------------------------------------------------------
    // Ready signal
    // -------------------------------------------------------------------------------------------------

    /// Marks the materialized value for `T` under `tag` as ready and
    /// invokes `on_ready` once if the entry carries the lifecycle
    /// capability. The registry never drives this transition itself; it is
    /// the hook invocation point for the consumer-facing runtime.
    ///
    /// Idempotent: a second signal is a no-op.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotRegistered`] if the key is absent
    /// - [`RegistryError::NotReady`] if no value is materialized yet
    pub fn signal_ready<T: Send + Sync + 'static>(
        &self,
        tag: Option<&str>,
    ) -> Result<(), RegistryError> {
        let key = Key::of::<T>(tag);
        let type_name = std::any::type_name::<T>();
        let hook = {
            let mut entries = self.entries();
            let entry = entries
                .get_mut(&key)
                .ok_or_else(|| RegistryError::NotRegistered {
                    type_name,
                    tag: key.tag.clone(),
                })?;
            if entry.value.is_none() {
                return Err(RegistryError::NotReady {
                    type_name,
                    tag: key.tag.clone(),
                });
            }
            if entry.ready {
                return Ok(());
            }
            entry.ready = true;
            entry.lifecycle_hook()
        };
        self.emit(&RegistryEvent::Ready {
            type_name,
            tag: key.tag.clone(),
        });
        trace!(type_name, tag = ?key.tag, "ready signaled");
        if let Some(hook) = hook {
            hook.on_ready();
        }
        Ok(())
    }

    // -------------------------------------------------------------------------------------------------
    // Introspection (side-effect free: no materialization, no events)
    // -------------------------------------------------------------------------------------------------

    /// True if an entry exists for `T` under `tag`.
    pub fn is_registered<T: Send + Sync + 'static>(&self, tag: Option<&str>) -> bool {
        self.entries().contains_key(&Key::of::<T>(tag))
    }

    /// True only for un-materialized lazy entries and for factories.
    pub fn is_prepared<T: Send + Sync + 'static>(&self, tag: Option<&str>) -> bool {
        self.entries()
            .get(&Key::of::<T>(tag))
            .is_some_and(Entry::is_prepared)
    }

    /// Consolidated status snapshot; `None` if the key is absent.
    pub fn status<T: Send + Sync + 'static>(&self, tag: Option<&str>) -> Option<Status> {
        self.entries().get(&Key::of::<T>(tag)).map(Entry::status)
    }

    // -------------------------------------------------------------------------------------------------
    // Bindings
    // -------------------------------------------------------------------------------------------------

    /// Runs a binding's registrations against this registry. The host
    /// application decides when; the registry performs no discovery.
    pub fn install(&self, bindings: &dyn Bindings) {
        bindings.dependencies(self);
    }
}

fn downcast<T: Send + Sync + 'static>(value: ErasedValue) -> Result<Arc<T>, RegistryError> {
    value
        .downcast::<T>()
        .map_err(|_| RegistryError::TypeMismatch {
            type_name: std::any::type_name::<T>(),
        })
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_register_and_find() -> Result<(), RegistryError> {
        let registry = Registry::new();
        registry.register(42i32)?;

        let num: Arc<i32> = registry.find(None)?;
        assert_eq!(*num, 42);

        let num_2 = registry.find::<i32>(None)?;
        assert_eq!(*num_2, 42);
        Ok(())
    }

    #[test]
    fn test_find_nonexistent() {
        let registry = Registry::new();
        let result: Result<Arc<String>, _> = registry.find(None);
        assert_eq!(
            result.unwrap_err(),
            RegistryError::NotRegistered {
                type_name: "alloc::string::String",
                tag: None,
            }
        );
    }

    #[test]
    fn test_duplicate_registration_is_a_noop() {
        let registry = Registry::new();
        registry.register(10i32).unwrap();
        let err = registry.register(20i32).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateRegistration { .. }));

        // The occupied entry is untouched.
        assert_eq!(*registry.find::<i32>(None).unwrap(), 10);
    }

    #[test]
    fn test_overwrite_intent_replaces() {
        let registry = Registry::new();
        registry.register(10i32).unwrap();
        registry
            .put(Registration::instance(20i32).overwrite())
            .unwrap();
        assert_eq!(*registry.find::<i32>(None).unwrap(), 20);
    }

    #[test]
    fn test_lazy_builder_not_invoked_at_registration() {
        let registry = Registry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        registry
            .register_lazy(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                "built".to_string()
            })
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(registry.is_prepared::<String>(None));

        let value: Arc<String> = registry.find(None).unwrap();
        assert_eq!(&*value, "built");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!registry.is_prepared::<String>(None));
    }

    #[test]
    fn test_singleton_identity_is_stable() {
        let registry = Registry::new();
        registry.register_lazy(|| vec![1u8, 2, 3]).unwrap();

        let first: Arc<Vec<u8>> = registry.find(None).unwrap();
        let second: Arc<Vec<u8>> = registry.find(None).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_register_arc_shares_identity() {
        let registry = Registry::new();
        let value = Arc::new(7u32);
        registry.register_arc(Arc::clone(&value)).unwrap();

        let retrieved: Arc<u32> = registry.find(None).unwrap();
        assert!(Arc::ptr_eq(&value, &retrieved));
    }

    #[test]
    fn test_get_cloned() {
        let registry = Registry::new();
        registry.register("hello".to_string()).unwrap();
        let value: String = registry.get_cloned::<String>().unwrap();
        assert_eq!(value, "hello");
    }

    #[test]
    fn test_status_snapshot() {
        let registry = Registry::new();
        registry
            .put(Registration::lazy(|| 1i64).tag("job").permanent())
            .unwrap();

        let status = registry.status::<i64>(Some("job")).unwrap();
        assert_eq!(status.kind, EntryKind::Singleton);
        assert!(status.prepared);
        assert!(status.permanent);
        assert!(!status.initialized);
        assert!(!status.ready);
        assert!(!status.pending);

        assert!(registry.status::<i64>(None).is_none());
    }

    #[test]
    fn test_handles_share_one_map() {
        let registry = Registry::new();
        let handle = registry.clone();
        handle.register(5u8).unwrap();
        assert_eq!(*registry.find::<u8>(None).unwrap(), 5);
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Barrier;
        use std::thread;

        let registry = Registry::new();
        let barrier = Arc::new(Barrier::new(2));

        let reg = registry.clone();
        let gate = Arc::clone(&barrier);
        let handle = thread::spawn(move || {
            reg.register(100u32).unwrap();
            gate.wait();
            let s: Arc<String> = reg.find(None).unwrap();
            assert_eq!(&*s, "main_thread_value");
        });

        registry.register("main_thread_value".to_string()).unwrap();
        barrier.wait();
        handle.join().unwrap();

        let num: Arc<u32> = registry.find(None).unwrap();
        assert_eq!(*num, 100);
    }
}
