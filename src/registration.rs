//! Typed registration builder consumed by [`Registry::put`].
//!
//! A [`Registration`] pairs a creation strategy (eager instance, shared
//! `Arc`, lazy builder, factory builder, or deferred async builder) with the
//! options that qualify the entry: tag, permanence, fenix re-preparation,
//! overwrite intent, and lifecycle participation.
//!
//! [`Registry::put`]: crate::Registry::put

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::lifecycle::{hook_cast, HookCast, Lifecycle};

pub(crate) type BoxedBuilder<T> = Box<dyn Fn() -> T + Send + Sync>;
pub(crate) type BoxedFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Creation strategy for a registration.
pub(crate) enum Source<T> {
    /// Value already constructed; stored materialized.
    Instance(T),
    /// Same, but the caller already holds an `Arc`.
    Shared(Arc<T>),
    /// Builder stored, invoked on first lookup, value cached.
    Lazy(BoxedBuilder<T>),
    /// Builder re-invoked on every lookup, value never cached.
    Factory(BoxedBuilder<T>),
    /// Async builder spawned at registration; lookups await or fail with
    /// `NotReady` until it settles.
    Deferred(BoxedFuture<T>),
}

/// One pending registration for [`Registry::put`](crate::Registry::put).
///
/// # Examples
///
/// ```rust
/// use instance_registry::{Registration, Registry};
///
/// struct Cache {
///     capacity: usize,
/// }
///
/// let registry = Registry::new();
/// registry
///     .put(
///         Registration::lazy(|| Cache { capacity: 128 })
///             .tag("session")
///             .permanent(),
///     )
///     .unwrap();
///
/// assert!(registry.is_prepared::<Cache>(Some("session")));
/// ```
pub struct Registration<T: Send + Sync + 'static> {
    pub(crate) source: Source<T>,
    pub(crate) tag: Option<String>,
    pub(crate) permanent: bool,
    pub(crate) fenix: bool,
    pub(crate) overwrite: bool,
    pub(crate) hooks: Option<HookCast>,
}

impl<T: Send + Sync + 'static> Registration<T> {
    fn new(source: Source<T>) -> Self {
        Registration {
            source,
            tag: None,
            permanent: false,
            fenix: false,
            overwrite: false,
            hooks: None,
        }
    }

    /// Eager singleton: the value is stored materialized right away.
    pub fn instance(value: T) -> Self {
        Self::new(Source::Instance(value))
    }

    /// Eager singleton from an existing `Arc`, avoiding a second wrap.
    pub fn shared(value: Arc<T>) -> Self {
        Self::new(Source::Shared(value))
    }

    /// Lazy singleton: `builder` runs at most once, on the first lookup.
    pub fn lazy(builder: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self::new(Source::Lazy(Box::new(builder)))
    }

    /// Factory: `builder` runs fresh on every lookup.
    pub fn factory(builder: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self::new(Source::Factory(Box::new(builder)))
    }

    /// Deferred singleton: `builder` is spawned onto the ambient tokio
    /// runtime at registration time and commits its value when it settles.
    pub fn deferred(builder: impl Future<Output = T> + Send + 'static) -> Self {
        Self::new(Source::Deferred(Box::pin(builder)))
    }

    /// Qualify the key with a tag. Entries under different tags are
    /// independent even for the same logical type.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Exempt the entry from bulk deletion; only forced deletion or a full
    /// reset removes it.
    pub fn permanent(mut self) -> Self {
        self.permanent = true;
        self
    }

    /// Re-prepare the entry with the same builder immediately after
    /// disposal instead of removing it. Only meaningful for registrations
    /// that retain a builder; the builder closure is reused as captured
    /// here, so it must not depend on state that goes stale across
    /// re-preparations.
    pub fn fenix(mut self) -> Self {
        self.fenix = true;
        self
    }

    /// Replace an occupied key instead of failing with
    /// `DuplicateRegistration`.
    pub fn overwrite(mut self) -> Self {
        self.overwrite = true;
        self
    }

    /// Opt the registered value into the lifecycle capability. The registry
    /// will invoke `on_init` at materialization, `on_ready` on the external
    /// ready signal, and `on_close` at disposal.
    pub fn lifecycle(mut self) -> Self
    where
        T: Lifecycle,
    {
        self.hooks = Some(hook_cast::<T>);
        self
    }
}
