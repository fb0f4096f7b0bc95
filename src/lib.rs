//! # Instance Registry
//!
//! A typed instance registry and lifecycle manager: the dependency-injection
//! substrate an application uses to create, store, retrieve, and dispose of
//! shared objects under a key derived from a logical type and an optional
//! tag.
//!
//! ## Quick Start
//!
//! ```rust
//! use instance_registry::Registry;
//! use std::sync::Arc;
//!
//! let registry = Registry::new();
//!
//! // Register a value eagerly, and one lazily.
//! registry.register("Hello, World!".to_string()).unwrap();
//! registry.register_lazy(|| 42i32).unwrap();
//!
//! // Retrieve them; the lazy builder runs on this first lookup.
//! let message: Arc<String> = registry.find(None).unwrap();
//! let answer: Arc<i32> = registry.find(None).unwrap();
//!
//! assert_eq!(&*message, "Hello, World!");
//! assert_eq!(*answer, 42);
//! ```
//!
//! ## Features
//!
//! - **Creation strategies**: eager, lazy (builder runs once, on first
//!   lookup), factory (builder runs on every lookup), and deferred (async
//!   builder awaited through a completion token).
//! - **Tag-qualified keys**: the same logical type can be registered under
//!   several tags as independent entries.
//! - **Lifecycle tracking**: values may opt into `on_init` / `on_ready` /
//!   `on_close` hooks the registry invokes at the right transitions.
//! - **Permanence and fenix**: entries can survive bulk deletion, or
//!   re-prepare themselves with the same builder after disposal.
//! - **Thread-safe**: handles are `Clone + Send + Sync` and share one map.
//! - **Tracing support**: per-registry callback observing every mutating
//!   operation.
//!
//! ## Main Types
//!
//! - [`Registry`] - the registry itself; [`global`] for the process-wide one
//! - [`Registration`] - registration builder consumed by [`Registry::put`]
//! - [`Lifecycle`] - optional capability hook set for registered values
//! - [`Bindings`] - batch-registration contract for routes/features
//! - [`Status`] - consolidated, side-effect-free entry snapshot

mod bindings;
mod entry;
mod lifecycle;
mod macros;
mod registration;
mod registry;
mod registry_error;
mod registry_event;

pub use bindings::Bindings;
pub use entry::{EntryKind, Status};
pub use lifecycle::Lifecycle;
pub use registration::Registration;
pub use registry::{global, Registry, TraceCallback};
pub use registry_error::RegistryError;
pub use registry_event::RegistryEvent;
