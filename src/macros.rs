//! Macros for declaring named, isolated registries.
//!
//! The registry itself is an injectable value; this module only adds sugar
//! for applications that want one or more static registries addressed by
//! module name.

/// Declares a module wrapping an isolated static [`Registry`](crate::Registry).
///
/// The generated module exposes the registry handle via `registry()` plus
/// free-function sugar for the most common operations. Anything not covered
/// by the sugar goes through the handle.
///
/// # Examples
///
/// ```rust
/// use instance_registry::define_registry;
/// use std::sync::Arc;
///
/// define_registry!(app);
///
/// app::register(42i32).unwrap();
/// app::register("Hello".to_string()).unwrap();
///
/// let num: Arc<i32> = app::find().unwrap();
/// let msg: Arc<String> = app::find().unwrap();
///
/// assert_eq!(*num, 42);
/// assert_eq!(&**msg, "Hello");
/// ```
///
/// # Multiple registries
///
/// Each declared registry is completely isolated:
///
/// ```rust
/// use instance_registry::define_registry;
///
/// define_registry!(database);
/// define_registry!(cache);
///
/// database::register("db_connection".to_string()).unwrap();
///
/// assert!(database::is_registered::<String>());
/// assert!(!cache::is_registered::<String>());
/// ```
#[macro_export]
macro_rules! define_registry {
    ($name:ident) => {
        pub mod $name {
            use std::sync::{Arc, LazyLock};

            static REGISTRY: LazyLock<$crate::Registry> = LazyLock::new($crate::Registry::new);

            /// Handle to the underlying registry, for operations without
            /// free-function sugar (tags, deletion, reload, status).
            pub fn registry() -> &'static $crate::Registry {
                &REGISTRY
            }

            /// Register an eager singleton under the untagged key.
            pub fn register<T: Send + Sync + 'static>(
                value: T,
            ) -> Result<(), $crate::RegistryError> {
                REGISTRY.register(value)
            }

            /// Register a lazy singleton; the builder runs on first lookup.
            pub fn register_lazy<T, F>(builder: F) -> Result<(), $crate::RegistryError>
            where
                T: Send + Sync + 'static,
                F: Fn() -> T + Send + Sync + 'static,
            {
                REGISTRY.register_lazy(builder)
            }

            /// Register a factory; the builder runs on every lookup.
            pub fn register_factory<T, F>(builder: F) -> Result<(), $crate::RegistryError>
            where
                T: Send + Sync + 'static,
                F: Fn() -> T + Send + Sync + 'static,
            {
                REGISTRY.register_factory(builder)
            }

            /// Untagged lookup.
            pub fn find<T: Send + Sync + 'static>() -> Result<Arc<T>, $crate::RegistryError> {
                REGISTRY.find(None)
            }

            /// Untagged null-safe lookup.
            pub fn try_find<T: Send + Sync + 'static>() -> Option<Arc<T>> {
                REGISTRY.try_find(None)
            }

            /// Whether the untagged key for `T` is occupied.
            pub fn is_registered<T: Send + Sync + 'static>() -> bool {
                REGISTRY.is_registered::<T>(None)
            }

            /// Clear the registry back to its empty initial state.
            pub fn reset() {
                REGISTRY.reset()
            }
        }
    };
}
