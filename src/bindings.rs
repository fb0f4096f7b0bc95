//! External binding contract.
//!
//! A binding bundles the registrations a route or feature needs. The host
//! application decides when to install one; the registry is purely the
//! receiving end and performs no discovery.

use crate::registry::Registry;

/// A batch of registrations performed against a passed-in registry handle.
///
/// # Examples
///
/// ```rust
/// use instance_registry::{Bindings, Registry};
///
/// struct HttpClient;
/// struct SessionStore;
///
/// struct CheckoutBindings;
///
/// impl Bindings for CheckoutBindings {
///     fn dependencies(&self, registry: &Registry) {
///         registry
///             .register_lazy(|| HttpClient)
///             .expect("http client registered twice");
///         registry
///             .register_lazy(|| SessionStore)
///             .expect("session store registered twice");
///     }
/// }
///
/// let registry = Registry::new();
/// registry.install(&CheckoutBindings);
/// assert!(registry.is_registered::<HttpClient>(None));
/// assert!(registry.is_registered::<SessionStore>(None));
/// ```
pub trait Bindings {
    /// Perform zero or more registration calls against `registry`.
    fn dependencies(&self, registry: &Registry);
}
