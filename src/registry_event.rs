//! Events emitted by the registry during mutating operations.
//!
//! These events are passed to the tracing callback set via
//! `set_trace_callback`. Introspection queries (`is_registered`,
//! `is_prepared`, `status`) emit nothing; they are side-effect free.
//! The `Clone` derive allows callbacks to store or forward events if needed.

use std::fmt;

use crate::entry::EntryKind;

fn tag_str(tag: &Option<String>) -> &str {
    tag.as_deref().unwrap_or("none")
}

#[derive(Debug, Clone)]
pub enum RegistryEvent {
    /// An entry was registered.
    Register {
        type_name: &'static str,
        tag: Option<String>,
        kind: EntryKind,
        /// True for lazy and deferred registrations (builder not yet run).
        prepared: bool,
    },

    /// A lookup was performed.
    Find {
        type_name: &'static str,
        tag: Option<String>,
        found: bool,
    },

    /// A builder was invoked and produced a value (lazy first lookup, every
    /// factory lookup, or a deferred builder settling).
    Materialize {
        type_name: &'static str,
        tag: Option<String>,
    },

    /// The value or builder of an existing entry was swapped.
    Replace {
        type_name: &'static str,
        tag: Option<String>,
    },

    /// A single entry was disposed (removed, or re-prepared when fenix).
    Delete {
        type_name: &'static str,
        tag: Option<String>,
        forced: bool,
    },

    /// Every non-permanent entry was disposed.
    DeleteAll {},

    /// The registry was returned to its empty initial state.
    Reset {},

    /// An entry was disposed and re-prepared from its retained builder.
    Reload {
        type_name: &'static str,
        tag: Option<String>,
    },

    /// Every entry with a retained builder was disposed and re-prepared.
    ReloadAll {},

    /// An external collaborator signaled readiness for a materialized value.
    Ready {
        type_name: &'static str,
        tag: Option<String>,
    },
}

impl fmt::Display for RegistryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryEvent::Register {
                type_name,
                tag,
                kind,
                prepared,
            } => write!(
                f,
                "register {{ type_name: {type_name}, tag: {}, kind: {kind}, prepared: {prepared} }}",
                tag_str(tag)
            ),
            RegistryEvent::Find {
                type_name,
                tag,
                found,
            } => write!(
                f,
                "find {{ type_name: {type_name}, tag: {}, found: {found} }}",
                tag_str(tag)
            ),
            RegistryEvent::Materialize { type_name, tag } => write!(
                f,
                "materialize {{ type_name: {type_name}, tag: {} }}",
                tag_str(tag)
            ),
            RegistryEvent::Replace { type_name, tag } => write!(
                f,
                "replace {{ type_name: {type_name}, tag: {} }}",
                tag_str(tag)
            ),
            RegistryEvent::Delete {
                type_name,
                tag,
                forced,
            } => write!(
                f,
                "delete {{ type_name: {type_name}, tag: {}, forced: {forced} }}",
                tag_str(tag)
            ),
            RegistryEvent::DeleteAll {} => write!(f, "deleting all non-permanent entries"),
            RegistryEvent::Reset {} => write!(f, "resetting the registry"),
            RegistryEvent::Reload { type_name, tag } => write!(
                f,
                "reload {{ type_name: {type_name}, tag: {} }}",
                tag_str(tag)
            ),
            RegistryEvent::ReloadAll {} => write!(f, "reloading all rebuildable entries"),
            RegistryEvent::Ready { type_name, tag } => write!(
                f,
                "ready {{ type_name: {type_name}, tag: {} }}",
                tag_str(tag)
            ),
        }
    }
}
