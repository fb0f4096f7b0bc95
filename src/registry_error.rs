//! Error taxonomy for registry operations.
//!
//! Every variant is a local, recoverable condition surfaced to the immediate
//! caller. A failed operation never mutates the registry map.

use thiserror::Error;

fn tag_suffix(tag: &Option<String>) -> String {
    match tag {
        Some(tag) => format!(" (tag \"{tag}\")"),
        None => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Lookup, replace, reload, delete, or ready signal on an absent key.
    #[error("no entry registered for {type_name}{}", tag_suffix(.tag))]
    NotRegistered {
        type_name: &'static str,
        tag: Option<String>,
    },

    /// Registration on an occupied key without overwrite intent.
    #[error("{type_name}{} is already registered", tag_suffix(.tag))]
    DuplicateRegistration {
        type_name: &'static str,
        tag: Option<String>,
    },

    /// Reload on an entry that retains no builder (eager singleton).
    #[error("{type_name}{} has no retained builder to reload from", tag_suffix(.tag))]
    NotReloadable {
        type_name: &'static str,
        tag: Option<String>,
    },

    /// Synchronous lookup or ready signal on a value that is not yet
    /// materialized (a deferred builder still in flight, or failed).
    #[error("{type_name}{} is not ready yet", tag_suffix(.tag))]
    NotReady {
        type_name: &'static str,
        tag: Option<String>,
    },

    /// Delete of a permanent entry without the force flag.
    #[error("{type_name}{} is permanent; pass force to delete it", tag_suffix(.tag))]
    PermanentProtected {
        type_name: &'static str,
        tag: Option<String>,
    },

    /// Stored value failed to downcast to the requested type. Keys carry the
    /// `TypeId`, so this is unreachable short of a bug in the registry.
    #[error("type mismatch in registry for {type_name}")]
    TypeMismatch { type_name: &'static str },
}
