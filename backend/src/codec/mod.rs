//! Configuration codec
//!
//! Captures a [`ProjectConfiguration`](crate::ProjectConfiguration) into a
//! transportable, untyped state mapping and restores it again, so that a
//! configuration can be attached to a work-queue message and rebuilt in an
//! independent worker process.
//!
//! - **naming**: canonical field names to the model's accessor names
//! - **enums**: symbolic names for enumerated values, singleton lookup
//! - **state**: the capture/restore protocol itself

use thiserror::Error;

pub mod enums;
pub mod naming;
pub mod state;

pub use enums::{decode, encode, enum_registry, EnumRegistry, NamedEnum};
pub use naming::to_camel_case;
pub use state::{capture, restore, ConfigurationState, SCHEMA_VERSION};

/// Errors raised while decoding enumerated values or restoring a state.
///
/// None of these are recovered locally. A failed restore may leave the
/// target configuration partially written; discard it.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Unknown {enum_type} name '{name}'")]
    UnknownEnumName {
        enum_type: &'static str,
        name: String,
    },

    #[error("No enum type registered as '{0}'")]
    UnknownEnumType(String),

    #[error("Enum type '{0}' is already registered")]
    DuplicateEnumType(&'static str),

    #[error("Enum registry failed to initialize: {0}")]
    RegistryInitialization(String),

    #[error("Missing required field '{field}' in {scope}")]
    MissingField { scope: String, field: &'static str },

    #[error("Extent '{field}' must have exactly 3 elements, got {len}")]
    MalformedExtent { field: &'static str, len: usize },

    #[error("Invalid value for '{field}': expected {expected}")]
    InvalidValue {
        field: String,
        expected: &'static str,
    },

    #[error("Unsupported state schema version: expected {expected}, found {found:?}")]
    SchemaVersion { expected: u64, found: Option<u64> },

    #[error("State serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}
