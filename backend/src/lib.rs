//! pysopnet - Python bindings for the sopnet project configuration
//!
//! Makes the configuration model usable from Python and lets a configuration
//! travel through a work queue: capture it as plain data in one process,
//! restore an equivalent configuration in another.
//!
//! # Architecture
//!
//! - **models**: Domain types (Point3, StackDescription, ProjectConfiguration)
//! - **codec**: Field naming, enum names, state capture/restore
//! - **extension**: Extra members attached to model types (`__str__`, pickling)
//! - **logging**: Global tracing subscriber with a switchable level
//! - **ffi**: PyO3 classes (feature `pyo3`)
//!
//! # Critical Invariants
//!
//! 1. Enumerated values cross the boundary by name, never by ordinal
//! 2. Decoding a name yields the one shared instance of that value
//! 3. Restoring a captured state reproduces every captured field

// Module declarations
pub mod codec;
pub mod extension;
pub mod logging;
pub mod models;

// Re-exports for convenience
pub use codec::{capture, restore, CodecError, ConfigurationState, NamedEnum};
pub use extension::{
    extensions, ConfigurationPickling, Extension, ExtensionError, ExtensionRegistry, Member,
    Point3Display,
};
pub use logging::{LogConfig, LogLevel, LoggingError};
pub use models::{BackendType, Point3, ProjectConfiguration, StackDescription, StackType};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn pysopnet(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Build the shared tables up front so a broken table fails the import.
    extensions().map_err(ffi::types::extension_error)?;
    codec::enum_registry().map_err(ffi::types::codec_error)?;

    if let Err(e) = logging::init_logging(&LogConfig::default()) {
        tracing::debug!(error = %e, "keeping the embedding application's subscriber");
    }

    m.add_class::<ffi::types::PyPoint3>()?;
    m.add_class::<ffi::types::PyStackType>()?;
    m.add_class::<ffi::types::PyBackendType>()?;
    m.add_class::<ffi::types::PyLogLevel>()?;
    m.add_class::<ffi::types::PyStackDescription>()?;
    m.add_class::<ffi::configuration::PyProjectConfiguration>()?;
    m.add_function(wrap_pyfunction!(ffi::set_log_level, m)?)?;
    m.add_function(wrap_pyfunction!(ffi::get_log_level, m)?)?;
    Ok(())
}
