//! FFI (Foreign Function Interface) module
//!
//! PyO3 bindings exposing the project configuration model to Python.
//!
//! # Design Principles
//!
//! 1. **Minimal boundary**: only the model and its accessors are exposed
//! 2. **Simple types**: primitives, strings, and dicts at the boundary
//! 3. **Safe errors**: every Rust error becomes a Python exception
//! 4. **No references**: Python gets copies, never references to Rust state

use pyo3::prelude::*;

use crate::codec::enums::encode;
use crate::logging;

pub mod configuration;
pub mod types;

use types::{singleton, PyLogLevel};

/// Set the log level of the wrappers.
#[pyfunction]
#[pyo3(name = "setLogLevel")]
pub fn set_log_level(level: PyLogLevel) -> PyResult<()> {
    logging::set_log_level(level.into())
        .map_err(|e| PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(e.to_string()))
}

/// Get the log level of the wrappers.
#[pyfunction]
#[pyo3(name = "getLogLevel")]
pub fn get_log_level(py: Python<'_>) -> PyResult<Bound<'_, PyAny>> {
    singleton::<PyLogLevel>(py, encode(&logging::log_level()))
}
