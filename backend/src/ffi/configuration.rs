//! PyO3 wrapper for ProjectConfiguration
//!
//! Exposes the original accessor names (`getBlockSize`, `setPostgreSqlHost`,
//! ...) and supports pickling through the `ConfigurationPickling` extension.
//!
//! # Example (from Python)
//!
//! ```python
//! import pickle
//! from pysopnet import BackendType, ProjectConfiguration, StackType, point3
//!
//! config = ProjectConfiguration()
//! config.setBackendType(BackendType.PostgreSql)
//! config.setBlockSize(point3(512, 512, 16))
//! config.setPostgreSqlHost("db.example.org")
//!
//! payload = pickle.dumps(config)          # e.g. attached to a task message
//! restored = pickle.loads(payload)        # in the worker process
//! assert restored.getBackendType() is BackendType.PostgreSql
//! assert str(restored.getBlockSize()) == "(512, 512, 16)"
//! ```

use pyo3::prelude::*;

use super::types::{
    extension_error, py_to_value, singleton, value_to_py, PyBackendType, PyPoint3,
    PyStackDescription, PyStackType,
};
use crate::codec::enums::encode;
use crate::extension::extensions;
use crate::models::ProjectConfiguration;

#[pyclass(name = "ProjectConfiguration", module = "pysopnet")]
#[derive(Debug, Clone, Default)]
pub struct PyProjectConfiguration {
    inner: ProjectConfiguration,
}

#[pymethods]
impl PyProjectConfiguration {
    #[new]
    fn new() -> Self {
        Self::default()
    }

    #[pyo3(name = "setBackendType")]
    fn set_backend_type(&mut self, backend_type: PyBackendType) {
        self.inner.set_backend_type(backend_type.into());
    }

    #[pyo3(name = "getBackendType")]
    fn backend_type<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
        singleton::<PyBackendType>(py, encode(&self.inner.backend_type()))
    }

    #[pyo3(name = "setCatmaidStack")]
    fn set_catmaid_stack(&mut self, stack_type: PyStackType, stack: PyStackDescription) {
        self.inner.set_catmaid_stack(stack_type.into(), stack.inner);
    }

    /// Returns a copy; modify it and hand it back with `setCatmaidStack`.
    #[pyo3(name = "getCatmaidStack")]
    fn catmaid_stack(&self, stack_type: PyStackType) -> PyStackDescription {
        PyStackDescription {
            inner: self.inner.catmaid_stack(stack_type.into()).clone(),
        }
    }

    #[pyo3(name = "setBlockSize")]
    fn set_block_size(&mut self, block_size: PyPoint3) {
        self.inner.set_block_size(block_size.inner);
    }

    #[pyo3(name = "getBlockSize")]
    fn block_size(&self) -> PyPoint3 {
        self.inner.block_size().into()
    }

    #[pyo3(name = "setVolumeSize")]
    fn set_volume_size(&mut self, volume_size: PyPoint3) {
        self.inner.set_volume_size(volume_size.inner);
    }

    #[pyo3(name = "getVolumeSize")]
    fn volume_size(&self) -> PyPoint3 {
        self.inner.volume_size().into()
    }

    #[pyo3(name = "setCoreSize")]
    fn set_core_size(&mut self, core_size: PyPoint3) {
        self.inner.set_core_size(core_size.inner);
    }

    #[pyo3(name = "getCoreSize")]
    fn core_size(&self) -> PyPoint3 {
        self.inner.core_size().into()
    }

    #[pyo3(name = "setComponentDirectory")]
    fn set_component_directory(&mut self, component_directory: String) {
        self.inner.set_component_directory(component_directory);
    }

    /// `None` while unset.
    #[pyo3(name = "getComponentDirectory")]
    fn component_directory(&self) -> Option<String> {
        self.inner.component_directory().map(str::to_owned)
    }

    #[pyo3(name = "setLocalFeatureWeights")]
    fn set_local_feature_weights(&mut self, feature_weights: Vec<f64>) {
        self.inner.set_local_feature_weights(feature_weights);
    }

    #[pyo3(name = "getLocalFeatureWeights")]
    fn local_feature_weights(&self) -> Vec<f64> {
        self.inner.local_feature_weights().to_vec()
    }

    #[pyo3(name = "setSegmentationConfigurationId")]
    fn set_segmentation_configuration_id(&mut self, id: i32) {
        self.inner.set_segmentation_configuration_id(id);
    }

    #[pyo3(name = "getSegmentationConfigurationId")]
    fn segmentation_configuration_id(&self) -> i32 {
        self.inner.segmentation_configuration_id()
    }

    #[pyo3(name = "setPostgreSqlHost")]
    fn set_postgre_sql_host(&mut self, host: String) {
        self.inner.set_postgre_sql_host(host);
    }

    #[pyo3(name = "getPostgreSqlHost")]
    fn postgre_sql_host(&self) -> Option<String> {
        self.inner.postgre_sql_host().map(str::to_owned)
    }

    #[pyo3(name = "setPostgreSqlPort")]
    fn set_postgre_sql_port(&mut self, port: String) {
        self.inner.set_postgre_sql_port(port);
    }

    #[pyo3(name = "getPostgreSqlPort")]
    fn postgre_sql_port(&self) -> Option<String> {
        self.inner.postgre_sql_port().map(str::to_owned)
    }

    #[pyo3(name = "setPostgreSqlUser")]
    fn set_postgre_sql_user(&mut self, user: String) {
        self.inner.set_postgre_sql_user(user);
    }

    #[pyo3(name = "getPostgreSqlUser")]
    fn postgre_sql_user(&self) -> Option<String> {
        self.inner.postgre_sql_user().map(str::to_owned)
    }

    #[pyo3(name = "setPostgreSqlPassword")]
    fn set_postgre_sql_password(&mut self, password: String) {
        self.inner.set_postgre_sql_password(password);
    }

    #[pyo3(name = "getPostgreSqlPassword")]
    fn postgre_sql_password(&self) -> Option<String> {
        self.inner.postgre_sql_password().map(str::to_owned)
    }

    #[pyo3(name = "setPostgreSqlDatabase")]
    fn set_postgre_sql_database(&mut self, database: String) {
        self.inner.set_postgre_sql_database(database);
    }

    #[pyo3(name = "getPostgreSqlDatabase")]
    fn postgre_sql_database(&self) -> Option<String> {
        self.inner.postgre_sql_database().map(str::to_owned)
    }

    // ========================================================================
    // Pickling
    // ========================================================================

    /// Captured state as a plain dict.
    fn __getstate__<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
        let state = extensions()
            .map_err(extension_error)?
            .invoke(&self.inner, "__getstate__")
            .map_err(extension_error)?;
        value_to_py(py, &state)
    }

    /// Restore from a dict produced by `__getstate__`.
    fn __setstate__(&mut self, state: &Bound<'_, PyAny>) -> PyResult<()> {
        let state = py_to_value(state)?;

        extensions()
            .map_err(extension_error)?
            .invoke_mut(&mut self.inner, "__setstate__", state)
            .map_err(extension_error)
    }
}
