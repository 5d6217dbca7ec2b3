//! Python classes for the value types of the model
//!
//! Enum classes are pickled by name: `__reduce__` returns
//! `(getattr, (cls, name))`, so unpickling yields the class attribute
//! itself and `pickle.loads(pickle.dumps(StackType.Raw)) is StackType.Raw`.

use pyo3::prelude::*;
use pyo3::types::{PyBool, PyDict, PyFloat, PyInt, PyList, PyString, PyTuple, PyType};
use pyo3::{IntoPyObject, PyTypeInfo};
use serde_json::{Map, Value};

use crate::codec::enums::encode;
use crate::codec::state::float_to_value;
use crate::codec::CodecError;
use crate::extension::{extensions, ExtensionError};
use crate::logging::LogLevel;
use crate::models::{BackendType, Point3, StackDescription, StackType};

// ========================================================================
// Error Conversion
// ========================================================================

pub(crate) fn codec_error(e: CodecError) -> PyErr {
    PyErr::new::<pyo3::exceptions::PyValueError, _>(e.to_string())
}

pub(crate) fn extension_error(e: ExtensionError) -> PyErr {
    match e {
        ExtensionError::Codec(e) => codec_error(e),
        ExtensionError::UnknownMember { .. } | ExtensionError::WrongMemberKind { .. } => {
            PyErr::new::<pyo3::exceptions::PyAttributeError, _>(e.to_string())
        }
        other => PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(other.to_string()),
    }
}

// ========================================================================
// State Conversion
// ========================================================================

/// Build Python objects from a captured state: objects become `dict`,
/// arrays `list`, numbers `int` or `float`.
pub(crate) fn value_to_py<'py>(py: Python<'py>, value: &Value) -> PyResult<Bound<'py, PyAny>> {
    let object = match value {
        Value::Null => py.None().into_bound(py),
        Value::Bool(flag) => PyBool::new(py, *flag).to_owned().into_any(),
        Value::Number(number) => match (number.as_u64(), number.as_i64(), number.as_f64()) {
            (Some(unsigned), _, _) => unsigned.into_pyobject(py)?.into_any(),
            (None, Some(signed), _) => signed.into_pyobject(py)?.into_any(),
            (None, None, Some(float)) => float.into_pyobject(py)?.into_any(),
            (None, None, None) => {
                return Err(PyErr::new::<pyo3::exceptions::PyValueError, _>(format!(
                    "Unrepresentable number {}",
                    number
                )))
            }
        },
        Value::String(text) => PyString::new(py, text).into_any(),
        Value::Array(items) => {
            let list = PyList::empty(py);
            for item in items {
                list.append(value_to_py(py, item)?)?;
            }
            list.into_any()
        }
        Value::Object(map) => {
            let dict = PyDict::new(py);
            for (key, item) in map {
                dict.set_item(key, value_to_py(py, item)?)?;
            }
            dict.into_any()
        }
    };
    Ok(object)
}

/// Walk a Python state back into a [`Value`].
///
/// Accepts `dict` with `str` keys, `list` and `tuple`, `str`, `int`,
/// `float`, `bool` and `None`. Non-finite floats are written the way the
/// state codec writes them.
pub(crate) fn py_to_value(object: &Bound<'_, PyAny>) -> PyResult<Value> {
    if object.is_none() {
        return Ok(Value::Null);
    }
    // bool is a subclass of int
    if let Ok(flag) = object.downcast::<PyBool>() {
        return Ok(Value::Bool(flag.is_true()));
    }
    if object.is_instance_of::<PyInt>() {
        return match object.extract::<u64>() {
            Ok(unsigned) => Ok(Value::from(unsigned)),
            Err(_) => Ok(Value::from(object.extract::<i64>()?)),
        };
    }
    if let Ok(float) = object.downcast::<PyFloat>() {
        return Ok(float_to_value(float.value()));
    }
    if let Ok(text) = object.downcast::<PyString>() {
        return Ok(Value::String(text.to_str()?.to_owned()));
    }
    if let Ok(dict) = object.downcast::<PyDict>() {
        let mut map = Map::new();
        for (key, item) in dict.iter() {
            let key: String = key.extract().map_err(|_| {
                PyErr::new::<pyo3::exceptions::PyTypeError, _>(format!(
                    "State keys must be strings, got {}",
                    key
                ))
            })?;
            map.insert(key, py_to_value(&item)?);
        }
        return Ok(Value::Object(map));
    }
    if let Ok(list) = object.downcast::<PyList>() {
        let items = list
            .iter()
            .map(|item| py_to_value(&item))
            .collect::<PyResult<Vec<Value>>>()?;
        return Ok(Value::Array(items));
    }
    if let Ok(tuple) = object.downcast::<PyTuple>() {
        let items = tuple
            .iter()
            .map(|item| py_to_value(&item))
            .collect::<PyResult<Vec<Value>>>()?;
        return Ok(Value::Array(items));
    }

    Err(PyErr::new::<pyo3::exceptions::PyTypeError, _>(format!(
        "Unsupported value in state: {}",
        object.get_type().name()?
    )))
}

// ========================================================================
// Enum Singletons
// ========================================================================

/// The class attribute `T.<name>`, i.e. the shared instance of that value.
pub(crate) fn singleton<'py, T: PyTypeInfo>(py: Python<'py>, name: &str) -> PyResult<Bound<'py, PyAny>> {
    py.get_type::<T>().getattr(name)
}

type Reduced<'py> = (Bound<'py, PyAny>, (Bound<'py, PyType>, &'static str));

fn reduce_to_singleton<'py, T: PyTypeInfo>(py: Python<'py>, name: &'static str) -> PyResult<Reduced<'py>> {
    let getattr = py.import("builtins")?.getattr("getattr")?;
    Ok((getattr, (py.get_type::<T>(), name)))
}

#[pyclass(name = "StackType", module = "pysopnet", eq, eq_int, frozen, hash)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PyStackType {
    Raw,
    Membrane,
}

impl From<StackType> for PyStackType {
    fn from(value: StackType) -> Self {
        match value {
            StackType::Raw => PyStackType::Raw,
            StackType::Membrane => PyStackType::Membrane,
        }
    }
}

impl From<PyStackType> for StackType {
    fn from(value: PyStackType) -> Self {
        match value {
            PyStackType::Raw => StackType::Raw,
            PyStackType::Membrane => StackType::Membrane,
        }
    }
}

#[pymethods]
impl PyStackType {
    fn __reduce__<'py>(&self, py: Python<'py>) -> PyResult<Reduced<'py>> {
        reduce_to_singleton::<Self>(py, encode(&StackType::from(*self)))
    }
}

#[pyclass(name = "BackendType", module = "pysopnet", eq, eq_int, frozen, hash)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PyBackendType {
    Local,
    Django,
    PostgreSql,
}

impl From<BackendType> for PyBackendType {
    fn from(value: BackendType) -> Self {
        match value {
            BackendType::Local => PyBackendType::Local,
            BackendType::Django => PyBackendType::Django,
            BackendType::PostgreSql => PyBackendType::PostgreSql,
        }
    }
}

impl From<PyBackendType> for BackendType {
    fn from(value: PyBackendType) -> Self {
        match value {
            PyBackendType::Local => BackendType::Local,
            PyBackendType::Django => BackendType::Django,
            PyBackendType::PostgreSql => BackendType::PostgreSql,
        }
    }
}

#[pymethods]
impl PyBackendType {
    fn __reduce__<'py>(&self, py: Python<'py>) -> PyResult<Reduced<'py>> {
        reduce_to_singleton::<Self>(py, encode(&BackendType::from(*self)))
    }
}

#[pyclass(name = "LogLevel", module = "pysopnet", eq, eq_int, frozen, hash)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PyLogLevel {
    Quiet,
    Error,
    User,
    Debug,
    All,
}

impl From<LogLevel> for PyLogLevel {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Quiet => PyLogLevel::Quiet,
            LogLevel::Error => PyLogLevel::Error,
            LogLevel::User => PyLogLevel::User,
            LogLevel::Debug => PyLogLevel::Debug,
            LogLevel::All => PyLogLevel::All,
        }
    }
}

impl From<PyLogLevel> for LogLevel {
    fn from(value: PyLogLevel) -> Self {
        match value {
            PyLogLevel::Quiet => LogLevel::Quiet,
            PyLogLevel::Error => LogLevel::Error,
            PyLogLevel::User => LogLevel::User,
            PyLogLevel::Debug => LogLevel::Debug,
            PyLogLevel::All => LogLevel::All,
        }
    }
}

#[pymethods]
impl PyLogLevel {
    fn __reduce__<'py>(&self, py: Python<'py>) -> PyResult<Reduced<'py>> {
        reduce_to_singleton::<Self>(py, encode(&LogLevel::from(*self)))
    }
}

// ========================================================================
// point3
// ========================================================================

/// Immutable `(x, y, z)` triple.
#[pyclass(name = "point3", module = "pysopnet", eq, frozen, hash)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PyPoint3 {
    pub(crate) inner: Point3,
}

impl From<Point3> for PyPoint3 {
    fn from(inner: Point3) -> Self {
        Self { inner }
    }
}

#[pymethods]
impl PyPoint3 {
    #[new]
    fn new(x: u32, y: u32, z: u32) -> Self {
        Self {
            inner: Point3::new(x, y, z),
        }
    }

    #[getter]
    fn x(&self) -> u32 {
        self.inner.x()
    }

    #[getter]
    fn y(&self) -> u32 {
        self.inner.y()
    }

    #[getter]
    fn z(&self) -> u32 {
        self.inner.z()
    }

    /// Rendered by the `Point3Display` extension.
    fn __str__(&self) -> PyResult<String> {
        let rendered = extensions()
            .map_err(extension_error)?
            .invoke(&self.inner, "__str__")
            .map_err(extension_error)?;
        rendered.as_str().map(str::to_owned).ok_or_else(|| {
            PyErr::new::<pyo3::exceptions::PyTypeError, _>("__str__ extension returned a non-string")
        })
    }

    fn __repr__(&self) -> String {
        format!("point3({}, {}, {})", self.inner.x(), self.inner.y(), self.inner.z())
    }

    fn __getnewargs__(&self) -> (u32, u32, u32) {
        (self.inner.x(), self.inner.y(), self.inner.z())
    }
}

// ========================================================================
// StackDescription
// ========================================================================

/// Mutable stack record; attribute names follow the wrapped model.
#[pyclass(name = "StackDescription", module = "pysopnet")]
#[derive(Debug, Clone, Default)]
pub struct PyStackDescription {
    pub(crate) inner: StackDescription,
}

#[pymethods]
impl PyStackDescription {
    #[new]
    fn new() -> Self {
        Self::default()
    }

    #[getter(id)]
    fn id(&self) -> u32 {
        self.inner.id
    }

    #[setter(id)]
    fn set_id(&mut self, id: u32) {
        self.inner.id = id;
    }

    #[getter(segmentationId)]
    fn segmentation_id(&self) -> u32 {
        self.inner.segmentation_id
    }

    #[setter(segmentationId)]
    fn set_segmentation_id(&mut self, segmentation_id: u32) {
        self.inner.segmentation_id = segmentation_id;
    }

    #[getter(imageBase)]
    fn image_base(&self) -> String {
        self.inner.image_base.clone()
    }

    #[setter(imageBase)]
    fn set_image_base(&mut self, image_base: String) {
        self.inner.image_base = image_base;
    }

    #[getter(fileExtension)]
    fn file_extension(&self) -> String {
        self.inner.file_extension.clone()
    }

    #[setter(fileExtension)]
    fn set_file_extension(&mut self, file_extension: String) {
        self.inner.file_extension = file_extension;
    }

    #[getter(tileSourceType)]
    fn tile_source_type(&self) -> u32 {
        self.inner.tile_source_type
    }

    #[setter(tileSourceType)]
    fn set_tile_source_type(&mut self, tile_source_type: u32) {
        self.inner.tile_source_type = tile_source_type;
    }

    #[getter(tileWidth)]
    fn tile_width(&self) -> u32 {
        self.inner.tile_width
    }

    #[setter(tileWidth)]
    fn set_tile_width(&mut self, tile_width: u32) {
        self.inner.tile_width = tile_width;
    }

    #[getter(tileHeight)]
    fn tile_height(&self) -> u32 {
        self.inner.tile_height
    }

    #[setter(tileHeight)]
    fn set_tile_height(&mut self, tile_height: u32) {
        self.inner.tile_height = tile_height;
    }

    #[getter(width)]
    fn width(&self) -> u32 {
        self.inner.width
    }

    #[setter(width)]
    fn set_width(&mut self, width: u32) {
        self.inner.width = width;
    }

    #[getter(height)]
    fn height(&self) -> u32 {
        self.inner.height
    }

    #[setter(height)]
    fn set_height(&mut self, height: u32) {
        self.inner.height = height;
    }

    #[getter(depth)]
    fn depth(&self) -> u32 {
        self.inner.depth
    }

    #[setter(depth)]
    fn set_depth(&mut self, depth: u32) {
        self.inner.depth = depth;
    }

    #[getter(resX)]
    fn res_x(&self) -> f64 {
        self.inner.res_x
    }

    #[setter(resX)]
    fn set_res_x(&mut self, res_x: f64) {
        self.inner.res_x = res_x;
    }

    #[getter(resY)]
    fn res_y(&self) -> f64 {
        self.inner.res_y
    }

    #[setter(resY)]
    fn set_res_y(&mut self, res_y: f64) {
        self.inner.res_y = res_y;
    }

    #[getter(resZ)]
    fn res_z(&self) -> f64 {
        self.inner.res_z
    }

    #[setter(resZ)]
    fn set_res_z(&mut self, res_z: f64) {
        self.inner.res_z = res_z;
    }

    #[getter(scale)]
    fn scale(&self) -> u32 {
        self.inner.scale
    }

    #[setter(scale)]
    fn set_scale(&mut self, scale: u32) {
        self.inner.scale = scale;
    }
}
