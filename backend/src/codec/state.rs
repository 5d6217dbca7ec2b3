//! Configuration State - Capture/Restore Protocol
//!
//! Converts a [`ProjectConfiguration`] into a nested key/value mapping with
//! primitive leaves and back. The mapping is what crosses process
//! boundaries, e.g. attached to a distributed task-queue message:
//!
//! ```json
//! {
//!   "schema_version": 1,
//!   "catmaid_stacks": {
//!     "Raw":      { "id": 1, "image_base": "...", "res_x": 4.0, ... },
//!     "Membrane": { ... }
//!   },
//!   "block_size": [256, 256, 10],
//!   "core_size": [1, 1, 1],
//!   "volume_size": [1024, 1024, 20],
//!   "local_feature_weights": [0.5, -1.25, "inf"],
//!   "segmentation_configuration_id": 3,
//!   "component_directory": null,
//!   "postgre_sql_host": "db.example.org",
//!   ...
//!   "backend_type": "PostgreSql"
//! }
//! ```
//!
//! # Critical Invariants
//!
//! - **Round trip**: `restore(fresh, capture(c))` reproduces `c` field by field
//! - **Stack completeness**: `catmaid_stacks` has one entry per `StackType`
//! - **No silent defaults**: a missing stack field is an error, never zero
//! - **Versioned**: a state without a matching `schema_version` is rejected
//! - **Lossless floats**: NaN and the infinities are written as the strings
//!   `"NaN"`, `"inf"`, `"-inf"`, which JSON can carry
//!
//! Fields are reached through the explicit tables below, one typed getter
//! and setter per canonical field name.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use tracing::{debug, trace};

use crate::codec::enums::{decode, encode};
use crate::codec::naming::{accessor_name, to_camel_case};
use crate::codec::CodecError;
use crate::models::{BackendType, Point3, ProjectConfiguration, StackDescription, StackType};

/// Version of the state layout produced by [`capture`].
pub const SCHEMA_VERSION: u64 = 1;

pub const SCHEMA_VERSION_KEY: &str = "schema_version";
pub const CATMAID_STACKS_KEY: &str = "catmaid_stacks";
pub const BACKEND_TYPE_KEY: &str = "backend_type";
pub const LOCAL_FEATURE_WEIGHTS_KEY: &str = "local_feature_weights";
pub const SEGMENTATION_CONFIGURATION_ID_KEY: &str = "segmentation_configuration_id";

// ============================================================================
// Field Tables
// ============================================================================

/// One field of a [`StackDescription`].
pub struct StackField {
    pub name: &'static str,
    expected: &'static str,
    get: fn(&StackDescription) -> Value,
    set: fn(&mut StackDescription, &Value) -> Option<()>,
}

impl StackField {
    /// Member name on the wrapped model (`image_base` -> `imageBase`).
    pub fn accessor(&self) -> String {
        to_camel_case(self.name, false)
    }
}

fn as_u32(value: &Value) -> Option<u32> {
    value.as_u64().and_then(|v| u32::try_from(v).ok())
}

fn as_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_owned)
}

const NAN: &str = "NaN";
const INFINITY: &str = "inf";
const NEG_INFINITY: &str = "-inf";

/// JSON has no non-finite numbers; those travel as `"NaN"`, `"inf"`, `"-inf"`.
pub(crate) fn float_to_value(value: f64) -> Value {
    if value.is_nan() {
        Value::from(NAN)
    } else if value == f64::INFINITY {
        Value::from(INFINITY)
    } else if value == f64::NEG_INFINITY {
        Value::from(NEG_INFINITY)
    } else {
        Value::from(value)
    }
}

fn value_to_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => match text.as_str() {
            NAN => Some(f64::NAN),
            INFINITY => Some(f64::INFINITY),
            NEG_INFINITY => Some(f64::NEG_INFINITY),
            _ => None,
        },
        _ => None,
    }
}

const UNSIGNED: &str = "unsigned 32-bit integer";
const STRING: &str = "string";
const FLOAT: &str = "number or one of \"NaN\", \"inf\", \"-inf\"";

pub const STACK_FIELDS: &[StackField] = &[
    StackField {
        name: "id",
        expected: UNSIGNED,
        get: |s: &StackDescription| Value::from(s.id),
        set: |s: &mut StackDescription, v: &Value| {
            s.id = as_u32(v)?;
            Some(())
        },
    },
    StackField {
        name: "segmentation_id",
        expected: UNSIGNED,
        get: |s: &StackDescription| Value::from(s.segmentation_id),
        set: |s: &mut StackDescription, v: &Value| {
            s.segmentation_id = as_u32(v)?;
            Some(())
        },
    },
    StackField {
        name: "image_base",
        expected: STRING,
        get: |s: &StackDescription| Value::from(s.image_base.as_str()),
        set: |s: &mut StackDescription, v: &Value| {
            s.image_base = as_string(v)?;
            Some(())
        },
    },
    StackField {
        name: "file_extension",
        expected: STRING,
        get: |s: &StackDescription| Value::from(s.file_extension.as_str()),
        set: |s: &mut StackDescription, v: &Value| {
            s.file_extension = as_string(v)?;
            Some(())
        },
    },
    StackField {
        name: "tile_source_type",
        expected: UNSIGNED,
        get: |s: &StackDescription| Value::from(s.tile_source_type),
        set: |s: &mut StackDescription, v: &Value| {
            s.tile_source_type = as_u32(v)?;
            Some(())
        },
    },
    StackField {
        name: "tile_width",
        expected: UNSIGNED,
        get: |s: &StackDescription| Value::from(s.tile_width),
        set: |s: &mut StackDescription, v: &Value| {
            s.tile_width = as_u32(v)?;
            Some(())
        },
    },
    StackField {
        name: "tile_height",
        expected: UNSIGNED,
        get: |s: &StackDescription| Value::from(s.tile_height),
        set: |s: &mut StackDescription, v: &Value| {
            s.tile_height = as_u32(v)?;
            Some(())
        },
    },
    StackField {
        name: "width",
        expected: UNSIGNED,
        get: |s: &StackDescription| Value::from(s.width),
        set: |s: &mut StackDescription, v: &Value| {
            s.width = as_u32(v)?;
            Some(())
        },
    },
    StackField {
        name: "height",
        expected: UNSIGNED,
        get: |s: &StackDescription| Value::from(s.height),
        set: |s: &mut StackDescription, v: &Value| {
            s.height = as_u32(v)?;
            Some(())
        },
    },
    StackField {
        name: "depth",
        expected: UNSIGNED,
        get: |s: &StackDescription| Value::from(s.depth),
        set: |s: &mut StackDescription, v: &Value| {
            s.depth = as_u32(v)?;
            Some(())
        },
    },
    StackField {
        name: "res_x",
        expected: FLOAT,
        get: |s: &StackDescription| float_to_value(s.res_x),
        set: |s: &mut StackDescription, v: &Value| {
            s.res_x = value_to_float(v)?;
            Some(())
        },
    },
    StackField {
        name: "res_y",
        expected: FLOAT,
        get: |s: &StackDescription| float_to_value(s.res_y),
        set: |s: &mut StackDescription, v: &Value| {
            s.res_y = value_to_float(v)?;
            Some(())
        },
    },
    StackField {
        name: "res_z",
        expected: FLOAT,
        get: |s: &StackDescription| float_to_value(s.res_z),
        set: |s: &mut StackDescription, v: &Value| {
            s.res_z = value_to_float(v)?;
            Some(())
        },
    },
    StackField {
        name: "scale",
        expected: UNSIGNED,
        get: |s: &StackDescription| Value::from(s.scale),
        set: |s: &mut StackDescription, v: &Value| {
            s.scale = as_u32(v)?;
            Some(())
        },
    },
];

/// One point-valued extent of a [`ProjectConfiguration`].
pub struct ExtentField {
    pub name: &'static str,
    get: fn(&ProjectConfiguration) -> Point3,
    set: fn(&mut ProjectConfiguration, Point3),
}

pub const EXTENT_FIELDS: &[ExtentField] = &[
    ExtentField {
        name: "block_size",
        get: ProjectConfiguration::block_size,
        set: ProjectConfiguration::set_block_size,
    },
    ExtentField {
        name: "core_size",
        get: ProjectConfiguration::core_size,
        set: ProjectConfiguration::set_core_size,
    },
    ExtentField {
        name: "volume_size",
        get: ProjectConfiguration::volume_size,
        set: ProjectConfiguration::set_volume_size,
    },
];

/// One optional string parameter of a [`ProjectConfiguration`].
pub struct OptionalParameter {
    pub name: &'static str,
    get: fn(&ProjectConfiguration) -> Option<&str>,
    set: fn(&mut ProjectConfiguration, String),
}

impl OptionalParameter {
    /// Getter name on the wrapped model (`getPostgreSqlHost`).
    pub fn getter(&self) -> String {
        accessor_name("get", self.name)
    }

    /// Setter name on the wrapped model (`setPostgreSqlHost`).
    pub fn setter(&self) -> String {
        accessor_name("set", self.name)
    }
}

pub const OPTIONAL_PARAMETERS: &[OptionalParameter] = &[
    OptionalParameter {
        name: "component_directory",
        get: ProjectConfiguration::component_directory,
        set: |c: &mut ProjectConfiguration, v: String| c.set_component_directory(v),
    },
    OptionalParameter {
        name: "postgre_sql_host",
        get: ProjectConfiguration::postgre_sql_host,
        set: |c: &mut ProjectConfiguration, v: String| c.set_postgre_sql_host(v),
    },
    OptionalParameter {
        name: "postgre_sql_port",
        get: ProjectConfiguration::postgre_sql_port,
        set: |c: &mut ProjectConfiguration, v: String| c.set_postgre_sql_port(v),
    },
    OptionalParameter {
        name: "postgre_sql_user",
        get: ProjectConfiguration::postgre_sql_user,
        set: |c: &mut ProjectConfiguration, v: String| c.set_postgre_sql_user(v),
    },
    OptionalParameter {
        name: "postgre_sql_password",
        get: ProjectConfiguration::postgre_sql_password,
        set: |c: &mut ProjectConfiguration, v: String| c.set_postgre_sql_password(v),
    },
    OptionalParameter {
        name: "postgre_sql_database",
        get: ProjectConfiguration::postgre_sql_database,
        set: |c: &mut ProjectConfiguration, v: String| c.set_postgre_sql_database(v),
    },
];

// ============================================================================
// Transported State
// ============================================================================

/// Captured configuration, an untyped mapping with primitive leaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigurationState(Map<String, Value>);

impl ConfigurationState {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Field mapping of one captured stack, if present.
    pub fn stack_fields_mut(&mut self, stack_name: &str) -> Option<&mut Map<String, Value>> {
        self.0
            .get_mut(CATMAID_STACKS_KEY)?
            .as_object_mut()?
            .get_mut(stack_name)?
            .as_object_mut()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn to_json(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string(&self.0)?)
    }

    pub fn from_json(json: &str) -> Result<Self, CodecError> {
        Ok(serde_json::from_str(json)?)
    }

    /// SHA-256 of the canonical (key-sorted) JSON form, hex encoded.
    ///
    /// Equal states have equal fingerprints regardless of key insertion
    /// order, so work-queue messages can be deduplicated by it.
    pub fn fingerprint(&self) -> Result<String, CodecError> {
        let json = serde_json::to_string(&canonicalize(self.clone().into_value()))?;

        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        Ok(format!("{:x}", hasher.finalize()))
    }
}

/// Recursively sort object keys.
///
/// `serde_json::Map` is already sorted unless the `preserve_order` feature
/// is enabled somewhere in the dependency graph; the fingerprint must not
/// change when it is.
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> =
                map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            Value::Object(entries.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

impl TryFrom<Value> for ConfigurationState {
    type Error = CodecError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(CodecError::InvalidValue {
                field: "state".to_string(),
                expected: "mapping",
            }),
        }
    }
}

impl From<ConfigurationState> for Value {
    fn from(state: ConfigurationState) -> Self {
        state.into_value()
    }
}

// ============================================================================
// Capture
// ============================================================================

/// Capture every field of `config` into a transportable state.
pub fn capture(config: &ProjectConfiguration) -> ConfigurationState {
    let mut state = Map::new();
    state.insert(SCHEMA_VERSION_KEY.to_string(), Value::from(SCHEMA_VERSION));

    let mut stacks = Map::new();
    for stack_type in StackType::all() {
        let stack = config.catmaid_stack(*stack_type);
        let fields: Map<String, Value> = STACK_FIELDS
            .iter()
            .map(|field| {
                trace!(stack = %stack_type, accessor = %field.accessor(), "capturing stack field");
                (field.name.to_string(), (field.get)(stack))
            })
            .collect();
        stacks.insert(encode(stack_type).to_string(), Value::Object(fields));
    }
    state.insert(CATMAID_STACKS_KEY.to_string(), Value::Object(stacks));

    for extent in EXTENT_FIELDS {
        let point = (extent.get)(config);
        state.insert(extent.name.to_string(), Value::from(point.to_array().to_vec()));
    }

    let weights: Vec<Value> = config
        .local_feature_weights()
        .iter()
        .copied()
        .map(float_to_value)
        .collect();
    state.insert(LOCAL_FEATURE_WEIGHTS_KEY.to_string(), Value::Array(weights));
    state.insert(
        SEGMENTATION_CONFIGURATION_ID_KEY.to_string(),
        Value::from(config.segmentation_configuration_id()),
    );

    for parameter in OPTIONAL_PARAMETERS {
        trace!(accessor = %parameter.getter(), "capturing optional parameter");
        let value = (parameter.get)(config).map_or(Value::Null, Value::from);
        state.insert(parameter.name.to_string(), value);
    }

    state.insert(
        BACKEND_TYPE_KEY.to_string(),
        Value::from(encode(&config.backend_type())),
    );

    debug!(
        stacks = StackType::all().len(),
        backend = %config.backend_type(),
        "captured project configuration"
    );
    ConfigurationState(state)
}

// ============================================================================
// Restore
// ============================================================================

/// Write a captured state into `config`.
///
/// `config` is expected to be freshly constructed. Stacks are restored
/// first, then extents, feature weights and segmentation configuration,
/// optional parameters, and the backend type. A `null`
/// optional parameter leaves that parameter untouched.
///
/// # Errors
///
/// - [`CodecError::SchemaVersion`] if the state has no or another version
/// - [`CodecError::UnknownEnumName`] for an unknown stack or backend name
/// - [`CodecError::MissingField`] if a stack field or top-level key is absent
/// - [`CodecError::MalformedExtent`] if an extent is not exactly 3 elements
/// - [`CodecError::InvalidValue`] if a value has the wrong primitive type
///
/// On error `config` may be partially written.
pub fn restore(config: &mut ProjectConfiguration, state: &ConfigurationState) -> Result<(), CodecError> {
    check_schema_version(state)?;

    let stacks = require(state, CATMAID_STACKS_KEY)?
        .as_object()
        .ok_or_else(|| invalid(CATMAID_STACKS_KEY, "mapping"))?;
    for (stack_name, fields) in stacks {
        let stack_type = decode::<StackType>(stack_name)?;
        let scope = format!("{}.{}", CATMAID_STACKS_KEY, stack_name);
        let fields = fields
            .as_object()
            .ok_or_else(|| invalid(&scope, "mapping"))?;
        config.set_catmaid_stack(*stack_type, restore_stack(&scope, fields)?);
    }

    for extent in EXTENT_FIELDS {
        let point = parse_extent(extent.name, require(state, extent.name)?)?;
        (extent.set)(config, point);
    }

    let weights = require(state, LOCAL_FEATURE_WEIGHTS_KEY)?
        .as_array()
        .ok_or_else(|| invalid(LOCAL_FEATURE_WEIGHTS_KEY, "sequence of numbers"))?
        .iter()
        .map(|weight| {
            value_to_float(weight).ok_or_else(|| invalid(LOCAL_FEATURE_WEIGHTS_KEY, FLOAT))
        })
        .collect::<Result<Vec<f64>, CodecError>>()?;
    config.set_local_feature_weights(weights);

    let segmentation_configuration_id = require(state, SEGMENTATION_CONFIGURATION_ID_KEY)?
        .as_i64()
        .and_then(|id| i32::try_from(id).ok())
        .ok_or_else(|| invalid(SEGMENTATION_CONFIGURATION_ID_KEY, "32-bit integer"))?;
    config.set_segmentation_configuration_id(segmentation_configuration_id);

    for parameter in OPTIONAL_PARAMETERS {
        match require(state, parameter.name)? {
            Value::Null => {
                trace!(accessor = %parameter.setter(), "optional parameter absent, left unset");
            }
            Value::String(value) => (parameter.set)(config, value.clone()),
            _ => return Err(invalid(parameter.name, "string or null")),
        }
    }

    let backend_name = require(state, BACKEND_TYPE_KEY)?
        .as_str()
        .ok_or_else(|| invalid(BACKEND_TYPE_KEY, "string"))?;
    config.set_backend_type(*decode::<BackendType>(backend_name)?);

    debug!(
        stacks = stacks.len(),
        backend = %config.backend_type(),
        "restored project configuration"
    );
    Ok(())
}

fn restore_stack(scope: &str, fields: &Map<String, Value>) -> Result<StackDescription, CodecError> {
    let mut stack = StackDescription::default();
    for field in STACK_FIELDS {
        let value = fields.get(field.name).ok_or_else(|| CodecError::MissingField {
            scope: scope.to_string(),
            field: field.name,
        })?;
        (field.set)(&mut stack, value)
            .ok_or_else(|| invalid(&format!("{}.{}", scope, field.name), field.expected))?;
    }
    Ok(stack)
}

fn check_schema_version(state: &ConfigurationState) -> Result<(), CodecError> {
    let found = match state.get(SCHEMA_VERSION_KEY) {
        None => None,
        Some(value) => Some(
            value
                .as_u64()
                .ok_or_else(|| invalid(SCHEMA_VERSION_KEY, "unsigned integer"))?,
        ),
    };

    if found == Some(SCHEMA_VERSION) {
        Ok(())
    } else {
        Err(CodecError::SchemaVersion {
            expected: SCHEMA_VERSION,
            found,
        })
    }
}

fn parse_extent(name: &'static str, value: &Value) -> Result<Point3, CodecError> {
    let items = value
        .as_array()
        .ok_or_else(|| invalid(name, "sequence of 3 unsigned integers"))?;
    if items.len() != 3 {
        return Err(CodecError::MalformedExtent {
            field: name,
            len: items.len(),
        });
    }

    let mut components = [0u32; 3];
    for (component, item) in components.iter_mut().zip(items) {
        *component = as_u32(item).ok_or_else(|| invalid(name, UNSIGNED))?;
    }
    Ok(Point3::from(components))
}

fn require<'a>(state: &'a ConfigurationState, key: &'static str) -> Result<&'a Value, CodecError> {
    state.get(key).ok_or_else(|| CodecError::MissingField {
        scope: "state".to_string(),
        field: key,
    })
}

fn invalid(field: &str, expected: &'static str) -> CodecError {
    CodecError::InvalidValue {
        field: field.to_string(),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_field_table_covers_distinct_names() {
        let mut names: Vec<_> = STACK_FIELDS.iter().map(|f| f.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), STACK_FIELDS.len());
        assert_eq!(STACK_FIELDS.len(), 14);
    }

    #[test]
    fn test_accessor_names_match_wrapped_model() {
        let accessors: Vec<_> = STACK_FIELDS.iter().map(StackField::accessor).collect();
        assert!(accessors.contains(&"imageBase".to_string()));
        assert!(accessors.contains(&"tileSourceType".to_string()));
        assert!(accessors.contains(&"resX".to_string()));

        let getters: Vec<_> = OPTIONAL_PARAMETERS.iter().map(OptionalParameter::getter).collect();
        assert_eq!(
            getters,
            vec![
                "getComponentDirectory",
                "getPostgreSqlHost",
                "getPostgreSqlPort",
                "getPostgreSqlUser",
                "getPostgreSqlPassword",
                "getPostgreSqlDatabase",
            ]
        );
    }

    #[test]
    fn test_canonicalize_sorts_nested_keys() {
        let value = serde_json::json!({"b": {"z": 1, "a": 2}, "a": [{"y": 1, "x": 2}]});
        let json = serde_json::to_string(&canonicalize(value)).unwrap();
        assert_eq!(json, r#"{"a":[{"x":2,"y":1}],"b":{"a":2,"z":1}}"#);
    }

    #[test]
    fn test_non_finite_floats_travel_as_names() {
        assert_eq!(float_to_value(f64::INFINITY), Value::from("inf"));
        assert_eq!(float_to_value(f64::NEG_INFINITY), Value::from("-inf"));
        assert_eq!(float_to_value(f64::NAN), Value::from("NaN"));
        assert_eq!(float_to_value(4.5), serde_json::json!(4.5));

        assert_eq!(value_to_float(&Value::from("-inf")), Some(f64::NEG_INFINITY));
        assert!(value_to_float(&Value::from("NaN")).is_some_and(f64::is_nan));
        assert_eq!(value_to_float(&Value::from("Infinity")), None);
        assert_eq!(value_to_float(&Value::Null), None);
    }

    #[test]
    fn test_parse_extent_rejects_negative_component() {
        let err = parse_extent("block_size", &serde_json::json!([1, -2, 3])).unwrap_err();
        assert!(matches!(err, CodecError::InvalidValue { .. }));
    }
}
