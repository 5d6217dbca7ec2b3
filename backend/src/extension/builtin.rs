//! Built-in extensions
//!
//! - [`Point3Display`]: `__str__` renders a point as `(x, y, z)`
//! - [`ConfigurationPickling`]: `__getstate__` / `__setstate__` run the
//!   configuration codec, so a configuration can be pickled by any
//!   transport that understands those hooks

use serde_json::Value;

use crate::codec::state::{capture, restore, ConfigurationState};
use crate::extension::{Extension, ExtensionError, ExtensionRegistry, Member};
use crate::models::{Point3, ProjectConfiguration};

pub struct Point3Display;

impl Extension for Point3Display {
    type Target = Point3;

    fn members() -> Vec<(&'static str, Member)> {
        vec![(
            "__str__",
            Member::getter(|point: &Point3| {
                Ok(Value::from(format!("({}, {}, {})", point.x(), point.y(), point.z())))
            }),
        )]
    }
}

pub struct ConfigurationPickling;

impl Extension for ConfigurationPickling {
    type Target = ProjectConfiguration;

    fn members() -> Vec<(&'static str, Member)> {
        vec![
            (
                "__getstate__",
                Member::getter(|config: &ProjectConfiguration| Ok(capture(config).into_value())),
            ),
            (
                "__setstate__",
                Member::mutator(|config: &mut ProjectConfiguration, state: Value| {
                    let state = ConfigurationState::try_from(state)?;
                    restore(config, &state)?;
                    Ok(())
                }),
            ),
        ]
    }
}

/// Install every built-in extension.
pub fn install(registry: &mut ExtensionRegistry) -> Result<(), ExtensionError> {
    registry.extend::<Point3Display>()?;
    registry.extend::<ConfigurationPickling>()?;
    Ok(())
}
