//! Round Trip Tests - Property-Based
//!
//! Any configuration built through the public setters must survive
//! capture, JSON transport, and restore unchanged.

use proptest::prelude::*;
use pysopnet::{
    capture, restore, BackendType, ConfigurationState, Point3, ProjectConfiguration,
    StackDescription, StackType,
};

// ============================================================================
// Strategies
// ============================================================================

/// Resolutions on a 1/8 grid so they survive JSON text exactly, plus the
/// infinities. NaN is left out since it never compares equal.
fn resolution() -> impl Strategy<Value = f64> {
    prop_oneof![
        8 => (0u32..10_000).prop_map(|v| f64::from(v) / 8.0),
        1 => Just(f64::INFINITY),
        1 => Just(f64::NEG_INFINITY),
    ]
}

fn feature_weight() -> impl Strategy<Value = f64> {
    prop_oneof![
        8 => (-10_000i32..10_000).prop_map(|v| f64::from(v) / 16.0),
        1 => Just(f64::INFINITY),
        1 => Just(f64::NEG_INFINITY),
    ]
}

fn point() -> impl Strategy<Value = Point3> {
    (any::<u32>(), any::<u32>(), any::<u32>()).prop_map(|(x, y, z)| Point3::new(x, y, z))
}

fn stack() -> impl Strategy<Value = StackDescription> {
    (
        (any::<u32>(), any::<u32>(), ".{0,24}", "[a-z]{0,4}", 0u32..10),
        (any::<u32>(), any::<u32>(), any::<u32>(), any::<u32>(), any::<u32>()),
        (resolution(), resolution(), resolution(), 0u32..8),
    )
        .prop_map(
            |(
                (id, segmentation_id, image_base, file_extension, tile_source_type),
                (tile_width, tile_height, width, height, depth),
                (res_x, res_y, res_z, scale),
            )| StackDescription {
                id,
                segmentation_id,
                image_base,
                file_extension,
                tile_source_type,
                tile_width,
                tile_height,
                width,
                height,
                depth,
                res_x,
                res_y,
                res_z,
                scale,
            },
        )
}

fn backend() -> impl Strategy<Value = BackendType> {
    prop::sample::select(BackendType::all().to_vec())
}

fn configuration() -> impl Strategy<Value = ProjectConfiguration> {
    (
        backend(),
        stack(),
        stack(),
        (point(), point(), point()),
        (prop::collection::vec(feature_weight(), 0..8), any::<i32>()),
        prop::collection::vec(prop::option::of("[ -~]{0,16}"), 6),
    )
        .prop_map(|(backend_type, raw, membrane, extents, identity, parameters)| {
            let (block, volume, core) = extents;
            let (weights, segmentation_id) = identity;
            let mut config = ProjectConfiguration::new();
            config.set_backend_type(backend_type);
            config.set_catmaid_stack(StackType::Raw, raw);
            config.set_catmaid_stack(StackType::Membrane, membrane);
            config.set_block_size(block);
            config.set_volume_size(volume);
            config.set_core_size(core);
            config.set_local_feature_weights(weights);
            config.set_segmentation_configuration_id(segmentation_id);

            let setters: [fn(&mut ProjectConfiguration, String); 6] = [
                |c: &mut ProjectConfiguration, v: String| c.set_component_directory(v),
                |c: &mut ProjectConfiguration, v: String| c.set_postgre_sql_host(v),
                |c: &mut ProjectConfiguration, v: String| c.set_postgre_sql_port(v),
                |c: &mut ProjectConfiguration, v: String| c.set_postgre_sql_user(v),
                |c: &mut ProjectConfiguration, v: String| c.set_postgre_sql_password(v),
                |c: &mut ProjectConfiguration, v: String| c.set_postgre_sql_database(v),
            ];
            for (set, value) in setters.iter().zip(parameters) {
                if let Some(value) = value {
                    set(&mut config, value);
                }
            }
            config
        })
}

// ============================================================================
// Non-finite Values
// ============================================================================

#[test]
fn test_infinite_resolution_survives_json_transport() {
    let mut original = ProjectConfiguration::new();
    original.set_catmaid_stack(
        StackType::Raw,
        StackDescription {
            res_z: f64::INFINITY,
            res_x: f64::NEG_INFINITY,
            ..Default::default()
        },
    );
    original.set_local_feature_weights(vec![f64::INFINITY, 2.5]);

    let json = capture(&original).to_json().unwrap();
    let mut restored = ProjectConfiguration::new();
    restore(&mut restored, &ConfigurationState::from_json(&json).unwrap()).unwrap();

    assert_eq!(restored, original);
}

#[test]
fn test_nan_resolution_survives_round_trip() {
    let mut original = ProjectConfiguration::new();
    original.set_catmaid_stack(
        StackType::Membrane,
        StackDescription {
            res_y: f64::NAN,
            ..Default::default()
        },
    );

    let mut restored = ProjectConfiguration::new();
    restore(&mut restored, &capture(&original)).unwrap();

    assert!(restored.catmaid_stack(StackType::Membrane).res_y.is_nan());
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn test_capture_restore_round_trip(original in configuration()) {
        let mut restored = ProjectConfiguration::new();
        restore(&mut restored, &capture(&original)).unwrap();
        prop_assert_eq!(restored, original);
    }

    #[test]
    fn test_json_transport_round_trip(original in configuration()) {
        let json = capture(&original).to_json().unwrap();
        let state = ConfigurationState::from_json(&json).unwrap();

        let mut restored = ProjectConfiguration::new();
        restore(&mut restored, &state).unwrap();
        prop_assert_eq!(restored, original);
    }

    #[test]
    fn test_capture_is_stable(original in configuration()) {
        let first = capture(&original);
        let second = capture(&original);
        prop_assert_eq!(first.fingerprint().unwrap(), second.fingerprint().unwrap());
        prop_assert_eq!(first, second);
    }
}
