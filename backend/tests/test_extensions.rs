//! Extension Tests - Members Attached to Model Types
//!
//! Critical invariants tested:
//! - Built-in members are reachable through the global table
//! - A conflicting member fails loudly and installs nothing
//! - Getters and mutators cannot be confused

use pysopnet::extension::{extensions, Extension, ExtensionError, ExtensionRegistry, Member};
use pysopnet::{BackendType, ConfigurationPickling, Point3, Point3Display, ProjectConfiguration};
use serde_json::{json, Value};

// ============================================================================
// Test Extensions
// ============================================================================

struct Point3Sum;

impl Extension for Point3Sum {
    type Target = Point3;

    fn members() -> Vec<(&'static str, Member)> {
        vec![(
            "sum",
            Member::getter(|p: &Point3| Ok(Value::from(p.x() + p.y() + p.z()))),
        )]
    }
}

/// Donates a fresh member and one that collides with `Point3Display`.
struct Point3Shadow;

impl Extension for Point3Shadow {
    type Target = Point3;

    fn members() -> Vec<(&'static str, Member)> {
        vec![
            ("volume", Member::getter(|p: &Point3| Ok(Value::from(p.x() * p.y() * p.z())))),
            ("__str__", Member::getter(|_: &Point3| Ok(Value::from("shadowed")))),
        ]
    }
}

struct DuplicateMembers;

impl Extension for DuplicateMembers {
    type Target = ProjectConfiguration;

    fn members() -> Vec<(&'static str, Member)> {
        vec![
            ("label", Member::getter(|_: &ProjectConfiguration| Ok(Value::Null))),
            ("label", Member::getter(|_: &ProjectConfiguration| Ok(Value::Null))),
        ]
    }
}

fn registry_with_builtins() -> ExtensionRegistry {
    let mut registry = ExtensionRegistry::new();
    registry.extend::<Point3Display>().unwrap();
    registry.extend::<ConfigurationPickling>().unwrap();
    registry
}

// ============================================================================
// Built-in Extensions
// ============================================================================

#[test]
fn test_point3_string_form() {
    let rendered = extensions()
        .unwrap()
        .invoke(&Point3::new(256, 256, 10), "__str__")
        .unwrap();
    assert_eq!(rendered, json!("(256, 256, 10)"));
}

#[test]
fn test_global_table_members() {
    let table = extensions().unwrap();
    assert_eq!(table.member_names::<Point3>(), vec!["__str__"]);
    assert_eq!(
        table.member_names::<ProjectConfiguration>(),
        vec!["__getstate__", "__setstate__"]
    );
    assert!(table.member_names::<BackendType>().is_empty());
}

#[test]
fn test_pickling_hooks_round_trip() {
    let table = extensions().unwrap();

    let mut original = ProjectConfiguration::new();
    original.set_backend_type(BackendType::Local);
    original.set_component_directory("/data/components");

    let state = table.invoke(&original, "__getstate__").unwrap();
    assert_eq!(state["backend_type"], json!("Local"));

    let mut restored = ProjectConfiguration::new();
    table.invoke_mut(&mut restored, "__setstate__", state).unwrap();
    assert_eq!(restored, original);
}

#[test]
fn test_setstate_propagates_codec_errors() {
    let err = extensions()
        .unwrap()
        .invoke_mut(&mut ProjectConfiguration::new(), "__setstate__", json!([1, 2, 3]))
        .unwrap_err();
    assert!(matches!(err, ExtensionError::Codec(_)));
}

// ============================================================================
// Registry Behavior
// ============================================================================

#[test]
fn test_extend_adds_new_member() {
    let mut registry = registry_with_builtins();
    registry.extend::<Point3Sum>().unwrap();

    assert!(registry.has_member::<Point3>("sum"));
    assert!(registry.has_member::<Point3>("__str__"));
    assert_eq!(
        registry.invoke(&Point3::new(1, 2, 3), "sum").unwrap(),
        json!(6)
    );
}

#[test]
fn test_conflict_fails_loudly() {
    let mut registry = registry_with_builtins();

    let err = registry.extend::<Point3Shadow>().unwrap_err();
    assert!(matches!(err, ExtensionError::Conflict { member: "__str__", .. }));
}

#[test]
fn test_conflict_installs_nothing() {
    let mut registry = registry_with_builtins();
    let _ = registry.extend::<Point3Shadow>();

    assert!(!registry.has_member::<Point3>("volume"));
    assert_eq!(
        registry.invoke(&Point3::new(1, 2, 3), "__str__").unwrap(),
        json!("(1, 2, 3)")
    );
}

#[test]
fn test_duplicate_within_one_extension() {
    let mut registry = ExtensionRegistry::new();
    let err = registry.extend::<DuplicateMembers>().unwrap_err();
    assert!(matches!(err, ExtensionError::Conflict { member: "label", .. }));
    assert!(registry.member_names::<ProjectConfiguration>().is_empty());
}

#[test]
fn test_second_install_of_same_extension_conflicts() {
    let mut registry = registry_with_builtins();
    assert!(registry.extend::<Point3Display>().is_err());
}

#[test]
fn test_unknown_member() {
    let registry = registry_with_builtins();
    let err = registry.invoke(&Point3::new(0, 0, 0), "__len__").unwrap_err();
    match err {
        ExtensionError::UnknownMember { member, .. } => assert_eq!(member, "__len__"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_wrong_member_kind() {
    let registry = registry_with_builtins();
    let mut config = ProjectConfiguration::new();

    let err = registry.invoke(&config, "__setstate__").unwrap_err();
    assert!(matches!(err, ExtensionError::WrongMemberKind { expected: "getter", .. }));

    let err = registry
        .invoke_mut(&mut config, "__getstate__", Value::Null)
        .unwrap_err();
    assert!(matches!(err, ExtensionError::WrongMemberKind { expected: "mutator", .. }));
}
