//! End-to-end tests for the argument lifecycle
//!
//! Declare -> supply (text / JSON) -> validate -> extract.

use serde_json::json;
use verdant_schema::{
    validate, Argument, ArgumentError, ArgumentMap, ArgumentSchema, ArgumentValue, Arguments,
    SchemaError, ValidationIssue,
};

fn window_schema() -> ArgumentSchema {
    ArgumentSchema::new()
        .with(
            Argument::double("wwr")
                .with_display_name("Window to Wall Ratio")
                .with_domain(0.0, 0.95)
                .with_default(0.4),
        )
        .unwrap()
        .with(
            Argument::choice("facade", ["North", "East", "South", "West", "All"])
                .with_default("South"),
        )
        .unwrap()
}

// =============================================================================
// DECLARATION
// =============================================================================

#[test]
fn test_bad_declarations_fail_before_any_run() {
    let mut schema = window_schema();
    let before = schema.len();

    assert!(matches!(
        schema.declare(Argument::double("wwr")),
        Err(SchemaError::DuplicateArgument(_))
    ));
    assert!(matches!(
        schema.declare(Argument::double("sill").with_domain(0.0, 1.0).with_default(2.0)),
        Err(SchemaError::InvalidDefault { .. })
    ));
    assert_eq!(schema.len(), before, "Failed declarations must not be recorded");
}

#[test]
fn test_schema_serializes_in_order() {
    let json = serde_json::to_value(window_schema()).unwrap();
    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["wwr", "facade"]);
    assert_eq!(json[0]["type"], "double");
}

// =============================================================================
// VALIDATION
// =============================================================================

#[test]
fn test_required_pct_missing_is_invalid() {
    let schema = ArgumentSchema::new()
        .with(Argument::double("pct"))
        .unwrap();
    let report = validate(&schema, &ArgumentMap::new());

    assert!(!report.is_valid());
    assert!(report.errors().count() >= 1);
}

#[test]
fn test_complete_well_typed_map_validates() {
    let schema = window_schema();
    let values = ArgumentMap::from_assignments(&schema, ["wwr=0.3", "facade=North"]).unwrap();
    assert!(validate(&schema, &values).is_valid());
}

#[test]
fn test_json_values_validated_against_domain() {
    let schema = window_schema();
    let object = json!({ "wwr": 1, "facade": "West" });
    let values = ArgumentMap::from_json(&schema, object.as_object().unwrap()).unwrap();
    let report = validate(&schema, &values);

    assert!(!report.is_valid());
    assert!(matches!(
        report.errors().next(),
        Some(ValidationIssue::OutOfDomain { name, .. }) if name == "wwr"
    ));
}

// =============================================================================
// EXTRACTION
// =============================================================================

#[test]
fn test_pct_default_returned_from_empty_map() {
    let schema = ArgumentSchema::new()
        .with(Argument::double("pct").with_default(30.0))
        .unwrap();
    let values = ArgumentMap::new();
    let args = Arguments::new(&schema, &values);

    assert_eq!(args.get::<f64>("pct").unwrap(), 30.0);
}

#[test]
fn test_every_default_returned_from_empty_map() {
    let schema = window_schema();
    let values = ArgumentMap::new();

    for arg in schema.list() {
        let default = arg.default_value.clone().unwrap();
        let resolved = schema
            .resolved(&values)
            .into_iter()
            .find(|(n, _)| *n == arg.name)
            .map(|(_, v)| v);
        assert_eq!(resolved, Some(default));
    }

    let args = Arguments::new(&schema, &values);
    assert_eq!(args.get::<f64>("wwr").unwrap(), 0.4);
    assert_eq!(args.get::<String>("facade").unwrap(), "South");
}

#[test]
fn test_extract_errors() {
    let schema = window_schema();
    let values = ArgumentMap::new().with("facade", ArgumentValue::Integer(1));
    let args = Arguments::new(&schema, &values);

    assert!(matches!(
        args.get::<String>("facade"),
        Err(ArgumentError::TypeMismatch { .. })
    ));
    assert!(matches!(args.get::<f64>("sill"), Err(ArgumentError::Unknown(_))));
}
