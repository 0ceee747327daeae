//! Built-in measures driven through a workflow file against a model on disk.

use std::fs;
use tempfile::TempDir;
use verdant_model::{builtin_registry, BuildingModel};
use verdant_protocol::{MeasureStatus, StepValueKind};
use verdant_runner::{run_workflow, RunContext, StepState, Workflow};

const MODEL_JSON: &str = r#"{
    "name": "small office",
    "spaces": [
        {"name": "open office", "floor_area_m2": 200.0, "lighting_power_density": 10.0},
        {"name": "storage", "floor_area_m2": 50.0}
    ],
    "surfaces": [
        {"name": "s wall", "space": "open office", "surface_type": "wall",
         "boundary_condition": "outdoors", "azimuth_deg": 180.0,
         "gross_area_m2": 40.0, "window_area_m2": 8.0, "r_value": 2.0},
        {"name": "n wall", "space": "open office", "surface_type": "wall",
         "boundary_condition": "outdoors", "azimuth_deg": 0.0,
         "gross_area_m2": 40.0, "window_area_m2": 4.0, "r_value": 2.0},
        {"name": "roof", "space": "open office", "surface_type": "roof_ceiling",
         "boundary_condition": "outdoors", "gross_area_m2": 250.0, "r_value": 4.0}
    ]
}"#;

fn write_model(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("model.json");
    fs::write(&path, MODEL_JSON).unwrap();
    path
}

#[test]
fn test_retrofit_workflow_round_trips_model() {
    let temp = TempDir::new().unwrap();
    let path = write_model(&temp);
    let mut model = BuildingModel::load(&path).unwrap();

    let wf = Workflow::from_json_str(
        r#"{"steps": [
            {"measure": "report_model_summary", "name": "baseline"},
            {"measure": "reduce_lighting_loads_by_percentage", "arguments": {"pct": "50"}},
            {"measure": "increase_roof_insulation", "arguments": {"r_value_increase": 1.5}},
            {"measure": "set_window_to_wall_ratio_by_facade",
             "arguments": {"facade": "East", "wwr": 0.3}},
            {"measure": "report_model_summary", "name": "proposed"}
        ]}"#,
    )
    .unwrap();

    let registry = builtin_registry().unwrap();
    let mut ctx = RunContext::new().with_log_messages(false);
    let result = run_workflow(&wf, &registry, &mut model, &mut ctx).unwrap();

    let statuses: Vec<_> = result.steps.iter().map(|s| s.status()).collect();
    assert_eq!(
        statuses,
        vec![
            Some(MeasureStatus::Success),
            Some(MeasureStatus::Success),
            Some(MeasureStatus::Success),
            Some(MeasureStatus::NotApplicable),
            Some(MeasureStatus::Success),
        ]
    );
    assert!(result.is_success());

    let proposed = result.steps[4].result.as_ref().unwrap();
    assert_eq!(proposed.value("lighting_power"), Some(&StepValueKind::Double(1000.0)));

    model.save(&path).unwrap();
    let reloaded = BuildingModel::load(&path).unwrap();
    assert_eq!(reloaded, model);
    assert_eq!(reloaded.surfaces[2].r_value, 5.5);
}

#[test]
fn test_missing_required_argument_skips_rest() {
    let temp = TempDir::new().unwrap();
    let mut model = BuildingModel::load(&write_model(&temp)).unwrap();
    let original = model.clone();

    let wf = Workflow::from_json_str(
        r#"{"steps": [
            {"measure": "increase_roof_insulation"},
            {"measure": "reduce_lighting_loads_by_percentage"}
        ]}"#,
    )
    .unwrap();

    let registry = builtin_registry().unwrap();
    let result = run_workflow(&wf, &registry, &mut model, &mut RunContext::new()).unwrap();

    assert_eq!(result.completed_status, "Fail");
    assert_eq!(result.steps[1].state, StepState::Skipped);
    assert_eq!(model, original);
}

#[test]
fn test_invalid_model_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("bad.json");
    fs::write(&path, r#"{"spaces": [{"name": "x", "floor_area_m2": -1.0}]}"#).unwrap();
    assert!(BuildingModel::load(&path).is_err());
    assert!(BuildingModel::load(&temp.path().join("missing.json")).is_err());
}
