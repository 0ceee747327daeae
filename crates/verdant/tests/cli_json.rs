use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const MODEL_JSON: &str = r#"{
    "name": "cli office",
    "spaces": [
        {"name": "office", "floor_area_m2": 100.0, "lighting_power_density": 10.0}
    ],
    "surfaces": [
        {"name": "south wall", "space": "office", "surface_type": "wall",
         "boundary_condition": "outdoors", "azimuth_deg": 180.0,
         "gross_area_m2": 30.0, "window_area_m2": 6.0, "r_value": 2.0},
        {"name": "roof", "space": "office", "surface_type": "roof_ceiling",
         "boundary_condition": "outdoors", "gross_area_m2": 100.0, "r_value": 3.0}
    ]
}"#;

fn verdant_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_verdant"))
}

fn run_cli(args: &[&str], home: &Path) -> Output {
    Command::new(verdant_bin())
        .args(args)
        .env("VERDANT_HOME", home)
        .env_remove("VERDANT_CONFIG")
        .output()
        .expect("failed to execute verdant CLI")
}

fn parse_json_output(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json_start = stdout
        .find(|c| c == '{' || c == '[')
        .unwrap_or_else(|| {
            panic!(
                "no JSON payload found in output\nstdout:\n{}\nstderr:\n{}",
                stdout,
                String::from_utf8_lossy(&output.stderr)
            )
        });
    let mut deserializer = serde_json::Deserializer::from_str(&stdout[json_start..]);
    serde_json::Value::deserialize(&mut deserializer).unwrap_or_else(|err| {
        panic!(
            "failed to parse JSON output: {}\nstdout:\n{}\nstderr:\n{}",
            err,
            stdout,
            String::from_utf8_lossy(&output.stderr)
        )
    })
}

fn run_cli_json(args: &[&str], home: &Path) -> serde_json::Value {
    let output = run_cli(args, home);
    assert!(
        output.status.success(),
        "command failed: {}\nstdout:\n{}\nstderr:\n{}",
        args.join(" "),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    parse_json_output(&output)
}

fn run_cli_json_error(args: &[&str], home: &Path) -> serde_json::Value {
    let output = run_cli(args, home);
    assert!(
        !output.status.success(),
        "command unexpectedly succeeded: {}\nstdout:\n{}",
        args.join(" "),
        String::from_utf8_lossy(&output.stdout)
    );
    parse_json_output(&output)
}

fn write_model(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("model.json");
    fs::write(&path, MODEL_JSON).unwrap();
    path
}

#[test]
fn test_list_json_names_builtin_measures() {
    let home = TempDir::new().unwrap();
    let value = run_cli_json(&["list", "--json"], home.path());

    let keys: Vec<&str> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["key"].as_str().unwrap())
        .collect();
    assert!(keys.contains(&"reduce_lighting_loads_by_percentage"));
    assert!(keys.contains(&"increase_roof_insulation"));
    assert!(keys.contains(&"set_window_to_wall_ratio_by_facade"));
    assert!(keys.contains(&"report_model_summary"));
}

#[test]
fn test_describe_json_includes_defaults() {
    let home = TempDir::new().unwrap();
    let value = run_cli_json(
        &["describe", "reduce_lighting_loads_by_percentage", "--json"],
        home.path(),
    );

    let arguments = value["arguments"].as_array().unwrap();
    assert_eq!(arguments.len(), 1);
    assert_eq!(arguments[0]["name"], "pct");
}

#[test]
fn test_apply_json_saves_model_and_report() {
    let home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let model = write_model(&work);
    let output = work.path().join("out.json");
    let reports = work.path().join("reports");

    let value = run_cli_json(
        &[
            "apply",
            "reduce_lighting_loads_by_percentage",
            model.to_str().unwrap(),
            "--arg",
            "pct=50",
            "--output",
            output.to_str().unwrap(),
            "--report-dir",
            reports.to_str().unwrap(),
            "--json",
        ],
        home.path(),
    );

    assert_eq!(value["result"]["status"], "success");
    assert!(reports
        .join("reduce_lighting_loads_by_percentage_result.json")
        .exists());

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(saved["spaces"][0]["lighting_power_density"], 5.0);
}

#[test]
fn test_apply_out_of_domain_fails_without_saving() {
    let home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let model = write_model(&work);
    let output = work.path().join("out.json");

    let output_cli = run_cli(
        &[
            "apply",
            "reduce_lighting_loads_by_percentage",
            model.to_str().unwrap(),
            "-a",
            "pct=150",
            "--output",
            output.to_str().unwrap(),
            "--report-dir",
            work.path().join("reports").to_str().unwrap(),
            "--json",
        ],
        home.path(),
    );

    assert!(!output_cli.status.success());
    assert!(!output.exists());
}

#[test]
fn test_failed_apply_prints_single_json_document() {
    let home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let model = write_model(&work);

    let output = run_cli(
        &[
            "apply",
            "reduce_lighting_loads_by_percentage",
            model.to_str().unwrap(),
            "-a",
            "pct=150",
            "--report-dir",
            work.path().join("reports").to_str().unwrap(),
            "--json",
        ],
        home.path(),
    );
    assert!(!output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let value: serde_json::Value = serde_json::from_str(&stdout)
        .unwrap_or_else(|err| panic!("stdout is not one JSON document: {}\n{}", err, stdout));
    assert_eq!(value["result"]["status"], "fail");
    assert!(value["saved_model"].is_null());
    assert!(value.get("error").is_none());
}

#[test]
fn test_failed_workflow_prints_single_json_document() {
    let home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let model = write_model(&work);
    let workflow = work.path().join("workflow.json");
    fs::write(
        &workflow,
        r#"{"steps": [
            {"measure": "increase_roof_insulation"},
            {"measure": "report_model_summary"}
        ]}"#,
    )
    .unwrap();

    let output = run_cli(
        &[
            "workflow",
            workflow.to_str().unwrap(),
            model.to_str().unwrap(),
            "--report-dir",
            work.path().join("reports").to_str().unwrap(),
            "--json",
        ],
        home.path(),
    );
    assert!(!output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let value: serde_json::Value = serde_json::from_str(&stdout)
        .unwrap_or_else(|err| panic!("stdout is not one JSON document: {}\n{}", err, stdout));
    assert_eq!(value["workflow"]["completed_status"], "Fail");
}

#[test]
fn test_unknown_measure_reports_helpful_json_error() {
    let home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let model = write_model(&work);

    let value = run_cli_json_error(
        &["apply", "paint_it_green", model.to_str().unwrap(), "--json"],
        home.path(),
    );

    assert!(value["error"].as_str().unwrap().contains("paint_it_green"));
    assert!(!value["suggestions"].as_array().unwrap().is_empty());
}

#[test]
fn test_workflow_json_runs_all_steps() {
    let home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let model = write_model(&work);
    let workflow = work.path().join("workflow.json");
    fs::write(
        &workflow,
        r#"{"name": "retrofit", "steps": [
            {"measure": "increase_roof_insulation", "arguments": {"r_value_increase": 2}},
            {"measure": "report_model_summary"}
        ]}"#,
    )
    .unwrap();
    let reports = work.path().join("reports");

    let value = run_cli_json(
        &[
            "workflow",
            workflow.to_str().unwrap(),
            model.to_str().unwrap(),
            "--report-dir",
            reports.to_str().unwrap(),
            "--json",
        ],
        home.path(),
    );

    assert_eq!(value["workflow"]["completed_status"], "Success");
    assert_eq!(value["workflow"]["steps"].as_array().unwrap().len(), 2);
    assert!(reports.join("workflow_result.json").exists());
}
