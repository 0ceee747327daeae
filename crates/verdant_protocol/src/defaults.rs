//! Canonical default values shared across the runner and the CLI.

pub const DEFAULT_ENGINE_EXECUTABLE: &str = "energyplus";
pub const DEFAULT_REPORT_DIR: &str = "reports";
pub const DEFAULT_LOG_FILTER: &str = "verdant=info,verdant_runner=info,verdant_model=info";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const WORKFLOW_RESULT_FILE_NAME: &str = "workflow_result.json";
pub const RETURNED_FALSE_MESSAGE: &str = "Measure returned false without registering an error";
