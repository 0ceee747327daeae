//! JSON result files.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;
use verdant_protocol::defaults::WORKFLOW_RESULT_FILE_NAME;
use verdant_protocol::{clean_value_name, MeasureResult};

use crate::workflow::WorkflowResult;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Write `<measure>_result.json` into `dir`. Returns the written path.
pub fn write_result_json(result: &MeasureResult, dir: &Path) -> Result<PathBuf, ReportError> {
    let file_name = format!("{}_result.json", clean_value_name(&result.measure_name));
    write_json(result, &dir.join(file_name))
}

/// Write `workflow_result.json` into `dir`. Returns the written path.
pub fn write_workflow_json(result: &WorkflowResult, dir: &Path) -> Result<PathBuf, ReportError> {
    write_json(result, &dir.join(WORKFLOW_RESULT_FILE_NAME))
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<PathBuf, ReportError> {
    let io_err = |source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(io_err)?;
    info!("Wrote report {}", path.display());
    Ok(path.to_path_buf())
}
