//! Simulation engine invocation.
//!
//! The engine is an opaque executable run as a blocking subprocess:
//!
//! ```text
//! <executable> [extra_args...] [-w <weather>] -d <output_dir> <model>
//! ```
//!
//! There is no timeout and no cancellation; the caller waits for exit.

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Lines of stdout/stderr kept on the outcome.
const OUTPUT_TAIL_LINES: usize = 20;

const SQL_OUTPUT_FILE: &str = "eplusout.sql";
const ERR_OUTPUT_FILE: &str = "eplusout.err";

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Failed to spawn {executable}: {source}")]
    Spawn {
        executable: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Model file not found: {0}")]
    MissingModel(PathBuf),
}

/// One engine run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub executable: PathBuf,
    pub model_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_path: Option<PathBuf>,
    pub output_dir: PathBuf,
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl SimulationRequest {
    pub fn new(
        executable: impl Into<PathBuf>,
        model_path: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            executable: executable.into(),
            model_path: model_path.into(),
            weather_path: None,
            output_dir: output_dir.into(),
            extra_args: Vec::new(),
        }
    }

    pub fn with_weather(mut self, weather_path: impl Into<PathBuf>) -> Self {
        self.weather_path = Some(weather_path.into());
        self
    }

    pub fn with_extra_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Arguments passed to the executable, in order.
    pub fn command_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.extra_args.iter().map(OsString::from).collect();
        if let Some(weather) = &self.weather_path {
            args.push("-w".into());
            args.push(weather.clone().into_os_string());
        }
        args.push("-d".into());
        args.push(self.output_dir.clone().into_os_string());
        args.push(self.model_path.clone().into_os_string());
        args
    }

    /// Spawn the engine and wait for it to exit.
    ///
    /// A non-zero exit is reported on the outcome, not as an error.
    pub fn run(&self) -> Result<SimulationOutcome, SimulationError> {
        if !self.model_path.exists() {
            return Err(SimulationError::MissingModel(self.model_path.clone()));
        }
        fs::create_dir_all(&self.output_dir).map_err(|source| SimulationError::OutputDir {
            path: self.output_dir.clone(),
            source,
        })?;

        info!(
            executable = %self.executable.display(),
            model = %self.model_path.display(),
            output_dir = %self.output_dir.display(),
            "Starting simulation"
        );

        let output = Command::new(&self.executable)
            .args(self.command_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| SimulationError::Spawn {
                executable: self.executable.clone(),
                source,
            })?;

        let success = output.status.success();
        let exit_code = output.status.code();
        let artifacts = SimulationArtifacts::discover(&self.output_dir);
        let err_summary = artifacts
            .err_file
            .as_deref()
            .and_then(|path| match summarize_err_file(path) {
                Ok(summary) => Some(summary),
                Err(err) => {
                    warn!("Failed to read {}: {}", path.display(), err);
                    None
                }
            });

        if success {
            info!(exit_code = ?exit_code, "Simulation finished");
        } else {
            warn!(exit_code = ?exit_code, "Simulation exited with failure");
        }

        Ok(SimulationOutcome {
            success,
            exit_code,
            stdout_tail: tail_lines(&String::from_utf8_lossy(&output.stdout), OUTPUT_TAIL_LINES),
            stderr_tail: tail_lines(&String::from_utf8_lossy(&output.stderr), OUTPUT_TAIL_LINES),
            artifacts,
            err_summary,
        })
    }
}

/// What an engine run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutcome {
    /// Exit code 0
    pub success: bool,
    /// `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub stdout_tail: String,
    pub stderr_tail: String,
    pub artifacts: SimulationArtifacts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err_summary: Option<ErrFileSummary>,
}

/// Known output files in a simulation output directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationArtifacts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err_file: Option<PathBuf>,
    #[serde(default)]
    pub json_reports: Vec<PathBuf>,
}

impl SimulationArtifacts {
    /// Scan `output_dir` (non-recursive). A missing directory yields nothing.
    pub fn discover(output_dir: &Path) -> Self {
        let mut artifacts = Self::default();
        let entries = match fs::read_dir(output_dir) {
            Ok(entries) => entries,
            Err(err) => {
                debug!("Cannot scan {}: {}", output_dir.display(), err);
                return artifacts;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            if file_name == SQL_OUTPUT_FILE {
                artifacts.sql = Some(path);
            } else if file_name == ERR_OUTPUT_FILE {
                artifacts.err_file = Some(path);
            } else if path.extension().and_then(|e| e.to_str()) == Some("json") {
                artifacts.json_reports.push(path);
            }
        }
        artifacts.json_reports.sort();
        artifacts
    }
}

/// Counts from an engine `.err` file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrFileSummary {
    pub warnings: usize,
    pub severe: usize,
    pub fatal: usize,
    pub completed_successfully: bool,
}

/// Count `** Warning **`, `** Severe **` and `** Fatal **` lines.
pub fn summarize_err_file(path: &Path) -> std::io::Result<ErrFileSummary> {
    let content = fs::read_to_string(path)?;
    Ok(summarize_err_text(&content))
}

fn summarize_err_text(content: &str) -> ErrFileSummary {
    let mut summary = ErrFileSummary::default();
    for line in content.lines() {
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix("**") {
            match rest.split("**").next().map(str::trim) {
                Some("Warning") => summary.warnings += 1,
                Some("Severe") => summary.severe += 1,
                Some("Fatal") => summary.fatal += 1,
                _ => {}
            }
        }
        if trimmed.contains("Completed Successfully") {
            summary.completed_successfully = true;
        }
    }
    summary
}

fn tail_lines(text: &str, count: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(count);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_ERR: &str = "\
Program Version,EnergyPlus, Version 9.6.0
   ** Warning ** GetHTSurfaceData: Surfaces with interface to Ground found
   **   ~~~   ** but no \"Ground\" objects were found.
   ** Warning ** Weather file location will be used
   ** Severe  ** Node connection error
   **  Fatal  ** Errors occurred on processing input file
   ************* EnergyPlus Completed Successfully-- 2 Warning; 0 Severe Errors
";

    #[test]
    fn test_summarize_err_text() {
        let summary = summarize_err_text(SAMPLE_ERR);
        assert_eq!(summary.warnings, 2);
        assert_eq!(summary.severe, 1);
        assert_eq!(summary.fatal, 1);
        assert!(summary.completed_successfully);
    }

    #[test]
    fn test_command_args_order() {
        let request = SimulationRequest::new("energyplus", "in.idf", "out")
            .with_weather("w.epw")
            .with_extra_args(["--readvars"]);
        let args: Vec<String> = request
            .command_args()
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args, vec!["--readvars", "-w", "w.epw", "-d", "out", "in.idf"]);
    }

    #[test]
    fn test_command_args_without_weather() {
        let request = SimulationRequest::new("energyplus", "in.idf", "out");
        assert_eq!(request.command_args().len(), 3);
    }

    #[test]
    fn test_tail_lines() {
        assert_eq!(tail_lines("a\nb\nc", 2), "b\nc");
        assert_eq!(tail_lines("a", 5), "a");
        assert_eq!(tail_lines("", 5), "");
    }

    #[test]
    fn test_discover_missing_dir_is_empty() {
        let artifacts = SimulationArtifacts::discover(Path::new("/definitely/not/here"));
        assert_eq!(artifacts, SimulationArtifacts::default());
    }
}
