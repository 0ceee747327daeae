//! Configuration for Verdant
//!
//! `$VERDANT_HOME/config.toml` (or `--config`), every field optional:
//!
//! ```toml
//! [engine]
//! executable = "energyplus"
//! extra_args = ["--readvars"]
//!
//! [runner]
//! log_messages = true
//! report_dir = "reports"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use verdant_protocol::defaults::{CONFIG_FILE_NAME, DEFAULT_ENGINE_EXECUTABLE, DEFAULT_REPORT_DIR};

use super::error::HelpfulError;

const HOME_ENV: &str = "VERDANT_HOME";
const HOME_DIR_NAME: &str = ".verdant";
const LOGS_DIR_NAME: &str = "logs";

/// Where Verdant keeps its own files: `<home>/config.toml` and `<home>/logs/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub home: PathBuf,
    pub config: PathBuf,
    /// Set when the config path came from `--config` / `VERDANT_CONFIG`
    pub config_explicit: bool,
    pub logs: PathBuf,
}

impl Layout {
    /// Home is `VERDANT_HOME` when set, else `~/.verdant`.
    pub fn resolve(config_override: Option<&Path>) -> Self {
        let home = match std::env::var_os(HOME_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(HOME_DIR_NAME),
        };
        Self::under(home, config_override)
    }

    pub fn under(home: PathBuf, config_override: Option<&Path>) -> Self {
        let (config, config_explicit) = match config_override {
            Some(path) => (path.to_path_buf(), true),
            None => (home.join(CONFIG_FILE_NAME), false),
        };
        Self {
            logs: home.join(LOGS_DIR_NAME),
            config,
            config_explicit,
            home,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_executable")]
    pub executable: PathBuf,
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            extra_args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Mirror measure messages into the log
    #[serde(default = "default_log_messages")]
    pub log_messages: bool,
    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            log_messages: default_log_messages(),
            report_dir: default_report_dir(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub runner: RunnerConfig,
}

fn default_executable() -> PathBuf {
    PathBuf::from(DEFAULT_ENGINE_EXECUTABLE)
}

fn default_log_messages() -> bool {
    true
}

fn default_report_dir() -> PathBuf {
    PathBuf::from(DEFAULT_REPORT_DIR)
}

impl AppConfig {
    /// A missing default file yields defaults; a missing explicit file is an error.
    pub fn load(layout: &Layout) -> Result<Self> {
        let path = &layout.config;
        if !path.exists() {
            if layout.config_explicit {
                return Err(HelpfulError::file_not_found(path).into());
            }
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::from_toml_str(&content)
            .map_err(|e| HelpfulError::invalid_config(path, &e.to_string()).into())
    }

    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Run the config command - shows resolved configuration and paths
pub fn run(layout: &Layout, json: bool) -> Result<()> {
    let config = AppConfig::load(layout)?;
    let Layout {
        home, config: path, logs, ..
    } = layout;

    if json {
        let payload = serde_json::json!({
            "home": home.to_string_lossy(),
            "config": {
                "path": path.to_string_lossy(),
                "exists": path.exists(),
            },
            "logs": logs.to_string_lossy(),
            "settings": config,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("VERDANT CONFIGURATION");
        println!("=====================");
        println!();
        println!("Home:     {}", home.display());
        println!(
            "Config:   {} ({})",
            path.display(),
            if path.exists() { "exists" } else { "not found, using defaults" }
        );
        println!("Logs:     {}", logs.display());
        println!();
        let rendered = toml::to_string_pretty(&config).context("Failed to render config")?;
        print!("{}", rendered);
    }

    Ok(())
}
