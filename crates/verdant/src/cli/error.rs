//! Errors that tell the user what to do next
//!
//! Commands return these through `anyhow`; `main` prints them as text or,
//! in `--json` mode, as an object with `error`, `context` and `suggestions`.

use std::fmt;
use std::path::Path;

#[derive(Debug)]
pub struct HelpfulError {
    pub message: String,
    /// What the command was looking at when it failed
    pub context: Option<String>,
    /// `TRY:` lines, most useful first
    pub suggestions: Vec<String>,
}

impl HelpfulError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
        }
    }

    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self {
            context: Some(context.into()),
            ..self
        }
    }

    pub fn with_suggestion(self, suggestion: impl Into<String>) -> Self {
        self.with_suggestions([suggestion.into()])
    }

    pub fn with_suggestions<S: Into<String>>(mut self, suggestions: impl IntoIterator<Item = S>) -> Self {
        self.suggestions.extend(suggestions.into_iter().map(Into::into));
        self
    }

    pub fn file_not_found(path: &Path) -> Self {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.display().to_string(),
            _ => ".".to_string(),
        };
        Self::new(format!("File not found: {}", path.display()))
            .with_context("Paths are resolved relative to the current directory")
            .with_suggestions([
                format!("TRY: Look for it: ls {}", parent),
                "TRY: Pass an absolute path".to_string(),
            ])
    }

    /// Measure key not in the registry
    pub fn unknown_measure(key: &str, available: &[&str]) -> Self {
        Self::new(format!("Unknown measure: '{}'", key))
            .with_context(format!("Available measures: {}", available.join(", ")))
            .with_suggestions([
                "TRY: List measures: verdant list".to_string(),
                "TRY: Measure keys are snake_case, e.g. reduce_lighting_loads_by_percentage"
                    .to_string(),
            ])
    }

    /// Model file could not be loaded
    pub fn invalid_model(path: &Path, details: &str) -> Self {
        Self::new(format!("Cannot load model: {}", path.display()))
            .with_context(details.to_string())
            .with_suggestions([
                format!("TRY: Validate the JSON: python -m json.tool {}", path.display()),
                "TRY: Areas and R-values must be non-negative numbers".to_string(),
                "TRY: Window area must not exceed the wall's gross area".to_string(),
            ])
    }

    /// `--arg` value could not be parsed
    pub fn invalid_argument(measure: &str, details: &str) -> Self {
        Self::new(format!("Invalid argument for {}: {}", measure, details))
            .with_context("Arguments are given as --arg name=value")
            .with_suggestions([
                format!("TRY: Show accepted arguments: verdant describe {}", measure),
                "TRY: Booleans are exactly 'true' or 'false'".to_string(),
            ])
    }

    /// Simulation engine could not be started
    pub fn engine_not_found(executable: &Path, details: &str) -> Self {
        Self::new(format!("Cannot start simulation engine: {}", executable.display()))
            .with_context(details.to_string())
            .with_suggestions([
                "TRY: Pass the engine path: verdant simulate --engine /path/to/energyplus MODEL"
                    .to_string(),
                "TRY: Set [engine] executable in ~/.verdant/config.toml".to_string(),
            ])
    }

    /// Config file is malformed
    pub fn invalid_config(path: &Path, details: &str) -> Self {
        Self::new(format!("Invalid config file: {}", path.display()))
            .with_context(details.to_string())
            .with_suggestions([
                "TRY: Show the resolved configuration: verdant config".to_string(),
                format!("TRY: Move the file aside to fall back to defaults: mv {0} {0}.bak", path.display()),
            ])
    }
}

impl fmt::Display for HelpfulError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ERROR: {}", self.message)?;
        if let Some(context) = &self.context {
            writeln!(f, "CONTEXT: {}", context)?;
        }
        if !self.suggestions.is_empty() {
            writeln!(f)?;
        }
        self.suggestions
            .iter()
            .try_for_each(|suggestion| writeln!(f, "  {}", suggestion))
    }
}

impl std::error::Error for HelpfulError {}

/// A command failure whose outcome is already on stdout.
///
/// `--json` commands put the failed status in their one payload; `main` then
/// exits non-zero without printing a second document.
#[derive(Debug)]
pub struct ReportedFailure(pub String);

impl fmt::Display for ReportedFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ReportedFailure {}

/// Whether `main` still has to print `err` in `--json` mode.
pub fn needs_json_error(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ReportedFailure>().is_none()
}

/// Print an error as a JSON object on stdout (for `--json` commands).
pub fn print_json_error(err: &anyhow::Error) {
    let payload = match err.downcast_ref::<HelpfulError>() {
        Some(helpful) => serde_json::json!({
            "error": helpful.message,
            "context": helpful.context,
            "suggestions": helpful.suggestions,
        }),
        None => serde_json::json!({
            "error": format!("{:#}", err),
        }),
    };
    println!("{}", payload);
}
