//! Verdant command-line harness
//!
//! Runs measures against a JSON building model:
//! - **list / describe**: inspect the built-in measures and their arguments
//! - **apply**: run one measure, optionally saving the mutated model
//! - **workflow**: run a sequence of measures from a workflow file
//! - **simulate**: hand a model to the external simulation engine

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use verdant_logging::{init_logging, LogConfig};

mod cli;

use cli::config::Layout;

#[derive(Parser, Debug)]
#[command(name = "verdant", version, about = "Run building energy measures")]
struct Cli {
    /// Enable verbose logging (debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Path to config file (default: $VERDANT_HOME/config.toml)
    #[arg(long, global = true, env = "VERDANT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List registered measures
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a measure's arguments
    Describe {
        /// Measure key (e.g., reduce_lighting_loads_by_percentage)
        measure: String,

        /// Model used to build the argument list (some measures inspect it)
        #[arg(long)]
        model: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run one measure against a model
    Apply {
        /// Measure key
        measure: String,

        /// Model JSON file
        model: PathBuf,

        /// Argument value as name=value (repeatable)
        #[arg(short = 'a', long = "arg")]
        args: Vec<String>,

        /// Write the mutated model here (omit for a dry run)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Directory for <measure>_result.json (default from config)
        #[arg(long)]
        report_dir: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a workflow file against a model
    Workflow {
        /// Workflow JSON file
        workflow: PathBuf,

        /// Model JSON file
        model: PathBuf,

        /// Write the mutated model here (omit for a dry run)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Directory for workflow_result.json (default from config)
        #[arg(long)]
        report_dir: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the simulation engine on a model file
    Simulate {
        /// Engine input file
        model: PathBuf,

        /// Weather file
        #[arg(short, long)]
        weather: Option<PathBuf>,

        /// Output directory for engine artifacts
        #[arg(short = 'd', long, default_value = "run")]
        output_dir: PathBuf,

        /// Engine executable (overrides config)
        #[arg(long)]
        engine: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show resolved configuration and paths
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    fn wants_json(&self) -> bool {
        match self {
            Commands::List { json }
            | Commands::Describe { json, .. }
            | Commands::Apply { json, .. }
            | Commands::Workflow { json, .. }
            | Commands::Simulate { json, .. }
            | Commands::Config { json } => *json,
        }
    }
}

fn run_command(command: Commands, layout: &Layout) -> Result<()> {
    match command {
        Commands::List { json } => cli::measure::run_list(json),
        Commands::Describe {
            measure,
            model,
            json,
        } => cli::measure::run_describe(cli::measure::DescribeArgs {
            measure,
            model,
            json,
        }),
        Commands::Apply {
            measure,
            model,
            args,
            output,
            report_dir,
            json,
        } => {
            let config = cli::config::AppConfig::load(layout)?;
            cli::apply::run(
                cli::apply::ApplyArgs {
                    measure,
                    model,
                    args,
                    output,
                    report_dir,
                    json,
                },
                &config,
            )
        }
        Commands::Workflow {
            workflow,
            model,
            output,
            report_dir,
            json,
        } => {
            let config = cli::config::AppConfig::load(layout)?;
            cli::workflow::run(
                cli::workflow::WorkflowArgs {
                    workflow,
                    model,
                    output,
                    report_dir,
                    json,
                },
                &config,
            )
        }
        Commands::Simulate {
            model,
            weather,
            output_dir,
            engine,
            json,
        } => {
            let config = cli::config::AppConfig::load(layout)?;
            cli::simulate::run(
                cli::simulate::SimulateArgs {
                    model,
                    weather,
                    output_dir,
                    engine,
                    json,
                },
                &config,
            )
        }
        Commands::Config { json } => cli::config::run(layout, json),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let json_mode = cli.command.wants_json();
    let layout = Layout::resolve(cli.config.as_deref());

    if let Err(err) = init_logging(LogConfig {
        app_name: "verdant",
        verbose: cli.verbose,
        quiet_console: json_mode,
        log_dir: layout.logs.clone(),
    }) {
        eprintln!("Warning: logging disabled: {:#}", err);
    }

    match run_command(cli.command, &layout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if json_mode {
                if cli::error::needs_json_error(&err) {
                    cli::error::print_json_error(&err);
                }
            } else {
                eprintln!("{:?}", err);
            }
            ExitCode::from(1)
        }
    }
}
