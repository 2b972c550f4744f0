mod runner;
mod script;


use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing::{error, info, Level};

use tickgate_core::config::{ConfigError, SessionConfig};

use crate::runner::Runner;
use crate::script::{Script, ScriptError};

#[derive(Parser)]
#[command(
    name = "tickgate",
    about = "Replay coordination scenarios against the tickgate core",
    version
)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON scenario and print the resulting trace
    Replay {
        /// Scenario file; reads stdin when omitted
        script: Option<PathBuf>,

        /// Session config overriding the one embedded in the scenario
        #[arg(long, env = "TICKGATE_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Parse and validate a session config
    CheckConfig {
        path: PathBuf,
    },

    /// Print version information
    Version,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error("{path}: {source}")]
    Config {
        path: String,
        #[source]
        source: ConfigError,
    },
    #[error("failed to write trace: {0}")]
    Output(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "tickgate failed");
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Replay { script, config } => {
            let input = match &script {
                Some(path) => read_file(path)?,
                None => {
                    eprintln!("Reading scenario from stdin...");
                    let mut input = String::new();
                    std::io::stdin()
                        .read_to_string(&mut input)
                        .map_err(|source| ScriptError::Read {
                            path: "<stdin>".to_string(),
                            source,
                        })?;
                    input
                }
            };

            let scenario = Script::from_json(&input)?;
            let config_override = config.as_deref().map(load_config).transpose()?;

            let trace = Runner::replay(&scenario, config_override)?;
            info!(
                session_id = %trace.session_id,
                ticks = trace.ticks,
                events = trace.events.len(),
                "scenario replayed"
            );
            println!("{}", serde_json::to_string_pretty(&trace)?);
        }
        Commands::CheckConfig { path } => {
            let config = load_config(&path)?;
            println!(
                "{}: ok ({} hold rule(s), default ttl {})",
                path.display(),
                config.hold.len(),
                config.default_ttl
            );
        }
        Commands::Version => {
            println!("tickgate {}", env!("CARGO_PKG_VERSION"));
            println!("Tick-driven arbitration and transit buffering core");
        }
    }

    Ok(())
}

fn read_file(path: &Path) -> Result<String, ScriptError> {
    std::fs::read_to_string(path).map_err(|source| ScriptError::Read {
        path: path.display().to_string(),
        source,
    })
}

fn load_config(path: &Path) -> Result<SessionConfig, CliError> {
    let input = read_file(path)?;
    SessionConfig::from_json(&input).map_err(|source| CliError::Config {
        path: path.display().to_string(),
        source,
    })
}
