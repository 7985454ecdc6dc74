use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use prompt2_core::config::{Config, ConfigError};

mod cli;
mod commands;
mod width;

use cli::{Cli, Commands};

/// Log level used until the configuration has been read.
const DEFAULT_LOG_LEVEL: &str = "warn";

fn main() -> ExitCode {
    let cli = Cli::parse();

    // The config decides the log level, so it is loaded before tracing is up
    let config = Config::load(cli.config.as_deref());
    init_tracing(
        config
            .as_ref()
            .map(Config::log_level)
            .unwrap_or(DEFAULT_LOG_LEVEL),
    );

    let result = match cli.command {
        None | Some(Commands::Render) => return commands::render(config, cli.width),
        Some(Commands::Status) => with_config(config, commands::status),
        Some(Commands::Check) => commands::check(cli.config.as_deref()),
        Some(Commands::Attribute { combo, list }) => commands::attribute(combo.as_deref(), list),
        Some(Commands::InitConfig { path, force }) => commands::init_config(path, force),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn with_config(
    config: Result<Config, ConfigError>,
    run: fn(&Config) -> commands::CommandResult,
) -> commands::CommandResult {
    run(&config?)
}

/// Log to stderr so stdout carries nothing but the prompt.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(level).unwrap_or_else(|err| {
            eprintln!("Invalid log level {level:?}: {err}");
            EnvFilter::new(DEFAULT_LOG_LEVEL)
        })
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}
