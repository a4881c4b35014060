use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod insert;
mod inspect;
mod sample;

use cli::{Cli, Command};
use config::Config;

fn main() -> ExitCode {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err:#}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config);

    match run(cli, &config) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            tracing::error!("{err:#}");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Run one command; `Ok(false)` means it finished but reported failure
fn run(cli: Cli, config: &Config) -> anyhow::Result<bool> {
    let mut stdout = io::stdout().lock();
    match cli.command {
        Command::Insert(args) => {
            let outcome = insert::run(&args, config)?;
            insert::print_outcome(&outcome, args.json, &mut stdout)?;
            Ok(outcome.success)
        }
        Command::Sample { output } => {
            sample::write_sample(&output)?;
            writeln!(stdout, "sample template written to {}", output.display())?;
            Ok(true)
        }
        Command::Inspect { path, range, sheet } => {
            inspect::run(&path, range.as_deref(), sheet.as_deref(), &mut stdout)?;
            Ok(true)
        }
    }
}
