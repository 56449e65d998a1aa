// house-price - main.rs
// Loads configuration, installs logging, runs one CLI command

use anyhow::Context;
use clap::Parser;
use house_price::cli::{execute, Cli};
use std::process::ExitCode;

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.load_config().context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_max_level(config.tracing_level()?)
        .with_writer(std::io::stderr)
        .init();

    let output = execute(&cli, &config).context("command failed")?;
    print!("{output}");
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
