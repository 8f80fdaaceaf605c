//! Main entry point for the Mini LMS administration binary.

use std::process::ExitCode;

use clap::Parser;

use minilms_server::{Cli, Configuration, command, init_logging};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let configuration = match Configuration::from_cli(&cli) {
        Ok(configuration) => configuration,
        Err(e) => {
            let err = anyhow::Error::from(e);
            println!("{}", command::error_response(&err));
            return ExitCode::FAILURE;
        }
    };

    let _logging_guard = match init_logging(&configuration.logging_config()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Logging disabled: {}", e);
            None
        }
    };

    tracing::info!(app = %configuration.app_name(), command = ?cli.command, "Starting");

    match command::run(&configuration, cli.command).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            println!("{}", command::error_response(&e));
            ExitCode::FAILURE
        }
    }
}
