use cldexport::{
    cli::execute_command,
    commands::{create_cli_commands, PARAMETER_VERBOSE},
    configuration::Configuration,
    error::CliError,
    error_utils,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Main entry point for the program
#[tokio::main]
async fn main() {
    let commands = create_cli_commands();

    // Initialize the logging subsystem
    let filter = if commands.get_flag(PARAMETER_VERBOSE) {
        EnvFilter::new("cldexport=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match Configuration::load_default() {
        Ok(configuration) => execute_command(configuration, commands).await,
        Err(e) => Err(CliError::from(e)),
    };

    match result {
        Ok(()) => {}
        Err(CliError::Cancelled) => {
            eprintln!("Operation was canceled by the user. Exiting.");
        }
        Err(e) => {
            error_utils::report_error_with_user_friendly_message(&e);
            let exit_code = e.exit_code();
            debug!("Exiting with {} ({})", exit_code.code(), exit_code.message());
            ::std::process::exit(exit_code.code());
        }
    }
}
