use crate::actions::config::{print_configuration, print_configuration_path, set_configuration};
use crate::actions::export::export_assets;
use crate::commands::{COMMAND_CONFIG, COMMAND_EXPORT, COMMAND_GET, COMMAND_PATH, COMMAND_SET};
use crate::configuration::Configuration;
use crate::error::CliError;
use clap::ArgMatches;
use tracing::trace;

fn extract_subcommand_name(sub_matches: &ArgMatches) -> String {
    let message = match sub_matches.subcommand() {
        Some(m) => m.0,
        None => "unknown",
    };

    message.to_string()
}

/// Dispatch parsed arguments to the matching action.
pub async fn execute_command(
    configuration: Configuration,
    commands: ArgMatches,
) -> Result<(), CliError> {
    match commands.subcommand() {
        Some((COMMAND_CONFIG, sub_matches)) => match sub_matches.subcommand() {
            Some((COMMAND_GET, sub_matches)) => match sub_matches.subcommand() {
                Some((COMMAND_PATH, _)) => print_configuration_path(),
                None => print_configuration(&configuration),
                Some(_) => Err(CliError::UnsupportedSubcommand(extract_subcommand_name(
                    sub_matches,
                ))),
            },
            Some((COMMAND_SET, sub_matches)) => set_configuration(sub_matches, configuration),
            _ => Err(CliError::UnsupportedSubcommand(extract_subcommand_name(
                sub_matches,
            ))),
        },
        Some((COMMAND_EXPORT, sub_matches)) => {
            trace!("Executing \"export\" command...");
            export_assets(sub_matches, &configuration).await
        }
        _ => Err(CliError::UnsupportedSubcommand(extract_subcommand_name(
            &commands,
        ))),
    }
}
