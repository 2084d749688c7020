//! Configuration command definitions.
//!
//! This module defines CLI commands related to configuration management.

use crate::commands::params::{
    api_key_parameter, api_secret_parameter, api_url_parameter, cloud_name_parameter,
    timeout_parameter, COMMAND_CONFIG, COMMAND_GET, COMMAND_PATH, COMMAND_SET,
};
use clap::Command;

/// Create the config command with all its subcommands.
pub fn config_command() -> Command {
    Command::new(COMMAND_CONFIG)
        .about("Configuration management")
        .subcommand_required(true)
        .subcommand(
            Command::new(COMMAND_GET)
                .about("Show the stored configuration (the API secret is masked)")
                .subcommand(Command::new(COMMAND_PATH).about("Show configuration file path")),
        )
        .subcommand(
            Command::new(COMMAND_SET)
                .about("Store Cloudinary credentials, prompting for any that are not given")
                .arg(cloud_name_parameter())
                .arg(api_key_parameter())
                .arg(api_secret_parameter())
                .arg(api_url_parameter())
                .arg(timeout_parameter()),
        )
}
