//! Export command definition.

use crate::commands::params::{
    api_key_parameter, api_secret_parameter, cloud_name_parameter, expression_parameter,
    field_parameter, metadata_field_parameter, no_input_parameter, output_file_parameter,
    quiet_parameter, COMMAND_EXPORT,
};
use clap::Command;

pub fn export_command() -> Command {
    Command::new(COMMAND_EXPORT)
        .about("Export asset details from a Cloudinary account to a CSV file")
        .long_about(
            "Export asset details from a Cloudinary account to a CSV file.\n\n\
             Every asset matching the search expression is written as one row. \
             Values not given as options are taken from the stored configuration \
             or asked for interactively, unless --no-input is set.",
        )
        .arg(cloud_name_parameter())
        .arg(api_key_parameter())
        .arg(api_secret_parameter())
        .arg(output_file_parameter())
        .arg(expression_parameter())
        .arg(field_parameter())
        .arg(metadata_field_parameter())
        .arg(no_input_parameter())
        .arg(quiet_parameter())
}
