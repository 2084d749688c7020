//! CLI command definitions and argument parsing.
//!
//! This module defines all the CLI commands and their arguments using the clap crate.
//! The command tree is split per top-level command.

use clap::{ArgMatches, Command};

pub mod config;
pub mod export;
pub mod params;

pub use params::{
    COMMAND_CONFIG, COMMAND_EXPORT, COMMAND_GET, COMMAND_PATH, COMMAND_SET, PARAMETER_VERBOSE,
};

/// Build the complete command tree without parsing anything.
pub fn build_cli() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .propagate_version(true)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(params::verbose_parameter())
        .subcommand(config::config_command())
        .subcommand(export::export_command())
}

/// Parse the process arguments.
///
/// # Returns
///
/// An `ArgMatches` instance containing the parsed command-line arguments.
pub fn create_cli_commands() -> ArgMatches {
    build_cli().get_matches()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::params::{
        PARAMETER_EXPRESSION, PARAMETER_FIELD, PARAMETER_METADATA_FIELD, PARAMETER_NO_INPUT,
    };
    use crate::model::OptionalField;

    #[test]
    fn test_command_tree_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_export_arguments() {
        let matches = build_cli()
            .try_get_matches_from([
                "cldexport",
                "export",
                "--expression",
                "resource_type:image",
                "--field",
                "tags,folder",
                "--field",
                "METADATA",
                "--metadata-field",
                "color",
                "--metadata-field",
                "usage,region",
                "--no-input",
            ])
            .unwrap();

        let (name, sub_matches) = matches.subcommand().unwrap();
        assert_eq!(name, COMMAND_EXPORT);
        assert_eq!(
            sub_matches.get_one::<String>(PARAMETER_EXPRESSION).unwrap(),
            "resource_type:image"
        );

        let fields: Vec<OptionalField> = sub_matches
            .get_many::<OptionalField>(PARAMETER_FIELD)
            .unwrap()
            .copied()
            .collect();
        assert_eq!(
            fields,
            vec![OptionalField::Tags, OptionalField::Folder, OptionalField::Metadata]
        );

        let metadata: Vec<&String> = sub_matches
            .get_many::<String>(PARAMETER_METADATA_FIELD)
            .unwrap()
            .collect();
        assert_eq!(metadata, vec!["color", "usage", "region"]);
        assert!(sub_matches.get_flag(PARAMETER_NO_INPUT));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let result =
            build_cli().try_get_matches_from(["cldexport", "export", "--field", "width"]);
        assert!(result.is_err());
    }
}
