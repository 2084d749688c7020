//! Shared command parameters for all CLI commands.
//!
//! This module defines common parameters that are used across multiple command modules.
//! It provides a centralized place to define parameter names and common argument configurations.

use crate::model::OptionalField;
use clap::{Arg, ArgAction};
use std::path::PathBuf;
use std::str::FromStr;
use url::Url;

// Top-level commands
pub const COMMAND_CONFIG: &str = "config";
pub const COMMAND_EXPORT: &str = "export";

// Config commands
pub const COMMAND_GET: &str = "get";
pub const COMMAND_SET: &str = "set";
pub const COMMAND_PATH: &str = "path";

// Parameter names
pub const PARAMETER_VERBOSE: &str = "verbose";
pub const PARAMETER_CLOUD_NAME: &str = "cloud-name";
pub const PARAMETER_API_KEY: &str = "api-key";
pub const PARAMETER_API_SECRET: &str = "api-secret";
pub const PARAMETER_API_URL: &str = "api-url";
pub const PARAMETER_TIMEOUT: &str = "timeout";
pub const PARAMETER_OUTPUT: &str = "output";
pub const PARAMETER_EXPRESSION: &str = "expression";
pub const PARAMETER_FIELD: &str = "field";
pub const PARAMETER_METADATA_FIELD: &str = "metadata-field";
pub const PARAMETER_NO_INPUT: &str = "no-input";
pub const PARAMETER_QUIET: &str = "quiet";

// Environment variables
pub const ENV_CLOUD_NAME: &str = "CLOUDINARY_CLOUD_NAME";
pub const ENV_API_KEY: &str = "CLOUDINARY_API_KEY";
pub const ENV_API_SECRET: &str = "CLOUDINARY_API_SECRET";

/// Create the global verbose flag.
pub fn verbose_parameter() -> Arg {
    Arg::new(PARAMETER_VERBOSE)
        .short('v')
        .long(PARAMETER_VERBOSE)
        .action(ArgAction::SetTrue)
        .global(true)
        .help("Enable verbose output for debugging")
}

pub fn cloud_name_parameter() -> Arg {
    Arg::new(PARAMETER_CLOUD_NAME)
        .long(PARAMETER_CLOUD_NAME)
        .num_args(1)
        .required(false)
        .env(ENV_CLOUD_NAME)
        .help("Cloudinary cloud name")
}

pub fn api_key_parameter() -> Arg {
    Arg::new(PARAMETER_API_KEY)
        .long(PARAMETER_API_KEY)
        .num_args(1)
        .required(false)
        .env(ENV_API_KEY)
        .help("Cloudinary API key")
}

pub fn api_secret_parameter() -> Arg {
    Arg::new(PARAMETER_API_SECRET)
        .long(PARAMETER_API_SECRET)
        .num_args(1)
        .required(false)
        .env(ENV_API_SECRET)
        .hide_env_values(true)
        .help("Cloudinary API secret")
}

/// Create the API URL parameter.
pub fn api_url_parameter() -> Arg {
    Arg::new(PARAMETER_API_URL)
        .long(PARAMETER_API_URL)
        .num_args(1)
        .required(false)
        .value_parser(clap::value_parser!(Url))
        .help("Admin API base URL (e.g., https://api.cloudinary.com/v1_1)")
}

pub fn timeout_parameter() -> Arg {
    Arg::new(PARAMETER_TIMEOUT)
        .long(PARAMETER_TIMEOUT)
        .num_args(1)
        .required(false)
        .value_parser(clap::value_parser!(u64))
        .help("Request timeout in seconds")
}

/// Create the output file parameter.
pub fn output_file_parameter() -> Arg {
    Arg::new(PARAMETER_OUTPUT)
        .short('o')
        .long(PARAMETER_OUTPUT)
        .num_args(1)
        .required(false)
        .help("Output CSV file path (default: ./assets.csv)")
        .value_parser(clap::value_parser!(PathBuf))
}

pub fn expression_parameter() -> Arg {
    Arg::new(PARAMETER_EXPRESSION)
        .short('e')
        .long(PARAMETER_EXPRESSION)
        .num_args(1)
        .required(false)
        .help("Search expression (e.g., \"resource_type:image AND tags=sale\"); empty matches all assets")
}

/// Optional column groups. Accepts repeated flags or a comma-separated list.
pub fn field_parameter() -> Arg {
    Arg::new(PARAMETER_FIELD)
        .long(PARAMETER_FIELD)
        .action(ArgAction::Append)
        .value_delimiter(',')
        .required(false)
        .value_parser(|value: &str| {
            OptionalField::from_str(value.trim())
                .map_err(|_| format!("expected one of: folder, tags, metadata (got '{}')", value))
        })
        .help("Additional fields to export: folder, tags, metadata")
}

pub fn metadata_field_parameter() -> Arg {
    Arg::new(PARAMETER_METADATA_FIELD)
        .long(PARAMETER_METADATA_FIELD)
        .action(ArgAction::Append)
        .value_delimiter(',')
        .required(false)
        .help("External id of a metadata field to export (implies --field metadata)")
}

pub fn no_input_parameter() -> Arg {
    Arg::new(PARAMETER_NO_INPUT)
        .long(PARAMETER_NO_INPUT)
        .action(ArgAction::SetTrue)
        .required(false)
        .help("Never prompt; fail if a required value is missing")
}

pub fn quiet_parameter() -> Arg {
    Arg::new(PARAMETER_QUIET)
        .short('q')
        .long(PARAMETER_QUIET)
        .action(ArgAction::SetTrue)
        .required(false)
        .help("Hide the progress indicator and the summary")
}
