//! Handlers behind each CLI command.

pub mod config;
pub mod export;

use crate::commands::params::{PARAMETER_API_KEY, PARAMETER_API_SECRET, PARAMETER_CLOUD_NAME};
use crate::configuration::Configuration;
use crate::error::CliError;
use crate::model::Credentials;
use crate::prompts::{prompt_required, prompt_secret};
use clap::ArgMatches;
use tracing::trace;

/// Credential values as given on the command line (or through the
/// environment).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialArgs {
    pub cloud_name: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
}

impl CredentialArgs {
    pub fn from_matches(sub_matches: &ArgMatches) -> CredentialArgs {
        CredentialArgs {
            cloud_name: sub_matches.get_one::<String>(PARAMETER_CLOUD_NAME).cloned(),
            api_key: sub_matches.get_one::<String>(PARAMETER_API_KEY).cloned(),
            api_secret: sub_matches.get_one::<String>(PARAMETER_API_SECRET).cloned(),
        }
    }
}

fn given(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Resolve credentials from the arguments, then the stored configuration,
/// then (when allowed) the user.
pub fn resolve_credentials(
    args: &CredentialArgs,
    stored: &Configuration,
    interactive: bool,
) -> Result<Credentials, CliError> {
    let cloud_name = resolve_value(
        given(&args.cloud_name),
        stored.cloud_name(),
        PARAMETER_CLOUD_NAME,
        false,
        interactive,
    )?;
    let api_key = resolve_value(
        given(&args.api_key),
        stored.api_key(),
        PARAMETER_API_KEY,
        false,
        interactive,
    )?;
    let api_secret = resolve_value(
        given(&args.api_secret),
        stored.api_secret(),
        PARAMETER_API_SECRET,
        true,
        interactive,
    )?;

    Ok(Credentials::new(&cloud_name, &api_key, &api_secret)?)
}

fn resolve_value(
    value: Option<&str>,
    stored: Option<&str>,
    name: &str,
    secret: bool,
    interactive: bool,
) -> Result<String, CliError> {
    if let Some(value) = value.or(stored.filter(|v| !v.trim().is_empty())) {
        return Ok(value.to_string());
    }
    if !interactive {
        return Err(CliError::MissingRequiredArgument(format!(
            "{} (pass --{} or run 'cldexport config set')",
            name.replace('-', " "),
            name
        )));
    }

    trace!("Prompting for {}", name);
    let message = format!("{}:", capitalize(&name.replace('-', " ")));
    if secret {
        prompt_secret(&message)
    } else {
        prompt_required(&message)
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
