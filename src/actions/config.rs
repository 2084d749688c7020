use crate::actions::{resolve_credentials, CredentialArgs};
use crate::commands::params::{PARAMETER_API_URL, PARAMETER_TIMEOUT};
use crate::configuration::Configuration;
use crate::error::CliError;
use clap::ArgMatches;
use color_print::cprintln;
use url::Url;

/// Store credentials (and optional connection settings) in the default
/// configuration file.
pub fn set_configuration(
    sub_matches: &ArgMatches,
    mut configuration: Configuration,
) -> Result<(), CliError> {
    // Stored values fill in whatever was not passed, so only the missing ones
    // are prompted for.
    let args = CredentialArgs::from_matches(sub_matches);
    let credentials = resolve_credentials(&args, &configuration, true)?;
    configuration.set_credentials(&credentials);

    if let Some(url) = sub_matches.get_one::<Url>(PARAMETER_API_URL) {
        configuration.set_api_url(Some(url.clone()));
    }
    if let Some(timeout) = sub_matches.get_one::<u64>(PARAMETER_TIMEOUT) {
        configuration.set_timeout_secs(Some(*timeout));
    }

    configuration.save_to_default()?;
    let path = Configuration::get_default_configuration_file_path()?;

    cprintln!(
        "<g>Saved</g> credentials for cloud <b>{}</b> to {}",
        credentials.cloud_name(),
        path.display()
    );
    Ok(())
}

/// Print the stored configuration with the API secret masked.
pub fn print_configuration(configuration: &Configuration) -> Result<(), CliError> {
    print!("{}", configuration.redacted().to_yaml()?);
    Ok(())
}

pub fn print_configuration_path() -> Result<(), CliError> {
    let path = Configuration::get_default_configuration_file_path()?;
    println!("{}", path.display());
    Ok(())
}
