//! Interactive prompts used to fill in values that were not given on the
//! command line.

use crate::error::CliError;
use crate::model::{MetadataFieldDefinition, OptionalField};
use inquire::validator::Validation;
use inquire::{InquireError, MultiSelect, Password, PasswordDisplayMode, Text};
use std::path::PathBuf;
use strum::IntoEnumIterator;
use tracing::trace;

/// Escape and Ctrl+C both end the run quietly.
pub fn map_prompt_error(error: InquireError) -> CliError {
    match error {
        InquireError::OperationCanceled | InquireError::OperationInterrupted => {
            CliError::Cancelled
        }
        other => CliError::PromptError(other),
    }
}

fn not_blank(input: &str) -> Result<Validation, inquire::CustomUserError> {
    if input.trim().is_empty() {
        Ok(Validation::Invalid("A value is required".into()))
    } else {
        Ok(Validation::Valid)
    }
}

pub fn prompt_required(message: &str) -> Result<String, CliError> {
    Text::new(message)
        .with_validator(not_blank)
        .prompt()
        .map(|value| value.trim().to_string())
        .map_err(map_prompt_error)
}

pub fn prompt_secret(message: &str) -> Result<String, CliError> {
    Password::new(message)
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_validator(not_blank)
        .prompt()
        .map_err(map_prompt_error)
}

/// Free-form text; an empty answer is allowed.
pub fn prompt_text(message: &str, help: &str) -> Result<String, CliError> {
    Text::new(message)
        .with_help_message(help)
        .prompt()
        .map(|value| value.trim().to_string())
        .map_err(map_prompt_error)
}

/// Ask for the output directory and file name separately. Blank answers fall
/// back to the defaults.
pub fn prompt_output_path(default_dir: &str, default_file: &str) -> Result<PathBuf, CliError> {
    let directory = Text::new("Output directory:")
        .with_default(default_dir)
        .prompt()
        .map_err(map_prompt_error)?;
    let file_name = Text::new("Output file name:")
        .with_default(default_file)
        .prompt()
        .map_err(map_prompt_error)?;

    let directory = match directory.trim() {
        "" => default_dir,
        other => other,
    };
    let file_name = match file_name.trim() {
        "" => default_file,
        other => other,
    };

    let path = PathBuf::from(directory).join(file_name);
    trace!("Output path chosen: {}", path.display());
    Ok(path)
}

pub fn prompt_optional_fields() -> Result<Vec<OptionalField>, CliError> {
    MultiSelect::new(
        "Select additional fields to export:",
        OptionalField::iter().collect(),
    )
    .with_help_message("Space to toggle, Enter to confirm. Core fields are always exported.")
    .prompt()
    .map_err(map_prompt_error)
}

pub fn prompt_metadata_fields(
    available: Vec<MetadataFieldDefinition>,
) -> Result<Vec<MetadataFieldDefinition>, CliError> {
    if available.is_empty() {
        return Ok(available);
    }

    MultiSelect::new("Select metadata fields to export:", available)
        .with_page_size(15)
        .prompt()
        .map_err(map_prompt_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_is_not_an_error() {
        assert!(matches!(
            map_prompt_error(InquireError::OperationCanceled),
            CliError::Cancelled
        ));
        assert!(matches!(
            map_prompt_error(InquireError::OperationInterrupted),
            CliError::Cancelled
        ));
        assert!(matches!(
            map_prompt_error(InquireError::NotTTY),
            CliError::PromptError(_)
        ));
    }

    #[test]
    fn test_blank_input_is_rejected() {
        assert!(matches!(not_blank("  "), Ok(Validation::Invalid(_))));
        assert!(matches!(not_blank("demo"), Ok(Validation::Valid)));
    }
}
