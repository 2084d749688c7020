use thiserror::Error;

use crate::{
    cloudinary::ApiError, configuration::ConfigurationError, exit_codes::ExitCode,
    export::ExportError, format::FormattingError, model::ModelError,
};

/// Error types that can occur during CLI command execution
#[derive(Debug, Error)]
pub enum CliError {
    /// Error when an unsupported or undefined subcommand is encountered
    #[error("Undefined or unsupported subcommand: {0}")]
    UnsupportedSubcommand(String),
    /// Error related to configuration loading or management
    #[error("Configuration error: {0}")]
    ConfigurationError(#[from] ConfigurationError),
    /// Error when a required value was neither given nor stored
    #[error("Missing required argument: {0}")]
    MissingRequiredArgument(String),
    /// Error when a value failed validation
    #[error("Invalid value: {0}")]
    InvalidValue(#[from] ModelError),
    #[error("Output error: {0}")]
    FormattingError(#[from] FormattingError),
    #[error("API error: {0}")]
    ApiError(#[from] ApiError),
    #[error("Export failed: {0}")]
    ExportError(#[from] ExportError),
    #[error("Prompt error: {0}")]
    PromptError(#[from] inquire::InquireError),
    /// The user aborted an interactive prompt
    #[error("Operation was canceled by the user")]
    Cancelled,
}

impl CliError {
    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            CliError::UnsupportedSubcommand(_) => ExitCode::UsageError,
            CliError::MissingRequiredArgument(_) => ExitCode::UsageError,
            CliError::InvalidValue(_) => ExitCode::UsageError,
            CliError::ConfigurationError(_) => ExitCode::ConfigError,
            CliError::FormattingError(e) => formatting_exit_code(e),
            CliError::ApiError(e) => api_exit_code(e),
            CliError::ExportError(ExportError::Output(e)) => formatting_exit_code(e),
            CliError::ExportError(ExportError::Search { source, .. }) => api_exit_code(source),
            CliError::PromptError(_) => ExitCode::SoftwareError,
            CliError::Cancelled => ExitCode::Success,
        }
    }
}

fn api_exit_code(error: &ApiError) -> ExitCode {
    if error.is_auth_failure() {
        ExitCode::AuthError
    } else if error.is_transport_failure() {
        ExitCode::NetworkError
    } else if matches!(error, ApiError::JsonError(_)) {
        ExitCode::DataError
    } else {
        ExitCode::ApiError
    }
}

fn formatting_exit_code(error: &FormattingError) -> ExitCode {
    match error {
        FormattingError::OutputDirectory { .. } | FormattingError::OutputFile { .. } => {
            ExitCode::CantCreate
        }
        FormattingError::ColumnMismatch { .. } | FormattingError::SinkClosed => {
            ExitCode::SoftwareError
        }
        _ => ExitCode::IoError,
    }
}
