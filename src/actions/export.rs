use crate::actions::{resolve_credentials, CredentialArgs};
use crate::cloudinary::CloudinaryClient;
use crate::commands::params::{
    PARAMETER_EXPRESSION, PARAMETER_FIELD, PARAMETER_METADATA_FIELD, PARAMETER_NO_INPUT,
    PARAMETER_OUTPUT, PARAMETER_QUIET,
};
use crate::configuration::Configuration;
use crate::error::CliError;
use crate::export::{run_export, ExportSummary};
use crate::format::create_output_file;
use crate::metadata::{list_fields, select_fields, ValueLookupTable};
use crate::model::{
    ExportConfiguration, MetadataFieldDefinition, OptionalField, DEFAULT_OUTPUT_FILE_NAME,
};
use crate::prompts::{
    prompt_metadata_fields, prompt_optional_fields, prompt_output_path, prompt_text,
};
use clap::ArgMatches;
use color_print::cprintln;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// Everything the export command accepts, before prompting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportArgs {
    pub credentials: CredentialArgs,
    pub output: Option<PathBuf>,
    pub expression: Option<String>,
    pub fields: Vec<OptionalField>,
    pub metadata_fields: Vec<String>,
    pub no_input: bool,
    pub quiet: bool,
}

impl ExportArgs {
    pub fn from_matches(sub_matches: &ArgMatches) -> ExportArgs {
        ExportArgs {
            credentials: CredentialArgs::from_matches(sub_matches),
            output: sub_matches.get_one::<PathBuf>(PARAMETER_OUTPUT).cloned(),
            expression: sub_matches.get_one::<String>(PARAMETER_EXPRESSION).cloned(),
            fields: sub_matches
                .get_many::<OptionalField>(PARAMETER_FIELD)
                .map(|values| values.copied().collect())
                .unwrap_or_default(),
            metadata_fields: sub_matches
                .get_many::<String>(PARAMETER_METADATA_FIELD)
                .map(|values| {
                    values
                        .map(|v| v.trim().to_string())
                        .filter(|v| !v.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            no_input: sub_matches.get_flag(PARAMETER_NO_INPUT),
            quiet: sub_matches.get_flag(PARAMETER_QUIET),
        }
    }

    fn interactive(&self) -> bool {
        !self.no_input
    }

    /// Column groups requested on the command line. Naming a metadata field
    /// implies the metadata group.
    fn requested_fields(&self) -> Vec<OptionalField> {
        let mut fields = self.fields.clone();
        if !self.metadata_fields.is_empty() && !fields.contains(&OptionalField::Metadata) {
            fields.push(OptionalField::Metadata);
        }
        fields
    }
}

pub async fn export_assets(
    sub_matches: &ArgMatches,
    configuration: &Configuration,
) -> Result<(), CliError> {
    let args = ExportArgs::from_matches(sub_matches);
    let credentials = resolve_credentials(&args.credentials, configuration, args.interactive())?;
    let client = CloudinaryClient::from_configuration(configuration, &credentials)?;

    let output_path = match &args.output {
        Some(path) => path.clone(),
        None if args.interactive() => prompt_output_path(".", DEFAULT_OUTPUT_FILE_NAME)?,
        None => PathBuf::from(DEFAULT_OUTPUT_FILE_NAME),
    };

    let expression = match &args.expression {
        Some(expression) => expression.clone(),
        None if args.interactive() => prompt_text(
            "Search expression:",
            "Leave empty to export every asset",
        )?,
        None => String::new(),
    };

    let fields = match args.requested_fields() {
        fields if !fields.is_empty() => fields,
        _ if args.interactive() => prompt_optional_fields()?,
        _ => Vec::new(),
    };

    // An unusable output path must fail before any request is sent.
    create_output_file(&output_path)?;

    let metadata_fields = if fields.contains(&OptionalField::Metadata) {
        let available = list_fields(&client).await;
        choose_metadata_fields(available, &args)?
    } else {
        Vec::new()
    };

    let config = ExportConfiguration::builder()
        .credentials(credentials)
        .output_path(output_path)
        .search_expression(&expression)
        .optional_fields(fields)
        .metadata_fields(metadata_fields)
        .build()?;
    debug!("Export configuration: {:?}", config);

    let lookup = ValueLookupTable::from_definitions(config.metadata_fields());
    let progress = progress_indicator(args.quiet);

    let summary = match run_export(&client, &config, &lookup, &progress).await {
        Ok(summary) => {
            progress.finish_and_clear();
            summary
        }
        Err(e) => {
            progress.abandon();
            return Err(e.into());
        }
    };

    info!(
        "Export finished: {} rows in {} pages",
        summary.rows, summary.pages
    );
    if !args.quiet {
        print_summary(&summary);
    }
    Ok(())
}

fn choose_metadata_fields(
    available: Vec<MetadataFieldDefinition>,
    args: &ExportArgs,
) -> Result<Vec<MetadataFieldDefinition>, CliError> {
    if !args.metadata_fields.is_empty() {
        Ok(select_fields(&available, &args.metadata_fields))
    } else if args.interactive() {
        prompt_metadata_fields(available)
    } else {
        Ok(available)
    }
}

fn progress_indicator(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} assets exported ({msg})")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    progress.set_message("starting");
    progress.enable_steady_tick(Duration::from_millis(120));
    progress
}

fn print_summary(summary: &ExportSummary) {
    cprintln!(
        "<g>Exported</g> <b>{}</b> assets to <b>{}</b>",
        summary.rows,
        summary.output_path.display()
    );
}
