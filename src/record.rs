//! Flattening of asset records into CSV rows.
//!
//! Columns come from a single plan derived from the export configuration, so
//! the header written up front and every row produced later always agree.

use crate::metadata::ValueLookupTable;
use crate::model::{AssetRecord, ExportConfiguration, MetadataFieldDefinition, OptionalField};
use serde_json::Value;

/// `created_at` is exported as month-day-year in UTC.
pub const CREATED_AT_FORMAT: &str = "%m-%d-%Y";

const SET_VALUE_SEPARATOR: &str = ", ";
const TAG_SEPARATOR: &str = ",";

/// One flattened asset: column/value pairs in output order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatRecord {
    entries: Vec<(String, String)>,
}

impl FlatRecord {
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.entries.push((column.into(), value.into()));
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(c, _)| c.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

enum Column<'a> {
    PublicId,
    Format,
    Version,
    CreatedAt,
    Bytes,
    Width,
    Height,
    SecureUrl,
    Folder,
    Tags,
    Metadata(&'a MetadataFieldDefinition),
}

impl<'a> Column<'a> {
    fn name(&self) -> &'a str {
        match self {
            Column::PublicId => "public_id",
            Column::Format => "format",
            Column::Version => "version",
            Column::CreatedAt => "created_at",
            Column::Bytes => "bytes",
            Column::Width => "width",
            Column::Height => "height",
            Column::SecureUrl => "secure_url",
            Column::Folder => "folder",
            Column::Tags => "tags",
            Column::Metadata(field) => {
                let field: &'a MetadataFieldDefinition = field;
                field.external_id.as_str()
            }
        }
    }

    fn value(&self, asset: &AssetRecord, lookup: &ValueLookupTable) -> String {
        match self {
            Column::PublicId => asset.public_id.clone(),
            Column::Format => asset.format.clone(),
            Column::Version => asset.version.to_string(),
            Column::CreatedAt => asset.created_at.format(CREATED_AT_FORMAT).to_string(),
            Column::Bytes => asset.bytes.to_string(),
            Column::Width => asset.width.map(|w| w.to_string()).unwrap_or_default(),
            Column::Height => asset.height.map(|h| h.to_string()).unwrap_or_default(),
            Column::SecureUrl => asset.secure_url.clone(),
            Column::Folder => asset.folder_path().unwrap_or_default().to_string(),
            Column::Tags => asset.tags.join(TAG_SEPARATOR),
            Column::Metadata(field) => {
                metadata_text(field, asset.metadata_value(&field.external_id), lookup)
            }
        }
    }
}

fn column_plan(config: &ExportConfiguration) -> Vec<Column<'_>> {
    let mut plan = vec![
        Column::PublicId,
        Column::Format,
        Column::Version,
        Column::CreatedAt,
        Column::Bytes,
        Column::Width,
        Column::Height,
        Column::SecureUrl,
    ];

    for field in config.optional_fields() {
        match field {
            OptionalField::Folder => plan.push(Column::Folder),
            OptionalField::Tags => plan.push(Column::Tags),
            OptionalField::Metadata => {
                plan.extend(config.metadata_fields().iter().map(Column::Metadata))
            }
        }
    }

    plan
}

/// Header row for an export run.
pub fn export_columns(config: &ExportConfiguration) -> Vec<String> {
    column_plan(config)
        .iter()
        .map(|column| column.name().to_string())
        .collect()
}

pub fn flatten(
    asset: &AssetRecord,
    config: &ExportConfiguration,
    lookup: &ValueLookupTable,
) -> FlatRecord {
    let mut record = FlatRecord::default();
    for column in column_plan(config) {
        record.push(column.name(), column.value(asset, lookup));
    }
    record
}

fn metadata_text(
    field: &MetadataFieldDefinition,
    raw: Option<&Value>,
    lookup: &ValueLookupTable,
) -> String {
    let Some(raw) = raw else {
        return String::new();
    };

    if !field.is_enumerated() {
        return match raw {
            Value::Array(items) => items
                .iter()
                .map(scalar_text)
                .collect::<Vec<_>>()
                .join(SET_VALUE_SEPARATOR),
            other => scalar_text(other),
        };
    }

    let label = |id: &Value| {
        lookup
            .label(&field.external_id, &scalar_text(id))
            .map(str::to_string)
    };

    match raw {
        // unmapped set members are dropped rather than left as blanks
        Value::Array(ids) => ids
            .iter()
            .filter_map(label)
            .collect::<Vec<_>>()
            .join(SET_VALUE_SEPARATOR),
        id => label(id).unwrap_or_default(),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
