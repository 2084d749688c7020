//! Data models for Cloudinary entities.
//!
//! This module holds the wire types exchanged with the Cloudinary Admin API
//! (assets, search pages, metadata field definitions) together with the
//! run-scoped values the exporter is configured with.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use thiserror::Error;

/// Maximum page size accepted by the search endpoint.
pub const PAGE_SIZE: u32 = 500;

/// Prefix Cloudinary puts on custom fields that were soft-deleted.
pub const DELETED_FIELD_PREFIX: &str = "deleted--";

pub const DEFAULT_OUTPUT_FILE_NAME: &str = "assets.csv";

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("missing property value {name:?}")]
    MissingPropertyValue { name: String },
}

/// Treats an explicit JSON `null` the same way as a missing property.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One asset as returned by the search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub public_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub format: String,
    #[serde(default)]
    pub version: u64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub bytes: u64,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub secure_url: String,
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default)]
    pub asset_folder: Option<String>,
    #[serde(default)]
    pub resource_type: Option<String>,
    #[serde(default, rename = "type")]
    pub delivery_type: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: HashMap<String, Value>,
}

impl AssetRecord {
    /// The folder the asset lives in.
    ///
    /// Accounts in fixed folder mode report `folder`, accounts in dynamic
    /// folder mode report `asset_folder`. Empty values count as missing.
    pub fn folder_path(&self) -> Option<&str> {
        self.folder
            .as_deref()
            .filter(|f| !f.is_empty())
            .or_else(|| self.asset_folder.as_deref().filter(|f| !f.is_empty()))
    }

    /// Raw metadata value for a field, ignoring soft-deleted fields.
    pub fn metadata_value(&self, external_id: &str) -> Option<&Value> {
        if external_id.starts_with(DELETED_FIELD_PREFIX) {
            return None;
        }
        self.metadata.get(external_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Body of a `POST /resources/search` request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub expression: String,
    pub sort_by: Vec<BTreeMap<String, SortDirection>>,
    pub max_results: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub with_field: Vec<String>,
}

impl SearchRequest {
    /// A full-size page sorted by creation time, newest first.
    pub fn new(expression: &str) -> SearchRequest {
        let mut sort = BTreeMap::new();
        sort.insert("created_at".to_string(), SortDirection::Desc);

        SearchRequest {
            expression: expression.trim().to_string(),
            sort_by: vec![sort],
            max_results: PAGE_SIZE,
            next_cursor: None,
            with_field: Vec::new(),
        }
    }

    pub fn with_cursor(mut self, cursor: Option<String>) -> SearchRequest {
        self.next_cursor = cursor;
        self
    }

    pub fn with_fields(mut self, fields: Vec<String>) -> SearchRequest {
        self.with_field = fields;
        self
    }
}

/// Informational rate-limit counters reported with each API response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimit {
    pub limit: Option<u64>,
    pub remaining: Option<u64>,
    pub reset: Option<String>,
}

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub resources: Vec<AssetRecord>,
    #[serde(skip)]
    pub rate_limit: Option<RateLimit>,
}

impl SearchResponse {
    /// Continuation cursor, or `None` on the terminal page.
    pub fn cursor(&self) -> Option<&str> {
        self.next_cursor.as_deref().filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataFieldType {
    String,
    Integer,
    Date,
    Enum,
    Set,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasourceValue {
    pub external_id: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Datasource {
    #[serde(default)]
    pub values: Vec<DatasourceValue>,
}

/// Schema entry of a custom metadata field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataFieldDefinition {
    pub external_id: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: MetadataFieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datasource: Option<Datasource>,
}

impl MetadataFieldDefinition {
    pub fn new(external_id: &str, label: &str, field_type: MetadataFieldType) -> Self {
        Self {
            external_id: external_id.to_string(),
            label: label.to_string(),
            field_type,
            datasource: None,
        }
    }

    /// Attaches a datasource built from `(external_id, value)` pairs.
    pub fn with_datasource(mut self, values: &[(&str, &str)]) -> Self {
        self.datasource = Some(Datasource {
            values: values
                .iter()
                .map(|(external_id, value)| DatasourceValue {
                    external_id: external_id.to_string(),
                    value: value.to_string(),
                    state: None,
                })
                .collect(),
        });
        self
    }

    /// Enum and set fields store datasource ids instead of display values.
    pub fn is_enumerated(&self) -> bool {
        matches!(
            self.field_type,
            MetadataFieldType::Enum | MetadataFieldType::Set
        )
    }

    pub fn is_deleted(&self) -> bool {
        self.external_id.starts_with(DELETED_FIELD_PREFIX)
    }
}

impl fmt::Display for MetadataFieldDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.label.is_empty() {
            write!(f, "{}", self.external_id)
        } else {
            write!(f, "{} ({})", self.label, self.external_id)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataFieldListResponse {
    #[serde(default)]
    pub metadata_fields: Vec<MetadataFieldDefinition>,
}

/// Columns that are only exported on request.
///
/// The declaration order is the column order in the output file.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OptionalField {
    Folder,
    Tags,
    Metadata,
}

/// Account credentials for the Admin API.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

impl Credentials {
    pub fn new(cloud_name: &str, api_key: &str, api_secret: &str) -> Result<Credentials, ModelError> {
        for (name, value) in [
            ("cloud_name", cloud_name),
            ("api_key", api_key),
            ("api_secret", api_secret),
        ] {
            if value.trim().is_empty() {
                return Err(ModelError::MissingPropertyValue {
                    name: name.to_string(),
                });
            }
        }

        Ok(Credentials {
            cloud_name: cloud_name.trim().to_string(),
            api_key: api_key.trim().to_string(),
            api_secret: api_secret.trim().to_string(),
        })
    }

    pub fn cloud_name(&self) -> &str {
        &self.cloud_name
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn api_secret(&self) -> &str {
        &self.api_secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"********")
            .finish()
    }
}

/// Everything one export run needs, resolved before the first request.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfiguration {
    credentials: Credentials,
    output_path: PathBuf,
    search_expression: String,
    optional_fields: BTreeSet<OptionalField>,
    metadata_fields: Vec<MetadataFieldDefinition>,
}

impl ExportConfiguration {
    pub fn builder() -> ExportConfigurationBuilder {
        ExportConfigurationBuilder::new()
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn search_expression(&self) -> &str {
        &self.search_expression
    }

    pub fn includes(&self, field: OptionalField) -> bool {
        self.optional_fields.contains(&field)
    }

    pub fn optional_fields(&self) -> impl Iterator<Item = OptionalField> + '_ {
        self.optional_fields.iter().copied()
    }

    /// Metadata fields to export, in column order. Empty unless
    /// [`OptionalField::Metadata`] is selected.
    pub fn metadata_fields(&self) -> &[MetadataFieldDefinition] {
        if self.includes(OptionalField::Metadata) {
            &self.metadata_fields
        } else {
            &[]
        }
    }

    /// Extra fields the search endpoint has to be asked for explicitly.
    pub fn search_fields(&self) -> Vec<String> {
        self.optional_fields
            .iter()
            .filter(|f| matches!(f, OptionalField::Tags | OptionalField::Metadata))
            .map(|f| f.to_string())
            .collect()
    }
}

pub struct ExportConfigurationBuilder {
    credentials: Option<Credentials>,
    output_path: Option<PathBuf>,
    search_expression: String,
    optional_fields: BTreeSet<OptionalField>,
    metadata_fields: Vec<MetadataFieldDefinition>,
}

impl ExportConfigurationBuilder {
    fn new() -> ExportConfigurationBuilder {
        ExportConfigurationBuilder {
            credentials: None,
            output_path: None,
            search_expression: String::new(),
            optional_fields: BTreeSet::new(),
            metadata_fields: Vec::new(),
        }
    }

    pub fn credentials(&mut self, credentials: Credentials) -> &mut ExportConfigurationBuilder {
        self.credentials = Some(credentials);
        self
    }

    pub fn output_path(&mut self, path: PathBuf) -> &mut ExportConfigurationBuilder {
        self.output_path = Some(path);
        self
    }

    pub fn search_expression(&mut self, expression: &str) -> &mut ExportConfigurationBuilder {
        self.search_expression = expression.trim().to_string();
        self
    }

    pub fn optional_field(&mut self, field: OptionalField) -> &mut ExportConfigurationBuilder {
        self.optional_fields.insert(field);
        self
    }

    pub fn optional_fields<I>(&mut self, fields: I) -> &mut ExportConfigurationBuilder
    where
        I: IntoIterator<Item = OptionalField>,
    {
        self.optional_fields.extend(fields);
        self
    }

    pub fn metadata_fields(
        &mut self,
        fields: Vec<MetadataFieldDefinition>,
    ) -> &mut ExportConfigurationBuilder {
        self.metadata_fields = fields;
        self
    }

    pub fn build(&self) -> Result<ExportConfiguration, ModelError> {
        let credentials = match &self.credentials {
            Some(credentials) => credentials.clone(),
            None => {
                return Err(ModelError::MissingPropertyValue {
                    name: "credentials".to_string(),
                })
            }
        };

        let output_path = self
            .output_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE_NAME));

        Ok(ExportConfiguration {
            credentials,
            output_path,
            search_expression: self.search_expression.clone(),
            optional_fields: self.optional_fields.clone(),
            metadata_fields: self
                .metadata_fields
                .iter()
                .filter(|f| !f.is_deleted())
                .cloned()
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn credentials() -> Credentials {
        Credentials::new("demo", "key", "secret").unwrap()
    }

    #[test]
    fn test_asset_record_tolerates_missing_optional_fields() {
        let asset: AssetRecord = serde_json::from_value(json!({
            "public_id": "docs/readme",
            "format": null,
            "version": 1700000000,
            "resource_type": "raw",
            "type": "upload",
            "created_at": "2023-11-14T22:13:20Z",
            "bytes": 1024,
            "secure_url": "https://res.cloudinary.com/demo/raw/upload/v1700000000/docs/readme",
            "tags": null
        }))
        .unwrap();

        assert_eq!(asset.format, "");
        assert!(asset.width.is_none());
        assert!(asset.tags.is_empty());
        assert!(asset.metadata.is_empty());
        assert_eq!(asset.delivery_type.as_deref(), Some("upload"));
        assert!(asset.folder_path().is_none());
    }

    #[test]
    fn test_folder_path_prefers_fixed_folder() {
        let mut asset: AssetRecord = serde_json::from_value(json!({
            "public_id": "a",
            "created_at": "2023-11-14T22:13:20Z",
            "folder": "",
            "asset_folder": "campaigns/2023"
        }))
        .unwrap();
        assert_eq!(asset.folder_path(), Some("campaigns/2023"));

        asset.folder = Some("legacy".to_string());
        assert_eq!(asset.folder_path(), Some("legacy"));
    }

    #[test]
    fn test_deleted_metadata_is_hidden() {
        let asset: AssetRecord = serde_json::from_value(json!({
            "public_id": "a",
            "created_at": "2023-11-14T22:13:20Z",
            "metadata": {
                "color": "red_id",
                "deleted--color": "blue_id"
            }
        }))
        .unwrap();

        assert!(asset.metadata_value("deleted--color").is_none());
        assert_eq!(asset.metadata_value("color"), Some(&json!("red_id")));
    }

    #[test]
    fn test_search_request_serialization() {
        let request = SearchRequest::new("  ")
            .with_fields(vec!["tags".to_string()])
            .with_cursor(Some("abc".to_string()));
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(
            body,
            json!({
                "sort_by": [{"created_at": "desc"}],
                "max_results": 500,
                "next_cursor": "abc",
                "with_field": ["tags"]
            })
        );

        let body = serde_json::to_value(SearchRequest::new("resource_type:image")).unwrap();
        assert_eq!(body["expression"], "resource_type:image");
        assert!(body.get("next_cursor").is_none());
        assert!(body.get("with_field").is_none());
    }

    #[test]
    fn test_empty_cursor_is_terminal() {
        let page: SearchResponse =
            serde_json::from_value(json!({"total_count": 0, "next_cursor": "", "resources": []}))
                .unwrap();
        assert!(page.cursor().is_none());

        let page: SearchResponse =
            serde_json::from_value(json!({"next_cursor": "xyz", "resources": []})).unwrap();
        assert_eq!(page.cursor(), Some("xyz"));
    }

    #[test]
    fn test_metadata_field_definition_deserialization() {
        let list: MetadataFieldListResponse = serde_json::from_value(json!({
            "metadata_fields": [
                {
                    "type": "set",
                    "external_id": "colors",
                    "label": "Colors",
                    "mandatory": false,
                    "datasource": {"values": [
                        {"external_id": "c1", "value": "Red", "state": "active"},
                        {"external_id": "c2", "value": "Green"}
                    ]}
                },
                {"type": "string", "external_id": "caption", "label": "Caption"},
                {"type": "boolean", "external_id": "odd", "label": "Odd"}
            ]
        }))
        .unwrap();

        let colors = &list.metadata_fields[0];
        assert!(colors.is_enumerated());
        assert_eq!(colors.datasource.as_ref().unwrap().values.len(), 2);
        assert_eq!(colors.to_string(), "Colors (colors)");
        assert!(!list.metadata_fields[1].is_enumerated());
        assert_eq!(list.metadata_fields[2].field_type, MetadataFieldType::Other);
    }

    #[test]
    fn test_optional_field_parsing_and_order() {
        assert_eq!(OptionalField::from_str("TAGS").unwrap(), OptionalField::Tags);
        assert!(OptionalField::from_str("width").is_err());
        assert!(OptionalField::Folder < OptionalField::Tags);
        assert!(OptionalField::Tags < OptionalField::Metadata);
    }

    #[test]
    fn test_credentials_require_every_value() {
        assert!(Credentials::new("demo", " ", "secret").is_err());
        let credentials = Credentials::new(" demo ", "key", "secret").unwrap();
        assert_eq!(credentials.cloud_name(), "demo");
        let debug = format!("{:?}", credentials);
        assert!(debug.contains("********"));
        assert!(!debug.contains("\"secret\""));
    }

    #[test]
    fn test_export_configuration_builder() {
        assert!(ExportConfiguration::builder().build().is_err());

        let config = ExportConfiguration::builder()
            .credentials(credentials())
            .optional_fields([OptionalField::Metadata, OptionalField::Tags])
            .metadata_fields(vec![
                MetadataFieldDefinition::new("caption", "Caption", MetadataFieldType::String),
                MetadataFieldDefinition::new("deleted--old", "Old", MetadataFieldType::String),
            ])
            .build()
            .unwrap();

        assert_eq!(config.output_path(), Path::new(DEFAULT_OUTPUT_FILE_NAME));
        assert_eq!(config.search_expression(), "");
        assert_eq!(config.search_fields(), vec!["tags", "metadata"]);
        assert_eq!(config.metadata_fields().len(), 1);
    }

    #[test]
    fn test_metadata_fields_ignored_unless_selected() {
        let config = ExportConfiguration::builder()
            .credentials(credentials())
            .optional_field(OptionalField::Folder)
            .metadata_fields(vec![MetadataFieldDefinition::new(
                "caption",
                "Caption",
                MetadataFieldType::String,
            )])
            .build()
            .unwrap();

        assert!(config.metadata_fields().is_empty());
        assert!(config.search_fields().is_empty());
    }
}
