//! Custom metadata field resolution.
//!
//! Enum and set fields store datasource ids on each asset. Before an export
//! runs, the field schema is fetched once and turned into a
//! [`ValueLookupTable`] so every id can be replaced by its display value.

use crate::cloudinary::MetadataApi;
use crate::model::MetadataFieldDefinition;
use std::collections::HashMap;
use tracing::{debug, trace, warn};

/// Field external id -> (datasource value id -> display value).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueLookupTable {
    fields: HashMap<String, HashMap<String, String>>,
}

impl ValueLookupTable {
    /// Build the table from field definitions. Only enum and set fields with
    /// a datasource contribute entries.
    pub fn from_definitions<'a, I>(definitions: I) -> ValueLookupTable
    where
        I: IntoIterator<Item = &'a MetadataFieldDefinition>,
    {
        let mut fields = HashMap::new();

        for definition in definitions {
            if !definition.is_enumerated() {
                continue;
            }

            let Some(datasource) = &definition.datasource else {
                debug!(
                    "Metadata field {} has no datasource, its values will be exported empty",
                    definition.external_id
                );
                continue;
            };

            let values: HashMap<String, String> = datasource
                .values
                .iter()
                .map(|v| (v.external_id.clone(), v.value.clone()))
                .collect();

            trace!(
                "Metadata field {} maps {} datasource values",
                definition.external_id,
                values.len()
            );
            fields.insert(definition.external_id.clone(), values);
        }

        ValueLookupTable { fields }
    }

    pub fn label(&self, field_id: &str, value_id: &str) -> Option<&str> {
        self.fields
            .get(field_id)
            .and_then(|values| values.get(value_id))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Fetch the account's metadata field definitions.
///
/// Failures are logged and produce an empty list: an export without
/// metadata columns is preferable to no export at all. Soft-deleted fields
/// are dropped.
pub async fn list_fields<A>(api: &A) -> Vec<MetadataFieldDefinition>
where
    A: MetadataApi + ?Sized,
{
    match api.list_metadata_fields().await {
        Ok(fields) => {
            let fields: Vec<MetadataFieldDefinition> =
                fields.into_iter().filter(|f| !f.is_deleted()).collect();
            debug!("Found {} metadata fields", fields.len());
            fields
        }
        Err(e) => {
            warn!("Failed to list metadata fields, continuing without them: {}", e);
            Vec::new()
        }
    }
}

/// Pick the requested fields, in the order they were requested.
pub fn select_fields(
    available: &[MetadataFieldDefinition],
    requested: &[String],
) -> Vec<MetadataFieldDefinition> {
    let mut selected: Vec<MetadataFieldDefinition> = Vec::with_capacity(requested.len());

    for external_id in requested {
        if selected.iter().any(|f| &f.external_id == external_id) {
            continue;
        }
        match available.iter().find(|f| &f.external_id == external_id) {
            Some(field) => selected.push(field.clone()),
            None => warn!("Unknown metadata field '{}' skipped", external_id),
        }
    }

    selected
}
