//! Cloudinary Admin API client.
//!
//! The exporter talks to the service through two small traits,
//! [`SearchApi`] and [`MetadataApi`], so the pagination loop and the metadata
//! resolver can run against in-memory fixtures as well as the real service.

use crate::configuration::Configuration;
use crate::http_utils::{HttpClient, HttpRequestConfig};
use crate::model::{
    Credentials, MetadataFieldDefinition, MetadataFieldListResponse, SearchRequest,
    SearchResponse,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, trace};

/// Error emitted by the Cloudinary Admin API
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("HTTP {status}: {message}")]
    Status { status: StatusCode, message: String },
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::HttpError(e) => e.status(),
            ApiError::JsonError(_) => None,
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self.status(),
            Some(StatusCode::UNAUTHORIZED) | Some(StatusCode::FORBIDDEN)
        )
    }

    /// Timeouts and connection failures, as opposed to answers from the service.
    pub fn is_transport_failure(&self) -> bool {
        match self {
            ApiError::HttpError(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}

/// One page of the search endpoint.
#[async_trait]
pub trait SearchApi: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, ApiError>;
}

/// Custom metadata field schema.
#[async_trait]
pub trait MetadataApi: Send + Sync {
    async fn list_metadata_fields(&self) -> Result<Vec<MetadataFieldDefinition>, ApiError>;
}

#[derive(Clone)]
pub struct CloudinaryClient {
    http: HttpClient,
}

impl CloudinaryClient {
    pub fn new(config: HttpRequestConfig) -> Result<Self, ApiError> {
        Ok(Self {
            http: HttpClient::new(config)?,
        })
    }

    pub fn from_configuration(
        configuration: &Configuration,
        credentials: &Credentials,
    ) -> Result<Self, ApiError> {
        Self::new(HttpRequestConfig::from_configuration(
            configuration,
            credentials,
        ))
    }
}

#[async_trait]
impl SearchApi for CloudinaryClient {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, ApiError> {
        trace!(
            "Searching with expression {:?}, cursor {:?}...",
            request.expression,
            request.next_cursor
        );

        let response = self
            .http
            .post::<SearchResponse, _>("/resources/search", request)
            .await?;

        let mut page = response.body;
        if let Some(rate_limit) = &response.rate_limit {
            debug!(
                "Search rate limit: {:?} of {:?} remaining, resets at {:?}",
                rate_limit.remaining, rate_limit.limit, rate_limit.reset
            );
        }
        page.rate_limit = response.rate_limit;

        debug!(
            "Received {} of {} resources (more: {})",
            page.resources.len(),
            page.total_count,
            page.cursor().is_some()
        );
        Ok(page)
    }
}

#[async_trait]
impl MetadataApi for CloudinaryClient {
    async fn list_metadata_fields(&self) -> Result<Vec<MetadataFieldDefinition>, ApiError> {
        trace!("Listing metadata fields...");
        let response = self
            .http
            .get::<MetadataFieldListResponse>("/metadata_fields")
            .await?;
        Ok(response.body.metadata_fields)
    }
}
