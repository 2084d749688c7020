//! HTTP utilities for the Cloudinary Admin API.
//!
//! This module wraps a shared `reqwest` client with the account's base URL,
//! Basic credentials, default headers and a request timeout, and turns
//! responses into typed values or [`ApiError`]s in one place.

use crate::cloudinary::ApiError;
use crate::configuration::Configuration;
use crate::model::{Credentials, RateLimit};
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, trace};

pub const USER_AGENT: &str = concat!("cldexport/", env!("CARGO_PKG_VERSION"));

const HEADER_RATE_LIMIT: &str = "x-featureratelimit-limit";
const HEADER_RATE_REMAINING: &str = "x-featureratelimit-remaining";
const HEADER_RATE_RESET: &str = "x-featureratelimit-reset";

/// Configuration for HTTP requests with common settings
#[derive(Debug, Clone)]
pub struct HttpRequestConfig {
    /// Base URL for the account, including the cloud name segment
    pub base_url: String,
    /// Credentials sent as HTTP Basic authentication
    pub credentials: Credentials,
    /// Default headers to include with all requests
    pub default_headers: HashMap<String, String>,
    /// Request timeout in seconds
    pub timeout: u64,
}

impl HttpRequestConfig {
    pub fn new(api_url: &str, credentials: &Credentials) -> Self {
        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), USER_AGENT.to_string());

        Self {
            base_url: format!(
                "{}/{}",
                api_url.trim_end_matches('/'),
                credentials.cloud_name()
            ),
            credentials: credentials.clone(),
            default_headers,
            timeout: crate::configuration::DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn from_configuration(configuration: &Configuration, credentials: &Credentials) -> Self {
        Self::new(&configuration.api_url(), credentials).with_timeout(configuration.timeout_secs())
    }

    pub fn with_timeout(mut self, timeout: u64) -> Self {
        self.timeout = timeout;
        self
    }
}

/// A decoded response body plus the rate-limit counters that came with it.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub body: T,
    pub rate_limit: Option<RateLimit>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorMessage,
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    message: String,
}

/// HTTP client wrapper with common request handling logic
#[derive(Clone)]
pub struct HttpClient {
    client: Arc<Client>,
    config: HttpRequestConfig,
}

impl HttpClient {
    pub fn new(config: HttpRequestConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            config,
        })
    }

    /// Make a GET request to the specified path
    pub async fn get<T>(&self, path: &str) -> Result<ApiResponse<T>, ApiError>
    where
        T: DeserializeOwned,
    {
        self.execute_request(|client| client.get(format!("{}{}", self.config.base_url, path)))
            .await
    }

    /// Make a POST request to the specified path with a JSON body
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<ApiResponse<T>, ApiError>
    where
        T: DeserializeOwned,
        B: serde::Serialize,
    {
        self.execute_request(|client| {
            client
                .post(format!("{}{}", self.config.base_url, path))
                .json(body)
        })
        .await
    }

    async fn execute_request<F, T>(&self, request_builder: F) -> Result<ApiResponse<T>, ApiError>
    where
        F: FnOnce(&Client) -> reqwest::RequestBuilder,
        T: DeserializeOwned,
    {
        let mut request = request_builder(&self.client).basic_auth(
            self.config.credentials.api_key(),
            Some(self.config.credentials.api_secret()),
        );

        for (key, value) in &self.config.default_headers {
            request = request.header(key, value);
        }

        let response = request.send().await?;
        let status = response.status();
        let rate_limit = rate_limit_from_headers(response.headers());
        let response_text = response.text().await?;

        if status.is_success() {
            trace!("Raw response text for deserialization: {}", response_text);
            match serde_json::from_str::<T>(&response_text) {
                Ok(body) => Ok(ApiResponse { body, rate_limit }),
                Err(e) => {
                    error!(
                        "Failed to deserialize response: {}. Raw response: {}",
                        e, response_text
                    );
                    Err(ApiError::JsonError(e))
                }
            }
        } else {
            debug!("Request failed with status {}: {}", status, response_text);
            Err(ApiError::Status {
                status,
                message: error_message(status, &response_text),
            })
        }
    }
}

/// Extract the service's error message, falling back to the raw body.
fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) if body.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
        Err(_) => body.trim().to_string(),
    }
}

pub fn rate_limit_from_headers(headers: &HeaderMap) -> Option<RateLimit> {
    let text = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_string())
    };

    let rate_limit = RateLimit {
        limit: text(HEADER_RATE_LIMIT).and_then(|v| v.parse().ok()),
        remaining: text(HEADER_RATE_REMAINING).and_then(|v| v.parse().ok()),
        reset: text(HEADER_RATE_RESET),
    };

    if rate_limit == RateLimit::default() {
        None
    } else {
        Some(rate_limit)
    }
}
