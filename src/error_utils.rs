//! Error reporting utilities for the cldexport application.
//!
//! This module turns technical failures into messages a user can act on.

use tracing::error;

/// Create a user-friendly error message from a technical error
///
/// Common HTTP failures are rewritten into actionable text; anything else is
/// returned unchanged.
pub fn create_user_friendly_error<E: std::fmt::Display>(error: E) -> String {
    let error_str = error.to_string();
    let lower = error_str.to_lowercase();

    let hint = if error_str.contains("HTTP 401") || lower.contains("unauthorized") {
        Some("Authentication failed. Check your cloud name, API key and API secret with 'cldexport config set'.")
    } else if error_str.contains("HTTP 403") || lower.contains("forbidden") {
        Some("Access forbidden. The API key does not have permission for this operation.")
    } else if error_str.contains("HTTP 404") || lower.contains("not found") {
        Some("Resource not found. Please check the cloud name.")
    } else if error_str.contains("HTTP 420")
        || error_str.contains("HTTP 429")
        || lower.contains("rate limit")
    {
        Some("Rate limit exceeded. Wait for the limit to reset and run the export again.")
    } else if lower.contains("timeout") || lower.contains("timed out") {
        Some("Request timeout. The server took too long to respond. Please try again.")
    } else if lower.contains("connection") || lower.contains("network") {
        Some("Network error. Please check your internet connection and try again.")
    } else {
        None
    };

    match hint {
        Some(hint) => format!("{} ({})", hint, error_str),
        None => error_str,
    }
}

/// Report an error with a user-friendly message based on error content
pub fn report_error_with_user_friendly_message<E: std::fmt::Display>(error: E) {
    let user_message = create_user_friendly_error(&error);
    error!("{}", error);
    eprintln!("Error: {}", user_message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_friendly_error_auth() {
        let friendly_msg = create_user_friendly_error("HTTP 401 Unauthorized: Invalid api_key");
        assert!(friendly_msg.contains("Authentication failed"));
        assert!(friendly_msg.contains("Invalid api_key"));
    }

    #[test]
    fn test_create_user_friendly_error_rate_limit() {
        let friendly_msg = create_user_friendly_error("HTTP 420: Rate Limit Exceeded");
        assert!(friendly_msg.starts_with("Rate limit exceeded"));
    }

    #[test]
    fn test_unknown_errors_pass_through() {
        assert_eq!(
            create_user_friendly_error("Missing required argument: cloud-name"),
            "Missing required argument: cloud-name"
        );
    }
}
