//! HTTP clients for the GitHub and Asana REST APIs.
//!
//! Every call is a single attempt bounded by [`REQUEST_TIMEOUT`]; failures are
//! surfaced to the caller with the API's own error message when it sends one.

pub mod asana;
pub mod github;

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Upper bound for a single API request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the shared HTTP client used by both API adapters.
pub fn build_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("asana-sync/", env!("CARGO_PKG_VERSION")))
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")
}

/// Error payloads from either API.
///
/// GitHub replies with `{"message": ...}`, Asana with
/// `{"errors": [{"message": ...}]}`.
#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Pass successful responses through; turn anything else into an error.
async fn check_status(resp: reqwest::Response, operation: &str) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body: ErrorBody = resp.json().await.unwrap_or_default();
    let message = body
        .message
        .or_else(|| body.errors.into_iter().next().map(|e| e.message))
        .unwrap_or_else(|| format!("HTTP {status}"));
    anyhow::bail!("{operation} failed ({status}): {message}");
}

fn trim_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_base_url() {
        assert_eq!(trim_base_url("https://api.github.com/"), "https://api.github.com");
        assert_eq!(trim_base_url("https://api.github.com"), "https://api.github.com");
    }

    #[test]
    fn test_deserialize_github_error() {
        let body: ErrorBody = serde_json::from_str(r#"{"message": "Not Found"}"#).unwrap();
        assert_eq!(body.message.as_deref(), Some("Not Found"));
    }

    #[test]
    fn test_deserialize_asana_error() {
        let json = r#"{"errors": [{"message": "task: Not a recognized ID", "help": "..."}]}"#;
        let body: ErrorBody = serde_json::from_str(json).unwrap();
        assert!(body.message.is_none());
        assert_eq!(body.errors[0].message, "task: Not a recognized ID");
    }
}
