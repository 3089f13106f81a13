//! HTTP transport for the platform backend.

use std::fmt;

use anyhow::Result;

mod client;
mod types;

pub use client::ApiClient;
pub use types::AuthResponse;

/// Standard User-Agent header for reel API requests.
pub const USER_AGENT: &str = concat!("reel/", env!("CARGO_PKG_VERSION"));

/// Default backend base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Resolves the backend base URL with precedence: env > config > default.
///
/// # Errors
/// Returns an error if the resolved URL has no http(s) scheme.
pub fn resolve_base_url(config_base_url: Option<&str>) -> Result<String> {
    // Try env var first
    if let Ok(env_url) = std::env::var("REEL_BASE_URL") {
        let trimmed = env_url.trim();
        if !trimmed.is_empty() {
            validate_url(trimmed)?;
            return Ok(trimmed.trim_end_matches('/').to_string());
        }
    }

    // Try config value
    if let Some(config_url) = config_base_url {
        let trimmed = config_url.trim();
        if !trimmed.is_empty() {
            validate_url(trimmed)?;
            return Ok(trimmed.trim_end_matches('/').to_string());
        }
    }

    Ok(DEFAULT_BASE_URL.to_string())
}

fn validate_url(url: &str) -> Result<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        anyhow::bail!("Invalid base URL '{url}': expected an http:// or https:// address")
    }
}

/// Error category for a failed API exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// HTTP status error (4xx, 5xx)
    HttpStatus,
    /// Connection failure or request timeout
    Network,
    /// Failed to parse the response body
    Parse,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorKind::HttpStatus => write!(f, "http_status"),
            ApiErrorKind::Network => write!(f, "network"),
            ApiErrorKind::Parse => write!(f, "parse"),
        }
    }
}

/// Structured error from the backend with kind and details.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// Error category
    pub kind: ApiErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// Human-readable message extracted from the error response body, if any
    server_message: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            server_message: None,
        }
    }

    /// Creates an HTTP status error, extracting a server message from the
    /// body when one is present.
    ///
    /// The backend is inconsistent about the field name: the error payload
    /// carries either `message` or `error`. Both are accepted, `message`
    /// preferred.
    pub fn http_status(status: u16, body: &str) -> Self {
        let server_message = extract_server_message(body);
        let message = match &server_message {
            Some(msg) => format!("HTTP {status}: {msg}"),
            None => format!("HTTP {status}"),
        };
        Self {
            kind: ApiErrorKind::HttpStatus,
            message,
            server_message,
        }
    }

    /// Creates a network-level error (connect failure, timeout).
    pub fn network(err: &reqwest::Error) -> Self {
        Self::new(ApiErrorKind::Network, format!("Request failed: {err}"))
    }

    /// Creates a response-parse error.
    pub fn parse(err: &reqwest::Error) -> Self {
        Self::new(ApiErrorKind::Parse, format!("Failed to parse response: {err}"))
    }

    /// Returns the human-readable message the server attached to the failure,
    /// if any.
    pub fn server_message(&self) -> Option<&str> {
        self.server_message.as_deref()
    }
}

fn extract_server_message(body: &str) -> Option<String> {
    if body.is_empty() {
        return None;
    }
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    json.get("message")
        .or_else(|| json.get("error"))
        .and_then(|v| v.as_str())
        .map(std::string::ToString::to_string)
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for API exchanges.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
