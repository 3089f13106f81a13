//! REST client for the platform's user endpoints.

use anyhow::{Context, Result};
use serde_json::Value;

use super::types::CredentialsRequest;
use super::{ApiError, ApiResult, AuthResponse, USER_AGENT, resolve_base_url};
use crate::config::Config;

/// Platform API client.
///
/// Owns the HTTP timeout policy; the session store on top of it performs
/// single attempts with no retries.
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// Creates a client against a specific base URL with default HTTP
    /// settings.
    ///
    /// # Panics
    /// In test builds, panics if `base_url` is the default backend address.
    /// This prevents unit tests from accidentally making real network
    /// requests; point them at a mock server (e.g., wiremock) instead.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();

        #[cfg(test)]
        assert!(
            base_url != super::DEFAULT_BASE_URL,
            "Tests must not use the real backend; set the base URL to a mock server"
        );

        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    /// Creates a client from configuration: resolved base URL, User-Agent,
    /// and the configured request timeout.
    pub fn from_config(config: &Config) -> Result<Self> {
        let base_url = resolve_base_url(config.effective_base_url())?;

        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self { base_url, http })
    }

    /// Returns the resolved base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submits credentials; on success the server returns a token and the
    /// profile snapshot.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<AuthResponse> {
        let url = format!("{}/api/users/login", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&CredentialsRequest { username, password })
            .send()
            .await
            .map_err(|e| ApiError::network(&e))?;

        let response = check_status(response).await?;
        response.json().await.map_err(|e| ApiError::parse(&e))
    }

    /// Submits a new-account request; same response shape as login.
    pub async fn register(&self, username: &str, password: &str) -> ApiResult<AuthResponse> {
        let url = format!("{}/api/users/register", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&CredentialsRequest { username, password })
            .send()
            .await
            .map_err(|e| ApiError::network(&e))?;

        let response = check_status(response).await?;
        response.json().await.map_err(|e| ApiError::parse(&e))
    }

    /// Submits an authenticated profile update; returns the updated
    /// identity record.
    pub async fn update_profile(&self, token: &str, fields: &Value) -> ApiResult<Value> {
        let url = format!("{}/api/users/profile", self.base_url);
        let response = self
            .http
            .put(&url)
            .bearer_auth(token)
            .json(fields)
            .send()
            .await
            .map_err(|e| ApiError::network(&e))?;

        let response = check_status(response).await?;
        response.json().await.map_err(|e| ApiError::parse(&e))
    }

    /// Creates a follow relationship with the target user. The response
    /// payload carries nothing of interest.
    pub async fn follow_user(&self, token: &str, user_id: &str) -> ApiResult<()> {
        let url = format!("{}/api/users/{user_id}/follow", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| ApiError::network(&e))?;

        check_status(response).await?;
        Ok(())
    }

    /// Deletes the follow relationship with the target user.
    pub async fn unfollow_user(&self, token: &str, user_id: &str) -> ApiResult<()> {
        let url = format!("{}/api/users/{user_id}/follow", self.base_url);
        let response = self
            .http
            .delete(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ApiError::network(&e))?;

        check_status(response).await?;
        Ok(())
    }
}

/// Turns a non-success response into an `ApiError`, reading the body for a
/// server-provided message.
async fn check_status(response: reqwest::Response) -> ApiResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::http_status(status.as_u16(), &body))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::ApiErrorKind;

    /// Test: login posts credentials and parses `{token, user}`.
    #[tokio::test]
    async fn test_login_roundtrip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/users/login"))
            .and(body_json(json!({"username": "alice", "password": "pw"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "t1",
                "user": {"id": 1, "username": "alice"},
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri());
        let auth = client.login("alice", "pw").await.unwrap();
        assert_eq!(auth.token, "t1");
        assert_eq!(auth.user["username"], "alice");
    }

    /// Test: register shares the login response shape.
    #[tokio::test]
    async fn test_register_roundtrip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/users/register"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "token": "t2",
                "user": {"id": 2, "username": "bob"},
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri());
        let auth = client.register("bob", "pw").await.unwrap();
        assert_eq!(auth.token, "t2");
    }

    /// Test: failure surfaces the server message from the body.
    #[tokio::test]
    async fn test_login_failure_extracts_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/users/login"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"error": "Invalid credentials"})),
            )
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri());
        let err = client.login("alice", "bad").await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::HttpStatus);
        assert_eq!(err.server_message(), Some("Invalid credentials"));
    }

    /// Test: profile update is bearer-authorized and returns the new record.
    #[tokio::test]
    async fn test_update_profile_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/users/profile"))
            .and(header("Authorization", "Bearer t1"))
            .and(body_json(json!({"name": "alicia"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": 1, "name": "alicia"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri());
        let updated = client
            .update_profile("t1", &json!({"name": "alicia"}))
            .await
            .unwrap();
        assert_eq!(updated["name"], "alicia");
    }

    /// Test: follow posts, unfollow deletes, both against the same path.
    #[tokio::test]
    async fn test_follow_and_unfollow_relationship() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/users/42/follow"))
            .and(header("Authorization", "Bearer t1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/users/42/follow"))
            .and(header("Authorization", "Bearer t1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri());
        client.follow_user("t1", "42").await.unwrap();
        client.unfollow_user("t1", "42").await.unwrap();
    }

    /// Test: connection failure maps to a network error with no server
    /// message.
    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        // Bind-then-drop leaves a port with no listener.
        let server = MockServer::start().await;
        let uri = server.uri();
        drop(server);

        let client = ApiClient::new(uri);
        let err = client.login("alice", "pw").await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Network);
        assert_eq!(err.server_message(), None);
    }
}
