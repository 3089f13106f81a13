//! Wire types for the user endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Credential payload for login and registration.
#[derive(Debug, Serialize)]
pub(crate) struct CredentialsRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Successful login/registration response.
///
/// The identity record is server-defined and kept opaque.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    /// Opaque bearer token authorizing subsequent calls.
    pub token: String,
    /// Profile snapshot for the authenticated user.
    pub user: Value,
}
