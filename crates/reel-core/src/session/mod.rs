//! Session lifecycle and server-bound identity mutations.
//!
//! `SessionStore` owns the authenticated-session state machine: the token,
//! the identity snapshot, and the transient request status that view-style
//! collaborators read. Every mutating operation is a single attempt against
//! the backend; failures surface exactly one message and always release the
//! busy flag.

use anyhow::{Result, bail};
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::{ApiClient, ApiError, AuthResponse};
use crate::config::SessionConfig;

pub mod credentials;

use credentials::{CredentialStore, StoredSession};

/// Generic fallback shown when the server attaches no message of its own.
const LOGIN_FALLBACK: &str = "Login failed, please try again later";
const REGISTER_FALLBACK: &str = "Registration failed, please try again later";
const PROFILE_FALLBACK: &str = "Profile update failed, please try again later";
const FOLLOW_FALLBACK: &str = "Follow failed, please try again later";
const UNFOLLOW_FALLBACK: &str = "Unfollow failed, please try again later";

/// The session store.
///
/// Two macro-states: Anonymous (no token) and Authenticated (token present),
/// plus an orthogonal busy flag while an operation is in flight. Operations
/// never retry, never queue, and never de-duplicate: when a shared store is
/// driven from more than one task, concurrent operations race on this state
/// and the last response to resolve wins. Set `reject_concurrent` in
/// [`SessionConfig`] to refuse a new operation while one is in flight
/// instead.
///
/// Token freshness is not validated locally: an expired token travels to the
/// server and its rejection surfaces as an ordinary operation failure, never
/// as an automatic logout.
pub struct SessionStore {
    client: ApiClient,
    credentials: CredentialStore,
    token: Option<String>,
    identity: Option<Value>,
    request_in_flight: bool,
    last_error: Option<String>,
    reject_concurrent: bool,
}

impl SessionStore {
    /// Hydrates a store from durable storage.
    ///
    /// An absent session file yields the Anonymous state; a corrupt one is an
    /// error rather than a silent logout.
    pub fn hydrate(
        client: ApiClient,
        credentials: CredentialStore,
        options: &SessionConfig,
    ) -> Result<Self> {
        let stored = credentials.load()?;
        let (token, identity) = match stored {
            Some(session) => (Some(session.token), Some(session.identity)),
            None => (None, None),
        };
        debug!(authenticated = token.is_some(), "hydrated session");

        Ok(Self {
            client,
            credentials,
            token,
            identity,
            request_in_flight: false,
            last_error: None,
            reject_concurrent: options.reject_concurrent,
        })
    }

    /// Whether a session is active. Gates entry to protected surfaces.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Last-known profile snapshot for the current session.
    pub fn current_identity(&self) -> Option<&Value> {
        self.identity.as_ref()
    }

    /// Opaque token for the current session.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// True while an operation is in flight.
    pub fn request_in_flight(&self) -> bool {
        self.request_in_flight
    }

    /// Message from the most recently failed operation. Cleared when the
    /// next operation starts.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Submits credentials; on success the new session replaces the current
    /// one, in memory and on disk.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        self.begin()?;
        let result = self.client.login(username, password).await;
        let outcome = self.finish_auth(LOGIN_FALLBACK, result);
        self.request_in_flight = false;
        outcome
    }

    /// Submits a new-account request; success behaves exactly like login.
    pub async fn register(&mut self, username: &str, password: &str) -> Result<()> {
        self.begin()?;
        let result = self.client.register(username, password).await;
        let outcome = self.finish_auth(REGISTER_FALLBACK, result);
        self.request_in_flight = false;
        outcome
    }

    /// Ends the session: token and identity are cleared in memory and in
    /// durable storage. Local-only, and total — there is no failure path.
    pub fn logout(&mut self) {
        self.token = None;
        self.identity = None;
        self.last_error = None;
        if let Err(err) = self.credentials.clear() {
            warn!(error = %err, "failed to clear persisted session");
        }
        debug!("session cleared");
    }

    /// Submits an authenticated profile update; on success the returned
    /// record replaces the identity snapshot. The token is untouched.
    pub async fn update_profile(&mut self, fields: &Value) -> Result<()> {
        self.begin()?;
        let token = self.token.clone().unwrap_or_default();
        let result = self.client.update_profile(&token, fields).await;
        let outcome = match result {
            Ok(identity) => self.commit_identity(PROFILE_FALLBACK, identity),
            Err(err) => {
                self.record_failure(PROFILE_FALLBACK, &err);
                Err(err.into())
            }
        };
        self.request_in_flight = false;
        outcome
    }

    /// Creates a follow relationship with the target user.
    ///
    /// Requires an active session: called while Anonymous this is a no-op
    /// failure — no remote call, busy flag and `last_error` untouched.
    pub async fn follow_user(&mut self, user_id: &str) -> Result<()> {
        let Some(token) = self.token.clone() else {
            bail!("Not authenticated");
        };
        self.begin()?;
        let result = self.client.follow_user(&token, user_id).await;
        let outcome = match result {
            Ok(()) => Ok(()),
            Err(err) => {
                self.record_failure(FOLLOW_FALLBACK, &err);
                Err(err.into())
            }
        };
        self.request_in_flight = false;
        outcome
    }

    /// Removes the follow relationship with the target user. Guarded like
    /// [`Self::follow_user`].
    pub async fn unfollow_user(&mut self, user_id: &str) -> Result<()> {
        let Some(token) = self.token.clone() else {
            bail!("Not authenticated");
        };
        self.begin()?;
        let result = self.client.unfollow_user(&token, user_id).await;
        let outcome = match result {
            Ok(()) => Ok(()),
            Err(err) => {
                self.record_failure(UNFOLLOW_FALLBACK, &err);
                Err(err.into())
            }
        };
        self.request_in_flight = false;
        outcome
    }

    /// Marks an operation start: clears the previous error and raises the
    /// busy flag. In strict mode a still-busy store refuses the operation
    /// without touching either field.
    fn begin(&mut self) -> Result<()> {
        if self.reject_concurrent && self.request_in_flight {
            bail!("Another session operation is already in flight");
        }
        self.last_error = None;
        self.request_in_flight = true;
        Ok(())
    }

    /// Completes a login/register exchange.
    fn finish_auth(
        &mut self,
        fallback: &str,
        result: Result<AuthResponse, ApiError>,
    ) -> Result<()> {
        match result {
            Ok(auth) => self.commit_auth(fallback, auth),
            Err(err) => {
                self.record_failure(fallback, &err);
                Err(err.into())
            }
        }
    }

    /// Persists then commits a fresh session. Persisting first keeps the
    /// durable and in-memory copies identical on every exit path.
    fn commit_auth(&mut self, fallback: &str, auth: AuthResponse) -> Result<()> {
        let stored = StoredSession {
            token: auth.token,
            identity: auth.user,
        };
        if let Err(err) = self.credentials.save(&stored) {
            self.last_error = Some(fallback.to_string());
            return Err(err);
        }
        self.token = Some(stored.token);
        self.identity = Some(stored.identity);
        debug!("session established");
        Ok(())
    }

    /// Persists then commits a replaced identity snapshot.
    fn commit_identity(&mut self, fallback: &str, identity: Value) -> Result<()> {
        if let Some(token) = &self.token {
            let stored = StoredSession {
                token: token.clone(),
                identity: identity.clone(),
            };
            if let Err(err) = self.credentials.save(&stored) {
                self.last_error = Some(fallback.to_string());
                return Err(err);
            }
        }
        self.identity = Some(identity);
        Ok(())
    }

    /// Records a failed exchange: the server's message when present, the
    /// operation's generic fallback otherwise.
    fn record_failure(&mut self, fallback: &str, err: &ApiError) {
        let message = err.server_message().unwrap_or(fallback).to_string();
        debug!(error = %err, "operation failed");
        self.last_error = Some(message);
    }
}

/// Returns a masked version of a token for display (first 12 chars + ...).
pub fn mask_token(token: &str) -> String {
    if token.len() <= 16 {
        return "***".to_string();
    }
    format!("{}...", &token[..12])
}
