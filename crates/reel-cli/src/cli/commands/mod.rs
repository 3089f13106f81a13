//! CLI command handlers.

use anyhow::Result;
use reel_core::api::ApiClient;
use reel_core::config::Config;
use reel_core::session::SessionStore;
use reel_core::session::credentials::CredentialStore;

pub mod auth;
pub mod config;
pub mod profile;
pub mod social;

/// Hydrates the session store from the default credential location.
pub(crate) fn open_store(config: &Config) -> Result<SessionStore> {
    let client = ApiClient::from_config(config)?;
    let credentials = CredentialStore::default_location();
    SessionStore::hydrate(client, credentials, &config.session)
}
