//! Session command handlers: register, login, logout, whoami.

use std::io::{self, Write};

use anyhow::{Context, Result};
use reel_core::config::Config;
use reel_core::session::mask_token;

use super::open_store;

pub async fn register(config: &Config, username: &str, password: Option<String>) -> Result<()> {
    let password = resolve_password(password)?;
    let mut store = open_store(config)?;
    store.register(username, &password).await?;
    println!("Registered and logged in as {username}.");
    Ok(())
}

pub async fn login(config: &Config, username: &str, password: Option<String>) -> Result<()> {
    let password = resolve_password(password)?;
    let mut store = open_store(config)?;
    store.login(username, &password).await?;
    println!("Logged in as {username}.");
    Ok(())
}

pub fn logout(config: &Config) -> Result<()> {
    let mut store = open_store(config)?;
    if !store.is_authenticated() {
        println!("Not logged in.");
        return Ok(());
    }
    store.logout();
    println!("Logged out.");
    Ok(())
}

pub fn whoami(config: &Config) -> Result<()> {
    let store = open_store(config)?;
    let Some(identity) = store.current_identity() else {
        println!("Not logged in.");
        return Ok(());
    };

    let pretty = serde_json::to_string_pretty(identity).context("render identity")?;
    println!("{pretty}");
    if let Some(token) = store.token() {
        println!("token: {}", mask_token(token));
    }
    Ok(())
}

/// Takes the password from the flag, or reads a line from stdin.
fn resolve_password(password: Option<String>) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }

    eprint!("Password: ");
    io::stderr().flush().ok();
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
