//! Social-graph command handlers.

use anyhow::Result;
use reel_core::config::Config;

use super::open_store;

pub async fn follow(config: &Config, user_id: &str) -> Result<()> {
    let mut store = open_store(config)?;
    store.follow_user(user_id).await?;
    println!("Following user {user_id}.");
    Ok(())
}

pub async fn unfollow(config: &Config, user_id: &str) -> Result<()> {
    let mut store = open_store(config)?;
    store.unfollow_user(user_id).await?;
    println!("Unfollowed user {user_id}.");
    Ok(())
}
