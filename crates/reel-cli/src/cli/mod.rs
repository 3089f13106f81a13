//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use reel_core::config;

mod commands;

#[derive(Parser)]
#[command(name = "reel")]
#[command(version)]
#[command(about = "Command-line client for the Reel platform")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Create an account and start a session
    Register {
        /// Account username
        #[arg(value_name = "USERNAME")]
        username: String,

        /// Password (prompted on stdin when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Log in and start a session
    Login {
        /// Account username
        #[arg(value_name = "USERNAME")]
        username: String,

        /// Password (prompted on stdin when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// End the current session (clear the stored token)
    Logout,

    /// Show the current session's identity
    Whoami,

    /// Manage the current profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// Follow a user
    Follow {
        /// Target user ID
        #[arg(value_name = "USER_ID")]
        user_id: String,
    },

    /// Unfollow a user
    Unfollow {
        /// Target user ID
        #[arg(value_name = "USER_ID")]
        user_id: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ProfileCommands {
    /// Update profile fields (KEY=VALUE pairs)
    Set {
        /// Fields to update, e.g. `username=alicia bio="hello"`
        #[arg(value_name = "KEY=VALUE", required = true)]
        fields: Vec<String>,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = config::Config::load().context("load config")?;

    match cli.command {
        Commands::Register { username, password } => {
            commands::auth::register(&config, &username, password).await
        }
        Commands::Login { username, password } => {
            commands::auth::login(&config, &username, password).await
        }
        Commands::Logout => commands::auth::logout(&config),
        Commands::Whoami => commands::auth::whoami(&config),

        Commands::Profile { command } => match command {
            ProfileCommands::Set { fields } => commands::profile::set(&config, &fields).await,
        },

        Commands::Follow { user_id } => commands::social::follow(&config, &user_id).await,
        Commands::Unfollow { user_id } => commands::social::unfollow(&config, &user_id).await,

        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
    }
}
