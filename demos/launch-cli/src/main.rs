use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use mclaunch::prelude::*;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "mclaunch", version, about = "Launch Minecraft through portablemc")]
struct Cli {
    /// Path of the portablemc executable.
    #[arg(long, env = "EXE_LOCATION", global = true)]
    exe_location: Option<PathBuf>,

    /// Directory run logs are written under.
    #[arg(long, env = "LOG_LOCATION", global = true)]
    log_location: Option<PathBuf>,

    /// The launcher's main (game) directory.
    #[arg(long, env = "MAIN_DIR", global = true)]
    main_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in with a Microsoft account (skipped if a session is cached).
    Login { email: String },

    /// Log a Microsoft account out.
    Logout { email: String },

    /// List accounts with a cached session, as JSON.
    Users,

    /// Install and start the game.
    Launch {
        /// Version id, `release`, or `snapshot`.
        #[arg(long)]
        version: Option<String>,

        /// standard, forge, neoforge, legacyfabric, quilt or fabric.
        #[arg(long)]
        loader: Option<String>,

        /// Play as this account, logging in first if needed.
        #[arg(long)]
        email: Option<String>,

        /// Install without starting.
        #[arg(long)]
        install_only: bool,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut builder = LauncherConfig::builder();
    if let Some(path) = cli.exe_location {
        builder = builder.exe_location(path);
    }
    if let Some(path) = cli.log_location {
        builder = builder.log_location(path);
    }
    if let Some(path) = cli.main_dir {
        builder = builder.main_dir(path);
    }
    let config = builder.build().context("invalid launcher configuration")?;
    let mut launcher = Launcher::new(config);

    match cli.command {
        Command::Login { email } => {
            let user = launcher.authenticate(&email).await?;
            println!("logged in as {} ({})", user.username, user.email);
        }
        Command::Logout { email } => {
            launcher.logout(&email).await?;
        }
        Command::Users => {
            let users: Vec<AuthedUserEntry> = launcher.authed_users().collect();
            println!("{}", serde_json::to_string_pretty(&users)?);
        }
        Command::Launch {
            version,
            loader,
            email,
            install_only,
        } => {
            if let Some(email) = email {
                launcher.authenticate(&email).await?;
            }
            let quit_cleanly = launcher
                .launch_game(LaunchOptions { version, loader }, install_only)
                .await?;
            if !quit_cleanly {
                anyhow::bail!("launch refused or game crashed (see logs/game)");
            }
        }
    }

    Ok(())
}
