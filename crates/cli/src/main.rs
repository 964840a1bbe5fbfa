//! tlparser CLI - index setup and one-off parses.
//!
//! # Usage
//!
//! ```bash
//! # Create MongoDB indexes
//! tlparser-cli setup mongo
//!
//! # Create Elasticsearch indices
//! tlparser-cli setup elastic
//!
//! # Both
//! tlparser-cli setup all
//!
//! # Scrape a Lamoda category into MongoDB
//! tlparser-cli parse lamoda 4153
//!
//! # Fetch Twitch data into MongoDB
//! tlparser-cli parse twitch-games
//! tlparser-cli parse twitch-streams
//! tlparser-cli parse twitch-user shroud
//!
//! # Copy MongoDB into the Elasticsearch read store
//! tlparser-cli sync elastic
//! ```
//!
//! # Commands
//!
//! - `setup` - Create indexes the repositories rely on
//! - `parse` - Run a write service once, outside the HTTP server
//! - `sync` - Rebuild a read store from MongoDB

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use tlparser_core::{Category, TwitchLogin};

mod commands;

#[derive(Parser)]
#[command(name = "tlparser-cli")]
#[command(author, version, about = "tlparser CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create database indexes
    Setup {
        #[command(subcommand)]
        target: SetupTarget,
    },
    /// Fetch data from a source and store it
    Parse {
        #[command(subcommand)]
        source: ParseSource,
    },
    /// Copy stored data from MongoDB into a read store
    Sync {
        #[command(subcommand)]
        target: SyncTarget,
    },
}

#[derive(Subcommand)]
enum SyncTarget {
    /// Rebuild the Elasticsearch indices
    Elastic,
}

#[derive(Subcommand)]
enum SetupTarget {
    /// Create MongoDB unique indexes
    Mongo,
    /// Create Elasticsearch indices
    Elastic,
    /// Set up every store
    All,
}

#[derive(Subcommand)]
enum ParseSource {
    /// Scrape a Lamoda catalog category
    Lamoda {
        /// Category slug, as in `lamoda.ru/c/{category}/`
        category: Category,
    },
    /// Fetch the current top games
    TwitchGames,
    /// Fetch the most watched live streams
    TwitchStreams,
    /// Fetch a single user
    TwitchUser {
        /// Twitch login
        login: TwitchLogin,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let container = commands::container()?;

    match cli.command {
        Commands::Setup { target } => match target {
            SetupTarget::Mongo => commands::setup::mongo(&container).await?,
            SetupTarget::Elastic => commands::setup::elastic(&container).await?,
            SetupTarget::All => {
                commands::setup::mongo(&container).await?;
                commands::setup::elastic(&container).await?;
            }
        },
        Commands::Parse { source } => match source {
            ParseSource::Lamoda { category } => {
                commands::parse::lamoda(&container, &category).await?;
            }
            ParseSource::TwitchGames => commands::parse::twitch_games(&container).await?,
            ParseSource::TwitchStreams => commands::parse::twitch_streams(&container).await?,
            ParseSource::TwitchUser { login } => {
                commands::parse::twitch_user(&container, &login).await?;
            }
        },
        Commands::Sync { target } => match target {
            SyncTarget::Elastic => commands::sync::elastic(&container).await?,
        },
    }
    Ok(())
}
