//! Command line front end for the games catalog.
//!
//! Every subcommand goes through the same store and messages a view would use.

use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use client::commands::HttpGameApi;
use client::messages::{Msg, SaveCallbacks};
use client::store::Store;

type BoxError = Box<dyn Error + Send + Sync>;

#[derive(Parser)]
#[command(name = "gaming-hub")]
#[command(about = "Browse and edit the Gaming Hub catalog", long_about = None)]
struct Cli {
    /// Base URL of the Gaming Hub server
    #[arg(long, env = "GAMING_HUB_URL", default_value = "http://localhost:3000")]
    base_url: String,

    /// Bearer token sent with every request
    #[arg(long, env = "GAMING_HUB_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every game title
    List,

    /// Print one game as JSON
    Show {
        /// Title of the game
        game_id: String,
    },

    /// Load a game, change some fields and save it back
    Edit {
        /// Title of the game to edit
        game_id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        href: Option<String>,

        #[arg(long)]
        image_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut api = HttpGameApi::new(&cli.base_url)?;
    if let Some(token) = cli.token {
        api = api.with_token(token);
    }
    let (mut store, _dispatcher) = Store::new(Arc::new(api));

    match cli.command {
        Commands::List => {
            store.apply_and_settle(Msg::GamesRequest).await;
            for game in &store.model().games {
                println!("{}", game.title);
            }
        }
        Commands::Show { game_id } => {
            store
                .apply_and_settle(Msg::GameRequest {
                    game_id: game_id.clone(),
                })
                .await;
            let game = store
                .model()
                .game
                .as_ref()
                .ok_or_else(|| format!("Could not load game '{}'", game_id))?;
            println!("{}", serde_json::to_string_pretty(game)?);
        }
        Commands::Edit {
            game_id,
            title,
            description,
            href,
            image_url,
        } => {
            store
                .apply_and_settle(Msg::GameRequest {
                    game_id: game_id.clone(),
                })
                .await;
            let mut game = store
                .model()
                .game
                .clone()
                .ok_or_else(|| format!("Could not load game '{}'", game_id))?;

            if let Some(title) = title {
                game.title = title;
            }
            if let Some(description) = description {
                game.description = description;
            }
            if let Some(href) = href {
                game.href = href;
            }
            if let Some(image_url) = image_url {
                game.image_url = Some(image_url).filter(|url| !url.trim().is_empty());
            }

            let saved = Arc::new(AtomicBool::new(false));
            let callbacks = {
                let saved = saved.clone();
                SaveCallbacks::new()
                    .on_success(move || saved.store(true, Ordering::SeqCst))
                    .on_failure(|err| eprintln!("{}", err))
            };
            store
                .apply_and_settle(Msg::GameSave {
                    game_id: game_id.clone(),
                    game,
                    callbacks,
                })
                .await;

            if !saved.load(Ordering::SeqCst) {
                return Err(format!("Could not save game '{}'", game_id).into());
            }
            if let Some(game) = &store.model().game {
                println!("Saved '{}'", game.title);
            }
        }
    }

    Ok(())
}
