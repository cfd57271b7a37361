use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    Dashboard, HttpListStore, HttpSession, Navigation, OmdbCatalog, SearchController,
    ServiceClient, SessionService,
};
use shared::domain::MovieId;
use tracing_subscriber::EnvFilter;

mod config;
mod prompt;
mod render;

use config::load_settings;

#[derive(Parser, Debug)]
#[command(name = "cinetrackr", about = "Track the movies you've watched and want to watch")]
struct Cli {
    #[arg(long, default_value = "cinetrackr.toml")]
    config: PathBuf,
    /// Overrides the list service URL from config and environment.
    #[arg(long)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the sign-in URL of the list service.
    Login,
    Logout,
    /// Show the watched and want-to-watch lists.
    List,
    /// Quick-add a movie by title.
    Add { title: String },
    /// Move a want-to-watch movie to watched.
    Watch { id: i64 },
    Delete { id: i64 },
    Review {
        id: i64,
        #[arg(long)]
        rating: Option<f64>,
        #[arg(long)]
        review: Option<String>,
    },
    /// Interactive incremental search against the movie catalog.
    Search { query: Option<String> },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings(&cli.config);
    if let Some(api_url) = cli.api_url {
        settings.api_url = api_url;
    }
    settings.validate()?;

    let service = ServiceClient::new(&settings.api_url, settings.session_cookie.as_deref())
        .context("failed to build list service client")?;
    let session = Arc::new(HttpSession::new(service.clone()));
    let store = Arc::new(HttpListStore::new(service));
    let mut dashboard = Dashboard::new(store, session.clone());

    match cli.command {
        Command::Login => {
            println!("Sign in at {}", session.login_url()?);
            println!("then export the session cookie as CINETRACKR_SESSION");
        }
        Command::Logout => {
            if dashboard.logout().await? == Navigation::Login {
                println!("Logged out. Sign in again at {}", session.login_url()?);
            }
        }
        Command::List => match dashboard.enter().await.context("failed to fetch movies")? {
            Navigation::Dashboard => print!("{}", render::dashboard_lists(&dashboard)),
            Navigation::Login => {
                println!("Not signed in. Sign in at {}", session.login_url()?);
            }
        },
        Command::Add { title } => {
            let movie = dashboard.add_title(&title).await?;
            println!("Added {}", render::movie_line(&movie));
        }
        Command::Watch { id } => {
            dashboard.load().await.context("failed to fetch movies")?;
            dashboard.mark_as_watched(MovieId(id)).await?;
            print!("{}", render::dashboard_lists(&dashboard));
        }
        Command::Delete { id } => {
            dashboard.delete(MovieId(id)).await?;
            println!("Deleted movie {id}");
        }
        Command::Review { id, rating, review } => {
            dashboard.load().await.context("failed to fetch movies")?;
            dashboard
                .update_review(MovieId(id), rating, review)
                .await?;
            if let Some(movie) = dashboard.movies().iter().find(|m| m.id == MovieId(id)) {
                println!("Updated {}", render::movie_line(movie));
            }
        }
        Command::Search { query } => {
            let api_key = settings
                .omdb_api_key
                .clone()
                .context("no OMDb API key configured; set OMDB_API_KEY or omdb_api_key")?;
            let catalog = OmdbCatalog::with_base_url(&settings.omdb_base_url, api_key)?;
            if let Err(err) = dashboard.load().await {
                eprintln!("could not load your lists: {err}");
            }
            let search = SearchController::new(Arc::new(catalog), settings.search_debounce());
            prompt::run(search, &mut dashboard, query).await?;
        }
    }

    Ok(())
}
