//! CLI command implementations

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use cinetrend_core::{
    CinetrendConfig, CinetrendError, InMemorySearchCountStore, RuntimeMode, SearchCountStore,
    TrendingEntry, TrendingFeed, TrendingService, storage,
};
use cinetrend_search::{
    DetailView, HttpTrendingClient, ImageUrls, ListingPhase, MovieDetails, SearchOrchestrator,
    SearchView, format_money, providers, spawn_search_session,
};
use clap::Subcommand;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the trending HTTP service
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
        /// Path of the search-count table
        #[arg(long)]
        store: Option<PathBuf>,
        /// Keep counts in memory only
        #[arg(long)]
        memory: bool,
    },
    /// Search the catalog and record the top hit
    Search {
        /// Search term
        term: String,
    },
    /// Browse popular movies
    Popular,
    /// Show the trending searches
    Trending,
    /// Show details for one movie
    Details {
        /// Catalog id of the movie
        id: u64,
    },
    /// Type queries line by line with live debounced results
    Interactive,
}

/// Handle the CLI command
///
/// # Errors
/// Returns the failure of the command that was run
pub async fn handle_command(command: Commands, config: CinetrendConfig) -> anyhow::Result<()> {
    match command {
        Commands::Serve {
            host,
            port,
            store,
            memory,
        } => serve(config, host, port, store, memory).await,
        Commands::Search { term } => search(config, &term).await,
        Commands::Popular => search(config, "").await,
        Commands::Trending => show_trending(config).await,
        Commands::Details { id } => show_details(config, id).await,
        Commands::Interactive => interactive(config).await,
    }
}

async fn serve(
    mut config: CinetrendConfig,
    host: Option<String>,
    port: Option<u16>,
    store_path: Option<PathBuf>,
    memory: bool,
) -> anyhow::Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(path) = store_path {
        config.trending.store_path = path;
    }

    let store: Arc<dyn SearchCountStore> = if memory {
        Arc::new(InMemorySearchCountStore::new())
    } else {
        storage::from_config(&config)
            .await
            .context("Failed to open search-count store")?
    };

    cinetrend_web::run_server(config, store).await?;
    Ok(())
}

/// Builds the orchestrator for client commands.
///
/// Production talks to the real catalog and the remote trending service;
/// development uses the demo catalog and an in-process trending service.
fn build_orchestrator(config: &CinetrendConfig) -> anyhow::Result<SearchOrchestrator> {
    if config.runtime_mode.requires_catalog_token() && config.catalog.bearer_token.is_none() {
        return Err(CinetrendError::Configuration {
            reason: "CINETREND_TMDB_TOKEN must be set in production mode".to_string(),
        }
        .into());
    }

    let catalog = providers::from_config(config).map_err(|e| CinetrendError::Catalog {
        reason: e.to_string(),
    })?;
    let trending: Arc<dyn TrendingFeed> = match config.runtime_mode {
        RuntimeMode::Production => Arc::new(
            HttpTrendingClient::new(
                config.trending.service_url.clone(),
                config.trending.request_timeout,
            )
            .map_err(|e| CinetrendError::Configuration {
                reason: e.to_string(),
            })?,
        ),
        RuntimeMode::Development => Arc::new(TrendingService::new(
            Arc::new(InMemorySearchCountStore::new()),
            config.trending.top_n,
        )),
    };

    Ok(SearchOrchestrator::new(
        catalog,
        trending,
        ImageUrls::from_config(&config.catalog),
    ))
}

async fn search(config: CinetrendConfig, term: &str) -> anyhow::Result<()> {
    let orchestrator = build_orchestrator(&config)?;
    let view = orchestrator.run_query(term).await;
    print_listing(&view);
    Ok(())
}

async fn show_trending(config: CinetrendConfig) -> anyhow::Result<()> {
    let orchestrator = build_orchestrator(&config)?;
    print_trending(&orchestrator.load_trending().await);
    Ok(())
}

async fn show_details(config: CinetrendConfig, id: u64) -> anyhow::Result<()> {
    let orchestrator = build_orchestrator(&config)?;
    match orchestrator.movie_details(id).await {
        DetailView::Loaded(details) => {
            print_details(&details, orchestrator.images(), config.search.detail_cast_limit);
            Ok(())
        }
        DetailView::NotFound { id } => bail!("Movie {id} was not found"),
        DetailView::Error { message } => bail!(message),
    }
}

async fn interactive(config: CinetrendConfig) -> anyhow::Result<()> {
    let orchestrator = Arc::new(build_orchestrator(&config)?);
    let handle = spawn_search_session(orchestrator, config.search.debounce_window);
    let mut views = handle.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut rendered: Option<(String, ListingPhase, usize)> = None;

    println!("Type a query per line; an empty line browses popular movies. Ctrl-D quits.");

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => handle.input(line).await?,
                None => break,
            },
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                let key = (view.settled_query.clone(), view.phase, view.trending.len());
                if rendered.as_ref() != Some(&key) {
                    render_view(&view);
                    rendered = Some(key);
                }
            }
        }
    }

    let view = handle.shutdown().await;
    render_view(&view);
    Ok(())
}

fn render_view(view: &SearchView) {
    if view.is_loading() {
        println!("Loading '{}'...", view.settled_query);
        return;
    }
    print_listing(view);
    if !view.trending.is_empty() {
        print_trending(&view.trending);
    }
}

fn print_listing(view: &SearchView) {
    if let Some(error) = &view.error {
        println!("{error}");
        return;
    }

    if view.settled_query.is_empty() {
        println!("Popular movies:");
    } else {
        println!("Results for '{}':", view.settled_query);
    }
    if view.phase == ListingPhase::Displayed && view.movies.is_empty() {
        println!("  No movies found");
    }
    for movie in &view.movies {
        println!(
            "  {:>8}  {} ({})  {}  {}",
            movie.id,
            movie.title,
            movie.release_year().unwrap_or("N/A"),
            movie.rating_label(),
            movie.original_language
        );
    }
}

fn print_trending(entries: &[TrendingEntry]) {
    if entries.is_empty() {
        println!("No trending searches yet");
        return;
    }
    println!("Trending:");
    for (rank, entry) in entries.iter().enumerate() {
        println!(
            "  {}. {} (movie {}, {} searches)",
            rank + 1,
            entry.search_term,
            entry.item_id,
            entry.count
        );
    }
}

fn print_details(details: &MovieDetails, images: &ImageUrls, cast_limit: usize) {
    let item = &details.item;
    println!("{}", item.title);
    if let Some(tagline) = &details.tagline {
        println!("  \"{tagline}\"");
    }
    println!(
        "  {} | {} | {} | {}",
        item.release_year().unwrap_or("N/A"),
        details
            .runtime
            .map(|minutes| format!("{}h {}m", minutes / 60, minutes % 60))
            .unwrap_or_else(|| "N/A".to_string()),
        item.original_language,
        item.rating_label()
    );
    if !details.genres.is_empty() {
        let genres: Vec<&str> = details.genres.iter().map(|g| g.name.as_str()).collect();
        println!("  Genres: {}", genres.join(", "));
    }
    if let Some(overview) = &details.overview {
        println!("\n{overview}\n");
    }
    println!("  Status: {}", details.status.as_deref().unwrap_or("N/A"));
    println!("  Countries: {}", details.countries_label());
    println!("  Budget: {}", format_money(details.budget));
    println!("  Revenue: {}", format_money(details.revenue));
    if !details.production_companies.is_empty() {
        let companies: Vec<&str> = details
            .production_companies
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        println!("  Production: {}", companies.join(", "));
    }
    if let Some(homepage) = &details.homepage {
        println!("  Homepage: {homepage}");
    }
    println!("  Poster: {}", images.poster(item.poster_path.as_deref()));
    if let Some(backdrop) = images.backdrop(details.backdrop_path.as_deref()) {
        println!("  Backdrop: {backdrop}");
    }

    let cast = details.top_cast(cast_limit);
    if !cast.is_empty() {
        println!("  Cast:");
        for member in cast {
            match &member.character {
                Some(character) => println!("    {} as {character}", member.name),
                None => println!("    {}", member.name),
            }
        }
    }
    if let Some(url) = details.trailer().and_then(|video| video.watch_url()) {
        println!("  Trailer: {url}");
    }
}
