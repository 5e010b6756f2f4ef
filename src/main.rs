mod bootstrap;
mod cache;
mod catalog;
mod feed;
mod pager;
mod product;
mod render;
mod session;
mod settings;

use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use tokio::io::BufReader;
use tracing::{info, warn};

use bootstrap::Bootstrap;
use catalog::{Action, Catalog};
use feed::HttpFeed;
use render::{html, Surface, ERROR_MESSAGE};
use settings::Settings;

#[derive(Parser)]
#[command(name = "katalog", about = "Searchable, paginated product catalog from a CSV feed")]
struct Cli {
    /// Feed URL (overrides KATALOG_FEED_URL)
    #[arg(long, global = true)]
    feed_url: Option<String>,
    /// Cache database path (overrides KATALOG_CACHE_PATH)
    #[arg(long, global = true)]
    cache_path: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one page of the catalog as HTML
    Render {
        /// Search code or title
        #[arg(short, long)]
        query: Option<String>,
        /// Page to show, starting at 1
        #[arg(short, long, default_value = "1")]
        page: usize,
        /// Write the page here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Browse the catalog interactively
    Browse {
        /// Keep an HTML rendering of the current view at this path
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Fetch the feed now, ignoring the cache
    Refresh,
    /// Show the cache slot
    Cache {
        /// Empty the cache slot
        #[arg(long)]
        clear: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load().with_overrides(cli.feed_url, cli.cache_path);

    let result = match cli.command {
        Commands::Render { query, page, out } => {
            let conn = open_cache(&settings);
            let source = HttpFeed::new(&settings.feed_url, settings.fetch_timeout())?;
            let mut surface = Surface::full();
            let outcome = bootstrap::start(
                &mut surface,
                conn.as_ref(),
                &source,
                settings.freshness_ms,
                false,
            )
            .await;

            let mut query_text = String::new();
            if let Some(snapshot) = outcome.snapshot() {
                let mut catalog = Catalog::new(snapshot);
                if let Some(q) = query {
                    catalog.dispatch(Action::Search(q));
                }
                if page != 1 {
                    catalog.dispatch(Action::Goto(page));
                }
                html::render(&mut surface, &catalog);
                query_text = catalog.query().to_string();
            }

            match &out {
                Some(path) => {
                    session::write_page(path, &surface, &query_text)?;
                    info!("Wrote {}", path.display());
                }
                None => {
                    let mut stdout = std::io::stdout().lock();
                    stdout.write_all(html::document(&surface, &query_text).as_bytes())?;
                    stdout.flush()?;
                }
            }

            if surface.error_visible() {
                bail!(ERROR_MESSAGE);
            }
            Ok(())
        }
        Commands::Browse { out } => {
            let conn = open_cache(&settings);
            let source = HttpFeed::new(&settings.feed_url, settings.fetch_timeout())?;
            let mut surface = Surface::full();
            let outcome = bootstrap::start(
                &mut surface,
                conn.as_ref(),
                &source,
                settings.freshness_ms,
                false,
            )
            .await;

            let Some(snapshot) = outcome.snapshot() else {
                if let Some(path) = &out {
                    session::write_page(path, &surface, "")?;
                }
                bail!(ERROR_MESSAGE);
            };

            let mut catalog = Catalog::new(snapshot);
            let stdin = BufReader::new(tokio::io::stdin());
            let mut stdout = std::io::stdout();
            session::run(&mut catalog, &mut surface, stdin, &mut stdout, out.as_deref()).await
        }
        Commands::Refresh => {
            let conn = open_cache(&settings);
            let source = HttpFeed::new(&settings.feed_url, settings.fetch_timeout())?;
            let outcome = bootstrap::start(
                &mut Surface::default(),
                conn.as_ref(),
                &source,
                settings.freshness_ms,
                true,
            )
            .await;

            match outcome {
                Bootstrap::Fetched { snapshot, cached } => {
                    println!(
                        "Fetched {} products{}",
                        snapshot.products.len(),
                        if cached { " (cached)" } else { " (not cached)" }
                    );
                    Ok(())
                }
                Bootstrap::Cached(_) => Ok(()),
                Bootstrap::Failed(_) => bail!(ERROR_MESSAGE),
            }
        }
        Commands::Cache { clear } => {
            let conn = cache::connect(&settings.cache_path)?;
            println!("Cache: {}", settings.cache_path.display());
            if clear {
                let removed = cache::clear(&conn)?;
                println!("{}", if removed { "Cleared." } else { "Already empty." });
                return Ok(());
            }
            match cache::status(&conn, cache::now_ms(), settings.freshness_ms)
                .context("Failed to read cache slot")?
            {
                Some(s) => {
                    println!("Products:  {}", s.products);
                    println!("Age:       {}", format_duration(s.age_ms));
                    println!("Fresh:     {}", if s.fresh { "yes" } else { "no" });
                }
                None => println!("Empty."),
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        info!("Done in {}", format_duration(elapsed.as_millis() as i64));
    }

    result
}

/// A cache that cannot be opened just means every start is a miss.
fn open_cache(settings: &Settings) -> Option<Connection> {
    match cache::connect(&settings.cache_path) {
        Ok(conn) => Some(conn),
        Err(e) => {
            warn!("Cache unavailable, continuing without it: {:#}", e);
            None
        }
    }
}

fn format_duration(ms: i64) -> String {
    let secs = ms.max(0) / 1000;
    if secs < 60 {
        format!("{:.1}s", ms.max(0) as f64 / 1000.0)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
