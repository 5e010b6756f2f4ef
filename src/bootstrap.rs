use rusqlite::Connection;
use tracing::{error, info, warn};

use crate::cache::{self, Snapshot};
use crate::feed::{self, FeedSource};
use crate::product::Product;
use crate::render::Surface;

/// How the session got its products.
#[derive(Debug)]
pub enum Bootstrap {
    /// `cached` is false when the snapshot could not be written to the cache.
    Fetched { snapshot: Snapshot, cached: bool },
    Cached(Snapshot),
    Failed(anyhow::Error),
}

impl Bootstrap {
    pub fn snapshot(self) -> Option<Snapshot> {
        match self {
            Bootstrap::Fetched { snapshot: s, .. } | Bootstrap::Cached(s) => Some(s),
            Bootstrap::Failed(_) => None,
        }
    }
}

/// Startup: a fresh cache wins, otherwise fetch once with the loading indicator up.
/// `force` skips the cache lookup. No retry on failure.
pub async fn start<F>(
    surface: &mut Surface,
    conn: Option<&Connection>,
    source: &F,
    freshness_ms: i64,
    force: bool,
) -> Bootstrap
where
    F: FeedSource + Sync + ?Sized,
{
    if !force {
        if let Some(snapshot) = conn.and_then(|c| cache::load(c, freshness_ms)) {
            info!("Loaded {} products from cache", snapshot.products.len());
            return Bootstrap::Cached(snapshot);
        }
    }

    surface.show_loading("Fetching product feed");
    let outcome = fetch(conn, source).await;
    surface.hide_loading();

    if let Bootstrap::Failed(e) = &outcome {
        error!("Failed to load product feed: {:#}", e);
        surface.show_error();
    }
    outcome
}

async fn fetch<F>(conn: Option<&Connection>, source: &F) -> Bootstrap
where
    F: FeedSource + Sync + ?Sized,
{
    let text = match source.fetch().await {
        Ok(t) => t,
        Err(e) => return Bootstrap::Failed(e),
    };

    let products = feed::parse_feed(&text);
    info!("Fetched {} products", products.len());

    let saved = conn.map(|c| cache::save(c, &products));
    let (snapshot, cached) = match saved {
        Some(Ok(s)) => (s, true),
        Some(Err(e)) => {
            warn!("Could not cache products: {:#}", e);
            (fresh(products), false)
        }
        None => (fresh(products), false),
    };
    Bootstrap::Fetched { snapshot, cached }
}

fn fresh(products: Vec<Product>) -> Snapshot {
    Snapshot {
        products,
        timestamp: cache::now_ms(),
    }
}
