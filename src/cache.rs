use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::product::Product;

/// One hour.
pub const FRESHNESS_MS: i64 = 3_600_000;

const SLOT: &str = "product_cache";

/// The full product list together with the moment it was obtained (epoch ms).
/// This is also the exact JSON stored in the cache slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub products: Vec<Product>,
    pub timestamp: i64,
}

pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create cache directory {}", dir.display()))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open cache {}", path.display()))?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS kv_store (
            key        TEXT PRIMARY KEY,
            value      TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )?;
    Ok(())
}

// ── Slot access ──

pub fn save(conn: &Connection, products: &[Product]) -> Result<Snapshot> {
    save_at(conn, products, now_ms())
}

/// Overwrite the slot with `products`, stamped with `now`.
pub fn save_at(conn: &Connection, products: &[Product], now: i64) -> Result<Snapshot> {
    let snapshot = Snapshot {
        products: products.to_vec(),
        timestamp: now,
    };
    let value = serde_json::to_string(&snapshot)?;
    conn.execute(
        "INSERT OR REPLACE INTO kv_store (key, value, updated_at)
         VALUES (?1, ?2, datetime('now'))",
        rusqlite::params![SLOT, value],
    )?;
    debug!("Cached {} products", snapshot.products.len());
    Ok(snapshot)
}

pub fn load(conn: &Connection, freshness_ms: i64) -> Option<Snapshot> {
    load_at(conn, now_ms(), freshness_ms)
}

/// Return the cached snapshot if it is younger than `freshness_ms` at time `now`.
/// Unreadable or malformed entries count as a miss.
pub fn load_at(conn: &Connection, now: i64, freshness_ms: i64) -> Option<Snapshot> {
    let snapshot = match read_slot(conn) {
        Ok(Some(s)) => s,
        Ok(None) => return None,
        Err(e) => {
            warn!("Ignoring unreadable product cache: {:#}", e);
            return None;
        }
    };

    let age = now - snapshot.timestamp;
    if age < freshness_ms {
        debug!("Cache hit ({} products, {}s old)", snapshot.products.len(), age / 1000);
        Some(snapshot)
    } else {
        debug!("Cache stale ({}s old)", age / 1000);
        None
    }
}

fn read_slot(conn: &Connection) -> Result<Option<Snapshot>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT value FROM kv_store WHERE key = ?1",
            rusqlite::params![SLOT],
            |row| row.get(0),
        )
        .optional()?;
    match raw {
        Some(json) => Ok(Some(
            serde_json::from_str(&json).context("Malformed cache entry")?,
        )),
        None => Ok(None),
    }
}

pub fn clear(conn: &Connection) -> Result<bool> {
    let removed = conn.execute("DELETE FROM kv_store WHERE key = ?1", rusqlite::params![SLOT])?;
    Ok(removed > 0)
}

// ── Status ──

pub struct CacheStatus {
    pub products: usize,
    pub age_ms: i64,
    pub fresh: bool,
}

/// Describe the slot without treating staleness as absence. `Ok(None)` when empty.
pub fn status(conn: &Connection, now: i64, freshness_ms: i64) -> Result<Option<CacheStatus>> {
    Ok(read_slot(conn)?.map(|s| {
        let age_ms = now - s.timestamp;
        CacheStatus {
            products: s.products.len(),
            age_ms,
            fresh: age_ms < freshness_ms,
        }
    }))
}
