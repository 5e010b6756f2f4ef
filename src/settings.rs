use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use config::{Config, Environment};
use serde::Deserialize;
use tracing::warn;

use crate::cache::FRESHNESS_MS;
use crate::feed::DEFAULT_FEED_URL;

const CACHE_PATH: &str = "data/katalog.sqlite";
const ENV_PREFIX: &str = "KATALOG";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    pub feed_url: String,
    pub cache_path: PathBuf,
    pub freshness_ms: i64,
    pub fetch_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            cache_path: PathBuf::from(CACHE_PATH),
            freshness_ms: FRESHNESS_MS,
            fetch_timeout_secs: None,
        }
    }
}

impl Settings {
    /// Defaults overlaid with `KATALOG_*` environment variables.
    pub fn load() -> Self {
        Self::from_env(Environment::with_prefix(ENV_PREFIX))
    }

    fn from_env(env: Environment) -> Self {
        match Self::build(env.try_parsing(true)) {
            Ok(s) => s,
            Err(e) => {
                warn!("Ignoring invalid {}_* settings: {}", ENV_PREFIX, e);
                Self::default()
            }
        }
    }

    fn build(env: Environment) -> Result<Self> {
        let d = Self::default();
        let settings = Config::builder()
            .set_default("feed_url", d.feed_url)?
            .set_default("cache_path", d.cache_path.to_string_lossy().to_string())?
            .set_default("freshness_ms", d.freshness_ms)?
            .add_source(env)
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    pub fn with_overrides(mut self, feed_url: Option<String>, cache_path: Option<PathBuf>) -> Self {
        if let Some(url) = feed_url {
            self.feed_url = url;
        }
        if let Some(path) = cache_path {
            self.cache_path = path;
        }
        self
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(map))
    }

    #[test]
    fn defaults_without_env() {
        assert_eq!(Settings::from_env(env(&[])), Settings::default());
    }

    #[test]
    fn env_overrides_defaults() {
        let s = Settings::from_env(env(&[
            ("KATALOG_FEED_URL", "https://example.com/feed.csv"),
            ("KATALOG_FRESHNESS_MS", "5000"),
            ("KATALOG_FETCH_TIMEOUT_SECS", "30"),
        ]));
        assert_eq!(s.feed_url, "https://example.com/feed.csv");
        assert_eq!(s.freshness_ms, 5000);
        assert_eq!(s.fetch_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(s.cache_path, PathBuf::from(CACHE_PATH));
    }

    #[test]
    fn invalid_env_falls_back() {
        let s = Settings::from_env(env(&[("KATALOG_FRESHNESS_MS", "soon")]));
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn cli_overrides_win() {
        let s = Settings::default().with_overrides(Some("http://local/feed".into()), None);
        assert_eq!(s.feed_url, "http://local/feed");
        assert_eq!(s.cache_path, PathBuf::from(CACHE_PATH));
    }
}
