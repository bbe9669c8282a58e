// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.
//
// Settings are read from `config.json` in the data directory and then
// overridden by `DRAMTAG_*` environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;

/// File name of the persisted configuration inside the data directory.
pub const CONFIG_FILE: &str = "config.json";

/// Persistent application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Upstream catalogue site; detail pages live at `{base_url}/whisky/{id}`.
    pub base_url: String,
    /// Structured API root. The API strategy is skipped when unset.
    pub api_base_url: Option<String>,
    /// Budget for one acquisition attempt, in seconds.
    pub attempt_timeout_secs: u64,
    /// Budget for the best-effort session warm-up request, in seconds.
    pub warmup_timeout_secs: u64,
    /// Photo id preferred over every other photo of a bottle.
    pub preferred_photo_id: Option<u64>,
    /// Try the cookie-carrying session strategy.
    pub session_fetch: bool,
    /// Try the structured API strategy (needs `api_base_url`).
    pub api_fetch: bool,
    /// Try the plain HTML detail-page strategy.
    pub html_fetch: bool,
    /// Concurrent ids in a batch.
    pub batch_workers: usize,
    /// Window for one batch item before it is abandoned, in seconds.
    pub batch_item_timeout_secs: u64,
    /// Extra directories searched for label fonts.
    pub font_dirs: Vec<PathBuf>,
    /// User-Agent sent upstream.
    pub user_agent: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.whiskybase.com".into(),
            api_base_url: None,
            attempt_timeout_secs: 15,
            warmup_timeout_secs: 10,
            preferred_photo_id: Some(479313),
            session_fetch: true,
            api_fetch: true,
            html_fetch: true,
            batch_workers: 4,
            batch_item_timeout_secs: 60,
            font_dirs: Vec::new(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .into(),
        }
    }
}

impl AppConfig {
    /// Load `config.json` from `data_dir`, falling back to defaults when the
    /// file is missing or unreadable, then apply environment overrides.
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(CONFIG_FILE);
        let base = match Self::read_file(&path) {
            Ok(Some(cfg)) => cfg,
            Ok(None) => Self::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                Self::default()
            }
        };
        base.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Parse a config file. `Ok(None)` when it does not exist.
    pub fn read_file(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(path)?;
        let cfg = serde_json::from_str(&data)?;
        debug!(path = %path.display(), "config loaded");
        Ok(Some(cfg))
    }

    /// Write the config as pretty JSON into `data_dir`.
    pub fn persist(&self, data_dir: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(data_dir.join(CONFIG_FILE), json)?;
        Ok(())
    }

    /// Apply `DRAMTAG_*` overrides read through `lookup`.
    ///
    /// Unparsable numeric values are logged and ignored.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("DRAMTAG_BASE_URL").filter(|v| !v.trim().is_empty()) {
            self.base_url = url.trim().trim_end_matches('/').to_owned();
        }
        if let Some(url) = lookup("DRAMTAG_API_BASE_URL") {
            let url = url.trim().trim_end_matches('/').to_owned();
            self.api_base_url = (!url.is_empty()).then_some(url);
        }
        if let Some(raw) = lookup("DRAMTAG_TIMEOUT_SECONDS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.attempt_timeout_secs = secs,
                _ => warn!(value = %raw, "ignoring invalid DRAMTAG_TIMEOUT_SECONDS"),
            }
        }
        if let Some(raw) = lookup("DRAMTAG_OFFLINE")
            && matches!(raw.trim(), "1" | "true" | "yes")
        {
            self.session_fetch = false;
            self.api_fetch = false;
            self.html_fetch = false;
        }
        self
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs.max(1))
    }

    pub fn warmup_timeout(&self) -> Duration {
        Duration::from_secs(self.warmup_timeout_secs.max(1))
    }

    pub fn batch_item_timeout(&self) -> Duration {
        Duration::from_secs(self.batch_item_timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn env_overrides_urls_and_timeout() {
        let cfg = AppConfig::default().with_env_overrides(env(&[
            ("DRAMTAG_BASE_URL", "https://mirror.example/"),
            ("DRAMTAG_API_BASE_URL", "https://api.example/v1"),
            ("DRAMTAG_TIMEOUT_SECONDS", "7"),
        ]));
        assert_eq!(cfg.base_url, "https://mirror.example");
        assert_eq!(cfg.api_base_url.as_deref(), Some("https://api.example/v1"));
        assert_eq!(cfg.attempt_timeout(), Duration::from_secs(7));
    }

    #[test]
    fn invalid_timeout_is_ignored() {
        let cfg = AppConfig::default()
            .with_env_overrides(env(&[("DRAMTAG_TIMEOUT_SECONDS", "soon")]));
        assert_eq!(cfg.attempt_timeout_secs, 15);
    }

    #[test]
    fn offline_disables_every_strategy() {
        let cfg = AppConfig::default().with_env_overrides(env(&[("DRAMTAG_OFFLINE", "1")]));
        assert!(!cfg.session_fetch && !cfg.api_fetch && !cfg.html_fetch);
    }

    #[test]
    fn persist_and_reload_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AppConfig {
            batch_workers: 9,
            ..Default::default()
        };
        cfg.persist(dir.path()).unwrap();
        let loaded = AppConfig::read_file(&dir.path().join(CONFIG_FILE))
            .unwrap()
            .unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), r#"{"batch_workers": 2}"#).unwrap();
        let loaded = AppConfig::read_file(&dir.path().join(CONFIG_FILE))
            .unwrap()
            .unwrap();
        assert_eq!(loaded.batch_workers, 2);
        assert_eq!(loaded.base_url, "https://www.whiskybase.com");
    }

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AppConfig::read_file(&dir.path().join("nope.json")).unwrap().is_none());
    }
}
