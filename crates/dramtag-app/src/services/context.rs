// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-process application context: loaded config plus the resolver and
// renderer built from it. Commands borrow it; nothing in it is mutated after
// start-up.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dramtag_core::AppConfig;
use dramtag_core::error::{DramtagError, Result};
use dramtag_fetch::Resolver;
use dramtag_render::LabelRenderer;
use tracing::{debug, info};

use super::data_dir;

pub struct AppContext {
    pub config: AppConfig,
    pub data_dir: PathBuf,
    pub resolver: Arc<Resolver>,
    pub renderer: Arc<LabelRenderer>,
}

impl AppContext {
    /// Load config from `config_path` (or the data directory) and wire up
    /// services. `offline` disables every upstream strategy.
    pub fn init(config_path: Option<&Path>, offline: bool) -> Result<Self> {
        let dir = data_dir::data_dir();
        let mut config = match config_path {
            Some(path) => AppConfig::read_file(path)?
                .ok_or_else(|| {
                    DramtagError::Validation(format!("config file {} not found", path.display()))
                })?
                .with_env_overrides(|key| std::env::var(key).ok()),
            None => AppConfig::load(&dir),
        };
        if offline {
            config.session_fetch = false;
            config.api_fetch = false;
            config.html_fetch = false;
        }
        info!(path = %dir.display(), base_url = %config.base_url, "configuration loaded");
        Self::with_config(config, dir)
    }

    pub fn with_config(config: AppConfig, data_dir: PathBuf) -> Result<Self> {
        let resolver = Resolver::from_config(&config)?;
        let renderer = LabelRenderer::with_font_dirs(&config.font_dirs);
        debug!(builtin_font = renderer.font().is_builtin(), "renderer ready");
        Ok(Self {
            config,
            data_dir,
            resolver: Arc::new(resolver),
            renderer: Arc::new(renderer),
        })
    }

    /// Context with every upstream strategy disabled and the bitmap font.
    #[cfg(test)]
    pub fn offline(data_dir: PathBuf) -> Self {
        let config = AppConfig {
            session_fetch: false,
            api_fetch: false,
            html_fetch: false,
            ..AppConfig::default()
        };
        Self {
            resolver: Arc::new(Resolver::builder(&config.base_url).build()),
            renderer: Arc::new(LabelRenderer::builtin()),
            config,
            data_dir,
        }
    }
}
