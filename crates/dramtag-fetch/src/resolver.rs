// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Record resolution.
//
// Tries each acquisition strategy in priority order under its own timeout,
// normalizes the first usable payload and falls back to the deterministic
// catalogue when every source failed. `resolve` never fails.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dramtag_core::config::AppConfig;
use dramtag_core::error::{AcquisitionError, DramtagError, Result};
use dramtag_core::types::{CanonicalRecord, ManualFields, Provenance, detail_url, non_blank};
use tracing::{debug, info, instrument, warn};

use crate::fallback::FallbackCatalog;
use crate::http::{DirectHttpFetch, StructuredApiFetch, build_client};
use crate::normalize::Normalizer;
use crate::session::{HttpSessionProvider, SessionedBrowserFetch};
use crate::strategy::AcquisitionStrategy;

/// Resolves ids to canonical records.
pub struct Resolver {
    strategies: Vec<Box<dyn AcquisitionStrategy>>,
    normalizer: Normalizer,
    catalog: FallbackCatalog,
    attempt_budget: Duration,
    base_url: String,
}

impl Resolver {
    /// Start building a resolver for `base_url` with no strategies.
    pub fn builder(base_url: impl Into<String>) -> ResolverBuilder {
        ResolverBuilder::new(base_url)
    }

    /// Wire up the strategy chain enabled in `config`.
    ///
    /// Order: sessioned page fetch, structured API (only with an API base
    /// URL), direct detail page.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let mut builder = Self::builder(&config.base_url)
            .preferred_photo_id(config.preferred_photo_id)
            .attempt_budget(config.attempt_timeout());

        if config.session_fetch {
            let sessions = Arc::new(HttpSessionProvider::new(&config.user_agent));
            builder = builder.strategy(SessionedBrowserFetch::new(
                sessions,
                &config.base_url,
                config.warmup_timeout(),
            ));
        }

        let needs_client =
            (config.api_fetch && config.api_base_url.is_some()) || config.html_fetch;
        if needs_client {
            let client = build_client(&config.user_agent, false)?;
            if config.api_fetch
                && let Some(api) = &config.api_base_url
            {
                builder = builder.strategy(StructuredApiFetch::new(client.clone(), api));
            }
            if config.html_fetch {
                builder = builder.strategy(DirectHttpFetch::new(client, &config.base_url));
            }
        }

        let resolver = builder.build();
        info!(strategies = ?resolver.strategy_names(), "resolver ready");
        Ok(resolver)
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upper bound on the time one `resolve` call can take.
    pub fn chain_budget(&self) -> Duration {
        self.attempt_budget
            .saturating_mul(u32::try_from(self.strategies.len()).unwrap_or(u32::MAX))
    }

    /// Resolve `id` through the strategy chain. Always returns a record.
    #[instrument(skip(self))]
    pub async fn resolve(&self, id: i64) -> CanonicalRecord {
        let source_url = detail_url(&self.base_url, id);

        for strategy in &self.strategies {
            let started = Instant::now();
            let outcome = tokio::time::timeout(
                self.attempt_budget,
                strategy.attempt(id, self.attempt_budget),
            )
            .await
            .unwrap_or(Err(AcquisitionError::Timeout));
            let elapsed_ms = started.elapsed().as_millis() as u64;

            let payload = match outcome {
                Ok(payload) => payload,
                Err(e) => {
                    warn!(
                        strategy = strategy.name(),
                        reason = e.reason(),
                        error = %e,
                        elapsed_ms,
                        "acquisition failed, trying next source"
                    );
                    continue;
                }
            };

            match self.normalizer.normalize(&payload, id) {
                Ok(normalized) => {
                    info!(
                        strategy = strategy.name(),
                        payload = payload.kind(),
                        elapsed_ms,
                        "record resolved"
                    );
                    return normalized.into_record(id, source_url, strategy.provenance());
                }
                Err(e) => {
                    warn!(
                        strategy = strategy.name(),
                        payload = payload.kind(),
                        error = %e,
                        "payload not usable, trying next source"
                    );
                }
            }
        }

        warn!("no upstream source answered, using fallback catalogue");
        self.fallback(id)
    }

    /// Deterministic placeholder for `id`.
    pub fn fallback(&self, id: i64) -> CanonicalRecord {
        self.catalog.record(id, &self.base_url)
    }

    /// Build a record from caller-supplied fields without touching the network.
    ///
    /// Name, category and strength are required. A missing id becomes `0`.
    pub fn resolve_manual(&self, fields: &ManualFields) -> Result<CanonicalRecord> {
        fields.validate()?;
        let id = fields.id.unwrap_or(0);
        // Name and category are non-blank once validated.
        let required = |value: &Option<String>| non_blank(value).unwrap_or_default().to_owned();

        debug!(id, "manual record built");
        Ok(CanonicalRecord {
            id,
            name: required(&fields.name),
            category: required(&fields.category),
            strength: non_blank(&fields.strength).map(str::to_owned),
            age: non_blank(&fields.age).map(str::to_owned),
            region: None,
            note: None,
            image_url: None,
            source_url: detail_url(&self.base_url, id),
            provenance: Provenance::Manual,
        })
    }

    /// Form semantics: complete manual fields win, else the id is resolved.
    ///
    /// Fails with `Validation` when neither usable manual fields nor an id
    /// were supplied.
    pub async fn resolve_request(
        &self,
        id: Option<i64>,
        manual: &ManualFields,
    ) -> Result<CanonicalRecord> {
        if manual.is_complete() {
            let fields = ManualFields {
                id: manual.id.or(id),
                ..manual.clone()
            };
            return self.resolve_manual(&fields);
        }
        match id.or(manual.id) {
            Some(id) => Ok(self.resolve(id).await),
            None if manual.is_empty() => Err(DramtagError::Validation(
                "either an id or name, category and strength are required".into(),
            )),
            // Incomplete fields: report exactly what is missing.
            None => self.resolve_manual(manual),
        }
    }
}

/// Step-by-step construction, mainly for tests and custom chains.
pub struct ResolverBuilder {
    strategies: Vec<Box<dyn AcquisitionStrategy>>,
    base_url: String,
    preferred_photo_id: Option<u64>,
    catalog: FallbackCatalog,
    attempt_budget: Duration,
}

impl ResolverBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        let defaults = AppConfig::default();
        Self {
            strategies: Vec::new(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            preferred_photo_id: defaults.preferred_photo_id,
            catalog: FallbackCatalog::builtin(),
            attempt_budget: defaults.attempt_timeout(),
        }
    }

    /// Append a strategy at the lowest priority so far.
    pub fn strategy(mut self, strategy: impl AcquisitionStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn preferred_photo_id(mut self, id: Option<u64>) -> Self {
        self.preferred_photo_id = id;
        self
    }

    pub fn catalog(mut self, catalog: FallbackCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn attempt_budget(mut self, budget: Duration) -> Self {
        self.attempt_budget = budget;
        self
    }

    pub fn build(self) -> Resolver {
        Resolver {
            normalizer: Normalizer::new(&self.base_url, self.preferred_photo_id),
            strategies: self.strategies,
            catalog: self.catalog,
            attempt_budget: self.attempt_budget,
            base_url: self.base_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::RawPayload;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const BASE: &str = "https://www.whiskybase.com";

    /// Strategy double: optional delay, then a canned outcome.
    struct Canned {
        name: &'static str,
        provenance: Provenance,
        delay: Duration,
        outcome: std::result::Result<RawPayload, AcquisitionError>,
        calls: Arc<AtomicUsize>,
    }

    impl Canned {
        fn new(
            name: &'static str,
            provenance: Provenance,
            outcome: std::result::Result<RawPayload, AcquisitionError>,
        ) -> Self {
            Self {
                name,
                provenance,
                delay: Duration::ZERO,
                outcome,
                calls: Arc::default(),
            }
        }

        fn delayed(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    #[async_trait]
    impl AcquisitionStrategy for Canned {
        fn name(&self) -> &'static str {
            self.name
        }

        fn provenance(&self) -> Provenance {
            self.provenance
        }

        async fn attempt(
            &self,
            _id: i64,
            _budget: Duration,
        ) -> std::result::Result<RawPayload, AcquisitionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.outcome.clone()
        }
    }

    fn offline() -> Resolver {
        Resolver::builder(BASE).build()
    }

    #[tokio::test]
    async fn no_strategies_yields_fallback() {
        let record = offline().resolve(12345).await;
        assert_eq!(record.name, "Glenfiddich 12 Year Old");
        assert_eq!(record.category, "Glenfiddich");
        assert_eq!(record.strength.as_deref(), Some("40%"));
        assert_eq!(record.age.as_deref(), Some("12 years"));
        assert_eq!(record.provenance, Provenance::Fallback);
    }

    #[tokio::test]
    async fn total_over_edge_ids() {
        let resolver = offline();
        for id in [0, -1, i64::MIN, i64::MAX] {
            let record = resolver.resolve(id).await;
            assert_eq!(record.id, id);
            assert!(!record.name.is_empty());
            assert!(!record.category.is_empty());
        }
    }

    #[tokio::test]
    async fn first_viable_strategy_wins() {
        let later = Canned::new(
            "later",
            Provenance::Scrape,
            Ok(RawPayload::Tree(json!({"name": "Later"}))),
        );
        let later_calls = Arc::clone(&later.calls);
        let resolver = Resolver::builder(BASE)
            .strategy(Canned::new("down", Provenance::Scrape, Err(AcquisitionError::Blocked(403))))
            .strategy(Canned::new(
                "api",
                Provenance::Api,
                Ok(RawPayload::Tree(json!({"whisky": {"name": "Talisker 10", "strength": 45.8}}))),
            ))
            .strategy(later)
            .build();

        let record = resolver.resolve(42).await;
        assert_eq!(record.name, "Talisker 10");
        assert_eq!(record.strength.as_deref(), Some("45.8%"));
        assert_eq!(record.provenance, Provenance::Api);
        assert_eq!(record.source_url, "https://www.whiskybase.com/whisky/42");
        assert_eq!(later_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unusable_payload_advances_chain() {
        let resolver = Resolver::builder(BASE)
            .strategy(Canned::new(
                "empty",
                Provenance::Scrape,
                Ok(RawPayload::Document("<html><title>Just a moment...</title></html>".into())),
            ))
            .strategy(Canned::new(
                "page",
                Provenance::Scrape,
                Ok(RawPayload::Document("<h1>Oban 14</h1>".into())),
            ))
            .build();
        let record = resolver.resolve(5).await;
        assert_eq!(record.name, "Oban 14");
        assert_eq!(record.provenance, Provenance::Scrape);
    }

    #[tokio::test]
    async fn slow_strategy_times_out_then_falls_back() {
        let resolver = Resolver::builder(BASE)
            .attempt_budget(Duration::from_millis(50))
            .strategy(
                Canned::new(
                    "slow",
                    Provenance::Api,
                    Ok(RawPayload::Tree(json!({"name": "Too late"}))),
                )
                .delayed(Duration::from_secs(30)),
            )
            .build();
        let record = resolver.resolve(1).await;
        assert_eq!(record.provenance, Provenance::Fallback);
        assert_eq!(record.name, "Glenfiddich 12 Year Old");
    }

    #[tokio::test]
    async fn image_urls_are_absolute() {
        let resolver = Resolver::builder(BASE)
            .strategy(Canned::new(
                "api",
                Provenance::Api,
                Ok(RawPayload::Tree(json!({"name": "x", "photos": [{"big": "/p/1.jpg"}]}))),
            ))
            .build();
        let record = resolver.resolve(1).await;
        assert_eq!(
            record.image_url.as_deref(),
            Some("https://www.whiskybase.com/p/1.jpg")
        );
    }

    #[tokio::test]
    async fn complete_manual_fields_skip_the_chain() {
        let upstream = Canned::new(
            "api",
            Provenance::Api,
            Ok(RawPayload::Tree(json!({"name": "Upstream"}))),
        );
        let calls = Arc::clone(&upstream.calls);
        let resolver = Resolver::builder(BASE).strategy(upstream).build();

        let manual = ManualFields {
            id: None,
            name: Some("My Cask".into()),
            category: Some("Home Blend".into()),
            strength: Some("52%".into()),
            age: None,
        };
        let record = resolver.resolve_request(Some(77), &manual).await.unwrap();
        assert_eq!(record.provenance, Provenance::Manual);
        assert_eq!(record.id, 77);
        assert_eq!(record.name, "My Cask");
        assert_eq!(record.age, None);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn partial_manual_fields_use_the_id() {
        let manual = ManualFields {
            name: Some("Half filled".into()),
            ..Default::default()
        };
        let record = offline().resolve_request(Some(12345), &manual).await.unwrap();
        assert_eq!(record.provenance, Provenance::Fallback);
    }

    #[tokio::test]
    async fn nothing_supplied_is_a_validation_error() {
        let err = offline()
            .resolve_request(None, &ManualFields::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DramtagError::Validation(_)));

        let partial = ManualFields {
            name: Some("Only a name".into()),
            ..Default::default()
        };
        let err = offline().resolve_request(None, &partial).await.unwrap_err();
        assert!(err.to_string().contains("category"));
    }

    #[test]
    fn manual_without_required_fields_is_rejected() {
        assert!(offline().resolve_manual(&ManualFields::default()).is_err());

        let blank_name = ManualFields {
            id: Some(5),
            name: Some("   ".into()),
            category: Some("Talisker".into()),
            strength: Some("45.8%".into()),
            age: None,
        };
        let err = offline().resolve_manual(&blank_name).unwrap_err();
        assert!(matches!(err, DramtagError::Validation(_)));
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn manual_fields_are_trimmed_into_record() {
        let fields = ManualFields {
            id: Some(5),
            name: Some("  Talisker 10 ".into()),
            category: Some(" Talisker".into()),
            strength: Some("45.8%".into()),
            age: Some("".into()),
        };
        let record = offline().resolve_manual(&fields).unwrap();
        assert_eq!(record.name, "Talisker 10");
        assert_eq!(record.category, "Talisker");
        assert_eq!(record.age, None);
        assert_eq!(record.provenance, Provenance::Manual);
    }

    #[test]
    fn offline_config_builds_empty_chain() {
        let config = AppConfig::default().with_env_overrides(|k| {
            (k == "DRAMTAG_OFFLINE").then(|| "1".to_owned())
        });
        let resolver = Resolver::from_config(&config).unwrap();
        assert!(resolver.strategy_names().is_empty());
        assert_eq!(resolver.chain_budget(), Duration::ZERO);
    }

    #[test]
    fn api_strategy_needs_a_base_url() {
        let resolver = Resolver::from_config(&AppConfig::default()).unwrap();
        assert_eq!(resolver.strategy_names(), vec!["sessioned-browser", "direct-http"]);

        let config = AppConfig {
            api_base_url: Some("https://api.example".into()),
            ..Default::default()
        };
        let resolver = Resolver::from_config(&config).unwrap();
        assert_eq!(
            resolver.strategy_names(),
            vec!["sessioned-browser", "structured-api", "direct-http"]
        );
    }
}
