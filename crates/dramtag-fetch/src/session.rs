// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sessioned page fetch.
//
// Some upstream pages only answer clients that first visited the home page
// and carry its cookies. A session is opened per attempt, warmed up against
// the base URL and then walked through the detail URL patterns. The session
// value is owned by the attempt future, so it is released on success, on
// failure and when the resolver's timeout drops the future.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use dramtag_core::error::AcquisitionError;
use dramtag_core::types::{Provenance, detail_url};
use tracing::{debug, instrument};

use crate::http::{self, FetchedBody};
use crate::strategy::{AcquisitionStrategy, RawPayload};

const ACCEPT_ANY: &str = "text/html,application/json;q=0.9,*/*;q=0.8";

/// A live browsing session with its own cookie state.
#[async_trait]
pub trait BrowserSession: Send {
    /// Load `url` and report status and body, whatever the status.
    async fn visit(&mut self, url: &str, budget: Duration)
    -> Result<FetchedBody, AcquisitionError>;
}

/// Opens fresh sessions on demand.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn open(&self) -> Result<Box<dyn BrowserSession>, AcquisitionError>;
}

// -- reqwest-backed sessions --------------------------------------------------

/// Sessions backed by a cookie-carrying HTTP client.
pub struct HttpSessionProvider {
    user_agent: String,
}

impl HttpSessionProvider {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
        }
    }
}

#[async_trait]
impl SessionProvider for HttpSessionProvider {
    async fn open(&self) -> Result<Box<dyn BrowserSession>, AcquisitionError> {
        let client = http::build_client(&self.user_agent, true)
            .map_err(|e| AcquisitionError::Connection(e.to_string()))?;
        debug!("session opened");
        Ok(Box::new(HttpSession { client }))
    }
}

struct HttpSession {
    client: reqwest::Client,
}

#[async_trait]
impl BrowserSession for HttpSession {
    async fn visit(
        &mut self,
        url: &str,
        budget: Duration,
    ) -> Result<FetchedBody, AcquisitionError> {
        http::get(&self.client, url, ACCEPT_ANY, budget).await
    }
}

impl Drop for HttpSession {
    fn drop(&mut self) {
        debug!("session released");
    }
}

// -- Strategy -----------------------------------------------------------------

/// Warm-up plus ordered URL patterns inside one scoped session.
pub struct SessionedBrowserFetch {
    sessions: Arc<dyn SessionProvider>,
    base_url: String,
    warmup_budget: Duration,
}

impl SessionedBrowserFetch {
    pub fn new(
        sessions: Arc<dyn SessionProvider>,
        base_url: impl Into<String>,
        warmup_budget: Duration,
    ) -> Self {
        Self {
            sessions,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            warmup_budget,
        }
    }

    /// Candidate URLs for `id`, most specific first.
    pub fn url_patterns(&self, id: i64) -> [String; 2] {
        [
            detail_url(&self.base_url, id),
            format!("{}/whiskies/whisky/{}", self.base_url, id),
        ]
    }
}

#[async_trait]
impl AcquisitionStrategy for SessionedBrowserFetch {
    fn name(&self) -> &'static str {
        "sessioned-browser"
    }

    fn provenance(&self) -> Provenance {
        Provenance::Scrape
    }

    #[instrument(skip(self), fields(strategy = "sessioned-browser"))]
    async fn attempt(&self, id: i64, budget: Duration) -> Result<RawPayload, AcquisitionError> {
        let started = Instant::now();
        let remaining = || budget.saturating_sub(started.elapsed());
        let mut session = self.sessions.open().await?;

        let home = format!("{}/", self.base_url);
        match session.visit(&home, self.warmup_budget.min(remaining())).await {
            Ok(page) => debug!(status = page.status, "session warmed up"),
            Err(e) => debug!(error = %e, "warm-up failed, continuing without it"),
        }

        let mut last_failure = AcquisitionError::Status(404);
        for url in self.url_patterns(id) {
            let left = remaining();
            if left.is_zero() {
                debug!(url = %url, "attempt budget spent before visit");
                return Err(AcquisitionError::Timeout);
            }
            match session.visit(&url, left).await {
                Ok(page) if (200..300).contains(&page.status) && !page.body.trim().is_empty() => {
                    debug!(url = %url, "detail page found");
                    return Ok(RawPayload::sniff(page.body, page.content_type.as_deref()));
                }
                Ok(page) => {
                    debug!(url = %url, status = page.status, "pattern missed, trying next");
                    last_failure = if (200..300).contains(&page.status) {
                        AcquisitionError::Malformed("empty body".into())
                    } else {
                        AcquisitionError::from_status(page.status)
                    };
                }
                Err(e) => {
                    debug!(url = %url, error = %e, "pattern failed, trying next");
                    last_failure = e;
                }
            }
        }
        Err(last_failure)
    }
}
