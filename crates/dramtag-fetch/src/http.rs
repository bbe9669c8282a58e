// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plain HTTP strategies: the structured API and the HTML detail page.

use std::time::Duration;

use async_trait::async_trait;
use dramtag_core::error::{AcquisitionError, DramtagError, Result};
use dramtag_core::types::{Provenance, detail_url};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::{debug, instrument};

use crate::strategy::{AcquisitionStrategy, RawPayload};

/// Relations requested alongside the bottle in API calls.
const API_RELATIONS: &str = "relation[]=brand&relation[]=userrating&relation[]=bottler";

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_JSON: &str = "application/json";

/// Build an HTTP client with browser-like default headers.
///
/// `cookies` enables a per-client cookie jar; only the sessioned strategy
/// asks for one.
pub fn build_client(user_agent: &str, cookies: bool) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

    reqwest::Client::builder()
        .user_agent(user_agent)
        .default_headers(headers)
        .cookie_store(cookies)
        .gzip(true)
        .build()
        .map_err(|e| {
            DramtagError::Acquisition(AcquisitionError::Connection(format!(
                "HTTP client setup: {e}"
            )))
        })
}

/// Status, body and content type of one response.
#[derive(Debug, Clone)]
pub struct FetchedBody {
    pub status: u16,
    pub body: String,
    pub content_type: Option<String>,
}

/// GET `url` and return the body, whatever its status.
pub async fn get(
    client: &reqwest::Client,
    url: &str,
    accept: &'static str,
    budget: Duration,
) -> std::result::Result<FetchedBody, AcquisitionError> {
    let response = client
        .get(url)
        .header(ACCEPT, accept)
        .timeout(budget)
        .send()
        .await
        .map_err(classify_transport)?;

    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let body = response.text().await.map_err(classify_transport)?;

    debug!(url, status, bytes = body.len(), "response received");
    Ok(FetchedBody {
        status,
        body,
        content_type,
    })
}

/// GET `url` and fail on any non-success status.
pub async fn get_success(
    client: &reqwest::Client,
    url: &str,
    accept: &'static str,
    budget: Duration,
) -> std::result::Result<FetchedBody, AcquisitionError> {
    let fetched = get(client, url, accept, budget).await?;
    if !(200..300).contains(&fetched.status) {
        return Err(AcquisitionError::from_status(fetched.status));
    }
    if fetched.body.trim().is_empty() {
        return Err(AcquisitionError::Malformed("empty body".into()));
    }
    Ok(fetched)
}

pub(crate) fn classify_transport(err: reqwest::Error) -> AcquisitionError {
    if err.is_timeout() {
        AcquisitionError::Timeout
    } else if let Some(status) = err.status() {
        AcquisitionError::from_status(status.as_u16())
    } else if err.is_decode() || err.is_body() {
        AcquisitionError::Malformed(err.to_string())
    } else {
        AcquisitionError::Connection(err.to_string())
    }
}

// -- Structured API -----------------------------------------------------------

/// One JSON request against the structured API.
pub struct StructuredApiFetch {
    client: reqwest::Client,
    api_base_url: String,
}

impl StructuredApiFetch {
    pub fn new(client: reqwest::Client, api_base_url: impl Into<String>) -> Self {
        Self {
            client,
            api_base_url: api_base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    pub fn endpoint(&self, id: i64) -> String {
        format!("{}/whisky/{}?{}", self.api_base_url, id, API_RELATIONS)
    }
}

#[async_trait]
impl AcquisitionStrategy for StructuredApiFetch {
    fn name(&self) -> &'static str {
        "structured-api"
    }

    fn provenance(&self) -> Provenance {
        Provenance::Api
    }

    #[instrument(skip(self), fields(strategy = "structured-api"))]
    async fn attempt(
        &self,
        id: i64,
        budget: Duration,
    ) -> std::result::Result<RawPayload, AcquisitionError> {
        let fetched = get_success(&self.client, &self.endpoint(id), ACCEPT_JSON, budget).await?;
        serde_json::from_str(&fetched.body)
            .map(RawPayload::Tree)
            .map_err(|e| AcquisitionError::Malformed(format!("API body is not JSON: {e}")))
    }
}

// -- Direct detail page -------------------------------------------------------

/// One plain request for the HTML detail page.
pub struct DirectHttpFetch {
    client: reqwest::Client,
    base_url: String,
}

impl DirectHttpFetch {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl AcquisitionStrategy for DirectHttpFetch {
    fn name(&self) -> &'static str {
        "direct-http"
    }

    fn provenance(&self) -> Provenance {
        Provenance::Scrape
    }

    #[instrument(skip(self), fields(strategy = "direct-http"))]
    async fn attempt(
        &self,
        id: i64,
        budget: Duration,
    ) -> std::result::Result<RawPayload, AcquisitionError> {
        let url = detail_url(&self.base_url, id);
        let fetched = get_success(&self.client, &url, ACCEPT_HTML, budget).await?;
        Ok(RawPayload::Document(fetched.body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_endpoint_carries_relations() {
        let client = build_client("dramtag-test", false).unwrap();
        let api = StructuredApiFetch::new(client, "https://api.example/v1/");
        assert_eq!(
            api.endpoint(12345),
            "https://api.example/v1/whisky/12345?relation[]=brand&relation[]=userrating&relation[]=bottler"
        );
    }

    #[test]
    fn strategies_report_identity() {
        let client = build_client("dramtag-test", false).unwrap();
        let api = StructuredApiFetch::new(client.clone(), "https://api.example");
        let direct = DirectHttpFetch::new(client, "https://www.whiskybase.com");
        assert_eq!(api.provenance(), Provenance::Api);
        assert_eq!(direct.provenance(), Provenance::Scrape);
        assert_ne!(api.name(), direct.name());
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transient_failure() {
        let client = build_client("dramtag-test", false).unwrap();
        // Port 9 on localhost is the discard service and is closed almost everywhere.
        let direct = DirectHttpFetch::new(client, "http://127.0.0.1:9");
        let err = direct.attempt(1, Duration::from_secs(2)).await.unwrap_err();
        assert!(matches!(
            err,
            AcquisitionError::Connection(_) | AcquisitionError::Timeout
        ));
    }
}
