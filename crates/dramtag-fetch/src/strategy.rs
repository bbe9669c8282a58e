// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Acquisition strategies: the ordered ways of getting bottle data upstream.
//
// Chain: SessionedBrowserFetch → StructuredApiFetch → DirectHttpFetch → fallback catalogue
//
// Each strategy performs one attempt and reports a typed failure. The resolver
// owns the ordering, the per-attempt timeout and the decision to move on.

use std::time::Duration;

use async_trait::async_trait;
use dramtag_core::error::AcquisitionError;
use dramtag_core::types::Provenance;
use serde_json::Value;

/// Raw upstream response, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPayload {
    /// Parsed JSON document.
    Tree(Value),
    /// HTML page text.
    Document(String),
}

impl RawPayload {
    /// Classify a response body.
    ///
    /// A JSON content type, or a body that parses as a JSON object or array,
    /// becomes a tree. Everything else is treated as an HTML document.
    pub fn sniff(body: String, content_type: Option<&str>) -> Self {
        let declared_json = content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("json"));
        let trimmed = body.trim_start();
        if (declared_json || trimmed.starts_with('{') || trimmed.starts_with('['))
            && let Ok(value) = serde_json::from_str::<Value>(trimmed)
        {
            return Self::Tree(value);
        }
        Self::Document(body)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Tree(_) => "tree",
            Self::Document(_) => "document",
        }
    }
}

/// One way of fetching a bottle from upstream.
#[async_trait]
pub trait AcquisitionStrategy: Send + Sync {
    /// Short name used in logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Provenance stamped on records this strategy produces.
    fn provenance(&self) -> Provenance;

    /// Perform a single attempt for `id` within `budget`.
    async fn attempt(&self, id: i64, budget: Duration) -> Result<RawPayload, AcquisitionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniff_json_body() {
        let payload = RawPayload::sniff(r#"  {"name": "Oban"}"#.into(), None);
        assert_eq!(payload.kind(), "tree");
    }

    #[test]
    fn sniff_html_body() {
        let payload = RawPayload::sniff("<html><h1>Oban</h1></html>".into(), Some("text/html"));
        assert_eq!(payload.kind(), "document");
    }

    #[test]
    fn broken_json_falls_back_to_document() {
        let payload = RawPayload::sniff("{not json".into(), Some("application/json"));
        assert_eq!(payload, RawPayload::Document("{not json".into()));
    }
}
