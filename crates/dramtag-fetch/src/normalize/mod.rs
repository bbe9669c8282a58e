// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Payload normalization.
//
// Turns a raw upstream payload (JSON tree or HTML document) into the fields of
// a `CanonicalRecord`. Both shapes share the same candidate rules; the HTML
// routine lifts the page into a JSON tree first.

pub mod candidates;
pub mod document;
pub mod tree;

use dramtag_core::error::{DramtagError, Result};
use dramtag_core::types::{CanonicalRecord, Provenance, is_absolute_url};
use tracing::debug;

use crate::strategy::RawPayload;

pub use candidates::FieldRule;

/// Placeholder category when no candidate matched.
pub const UNKNOWN_DISTILLERY: &str = "Unknown Distillery";

/// Placeholder strength when no candidate matched.
pub const UNKNOWN_ABV: &str = "Unknown ABV";

/// Fields extracted from one payload, before an identity is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub name: String,
    pub category: String,
    pub strength: String,
    pub age: Option<String>,
    pub region: Option<String>,
    pub note: Option<String>,
    pub image_url: Option<String>,
}

impl Normalized {
    /// Attach id, detail URL and provenance.
    pub fn into_record(
        self,
        id: i64,
        source_url: String,
        provenance: Provenance,
    ) -> CanonicalRecord {
        CanonicalRecord {
            id,
            name: self.name,
            category: self.category,
            strength: Some(self.strength),
            age: self.age,
            region: self.region,
            note: self.note,
            image_url: self.image_url,
            source_url,
            provenance,
        }
    }
}

/// Stateless field extractor configured with the upstream base URL.
#[derive(Debug, Clone)]
pub struct Normalizer {
    base_url: String,
    preferred_photo_id: Option<u64>,
}

impl Normalizer {
    pub fn new(base_url: impl Into<String>, preferred_photo_id: Option<u64>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            preferred_photo_id,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn preferred_photo_id(&self) -> Option<u64> {
        self.preferred_photo_id
    }

    /// Extract record fields from `payload`.
    ///
    /// Fails with `Normalization` when the payload carries no usable name,
    /// which makes the resolver move on to the next strategy.
    pub fn normalize(&self, payload: &RawPayload, id: i64) -> Result<Normalized> {
        let normalized = match payload {
            RawPayload::Tree(value) => tree::normalize_tree(self, value)?,
            RawPayload::Document(html) => document::normalize_document(self, html)?,
        };
        debug!(id, name = %normalized.name, "payload normalized");
        Ok(normalized)
    }

    /// Make an image URL absolute against the base URL.
    pub fn absolutize(&self, url: &str) -> Option<String> {
        let url = url.trim();
        if url.is_empty() {
            return None;
        }
        if is_absolute_url(url) {
            return Some(url.to_owned());
        }
        if let Some(rest) = url.strip_prefix("//") {
            return Some(format!("https://{rest}"));
        }
        if url.starts_with('/') {
            Some(format!("{}{}", self.base_url, url))
        } else {
            Some(format!("{}/{}", self.base_url, url))
        }
    }
}

pub(crate) fn no_name() -> DramtagError {
    DramtagError::Normalization("payload carries no usable name".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalizer() -> Normalizer {
        Normalizer::new("https://www.whiskybase.com/", Some(479313))
    }

    #[test]
    fn absolutize_variants() {
        let n = normalizer();
        assert_eq!(
            n.absolutize("/img/1.jpg").as_deref(),
            Some("https://www.whiskybase.com/img/1.jpg")
        );
        assert_eq!(
            n.absolutize("img/1.jpg").as_deref(),
            Some("https://www.whiskybase.com/img/1.jpg")
        );
        assert_eq!(
            n.absolutize("//cdn.example/1.jpg").as_deref(),
            Some("https://cdn.example/1.jpg")
        );
        assert_eq!(
            n.absolutize("http://cdn.example/1.jpg").as_deref(),
            Some("http://cdn.example/1.jpg")
        );
        assert_eq!(n.absolutize("  "), None);
    }

    #[test]
    fn dispatches_on_payload_shape() {
        let n = normalizer();
        let tree = RawPayload::Tree(json!({"name": "Talisker 10"}));
        assert_eq!(n.normalize(&tree, 1).unwrap().name, "Talisker 10");

        let doc = RawPayload::Document("<html><h1>Oban 14</h1></html>".into());
        assert_eq!(n.normalize(&doc, 1).unwrap().name, "Oban 14");
    }

    #[test]
    fn into_record_keeps_provenance() {
        let record = normalizer()
            .normalize(&RawPayload::Tree(json!({"name": "Oban 14", "strength": 43})), 7)
            .unwrap()
            .into_record(7, "https://www.whiskybase.com/whisky/7".into(), Provenance::Api);
        assert_eq!(record.provenance, Provenance::Api);
        assert_eq!(record.strength.as_deref(), Some("43%"));
        assert_eq!(record.category, UNKNOWN_DISTILLERY);
    }
}
