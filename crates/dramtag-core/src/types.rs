// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the dramtag label generator.

use serde::{Deserialize, Serialize};

use crate::error::{DramtagError, Result};

/// Which resolution path produced a record.
///
/// Set exactly once, when the record is built, and never re-derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Structured upstream API.
    Api,
    /// HTML or sessioned page fetch.
    Scrape,
    /// Supplied by the caller.
    Manual,
    /// Deterministic placeholder from the fallback catalogue.
    Fallback,
}

impl Provenance {
    /// Whether the data came from the upstream catalogue.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Api | Self::Scrape)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Scrape => "scrape",
            Self::Manual => "manual",
            Self::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved metadata for one bottle, independent of where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub id: i64,
    /// Never empty.
    pub name: String,
    /// Distillery or brand. Never empty.
    pub category: String,
    /// Formatted ABV, e.g. `"43%"`.
    pub strength: Option<String>,
    /// Formatted age, e.g. `"12 years"`.
    pub age: Option<String>,
    pub region: Option<String>,
    pub note: Option<String>,
    /// Absolute `http(s)://` URL or absent.
    pub image_url: Option<String>,
    /// Canonical detail page, also encoded in the label's QR code.
    pub source_url: String,
    pub provenance: Provenance,
}

/// Canonical detail-page URL for an id under the given base URL.
pub fn detail_url(base_url: &str, id: i64) -> String {
    format!("{}/whisky/{}", base_url.trim_end_matches('/'), id)
}

/// Whether a URL already carries an `http://` or `https://` scheme.
pub fn is_absolute_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Caller-supplied label fields (the "manual" form).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualFields {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub strength: Option<String>,
    pub age: Option<String>,
}

impl ManualFields {
    /// Name, category and strength are all present and non-blank.
    pub fn is_complete(&self) -> bool {
        [&self.name, &self.category, &self.strength]
            .iter()
            .all(|f| non_blank(f).is_some())
    }

    /// Whether the caller typed anything at all into the manual fields.
    pub fn is_empty(&self) -> bool {
        [&self.name, &self.category, &self.strength, &self.age]
            .iter()
            .all(|f| non_blank(f).is_none())
    }

    /// Check the required fields, naming every missing one.
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("name", &self.name),
            ("category", &self.category),
            ("strength", &self.strength),
        ]
        .into_iter()
        .filter(|(_, v)| non_blank(v).is_none())
        .map(|(label, _)| label)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(DramtagError::Validation(format!(
                "manual label is missing required field(s): {}",
                missing.join(", ")
            )))
        }
    }
}

/// Trimmed value of an optional field, `None` when absent or blank.
pub fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Physical label size in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelSize {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl LabelSize {
    pub const fn new(width_mm: f64, height_mm: f64) -> Self {
        Self { width_mm, height_mm }
    }

    /// Reject zero, negative and non-finite dimensions.
    pub fn validate(&self) -> Result<()> {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        if ok(self.width_mm) && ok(self.height_mm) {
            Ok(())
        } else {
            Err(DramtagError::Validation(format!(
                "label size must be positive, got {}x{} mm",
                self.width_mm, self.height_mm
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provenance_serializes_lowercase() {
        let json = serde_json::to_string(&Provenance::Fallback).unwrap();
        assert_eq!(json, "\"fallback\"");
        assert!(Provenance::Api.is_upstream());
        assert!(!Provenance::Manual.is_upstream());
    }

    #[test]
    fn detail_url_strips_trailing_slash() {
        assert_eq!(
            detail_url("https://www.whiskybase.com/", 12345),
            "https://www.whiskybase.com/whisky/12345"
        );
    }

    #[test]
    fn manual_validation_lists_missing_fields() {
        let fields = ManualFields {
            name: Some("Talisker 10".into()),
            category: Some("   ".into()),
            ..Default::default()
        };
        assert!(!fields.is_complete());
        let err = fields.validate().unwrap_err().to_string();
        assert!(err.contains("category"));
        assert!(err.contains("strength"));
        assert!(!err.contains("name"));
    }

    #[test]
    fn complete_manual_fields_pass() {
        let fields = ManualFields {
            id: None,
            name: Some("Talisker 10".into()),
            category: Some("Talisker".into()),
            strength: Some("45.8%".into()),
            age: None,
        };
        assert!(fields.is_complete());
        assert!(fields.validate().is_ok());
    }

    #[test]
    fn label_size_rejects_non_positive() {
        assert!(LabelSize::new(35.0, 37.0).validate().is_ok());
        assert!(LabelSize::new(0.0, 37.0).validate().is_err());
        assert!(LabelSize::new(35.0, -1.0).validate().is_err());
        assert!(LabelSize::new(f64::NAN, 10.0).validate().is_err());
    }
}
