// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTML detail-page normalization.
//
// The page is scanned with a handful of regexes (heading, titles, meta tags and
// the `<dt>/<dd>` detail list), lifted into the same JSON shape the API uses,
// and then run through the shared field rules.

use std::sync::LazyLock;

use dramtag_core::error::{DramtagError, Result};
use regex::Regex;
use serde_json::{Map, Value, json};
use tracing::debug;

use super::tree::extract_fields;
use super::{Normalized, Normalizer};

/// Site markers stripped from page titles.
const SITE_PREFIXES: [&str; 2] = ["Whiskybase - ", "Whiskybase | "];
const SITE_SUFFIXES: [&str; 3] = [
    " - Ratings and reviews - Whiskybase",
    " - Whiskybase",
    " | Whiskybase",
];

/// Titles served by bot-challenge interstitials instead of the real page.
const CHALLENGE_TITLES: [&str; 3] = ["Just a moment...", "Attention Required!", "Access denied"];

static H1: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h1[^>]*>(.*?)</h1>").expect("valid regex"));
static TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid regex"));
static META: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\s[^>]*>").expect("valid regex"));
static META_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(?:property|name)\s*=\s*["']([^"']+)["']"#).expect("valid regex")
});
static META_CONTENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bcontent\s*=\s*["']([^"']*)["']"#).expect("valid regex")
});
static DETAIL_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<dt[^>]*>(.*?)</dt>\s*<dd[^>]*>(.*?)</dd>").expect("valid regex")
});
static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]+>").expect("valid regex"));
static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:[.,]\d+)?").expect("valid regex"));

/// Facts scraped from a detail page before they are mapped onto record fields.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PageFacts {
    pub heading: Option<String>,
    pub title: Option<String>,
    pub og_title: Option<String>,
    pub og_image: Option<String>,
    /// `(label, value)` pairs from the detail list, in page order.
    pub details: Vec<(String, String)>,
}

impl PageFacts {
    pub fn scan(html: &str) -> Self {
        let mut facts = Self {
            heading: first_capture(&H1, html),
            title: first_capture(&TITLE, html),
            ..Self::default()
        };

        for tag in META.find_iter(html) {
            let tag = tag.as_str();
            let (Some(key), Some(content)) = (
                META_KEY.captures(tag).and_then(|c| c.get(1)),
                META_CONTENT.captures(tag).and_then(|c| c.get(1)),
            ) else {
                continue;
            };
            let content = clean_text(content.as_str());
            if content.is_empty() {
                continue;
            }
            match key.as_str().to_ascii_lowercase().as_str() {
                "og:title" if facts.og_title.is_none() => facts.og_title = Some(content),
                "og:image" if facts.og_image.is_none() => facts.og_image = Some(content),
                _ => {}
            }
        }

        facts.details = DETAIL_PAIR
            .captures_iter(html)
            .filter_map(|c| {
                let label = clean_text(c.get(1)?.as_str());
                let value = clean_text(c.get(2)?.as_str());
                (!label.is_empty() && !value.is_empty()).then_some((label, value))
            })
            .collect();

        facts
    }

    /// Whether the page looks like a bot-challenge interstitial.
    pub fn is_challenge(&self) -> bool {
        self.title
            .as_deref()
            .is_some_and(|t| CHALLENGE_TITLES.iter().any(|c| t.starts_with(c)))
    }

    /// Map the page onto the API's JSON shape.
    pub fn to_tree(&self) -> Value {
        let mut tree = Map::new();
        if let Some(heading) = &self.heading {
            tree.insert("name".into(), json!(heading));
        }
        if let Some(title) = self.og_title.as_ref().or(self.title.as_ref()) {
            tree.insert("title".into(), json!(title));
        }
        if let Some(image) = &self.og_image {
            tree.insert("image".into(), json!({ "url": image }));
        }

        for (label, value) in &self.details {
            let key = label.trim_end_matches(':').trim().to_ascii_lowercase();
            let (path, lifted): (&[&str], Value) = match key.as_str() {
                "brand" => (&["brand", "brandname"][..], json!(value)),
                "distillery" | "distilleries" => (&["brand_name"][..], json!(value)),
                "bottled for" => (&["bottled_for"][..], json!(value)),
                "bottler" => (&["bottler", "name"][..], json!(value)),
                "bottling serie" | "bottling series" => (&["bottler_serie"][..], json!(value)),
                "region" => (&["region"][..], json!(value)),
                "district" => (&["district"][..], json!(value)),
                "casktype" | "cask type" => (&["cask_type"][..], json!(value)),
                "strength" | "abv" => match leading_number(value) {
                    Some(n) => (&["strength"][..], Value::String(n)),
                    None => continue,
                },
                "age" | "stated age" => match leading_number(value) {
                    Some(n) => (&["age"][..], Value::String(n)),
                    None => continue,
                },
                _ => continue,
            };
            insert_path(&mut tree, path, lifted);
        }

        Value::Object(tree)
    }
}

/// Normalize an HTML detail page.
pub fn normalize_document(normalizer: &Normalizer, html: &str) -> Result<Normalized> {
    let facts = PageFacts::scan(html);
    if facts.is_challenge() {
        return Err(DramtagError::Normalization(
            "page is a bot-challenge interstitial".into(),
        ));
    }
    debug!(
        heading = facts.heading.is_some(),
        details = facts.details.len(),
        "document scanned"
    );
    extract_fields(normalizer, &facts.to_tree())
}

/// Remove known site prefixes and suffixes from a page title.
pub fn strip_site_marker(title: &str) -> String {
    let mut out = title.trim();
    for prefix in SITE_PREFIXES {
        if let Some(rest) = out.strip_prefix(prefix) {
            out = rest;
            break;
        }
    }
    for suffix in SITE_SUFFIXES {
        if let Some(rest) = out.strip_suffix(suffix) {
            out = rest;
            break;
        }
    }
    out.trim().to_owned()
}

fn first_capture(re: &Regex, html: &str) -> Option<String> {
    let text = clean_text(re.captures(html)?.get(1)?.as_str());
    (!text.is_empty()).then_some(text)
}

/// Strip tags, decode common entities and collapse whitespace.
fn clean_text(fragment: &str) -> String {
    let stripped = TAG.replace_all(fragment, " ");
    let decoded = decode_entities(&stripped);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_owned();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let decoded = tail
            .find(';')
            .filter(|end| *end <= 10)
            .and_then(|end| entity(&tail[1..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or(name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}

/// First positive number in a free-text value, e.g. `"46.0 % Vol."` gives `"46.0"`.
fn leading_number(value: &str) -> Option<String> {
    let raw = NUMBER.find(value)?.as_str().replace(',', ".");
    let parsed: f64 = raw.parse().ok()?;
    (parsed > 0.0).then_some(raw)
}

fn insert_path(tree: &mut Map<String, Value>, path: &[&str], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };
    let mut node = tree;
    for key in parents {
        let entry = node
            .entry((*key).to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        let Value::Object(map) = entry else {
            return;
        };
        node = map;
    }
    node.entry((*last).to_owned()).or_insert(value);
}
