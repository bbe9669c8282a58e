// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// JSON tree normalization and the shared field rules.

use dramtag_core::error::{DramtagError, Result};
use serde_json::Value;

use super::candidates::{FieldRule, is_truthy, numeric_at, text_at, value_at};
use super::document::strip_site_marker;
use super::{Normalized, Normalizer, UNKNOWN_ABV, UNKNOWN_DISTILLERY, no_name};

/// Keys that may wrap the bottle object in an API response.
const ENVELOPE_KEYS: [&str; 2] = ["whisky", "data"];

/// Field order inside an `image` object.
const IMAGE_OBJECT_FIELDS: [&str; 5] = ["url", "src", "image_url", "photo_url", "thumbnail"];

/// Size keys inside `image.sizes`, largest first.
const IMAGE_SIZE_KEYS: [&str; 4] = ["large", "medium", "small", "original"];

/// Flat top-level image fields.
const FLAT_IMAGE_FIELDS: [&str; 4] = ["photo", "picture", "thumbnail", "image_url"];

/// Photo sizes, largest first.
const PHOTO_SIZES: [&str; 3] = ["big", "normal", "small"];

/// Normalize a JSON payload, unwrapping a `whisky`/`data` envelope first.
pub fn normalize_tree(normalizer: &Normalizer, root: &Value) -> Result<Normalized> {
    let body = unwrap_envelope(root);
    if !body.is_object() {
        return Err(DramtagError::Normalization(
            "JSON payload is not an object".into(),
        ));
    }
    extract_fields(normalizer, body)
}

/// The bottle object inside an optional envelope.
pub fn unwrap_envelope(root: &Value) -> &Value {
    ENVELOPE_KEYS
        .iter()
        .filter_map(|key| root.get(*key))
        .find(|inner| inner.is_object())
        .unwrap_or(root)
}

/// Apply every field rule to an object-shaped payload.
pub(crate) fn extract_fields(normalizer: &Normalizer, body: &Value) -> Result<Normalized> {
    let name = name_rule().resolve(body).ok_or_else(no_name)?;

    let region = region_rule().resolve(body);
    let note_parts: Vec<String> = [
        region.clone(),
        cask_rule().resolve(body),
        bottler_rule().resolve(body).map(|b| format!("Bottled by {b}")),
    ]
    .into_iter()
    .flatten()
    .collect();

    let image_url = image_rule(normalizer.preferred_photo_id())
        .resolve(body)
        .and_then(|url| normalizer.absolutize(&url));

    Ok(Normalized {
        name,
        category: category_rule().resolve_or(body, UNKNOWN_DISTILLERY),
        strength: strength_rule().resolve_or(body, UNKNOWN_ABV),
        age: age_rule().resolve(body),
        region,
        note: (!note_parts.is_empty()).then(|| note_parts.join(" | ")),
        image_url,
    })
}

// -- Field rules --------------------------------------------------------------

fn name_rule() -> FieldRule<'static, Value> {
    FieldRule::new()
        .or(|v: &Value| text_at(v, &["name"]))
        .or(|v: &Value| text_at(v, &["title"]).map(|t| strip_site_marker(&t)))
}

fn category_rule() -> FieldRule<'static, Value> {
    FieldRule::new()
        .or(|v: &Value| text_at(v, &["brand", "brandname"]))
        .or(|v: &Value| text_at(v, &["brand", "name"]))
        .or(|v: &Value| text_at(v, &["brand_name"]))
        .or(|v: &Value| text_at(v, &["bottled_for"]).or_else(|| text_at(v, &["bottle_for"])))
        .or(|v: &Value| {
            text_at(v, &["district"])
                .filter(|d| !d.trim().is_empty())
                .or_else(|| region_rule().resolve(v))
                .map(|r| format!("{} Distillery", r.trim()))
        })
}

fn strength_rule() -> FieldRule<'static, Value> {
    FieldRule::new()
        .or(|v: &Value| numeric_at(v, &["strength"]).map(|s| format!("{s}%")))
        .or(|v: &Value| numeric_at(v, &["abv"]).map(|s| format!("{s}%")))
}

fn age_rule() -> FieldRule<'static, Value> {
    FieldRule::new().or(|v: &Value| numeric_at(v, &["age"]).map(|a| format!("{a} years")))
}

fn region_rule() -> FieldRule<'static, Value> {
    FieldRule::new()
        .or(|v: &Value| text_at(v, &["region"]).filter(|r| r != "Unknown Region"))
        .or(|v: &Value| text_at(v, &["region", "name"]))
}

fn cask_rule() -> FieldRule<'static, Value> {
    FieldRule::new()
        .or(|v: &Value| text_at(v, &["cask_type"]))
        .or(|v: &Value| text_at(v, &["casktype"]))
}

fn bottler_rule() -> FieldRule<'static, Value> {
    FieldRule::new()
        .or(|v: &Value| text_at(v, &["bottler", "name"]))
        .or(|v: &Value| text_at(v, &["bottler"]))
        .or(|v: &Value| text_at(v, &["bottler_serie"]))
}

fn image_rule(preferred_photo_id: Option<u64>) -> FieldRule<'static, Value> {
    FieldRule::new()
        .or(move |v: &Value| {
            let wanted = preferred_photo_id?;
            photos(v)?
                .iter()
                .find(|p| photo_id(p) == Some(wanted))
                .and_then(|p| text_at(p, &["normal"]))
        })
        .or(|v: &Value| {
            photos(v)?
                .iter()
                .find(|p| p.get("label").is_some_and(is_truthy))
                .and_then(largest_photo_size)
        })
        .or(|v: &Value| photos(v)?.first().and_then(largest_photo_size))
        .or(|v: &Value| {
            let image = value_at(v, &["image"]).filter(|i| i.is_object())?;
            IMAGE_OBJECT_FIELDS
                .iter()
                .find_map(|key| text_at(image, &[*key]).filter(|s| !s.trim().is_empty()))
                .or_else(|| {
                    IMAGE_SIZE_KEYS.iter().find_map(|key| {
                        text_at(image, &["sizes", *key]).filter(|s| !s.trim().is_empty())
                    })
                })
        })
        .or(|v: &Value| {
            FLAT_IMAGE_FIELDS
                .iter()
                .find_map(|key| text_at(v, &[*key]).filter(|s| !s.trim().is_empty()))
        })
}

fn photos(v: &Value) -> Option<&Vec<Value>> {
    v.get("photos")?.as_array()
}

fn photo_id(photo: &Value) -> Option<u64> {
    match photo.get("id")? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn largest_photo_size(photo: &Value) -> Option<String> {
    PHOTO_SIZES
        .iter()
        .find_map(|size| text_at(photo, &[*size]).filter(|s| !s.trim().is_empty()))
}
