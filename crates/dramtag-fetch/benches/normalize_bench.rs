// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for payload normalization in the dramtag-fetch crate.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use serde_json::json;

use dramtag_fetch::{Normalizer, RawPayload};

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Normalize a realistic API response with nested brand, bottler and photos.
fn bench_tree(c: &mut Criterion) {
    let normalizer = Normalizer::new("https://www.whiskybase.com", Some(479313));
    let payload = RawPayload::Tree(json!({
        "whisky": {
            "name": "Springbank 15",
            "brand": {"brandname": "Springbank"},
            "strength": 46,
            "age": 15,
            "region": "Campbeltown",
            "cask_type": "Sherry",
            "bottler": {"name": "Distillery Bottling"},
            "photos": (0..20)
                .map(|i| json!({"id": i, "big": format!("/photos/{i}.jpg")}))
                .collect::<Vec<_>>()
        }
    }));

    c.bench_function("normalize_tree (20 photos)", |b| {
        b.iter(|| black_box(normalizer.normalize(black_box(&payload), 1).ok()));
    });
}

/// Normalize an HTML detail page with a dozen detail rows.
fn bench_document(c: &mut Criterion) {
    let normalizer = Normalizer::new("https://www.whiskybase.com", None);
    let mut html = String::from(
        "<html><head><title>Springbank 15 - Whiskybase</title>\
         <meta property=\"og:image\" content=\"/photos/15.jpg\"></head><body>\
         <h1>Springbank 15-year-old</h1><dl>",
    );
    for (label, value) in [
        ("Distillery", "Springbank"),
        ("Bottler", "Distillery Bottling"),
        ("Stated Age", "15 years old"),
        ("Casktype", "Sherry"),
        ("Strength", "46.0 % Vol."),
        ("Size", "700 ml"),
        ("Bottled", "2023"),
        ("Region", "Campbeltown"),
    ] {
        html.push_str(&format!("<dt>{label}</dt><dd>{value}</dd>"));
    }
    html.push_str("</dl></body></html>");
    let payload = RawPayload::Document(html);

    c.bench_function("normalize_document (8 details)", |b| {
        b.iter(|| black_box(normalizer.normalize(black_box(&payload), 1).ok()));
    });
}

criterion_group!(benches, bench_tree, bench_document);
criterion_main!(benches);
