// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Layout engine.
//
// Turns a record plus a profile into a fully resolved render plan: pixel
// geometry, font sizes, the QR code box and the positioned, truncated text
// lines. Every step is integer arithmetic on the inputs, so identical
// arguments always yield an identical plan.

use dramtag_core::error::{DramtagError, Result};
use dramtag_core::types::{CanonicalRecord, LabelSize, non_blank};
use serde::Serialize;
use tracing::debug;

use crate::profile::{CodeAnchor, EcLevel, Palette, ProfileConfig, ProfileRegistry};

const MM_PER_INCH: f64 = 25.4;
const ELLIPSIS: &str = "...";

/// Largest label side, in pixels, the engine will lay out.
pub const MAX_SIDE_PX: u32 = 20_000;

/// Physical size requested by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum SizeRequest {
    /// Named preset of the chosen profile.
    Preset(String),
    /// Explicit dimensions in millimetres.
    Custom(LabelSize),
}

impl From<LabelSize> for SizeRequest {
    fn from(size: LabelSize) -> Self {
        Self::Custom(size)
    }
}

// -- Geometry -----------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FontSizes {
    pub large: u32,
    pub medium: u32,
    pub small: u32,
}

/// Square region reserved for the QR code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CodeBox {
    pub x: u32,
    pub y: u32,
    pub size: u32,
}

/// Pixel geometry of one label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RenderGeometry {
    pub width_px: u32,
    pub height_px: u32,
    pub border_px: u32,
    pub fonts: FontSizes,
    pub code: CodeBox,
    pub line_height_px: u32,
    /// Top edge of the first text line.
    pub text_top_px: u32,
}

// -- Plan ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextRole {
    Large,
    Medium,
    Small,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextLine {
    pub text: String,
    pub role: TextRole,
    pub font_px: u32,
    /// Left edge from the per-character estimate. The renderer re-centres
    /// with the loaded font's measured width.
    pub x: u32,
    pub y: u32,
}

/// What goes into the QR code and how it is encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeSpec {
    pub payload: String,
    pub error_correction: EcLevel,
    pub quiet_zone: u32,
}

/// Everything the renderer needs; no further decisions are left to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderPlan {
    pub profile: &'static str,
    pub dpi: u32,
    pub size: LabelSize,
    pub geometry: RenderGeometry,
    pub code: CodeSpec,
    pub lines: Vec<TextLine>,
    pub colors: Palette,
}

// -- Engine -------------------------------------------------------------------

/// Stateless record-to-plan transformer.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutEngine;

impl LayoutEngine {
    /// Lay out `record` for the named profile.
    ///
    /// Unknown profile and preset names fall back to `custom`. `size` defaults
    /// to the profile's `custom` preset and `dpi` to the profile's own.
    pub fn layout(
        record: &CanonicalRecord,
        profile_name: &str,
        size: Option<&SizeRequest>,
        dpi: Option<u32>,
    ) -> Result<RenderPlan> {
        let profile = ProfileRegistry::resolve(profile_name);
        let size = match size {
            Some(SizeRequest::Preset(name)) => profile.preset_or_custom(name),
            Some(SizeRequest::Custom(size)) => *size,
            None => profile.default_size(),
        };
        let dpi = dpi.unwrap_or(profile.dpi);
        Self::layout_with(record, profile, size, dpi)
    }

    /// Lay out `record` for an already resolved profile and size.
    pub fn layout_with(
        record: &CanonicalRecord,
        profile: &'static ProfileConfig,
        size: LabelSize,
        dpi: u32,
    ) -> Result<RenderPlan> {
        let geometry = Self::geometry(profile, size, dpi)?;
        let lines = Self::text_lines(record, profile, &geometry);
        debug!(
            profile = profile.name,
            width = geometry.width_px,
            height = geometry.height_px,
            lines = lines.len(),
            "label laid out"
        );

        Ok(RenderPlan {
            profile: profile.name,
            dpi,
            size,
            geometry,
            code: CodeSpec {
                payload: record.source_url.clone(),
                error_correction: profile.code_error_correction,
                quiet_zone: profile.code_quiet_zone,
            },
            lines,
            colors: profile.colors,
        })
    }

    /// Pixel geometry for a physical size. Pure in all three arguments.
    pub fn geometry(profile: &ProfileConfig, size: LabelSize, dpi: u32) -> Result<RenderGeometry> {
        size.validate()?;
        if dpi == 0 {
            return Err(DramtagError::Validation("dpi must be positive".into()));
        }

        let side_px = |mm: f64| (mm * dpi as f64 / MM_PER_INCH).round();
        if side_px(size.width_mm) > MAX_SIDE_PX as f64
            || side_px(size.height_mm) > MAX_SIDE_PX as f64
        {
            return Err(DramtagError::Validation(format!(
                "label of {}x{} mm at {dpi} dpi exceeds {MAX_SIDE_PX} px per side",
                size.width_mm, size.height_mm
            )));
        }

        let w = mm_to_px(size.width_mm, dpi);
        let h = mm_to_px(size.height_mm, dpi);
        if w == 0 || h == 0 {
            return Err(DramtagError::Validation(format!(
                "label of {}x{} mm at {dpi} dpi has no pixels",
                size.width_mm, size.height_mm
            )));
        }

        let spacing = &profile.spacing;
        let min_side = w.min(h);
        let border = (min_side / spacing.border_divisor.max(1)).max(spacing.min_border);

        let base = (min_side / profile.fonts.base_divisor.max(1)).max(1);
        let scaled = |ratio: f64| ((base as f64 * ratio).floor() as u32).max(1);
        let fonts = FontSizes {
            large: scaled(profile.fonts.large),
            medium: scaled(profile.fonts.medium),
            small: scaled(profile.fonts.small),
        };

        let code_size = w.min((spacing.code_size_ratio * h as f64).floor() as u32);
        let code_y = match spacing.code_anchor {
            CodeAnchor::MarginRatio(ratio) => {
                border + h.saturating_sub(2 * border) / ratio.max(1)
            }
            CodeAnchor::BorderMultiple(n) => border.saturating_mul(n),
        };
        let code = CodeBox {
            x: (w - code_size) / 2,
            y: code_y,
            size: code_size,
        };

        Ok(RenderGeometry {
            width_px: w,
            height_px: h,
            border_px: border,
            fonts,
            code,
            line_height_px: fonts
                .large
                .saturating_add(spacing.line_height_pad)
                .max(h / spacing.line_height_divisor.max(1)),
            text_top_px: code
                .y
                .saturating_add(code.size)
                .saturating_add(h / spacing.text_gap_divisor.max(1)),
        })
    }

    fn text_lines(
        record: &CanonicalRecord,
        profile: &ProfileConfig,
        geometry: &RenderGeometry,
    ) -> Vec<TextLine> {
        let mut fields: Vec<(String, TextRole)> = vec![
            (record.name.clone(), TextRole::Large),
            (format!("Distillery: {}", record.category), TextRole::Medium),
        ];
        if let Some(strength) = non_blank(&record.strength) {
            fields.push((format!("ABV: {strength}"), TextRole::Medium));
        }
        if let Some(age) = non_blank(&record.age) {
            fields.push((format!("Age: {age}"), TextRole::Medium));
        }
        if profile.show_note
            && let Some(note) = non_blank(&record.note)
        {
            fields.push((note.to_owned(), TextRole::Small));
        }
        fields.push((format!("ID: {}", record.id), TextRole::Small));

        let constant = profile.spacing.truncation_constant;
        let width = geometry.width_px;
        let mut y = geometry.text_top_px;
        fields
            .into_iter()
            .map(|(text, role)| {
                let font_px = match role {
                    TextRole::Large => geometry.fonts.large,
                    TextRole::Medium => geometry.fonts.medium,
                    TextRole::Small => geometry.fonts.small,
                };
                let text = truncate_line(&text, max_chars(width, font_px, constant));
                let estimated = estimate_width(&text, font_px, constant).min(width);
                let line = TextLine {
                    x: (width - estimated) / 2,
                    y,
                    text,
                    role,
                    font_px,
                };
                y = y.saturating_add(geometry.line_height_px);
                line
            })
            .collect()
    }
}

/// `round(mm * dpi / 25.4)`.
pub fn mm_to_px(mm: f64, dpi: u32) -> u32 {
    (mm * dpi as f64 / MM_PER_INCH).round() as u32
}

/// Character budget of one line: `width / (font / constant)`, at least 3.
pub fn max_chars(width_px: u32, font_px: u32, constant: u32) -> usize {
    let per_char = (font_px / constant.max(1)).max(1);
    ((width_px / per_char) as usize).max(ELLIPSIS.len())
}

/// Keep `text` if it fits in `max` characters, else its first `max - 3`
/// characters followed by `...`.
pub fn truncate_line(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_owned();
    }
    let kept: String = text.chars().take(max.saturating_sub(ELLIPSIS.len())).collect();
    format!("{kept}{ELLIPSIS}")
}

fn estimate_width(text: &str, font_px: u32, constant: u32) -> u32 {
    let per_char = (font_px / constant.max(1)).max(1);
    (text.chars().count() as u32).saturating_mul(per_char)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dramtag_core::types::Provenance;

    fn record() -> CanonicalRecord {
        CanonicalRecord {
            id: 12345,
            name: "Glenfiddich 12 Year Old".into(),
            category: "Glenfiddich".into(),
            strength: Some("40%".into()),
            age: Some("12 years".into()),
            region: None,
            note: Some("Speyside".into()),
            image_url: None,
            source_url: "https://www.whiskybase.com/whisky/12345".into(),
            provenance: Provenance::Fallback,
        }
    }

    #[test]
    fn millimetres_round_to_pixels() {
        assert_eq!(mm_to_px(35.0, 72), 99);
        assert_eq!(mm_to_px(37.0, 72), 105);

        let plan = LayoutEngine::layout(&record(), "custom", None, None).unwrap();
        assert_eq!(plan.geometry.width_px, 99);
        assert_eq!(plan.geometry.height_px, 105);
    }

    #[test]
    fn custom_geometry_matches_ratios() {
        let profile = ProfileRegistry::resolve("custom");
        let g = LayoutEngine::geometry(profile, LabelSize::new(35.0, 37.0), 72).unwrap();
        assert_eq!(g.border_px, 1);
        // base = 99 / 16 = 6
        assert_eq!(g.fonts, FontSizes { large: 9, medium: 7, small: 5 });
        // min(99, floor(0.4 * 105))
        assert_eq!(g.code.size, 42);
        assert_eq!(g.code.x, 28);
        assert_eq!(g.code.y, 1 + 103 / 20);
        assert_eq!(g.line_height_px, 10);
        assert_eq!(g.text_top_px, g.code.y + 42 + 105 / 40);
    }

    #[test]
    fn thermal_profile_anchors_code_to_border() {
        let large = SizeRequest::Preset("large".into());
        let plan = LayoutEngine::layout(&record(), "ql820nwb", Some(&large), None).unwrap();
        let g = plan.geometry;
        assert_eq!((g.width_px, g.height_px), (732, 886));
        assert_eq!(g.code.y, g.border_px * 2);
        assert_eq!(plan.code.error_correction, EcLevel::M);
        // No note line on the thermal profile.
        assert!(plan.lines.iter().all(|l| l.text != "Speyside"));
    }

    #[test]
    fn geometry_is_pure() {
        let a = LayoutEngine::layout(&record(), "print", None, None).unwrap();
        let b = LayoutEngine::layout(&record(), "print", None, None).unwrap();
        assert_eq!(a.geometry, b.geometry);
        assert_eq!(a, b);
    }

    #[test]
    fn unknown_profile_uses_custom() {
        let plan = LayoutEngine::layout(&record(), "nonexistent", None, None).unwrap();
        assert_eq!(plan.profile, "custom");
        assert_eq!(plan.dpi, 72);
    }

    #[test]
    fn lines_follow_field_order() {
        let plan = LayoutEngine::layout(&record(), "custom", None, None).unwrap();
        let texts: Vec<&str> = plan.lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "Glenfiddich 12 Year Old",
                "Distillery: Glenfiddich",
                "ABV: 40%",
                "Age: 12 years",
                "Speyside",
                "ID: 12345",
            ]
        );
        let step = plan.geometry.line_height_px;
        for pair in plan.lines.windows(2) {
            assert_eq!(pair[1].y - pair[0].y, step);
        }
    }

    #[test]
    fn optional_lines_are_skipped() {
        let mut bare = record();
        bare.age = Some("  ".into());
        bare.note = None;
        let plan = LayoutEngine::layout(&bare, "custom", None, None).unwrap();
        assert_eq!(plan.lines.len(), 4);
        assert_eq!(plan.lines[3].text, "ID: 12345");
    }

    #[test]
    fn truncation_bound_holds() {
        for max in 3..40 {
            for text in ["", "short", "a much longer bottle name that keeps going on"] {
                let out = truncate_line(text, max);
                let len = text.chars().count();
                if len <= max {
                    assert_eq!(out, text);
                } else {
                    assert_eq!(out.chars().count(), max);
                    assert!(out.ends_with("..."));
                    let head: String = text.chars().take(max - 3).collect();
                    assert!(out.starts_with(&head));
                }
            }
        }
        assert_eq!(truncate_line("Glenfarclås Family Cask", 8), "Glenf...");
    }

    #[test]
    fn long_names_are_truncated_in_plan() {
        let mut long = record();
        long.name = "Port Ellen 1979 Rare Malts Selection Natural Cask Strength".into();
        let plan = LayoutEngine::layout(&long, "custom", None, None).unwrap();
        let g = plan.geometry;
        // 99 / (9 / 2)
        assert_eq!(max_chars(g.width_px, g.fonts.large, 2), 24);
        assert_eq!(plan.lines[0].text.chars().count(), 24);
        assert!(plan.lines[0].text.ends_with("..."));
        assert!(plan.lines.iter().all(|l| l.x < g.width_px));
    }

    #[test]
    fn invalid_geometry_is_rejected() {
        let zero = SizeRequest::Custom(LabelSize::new(0.0, 37.0));
        let err = LayoutEngine::layout(&record(), "custom", Some(&zero), None).unwrap_err();
        assert!(matches!(err, DramtagError::Validation(_)));

        let err = LayoutEngine::layout(&record(), "custom", None, Some(0)).unwrap_err();
        assert!(matches!(err, DramtagError::Validation(_)));

        let tiny = SizeRequest::Custom(LabelSize::new(0.1, 0.1));
        assert!(LayoutEngine::layout(&record(), "custom", Some(&tiny), Some(72)).is_err());
    }

    #[test]
    fn oversized_labels_are_rejected() {
        for mm in [1e12, 1e9, 2_000.0] {
            let huge = SizeRequest::Custom(LabelSize::new(mm, mm));
            let err =
                LayoutEngine::layout(&record(), "custom", Some(&huge), Some(300)).unwrap_err();
            assert!(matches!(err, DramtagError::Validation(_)));
        }
        let tall = SizeRequest::Custom(LabelSize::new(35.0, 1e12));
        let err = LayoutEngine::layout(&record(), "print", Some(&tall), None).unwrap_err();
        assert!(matches!(err, DramtagError::Validation(_)));
    }

    #[test]
    fn largest_accepted_label_lays_out() {
        // 1693 mm at 300 dpi is 19996 px.
        let edge = SizeRequest::Custom(LabelSize::new(1693.0, 1693.0));
        let plan = LayoutEngine::layout(&record(), "ql820nwb", Some(&edge), None).unwrap();
        let g = plan.geometry;
        assert!(g.width_px <= MAX_SIDE_PX && g.height_px <= MAX_SIDE_PX);
        assert!(g.code.x + g.code.size <= g.width_px);
        assert!(g.code.size <= crate::qr::MAX_CODE_PX);
        let mut last = 0;
        for line in &plan.lines {
            assert!(line.y >= last);
            last = line.y;
        }
    }
}
