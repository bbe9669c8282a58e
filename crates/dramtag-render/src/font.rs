// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Label fonts.
//
// A TrueType font is looked up in the configured font directories and then in
// the usual system locations. When none can be loaded, text is drawn with a
// built-in 5x7 bitmap font so rendering never fails on a missing asset.

use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use dramtag_core::error::{DramtagError, Result};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use tracing::{debug, warn};

/// File names tried in each directory, in order.
const FONT_FILES: &[&str] = &[
    "DejaVuSans.ttf",
    "Arial.ttf",
    "arial.ttf",
    "LiberationSans-Regular.ttf",
];

const SYSTEM_FONT_DIRS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu",
    "/usr/share/fonts/dejavu",
    "/usr/share/fonts/TTF",
    "/usr/share/fonts/truetype/liberation",
    "/Library/Fonts",
    "/System/Library/Fonts/Supplemental",
    "C:\\Windows\\Fonts",
];

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;
const CELL_WIDTH: u32 = GLYPH_WIDTH + 1;
const CELL_HEIGHT: u32 = GLYPH_HEIGHT + 1;

pub enum LabelFont {
    Outline(FontVec),
    Builtin,
}

impl std::fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Outline(_) => f.write_str("LabelFont::Outline"),
            Self::Builtin => f.write_str("LabelFont::Builtin"),
        }
    }
}

impl LabelFont {
    /// First usable font from `extra_dirs` and the system directories, or the
    /// built-in bitmap font.
    pub fn load(extra_dirs: &[PathBuf]) -> Self {
        let dirs: Vec<PathBuf> = extra_dirs
            .iter()
            .cloned()
            .chain(SYSTEM_FONT_DIRS.iter().map(PathBuf::from))
            .collect();
        match Self::search(&dirs) {
            Ok(font) => font,
            Err(e) => {
                warn!(error = %e, "falling back to built-in bitmap font");
                Self::Builtin
            }
        }
    }

    /// First usable font in `dirs` only.
    pub fn search(dirs: &[PathBuf]) -> Result<Self> {
        for dir in dirs {
            for file in FONT_FILES {
                let path = dir.join(file);
                if !path.is_file() {
                    continue;
                }
                match Self::from_file(&path) {
                    Ok(font) => {
                        debug!(path = %path.display(), "font loaded");
                        return Ok(font);
                    }
                    Err(e) => debug!(path = %path.display(), error = %e, "font rejected"),
                }
            }
        }
        Err(DramtagError::RenderAsset(format!(
            "no usable font in {} directories",
            dirs.len()
        )))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| DramtagError::RenderAsset(format!("{}: {e}", path.display())))?;
        Self::from_bytes(bytes)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        FontVec::try_from_vec(bytes)
            .map(Self::Outline)
            .map_err(|e| DramtagError::RenderAsset(format!("invalid font data: {e}")))
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, Self::Builtin)
    }

    /// Drawn width of `text` at `px` pixels tall.
    pub fn measure(&self, px: u32, text: &str) -> u32 {
        match self {
            Self::Outline(font) => text_size(PxScale::from(px as f32), font, text).0,
            Self::Builtin => {
                let scale = (px / CELL_HEIGHT).max(1);
                let chars = text.chars().count() as u32;
                chars
                    .saturating_mul(CELL_WIDTH * scale)
                    .saturating_sub(scale)
            }
        }
    }

    /// Draw `text` with its top-left corner at `(x, y)`, `px` pixels tall.
    pub fn draw(&self, canvas: &mut RgbImage, x: i32, y: i32, px: u32, color: Rgb<u8>, text: &str) {
        match self {
            Self::Outline(font) => {
                draw_text_mut(canvas, color, x, y, PxScale::from(px as f32), font, text);
            }
            Self::Builtin => draw_bitmap_text(canvas, x, y, px, color, text),
        }
    }
}

// -- Bitmap font --------------------------------------------------------------

fn draw_bitmap_text(canvas: &mut RgbImage, x: i32, y: i32, px: u32, color: Rgb<u8>, text: &str) {
    let scale = (px / CELL_HEIGHT).max(1);
    let mut cursor = x;
    for c in text.chars() {
        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                    continue;
                }
                let dot = Rect::at(
                    cursor + (col * scale) as i32,
                    y + (row as u32 * scale) as i32,
                )
                .of_size(scale, scale);
                draw_filled_rect_mut(canvas, dot, color);
            }
        }
        cursor += (CELL_WIDTH * scale) as i32;
    }
}

/// Row bitmaps, top row first, bit 4 is the leftmost column.
fn glyph(c: char) -> [u8; 7] {
    match c.to_ascii_uppercase() {
        ' ' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        'A' => [0x0E, 0x11, 0x11, 0x11, 0x1F, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        ',' => [0x00, 0x00, 0x00, 0x00, 0x0C, 0x04, 0x08],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '+' => [0x00, 0x04, 0x04, 0x1F, 0x04, 0x04, 0x00],
        '%' => [0x18, 0x19, 0x02, 0x04, 0x08, 0x13, 0x03],
        '#' => [0x0A, 0x0A, 0x1F, 0x0A, 0x1F, 0x0A, 0x0A],
        '|' => [0x04, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        '/' => [0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x00],
        '(' => [0x02, 0x04, 0x08, 0x08, 0x08, 0x04, 0x02],
        ')' => [0x08, 0x04, 0x02, 0x02, 0x02, 0x04, 0x08],
        '\'' => [0x0C, 0x04, 0x08, 0x00, 0x00, 0x00, 0x00],
        '&' => [0x0C, 0x12, 0x14, 0x08, 0x15, 0x12, 0x0D],
        '!' => [0x04, 0x04, 0x04, 0x04, 0x04, 0x00, 0x04],
        _ => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04],
    }
}
