// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Label renderer.
//
// Paints a render plan onto an RGB canvas and encodes it as PNG. Drawing
// order is background, border, QR code, text.

use std::path::PathBuf;

use dramtag_core::error::{DramtagError, Result};
use image::{DynamicImage, ImageFormat, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use tracing::{debug, instrument, warn};

use crate::font::LabelFont;
use crate::layout::{MAX_SIDE_PX, RenderPlan};
use crate::qr::{self, DARK};

/// Stateless apart from the loaded font; safe to share across threads.
#[derive(Debug)]
pub struct LabelRenderer {
    font: LabelFont,
}

impl Default for LabelRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelRenderer {
    /// Renderer using the first system font found.
    pub fn new() -> Self {
        Self::with_font_dirs(&[])
    }

    /// Renderer searching `dirs` before the system font directories.
    pub fn with_font_dirs(dirs: &[PathBuf]) -> Self {
        Self {
            font: LabelFont::load(dirs),
        }
    }

    /// Renderer drawing text with the built-in bitmap font only.
    pub fn builtin() -> Self {
        Self {
            font: LabelFont::Builtin,
        }
    }

    pub fn with_font(font: LabelFont) -> Self {
        Self { font }
    }

    pub fn font(&self) -> &LabelFont {
        &self.font
    }

    // -- Rendering ------------------------------------------------------------

    /// Render `plan` to PNG bytes.
    #[instrument(skip_all, fields(profile = plan.profile, payload = %plan.code.payload))]
    pub fn render(&self, plan: &RenderPlan) -> Result<Vec<u8>> {
        let canvas = self.paint(plan)?;
        let png = encode_png(canvas)?;
        debug!(bytes = png.len(), "label encoded");
        Ok(png)
    }

    /// Render `plan` to an in-memory canvas.
    pub fn paint(&self, plan: &RenderPlan) -> Result<RgbImage> {
        let g = &plan.geometry;
        if g.width_px == 0 || g.height_px == 0 || g.width_px.max(g.height_px) > MAX_SIDE_PX {
            return Err(DramtagError::Validation(format!(
                "cannot render a {}x{} px label",
                g.width_px, g.height_px
            )));
        }

        let background = plan.colors.background.to_pixel();
        let mut canvas = RgbImage::from_pixel(g.width_px, g.height_px, background);
        draw_border(&mut canvas, g.border_px, plan.colors.border.to_pixel());
        self.draw_code(&mut canvas, plan);

        let ink = plan.colors.text.to_pixel();
        for line in &plan.lines {
            let measured = self.font.measure(line.font_px, &line.text).min(g.width_px);
            let x = ((g.width_px - measured) / 2) as i32;
            self.font.draw(&mut canvas, x, line.y as i32, line.font_px, ink, &line.text);
        }
        Ok(canvas)
    }

    fn draw_code(&self, canvas: &mut RgbImage, plan: &RenderPlan) {
        let area = plan.geometry.code;
        if area.size == 0 {
            return;
        }
        let code = match qr::render_code(
            &plan.code.payload,
            area.size,
            plan.code.error_correction,
            plan.code.quiet_zone,
        ) {
            Ok(code) => code,
            Err(e) => {
                warn!(error = %e, "QR code unavailable, leaving its box blank");
                return;
            }
        };

        let ink = plan.colors.text.to_pixel();
        for (x, y, pixel) in code.enumerate_pixels() {
            let (cx, cy) = (area.x + x, area.y + y);
            if *pixel == DARK && cx < canvas.width() && cy < canvas.height() {
                canvas.put_pixel(cx, cy, ink);
            }
        }
    }
}

/// Concentric one-pixel rectangles, outermost first.
fn draw_border(canvas: &mut RgbImage, width: u32, color: image::Rgb<u8>) {
    let (w, h) = canvas.dimensions();
    for inset in 0..width {
        let (rw, rh) = (w.saturating_sub(2 * inset), h.saturating_sub(2 * inset));
        if rw == 0 || rh == 0 {
            break;
        }
        let rect = Rect::at(inset as i32, inset as i32).of_size(rw, rh);
        draw_hollow_rect_mut(canvas, rect, color);
    }
}

/// Encode any in-memory raster as PNG bytes.
pub fn encode_png(image: impl Into<DynamicImage>) -> Result<Vec<u8>> {
    let image: DynamicImage = image.into();
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    image
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|err| DramtagError::Image(format!("PNG encoding failed: {err}")))?;
    Ok(buffer)
}
