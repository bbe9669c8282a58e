// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// QR code rasterisation.
//
// The module matrix is generated in memory and scaled with nearest-neighbour
// sampling to an exact square, quiet zone included.

use dramtag_core::error::{DramtagError, Result};
use image::{GrayImage, Luma};
use qrcode::{Color, QrCode};
use tracing::debug;

use crate::profile::EcLevel;
use crate::renderer::encode_png;

pub const DARK: Luma<u8> = Luma([0]);
pub const LIGHT: Luma<u8> = Luma([255]);

/// Largest side, in pixels, of a standalone code.
pub const MAX_CODE_PX: u32 = 10_000;

/// Render `payload` as a `size`x`size` grayscale QR code.
///
/// `quiet_zone` is the light margin around the symbol, in modules.
pub fn render_code(payload: &str, size: u32, ec: EcLevel, quiet_zone: u32) -> Result<GrayImage> {
    if size == 0 {
        return Err(DramtagError::Validation("QR code size must be positive".into()));
    }
    if size > MAX_CODE_PX {
        return Err(DramtagError::Validation(format!(
            "QR code size {size} px exceeds the {MAX_CODE_PX} px limit"
        )));
    }

    let code = QrCode::with_error_correction_level(payload.as_bytes(), ec.to_qr())
        .map_err(|e| DramtagError::RenderAsset(format!("QR encode error: {e}")))?;
    let modules = code.to_colors();
    let symbol = code.width() as u32;
    let total = symbol + 2 * quiet_zone;

    if size < total {
        debug!(size, modules = total, "QR box smaller than module count");
    }

    let mut img = GrayImage::from_pixel(size, size, LIGHT);
    for (px, py, pixel) in img.enumerate_pixels_mut() {
        let mx = (px as u64 * total as u64 / size as u64) as u32;
        let my = (py as u64 * total as u64 / size as u64) as u32;
        let inside = (quiet_zone..quiet_zone + symbol).contains(&mx)
            && (quiet_zone..quiet_zone + symbol).contains(&my);
        if inside {
            let index = ((my - quiet_zone) * symbol + (mx - quiet_zone)) as usize;
            if modules[index] == Color::Dark {
                *pixel = DARK;
            }
        }
    }
    Ok(img)
}

/// [`render_code`] encoded as PNG.
pub fn render_code_png(payload: &str, size: u32, ec: EcLevel, quiet_zone: u32) -> Result<Vec<u8>> {
    encode_png(render_code(payload, size, ec, quiet_zone)?)
}
