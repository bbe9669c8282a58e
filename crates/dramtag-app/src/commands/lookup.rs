// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Read-only commands: metadata lookup, profile listing, standalone QR codes.

use std::path::PathBuf;

use dramtag_core::error::Result;
use dramtag_core::types::{CanonicalRecord, detail_url};
use dramtag_render::profile::{EcLevel, ProfileConfig, ProfileRegistry};
use dramtag_render::qr;
use serde::Serialize;
use tracing::info;

use super::label::write_file;
use crate::services::context::AppContext;

/// Quiet zone used for standalone codes, in modules.
const STANDALONE_QUIET_ZONE: u32 = 4;

#[derive(Debug, Serialize)]
pub struct QrReport {
    pub payload: String,
    pub size: u32,
    pub error_correction: EcLevel,
    pub path: PathBuf,
}

pub async fn resolve(ctx: &AppContext, id: i64) -> CanonicalRecord {
    ctx.resolver.resolve(id).await
}

pub fn profiles() -> &'static [ProfileConfig] {
    ProfileRegistry::list()
}

pub fn qr(
    ctx: &AppContext,
    id: i64,
    size: u32,
    ec: EcLevel,
    output: Option<PathBuf>,
) -> Result<QrReport> {
    let payload = detail_url(ctx.resolver.base_url(), id);
    let png = qr::render_code_png(&payload, size, ec, STANDALONE_QUIET_ZONE)?;
    let path = output.unwrap_or_else(|| PathBuf::from(format!("qr_{id}.png")));
    write_file(&path, &png)?;
    info!(id, path = %path.display(), "QR code written");
    Ok(QrReport {
        payload,
        size,
        error_correction: ec,
        path,
    })
}
