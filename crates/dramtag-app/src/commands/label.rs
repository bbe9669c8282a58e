// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Single-label commands: resolve-and-render and render-from-manual-input.

use std::path::{Path, PathBuf};

use dramtag_core::error::Result;
use dramtag_core::types::{CanonicalRecord, ManualFields};
use dramtag_render::{LabelRenderer, LayoutEngine, RenderGeometry};
use serde::Serialize;
use tracing::{info, instrument};

use crate::cli::RenderArgs;
use crate::services::context::AppContext;

#[derive(Debug, Serialize)]
pub struct LabelReport {
    pub record: CanonicalRecord,
    pub profile: &'static str,
    pub dpi: u32,
    pub geometry: RenderGeometry,
    pub path: PathBuf,
    pub bytes: usize,
}

#[instrument(skip(ctx, render, output), fields(profile = %render.profile))]
pub async fn label(
    ctx: &AppContext,
    id: i64,
    render: &RenderArgs,
    output: Option<PathBuf>,
) -> Result<LabelReport> {
    let record = ctx.resolver.resolve(id).await;
    write_label(&ctx.renderer, record, render, output)
}

/// Complete manual fields win; otherwise `fields.id` is resolved.
#[instrument(skip_all, fields(profile = %render.profile))]
pub async fn manual(
    ctx: &AppContext,
    fields: &ManualFields,
    render: &RenderArgs,
    output: Option<PathBuf>,
) -> Result<LabelReport> {
    let record = ctx.resolver.resolve_request(fields.id, fields).await?;
    write_label(&ctx.renderer, record, render, output)
}

fn write_label(
    renderer: &LabelRenderer,
    record: CanonicalRecord,
    render: &RenderArgs,
    output: Option<PathBuf>,
) -> Result<LabelReport> {
    let size = render.size_request()?;
    let plan = LayoutEngine::layout(&record, &render.profile, size.as_ref(), render.dpi)?;
    let png = renderer.render(&plan)?;

    let path = output.unwrap_or_else(|| default_path(record.id));
    write_file(&path, &png)?;
    info!(
        id = record.id,
        provenance = record.provenance.as_str(),
        path = %path.display(),
        "label written"
    );

    Ok(LabelReport {
        profile: plan.profile,
        dpi: plan.dpi,
        geometry: plan.geometry,
        bytes: png.len(),
        record,
        path,
    })
}

fn default_path(id: i64) -> PathBuf {
    PathBuf::from(format!("label_{id}.png"))
}

pub(crate) fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, data)?;
    Ok(())
}
