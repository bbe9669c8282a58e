// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch labels: resolve many ids concurrently, render each record and pack
// the PNGs with a manifest into one tar archive.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dramtag_core::error::{DramtagError, Result};
use dramtag_core::types::CanonicalRecord;
use dramtag_fetch::{BatchItemError, BatchOptions, BatchOutcome, resolve_batch};
use dramtag_render::{LabelArchive, LabelRenderer, LayoutEngine, Manifest, SizeRequest};
use dramtag_render::profile::ProfileRegistry;
use serde::Serialize;
use tracing::{info, instrument, warn};

use super::label::write_file;
use crate::cli::RenderArgs;
use crate::services::context::AppContext;

#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub path: PathBuf,
    pub bytes: usize,
    pub manifest: Manifest,
}

#[instrument(skip(ctx, render), fields(items = ids.len(), profile = %render.profile))]
pub async fn batch(
    ctx: &AppContext,
    ids: &[i64],
    workers: Option<usize>,
    render: &RenderArgs,
    output: &Path,
) -> Result<BatchReport> {
    let size = render.size_request()?;
    let options = BatchOptions::new(
        workers.unwrap_or(ctx.config.batch_workers),
        ctx.config.batch_item_timeout(),
    );
    let outcomes = resolve_batch(Arc::clone(&ctx.resolver), ids, options).await;

    let renderer = Arc::clone(&ctx.renderer);
    let profile = render.profile.clone();
    let dpi = render.dpi;
    let (bytes, manifest) = tokio::task::spawn_blocking(move || {
        package(&renderer, outcomes, &profile, size.as_ref(), dpi)
    })
    .await
    .map_err(|e| DramtagError::Archive(format!("render worker failed: {e}")))??;

    write_file(output, &bytes)?;
    info!(
        path = %output.display(),
        ok = manifest.succeeded(),
        total = manifest.items.len(),
        "batch archive written"
    );
    Ok(BatchReport {
        path: output.to_path_buf(),
        bytes: bytes.len(),
        manifest,
    })
}

/// Render every resolved record; failures become manifest entries.
fn package(
    renderer: &LabelRenderer,
    outcomes: Vec<BatchOutcome<CanonicalRecord>>,
    profile: &str,
    size: Option<&SizeRequest>,
    dpi: Option<u32>,
) -> Result<(Vec<u8>, Manifest)> {
    let mut archive = LabelArchive::new(ProfileRegistry::resolve(profile).name);
    for outcome in outcomes {
        let record = match outcome.result {
            Ok(record) => record,
            Err(e) => {
                archive.add_failure(outcome.id, describe(&e));
                continue;
            }
        };
        let png = LayoutEngine::layout(&record, profile, size, dpi)
            .and_then(|plan| renderer.render(&plan));
        match png {
            Ok(png) => archive.add_label(outcome.id, record.provenance, &png)?,
            Err(e) => {
                warn!(id = outcome.id, error = %e, "label render failed");
                archive.add_failure(outcome.id, e.to_string());
            }
        }
    }
    archive.finish()
}

fn describe(error: &BatchItemError) -> String {
    match error {
        BatchItemError::TimedOut(window) => format!("timed out after {}s", window.as_secs()),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dramtag_core::types::Provenance;
    use dramtag_render::ItemStatus;
    use std::time::Duration;

    fn args() -> RenderArgs {
        RenderArgs {
            profile: "ql820nwb".into(),
            preset: Some("small".into()),
            width_mm: None,
            height_mm: None,
            dpi: None,
        }
    }

    #[tokio::test]
    async fn offline_batch_packs_every_id() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = AppContext::offline(dir.path().to_path_buf());
        let out = dir.path().join("labels.tar");

        let report = batch(&ctx, &[12345, 0, 7], Some(2), &args(), &out).await.unwrap();
        assert_eq!(report.manifest.profile, "ql820nwb");
        assert_eq!(report.manifest.succeeded(), 3);
        let ids: Vec<i64> = report.manifest.items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![12345, 0, 7]);
        assert!(report.manifest.items.iter().all(|i| i.provenance == Some(Provenance::Fallback)));
        assert_eq!(std::fs::metadata(&out).unwrap().len() as usize, report.bytes);
    }

    #[test]
    fn failed_items_are_recorded() {
        let renderer = LabelRenderer::builtin();
        let outcomes = vec![
            BatchOutcome {
                id: 1,
                result: Err(BatchItemError::TimedOut(Duration::from_secs(60))),
            },
            BatchOutcome {
                id: 2,
                result: Err(BatchItemError::Aborted),
            },
        ];
        let (_, manifest) = package(&renderer, outcomes, "custom", None, None).unwrap();
        assert_eq!(manifest.succeeded(), 0);
        assert!(manifest.items.iter().all(|i| i.status == ItemStatus::Failed));
        assert_eq!(manifest.items[0].error.as_deref(), Some("timed out after 60s"));
    }

    #[test]
    fn invalid_dpi_fails_per_item() {
        let renderer = LabelRenderer::builtin();
        let record = dramtag_fetch::FallbackCatalog::builtin().record(5, "https://wb.test");
        let outcomes = vec![BatchOutcome { id: 5, result: Ok(record) }];
        let (_, manifest) = package(&renderer, outcomes, "custom", None, Some(0)).unwrap();
        assert_eq!(manifest.items[0].status, ItemStatus::Failed);
        assert!(manifest.items[0].error.as_deref().unwrap().contains("dpi"));
    }
}
