// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch label archive.
//
// One PNG per successful id plus a trailing `manifest.json` describing every
// item, successful or not, in the order it was added.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use dramtag_core::error::{DramtagError, Result};
use dramtag_core::types::Provenance;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

pub const MANIFEST_NAME: &str = "manifest.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Ok,
    Failed,
}

/// Manifest line for one id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub id: i64,
    pub status: ItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub generated_at: DateTime<Utc>,
    pub profile: String,
    pub items: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|i| i.status == ItemStatus::Ok).count()
    }
}

/// In-memory tar builder for a batch of labels.
pub struct LabelArchive {
    builder: tar::Builder<Vec<u8>>,
    manifest: Manifest,
    names: HashSet<String>,
}

impl LabelArchive {
    pub fn new(profile: impl Into<String>) -> Self {
        Self {
            builder: tar::Builder::new(Vec::new()),
            manifest: Manifest {
                generated_at: Utc::now(),
                profile: profile.into(),
                items: Vec::new(),
            },
            names: HashSet::new(),
        }
    }

    /// Add the PNG for `id`. Repeated ids get a numeric suffix.
    pub fn add_label(&mut self, id: i64, provenance: Provenance, png: &[u8]) -> Result<()> {
        let file = self.unique_name(id);
        self.append(&file, png)?;

        let digest = hex::encode(Sha256::digest(png));
        debug!(id, file = %file, bytes = png.len(), "label archived");
        self.manifest.items.push(ManifestEntry {
            id,
            status: ItemStatus::Ok,
            file: Some(file),
            sha256: Some(digest),
            provenance: Some(provenance),
            error: None,
        });
        Ok(())
    }

    /// Record that `id` produced no label.
    pub fn add_failure(&mut self, id: i64, error: impl Into<String>) {
        self.manifest.items.push(ManifestEntry {
            id,
            status: ItemStatus::Failed,
            file: None,
            sha256: None,
            provenance: None,
            error: Some(error.into()),
        });
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Append the manifest and return the archive bytes.
    pub fn finish(mut self) -> Result<(Vec<u8>, Manifest)> {
        let json = serde_json::to_vec_pretty(&self.manifest)?;
        self.append(MANIFEST_NAME, &json)?;
        let bytes = self
            .builder
            .into_inner()
            .map_err(|e| DramtagError::Archive(format!("finalising archive: {e}")))?;
        Ok((bytes, self.manifest))
    }

    fn unique_name(&mut self, id: i64) -> String {
        let mut name = format!("label_{id}.png");
        let mut n = 1;
        while self.names.contains(&name) {
            n += 1;
            name = format!("label_{id}_{n}.png");
        }
        self.names.insert(name.clone());
        name
    }

    fn append(&mut self, name: &str, data: &[u8]) -> Result<()> {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(self.manifest.generated_at.timestamp().max(0) as u64);
        header.set_cksum();
        self.builder
            .append_data(&mut header, name, data)
            .map_err(|e| DramtagError::Archive(format!("{name}: {e}")))
    }
}
