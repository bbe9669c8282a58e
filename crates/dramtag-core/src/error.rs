// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for dramtag.

use thiserror::Error;

/// Why a single acquisition attempt failed.
///
/// Every variant is transient from the resolver's point of view: it is logged
/// and the strategy chain moves on to the next source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AcquisitionError {
    #[error("timeout")]
    Timeout,

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("upstream answered with status {0}")]
    Status(u16),

    #[error("upstream refused the request (status {0})")]
    Blocked(u16),

    #[error("malformed payload: {0}")]
    Malformed(String),
}

impl AcquisitionError {
    /// Classify a non-success HTTP status.
    ///
    /// 401/403/429 mean the upstream is actively turning us away, everything
    /// else is a plain failed response.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 | 429 => Self::Blocked(status),
            other => Self::Status(other),
        }
    }

    /// Short machine-friendly reason used in log fields.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connection(_) => "connection",
            Self::Status(_) => "status",
            Self::Blocked(_) => "blocked",
            Self::Malformed(_) => "malformed",
        }
    }
}

/// Top-level error type for all dramtag operations.
#[derive(Debug, Error)]
pub enum DramtagError {
    // -- Resolution --
    #[error("acquisition failed: {0}")]
    Acquisition(#[from] AcquisitionError),

    #[error("payload could not be normalized: {0}")]
    Normalization(String),

    // -- Caller input --
    #[error("invalid input: {0}")]
    Validation(String),

    // -- Rendering --
    #[error("render asset unavailable: {0}")]
    RenderAsset(String),

    #[error("profile not found: {0}")]
    ProfileNotFound(String),

    #[error("image encoding failed: {0}")]
    Image(String),

    #[error("archive packaging failed: {0}")]
    Archive(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DramtagError>;
