// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// dramtag-fetch — Bottle metadata resolution for the dramtag label generator.
//
// Ordered acquisition strategies (sessioned page fetch, structured API, plain
// detail page), payload normalization for JSON and HTML shapes, the
// deterministic fallback catalogue and concurrent batch resolution.

pub mod batch;
pub mod fallback;
pub mod http;
pub mod normalize;
pub mod resolver;
pub mod session;
pub mod strategy;

pub use batch::{BatchItemError, BatchOptions, BatchOutcome, resolve_batch, run_batch};
pub use fallback::FallbackCatalog;
pub use normalize::Normalizer;
pub use resolver::{Resolver, ResolverBuilder};
pub use strategy::{AcquisitionStrategy, RawPayload};
