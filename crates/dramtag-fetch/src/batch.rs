// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Concurrent batch processing of ids.
//
// Items run on a JoinSet, gated by a semaphore sized to the worker count.
// Every id gets exactly one outcome, in input order. A failing or panicking
// item never cancels the others.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dramtag_core::types::CanonicalRecord;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::resolver::Resolver;

/// Slack on the outer item window; the inner fallback must fire first.
const FALLBACK_GRACE: Duration = Duration::from_millis(500);

/// Concurrency and time limits for one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    pub workers: usize,
    pub item_timeout: Duration,
}

impl BatchOptions {
    pub fn new(workers: usize, item_timeout: Duration) -> Self {
        Self {
            workers: workers.max(1),
            item_timeout,
        }
    }
}

/// Why one batch item produced no value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchItemError {
    #[error("item exceeded its {0:?} window")]
    TimedOut(Duration),

    #[error("item worker aborted")]
    Aborted,

    #[error("{0}")]
    Failed(String),
}

/// Result for one id.
#[derive(Debug)]
pub struct BatchOutcome<T> {
    pub id: i64,
    pub result: Result<T, BatchItemError>,
}

impl<T> BatchOutcome<T> {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Run `job` for every id with bounded concurrency.
///
/// Each item is limited to `options.item_timeout` once it holds a worker
/// slot. Outcomes come back in the order of `ids`.
pub async fn run_batch<T, F, Fut>(
    ids: &[i64],
    options: BatchOptions,
    job: F,
) -> Vec<BatchOutcome<T>>
where
    T: Send + 'static,
    F: Fn(i64) -> Fut,
    Fut: Future<Output = Result<T, BatchItemError>> + Send + 'static,
{
    let slots = Arc::new(Semaphore::new(options.workers.max(1)));
    let window = options.item_timeout;
    let mut set = JoinSet::new();

    for (index, &id) in ids.iter().enumerate() {
        let slots = Arc::clone(&slots);
        let work = job(id);
        set.spawn(async move {
            let _slot = slots.acquire_owned().await;
            let result = match tokio::time::timeout(window, work).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(id, "batch item timed out");
                    Err(BatchItemError::TimedOut(window))
                }
            };
            (index, result)
        });
    }

    let mut results: Vec<Option<Result<T, BatchItemError>>> =
        std::iter::repeat_with(|| None).take(ids.len()).collect();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((index, result)) => results[index] = Some(result),
            Err(e) => warn!(error = %e, "batch worker did not finish"),
        }
    }

    debug!(items = ids.len(), "batch finished");
    ids.iter()
        .zip(results)
        .map(|(&id, result)| BatchOutcome {
            id,
            result: result.unwrap_or(Err(BatchItemError::Aborted)),
        })
        .collect()
}

/// Resolve many ids concurrently.
///
/// An item whose window elapses gets the fallback record instead of an error.
pub async fn resolve_batch(
    resolver: Arc<Resolver>,
    ids: &[i64],
    options: BatchOptions,
) -> Vec<BatchOutcome<CanonicalRecord>> {
    let window = options.item_timeout;
    let outer = BatchOptions {
        item_timeout: window.saturating_add(FALLBACK_GRACE),
        ..options
    };
    run_batch(ids, outer, move |id| {
        let resolver = Arc::clone(&resolver);
        async move {
            match tokio::time::timeout(window, resolver.resolve(id)).await {
                Ok(record) => Ok(record),
                Err(_) => {
                    warn!(id, "resolution window elapsed, using fallback");
                    Ok(resolver.fallback(id))
                }
            }
        }
    })
    .await
}
