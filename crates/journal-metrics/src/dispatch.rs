//! Bounded concurrent fan-out.

use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Run `f` for every item with at most `workers` running at once.
///
/// Each call is a spawned task; results come back in completion order. A task
/// that panics or is cancelled is logged with its item and left out, the rest
/// of the batch carries on.
pub async fn dispatch<I, F, Fut, T>(items: Vec<I>, workers: usize, stage: &str, f: F) -> Vec<T>
where
    I: Debug,
    F: Fn(I) -> Fut,
    Fut: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let total = items.len();
    let semaphore = Arc::new(Semaphore::new(workers.max(1)));
    let mut tasks = FuturesUnordered::new();

    for item in items {
        let label = format!("{item:?}");
        let semaphore = Arc::clone(&semaphore);
        let work = f(item);
        let handle = tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok()?;
            Some(work.await)
        });
        tasks.push(async move { (label, handle.await) });
    }

    let mut results = Vec::with_capacity(total);
    let mut done = 0_usize;
    while let Some((label, joined)) = tasks.next().await {
        done += 1;
        match joined {
            Ok(Some(value)) => results.push(value),
            Ok(None) => warn!(stage, item = %label, "Task could not acquire a worker slot"),
            Err(e) => warn!(stage, item = %label, error = %e, "Task failed, skipping"),
        }
        debug!(stage, done, total, "Dispatch progress");
    }

    results
}
