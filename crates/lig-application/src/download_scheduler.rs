//! Bounded worker pool for asset downloads.
//!
//! Tasks go into a channel drained by a fixed number of scoped worker
//! threads. `schedule` is a barrier: it returns once every task has a result.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::thread;

use crossbeam_channel::unbounded;
use lig_core::config::{DEFAULT_DOWNLOAD_WORKERS, LigConfig};
use lig_core::download::{AssetFetcher, DownloadResult, DownloadTask};
use lig_core::{LigError, Result};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadScheduler {
    workers: usize,
}

impl Default for DownloadScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_DOWNLOAD_WORKERS)
    }
}

impl DownloadScheduler {
    /// A pool of `workers` threads (at least one).
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn from_config(config: &LigConfig) -> Self {
        Self::new(config.workers())
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Runs every task and returns one result per task, in input order.
    ///
    /// A failing or panicking fetch only fails its own result.
    pub fn schedule<F>(&self, fetcher: &F, tasks: Vec<DownloadTask>) -> Vec<DownloadResult>
    where
        F: AssetFetcher + ?Sized,
    {
        let total = tasks.len();
        if total == 0 {
            return Vec::new();
        }

        let (task_tx, task_rx) = unbounded::<(usize, DownloadTask)>();
        let (result_tx, result_rx) = unbounded::<(usize, DownloadResult)>();
        for item in tasks.into_iter().enumerate() {
            // The receiver is alive until the scope below ends.
            let _ = task_tx.send(item);
        }
        drop(task_tx);

        let workers = self.workers.min(total);
        debug!(tasks = total, workers, "Starting downloads");
        thread::scope(|scope| {
            for worker in 0..workers {
                let task_rx = task_rx.clone();
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    for (index, task) in task_rx.iter() {
                        let outcome = run_task(fetcher, &task);
                        if let Err(e) = &outcome {
                            warn!(
                                worker,
                                object = %task.object_name,
                                url = %task.url,
                                error = %e,
                                "Download failed"
                            );
                        }
                        if result_tx.send((index, DownloadResult { task, outcome })).is_err() {
                            break;
                        }
                    }
                });
            }
        });
        drop(result_tx);

        let mut results: Vec<(usize, DownloadResult)> = result_rx.iter().collect();
        results.sort_by_key(|(index, _)| *index);
        let failed = results.iter().filter(|(_, r)| !r.is_success()).count();
        info!(total, failed, "Downloads finished");
        results.into_iter().map(|(_, result)| result).collect()
    }
}

fn run_task<F>(fetcher: &F, task: &DownloadTask) -> Result<PathBuf>
where
    F: AssetFetcher + ?Sized,
{
    panic::catch_unwind(AssertUnwindSafe(|| fetcher.fetch(&task.url))).unwrap_or_else(|payload| {
        Err(LigError::io(format!(
            "download of {} panicked: {}",
            task.url,
            panic_message(payload.as_ref())
        )))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
