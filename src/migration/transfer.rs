// ABOUTME: Fixed-size transfer worker pool over a shared job queue
// ABOUTME: Exactly one result per dispatched job; retries re-enter the queue

use crate::migration::table::{MigrationJob, TableDescriptor, TransferResult};
use crate::remote::RemoteFileChannel;
use anyhow::{Context, Result};
use indicatif::ProgressBar;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Mutex};

/// Pool sizing and retry policy for the transfer phase.
#[derive(Debug, Clone)]
pub struct TransferOptions {
    /// Number of workers, which is also the cap on simultaneous remote
    /// sessions regardless of table count.
    pub workers: usize,
    /// Additional attempts per table after the first failed one.
    pub retries: u32,
    /// Base delay before a retry, doubled per attempt.
    pub retry_delay: Duration,
}

/// Copy one table's file pair, metadata file first.
///
/// Both files must succeed for the table to be importable; the first failure
/// fails the whole job.
async fn copy_table_files<C>(channel: &C, table: &TableDescriptor) -> Result<()>
where
    C: RemoteFileChannel + ?Sized,
{
    for (local, remote) in table.file_pairs() {
        channel
            .copy(local, remote)
            .await
            .with_context(|| format!("copying {}", local.display()))?;
    }
    Ok(())
}

async fn worker_loop<C>(
    worker_id: usize,
    channel: Arc<C>,
    jobs: Arc<Mutex<mpsc::Receiver<MigrationJob>>>,
    results: mpsc::Sender<TransferResult>,
) where
    C: RemoteFileChannel + 'static,
{
    loop {
        // Hold the receiver only while waiting for a job, never during a copy
        let job = { jobs.lock().await.recv().await };
        let Some(job) = job else {
            break; // queue closed and drained
        };

        tracing::debug!(
            "Worker {} transferring `{}` (attempt {})",
            worker_id,
            job.table.name,
            job.attempt + 1
        );

        let started = Instant::now();
        let outcome = copy_table_files(channel.as_ref(), &job.table).await;
        let result = TransferResult {
            table: Arc::clone(&job.table),
            attempt: job.attempt,
            elapsed: started.elapsed(),
            error: outcome.err().map(|e| format!("{:#}", e)),
        };

        if results.send(result).await.is_err() {
            break; // collector is gone; nothing left to account to
        }
    }
}

/// Run the transfer phase: fan the tables out to `workers` workers and
/// collect exactly one final result per table.
///
/// Workers never retry internally. A failed result with remaining retry
/// budget goes back on the queue after a backoff delay; only the exhausted
/// (or successful) result is returned. The queue and the results channel are
/// each closed exactly once, after all jobs have been dispatched and drained,
/// so the pool cannot deadlock on a half-closed channel.
pub async fn run_transfers<C>(
    channel: Arc<C>,
    tables: &[Arc<TableDescriptor>],
    options: &TransferOptions,
    progress: &ProgressBar,
) -> Vec<TransferResult>
where
    C: RemoteFileChannel + 'static,
{
    let total = tables.len();
    if total == 0 {
        return Vec::new();
    }

    // Sized to the table count so dispatch below never blocks on capacity
    let (job_tx, job_rx) = mpsc::channel::<MigrationJob>(total);
    let job_rx = Arc::new(Mutex::new(job_rx));
    let (result_tx, mut result_rx) = mpsc::channel::<TransferResult>(total);

    let workers = options.workers.max(1);
    let mut handles = Vec::with_capacity(workers);
    for worker_id in 0..workers {
        handles.push(tokio::spawn(worker_loop(
            worker_id,
            Arc::clone(&channel),
            Arc::clone(&job_rx),
            result_tx.clone(),
        )));
    }
    drop(result_tx);

    for table in tables {
        if job_tx.send(MigrationJob::new(Arc::clone(table))).await.is_err() {
            break;
        }
    }

    let mut finished = Vec::with_capacity(total);
    while finished.len() < total {
        let Some(result) = result_rx.recv().await else {
            // Only reachable if a worker died without reporting; the
            // remaining tables surface as missing results upstream.
            tracing::error!("Transfer workers exited with jobs outstanding");
            break;
        };

        if let Some(error) = &result.error {
            if result.attempt < options.retries {
                let delay = options.retry_delay * 2u32.saturating_pow(result.attempt);
                tracing::warn!(
                    "⚠ Transfer of `{}` failed (attempt {}), retrying in {:?}: {}",
                    result.table.name,
                    result.attempt + 1,
                    delay,
                    error
                );

                let retry = MigrationJob {
                    table: Arc::clone(&result.table),
                    attempt: result.attempt + 1,
                };
                let job_tx = job_tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = job_tx.send(retry).await;
                });
                continue;
            }
        }

        progress.inc(1);
        finished.push(result);
    }

    // Close the queue exactly once; workers drain whatever is left and exit
    drop(job_tx);
    for handle in handles {
        let _ = handle.await;
    }

    finished
}
