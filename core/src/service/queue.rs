use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task;

use crate::session::{IndexSession, RebuildStats};
use crate::text::FileId;

/// Work that mutates the whole session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebuildJob {
    /// Clear everything and load the project under `root` again.
    Rescan { root: PathBuf },
    /// Rematch every loaded file.
    Rebuild,
    /// Replace the text of one file.
    Reload { file: FileId, text: String },
    Remove { file: FileId },
}

impl RebuildJob {
    fn name(&self) -> &'static str {
        match self {
            RebuildJob::Rescan { .. } => "rescan",
            RebuildJob::Rebuild => "rebuild",
            RebuildJob::Reload { .. } => "reload",
            RebuildJob::Remove { .. } => "remove",
        }
    }

    fn run(self, session: &mut IndexSession) -> Result<RebuildStats> {
        match self {
            RebuildJob::Rescan { root } => session.scan_project(&root),
            RebuildJob::Rebuild => Ok(session.rebuild_all()),
            RebuildJob::Reload { file, text } => {
                session.update_file(&file, &text)?;
                Ok(session.stats())
            }
            RebuildJob::Remove { file } => {
                session.remove_file(&file);
                Ok(session.stats())
            }
        }
    }
}

struct QueuedJob {
    job: RebuildJob,
    done: oneshot::Sender<Result<RebuildStats>>,
}

/// FIFO of rebuild jobs drained by a single worker task, so at most one
/// job touches the session at a time and jobs finish in submission order.
#[derive(Debug, Clone)]
pub struct RebuildQueue {
    tx: mpsc::UnboundedSender<QueuedJob>,
}

impl RebuildQueue {
    /// Start the worker. Must be called inside a tokio runtime.
    pub fn spawn(session: Arc<Mutex<IndexSession>>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<QueuedJob>();
        tokio::spawn(async move {
            while let Some(QueuedJob { job, done }) = rx.recv().await {
                let name = job.name();
                let mut guard = session.clone().lock_owned().await;
                let result = task::spawn_blocking(move || job.run(&mut guard))
                    .await
                    .map_err(|err| anyhow!("{name} task failed: {err}"))
                    .and_then(|result| result);
                match &result {
                    Ok(stats) => tracing::debug!(job = name, identifiers = stats.identifiers, "job finished"),
                    Err(err) => tracing::warn!(job = name, %err, "job failed"),
                }
                // The submitter may have stopped waiting.
                let _ = done.send(result);
            }
            tracing::debug!("rebuild queue closed");
        });
        Self { tx }
    }

    /// Enqueue `job` and return a receiver for its outcome.
    pub fn submit(&self, job: RebuildJob) -> Result<oneshot::Receiver<Result<RebuildStats>>> {
        let (done, rx) = oneshot::channel();
        tracing::trace!(job = job.name(), "queued job");
        self.tx
            .send(QueuedJob { job, done })
            .map_err(|_| anyhow!("rebuild queue is closed"))?;
        Ok(rx)
    }

    /// Enqueue `job` and wait for it.
    pub async fn run(&self, job: RebuildJob) -> Result<RebuildStats> {
        self.submit(job)?.await.context("rebuild worker dropped the job")?
    }
}
