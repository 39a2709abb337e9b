use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::task;

use super::debounce::Debouncer;
use super::queue::{RebuildJob, RebuildQueue};
use super::requests::{RequestId, RequestTracker};
use crate::matching::MatchTypeId;
use crate::session::{IndexSession, RebuildStats, SymbolInfo};
use crate::text::{FileId, Location, TextEdit};

/// An editor-open file and the edits not yet applied to the session.
#[derive(Debug, Default)]
struct OpenDocument {
    version: i32,
    pending: Vec<TextEdit>,
}

struct Inner {
    session: Arc<Mutex<IndexSession>>,
    documents: DashMap<FileId, OpenDocument>,
    debouncer: Debouncer,
    requests: RequestTracker,
    queue: RebuildQueue,
}

/// Async front of an [`IndexSession`] for editor integrations.
///
/// Whole-project work runs through a [`RebuildQueue`]; edits of open files
/// are collected and applied once the file has been quiet for
/// `debounce_ms`. Cloning is cheap and shares the same session.
#[derive(Clone)]
pub struct IndexService {
    inner: Arc<Inner>,
}

impl IndexService {
    /// Must be called inside a tokio runtime.
    pub fn new(session: IndexSession) -> Self {
        let debouncer = Debouncer::new(session.config().debounce_ms);
        let session = Arc::new(Mutex::new(session));
        let queue = RebuildQueue::spawn(session.clone());
        Self {
            inner: Arc::new(Inner {
                session,
                documents: DashMap::new(),
                debouncer,
                requests: RequestTracker::new(),
                queue,
            }),
        }
    }

    pub fn queue(&self) -> &RebuildQueue {
        &self.inner.queue
    }

    /// Run `f` with exclusive access to the session.
    pub async fn with_session<R>(&self, f: impl FnOnce(&mut IndexSession) -> R) -> R {
        let mut session = self.inner.session.lock().await;
        f(&mut session)
    }

    pub async fn scan(&self, root: impl Into<PathBuf>) -> Result<RebuildStats> {
        self.inner.queue.run(RebuildJob::Rescan { root: root.into() }).await
    }

    pub async fn rebuild(&self) -> Result<RebuildStats> {
        self.inner.queue.run(RebuildJob::Rebuild).await
    }

    /// Read `path` from disk and reindex it. Relative ids are taken from
    /// the scanned project root when the path lies under it.
    pub async fn reload_path(&self, path: &Path) -> Result<RebuildStats> {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("cannot read {}", path.display()))?;
        let root = self.with_session(|s| s.root().map(Path::to_path_buf)).await;
        let relative = root
            .as_deref()
            .and_then(|root| path.strip_prefix(root).ok())
            .unwrap_or(path);
        let file = FileId::from_path(relative);
        self.inner.queue.run(RebuildJob::Reload { file, text }).await
    }

    pub async fn remove(&self, file: &FileId) -> Result<RebuildStats> {
        self.inner.documents.remove(file);
        self.inner.debouncer.forget(file);
        self.inner.queue.run(RebuildJob::Remove { file: file.clone() }).await
    }

    /// Track `file` as open with the editor's text and make it active.
    pub async fn open(&self, file: FileId, version: i32, text: String) -> Result<()> {
        self.inner.queue.run(RebuildJob::Reload {
            file: file.clone(),
            text,
        })
        .await?;
        self.inner.documents.insert(
            file.clone(),
            OpenDocument {
                version,
                pending: Vec::new(),
            },
        );
        self.with_session(|s| s.open_file(&file).map(|_| ())).await?;
        tracing::debug!(%file, version, "opened document");
        Ok(())
    }

    /// Queue `edits` for an open file and schedule a debounced flush.
    /// Returns the debounce sequence number of this edit.
    pub fn edit(&self, file: &FileId, version: i32, edits: Vec<TextEdit>) -> Result<u64> {
        {
            let Some(mut doc) = self.inner.documents.get_mut(file) else {
                bail!("{file} is not open");
            };
            if version <= doc.version {
                bail!("stale edit of {file}: version {version} is not newer than {}", doc.version);
            }
            doc.version = version;
            doc.pending.extend(edits);
        }
        let seq = self.inner.debouncer.bump(file);

        let service = self.clone();
        let file = file.clone();
        tokio::spawn(async move {
            if !service.inner.debouncer.settled(&file, seq).await {
                tracing::trace!(%file, seq, "superseded by a newer edit");
                return;
            }
            if let Err(err) = service.flush(&file).await {
                tracing::warn!(%file, %err, "applying edits failed");
            }
        });
        Ok(seq)
    }

    /// Apply the pending edits of `file` now. Returns how many were applied.
    ///
    /// The session lock is held from taking the batch until it is applied,
    /// so concurrent flushes of one file apply their batches in edit order.
    pub async fn flush(&self, file: &FileId) -> Result<usize> {
        let mut session = self.inner.session.clone().lock_owned().await;
        let edits = match self.inner.documents.get_mut(file) {
            Some(mut doc) => std::mem::take(&mut doc.pending),
            None => bail!("{file} is not open"),
        };
        if edits.is_empty() {
            return Ok(0);
        }
        let count = edits.len();
        let target = file.clone();
        task::spawn_blocking(move || session.apply_edits(&target, &edits))
            .await
            .context("edit task failed")??;
        tracing::debug!(%file, edits = count, "flushed edits");
        Ok(count)
    }

    /// Apply what is pending and stop tracking `file`. Its text stays indexed.
    pub async fn close(&self, file: &FileId) -> Result<()> {
        self.flush(file).await?;
        self.inner.documents.remove(file);
        self.inner.debouncer.forget(file);
        Ok(())
    }

    pub fn is_open(&self, file: &FileId) -> bool {
        self.inner.documents.contains_key(file)
    }

    pub fn version(&self, file: &FileId) -> Option<i32> {
        self.inner.documents.get(file).map(|doc| doc.version)
    }

    pub fn pending_edits(&self, file: &FileId) -> Option<usize> {
        self.inner.documents.get(file).map(|doc| doc.pending.len())
    }

    /// Id for a query that a newer one may supersede.
    pub fn begin_request(&self) -> RequestId {
        self.inner.requests.begin()
    }

    /// Completions for `request`, or `None` once a newer request began.
    pub async fn completions(&self, request: RequestId, kind: MatchTypeId, prefix: &str) -> Option<Vec<String>> {
        let session = self.inner.session.lock().await;
        if !self.inner.requests.is_latest(request) {
            tracing::trace!(request = request.get(), "dropping stale completion request");
            return None;
        }
        Some(session.completions(kind, prefix))
    }

    pub async fn definition(&self, file: &FileId, line: u32, column: u32) -> Option<Location> {
        self.with_session(|s| s.definition(file, line, column)).await
    }

    pub async fn references(&self, file: &FileId, line: u32, column: u32) -> Vec<Location> {
        self.with_session(|s| s.references(file, line, column)).await
    }

    pub async fn symbol_info(&self, file: &FileId, line: u32, column: u32) -> Option<SymbolInfo> {
        self.with_session(|s| s.symbol_info(file, line, column)).await
    }
}
