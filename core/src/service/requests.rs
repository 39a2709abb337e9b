use std::sync::atomic::{AtomicU64, Ordering};

/// Id of one query. Ids increase monotonically per tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Last-writer-wins bookkeeping for queries that may be superseded, such as
/// completions typed character by character.
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: AtomicU64,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> RequestId {
        RequestId(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_latest(&self, id: RequestId) -> bool {
        self.latest.load(Ordering::SeqCst) == id.0
    }
}
