use std::time::Duration;

use dashmap::DashMap;
use tokio::time::sleep;

use crate::text::FileId;

/// Per-file edit sequence numbers. A scheduled task remembers the number it
/// was spawned with and only runs when no newer edit arrived meanwhile.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    seqs: DashMap<FileId, u64>,
}

impl Debouncer {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            seqs: DashMap::new(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record a new edit of `file` and return its sequence number.
    pub fn bump(&self, file: &FileId) -> u64 {
        let mut seq = self.seqs.entry(file.clone()).or_insert(0);
        *seq = seq.wrapping_add(1);
        *seq
    }

    pub fn is_current(&self, file: &FileId, seq: u64) -> bool {
        self.seqs.get(file).is_some_and(|current| *current == seq)
    }

    /// Wait out the quiet period, then report whether `seq` is still the
    /// latest edit of `file`.
    pub async fn settled(&self, file: &FileId, seq: u64) -> bool {
        sleep(self.delay).await;
        self.is_current(file, seq)
    }

    pub fn forget(&self, file: &FileId) {
        self.seqs.remove(file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_only_latest_edit_settles() {
        let debouncer = Debouncer::new(10);
        let file = FileId::new("a.rs2");
        let first = debouncer.bump(&file);
        let second = debouncer.bump(&file);
        assert_eq!(second, first + 1);
        assert!(!debouncer.settled(&file, first).await);
        assert!(debouncer.settled(&file, second).await);

        debouncer.forget(&file);
        assert!(!debouncer.is_current(&file, second));
        assert_eq!(debouncer.bump(&file), 1);
    }
}
