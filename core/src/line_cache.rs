//! Interval lookup for "which block is line N part of".
//!
//! Entries are appended with their start line only. Lookups find the entry
//! with the greatest start that is `<=` the queried line. The end of each
//! interval is derived from the start of the next entry once the cache is
//! finalized. Nested ranges are not supported; callers that need them must
//! split entries at the nesting boundaries themselves.

#[derive(Debug, Clone, PartialEq)]
pub struct LineEntry<T> {
    pub start: u32,
    /// Inclusive end line; `u32::MAX` for the last entry.
    pub end: u32,
    pub data: T,
}

#[derive(Debug, Clone)]
pub struct LineReferenceCache<T> {
    entries: Vec<LineEntry<T>>,
    finalized: bool,
}

impl<T> Default for LineReferenceCache<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            finalized: true,
        }
    }
}

impl<T> LineReferenceCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an entry. Order does not matter until the cache is finalized.
    pub fn put(&mut self, start: u32, data: T) {
        if let Some(last) = self.entries.last()
            && last.start > start
        {
            self.finalized = false;
        }
        if self.finalized
            && let Some(last) = self.entries.last_mut()
        {
            last.end = start.saturating_sub(1).max(last.start);
        }
        self.entries.push(LineEntry {
            start,
            end: u32::MAX,
            data,
        });
    }

    /// Data of the entry covering `line`. Works while the cache is only
    /// partially populated by a single forward pass.
    pub fn get(&self, line: u32) -> Option<&T> {
        self.find(line).map(|idx| &self.entries[idx].data)
    }

    /// Full interval covering `line`. Requires a finalized cache.
    pub fn get_with_range(&mut self, line: u32) -> Option<&LineEntry<T>> {
        self.finalize();
        self.find(line).map(|idx| &self.entries[idx])
    }

    /// Sort entries by start (stable, so later puts at the same start win
    /// lookups) and compute every `end`.
    pub fn finalize(&mut self) {
        if self.finalized {
            return;
        }
        self.entries.sort_by_key(|e| e.start);
        self.fix_ends();
        self.finalized = true;
    }

    pub fn entries(&mut self) -> &[LineEntry<T>] {
        self.finalize();
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.finalized = true;
    }

    fn fix_ends(&mut self) {
        let len = self.entries.len();
        for i in 0..len {
            let end = if i + 1 < len {
                self.entries[i + 1].start.saturating_sub(1).max(self.entries[i].start)
            } else {
                u32::MAX
            };
            self.entries[i].end = end;
        }
    }

    fn find(&self, line: u32) -> Option<usize> {
        if self.finalized {
            // Greatest start <= line; ties resolve to the last inserted entry.
            let idx = self.entries.partition_point(|e| e.start <= line);
            return idx.checked_sub(1);
        }
        let mut best: Option<usize> = None;
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.start <= line && best.is_none_or(|b| self.entries[b].start <= entry.start) {
                best = Some(i);
            }
        }
        best
    }
}
