//! File-scoped structures derived from one file's matches.
//!
//! Built as scratch state while any file is matched (local variable types,
//! switch types and call targets are resolved through it) and kept by the
//! session only for the file under active editing.

use std::sync::Arc;

use crate::line_cache::LineReferenceCache;
use crate::matching::MatchTypeId;
use crate::text::{FileId, LineCol};
use crate::util::FastHashMap;

/// A classified token on a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSpan {
    pub start: u32,
    pub end: u32,
    pub token_index: u32,
    pub kind: MatchTypeId,
    pub declaration: bool,
    /// Normalized name used as the index key.
    pub name: Arc<str>,
    /// Surface text of the token.
    pub word: Arc<str>,
    pub prefix: Option<Arc<str>>,
    pub suffix: Option<Arc<str>>,
}

impl MatchSpan {
    pub fn contains(&self, column: u32) -> bool {
        column >= self.start && column < self.end
    }
}

/// A `[trigger,name]` script block or `[name]` config block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub line: u32,
    pub trigger: Option<Arc<str>>,
    pub name: Arc<str>,
    pub returns: Vec<Arc<str>>,
    values: FastHashMap<Arc<str>, Arc<str>>,
}

impl Block {
    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|v| v.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVariable {
    pub name: Arc<str>,
    pub type_keyword: Arc<str>,
    pub parameter: bool,
    pub declared_at: LineCol,
}

#[derive(Debug, Default)]
pub struct ActiveFileIndex {
    file: Option<FileId>,
    matches: FastHashMap<u32, Vec<MatchSpan>>,
    block_starts: LineReferenceCache<usize>,
    blocks: Vec<Block>,
    locals: FastHashMap<u32, FastHashMap<Arc<str>, LocalVariable>>,
    switches: FastHashMap<u32, LineReferenceCache<Arc<str>>>,
    lookback: u32,
}

impl ActiveFileIndex {
    pub fn new(file: FileId, lookback: u32) -> Self {
        Self {
            file: Some(file),
            lookback,
            ..Self::default()
        }
    }

    pub fn file(&self) -> Option<&FileId> {
        self.file.as_ref()
    }

    pub fn is_for(&self, file: &FileId) -> bool {
        self.file.as_ref() == Some(file)
    }

    pub fn clear(&mut self) {
        self.matches.clear();
        self.block_starts.clear();
        self.blocks.clear();
        self.locals.clear();
        self.switches.clear();
    }

    pub fn match_count(&self) -> usize {
        self.matches.values().map(Vec::len).sum()
    }

    pub fn put_match(&mut self, line: u32, span: MatchSpan) {
        let spans = self.matches.entry(line).or_default();
        let idx = spans.partition_point(|s| s.start < span.start);
        if spans.get(idx).is_some_and(|s| s.start == span.start) {
            spans[idx] = span;
        } else {
            spans.insert(idx, span);
        }
    }

    pub fn match_at(&self, line: u32, column: u32) -> Option<&MatchSpan> {
        let spans = self.matches.get(&line)?;
        let idx = spans.partition_point(|s| s.end <= column);
        spans.get(idx).filter(|s| s.contains(column))
    }

    pub fn matches_on(&self, line: u32) -> &[MatchSpan] {
        self.matches.get(&line).map(Vec::as_slice).unwrap_or_default()
    }

    /// Every match, ordered by line.
    pub fn all_matches(&self) -> Vec<(u32, &MatchSpan)> {
        let mut lines: Vec<u32> = self.matches.keys().copied().collect();
        lines.sort_unstable();
        lines
            .into_iter()
            .flat_map(|line| self.matches[&line].iter().map(move |s| (line, s)))
            .collect()
    }

    pub fn start_block(&mut self, line: u32, trigger: Option<Arc<str>>, name: Arc<str>) {
        self.blocks.push(Block {
            line,
            trigger,
            name,
            returns: Vec::new(),
            values: FastHashMap::default(),
        });
        self.block_starts.put(line, self.blocks.len() - 1);
    }

    pub fn block_at(&self, line: u32) -> Option<&Block> {
        self.block_starts.get(line).map(|&i| &self.blocks[i])
    }

    fn block_at_mut(&mut self, line: u32) -> Option<&mut Block> {
        let idx = *self.block_starts.get(line)?;
        self.blocks.get_mut(idx)
    }

    /// First and last line of the block containing `line`.
    pub fn block_range(&mut self, line: u32) -> Option<(u32, u32)> {
        self.block_starts.get_with_range(line).map(|e| (e.start, e.end))
    }

    pub fn add_return_type(&mut self, line: u32, type_keyword: Arc<str>) {
        if let Some(block) = self.block_at_mut(line) {
            block.returns.push(type_keyword);
        }
    }

    pub fn set_block_value(&mut self, line: u32, key: Arc<str>, value: Arc<str>) {
        if let Some(block) = self.block_at_mut(line) {
            block.values.insert(key, value);
        }
    }

    pub fn block_value(&self, line: u32, key: &str) -> Option<&str> {
        self.block_at(line).and_then(|b| b.value(key))
    }

    fn block_line(&self, line: u32) -> u32 {
        self.block_at(line).map_or(0, |b| b.line)
    }

    pub fn put_local(&mut self, line: u32, var: LocalVariable) {
        let block = self.block_line(line);
        self.locals
            .entry(block)
            .or_default()
            .entry(var.name.clone())
            .or_insert(var);
    }

    /// Local variable `name` as visible from `line`.
    pub fn local_variable(&self, line: u32, name: &str) -> Option<&LocalVariable> {
        self.locals.get(&self.block_line(line))?.get(name)
    }

    pub fn local_variable_names(&self, line: u32) -> Vec<Arc<str>> {
        let mut names: Vec<Arc<str>> = self
            .locals
            .get(&self.block_line(line))
            .map(|vars| vars.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Record the case type for the body of a switch opened on `line`;
    /// `depth` is the brace depth inside the switch body.
    pub fn put_switch(&mut self, line: u32, depth: u32, type_keyword: Arc<str>) {
        self.switches.entry(depth).or_default().put(line, type_keyword);
    }

    pub fn switch_type(&self, line: u32, depth: u32) -> Option<&str> {
        self.switches.get(&depth)?.get(line).map(|t| t.as_ref())
    }

    /// The classified call name a call argument on `line` belongs to. The
    /// call may have been opened a few lines above.
    pub fn resolve_call_target(&self, line: u32, name_index: u32, name: &str) -> Option<&MatchSpan> {
        let first = line.saturating_sub(self.lookback);
        (first..=line).rev().find_map(|l| {
            self.matches_on(l)
                .iter()
                .find(|s| s.token_index == name_index && s.word.as_ref() == name)
        })
    }

    pub fn finalize(&mut self) {
        self.block_starts.finalize();
        for cache in self.switches.values_mut() {
            cache.finalize();
        }
    }
}
