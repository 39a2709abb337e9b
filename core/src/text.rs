use std::fmt;
use std::path::Path;
use std::sync::Arc;

use ropey::Rope;
use serde::Serialize;

/// Canonical file identity. Cheap to clone; compared by path string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct FileId(Arc<str>);

impl FileId {
    pub fn new(path: impl AsRef<str>) -> Self {
        Self(Arc::from(path.as_ref().replace('\\', "/")))
    }

    pub fn from_path(path: &Path) -> Self {
        Self::new(path.to_string_lossy())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name without directories or extension (`scripts/shop.if` → `shop`).
    pub fn stem(&self) -> &str {
        let name = self.0.rsplit('/').next().unwrap_or(&self.0);
        match name.rfind('.') {
            Some(dot) if dot > 0 => &name[..dot],
            _ => name,
        }
    }

    pub fn extension(&self) -> Option<&str> {
        let name = self.0.rsplit('/').next().unwrap_or(&self.0);
        match name.rfind('.') {
            Some(dot) if dot > 0 => Some(&name[dot + 1..]),
            _ => None,
        }
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Zero-based line and column (columns count chars).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineCol {
    pub line: u32,
    pub column: u32,
}

impl LineCol {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// `line|column`, the encoding used by the debug export.
    pub fn encode(&self) -> String {
        let mut line = itoa::Buffer::new();
        let mut column = itoa::Buffer::new();
        let line = line.format(self.line);
        let column = column.format(self.column);
        let mut out = String::with_capacity(line.len() + column.len() + 1);
        out.push_str(line);
        out.push('|');
        out.push_str(column);
        out
    }

    pub fn decode(raw: &str) -> Option<Self> {
        let (line, column) = raw.split_once('|')?;
        Some(Self::new(line.parse().ok()?, column.parse().ok()?))
    }
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
    pub file: FileId,
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub fn new(file: FileId, line: u32, column: u32) -> Self {
        Self { file, line, column }
    }

    pub fn line_col(&self) -> LineCol {
        LineCol::new(self.line, self.column)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line_col())
    }
}

/// Half-open column range `[start, end)` on a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct TextRange {
    pub start: u32,
    pub end: u32,
}

impl TextRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, column: u32) -> bool {
        column >= self.start && column < self.end
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start + 1, self.end + 1)
    }
}

/// Replace the text between two positions. `start == end` is an insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub start: LineCol,
    pub end: LineCol,
    pub text: String,
}

impl TextEdit {
    pub fn new(start: LineCol, end: LineCol, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    pub fn insert(at: LineCol, text: impl Into<String>) -> Self {
        Self::new(at, at, text)
    }

    /// Net change in line count once the edit is applied.
    pub fn line_delta(&self) -> i64 {
        let inserted = self.text.matches('\n').count() as i64;
        let removed = i64::from(self.end.line) - i64::from(self.start.line);
        inserted - removed
    }
}

/// A recoverable problem found while reading a structured sub-format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseDiagnostic {
    pub line: u32,
    pub message: String,
    pub range: TextRange,
}

impl ParseDiagnostic {
    pub fn new(line: u32, message: impl Into<String>, range: TextRange) -> Self {
        Self {
            line,
            message: message.into(),
            range,
        }
    }
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} ({}): {}", self.line + 1, self.range, self.message)
    }
}

// Convert a line/column position to a rope char index, clamped to the end of the line.
pub(crate) fn line_col_to_char_idx(text: &Rope, pos: LineCol) -> usize {
    let line_idx = pos.line as usize;
    if line_idx >= text.len_lines() {
        return text.len_chars();
    }
    let line_start_char = text.line_to_char(line_idx);
    let line_slice = text.line(line_idx);
    let mut line_len = line_slice.len_chars();
    // Never step past the line break into the next line.
    if line_len > 0 && line_slice.char(line_len - 1) == '\n' {
        line_len -= 1;
        if line_len > 0 && line_slice.char(line_len - 1) == '\r' {
            line_len -= 1;
        }
    }
    line_start_char + (pos.column as usize).min(line_len)
}

// Apply a single edit to a rope buffer.
pub(crate) fn apply_edit_rope(text: &mut Rope, edit: &TextEdit) {
    let start_char = line_col_to_char_idx(text, edit.start);
    let end_char = line_col_to_char_idx(text, edit.end);
    let (s, e) = if start_char <= end_char {
        (start_char, end_char)
    } else {
        (end_char, start_char)
    };
    if s != e {
        text.remove(s..e);
    }
    if !edit.text.is_empty() {
        text.insert(s, &edit.text);
    }
}

/// Lines of `text` split the way documents are: only `\n` (optionally
/// preceded by `\r`) ends a line, and a trailing newline opens an empty
/// last line.
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line))
}

/// Text of a rope line without its trailing line break. Ropey is built
/// without `unicode_lines` and `cr_lines`, so lines end at `\n` only.
pub(crate) fn rope_line(text: &Rope, line: usize) -> String {
    let mut out = text.line(line).to_string();
    if out.ends_with('\n') {
        out.pop();
        if out.ends_with('\r') {
            out.pop();
        }
    }
    out
}

/// Number of logical lines; a trailing newline opens one more (empty) line.
pub(crate) fn rope_line_count(text: &Rope) -> usize {
    text.len_lines().max(1)
}
