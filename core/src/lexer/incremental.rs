//! Per-file line cache with edit replay.
//!
//! An edit replaces lines `[s, e]` of the old text. Cached lines after the
//! edit keep their results and shift with the splice; lexing restarts at
//! `s` from the end state of line `s - 1` and stops at the first line past
//! the edited span whose new end state equals the one cached for it. From
//! there on every line starts in the same state as before, so its cached
//! tokens are still exact.

use ropey::Rope;

use crate::exceptions::WordExceptionLearner;
use crate::file_kind::FileKind;
use crate::lexer::line_lexer::{LexedLine, LineLexer};
use crate::lexer::state::ParserState;
use crate::text::{FileId, TextEdit, apply_edit_rope, rope_line, rope_line_count};

/// Lines re-lexed by one edit (inclusive range, in new line numbers).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelexReport {
    pub first_line: u32,
    pub last_line: u32,
    pub line_delta: i64,
}

impl RelexReport {
    pub fn relexed_lines(&self) -> u32 {
        self.last_line - self.first_line + 1
    }

    pub fn contains(&self, line: u32) -> bool {
        line >= self.first_line && line <= self.last_line
    }
}

#[derive(Debug, Clone)]
pub struct LexedDocument {
    file: FileId,
    kind: FileKind,
    text: Rope,
    lines: Vec<LexedLine>,
}

impl LexedDocument {
    pub fn new(file: FileId, kind: FileKind, text: &str, exceptions: &WordExceptionLearner) -> Self {
        let mut doc = Self {
            file,
            kind,
            text: Rope::from_str(text),
            lines: Vec::new(),
        };
        doc.relex_all(exceptions);
        doc
    }

    pub fn file(&self) -> &FileId {
        &self.file
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    pub fn text(&self) -> &Rope {
        &self.text
    }

    pub fn lines(&self) -> &[LexedLine] {
        &self.lines
    }

    pub fn line(&self, line: u32) -> Option<&LexedLine> {
        self.lines.get(line as usize)
    }

    pub fn line_count(&self) -> u32 {
        self.lines.len() as u32
    }

    pub fn line_text(&self, line: u32) -> String {
        if (line as usize) < self.text.len_lines() {
            rope_line(&self.text, line as usize)
        } else {
            String::new()
        }
    }

    /// Lex every line from the default state. Used on open and whenever
    /// the exception dictionary changed.
    pub fn relex_all(&mut self, exceptions: &WordExceptionLearner) {
        let lexer = LineLexer::new(self.kind, exceptions);
        let count = rope_line_count(&self.text);
        let mut state = ParserState::new(self.file.clone());
        self.lines = Vec::with_capacity(count);
        for n in 0..count {
            let text = rope_line(&self.text, n);
            let lexed = lexer.lex(&text, n as u32, &state);
            state = lexed.end_state.clone();
            self.lines.push(lexed);
        }
    }

    /// Replace the whole text and re-lex it.
    pub fn set_text(&mut self, text: &str, exceptions: &WordExceptionLearner) {
        self.text = Rope::from_str(text);
        self.relex_all(exceptions);
    }

    /// Apply `edit` to the text and re-lex the minimum run of lines.
    pub fn apply_edit(&mut self, edit: &TextEdit, exceptions: &WordExceptionLearner) -> RelexReport {
        let last = self.lines.len().saturating_sub(1) as u32;
        let (start, end) = if edit.start <= edit.end {
            (edit.start, edit.end)
        } else {
            (edit.end, edit.start)
        };
        let s = start.line.min(last);
        let e = end.line.min(last).max(s);
        apply_edit_rope(&mut self.text, edit);
        self.relex_span(s, e, exceptions)
    }

    /// Re-lex after the old lines `[s, e]` were replaced in `self.text`.
    fn relex_span(&mut self, s: u32, e: u32, exceptions: &WordExceptionLearner) -> RelexReport {
        let old_count = self.lines.len();
        if old_count == 0 {
            self.relex_all(exceptions);
            return RelexReport {
                first_line: 0,
                last_line: self.line_count().saturating_sub(1),
                line_delta: self.lines.len() as i64,
            };
        }

        let new_count = rope_line_count(&self.text);
        let tail = self.lines.split_off(e as usize + 1);
        self.lines.truncate(s as usize);
        let line_delta = new_count as i64 - old_count as i64;
        let span_len = new_count.saturating_sub(s as usize + tail.len());

        let lexer = LineLexer::new(self.kind, exceptions);
        let mut state = match s {
            0 => ParserState::new(self.file.clone()),
            _ => self.lines[s as usize - 1].end_state.clone(),
        };

        let mut n = s as usize;
        for _ in 0..span_len {
            let lexed = lexer.lex(&rope_line(&self.text, n), n as u32, &state);
            state = lexed.end_state.clone();
            self.lines.push(lexed);
            n += 1;
        }

        let mut tail = tail.into_iter();
        while let Some(cached) = tail.next() {
            let lexed = lexer.lex(&rope_line(&self.text, n), n as u32, &state);
            let converged = lexed.end_state == cached.end_state;
            state = lexed.end_state.clone();
            self.lines.push(lexed);
            if converged {
                self.lines.extend(tail);
                break;
            }
            n += 1;
        }

        let last_line = (n.min(self.lines.len().saturating_sub(1))) as u32;
        tracing::debug!(
            file = %self.file,
            first = s,
            last = last_line,
            delta = line_delta,
            "incremental relex"
        );
        RelexReport {
            first_line: s,
            last_line: last_line.max(s),
            line_delta,
        }
    }
}
