use std::sync::Arc;

use crate::file_kind::FileKind;
use crate::index::{ActiveFileIndex, IdentifierIndex};
use crate::lexer::{LexedLine, ParsedWord};
use crate::matching::MatchTypeId;
use crate::text::FileId;

/// One token plus everything a matcher may look at around it.
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
    pub file: &'a FileId,
    pub kind: FileKind,
    pub line_number: u32,
    pub line_text: &'a str,
    pub chars: &'a [char],
    pub line: &'a LexedLine,
    pub word: &'a ParsedWord,
}

impl<'a> MatchContext<'a> {
    pub fn value(&self) -> &'a str {
        &self.word.value
    }

    pub fn prev_word(&self) -> Option<&'a ParsedWord> {
        let idx = self.word.index.checked_sub(1)?;
        self.line.tokens.get(idx as usize)
    }

    pub fn next_word(&self) -> Option<&'a ParsedWord> {
        self.line.tokens.get(self.word.index as usize + 1)
    }

    pub fn first_word(&self) -> Option<&'a ParsedWord> {
        self.line.tokens.first()
    }

    /// Char right before the token.
    pub fn prev_char(&self) -> Option<char> {
        let start = self.word.start as usize;
        start.checked_sub(1).and_then(|i| self.chars.get(i).copied())
    }

    /// Char right after the token.
    pub fn next_char(&self) -> Option<char> {
        self.chars.get(self.word.end as usize).copied()
    }

    /// First non-blank char after the token.
    pub fn next_non_space(&self) -> Option<char> {
        self.chars[(self.word.end as usize).min(self.chars.len())..]
            .iter()
            .copied()
            .find(|c| !c.is_whitespace())
    }

    /// The line is a `[...]` block header.
    pub fn is_header_line(&self) -> bool {
        self.line_text.trim_start().starts_with('[')
    }

    /// Token sits between the header's `[` and `]`.
    pub fn in_header_tag(&self) -> bool {
        if !self.is_header_line() {
            return false;
        }
        let close = self.chars.iter().position(|&c| c == ']');
        close.is_none_or(|c| (self.word.start as usize) < c)
    }

    /// 0 for the parameter list after a header, 1 for the return list.
    pub fn header_group(&self) -> Option<usize> {
        if !self.is_header_line() || self.in_header_tag() {
            return None;
        }
        let close = self.chars.iter().position(|&c| c == ']')?;
        let mut depth = 0u32;
        let mut group = None;
        for (i, &c) in self.chars.iter().enumerate().skip(close + 1) {
            if i >= self.word.start as usize {
                break;
            }
            match c {
                '(' => {
                    if depth == 0 {
                        group = Some(group.map_or(0, |g| g + 1));
                    }
                    depth += 1;
                }
                ')' => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
        group.filter(|_| depth > 0)
    }
}

/// Follow-up effects of a classification, applied by the engine to the
/// active-file state after the matcher returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extra {
    /// A header opens a new block.
    BlockStart { trigger: Option<Arc<str>>, name: Arc<str> },
    /// `switch_<type>`: case labels one brace level deeper use this type.
    Switch { type_keyword: Arc<str> },
    LocalVar { type_keyword: Arc<str>, parameter: bool },
    ReturnType { type_keyword: Arc<str> },
    /// `key=value` remembered for the enclosing config block.
    BlockValue { key: Arc<str>, value: Arc<str> },
}

/// Result of a successful match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub match_type: MatchTypeId,
    pub declaration: bool,
    /// Index key when it differs from the token text.
    pub name: Option<Arc<str>>,
    /// Part of the surface text before the name (`cert_`, `_`).
    pub prefix: Option<Arc<str>>,
    /// Part of the surface text after the name (loc shape suffixes).
    pub suffix: Option<Arc<str>>,
    pub pack_id: Option<u32>,
    pub extra: Option<Extra>,
}

impl Classification {
    pub fn reference(match_type: MatchTypeId) -> Self {
        Self {
            match_type,
            declaration: false,
            name: None,
            prefix: None,
            suffix: None,
            pack_id: None,
            extra: None,
        }
    }

    pub fn declaration(match_type: MatchTypeId) -> Self {
        Self {
            declaration: true,
            ..Self::reference(match_type)
        }
    }

    pub fn skip() -> Self {
        Self::reference(MatchTypeId::Skip)
    }

    pub fn named(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_extra(mut self, extra: Extra) -> Self {
        self.extra = Some(extra);
        self
    }

    pub fn is_skip(&self) -> bool {
        self.match_type == MatchTypeId::Skip
    }

    /// Index key for `ctx`'s token.
    pub fn key_name<'a>(&'a self, ctx: &MatchContext<'a>) -> &'a str {
        self.name.as_deref().unwrap_or(ctx.value())
    }
}

/// Read-only view of the indexes for matchers.
#[derive(Clone, Copy)]
pub struct MatchEnv<'a> {
    pub identifiers: &'a IdentifierIndex,
    pub active: &'a ActiveFileIndex,
}
