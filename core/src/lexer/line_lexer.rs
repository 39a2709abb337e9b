use std::sync::Arc;

use crate::exceptions::WordExceptionLearner;
use crate::file_kind::FileKind;
use crate::lexer::state::{CallFrame, ParserState};
use crate::lexer::token::{Operator, OperatorToken, ParsedWord};
use crate::text::TextRange;
use crate::util::chars::{is_space_char, is_word_char};

/// Everything the lexer learned about one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexedLine {
    pub tokens: Vec<ParsedWord>,
    pub operators: Vec<OperatorToken>,
    pub string_ranges: Vec<TextRange>,
    pub interpolation_ranges: Vec<TextRange>,
    pub block_comment_ranges: Vec<TextRange>,
    /// Column where a `//` comment starts.
    pub line_comment: Option<u32>,
    pub end_state: ParserState,
}

impl LexedLine {
    /// Word covering `column`, if any.
    pub fn token_at(&self, column: u32) -> Option<&ParsedWord> {
        let idx = self.tokens.partition_point(|t| t.end <= column);
        self.tokens.get(idx).filter(|t| t.contains(column))
    }

    pub fn in_comment(&self, column: u32) -> bool {
        self.line_comment.is_some_and(|c| column >= c) || self.block_comment_ranges.iter().any(|r| r.contains(column))
    }
}

/// Tokenizes single lines. Holds no per-line state: every call is a pure
/// function of the line text and the start state passed in.
pub struct LineLexer<'a> {
    kind: FileKind,
    exceptions: &'a WordExceptionLearner,
}

struct Cursor<'s> {
    chars: &'s [char],
    idx: usize,
}

impl Cursor<'_> {
    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.idx + offset).copied()
    }

    fn starts_with(&self, pat: &str) -> bool {
        pat.chars().enumerate().all(|(i, c)| self.peek(i) == Some(c))
    }

    // A quote or `<` preceded by an odd number of backslashes is literal text.
    fn escaped(&self) -> bool {
        let mut n = 0;
        let mut j = self.idx;
        while j > 0 && self.chars[j - 1] == '\\' {
            n += 1;
            j -= 1;
        }
        n % 2 == 1
    }
}

impl<'a> LineLexer<'a> {
    pub fn new(kind: FileKind, exceptions: &'a WordExceptionLearner) -> Self {
        Self { kind, exceptions }
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    pub fn lex(&self, line: &str, line_number: u32, start: &ParserState) -> LexedLine {
        let chars: Vec<char> = line.chars().collect();
        let len = chars.len() as u32;
        let mut st = start.clone();
        let mut cur = Cursor { chars: &chars, idx: 0 };
        let mut out = LexedLine {
            tokens: Vec::new(),
            operators: Vec::new(),
            string_ranges: Vec::new(),
            interpolation_ranges: Vec::new(),
            block_comment_ranges: Vec::new(),
            line_comment: None,
            end_state: st.clone(),
        };

        let is_config = self.kind.is_config();
        let mut comment_start: Option<u32> = st.in_block_comment.then_some(0);
        let mut string_start: Option<u32> = st.in_string().then_some(0);
        let mut interp_starts: Vec<u32> = vec![0; st.interpolation_depth as usize];
        let mut config_key: Option<Arc<str>> = None;
        let mut config_index: u32 = 0;

        while cur.idx < chars.len() {
            let c = chars[cur.idx];
            let col = cur.idx as u32;

            if st.in_block_comment {
                if cur.starts_with("*/") {
                    st.in_block_comment = false;
                    out.block_comment_ranges
                        .push(TextRange::new(comment_start.take().unwrap_or(0), col + 2));
                    cur.idx += 2;
                } else {
                    cur.idx += 1;
                }
                continue;
            }

            let in_string = st.in_string();
            if !in_string {
                if cur.starts_with("//") {
                    out.line_comment = Some(col);
                    break;
                }
                if cur.starts_with("/*") {
                    st.in_block_comment = true;
                    comment_start = Some(col);
                    cur.idx += 2;
                    continue;
                }
            }

            if c == '"' {
                if in_string {
                    if !cur.escaped() {
                        st.string_depth -= 1;
                        out.string_ranges
                            .push(TextRange::new(string_start.take().unwrap_or(0), col + 1));
                    }
                } else {
                    st.string_depth += 1;
                    string_start = Some(col);
                }
                cur.idx += 1;
                continue;
            }

            if in_string {
                if c == '<' && !cur.escaped() {
                    if let Some(s) = string_start.take() {
                        out.string_ranges.push(TextRange::new(s, col));
                    }
                    st.interpolation_depth += 1;
                    st.interpolation_parens.push(st.paren_depth);
                    interp_starts.push(col);
                    cur.idx += 1;
                    continue;
                }
                if self.at_word_start(&cur) {
                    self.lex_word(&mut cur, &mut out, &st, None, None);
                } else {
                    cur.idx += 1;
                }
                continue;
            }

            // Code mode from here on.
            if c == '>' && st.in_interpolation() && st.interpolation_parens.last() == Some(&st.paren_depth) {
                st.interpolation_depth -= 1;
                st.interpolation_parens.pop();
                let s = interp_starts.pop().unwrap_or(0);
                out.interpolation_ranges.push(TextRange::new(s, col + 1));
                string_start = Some(col + 1);
                cur.idx += 1;
                continue;
            }

            match c {
                '{' => {
                    st.brace_depth += 1;
                    cur.idx += 1;
                    continue;
                }
                '}' => {
                    st.brace_depth = st.brace_depth.saturating_sub(1);
                    cur.idx += 1;
                    continue;
                }
                _ => {}
            }

            if is_config {
                if c == '=' && config_key.is_none() && st.paren_depth == 0 {
                    config_key = Some(
                        out.tokens
                            .last()
                            .map(|t| t.value.clone())
                            .unwrap_or_else(|| Arc::from("")),
                    );
                    config_index = 0;
                    cur.idx += 1;
                    continue;
                }
                if c == ',' && config_key.is_some() && st.paren_depth == 0 {
                    config_index += 1;
                    cur.idx += 1;
                    continue;
                }
            } else if let Some((op, width)) = operator_at(&cur) {
                out.operators.push(OperatorToken {
                    token: op,
                    index: out.tokens.len() as u32,
                    paren_depth: st.paren_depth,
                });
                cur.idx += width;
                continue;
            }

            match c {
                '(' => {
                    st.paren_depth += 1;
                    if !is_config && let Some(word) = self.word_before_paren(&cur, &out) {
                        st.calls.push(CallFrame {
                            name: word.value.clone(),
                            name_index: word.index,
                            param_index: 0,
                            paren_depth: st.paren_depth,
                        });
                    }
                    cur.idx += 1;
                    continue;
                }
                ')' => {
                    if st.paren_depth > st.paren_floor() {
                        if st.calls.last().is_some_and(|f| f.paren_depth == st.paren_depth) {
                            st.calls.pop();
                        }
                        st.paren_depth -= 1;
                    }
                    cur.idx += 1;
                    continue;
                }
                ',' => {
                    if let Some(frame) = st.calls.last_mut()
                        && frame.paren_depth == st.paren_depth
                    {
                        frame.param_index += 1;
                    }
                    cur.idx += 1;
                    continue;
                }
                _ => {}
            }

            if self.at_word_start(&cur) {
                let key = if is_config { config_key.clone() } else { None };
                let index = key.as_ref().map(|_| config_index);
                self.lex_word(&mut cur, &mut out, &st, key, index);
            } else {
                cur.idx += 1;
            }
        }

        if st.in_block_comment {
            out.block_comment_ranges
                .push(TextRange::new(comment_start.unwrap_or(0), len));
        }
        if st.in_string()
            && let Some(s) = string_start
        {
            out.string_ranges.push(TextRange::new(s, len));
        }
        for s in interp_starts {
            out.interpolation_ranges.push(TextRange::new(s, len));
        }

        if is_config {
            // Config lines are self-contained; only block comments carry over.
            st.string_depth = 0;
            st.interpolation_depth = 0;
            st.interpolation_parens.clear();
            st.paren_depth = 0;
            st.calls.clear();
        }

        tracing::trace!(line = line_number, tokens = out.tokens.len(), "lexed line");
        out.end_state = st;
        out
    }

    fn at_word_start(&self, cur: &Cursor<'_>) -> bool {
        is_word_char(cur.chars[cur.idx]) || self.exception_len(cur) > 0
    }

    // Exception words only match on a word boundary at both ends.
    fn exception_len(&self, cur: &Cursor<'_>) -> usize {
        let chars = cur.chars;
        let start = cur.idx;
        if start > 0 && is_word_char(chars[start - 1]) {
            return 0;
        }
        let len = self.exceptions.match_longest_exception(chars, start);
        if len > 0 && chars.get(start + len).is_none_or(|c| !is_word_char(*c)) {
            len
        } else {
            0
        }
    }

    fn lex_word(
        &self,
        cur: &mut Cursor<'_>,
        out: &mut LexedLine,
        st: &ParserState,
        config_key: Option<Arc<str>>,
        config_index: Option<u32>,
    ) {
        let chars = cur.chars;
        let start = cur.idx;
        let exception = self.exception_len(cur);
        let end = if exception > 0 {
            start + exception
        } else {
            let mut j = start;
            while j < chars.len() && is_word_char(chars[j]) {
                j += 1;
            }
            // One `:` may join two word runs (`iface:com`).
            if j > start && chars.get(j) == Some(&':') && chars.get(j + 1).is_some_and(|c| is_word_char(*c)) {
                j += 1;
                while j < chars.len() && is_word_char(chars[j]) {
                    j += 1;
                }
            }
            j
        };
        cur.idx = end;

        let value: String = chars[start..end].iter().collect();
        let (call_name, call_name_index, call_param) = match st.current_call() {
            Some(frame) if config_key.is_none() => (Some(frame.name.clone()), Some(frame.name_index), Some(frame.param_index)),
            _ => (None, None, None),
        };
        out.tokens.push(ParsedWord {
            value: Arc::from(value),
            start: start as u32,
            end: end as u32,
            index: out.tokens.len() as u32,
            in_string: st.in_string(),
            in_interpolation: st.in_interpolation(),
            paren_depth: st.paren_depth,
            brace_depth: st.brace_depth,
            call_name,
            call_name_index,
            param_index: config_index.or(call_param),
            config_key,
        });
    }

    // The word a `(` belongs to, when only whitespace separates them.
    fn word_before_paren<'o>(&self, cur: &Cursor<'_>, out: &'o LexedLine) -> Option<&'o ParsedWord> {
        let word = out.tokens.last()?;
        let mut j = cur.idx;
        while j > 0 && is_space_char(cur.chars[j - 1]) {
            j -= 1;
        }
        (j as u32 == word.end && !word.in_string).then_some(word)
    }
}

fn operator_at(cur: &Cursor<'_>) -> Option<(Operator, usize)> {
    let two = [("<=", Operator::Le), (">=", Operator::Ge), ("&&", Operator::And), ("||", Operator::Or)];
    for (pat, op) in two {
        if cur.starts_with(pat) {
            return Some((op, 2));
        }
    }
    let op = match cur.peek(0)? {
        '=' => Operator::Assign,
        '<' => Operator::Lt,
        '>' => Operator::Gt,
        '!' => Operator::Not,
        _ => return None,
    };
    Some((op, 1))
}
