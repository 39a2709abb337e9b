use std::sync::Arc;

use crate::text::FileId;

/// An open call expression: `name(` ... `)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallFrame {
    pub name: Arc<str>,
    /// Word index of `name` on the line where the call was opened.
    pub name_index: u32,
    /// Argument currently being lexed.
    pub param_index: u32,
    /// Paren depth right after the opening `(`.
    pub paren_depth: u32,
}

/// Lexical context at a line boundary.
///
/// The state at the end of a line depends only on the state at its start
/// and the line's text, which is what makes replaying from any cached
/// boundary safe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserState {
    pub file: FileId,
    pub in_block_comment: bool,
    /// Open string literals, including ones suspended by an interpolation.
    pub string_depth: u32,
    pub interpolation_depth: u32,
    /// Paren depth saved when each open interpolation started.
    pub interpolation_parens: Vec<u32>,
    pub paren_depth: u32,
    pub brace_depth: u32,
    pub calls: Vec<CallFrame>,
}

impl ParserState {
    pub fn new(file: FileId) -> Self {
        Self {
            file,
            in_block_comment: false,
            string_depth: 0,
            interpolation_depth: 0,
            interpolation_parens: Vec::new(),
            paren_depth: 0,
            brace_depth: 0,
            calls: Vec::new(),
        }
    }

    /// Inside string text (not inside an interpolation of it).
    pub fn in_string(&self) -> bool {
        self.string_depth > self.interpolation_depth
    }

    /// Inside the code part of an interpolation.
    pub fn in_interpolation(&self) -> bool {
        self.interpolation_depth > 0 && !self.in_string()
    }

    pub fn current_call(&self) -> Option<&CallFrame> {
        self.calls.last()
    }

    /// Paren depth below which a `)` may not close while in an interpolation.
    pub(crate) fn paren_floor(&self) -> u32 {
        if self.in_interpolation() {
            self.interpolation_parens.last().copied().unwrap_or(0)
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_and_interpolation_flags() {
        let mut state = ParserState::new(FileId::new("a.rs2"));
        assert!(!state.in_string());
        state.string_depth = 1;
        assert!(state.in_string());
        assert!(!state.in_interpolation());
        state.interpolation_depth = 1;
        state.interpolation_parens.push(2);
        assert!(!state.in_string());
        assert!(state.in_interpolation());
        assert_eq!(state.paren_floor(), 2);
        // A string opened inside the interpolation.
        state.string_depth = 2;
        assert!(state.in_string());
        assert_eq!(state.paren_floor(), 0);
    }
}
