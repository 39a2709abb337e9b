use std::sync::Arc;

/// A word produced by the line lexer, with the lexical context it was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedWord {
    pub value: Arc<str>,
    /// Column of the first char.
    pub start: u32,
    /// Column one past the last char.
    pub end: u32,
    /// Ordinal among the words of its line.
    pub index: u32,
    pub in_string: bool,
    pub in_interpolation: bool,
    pub paren_depth: u32,
    pub brace_depth: u32,
    /// Innermost call this word is an argument of.
    pub call_name: Option<Arc<str>>,
    /// Word index of `call_name` on the line that opened the call.
    pub call_name_index: Option<u32>,
    /// Argument position within the call, or value position after a config `=`.
    pub param_index: Option<u32>,
    pub config_key: Option<Arc<str>>,
}

impl ParsedWord {
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    pub fn contains(&self, column: u32) -> bool {
        column >= self.start && column < self.end
    }
}

/// Comparison/assignment symbol kept apart from word tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorToken {
    pub token: Operator,
    /// Index the next word on the line will get.
    pub index: u32,
    pub paren_depth: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Le,     // <=
    Ge,     // >=
    Assign, // =
    Lt,     // <
    Gt,     // >
    Not,    // !
    And,    // &&
    Or,     // ||
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Le => "<=",
            Operator::Ge => ">=",
            Operator::Assign => "=",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::Not => "!",
            Operator::And => "&&",
            Operator::Or => "||",
        }
    }
}
