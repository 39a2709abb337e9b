mod incremental;
mod line_lexer;
mod state;
mod token;

#[cfg(test)]
mod incremental_test;

pub use incremental::{LexedDocument, RelexReport};
pub use line_lexer::{LexedLine, LineLexer};
pub use state::{CallFrame, ParserState};
pub use token::{Operator, OperatorToken, ParsedWord};
