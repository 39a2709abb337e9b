pub mod config;
pub mod exceptions;
pub mod file_kind;
pub mod index;
pub mod lexer;
pub mod line_cache;
pub mod mapfile;
pub mod matching;
pub mod rename;
pub mod text;
pub mod trie;
pub mod util;

// Explicit session owning every cache, and its async front
pub mod service;
pub mod session;

pub use config::SessionConfig;
pub use session::{IndexSession, RebuildStats, SymbolInfo};
pub use text::{FileId, LineCol, Location, TextEdit};
