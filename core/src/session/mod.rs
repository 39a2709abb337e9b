//! Explicit owner of the indexes of one project.

mod query;
#[allow(clippy::module_inception)]
mod session;

#[cfg(test)]
mod session_test;

pub use query::SymbolInfo;
pub use session::{IndexSession, RebuildStats};
