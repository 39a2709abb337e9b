mod active_file;
pub mod export;
mod identifier;
mod identifiers;

#[cfg(test)]
mod identifiers_test;

pub use active_file::{ActiveFileIndex, Block, LocalVariable, MatchSpan};
pub use identifier::{DeclarationDetail, Identifier, IdentifierKey, Signature, SignatureParam};
pub use identifiers::{DeclarationText, IdentifierIndex, UnknownReference, parse_signature};
