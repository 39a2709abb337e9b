use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::matching::MatchTypeId;
use crate::text::{FileId, LineCol, Location};
use crate::util::FastHashMap;

/// Identity of an indexed entity: the same name may denote several kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentifierKey {
    pub name: Arc<str>,
    pub kind: MatchTypeId,
}

impl IdentifierKey {
    pub fn new(name: impl Into<Arc<str>>, kind: MatchTypeId) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

impl fmt::Display for IdentifierKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureParam {
    pub type_keyword: Arc<str>,
    pub name: Arc<str>,
}

/// Parameters and return types of a callable declaration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Signature {
    pub params: Vec<SignatureParam>,
    pub returns: Vec<Arc<str>>,
}

impl Signature {
    pub fn param_type(&self, index: u32) -> Option<&str> {
        self.params.get(index as usize).map(|p| p.type_keyword.as_ref())
    }

    pub fn return_type(&self, index: u32) -> Option<&str> {
        self.returns.get(index as usize).map(|r| r.as_ref())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} ${}", p.type_keyword, p.name)?;
        }
        f.write_str(")")?;
        if !self.returns.is_empty() {
            write!(f, "({})", self.returns.join(", "))?;
        }
        Ok(())
    }
}

/// Details read from the text around a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeclarationDetail {
    #[default]
    None,
    Signature(Signature),
    /// `type=` of a param or variable.
    ValueType(Arc<str>),
    EnumTypes {
        input: Option<Arc<str>>,
        output: Option<Arc<str>>,
    },
    ConstantValue(String),
    ColumnTypes(Vec<Arc<str>>),
}

/// One indexed entity: its declaration (if known) and every reference.
#[derive(Debug, Clone)]
pub struct Identifier {
    pub name: Arc<str>,
    pub kind: MatchTypeId,
    pub declaration: Option<Location>,
    pub references: FastHashMap<FileId, BTreeSet<LineCol>>,
    pub detail: DeclarationDetail,
    /// `//` comment lines directly above the declaration.
    pub doc: Option<String>,
    /// Numeric id assigned by a `.pack` file.
    pub pack_id: Option<u32>,
}

impl Identifier {
    pub fn new(name: Arc<str>, kind: MatchTypeId) -> Self {
        Self {
            name,
            kind,
            declaration: None,
            references: FastHashMap::default(),
            detail: DeclarationDetail::None,
            doc: None,
            pack_id: None,
        }
    }

    pub fn key(&self) -> IdentifierKey {
        IdentifierKey::new(self.name.clone(), self.kind)
    }

    pub fn is_declared(&self) -> bool {
        self.declaration.is_some()
    }

    pub fn reference_count(&self) -> usize {
        self.references.values().map(BTreeSet::len).sum()
    }

    /// Neither declared nor referenced anywhere.
    pub fn is_garbage(&self) -> bool {
        self.declaration.is_none() && self.references.values().all(BTreeSet::is_empty)
    }

    pub fn signature(&self) -> Option<&Signature> {
        match &self.detail {
            DeclarationDetail::Signature(sig) => Some(sig),
            _ => None,
        }
    }

    /// All reference locations, ordered by file then position.
    pub fn reference_locations(&self) -> Vec<Location> {
        let mut files: Vec<&FileId> = self.references.keys().collect();
        files.sort();
        files
            .into_iter()
            .flat_map(|file| {
                self.references[file]
                    .iter()
                    .map(move |lc| Location::new(file.clone(), lc.line, lc.column))
            })
            .collect()
    }
}
