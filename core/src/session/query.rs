//! Position and name queries answered from the session's indexes.

use std::sync::Arc;

use anyhow::Result;

use crate::index::{DeclarationDetail, MatchSpan, UnknownReference, export};
use crate::matching::MatchTypeId;
use crate::session::IndexSession;
use crate::text::{FileId, Location, ParseDiagnostic};

/// Everything known about the entity under a position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolInfo {
    pub span: MatchSpan,
    pub declaration: Option<Location>,
    pub detail: DeclarationDetail,
    pub doc: Option<String>,
    pub pack_id: Option<u32>,
    pub reference_count: usize,
}

impl SymbolInfo {
    /// `proc foo` style heading.
    pub fn title(&self) -> String {
        format!("{} {}", self.span.kind.display_name(), self.span.name)
    }
}

impl IndexSession {
    /// Classified token covering `(line, column)` of `file`. Activates the
    /// file when it is not the active one.
    pub fn match_at(&mut self, file: &FileId, line: u32, column: u32) -> Option<MatchSpan> {
        self.ensure_active(file).ok()?.match_at(line, column).cloned()
    }

    pub fn definition(&mut self, file: &FileId, line: u32, column: u32) -> Option<Location> {
        let span = self.match_at(file, line, column)?;
        if span.kind == MatchTypeId::LocalVar {
            let var = self.active.as_ref()?.local_variable(line, &span.name)?;
            return Some(Location::new(file.clone(), var.declared_at.line, var.declared_at.column));
        }
        self.identifiers.declaration(&span.name, span.kind).cloned()
    }

    /// References of the entity under the position, declaration excluded.
    pub fn references(&mut self, file: &FileId, line: u32, column: u32) -> Vec<Location> {
        let Some(span) = self.match_at(file, line, column) else {
            return Vec::new();
        };
        if span.kind == MatchTypeId::LocalVar {
            return self.local_references(file, line, &span.name);
        }
        self.identifiers.references(&span.name, span.kind)
    }

    // Uses of a local variable within the block that declares it.
    fn local_references(&self, file: &FileId, line: u32, name: &str) -> Vec<Location> {
        let Some(active) = self.active.as_ref() else {
            return Vec::new();
        };
        let Some(target) = active.local_variable(line, name).map(|v| v.declared_at) else {
            return Vec::new();
        };
        active
            .all_matches()
            .into_iter()
            .filter(|(l, s)| {
                s.kind == MatchTypeId::LocalVar
                    && !s.declaration
                    && s.name.as_ref() == name
                    && active.local_variable(*l, name).is_some_and(|v| v.declared_at == target)
            })
            .map(|(l, s)| Location::new(file.clone(), l, s.start))
            .collect()
    }

    pub fn symbol_info(&mut self, file: &FileId, line: u32, column: u32) -> Option<SymbolInfo> {
        let span = self.match_at(file, line, column)?;
        let declaration = self.definition(file, line, column);
        let mut info = SymbolInfo {
            span,
            declaration,
            detail: DeclarationDetail::None,
            doc: None,
            pack_id: None,
            reference_count: 0,
        };
        if let Some(ident) = self.identifiers.get(&info.span.name, info.span.kind) {
            info.detail = ident.detail.clone();
            info.doc = ident.doc.clone();
            info.pack_id = ident.pack_id;
            info.reference_count = ident.reference_count();
        }
        Some(info)
    }

    pub fn completions(&self, kind: MatchTypeId, prefix: &str) -> Vec<String> {
        self.identifiers.completions(kind, prefix)
    }

    pub fn is_declared(&self, name: &str, kind: MatchTypeId) -> bool {
        self.identifiers.is_declared(name, kind)
    }

    /// Local variables visible from `line` of `file`, sorted.
    pub fn local_variable_names(&mut self, file: &FileId, line: u32) -> Vec<Arc<str>> {
        self.ensure_active(file)
            .map(|active| active.local_variable_names(line))
            .unwrap_or_default()
    }

    pub fn unknown_references(&self, file: &FileId) -> Vec<UnknownReference> {
        self.identifiers.unknown_references(file)
    }

    pub fn map_diagnostics(&self, file: &FileId) -> &[ParseDiagnostic] {
        self.maps.get(file).map(|m| m.diagnostics.as_slice()).unwrap_or_default()
    }

    pub fn export_json(&self) -> Result<String> {
        export::export_json(&self.identifiers)
    }
}
