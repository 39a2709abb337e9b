//! Debug dump of the identifier index as flat JSON.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;

use crate::index::IdentifierIndex;
use crate::matching::MatchTypeId;

#[derive(Debug, Serialize)]
pub struct ExportedDeclaration {
    pub file: String,
    #[serde(rename = "lineCol")]
    pub line_col: String,
}

#[derive(Debug, Serialize)]
pub struct ExportedIdentifier {
    pub name: String,
    pub kind: MatchTypeId,
    pub declaration: Option<ExportedDeclaration>,
    pub references: BTreeMap<String, Vec<String>>,
    #[serde(rename = "packId", skip_serializing_if = "Option::is_none")]
    pub pack_id: Option<u32>,
}

/// Key → record map, ordered by key.
pub fn export(index: &IdentifierIndex) -> BTreeMap<String, ExportedIdentifier> {
    index
        .iter()
        .map(|ident| {
            let references = ident
                .references
                .iter()
                .filter(|(_, set)| !set.is_empty())
                .map(|(file, set)| {
                    // BTreeSet order: by line, then column.
                    let encoded: Vec<String> = set.iter().map(|lc| lc.encode()).collect();
                    (file.to_string(), encoded)
                })
                .collect();
            let record = ExportedIdentifier {
                name: ident.name.to_string(),
                kind: ident.kind,
                declaration: ident.declaration.as_ref().map(|loc| ExportedDeclaration {
                    file: loc.file.to_string(),
                    line_col: loc.line_col().encode(),
                }),
                references,
                pack_id: ident.pack_id,
            };
            (ident.key().to_string(), record)
        })
        .collect()
}

pub fn export_json(index: &IdentifierIndex) -> Result<String> {
    Ok(serde_json::to_string_pretty(&export(index))?)
}
