//! Cross-file symbol table.
//!
//! Maps `(name, kind)` to at most one declaration plus per-file reference
//! sets. When several sites declare the same key the earliest location is
//! the declaration and the others wait in `alternates` until it is cleared.
//! Every file remembers which keys it contributed to so that `clear_file`
//! touches only those records. A completion trie per kind is
//! kept in sync with the set of live identifiers.

use std::collections::BTreeSet;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::index::identifier::{DeclarationDetail, Identifier, IdentifierKey, Signature, SignatureParam};
use crate::matching::{DeclarationInfo, MatchTypeId};
use crate::text::{FileId, LineCol, Location};
use crate::trie::Trie;
use crate::util::{FastHashMap, FastHashSet};

static HEADER_GROUPS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\[[^\]]*\]\s*(?:\(([^)]*)\))?\s*(?:\(([^)]*)\))?").expect("valid header regex")
});

/// Text around a declaration, gathered by the matching engine.
#[derive(Debug, Clone, Default)]
pub struct DeclarationText {
    /// The declaring line followed by the rest of its block.
    pub lines: Vec<String>,
    /// `//` comment lines directly above the declaration, markers stripped.
    pub doc: Option<String>,
}

impl DeclarationText {
    pub fn from_line(line: impl Into<String>) -> Self {
        Self {
            lines: vec![line.into()],
            doc: None,
        }
    }

    fn block_value(&self, key: &str) -> Option<&str> {
        self.lines.iter().skip(1).find_map(|line| {
            let (k, v) = line.trim().split_once('=')?;
            (k.trim() == key).then(|| v.trim())
        })
    }

    fn detail(&self, kind: MatchTypeId) -> DeclarationDetail {
        let first = self.lines.first().map(String::as_str).unwrap_or_default();
        match kind.descriptor().declaration_info {
            DeclarationInfo::None => DeclarationDetail::None,
            DeclarationInfo::Signature => parse_signature(first)
                .map(DeclarationDetail::Signature)
                .unwrap_or_default(),
            DeclarationInfo::ValueType => self
                .block_value("type")
                .map(|t| DeclarationDetail::ValueType(Arc::from(t)))
                .unwrap_or_default(),
            DeclarationInfo::EnumTypes => DeclarationDetail::EnumTypes {
                input: self.block_value("inputtype").map(Arc::from),
                output: self.block_value("outputtype").map(Arc::from),
            },
            DeclarationInfo::ConstantValue => first
                .split_once('=')
                .map(|(_, v)| DeclarationDetail::ConstantValue(strip_comment(v).trim().to_string()))
                .unwrap_or_default(),
            DeclarationInfo::ColumnTypes => first
                .split_once('=')
                .map(|(_, v)| {
                    DeclarationDetail::ColumnTypes(v.split(',').skip(1).map(|t| Arc::from(t.trim())).collect())
                })
                .unwrap_or_default(),
        }
    }
}

fn strip_comment(text: &str) -> &str {
    text.find("//").map_or(text, |i| &text[..i])
}

/// Parse `[trigger,name](type $a, ...)(ret, ...)`.
pub fn parse_signature(header: &str) -> Option<Signature> {
    let caps = HEADER_GROUPS_RE.captures(header)?;
    let params = caps
        .get(1)
        .map(|m| {
            m.as_str()
                .split(',')
                .filter_map(|part| {
                    let mut words = part.split_whitespace();
                    let type_keyword = words.next()?;
                    let name = words.next()?.trim_start_matches('$');
                    Some(SignatureParam {
                        type_keyword: Arc::from(type_keyword),
                        name: Arc::from(name),
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    let returns = caps
        .get(2)
        .map(|m| {
            m.as_str()
                .split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(Arc::from)
                .collect()
        })
        .unwrap_or_default();
    Some(Signature { params, returns })
}

/// A reference whose entity has no declaration anywhere in the project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownReference {
    pub name: Arc<str>,
    pub kind: MatchTypeId,
    pub position: LineCol,
}

impl UnknownReference {
    pub fn message(&self) -> String {
        format!("unknown {}: {}", self.kind.display_name(), self.name)
    }
}

// A declaration site that is not (or no longer) the primary one.
#[derive(Debug, Clone)]
struct DeclarationSite {
    location: Location,
    detail: DeclarationDetail,
    doc: Option<String>,
}

#[derive(Debug, Default)]
pub struct IdentifierIndex {
    identifiers: FastHashMap<IdentifierKey, Identifier>,
    alternates: FastHashMap<IdentifierKey, Vec<DeclarationSite>>,
    file_keys: FastHashMap<FileId, FastHashSet<IdentifierKey>>,
    completions: FastHashMap<MatchTypeId, Trie>,
    pack_ids: FastHashMap<(MatchTypeId, u32), Arc<str>>,
    pack_sources: FastHashMap<FileId, Vec<(MatchTypeId, u32)>>,
}

impl IdentifierIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Identifier> {
        self.identifiers.values()
    }

    pub fn get(&self, name: &str, kind: MatchTypeId) -> Option<&Identifier> {
        self.identifiers.get(&IdentifierKey::new(name, kind))
    }

    pub fn is_declared(&self, name: &str, kind: MatchTypeId) -> bool {
        self.get(name, kind).is_some_and(Identifier::is_declared)
    }

    pub fn declaration(&self, name: &str, kind: MatchTypeId) -> Option<&Location> {
        self.get(name, kind).and_then(|i| i.declaration.as_ref())
    }

    pub fn references(&self, name: &str, kind: MatchTypeId) -> Vec<Location> {
        self.get(name, kind).map(Identifier::reference_locations).unwrap_or_default()
    }

    /// Names of `kind` starting with `prefix`, sorted.
    pub fn completions(&self, kind: MatchTypeId, prefix: &str) -> Vec<String> {
        self.completions
            .get(&kind)
            .map(|trie| trie.find_words_with_prefix(prefix))
            .unwrap_or_default()
    }

    /// Record a declaration. Repeating a known site is a no-op; of several
    /// sites for one key the smallest location is the declaration.
    pub fn put_declaration(
        &mut self,
        name: &str,
        kind: MatchTypeId,
        location: Location,
        text: &DeclarationText,
    ) -> Option<&Identifier> {
        if !indexable(name, kind) {
            return None;
        }
        let key = IdentifierKey::new(name, kind);
        self.file_keys
            .entry(location.file.clone())
            .or_default()
            .insert(key.clone());
        self.completions.entry(kind).or_default().insert(name);

        let ident = self
            .identifiers
            .entry(key.clone())
            .or_insert_with(|| Identifier::new(key.name.clone(), kind));
        let site = DeclarationSite {
            location,
            detail: text.detail(kind),
            doc: text.doc.clone(),
        };
        match ident.declaration.clone() {
            None => {
                tracing::trace!(name, %kind, at = %site.location, "declaration");
                install(ident, site);
            }
            Some(current) if current == site.location => {}
            Some(current) => {
                let sites = self.alternates.entry(key).or_default();
                if !sites.iter().any(|s| s.location == site.location) {
                    tracing::debug!(name, %kind, first = %current, other = %site.location, "duplicate declaration");
                    if site.location < current {
                        sites.extend(take_declaration(ident));
                        install(ident, site);
                    } else {
                        sites.push(site);
                    }
                }
            }
        }
        Some(ident)
    }

    /// Record a reference, creating a stub if the entity is not declared yet.
    pub fn put_reference(
        &mut self,
        name: &str,
        kind: MatchTypeId,
        file: &FileId,
        line: u32,
        column: u32,
    ) -> Option<&Identifier> {
        if !indexable(name, kind) {
            return None;
        }
        let key = IdentifierKey::new(name, kind);
        self.file_keys.entry(file.clone()).or_default().insert(key.clone());
        self.completions.entry(kind).or_default().insert(name);

        let ident = self
            .identifiers
            .entry(key.clone())
            .or_insert_with(|| Identifier::new(key.name.clone(), kind));
        ident
            .references
            .entry(file.clone())
            .or_default()
            .insert(LineCol::new(line, column));
        Some(ident)
    }

    /// Signatures of the callables whose declaration lives in `file`.
    pub fn signatures_declared_in(&self, file: &FileId) -> FastHashMap<IdentifierKey, Signature> {
        let Some(keys) = self.file_keys.get(file) else {
            return FastHashMap::default();
        };
        keys.iter()
            .filter_map(|key| {
                let ident = self.identifiers.get(key)?;
                if ident.declaration.as_ref().is_none_or(|d| &d.file != file) {
                    return None;
                }
                Some((key.clone(), ident.signature()?.clone()))
            })
            .collect()
    }

    /// Alias `id` to `(name, kind)`, as read from `source`'s pack lines.
    pub fn set_pack_id(&mut self, name: &str, kind: MatchTypeId, id: u32, source: &FileId) {
        if !indexable(name, kind) {
            return;
        }
        let key = IdentifierKey::new(name, kind);
        let ident = self
            .identifiers
            .entry(key.clone())
            .or_insert_with(|| Identifier::new(key.name.clone(), kind));
        ident.pack_id = Some(id);
        self.pack_ids.insert((kind, id), key.name);
        self.pack_sources.entry(source.clone()).or_default().push((kind, id));
    }

    pub fn find_by_pack_id(&self, kind: MatchTypeId, id: u32) -> Option<&Identifier> {
        let name = self.pack_ids.get(&(kind, id))?;
        self.get(name, kind)
    }

    /// Forget everything `file` contributed.
    pub fn clear_file(&mut self, file: &FileId) {
        if let Some(aliases) = self.pack_sources.remove(file) {
            for (kind, id) in aliases {
                if let Some(name) = self.pack_ids.remove(&(kind, id))
                    && let Some(ident) = self.identifiers.get_mut(&IdentifierKey::new(name, kind))
                    && ident.pack_id == Some(id)
                {
                    ident.pack_id = None;
                }
            }
        }

        let Some(keys) = self.file_keys.remove(file) else {
            return;
        };
        let mut removed = 0usize;
        for key in keys {
            let Some(ident) = self.identifiers.get_mut(&key) else {
                continue;
            };
            ident.references.remove(file);
            let declared_here = ident.declaration.as_ref().is_some_and(|d| &d.file == file);
            let mut next = None;
            if let Some(sites) = self.alternates.get_mut(&key) {
                sites.retain(|s| &s.location.file != file);
                let earliest = (0..sites.len()).min_by(|&a, &b| sites[a].location.cmp(&sites[b].location));
                if declared_here && let Some(i) = earliest {
                    next = Some(sites.swap_remove(i));
                }
                if sites.is_empty() {
                    self.alternates.remove(&key);
                }
            }
            if declared_here {
                take_declaration(ident);
                if let Some(site) = next {
                    tracing::debug!(name = %key.name, kind = %key.kind, at = %site.location, "promoted declaration");
                    install(ident, site);
                }
            }
            if ident.is_garbage() {
                self.remove_identifier(&key);
                removed += 1;
            }
        }
        tracing::debug!(%file, removed, "cleared file from identifier index");
    }

    pub fn clear(&mut self) {
        self.identifiers.clear();
        self.alternates.clear();
        self.file_keys.clear();
        self.completions.clear();
        self.pack_ids.clear();
        self.pack_sources.clear();
    }

    /// Files that declared or referenced anything.
    pub fn files(&self) -> impl Iterator<Item = &FileId> {
        self.file_keys.keys()
    }

    /// References in `file` to entities declared nowhere, sorted by position.
    pub fn unknown_references(&self, file: &FileId) -> Vec<UnknownReference> {
        let mut out = Vec::new();
        let Some(keys) = self.file_keys.get(file) else {
            return out;
        };
        for key in keys {
            let Some(ident) = self.identifiers.get(key) else {
                continue;
            };
            if ident.is_declared() || key.kind.descriptor().reference_only {
                continue;
            }
            for position in ident.references.get(file).into_iter().flat_map(BTreeSet::iter) {
                out.push(UnknownReference {
                    name: ident.name.clone(),
                    kind: ident.kind,
                    position: *position,
                });
            }
        }
        out.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.name.cmp(&b.name)));
        out
    }

    fn remove_identifier(&mut self, key: &IdentifierKey) {
        self.alternates.remove(key);
        if let Some(ident) = self.identifiers.remove(key) {
            if let Some(id) = ident.pack_id {
                self.pack_ids.remove(&(key.kind, id));
            }
            if let Some(trie) = self.completions.get_mut(&key.kind) {
                trie.remove(&key.name);
            }
        }
    }
}

fn install(ident: &mut Identifier, site: DeclarationSite) {
    ident.declaration = Some(site.location);
    ident.detail = site.detail;
    ident.doc = site.doc;
}

fn take_declaration(ident: &mut Identifier) -> Option<DeclarationSite> {
    let location = ident.declaration.take()?;
    Some(DeclarationSite {
        location,
        detail: std::mem::take(&mut ident.detail),
        doc: ident.doc.take(),
    })
}

fn indexable(name: &str, kind: MatchTypeId) -> bool {
    !name.is_empty() && kind.descriptor().cache
}
