use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Serialize;
use walkdir::WalkDir;

use crate::config::SessionConfig;
use crate::exceptions::WordExceptionLearner;
use crate::file_kind::FileKind;
use crate::index::{ActiveFileIndex, DeclarationText, IdentifierIndex};
use crate::lexer::{LexedDocument, RelexReport};
use crate::mapfile::MapFile;
use crate::matching::{MatchPass, MatchTypeId, match_document};
use crate::text::{FileId, Location, TextEdit};
use crate::util::FastHashMap;

/// Counts reported by a full rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RebuildStats {
    pub files: usize,
    pub maps: usize,
    pub identifiers: usize,
    pub declarations: usize,
    pub references: usize,
    pub exceptions: usize,
}

/// Owner of every cache of one indexed project.
///
/// All mutation goes through `&mut self`; callers that share a session
/// across tasks wrap it in a lock (see [`crate::service::IndexService`]).
pub struct IndexSession {
    pub(super) config: SessionConfig,
    root: Option<PathBuf>,
    exceptions: WordExceptionLearner,
    /// Dictionary size when every document was last lexed.
    lexed_with: usize,
    pub(super) identifiers: IdentifierIndex,
    pub(super) documents: FastHashMap<FileId, LexedDocument>,
    pub(super) maps: FastHashMap<FileId, MapFile>,
    pub(super) active: Option<ActiveFileIndex>,
}

impl Default for IndexSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl IndexSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            root: None,
            exceptions: WordExceptionLearner::new(),
            lexed_with: 0,
            identifiers: IdentifierIndex::new(),
            documents: FastHashMap::default(),
            maps: FastHashMap::default(),
            active: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn identifiers(&self) -> &IdentifierIndex {
        &self.identifiers
    }

    pub fn exceptions(&self) -> &WordExceptionLearner {
        &self.exceptions
    }

    pub fn document(&self, file: &FileId) -> Option<&LexedDocument> {
        self.documents.get(file)
    }

    pub fn map_file(&self, file: &FileId) -> Option<&MapFile> {
        self.maps.get(file)
    }

    pub fn active_file(&self) -> Option<&FileId> {
        self.active.as_ref().and_then(ActiveFileIndex::file)
    }

    pub fn active_index(&self) -> Option<&ActiveFileIndex> {
        self.active.as_ref()
    }

    /// Every loaded file, sorted.
    pub fn files(&self) -> Vec<FileId> {
        let mut files: Vec<FileId> = self.documents.keys().chain(self.maps.keys()).cloned().collect();
        files.sort();
        files
    }

    pub fn file_count(&self) -> usize {
        self.documents.len() + self.maps.len()
    }

    /// Current sizes. Pass counters stay zero; only rebuilds report them.
    pub fn stats(&self) -> RebuildStats {
        RebuildStats {
            files: self.documents.len(),
            maps: self.maps.len(),
            identifiers: self.identifiers.len(),
            exceptions: self.exceptions.len(),
            ..RebuildStats::default()
        }
    }

    /// Drop every cache. The configuration and project root are kept.
    pub fn reset(&mut self) {
        self.identifiers.clear();
        self.documents.clear();
        self.maps.clear();
        self.exceptions.clear();
        self.lexed_with = 0;
        self.active = None;
        tracing::debug!("session reset");
    }

    /// Add or replace a source file without matching it. Returns `false`
    /// when the extension is not a known file kind.
    pub fn load_file(&mut self, file: FileId, text: &str) -> bool {
        let Some(kind) = FileKind::from_file(&file) else {
            return false;
        };
        if kind.engine().is_none() {
            self.maps.insert(file, MapFile::parse(text));
            return true;
        }
        self.exceptions.learn_from_text(text);
        match self.documents.get_mut(&file) {
            Some(doc) => doc.set_text(text, &self.exceptions),
            None => {
                let doc = LexedDocument::new(file.clone(), kind, text, &self.exceptions);
                self.documents.insert(file, doc);
            }
        }
        true
    }

    /// Clear the identifier index and run both passes over every file.
    pub fn rebuild_all(&mut self) -> RebuildStats {
        self.identifiers.clear();
        if self.exceptions.len() != self.lexed_with {
            for doc in self.documents.values_mut() {
                doc.relex_all(&self.exceptions);
            }
            self.lexed_with = self.exceptions.len();
        }

        let mut files: Vec<FileId> = self.documents.keys().cloned().collect();
        files.sort();
        let lookback = self.config.call_lookback_lines;
        let mut stats = RebuildStats::default();

        for file in &files {
            let doc = &self.documents[file];
            declare_interface(&mut self.identifiers, doc);
            let mut scratch = ActiveFileIndex::new(file.clone(), lookback);
            stats.declarations += match_document(doc, MatchPass::Declarations, &mut self.identifiers, &mut scratch).declarations;
        }

        let active_file = self.active_file().cloned();
        if active_file.as_ref().is_some_and(|f| !self.documents.contains_key(f)) {
            self.active = None;
        }
        for file in &files {
            let doc = &self.documents[file];
            let mut index = ActiveFileIndex::new(file.clone(), lookback);
            stats.references += match_document(doc, MatchPass::Full, &mut self.identifiers, &mut index).references;
            if active_file.as_ref() == Some(file) {
                self.active = Some(index);
            }
        }

        let mut maps: Vec<&FileId> = self.maps.keys().collect();
        maps.sort();
        for file in maps {
            stats.references += index_map(&mut self.identifiers, file, &self.maps[file]);
        }

        stats.files = files.len();
        stats.maps = self.maps.len();
        stats.identifiers = self.identifiers.len();
        stats.exceptions = self.exceptions.len();
        tracing::info!(
            files = stats.files,
            maps = stats.maps,
            identifiers = stats.identifiers,
            "rebuilt identifier index"
        );
        stats
    }

    /// Load every indexable file under `root` and rebuild. Settings are
    /// read from `root/rsidx.toml` when present.
    pub fn scan_project(&mut self, root: &Path) -> Result<RebuildStats> {
        let root = root
            .canonicalize()
            .with_context(|| format!("cannot open project root {}", root.display()))?;
        self.config = SessionConfig::load(&root)?;
        self.reset();

        let config = &self.config;
        let mut paths: Vec<PathBuf> = WalkDir::new(&root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0 || !e.file_type().is_dir() || !config.is_excluded(&e.file_name().to_string_lossy())
            })
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .collect();
        paths.sort();

        let max_bytes = self.config.max_file_bytes;
        for path in paths {
            let relative = path.strip_prefix(&root).unwrap_or(&path);
            let file = FileId::from_path(relative);
            if FileKind::from_file(&file).is_none() {
                continue;
            }
            let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
            if size > max_bytes {
                tracing::debug!(%file, size, "skipping oversized file");
                continue;
            }
            match std::fs::read_to_string(&path) {
                Ok(text) => {
                    self.load_file(file, &text);
                }
                Err(err) => tracing::warn!(%file, %err, "skipping unreadable file"),
            }
        }
        self.root = Some(root);
        Ok(self.rebuild_all())
    }

    /// Make `file` the active file and rebuild its file-scoped index.
    pub fn open_file(&mut self, file: &FileId) -> Result<&ActiveFileIndex> {
        let Some(doc) = self.documents.get(file) else {
            bail!("{file} is not loaded");
        };
        let mut index = ActiveFileIndex::new(file.clone(), self.config.call_lookback_lines);
        match_document(doc, MatchPass::Full, &mut self.identifiers, &mut index);
        tracing::debug!(%file, matches = index.match_count(), "opened file");
        Ok(self.active.insert(index))
    }

    pub(super) fn ensure_active(&mut self, file: &FileId) -> Result<&ActiveFileIndex> {
        if !self.active.as_ref().is_some_and(|a| a.is_for(file)) {
            self.open_file(file)?;
        }
        self.active.as_ref().context("no active file")
    }

    pub fn close_active(&mut self) {
        self.active = None;
    }

    /// Apply edits to a loaded file, re-lex only what changed and rematch
    /// the file against the index.
    pub fn apply_edits(&mut self, file: &FileId, edits: &[TextEdit]) -> Result<Vec<RelexReport>> {
        let Some(doc) = self.documents.get_mut(file) else {
            bail!("{file} is not loaded");
        };
        let reports: Vec<RelexReport> = edits.iter().map(|edit| doc.apply_edit(edit, &self.exceptions)).collect();
        if self.exceptions.learn_from_text(&doc.text().to_string()) > 0 {
            doc.relex_all(&self.exceptions);
        }
        self.rematch(file);
        tracing::debug!(%file, edits = edits.len(), "applied edits");
        Ok(reports)
    }

    /// Replace the whole text of a file (or add it) and rematch it.
    pub fn update_file(&mut self, file: &FileId, text: &str) -> Result<()> {
        if !self.load_file(file.clone(), text) {
            bail!("{file} is not an indexable file");
        }
        if let Some(map) = self.maps.get(file) {
            self.identifiers.clear_file(file);
            index_map(&mut self.identifiers, file, map);
        } else {
            self.rematch(file);
        }
        Ok(())
    }

    /// Forget a file entirely. Returns whether it was loaded.
    pub fn remove_file(&mut self, file: &FileId) -> bool {
        self.identifiers.clear_file(file);
        let removed = self.documents.remove(file).is_some() | self.maps.remove(file).is_some();
        if self.active.as_ref().is_some_and(|a| a.is_for(file)) {
            self.active = None;
        }
        removed
    }

    /// Rematch `file`, then every other file calling a callable whose
    /// signature the new text changed.
    fn rematch(&mut self, file: &FileId) {
        let before = self.identifiers.signatures_declared_in(file);
        self.match_file(file);
        let after = self.identifiers.signatures_declared_in(file);

        let mut callers: BTreeSet<FileId> = BTreeSet::new();
        for key in before.keys().chain(after.keys()) {
            if before.get(key) == after.get(key) {
                continue;
            }
            if let Some(ident) = self.identifiers.get(&key.name, key.kind) {
                callers.extend(ident.references.keys().filter(|f| *f != file).cloned());
            }
        }
        callers.retain(|f| self.documents.contains_key(f));
        if !callers.is_empty() {
            tracing::debug!(%file, callers = callers.len(), "signature changed, rematching callers");
        }
        for caller in &callers {
            self.match_file(caller);
        }
    }

    fn match_file(&mut self, file: &FileId) {
        self.identifiers.clear_file(file);
        let Some(doc) = self.documents.get(file) else {
            return;
        };
        let mut index = ActiveFileIndex::new(file.clone(), self.config.call_lookback_lines);
        declare_interface(&mut self.identifiers, doc);
        match_document(doc, MatchPass::Declarations, &mut self.identifiers, &mut index);
        match_document(doc, MatchPass::Full, &mut self.identifiers, &mut index);
        if self.active.as_ref().is_some_and(|a| a.is_for(file)) {
            self.active = Some(index);
        }
    }
}

// An interface file declares the interface named by its stem.
fn declare_interface(identifiers: &mut IdentifierIndex, doc: &LexedDocument) {
    if doc.kind() != FileKind::Interface {
        return;
    }
    let file = doc.file();
    identifiers.put_declaration(
        file.stem(),
        MatchTypeId::Interface,
        Location::new(file.clone(), 0, 0),
        &DeclarationText::default(),
    );
}

fn index_map(identifiers: &mut IdentifierIndex, file: &FileId, map: &MapFile) -> usize {
    let mut indexed = 0;
    for (kind, id, line, range) in map.entity_references() {
        let Some(name) = identifiers.find_by_pack_id(kind, id).map(|i| i.name.clone()) else {
            continue;
        };
        identifiers.put_reference(&name, kind, file, line, range.start);
        indexed += 1;
    }
    indexed
}
