//! Rename planning.
//!
//! A plan lists every text edit (and file move) a rename needs. Nothing is
//! applied here; callers feed [`RenamePlan::text_edits`] back through
//! [`IndexSession::apply_edits`] or write the files themselves. Planning
//! fails before producing any edit when the rename is not allowed.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use serde::Serialize;

use crate::file_kind::FileKind;
use crate::matching::MatchTypeId;
use crate::session::IndexSession;
use crate::text::{FileId, LineCol, Location, TextEdit};
use crate::util::chars::is_word_char;

/// Replace `start..end` (chars) of one line.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct RenameEdit {
    pub file: FileId,
    pub line: u32,
    pub start: u32,
    pub end: u32,
    pub new_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMove {
    pub from: FileId,
    pub to: FileId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenamePlan {
    /// `None` for a plain file move.
    pub kind: Option<MatchTypeId>,
    pub old_name: Arc<str>,
    pub new_name: String,
    pub edits: Vec<RenameEdit>,
    pub moves: Vec<FileMove>,
}

impl RenamePlan {
    /// Files touched by at least one edit, sorted.
    pub fn files(&self) -> Vec<&FileId> {
        let mut files: Vec<&FileId> = self.edits.iter().map(|e| &e.file).collect();
        files.dedup();
        files
    }

    /// Edits of `file`, last position first so each one leaves the
    /// positions of the rest valid.
    pub fn text_edits(&self, file: &FileId) -> Vec<TextEdit> {
        self.edits
            .iter()
            .rev()
            .filter(|e| &e.file == file)
            .map(|e| {
                TextEdit::new(
                    LineCol::new(e.line, e.start),
                    LineCol::new(e.line, e.end),
                    e.new_text.clone(),
                )
            })
            .collect()
    }

    fn finish(mut self) -> Self {
        self.edits.sort();
        self.edits.dedup();
        self
    }
}

/// Plan renaming the entity under `(line, column)` of `file` to `new_name`.
///
/// `new_name` is the bare name. For `iface:com` style names only the part
/// after the colon changes; prefixes such as `cert_` stay on every use.
pub fn plan_rename(
    session: &mut IndexSession,
    file: &FileId,
    line: u32,
    column: u32,
    new_name: &str,
) -> Result<RenamePlan> {
    let Some(span) = session.match_at(file, line, column) else {
        bail!("nothing to rename at {file}:{line}:{column}");
    };
    let kind = span.kind;
    if !kind.descriptor().allow_rename {
        bail!("{} `{}` cannot be renamed", kind.display_name(), span.name);
    }
    validate_name(new_name)?;

    if kind == MatchTypeId::Interface {
        let declared = session
            .identifiers()
            .declaration(&span.name, kind)
            .with_context(|| format!("interface `{}` has no file", span.name))?
            .file
            .clone();
        let target = sibling(&declared, new_name);
        return plan_file_rename(session, &declared, &target);
    }

    let (container, old_base) = match span.name.rsplit_once(':') {
        Some((container, base)) => (Some(container), base),
        None => (None, span.name.as_ref()),
    };
    if old_base == new_name {
        bail!("`{}` is already named `{new_name}`", span.name);
    }
    let full_name = match container {
        Some(container) => format!("{container}:{new_name}"),
        None => new_name.to_string(),
    };

    let locations = if kind == MatchTypeId::LocalVar {
        let active = session.active_index().context("no active file")?;
        if active.local_variable(line, new_name).is_some() {
            bail!("local variable `${new_name}` already exists in this block");
        }
        let mut locations: Vec<Location> = session.definition(file, line, column).into_iter().collect();
        locations.extend(session.references(file, line, column));
        locations
    } else {
        if session.identifiers().get(&full_name, kind).is_some() {
            bail!("{} `{full_name}` already exists", kind.display_name());
        }
        let mut locations: Vec<Location> = session.identifiers().declaration(&span.name, kind).cloned().into_iter().collect();
        locations.extend(session.identifiers().references(&span.name, kind));
        locations
    };

    let edits = locations
        .iter()
        .filter_map(|loc| locate(session, loc, old_base, Anchor::Base))
        .map(|(loc, start, end)| RenameEdit {
            file: loc.file.clone(),
            line: loc.line,
            start,
            end,
            new_text: new_name.to_string(),
        })
        .collect();

    let plan = RenamePlan {
        kind: Some(kind),
        old_name: span.name.clone(),
        new_name: full_name,
        edits,
        moves: Vec::new(),
    }
    .finish();
    tracing::debug!(old = %plan.old_name, new = %plan.new_name, edits = plan.edits.len(), "planned rename");
    Ok(plan)
}

/// Plan moving `old` to `new`. Renaming an interface file renames the
/// interface and the `iface:` prefix of its components everywhere.
pub fn plan_file_rename(session: &IndexSession, old: &FileId, new: &FileId) -> Result<RenamePlan> {
    let kind = FileKind::from_file(old).with_context(|| format!("{old} is not an indexable file"))?;
    if FileKind::from_file(new) != Some(kind) {
        bail!("renaming {old} to {new} would change its file kind");
    }
    if session.document(old).is_none() && session.map_file(old).is_none() {
        bail!("{old} is not loaded");
    }
    if session.document(new).is_some() || session.map_file(new).is_some() {
        bail!("{new} already exists");
    }

    let mut plan = RenamePlan {
        kind: None,
        old_name: Arc::from(old.as_str()),
        new_name: new.to_string(),
        edits: Vec::new(),
        moves: vec![FileMove {
            from: old.clone(),
            to: new.clone(),
        }],
    };
    if kind != FileKind::Interface {
        return Ok(plan);
    }

    let (old_stem, new_stem) = (old.stem(), new.stem());
    validate_name(new_stem)?;
    let identifiers = session.identifiers();
    if identifiers.is_declared(new_stem, MatchTypeId::Interface) {
        bail!("interface `{new_stem}` already exists");
    }

    let mut locations: Vec<(Location, Anchor)> = identifiers
        .references(old_stem, MatchTypeId::Interface)
        .into_iter()
        .map(|loc| (loc, Anchor::Base))
        .collect();
    let prefix = format!("{old_stem}:");
    for component in identifiers
        .iter()
        .filter(|i| i.kind == MatchTypeId::Component && i.name.starts_with(&prefix))
    {
        locations.extend(component.reference_locations().into_iter().map(|loc| (loc, Anchor::Prefix)));
    }

    plan.kind = Some(MatchTypeId::Interface);
    plan.old_name = Arc::from(old_stem);
    plan.new_name = new_stem.to_string();
    plan.edits = locations
        .iter()
        .filter_map(|(loc, anchor)| locate(session, loc, old_stem, *anchor))
        .map(|(loc, start, end)| RenameEdit {
            file: loc.file.clone(),
            line: loc.line,
            start,
            end,
            new_text: new_stem.to_string(),
        })
        .collect();
    Ok(plan.finish())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    /// The name is the end of the word (`cert_bones`, `iface:com`) or the
    /// start of it when a suffix follows.
    Base,
    /// The name is the `iface` part of `iface:com`.
    Prefix,
}

// Char range of `name` inside the token at `loc`. Map files hold numeric
// ids and are never edited.
fn locate<'a>(session: &IndexSession, loc: &'a Location, name: &str, anchor: Anchor) -> Option<(&'a Location, u32, u32)> {
    if FileKind::from_file(&loc.file) == Some(FileKind::Map) {
        return None;
    }
    let word = session.document(&loc.file)?.line(loc.line)?.token_at(loc.column)?;
    let value = word.value.as_ref();
    let len = name.chars().count() as u32;
    let start = match anchor {
        Anchor::Prefix if value.strip_prefix(name).is_some_and(|rest| rest.starts_with(':')) => word.start,
        Anchor::Base if value.ends_with(name) => word.end - len,
        Anchor::Base if value.starts_with(name) => word.start,
        _ => {
            tracing::warn!(file = %loc.file, line = loc.line, word = value, name, "reference does not contain the name");
            return None;
        }
    };
    Some((loc, start, start + len))
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || !name.chars().all(is_word_char) {
        bail!("`{name}` is not a valid name");
    }
    Ok(())
}

// Same directory and extension as `file`, new stem.
fn sibling(file: &FileId, stem: &str) -> FileId {
    let dir = file.as_str().rsplit_once('/').map(|(dir, _)| dir);
    let name = match file.extension() {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem.to_string(),
    };
    match dir {
        Some(dir) => FileId::new(format!("{dir}/{name}")),
        None => FileId::new(name),
    }
}
