//! `.jm2` map grid files.
//!
//! ```text
//! ==== MAP ====
//! 0 12 40: h1 o3
//! ==== LOC ====
//! 0 12 40: 1530 10 0
//! ==== NPC ====
//! 0 20 20: 3
//! ==== OBJ ====
//! 0 5 5: 995 100
//! ```
//!
//! Parsing never fails. Every malformed line becomes a [`ParseDiagnostic`]
//! and the rest of the file is still read.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::matching::MatchTypeId;
use crate::text::{ParseDiagnostic, TextRange, split_lines};

static SECTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^====\s*(\w+)\s*====\s*$").expect("valid section regex"));
static ENTRY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\S+)\s+(\S+)\s+(\S+)\s*:(.*)$").expect("valid entry regex"));

const MAX_LEVEL: u32 = 3;
const MAX_TILE: u32 = 63;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapSection {
    Map,
    Loc,
    Npc,
    Obj,
}

impl MapSection {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "MAP" => Some(MapSection::Map),
            "LOC" => Some(MapSection::Loc),
            "NPC" => Some(MapSection::Npc),
            "OBJ" => Some(MapSection::Obj),
            _ => None,
        }
    }

    /// Entity named by the first value of an entry, if any.
    pub fn entity_kind(self) -> Option<MatchTypeId> {
        match self {
            MapSection::Map => None,
            MapSection::Loc => Some(MatchTypeId::Loc),
            MapSection::Npc => Some(MatchTypeId::Npc),
            MapSection::Obj => Some(MatchTypeId::Obj),
        }
    }

    // Fixed value count of entity entries: loc `id shape angle`, npc `id`, obj `id count`.
    fn value_count(self) -> Option<usize> {
        match self {
            MapSection::Map => None,
            MapSection::Loc => Some(3),
            MapSection::Npc => Some(1),
            MapSection::Obj => Some(2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapValue {
    pub text: String,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapEntry {
    pub section: MapSection,
    pub line: u32,
    pub level: u32,
    pub x: u32,
    pub z: u32,
    pub values: Vec<MapValue>,
}

impl MapEntry {
    /// Numeric entity id of a LOC, NPC or OBJ entry.
    pub fn entity(&self) -> Option<(MatchTypeId, u32, &MapValue)> {
        let kind = self.section.entity_kind()?;
        let first = self.values.first()?;
        Some((kind, first.text.parse().ok()?, first))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapFile {
    pub entries: Vec<MapEntry>,
    pub diagnostics: Vec<ParseDiagnostic>,
}

impl MapFile {
    pub fn parse(text: &str) -> Self {
        let mut out = MapFile::default();
        let mut section: Option<MapSection> = None;

        for (n, line) in split_lines(text).enumerate() {
            let n = n as u32;
            if line.trim().is_empty() {
                continue;
            }
            if let Some(caps) = SECTION_RE.captures(line) {
                let name = &caps[1];
                section = MapSection::from_name(name);
                if section.is_none() {
                    out.diagnostics
                        .push(ParseDiagnostic::new(n, format!("unknown section `{name}`"), whole_line(line)));
                }
                continue;
            }
            let Some(current) = section else {
                out.diagnostics
                    .push(ParseDiagnostic::new(n, "entry outside of a section", whole_line(line)));
                continue;
            };
            if let Some(entry) = parse_entry(current, n, line, &mut out.diagnostics) {
                out.entries.push(entry);
            }
        }
        tracing::debug!(
            entries = out.entries.len(),
            diagnostics = out.diagnostics.len(),
            "parsed map file"
        );
        out
    }

    /// LOC, NPC and OBJ entries with a numeric id.
    pub fn entity_references(&self) -> impl Iterator<Item = (MatchTypeId, u32, u32, TextRange)> + '_ {
        self.entries
            .iter()
            .filter_map(|e| e.entity().map(|(kind, id, value)| (kind, id, e.line, value.range)))
    }
}

fn parse_entry(section: MapSection, n: u32, line: &str, diagnostics: &mut Vec<ParseDiagnostic>) -> Option<MapEntry> {
    let Some(caps) = ENTRY_RE.captures(line) else {
        diagnostics.push(ParseDiagnostic::new(
            n,
            "expected `level x z: data`",
            whole_line(line),
        ));
        return None;
    };

    let mut coords = [0u32; 3];
    for (i, (label, max)) in [("level", MAX_LEVEL), ("x", MAX_TILE), ("z", MAX_TILE)].into_iter().enumerate() {
        let m = caps.get(i + 1)?;
        match m.as_str().parse::<u32>() {
            Ok(v) if v <= max => coords[i] = v,
            Ok(v) => {
                diagnostics.push(ParseDiagnostic::new(
                    n,
                    format!("{label} {v} out of range 0..={max}"),
                    char_range(line, m.start(), m.end()),
                ));
                return None;
            }
            Err(_) => {
                diagnostics.push(ParseDiagnostic::new(
                    n,
                    format!("invalid {label} `{}`", m.as_str()),
                    char_range(line, m.start(), m.end()),
                ));
                return None;
            }
        }
    }

    let data = caps.get(4)?;
    let values = split_values(line, data.start(), data.as_str());
    if values.is_empty() {
        diagnostics.push(ParseDiagnostic::new(n, "entry has no data", whole_line(line)));
        return None;
    }
    if let Some(expected) = section.value_count() {
        if let Some(bad) = values.iter().find(|v| v.text.parse::<u32>().is_err()) {
            diagnostics.push(ParseDiagnostic::new(
                n,
                format!("expected a number, found `{}`", bad.text),
                bad.range,
            ));
            return None;
        }
        if values.len() != expected {
            diagnostics.push(ParseDiagnostic::new(
                n,
                format!("expected {expected} values, found {}", values.len()),
                char_range(line, data.start(), data.end()),
            ));
            return None;
        }
    }

    Some(MapEntry {
        section,
        line: n,
        level: coords[0],
        x: coords[1],
        z: coords[2],
        values,
    })
}

fn split_values(line: &str, offset: usize, data: &str) -> Vec<MapValue> {
    let mut values = Vec::new();
    let mut start: Option<usize> = None;
    for (i, c) in data.char_indices().chain(std::iter::once((data.len(), ' '))) {
        match (c.is_whitespace(), start) {
            (false, None) => start = Some(i),
            (true, Some(s)) => {
                values.push(MapValue {
                    text: data[s..i].to_string(),
                    range: char_range(line, offset + s, offset + i),
                });
                start = None;
            }
            _ => {}
        }
    }
    values
}

fn char_range(line: &str, start_byte: usize, end_byte: usize) -> TextRange {
    let start = line[..start_byte].chars().count() as u32;
    let end = start + line[start_byte..end_byte].chars().count() as u32;
    TextRange::new(start, end)
}

fn whole_line(line: &str) -> TextRange {
    TextRange::new(0, line.chars().count() as u32)
}
