//! Static registry of entity classifications.
//!
//! Every classification a matcher can produce has exactly one descriptor in
//! [`MATCH_TYPES`], indexed by its [`MatchTypeId`] discriminant.

use std::fmt;

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::file_kind::FileKind;
use crate::util::FastHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum MatchTypeId {
    LocalVar,
    GlobalVar,
    Constant,
    Label,
    Proc,
    Timer,
    Softtimer,
    Queue,
    WalkTrigger,
    Command,
    Seq,
    Spotanim,
    Hunt,
    Loc,
    Npc,
    Obj,
    Inv,
    Enum,
    Struct,
    Param,
    Dbtable,
    Dbrow,
    Dbcolumn,
    Interface,
    Component,
    Synth,
    Idk,
    Mesanim,
    Category,
    Model,
    Floor,
    Stat,
    NpcStat,
    NpcMode,
    Locshape,
    Fontmetrics,
    // Noop kinds: matched to stop the search, never indexed.
    Coordinates,
    Number,
    Keyword,
    Type,
    ConfigKey,
    Trigger,
    // Sentinels.
    Unknown,
    Skip,
}

/// Sections a hover provider renders for a classified token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverItem {
    Title,
    Info,
    Signature,
    Value,
}

/// What the identifier index extracts from a declaration's surrounding text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationInfo {
    None,
    /// `[trigger,name](type $a, ...)(ret, ...)` header.
    Signature,
    /// `type=<keyword>` line inside the declaring block.
    ValueType,
    /// `inputtype=` / `outputtype=` lines of an enum block.
    EnumTypes,
    /// Right-hand side of `^name = value`.
    ConstantValue,
    /// Value types listed after the column name in `column=name,type,...`.
    ColumnTypes,
}

#[derive(Debug, Clone, Copy)]
pub struct MatchType {
    pub id: MatchTypeId,
    /// Lexical type keywords (`obj`, `namedobj`, ...) that denote this kind.
    pub types: &'static [&'static str],
    /// File kinds where a declaration of this kind may appear.
    pub file_kinds: &'static [FileKind],
    /// Indexed in the identifier index.
    pub cache: bool,
    pub allow_rename: bool,
    pub callable: bool,
    /// Never declared in project sources; references alone are valid.
    pub reference_only: bool,
    pub noop: bool,
    pub hover: &'static [HoverItem],
    pub declaration_info: DeclarationInfo,
}

const BASIC_HOVER: &[HoverItem] = &[HoverItem::Title, HoverItem::Info];
const CALL_HOVER: &[HoverItem] = &[HoverItem::Title, HoverItem::Info, HoverItem::Signature];
const VALUE_HOVER: &[HoverItem] = &[HoverItem::Title, HoverItem::Info, HoverItem::Value];

impl MatchType {
    const fn entity(id: MatchTypeId, types: &'static [&'static str], file_kinds: &'static [FileKind]) -> Self {
        Self {
            id,
            types,
            file_kinds,
            cache: true,
            allow_rename: true,
            callable: false,
            reference_only: false,
            noop: false,
            hover: BASIC_HOVER,
            declaration_info: DeclarationInfo::None,
        }
    }

    const fn noop(id: MatchTypeId) -> Self {
        Self {
            cache: false,
            allow_rename: false,
            noop: true,
            hover: &[],
            ..Self::entity(id, &[], &[])
        }
    }

    const fn callable(self) -> Self {
        Self {
            callable: true,
            hover: CALL_HOVER,
            declaration_info: DeclarationInfo::Signature,
            ..self
        }
    }

    const fn builtin(self) -> Self {
        Self {
            reference_only: true,
            allow_rename: false,
            ..self
        }
    }

    const fn uncached(self) -> Self {
        Self { cache: false, ..self }
    }

    const fn info(self, declaration_info: DeclarationInfo) -> Self {
        let hover = match declaration_info {
            DeclarationInfo::None => self.hover,
            DeclarationInfo::Signature => CALL_HOVER,
            _ => VALUE_HOVER,
        };
        Self {
            declaration_info,
            hover,
            ..self
        }
    }
}

use FileKind as F;
use MatchTypeId as M;

pub static MATCH_TYPES: [MatchType; 44] = [
    MatchType::entity(M::LocalVar, &[], &[F::Rs2]).uncached(),
    MatchType::entity(M::GlobalVar, &["varp"], &[F::Varp, F::Varn, F::Vars]).info(DeclarationInfo::ValueType),
    MatchType::entity(M::Constant, &[], &[F::Constant]).info(DeclarationInfo::ConstantValue),
    MatchType::entity(M::Label, &["label"], &[F::Rs2]).callable(),
    MatchType::entity(M::Proc, &["proc"], &[F::Rs2]).callable(),
    MatchType::entity(M::Timer, &["timer"], &[F::Rs2]),
    MatchType::entity(M::Softtimer, &["softtimer"], &[F::Rs2]),
    MatchType::entity(M::Queue, &["queue"], &[F::Rs2]).info(DeclarationInfo::Signature),
    MatchType::entity(M::WalkTrigger, &["walktrigger"], &[F::Rs2]),
    MatchType {
        allow_rename: false,
        ..MatchType::entity(M::Command, &[], &[F::Rs2]).callable()
    },
    MatchType::entity(M::Seq, &["seq"], &[F::Seq]),
    MatchType::entity(M::Spotanim, &["spotanim"], &[F::Spotanim]),
    MatchType::entity(M::Hunt, &["hunt"], &[F::Hunt]),
    MatchType::entity(M::Loc, &["loc"], &[F::Loc]),
    MatchType::entity(M::Npc, &["npc"], &[F::Npc]),
    MatchType::entity(M::Obj, &["obj", "namedobj"], &[F::Obj]),
    MatchType::entity(M::Inv, &["inv"], &[F::Inv]),
    MatchType::entity(M::Enum, &["enum"], &[F::Enum]).info(DeclarationInfo::EnumTypes),
    MatchType::entity(M::Struct, &["struct"], &[F::Struct]),
    MatchType::entity(M::Param, &["param"], &[F::Param]).info(DeclarationInfo::ValueType),
    MatchType::entity(M::Dbtable, &["dbtable"], &[F::Dbtable]),
    MatchType::entity(M::Dbrow, &["dbrow"], &[F::Dbrow]),
    MatchType::entity(M::Dbcolumn, &["dbcolumn"], &[F::Dbtable]).info(DeclarationInfo::ColumnTypes),
    MatchType::entity(M::Interface, &["interface"], &[F::Interface]),
    MatchType::entity(M::Component, &["component"], &[F::Interface]),
    MatchType::entity(M::Synth, &["synth"], &[]).builtin(),
    MatchType::entity(M::Idk, &["idk"], &[F::Idk]),
    MatchType::entity(M::Mesanim, &["mesanim"], &[F::Mesanim]),
    MatchType {
        allow_rename: true,
        ..MatchType::entity(M::Category, &["category"], &[]).builtin()
    },
    MatchType::entity(M::Model, &["model"], &[]).builtin(),
    MatchType::entity(M::Floor, &["flo"], &[F::Floor]),
    MatchType::entity(M::Stat, &["stat"], &[]).builtin(),
    MatchType::entity(M::NpcStat, &["npc_stat"], &[]).builtin(),
    MatchType::entity(M::NpcMode, &["npc_mode"], &[]).builtin(),
    MatchType::entity(M::Locshape, &["locshape"], &[]).builtin(),
    MatchType::entity(M::Fontmetrics, &["fontmetrics"], &[]).builtin(),
    MatchType::noop(M::Coordinates),
    MatchType::noop(M::Number),
    MatchType::noop(M::Keyword),
    MatchType::noop(M::Type),
    MatchType::noop(M::ConfigKey),
    MatchType::noop(M::Trigger),
    MatchType::noop(M::Unknown),
    MatchType::noop(M::Skip),
];

static TYPE_KEYWORDS: Lazy<FastHashMap<&'static str, MatchTypeId>> = Lazy::new(|| {
    let mut map = FastHashMap::default();
    for descriptor in MATCH_TYPES.iter() {
        for keyword in descriptor.types {
            map.insert(*keyword, descriptor.id);
        }
    }
    // Coordinates are a literal, not an indexed entity.
    map.insert("coord", MatchTypeId::Coordinates);
    map
});

/// Scalar type keywords that have no entity classification.
const SCALAR_TYPES: &[&str] = &["int", "string", "boolean", "char", "long"];

impl MatchTypeId {
    pub fn descriptor(self) -> &'static MatchType {
        &MATCH_TYPES[self as usize]
    }

    /// Entity denoted by a lexical type keyword (`namedobj` → Obj).
    pub fn from_type_keyword(keyword: &str) -> Option<Self> {
        TYPE_KEYWORDS.get(keyword).copied()
    }

    /// Whether `word` names any value type, entity or scalar.
    pub fn is_type_keyword(word: &str) -> bool {
        TYPE_KEYWORDS.contains_key(word) || SCALAR_TYPES.contains(&word)
    }

    pub fn is_sentinel(self) -> bool {
        matches!(self, MatchTypeId::Unknown | MatchTypeId::Skip)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            M::LocalVar => "LOCAL_VAR",
            M::GlobalVar => "GLOBAL_VAR",
            M::Constant => "CONSTANT",
            M::Label => "LABEL",
            M::Proc => "PROC",
            M::Timer => "TIMER",
            M::Softtimer => "SOFTTIMER",
            M::Queue => "QUEUE",
            M::WalkTrigger => "WALKTRIGGER",
            M::Command => "COMMAND",
            M::Seq => "SEQ",
            M::Spotanim => "SPOTANIM",
            M::Hunt => "HUNT",
            M::Loc => "LOC",
            M::Npc => "NPC",
            M::Obj => "OBJ",
            M::Inv => "INV",
            M::Enum => "ENUM",
            M::Struct => "STRUCT",
            M::Param => "PARAM",
            M::Dbtable => "DBTABLE",
            M::Dbrow => "DBROW",
            M::Dbcolumn => "DBCOLUMN",
            M::Interface => "INTERFACE",
            M::Component => "COMPONENT",
            M::Synth => "SYNTH",
            M::Idk => "IDK",
            M::Mesanim => "MESANIM",
            M::Category => "CATEGORY",
            M::Model => "MODEL",
            M::Floor => "FLOOR",
            M::Stat => "STAT",
            M::NpcStat => "NPC_STAT",
            M::NpcMode => "NPC_MODE",
            M::Locshape => "LOCSHAPE",
            M::Fontmetrics => "FONTMETRICS",
            M::Coordinates => "COORDINATES",
            M::Number => "NUMBER",
            M::Keyword => "KEYWORD",
            M::Type => "TYPE",
            M::ConfigKey => "CONFIG_KEY",
            M::Trigger => "TRIGGER",
            M::Unknown => "UNKNOWN",
            M::Skip => "SKIP",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let upper = name.to_ascii_uppercase();
        MATCH_TYPES.iter().map(|d| d.id).find(|id| id.as_str() == upper)
    }

    /// Lower-case display name used in messages (`unknown obj: foo`).
    pub fn display_name(self) -> String {
        self.as_str().to_ascii_lowercase()
    }
}

impl fmt::Display for MatchTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
