use serde::Serialize;

use crate::matching::MatchTypeId;
use crate::text::FileId;

/// Grammar dialect of a source file, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Rs2,
    Obj,
    Npc,
    Loc,
    Seq,
    Spotanim,
    Idk,
    Varp,
    Varn,
    Vars,
    Param,
    Enum,
    Struct,
    Inv,
    Mesanim,
    Hunt,
    Dbtable,
    Dbrow,
    Interface,
    Floor,
    Constant,
    Pack,
    Map,
}

/// Which matcher registry classifies a file's tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineKind {
    Script,
    Config,
}

impl FileKind {
    pub const ALL: [FileKind; 23] = [
        FileKind::Rs2,
        FileKind::Obj,
        FileKind::Npc,
        FileKind::Loc,
        FileKind::Seq,
        FileKind::Spotanim,
        FileKind::Idk,
        FileKind::Varp,
        FileKind::Varn,
        FileKind::Vars,
        FileKind::Param,
        FileKind::Enum,
        FileKind::Struct,
        FileKind::Inv,
        FileKind::Mesanim,
        FileKind::Hunt,
        FileKind::Dbtable,
        FileKind::Dbrow,
        FileKind::Interface,
        FileKind::Floor,
        FileKind::Constant,
        FileKind::Pack,
        FileKind::Map,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            FileKind::Rs2 => "rs2",
            FileKind::Obj => "obj",
            FileKind::Npc => "npc",
            FileKind::Loc => "loc",
            FileKind::Seq => "seq",
            FileKind::Spotanim => "spotanim",
            FileKind::Idk => "idk",
            FileKind::Varp => "varp",
            FileKind::Varn => "varn",
            FileKind::Vars => "vars",
            FileKind::Param => "param",
            FileKind::Enum => "enum",
            FileKind::Struct => "struct",
            FileKind::Inv => "inv",
            FileKind::Mesanim => "mesanim",
            FileKind::Hunt => "hunt",
            FileKind::Dbtable => "dbtable",
            FileKind::Dbrow => "dbrow",
            FileKind::Interface => "if",
            FileKind::Floor => "flo",
            FileKind::Constant => "constant",
            FileKind::Pack => "pack",
            FileKind::Map => "jm2",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        Self::ALL.into_iter().find(|kind| kind.extension() == ext)
    }

    pub fn from_file(file: &FileId) -> Option<Self> {
        file.extension().and_then(Self::from_extension)
    }

    /// `None` for formats that are not lexed (map grids).
    pub fn engine(self) -> Option<EngineKind> {
        match self {
            FileKind::Rs2 => Some(EngineKind::Script),
            FileKind::Map => None,
            _ => Some(EngineKind::Config),
        }
    }

    pub fn is_config(self) -> bool {
        self.engine() == Some(EngineKind::Config)
    }

    /// Entity declared by a `[name]` block header in this kind of file.
    pub fn header_type(self) -> Option<MatchTypeId> {
        Some(match self {
            FileKind::Obj => MatchTypeId::Obj,
            FileKind::Npc => MatchTypeId::Npc,
            FileKind::Loc => MatchTypeId::Loc,
            FileKind::Seq => MatchTypeId::Seq,
            FileKind::Spotanim => MatchTypeId::Spotanim,
            FileKind::Idk => MatchTypeId::Idk,
            FileKind::Varp | FileKind::Varn | FileKind::Vars => MatchTypeId::GlobalVar,
            FileKind::Param => MatchTypeId::Param,
            FileKind::Enum => MatchTypeId::Enum,
            FileKind::Struct => MatchTypeId::Struct,
            FileKind::Inv => MatchTypeId::Inv,
            FileKind::Mesanim => MatchTypeId::Mesanim,
            FileKind::Hunt => MatchTypeId::Hunt,
            FileKind::Dbtable => MatchTypeId::Dbtable,
            FileKind::Dbrow => MatchTypeId::Dbrow,
            FileKind::Interface => MatchTypeId::Component,
            FileKind::Floor => MatchTypeId::Floor,
            FileKind::Rs2 | FileKind::Constant | FileKind::Pack | FileKind::Map => return None,
        })
    }
}

/// Entity named by the values of a `<stem>.pack` file (`obj.pack` → Obj).
pub fn pack_type(stem: &str) -> Option<MatchTypeId> {
    match stem {
        "interface" => Some(MatchTypeId::Interface),
        "category" => Some(MatchTypeId::Category),
        "synth" => Some(MatchTypeId::Synth),
        "model" => Some(MatchTypeId::Model),
        "varbit" => Some(MatchTypeId::GlobalVar),
        other => FileKind::from_extension(other)
            .filter(|k| *k != FileKind::Interface)
            .and_then(FileKind::header_type),
    }
}
