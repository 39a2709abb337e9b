//! What the values after `key=` denote, per config file kind.

use crate::file_kind::FileKind;
use crate::matching::MatchTypeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueRule {
    /// Reference to an entity of this kind.
    Ref(MatchTypeId),
    /// Free text or a literal.
    Text,
    /// A type keyword, remembered for the enclosing block.
    TypeKeyword,
    /// Typed by the block value stored under this key (`type=`,
    /// `outputtype=`).
    TypedBy(&'static str),
    /// Param name; the next value is typed by that param.
    ParamName,
    ParamValue,
    /// dbtable `column=<name>,<type>,...`.
    ColumnName,
    /// dbrow `data=<column>,<value>,...`.
    ColumnRef,
    ColumnValue,
}

/// Rules for consecutive values; the last one repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyRule {
    pub values: &'static [ValueRule],
    /// Store the first value as a block value under the key.
    pub remember: bool,
}

impl KeyRule {
    const fn of(values: &'static [ValueRule]) -> Self {
        Self {
            values,
            remember: false,
        }
    }

    const fn remembered(values: &'static [ValueRule]) -> Self {
        Self { values, remember: true }
    }

    pub fn value(&self, index: u32) -> Option<ValueRule> {
        let last = self.values.len().checked_sub(1)?;
        Some(self.values[(index as usize).min(last)])
    }
}

use MatchTypeId as M;
use ValueRule as V;

const TEXT: KeyRule = KeyRule::of(&[V::Text]);
const MODEL: KeyRule = KeyRule::of(&[V::Ref(M::Model)]);
const SEQ: KeyRule = KeyRule::of(&[V::Ref(M::Seq)]);
const OBJ: KeyRule = KeyRule::of(&[V::Ref(M::Obj)]);
const PARAM: KeyRule = KeyRule::of(&[V::ParamName, V::ParamValue]);
const CATEGORY: KeyRule = KeyRule::of(&[V::Ref(M::Category)]);
const TYPE: KeyRule = KeyRule::remembered(&[V::TypeKeyword]);

/// Rule for `key` in a file of `kind`. Keys with a numeric suffix
/// (`model2`, `op3`) fall back to their base key.
pub fn rule_for(kind: FileKind, key: &str) -> Option<KeyRule> {
    exact_rule(kind, key).or_else(|| {
        let base = key.trim_end_matches(|c: char| c.is_ascii_digit());
        (base.len() != key.len() && !base.is_empty())
            .then(|| exact_rule(kind, base))
            .flatten()
    })
}

fn exact_rule(kind: FileKind, key: &str) -> Option<KeyRule> {
    let common = match key {
        "name" | "desc" | "op" | "iop" => Some(TEXT),
        "param" => Some(PARAM),
        "category" => Some(CATEGORY),
        _ => None,
    };
    if common.is_some() {
        return common;
    }
    Some(match (kind, key) {
        (FileKind::Obj, "model" | "manwear" | "womanwear" | "manhead" | "womanhead" | "manwear2" | "womanwear2") => {
            MODEL
        }
        (FileKind::Obj, "certlink" | "certtemplate" | "countobj" | "placeholderlink" | "placeholdertemplate") => OBJ,
        (FileKind::Npc, "model" | "head") => MODEL,
        (FileKind::Npc, "readyanim" | "walkanim" | "turnleftanim" | "turnrightanim" | "walkanims") => SEQ,
        (FileKind::Npc, "huntmode") => KeyRule::of(&[V::Ref(M::Hunt)]),
        (FileKind::Npc, "defaultmode") => KeyRule::of(&[V::Ref(M::NpcMode)]),
        (FileKind::Loc, "model") => KeyRule::of(&[V::Ref(M::Model), V::Ref(M::Locshape)]),
        (FileKind::Loc, "anim") => SEQ,
        (FileKind::Spotanim | FileKind::Idk, "model" | "head") => MODEL,
        (FileKind::Spotanim, "anim") => SEQ,
        (FileKind::Seq, "replacesmode" | "frame" | "iframe") => TEXT,
        (FileKind::Inv, "stock") => KeyRule::of(&[V::Ref(M::Obj), V::Text]),
        (FileKind::Mesanim, "len") => SEQ,
        (FileKind::Enum, "inputtype" | "outputtype") => TYPE,
        (FileKind::Enum, "val") => KeyRule::of(&[V::TypedBy("inputtype"), V::TypedBy("outputtype")]),
        (FileKind::Enum, "default") => KeyRule::of(&[V::TypedBy("outputtype")]),
        (FileKind::Param | FileKind::Varp | FileKind::Varn | FileKind::Vars, "type") => TYPE,
        (FileKind::Param, "default") => KeyRule::of(&[V::TypedBy("type")]),
        (FileKind::Dbtable, "column") => KeyRule::of(&[V::ColumnName, V::TypeKeyword]),
        (FileKind::Dbrow, "table") => KeyRule::remembered(&[V::Ref(M::Dbtable)]),
        (FileKind::Dbrow, "data") => KeyRule::of(&[V::ColumnRef, V::ColumnValue]),
        (FileKind::Interface, "layer") => KeyRule::of(&[V::Ref(M::Component)]),
        (FileKind::Interface, "model" | "activemodel") => MODEL,
        (FileKind::Interface, "anim" | "activeanim") => SEQ,
        (FileKind::Interface, "font") => KeyRule::of(&[V::Ref(M::Fontmetrics)]),
        (FileKind::Interface, "inv") => KeyRule::of(&[V::Ref(M::Inv)]),
        (FileKind::Hunt, "check_category") => CATEGORY,
        (FileKind::Hunt, "check_inv") => KeyRule::of(&[V::Ref(M::Inv), V::Ref(M::Obj), V::Text]),
        _ => return None,
    })
}
