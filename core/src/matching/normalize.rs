//! Surface-form rewriting applied before a name is used as an index key.

use std::sync::Arc;

use crate::file_kind::FileKind;
use crate::matching::context::{Classification, MatchContext, MatchEnv};
use crate::matching::MatchTypeId;

pub const CERT_PREFIX: &str = "cert_";
pub const CATEGORY_PREFIX: &str = "_";

/// Loc model shape suffixes.
const SHAPE_SUFFIXES: &[&str] = &[
    "_1", "_2", "_3", "_4", "_5", "_6", "_7", "_8", "_9", "_0", "_q", "_w", "_e", "_r", "_t", "_a", "_s", "_d", "_f",
    "_g", "_h", "_z", "_x", "_c", "_v",
];

/// `table:column` / `iface:com` style names.
pub fn qualify(container: &str, name: &str) -> String {
    if name.contains(':') {
        name.to_string()
    } else {
        format!("{container}:{name}")
    }
}

/// Part after the `:` of a qualified name.
pub fn local_part(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

/// `cert_coins` → `coins`.
pub fn strip_cert(word: &str) -> Option<&str> {
    word.strip_prefix(CERT_PREFIX).filter(|base| !base.is_empty())
}

/// `model_1234_q` → (`model_1234`, `_q`).
pub fn split_shape_suffix(word: &str) -> Option<(&str, &str)> {
    SHAPE_SUFFIXES.iter().find_map(|suffix| {
        let base = word.strip_suffix(suffix)?;
        (!base.is_empty() && !base.ends_with('_')).then_some((base, *suffix))
    })
}

/// `_fishing_spot` → `fishing_spot`.
pub fn strip_category(word: &str) -> Option<&str> {
    word.strip_prefix(CATEGORY_PREFIX).filter(|base| !base.is_empty())
}

/// Apply the per-kind rewriting to a fresh classification.
pub fn normalize(mut c: Classification, ctx: &MatchContext<'_>, env: &MatchEnv<'_>) -> Classification {
    if c.name.is_some() {
        return c;
    }
    let word = ctx.value();
    match c.match_type {
        MatchTypeId::Component if !word.contains(':') && ctx.kind.header_type() == Some(MatchTypeId::Component) => {
            c.name = Some(Arc::from(qualify(ctx.file.stem(), word)));
        }
        MatchTypeId::Obj if !c.declaration && !env.identifiers.is_declared(word, MatchTypeId::Obj) => {
            if let Some(base) = strip_cert(word) {
                c.name = Some(Arc::from(base));
                c.prefix = Some(Arc::from(CERT_PREFIX));
            }
        }
        // Loc models always carry their shape; the split looks at the word only.
        MatchTypeId::Model if ctx.kind == FileKind::Loc => {
            if let Some((base, suffix)) = split_shape_suffix(word) {
                c.name = Some(Arc::from(base));
                c.suffix = Some(Arc::from(suffix));
            }
        }
        MatchTypeId::Category => {
            if let Some(base) = strip_category(word) {
                c.name = Some(Arc::from(base));
                c.prefix = Some(Arc::from(CATEGORY_PREFIX));
            }
        }
        _ => {}
    }
    c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualify() {
        assert_eq!(qualify("shop", "com_1"), "shop:com_1");
        assert_eq!(qualify("shop", "bank:com_1"), "bank:com_1");
        assert_eq!(local_part("shop:com_1"), "com_1");
        assert_eq!(local_part("plain"), "plain");
    }

    #[test]
    fn test_cert_prefix() {
        assert_eq!(strip_cert("cert_coins"), Some("coins"));
        assert_eq!(strip_cert("cert_"), None);
        assert_eq!(strip_cert("coins"), None);
    }

    #[test]
    fn test_shape_suffix() {
        assert_eq!(split_shape_suffix("model_1234_q"), Some(("model_1234", "_q")));
        assert_eq!(split_shape_suffix("wall_8"), Some(("wall", "_8")));
        assert_eq!(split_shape_suffix("tree"), None);
        assert_eq!(split_shape_suffix("_q"), None);
        assert_eq!(split_shape_suffix("a__q"), None);
    }

    #[test]
    fn test_category() {
        assert_eq!(strip_category("_fishing_spot"), Some("fishing_spot"));
        assert_eq!(strip_category("_"), None);
    }
}
