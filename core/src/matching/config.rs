//! Matchers for declarative config files (`[name]` blocks of `key=value` lines).

use std::sync::Arc;

use crate::file_kind::{FileKind, pack_type};
use crate::index::DeclarationDetail;
use crate::lexer::ParsedWord;
use crate::matching::config_keys::{ValueRule, rule_for};
use crate::matching::context::{Classification, Extra, MatchContext, MatchEnv};
use crate::matching::normalize::qualify;
use crate::matching::script::typed_reference;
use crate::matching::MatchTypeId;
use crate::util::chars::is_number;

pub(crate) fn literal(ctx: &MatchContext<'_>, _env: &MatchEnv<'_>) -> Option<Classification> {
    if ctx.word.in_string {
        return Some(Classification::skip());
    }
    is_number(ctx.value()).then(|| Classification::reference(MatchTypeId::Number))
}

/// `^name = value` lines of `.constant` files.
pub(crate) fn constant_line(ctx: &MatchContext<'_>, _env: &MatchEnv<'_>) -> Option<Classification> {
    if ctx.kind != FileKind::Constant {
        return None;
    }
    if ctx.word.index == 0 && ctx.prev_char() == Some('^') {
        return Some(Classification::declaration(MatchTypeId::Constant));
    }
    Some(Classification::skip())
}

/// `[name]` declares the file's entity kind.
pub(crate) fn block_header(ctx: &MatchContext<'_>, _env: &MatchEnv<'_>) -> Option<Classification> {
    if !ctx.in_header_tag() {
        return None;
    }
    let Some(kind) = ctx.kind.header_type().filter(|_| ctx.word.index == 0) else {
        return Some(Classification::skip());
    };
    Some(
        Classification::declaration(kind).with_extra(Extra::BlockStart {
            trigger: None,
            name: ctx.word.value.clone(),
        }),
    )
}

/// The `key` of `key=value`.
pub(crate) fn config_key(ctx: &MatchContext<'_>, _env: &MatchEnv<'_>) -> Option<Classification> {
    (ctx.word.config_key.is_none() && ctx.next_non_space() == Some('='))
        .then(|| Classification::reference(MatchTypeId::ConfigKey))
}

/// Values after `key=`, classified by the key's rule.
pub(crate) fn config_value(ctx: &MatchContext<'_>, env: &MatchEnv<'_>) -> Option<Classification> {
    let key = ctx.word.config_key.as_deref()?;
    let index = ctx.word.param_index?;
    let rule = rule_for(ctx.kind, key)?;
    let line = ctx.line_number;
    let value = ctx.word.value.clone();

    let classification = match rule.value(index)? {
        ValueRule::Ref(kind) => Classification::reference(kind),
        ValueRule::Text => return Some(Classification::skip()),
        ValueRule::TypeKeyword => Classification::reference(MatchTypeId::Type),
        ValueRule::TypedBy(source) => {
            let type_keyword = env.active.block_value(line, source)?;
            typed_reference(type_keyword).unwrap_or_else(Classification::skip)
        }
        ValueRule::ParamName => Classification::reference(MatchTypeId::Param),
        ValueRule::ParamValue => {
            let param = first_value(ctx)?;
            match &env.identifiers.get(&param.value, MatchTypeId::Param)?.detail {
                DeclarationDetail::ValueType(t) => typed_reference(t).unwrap_or_else(Classification::skip),
                _ => return None,
            }
        }
        ValueRule::ColumnName => {
            let table = env.active.block_at(line)?.name.clone();
            Classification::declaration(MatchTypeId::Dbcolumn).named(qualify(&table, &value))
        }
        ValueRule::ColumnRef => {
            let table = env.active.block_value(line, "table")?;
            Classification::reference(MatchTypeId::Dbcolumn).named(qualify(table, &value))
        }
        ValueRule::ColumnValue => {
            let table = env.active.block_value(line, "table")?;
            let column = qualify(table, &first_value(ctx)?.value);
            match &env.identifiers.get(&column, MatchTypeId::Dbcolumn)?.detail {
                DeclarationDetail::ColumnTypes(types) => types
                    .get(index as usize - 1)
                    .and_then(|t| typed_reference(t))
                    .unwrap_or_else(Classification::skip),
                _ => return None,
            }
        }
    };
    Some(if rule.remember && index == 0 {
        classification.with_extra(Extra::BlockValue {
            key: Arc::from(key),
            value,
        })
    } else {
        classification
    })
}

/// `123=name` lines of `<type>.pack` files.
pub(crate) fn pack_line(ctx: &MatchContext<'_>, _env: &MatchEnv<'_>) -> Option<Classification> {
    if ctx.kind != FileKind::Pack || ctx.word.param_index != Some(0) {
        return None;
    }
    let id: u32 = ctx.word.config_key.as_deref()?.trim().parse().ok()?;
    let value = ctx.value();
    let kind = match pack_type(ctx.file.stem())? {
        MatchTypeId::Interface if value.contains(':') => MatchTypeId::Component,
        kind => kind,
    };
    let mut c = Classification::reference(kind);
    c.pack_id = Some(id);
    Some(c)
}

// The value at index 0 of the token's `key=` list.
fn first_value<'a>(ctx: &MatchContext<'a>) -> Option<&'a ParsedWord> {
    ctx.line
        .tokens
        .iter()
        .find(|t| t.config_key.is_some() && t.param_index == Some(0))
}
