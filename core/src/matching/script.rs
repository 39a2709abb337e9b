//! Matchers for `.rs2` script files.

use std::sync::Arc;

use crate::index::DeclarationDetail;
use crate::lexer::Operator;
use crate::matching::context::{Classification, Extra, MatchContext, MatchEnv};
use crate::matching::MatchTypeId;
use crate::util::chars::is_number;

const KEYWORDS: &[&str] = &[
    "if", "else", "while", "return", "case", "default", "true", "false", "null", "calc",
];

const SIGILS: &[char] = &['$', '%', '^', '~', '@'];

/// Tokens inside string literals are text.
pub(crate) fn string_text(ctx: &MatchContext<'_>, _env: &MatchEnv<'_>) -> Option<Classification> {
    ctx.word.in_string.then(Classification::skip)
}

pub(crate) fn number(ctx: &MatchContext<'_>, _env: &MatchEnv<'_>) -> Option<Classification> {
    let value = ctx.value();
    if is_number(value) {
        return Some(Classification::reference(MatchTypeId::Number));
    }
    is_coordinate(value).then(|| Classification::reference(MatchTypeId::Coordinates))
}

/// `level_mx_mz_lx_lz`, e.g. `0_50_50_22_22`.
fn is_coordinate(value: &str) -> bool {
    let parts: Vec<&str> = value.split('_').collect();
    parts.len() == 5 && parts.iter().all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
}

pub(crate) fn keyword(ctx: &MatchContext<'_>, _env: &MatchEnv<'_>) -> Option<Classification> {
    if ctx.prev_char().is_some_and(|c| SIGILS.contains(&c)) || ctx.in_header_tag() {
        return None;
    }
    let value = ctx.value();
    if let Some(type_keyword) = value.strip_prefix("switch_") {
        return Some(
            Classification::reference(MatchTypeId::Keyword).with_extra(Extra::Switch {
                type_keyword: Arc::from(type_keyword),
            }),
        );
    }
    if value.starts_with("def_") {
        return Some(Classification::reference(MatchTypeId::Keyword));
    }
    if value == "default" && ctx.prev_word().is_some_and(|w| w.value.as_ref() == "case") {
        return Some(Classification::skip());
    }
    KEYWORDS
        .contains(&value)
        .then(|| Classification::reference(MatchTypeId::Keyword))
}

/// What the second part of a `[trigger,subject]` header denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectRule {
    Declares(MatchTypeId),
    References(MatchTypeId),
    Ignored,
}

pub fn trigger_subject(trigger: &str) -> SubjectRule {
    use MatchTypeId as M;
    use SubjectRule::*;
    match trigger {
        "proc" => Declares(M::Proc),
        "label" => Declares(M::Label),
        "timer" => Declares(M::Timer),
        "softtimer" => Declares(M::Softtimer),
        "queue" | "weakqueue" | "longqueue" | "strongqueue" => Declares(M::Queue),
        "walktrigger" => Declares(M::WalkTrigger),
        "command" => Declares(M::Command),
        "if_button" | "inv_button1" | "inv_button2" | "inv_button3" | "inv_button4" | "inv_button5" | "inv_buttond" => {
            References(M::Component)
        }
        "if_close" => References(M::Interface),
        t if t.starts_with("opnpc") || t.starts_with("apnpc") || t.starts_with("ai_") => References(M::Npc),
        t if t.starts_with("opobj") || t.starts_with("apobj") || t.starts_with("opheld") => References(M::Obj),
        t if t.starts_with("oploc") || t.starts_with("aploc") => References(M::Loc),
        _ => Ignored,
    }
}

/// `[trigger,subject]` header tags.
pub(crate) fn trigger_header(ctx: &MatchContext<'_>, _env: &MatchEnv<'_>) -> Option<Classification> {
    if !ctx.in_header_tag() {
        return None;
    }
    match ctx.word.index {
        0 => {
            let name = ctx.next_word().map(|w| w.value.clone()).unwrap_or_else(|| Arc::from(""));
            Some(
                Classification::reference(MatchTypeId::Trigger).with_extra(Extra::BlockStart {
                    trigger: Some(ctx.word.value.clone()),
                    name,
                }),
            )
        }
        1 => {
            let value = ctx.value();
            if value == "_" {
                return Some(Classification::skip());
            }
            let trigger = ctx.prev_word().map(|w| w.value.as_ref()).unwrap_or_default();
            match trigger_subject(trigger) {
                SubjectRule::Declares(kind) => Some(Classification::declaration(kind)),
                SubjectRule::References(_) if value.starts_with('_') => {
                    Some(Classification::reference(MatchTypeId::Category))
                }
                SubjectRule::References(kind) => Some(Classification::reference(kind)),
                SubjectRule::Ignored => Some(Classification::skip()),
            }
        }
        _ => Some(Classification::skip()),
    }
}

/// `(type $name, ...)` parameters and `(type, ...)` return types after a header.
pub(crate) fn header_signature(ctx: &MatchContext<'_>, _env: &MatchEnv<'_>) -> Option<Classification> {
    match ctx.header_group()? {
        0 if ctx.prev_char() == Some('$') => {
            let type_keyword = ctx.prev_word().map(|w| w.value.clone()).unwrap_or_else(|| Arc::from("int"));
            Some(
                Classification::declaration(MatchTypeId::LocalVar).with_extra(Extra::LocalVar {
                    type_keyword,
                    parameter: true,
                }),
            )
        }
        0 => Some(Classification::reference(MatchTypeId::Type)),
        _ => Some(
            Classification::reference(MatchTypeId::Type).with_extra(Extra::ReturnType {
                type_keyword: ctx.word.value.clone(),
            }),
        ),
    }
}

/// `$name`, declared by a preceding `def_<type>`.
pub(crate) fn local_variable(ctx: &MatchContext<'_>, _env: &MatchEnv<'_>) -> Option<Classification> {
    if ctx.prev_char() != Some('$') {
        return None;
    }
    let def_type = ctx
        .prev_word()
        .and_then(|w| w.value.strip_prefix("def_").map(Arc::<str>::from));
    Some(match def_type {
        Some(type_keyword) => Classification::declaration(MatchTypeId::LocalVar).with_extra(Extra::LocalVar {
            type_keyword,
            parameter: false,
        }),
        None => Classification::reference(MatchTypeId::LocalVar),
    })
}

/// `%var`, `^constant`, `~proc` and `@label`.
pub(crate) fn sigil_reference(ctx: &MatchContext<'_>, _env: &MatchEnv<'_>) -> Option<Classification> {
    let kind = match ctx.prev_char()? {
        '%' => MatchTypeId::GlobalVar,
        '^' => MatchTypeId::Constant,
        '~' => MatchTypeId::Proc,
        '@' => MatchTypeId::Label,
        _ => return None,
    };
    Some(Classification::reference(kind))
}

/// Labels of `case` lines take the type of the enclosing switch.
pub(crate) fn switch_case(ctx: &MatchContext<'_>, env: &MatchEnv<'_>) -> Option<Classification> {
    let case = ctx.first_word()?;
    if ctx.word.index == 0 || case.value.as_ref() != "case" {
        return None;
    }
    let colon = (case.end..ctx.chars.len() as u32)
        .find(|&i| ctx.chars[i as usize] == ':' && ctx.line.token_at(i).is_none());
    if colon.is_some_and(|c| ctx.word.start > c) {
        return None;
    }
    let type_keyword = env.active.switch_type(ctx.line_number, ctx.word.brace_depth)?;
    typed_reference(type_keyword)
}

/// Arguments of a call whose callee has a known signature.
pub(crate) fn call_argument(ctx: &MatchContext<'_>, env: &MatchEnv<'_>) -> Option<Classification> {
    let word = ctx.word;
    if opens_call(ctx) {
        return None;
    }
    let call_name = word.call_name.as_deref()?;
    let param_index = word.param_index?;
    if call_name == "return" {
        let block = env.active.block_at(ctx.line_number)?;
        let type_keyword = block.returns.get(param_index as usize)?;
        return typed_reference(type_keyword);
    }
    let target = env
        .active
        .resolve_call_target(ctx.line_number, word.call_name_index?, call_name)?;
    if !target.kind.descriptor().callable && target.kind != MatchTypeId::Queue {
        return None;
    }
    let signature = env.identifiers.get(&target.name, target.kind)?.signature()?;
    typed_reference(signature.param_type(param_index)?)
}

/// Right-hand side of `$var = x` or `%var = x` (and comparisons), typed by
/// the variable on the left.
pub(crate) fn typed_assignment(ctx: &MatchContext<'_>, env: &MatchEnv<'_>) -> Option<Classification> {
    let word = ctx.word;
    if opens_call(ctx) {
        return None;
    }
    let op = ctx.line.operators.iter().rev().find(|op| op.index == word.index)?;
    if op.token == Operator::Not || op.token == Operator::And || op.token == Operator::Or {
        return None;
    }
    let left = ctx.prev_word()?;
    let left_sigil = (left.start as usize)
        .checked_sub(1)
        .and_then(|i| ctx.chars.get(i).copied());
    let type_keyword: Arc<str> = match left_sigil? {
        '$' => env
            .active
            .local_variable(ctx.line_number, &left.value)?
            .type_keyword
            .clone(),
        '%' => match &env.identifiers.get(&left.value, MatchTypeId::GlobalVar)?.detail {
            DeclarationDetail::ValueType(t) => t.clone(),
            _ => return None,
        },
        _ => return None,
    };
    typed_reference(&type_keyword)
}

/// Names declared with `[command,name]`.
pub(crate) fn command(ctx: &MatchContext<'_>, env: &MatchEnv<'_>) -> Option<Classification> {
    if ctx.prev_char().is_some_and(|c| SIGILS.contains(&c)) {
        return None;
    }
    env.identifiers
        .is_declared(ctx.value(), MatchTypeId::Command)
        .then(|| Classification::reference(MatchTypeId::Command))
}

// A word directly followed by `(` is a callee, never a typed value.
fn opens_call(ctx: &MatchContext<'_>) -> bool {
    ctx.next_non_space() == Some('(')
}

/// Reference of the entity kind a type keyword denotes. Scalar types
/// classify nothing.
pub(crate) fn typed_reference(type_keyword: &str) -> Option<Classification> {
    match MatchTypeId::from_type_keyword(type_keyword)? {
        MatchTypeId::Coordinates => None,
        kind => Some(Classification::reference(kind)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates() {
        assert!(is_coordinate("0_50_50_22_22"));
        assert!(!is_coordinate("0_50_50_22"));
        assert!(!is_coordinate("a_50_50_22_22"));
    }

    #[test]
    fn test_trigger_subjects() {
        assert_eq!(trigger_subject("proc"), SubjectRule::Declares(MatchTypeId::Proc));
        assert_eq!(trigger_subject("opnpc1"), SubjectRule::References(MatchTypeId::Npc));
        assert_eq!(trigger_subject("opheld3"), SubjectRule::References(MatchTypeId::Obj));
        assert_eq!(trigger_subject("ai_queue2"), SubjectRule::References(MatchTypeId::Npc));
        assert_eq!(trigger_subject("login"), SubjectRule::Ignored);
    }

    #[test]
    fn test_typed_reference() {
        assert_eq!(typed_reference("namedobj").map(|c| c.match_type), Some(MatchTypeId::Obj));
        assert_eq!(typed_reference("int"), None);
        assert_eq!(typed_reference("coord"), None);
        assert_eq!(typed_reference("whatever"), None);
    }
}
