//! Ordered matcher registries and the per-file matching driver.
//!
//! Every token runs through the registry of its file's engine in order; the
//! first matcher returning a classification wins. Pass 1 runs only the
//! entries flagged as part of the declaration subset so that every declared
//! name is indexed before pass 2 resolves references against it.

use std::sync::Arc;

use crate::file_kind::EngineKind;
use crate::index::{ActiveFileIndex, DeclarationText, IdentifierIndex, LocalVariable, MatchSpan};
use crate::lexer::LexedDocument;
use crate::matching::context::{Classification, Extra, MatchContext, MatchEnv};
use crate::matching::normalize::normalize;
use crate::matching::{config, script};
use crate::text::{LineCol, Location};

pub type Matcher = fn(&MatchContext<'_>, &MatchEnv<'_>) -> Option<Classification>;

pub struct MatcherEntry {
    pub name: &'static str,
    /// Part of the declaration subset run in pass 1.
    pub declarations: bool,
    pub run: Matcher,
}

const fn entry(name: &'static str, declarations: bool, run: Matcher) -> MatcherEntry {
    MatcherEntry {
        name,
        declarations,
        run,
    }
}

pub static SCRIPT_MATCHERS: [MatcherEntry; 12] = [
    entry("string_text", true, script::string_text),
    entry("number", true, script::number),
    entry("keyword", true, script::keyword),
    entry("trigger_header", true, script::trigger_header),
    entry("header_signature", true, script::header_signature),
    entry("local_variable", true, script::local_variable),
    entry("sigil_reference", false, script::sigil_reference),
    entry("switch_case", false, script::switch_case),
    entry("call_argument", false, script::call_argument),
    entry("typed_assignment", false, script::typed_assignment),
    entry("command", false, script::command),
    entry("unmatched_header", true, unmatched_header),
];

pub static CONFIG_MATCHERS: [MatcherEntry; 6] = [
    entry("literal", true, config::literal),
    entry("constant_line", true, config::constant_line),
    entry("block_header", true, config::block_header),
    entry("config_key", true, config::config_key),
    entry("config_value", true, config::config_value),
    entry("pack_line", false, config::pack_line),
];

// Anything left on a header line after its signature is punctuation noise.
fn unmatched_header(ctx: &MatchContext<'_>, _env: &MatchEnv<'_>) -> Option<Classification> {
    ctx.is_header_line().then(Classification::skip)
}

pub fn registry(engine: EngineKind) -> &'static [MatcherEntry] {
    match engine {
        EngineKind::Script => &SCRIPT_MATCHERS,
        EngineKind::Config => &CONFIG_MATCHERS,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchPass {
    /// Pass 1: declaration subset only.
    Declarations,
    /// Pass 2: every matcher; references are indexed.
    Full,
}

/// Winning matcher and its normalized classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    pub matcher: &'static str,
    pub classification: Classification,
}

/// Run the registry for `ctx` in priority order.
pub fn classify(ctx: &MatchContext<'_>, env: &MatchEnv<'_>, pass: MatchPass) -> Option<MatchOutcome> {
    let engine = ctx.kind.engine()?;
    for entry in registry(engine) {
        if pass == MatchPass::Declarations && !entry.declarations {
            continue;
        }
        if let Some(c) = (entry.run)(ctx, env) {
            return Some(MatchOutcome {
                matcher: entry.name,
                classification: normalize(c, ctx, env),
            });
        }
    }
    None
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchStats {
    pub tokens: usize,
    pub matched: usize,
    pub declarations: usize,
    pub references: usize,
}

/// Match every token of `doc`, feeding `identifiers` and rebuilding
/// `active` from scratch.
pub fn match_document(
    doc: &LexedDocument,
    pass: MatchPass,
    identifiers: &mut IdentifierIndex,
    active: &mut ActiveFileIndex,
) -> MatchStats {
    let mut stats = MatchStats::default();
    active.clear();
    if doc.kind().engine().is_none() {
        return stats;
    }
    let file = doc.file();

    for (n, lexed) in doc.lines().iter().enumerate() {
        let line_number = n as u32;
        let line_text = doc.line_text(line_number);
        let chars: Vec<char> = line_text.chars().collect();

        for word in &lexed.tokens {
            stats.tokens += 1;
            let ctx = MatchContext {
                file,
                kind: doc.kind(),
                line_number,
                line_text: &line_text,
                chars: &chars,
                line: lexed,
                word,
            };
            let outcome = {
                let env = MatchEnv {
                    identifiers: &*identifiers,
                    active: &*active,
                };
                classify(&ctx, &env, pass)
            };
            let Some(MatchOutcome { classification: c, .. }) = outcome else {
                continue;
            };
            stats.matched += 1;
            apply_extra(active, &ctx, &c);

            let descriptor = c.match_type.descriptor();
            if descriptor.noop {
                continue;
            }
            let name = c.key_name(&ctx);
            if pass == MatchPass::Full {
                active.put_match(
                    line_number,
                    MatchSpan {
                        start: word.start,
                        end: word.end,
                        token_index: word.index,
                        kind: c.match_type,
                        declaration: c.declaration,
                        name: Arc::from(name),
                        word: word.value.clone(),
                        prefix: c.prefix.clone(),
                        suffix: c.suffix.clone(),
                    },
                );
            }
            if !descriptor.cache {
                continue;
            }
            if c.declaration {
                let location = Location::new(file.clone(), line_number, word.start);
                identifiers.put_declaration(name, c.match_type, location, &declaration_text(doc, line_number));
                stats.declarations += 1;
            } else if pass == MatchPass::Full {
                identifiers.put_reference(name, c.match_type, file, line_number, word.start);
                if let Some(id) = c.pack_id {
                    identifiers.set_pack_id(name, c.match_type, id, file);
                }
                stats.references += 1;
            }
        }
    }
    active.finalize();
    tracing::debug!(%file, ?pass, tokens = stats.tokens, matched = stats.matched, "matched document");
    stats
}

fn apply_extra(active: &mut ActiveFileIndex, ctx: &MatchContext<'_>, c: &Classification) {
    let Some(extra) = &c.extra else {
        return;
    };
    let line = ctx.line_number;
    match extra {
        Extra::BlockStart { trigger, name } => active.start_block(line, trigger.clone(), name.clone()),
        Extra::Switch { type_keyword } => active.put_switch(line, ctx.word.brace_depth + 1, type_keyword.clone()),
        Extra::LocalVar { type_keyword, parameter } => active.put_local(
            line,
            LocalVariable {
                name: ctx.word.value.clone(),
                type_keyword: type_keyword.clone(),
                parameter: *parameter,
                declared_at: LineCol::new(line, ctx.word.start),
            },
        ),
        Extra::ReturnType { type_keyword } => active.add_return_type(line, type_keyword.clone()),
        Extra::BlockValue { key, value } => active.set_block_value(line, key.clone(), value.clone()),
    }
}

const MAX_DECLARATION_LINES: u32 = 64;

/// The declaring line, the rest of its block and the comment above it.
pub fn declaration_text(doc: &LexedDocument, line: u32) -> DeclarationText {
    let mut lines = vec![doc.line_text(line)];
    let end = doc.line_count().min(line + MAX_DECLARATION_LINES);
    for n in line + 1..end {
        let text = doc.line_text(n);
        if text.trim_start().starts_with('[') {
            break;
        }
        lines.push(text);
    }

    let mut doc_lines = Vec::new();
    let mut n = line;
    while n > 0 {
        n -= 1;
        let text = doc.line_text(n);
        let Some(comment) = text.trim_start().strip_prefix("//") else {
            break;
        };
        doc_lines.push(comment.trim().to_string());
    }
    doc_lines.reverse();
    DeclarationText {
        lines,
        doc: (!doc_lines.is_empty()).then(|| doc_lines.join("\n")),
    }
}
