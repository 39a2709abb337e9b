mod config;
pub mod config_keys;
mod context;
mod engine;
mod match_type;
pub mod normalize;
mod script;


pub use context::{Classification, Extra, MatchContext, MatchEnv};
pub use engine::{
    CONFIG_MATCHERS, MatchOutcome, MatchPass, MatchStats, Matcher, MatcherEntry, SCRIPT_MATCHERS, classify,
    declaration_text, match_document, registry,
};
pub use match_type::{DeclarationInfo, HoverItem, MATCH_TYPES, MatchType, MatchTypeId};
pub use script::{SubjectRule, trigger_subject};
