//! Dictionary of names the default word class cannot tokenize.
//!
//! Config names such as `potion(4)` or `dragon_dagger(p+)` contain chars the
//! lexer would otherwise split on. They are learned from `[...]` declaration
//! tags before the first real lexing pass and matched greedily afterwards.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::text::split_lines;
use crate::trie::Trie;
use crate::util::chars::is_standard_word;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\[(.+)\]").expect("valid tag regex"));

#[derive(Debug, Default, Clone)]
pub struct WordExceptionLearner {
    words: Trie,
}

impl WordExceptionLearner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `word` if it does not fit the standard grammar. Returns `true`
    /// when the word was new.
    pub fn learn(&mut self, word: &str) -> bool {
        let word = word.trim();
        if word.is_empty() || is_standard_word(word) || word.chars().any(char::is_whitespace) {
            return false;
        }
        let added = self.words.insert(word);
        if added {
            tracing::trace!(word, "learned exception word");
        }
        added
    }

    /// Scan every line-leading `[...]` tag of `text` and learn its parts.
    /// Returns the number of new words.
    pub fn learn_from_text(&mut self, text: &str) -> usize {
        let mut added = 0;
        for line in split_lines(text) {
            let Some(caps) = TAG_RE.captures(line) else {
                continue;
            };
            let inner = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            for part in split_tag(inner) {
                if self.learn(part) {
                    added += 1;
                }
            }
        }
        added
    }

    /// Length of the longest known exception word at `chars[index..]`, or 0.
    pub fn match_longest_exception(&self, chars: &[char], index: usize) -> usize {
        if self.words.is_empty() {
            return 0;
        }
        self.words.longest_prefix_match(chars, index)
    }

    pub fn is_exception(&self, word: &str) -> bool {
        self.words.has_word(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn clear(&mut self) {
        self.words.clear();
    }
}

// The captured tag runs up to the last `]` on the line, so cut it at the
// first `]` that closes the tag and split on commas outside parens.
fn split_tag(inner: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth <= 0 => {
                parts.push(&inner[start..i]);
                start = i + 1;
            }
            ']' if depth <= 0 => {
                parts.push(&inner[start..i]);
                return parts;
            }
            _ => {}
        }
    }
    parts.push(&inner[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_learn_skips_standard_words() {
        let mut learner = WordExceptionLearner::new();
        assert!(!learner.learn("coins"));
        assert!(!learner.learn("bank:close"));
        assert!(learner.learn("potion(4)"));
        assert!(!learner.learn("potion(4)"), "already known");
        assert!(!learner.learn("has space"));
        assert_eq!(learner.len(), 1);
    }

    #[test]
    fn test_learn_from_tags() {
        let mut learner = WordExceptionLearner::new();
        let text = "[dragon_dagger(p+)]\nname=Dragon dagger\n[opheld1,potion(4)]\n[proc,foo](int $x)(obj)\n";
        assert_eq!(learner.learn_from_text(text), 2);
        assert!(learner.is_exception("dragon_dagger(p+)"));
        assert!(learner.is_exception("potion(4)"));
        assert!(!learner.is_exception("foo"));
    }

    #[test]
    fn test_match_longest() {
        let mut learner = WordExceptionLearner::new();
        learner.learn("potion(4)");
        let chars: Vec<char> = "~drink(potion(4));".chars().collect();
        assert_eq!(learner.match_longest_exception(&chars, 7), 9);
        assert_eq!(learner.match_longest_exception(&chars, 1), 0);
    }
}
