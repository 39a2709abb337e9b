//! Prefix tree over `char`s.
//!
//! Backs both the completion index (one trie per match type) and the
//! exception-word dictionary used by the lexer for greedy multi-character
//! matches.

use crate::util::FastHashMap;

#[derive(Debug, Default, Clone)]
struct TrieNode {
    children: FastHashMap<char, TrieNode>,
    is_word: bool,
}

impl TrieNode {
    fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Debug, Default, Clone)]
pub struct Trie {
    root: TrieNode,
    len: usize,
}

impl Trie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct words stored.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert a word. Returns `false` if it was already present.
    pub fn insert(&mut self, word: &str) -> bool {
        if word.is_empty() {
            return false;
        }
        let mut node = &mut self.root;
        for c in word.chars() {
            node = node.children.entry(c).or_default();
        }
        if node.is_word {
            return false;
        }
        node.is_word = true;
        self.len += 1;
        true
    }

    /// Remove a word and prune branches that no longer lead to any word.
    /// Returns `false` if the word was not present.
    pub fn remove(&mut self, word: &str) -> bool {
        let chars: Vec<char> = word.chars().collect();
        if chars.is_empty() {
            return false;
        }
        let removed = Self::remove_rec(&mut self.root, &chars);
        if removed {
            self.len -= 1;
        }
        removed
    }

    fn remove_rec(node: &mut TrieNode, chars: &[char]) -> bool {
        let Some((first, rest)) = chars.split_first() else {
            if !node.is_word {
                return false;
            }
            node.is_word = false;
            return true;
        };
        let Some(child) = node.children.get_mut(first) else {
            return false;
        };
        let removed = Self::remove_rec(child, rest);
        if removed && !child.is_word && child.is_leaf() {
            node.children.remove(first);
        }
        removed
    }

    pub fn has_word(&self, word: &str) -> bool {
        self.find_node(word).is_some_and(|n| n.is_word)
    }

    /// Length (in chars) of the longest stored word that starts at
    /// `chars[start..]`, or 0 when none does.
    pub fn longest_prefix_match(&self, chars: &[char], start: usize) -> usize {
        let mut node = &self.root;
        let mut best = 0;
        for (offset, c) in chars.iter().skip(start).enumerate() {
            match node.children.get(c) {
                Some(next) => {
                    node = next;
                    if node.is_word {
                        best = offset + 1;
                    }
                }
                None => break,
            }
        }
        best
    }

    /// All stored words beginning with `prefix`, sorted.
    pub fn find_words_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(node) = self.find_node(prefix) {
            let mut buf = prefix.to_string();
            Self::collect(node, &mut buf, &mut out);
        }
        out.sort();
        out
    }

    fn collect(node: &TrieNode, buf: &mut String, out: &mut Vec<String>) {
        if node.is_word {
            out.push(buf.clone());
        }
        for (c, child) in &node.children {
            buf.push(*c);
            Self::collect(child, buf, out);
            buf.pop();
        }
    }

    fn find_node(&self, prefix: &str) -> Option<&TrieNode> {
        let mut node = &self.root;
        for c in prefix.chars() {
            node = node.children.get(&c)?;
        }
        Some(node)
    }

    pub fn clear(&mut self) {
        self.root = TrieNode::default();
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::Trie;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_insert_and_has_word() {
        let mut trie = Trie::new();
        assert!(trie.insert("coins"));
        assert!(!trie.insert("coins"), "duplicate insert reports false");
        assert!(trie.insert("coin"));
        assert_eq!(trie.len(), 2);
        assert!(trie.has_word("coin"));
        assert!(trie.has_word("coins"));
        assert!(!trie.has_word("coi"));
        assert!(!trie.insert(""));
    }

    #[test]
    fn test_remove_prunes_but_keeps_prefix_words() {
        let mut trie = Trie::new();
        trie.insert("coin");
        trie.insert("coins");
        assert!(trie.remove("coins"));
        assert!(!trie.has_word("coins"));
        assert!(trie.has_word("coin"));
        assert!(!trie.remove("coins"));
        assert!(trie.remove("coin"));
        assert!(trie.is_empty());
        assert!(trie.find_words_with_prefix("").is_empty());
    }

    #[test]
    fn test_longest_prefix_match() {
        let mut trie = Trie::new();
        trie.insert("potion(4)");
        trie.insert("potion(");
        let line = chars("x potion(4), y");
        assert_eq!(trie.longest_prefix_match(&line, 2), 9);
        assert_eq!(trie.longest_prefix_match(&line, 0), 0);
        assert_eq!(trie.longest_prefix_match(&chars("potion(3)"), 0), 7);
        assert_eq!(trie.longest_prefix_match(&line, 100), 0);
    }

    #[test]
    fn test_prefix_search_sorted() {
        let mut trie = Trie::new();
        for w in ["bank_open", "bank_close", "banana", "apple"] {
            trie.insert(w);
        }
        assert_eq!(trie.find_words_with_prefix("bank_"), vec!["bank_close", "bank_open"]);
        assert_eq!(trie.find_words_with_prefix("ban").len(), 3);
        assert!(trie.find_words_with_prefix("z").is_empty());
    }
}
