//! Keyword matching over tokenized task text.
//!
//! Text is lowercased and split on every non-alphanumeric character.
//! Keywords go through the same tokenizer, so `ci/cd` becomes the two-token
//! run `ci cd` and `nice to have` a three-token run.

use std::ops::Range;

/// Suffixes a single-token keyword may carry and still match.
const INFLECTIONS: &[&str] = &["s", "es", "d", "ed", "ing", "er", "ers", "ment", "ments"];

/// Split text into lowercase alphanumeric tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Tokenized text ready for keyword lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens {
    words: Vec<String>,
}

impl Tokens {
    /// Tokenize `text`.
    pub fn new(text: &str) -> Self {
        Self { words: tokenize(text) }
    }

    /// Number of words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether there are no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// The words in order.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Every token span matched by `keyword`.
    pub fn find(&self, keyword: &str) -> Vec<Range<usize>> {
        let needle = tokenize(keyword);
        if needle.is_empty() || needle.len() > self.words.len() {
            return Vec::new();
        }

        if let [single] = needle.as_slice() {
            return self
                .words
                .iter()
                .enumerate()
                .filter(|(_, word)| word_matches(word, single))
                .map(|(i, _)| i..i + 1)
                .collect();
        }

        self.words
            .windows(needle.len())
            .enumerate()
            .filter(|(_, window)| window.iter().zip(&needle).all(|(w, n)| w == n))
            .map(|(i, _)| i..i + needle.len())
            .collect()
    }

    /// Whether `keyword` occurs anywhere.
    pub fn contains(&self, keyword: &str) -> bool {
        !self.find(keyword).is_empty()
    }

    /// Whether any of `keywords` occurs.
    pub fn contains_any<S: AsRef<str>>(&self, keywords: &[S]) -> bool {
        keywords.iter().any(|k| self.contains(k.as_ref()))
    }

    /// Keywords from `keywords` that occur, in table order.
    pub fn matching<'a, S: AsRef<str>>(&self, keywords: &'a [S]) -> Vec<&'a str> {
        keywords.iter().map(AsRef::as_ref).filter(|k| self.contains(k)).collect()
    }
}

fn word_matches(word: &str, keyword: &str) -> bool {
    match word.strip_prefix(keyword) {
        Some("") => true,
        Some(rest) => INFLECTIONS.contains(&rest),
        None => false,
    }
}
