//! Frequency-based keyword extraction.
//!
//! Tokens are whitespace-delimited, edge punctuation is stripped and the
//! result case-folded. Survivors must be alphabetic, at least 4 characters
//! long and not a stop word. Ties on frequency go to the token seen first.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::sentiment::round_to;

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "as", "by", "with",
    "from", "is", "was", "are", "were", "be", "been", "being", "have", "has", "had", "do", "does",
    "did", "will", "would", "should", "could", "may", "might", "must", "can", "this", "that",
    "these", "those", "i", "you", "he", "she", "it", "we", "they",
];

static STOP_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| STOP_WORDS.iter().copied().collect());

const EDGE_PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':', '(', ')', '[', ']', '{', '}'];

const MIN_KEYWORD_CHARS: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub keyword: String,
    pub frequency: usize,
    pub relevance: f64,
}

fn qualifies(token: &str) -> bool {
    token.chars().count() >= MIN_KEYWORD_CHARS
        && !STOP_SET.contains(token)
        && token.chars().all(char::is_alphabetic)
}

/// Top `top_n` keywords by frequency. `relevance` is frequency over the raw
/// whitespace token count (before any filtering).
pub fn extract(text: &str, top_n: usize) -> Vec<Keyword> {
    let raw_tokens: Vec<&str> = text.split_whitespace().collect();
    let total = raw_tokens.len().max(1) as f64;

    // Insertion order of `counts` is first-occurrence order.
    let mut slot: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();
    for raw in &raw_tokens {
        let token = raw.to_lowercase();
        let token = token.trim_matches(EDGE_PUNCTUATION);
        if !qualifies(token) {
            continue;
        }
        match slot.get(token) {
            Some(&i) => counts[i].1 += 1,
            None => {
                slot.insert(token.to_string(), counts.len());
                counts.push((token.to_string(), 1));
            }
        }
    }

    // Stable sort keeps first-occurrence order among equal frequencies.
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    counts
        .into_iter()
        .take(top_n)
        .map(|(keyword, frequency)| Keyword {
            keyword,
            relevance: round_to(frequency as f64 / total, 3),
            frequency,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_short_stop_and_non_alpha_tokens() {
        let kws = extract("The cat would eat fish2 and (rust) rust, RUST! those", 10);
        let words: Vec<_> = kws.iter().map(|k| k.keyword.as_str()).collect();
        assert_eq!(words, vec!["rust"]);
        assert_eq!(kws[0].frequency, 3);
        // 10 raw tokens
        assert_eq!(kws[0].relevance, 0.3);
    }

    #[test]
    fn ties_break_by_first_occurrence() {
        let kws = extract("zebra apple mango apple zebra mango kiwis", 10);
        let words: Vec<_> = kws.iter().map(|k| k.keyword.as_str()).collect();
        assert_eq!(words, vec!["zebra", "apple", "mango", "kiwis"]);
    }

    #[test]
    fn higher_frequency_wins_over_position() {
        let kws = extract("first second second third third third", 2);
        assert_eq!(kws.len(), 2);
        assert_eq!(kws[0].keyword, "third");
        assert_eq!(kws[1].keyword, "second");
    }

    #[test]
    fn result_is_bounded_by_distinct_qualifying_tokens() {
        let kws = extract("alpha beta gamma alpha", 50);
        assert_eq!(kws.len(), 3);
    }

    #[test]
    fn nothing_qualifies() {
        assert!(extract("a an the it is", 5).is_empty());
    }
}
