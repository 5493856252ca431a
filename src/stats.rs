use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::sentiment::round_to;
use crate::summary::split_sentences;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsResult {
    pub word_count: usize,
    pub sentence_count: usize,
    pub character_count: usize,
    pub average_word_length: f64,
    pub average_sentence_length: f64,
    pub alphabetic_characters: usize,
    pub numeric_characters: usize,
    pub whitespace_characters: usize,
    pub unique_words: usize,
    pub lexical_diversity: f64,
}

/// Whitespace-token and character-class statistics. Averages divide by at least 1.
pub fn calculate(text: &str) -> StatsResult {
    let words: Vec<&str> = text.split_whitespace().collect();
    let sentence_count = split_sentences(text).len();

    let word_denom = words.len().max(1) as f64;
    let letters_in_words: usize = words.iter().map(|w| w.chars().count()).sum();

    let (mut alpha, mut numeric, mut space, mut chars) = (0, 0, 0, 0);
    for c in text.chars() {
        chars += 1;
        // Independent classes; numeric is ASCII decimal digits only.
        alpha += usize::from(c.is_alphabetic());
        numeric += usize::from(c.to_digit(10).is_some());
        space += usize::from(c.is_whitespace());
    }

    let unique_words = words
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<HashSet<_>>()
        .len();

    StatsResult {
        word_count: words.len(),
        sentence_count,
        character_count: chars,
        average_word_length: round_to(letters_in_words as f64 / word_denom, 2),
        average_sentence_length: round_to(words.len() as f64 / sentence_count.max(1) as f64, 2),
        alphabetic_characters: alpha,
        numeric_characters: numeric,
        whitespace_characters: space,
        unique_words,
        lexical_diversity: round_to(unique_words as f64 / word_denom, 2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_words_sentences_and_classes() {
        let s = calculate("The cat sat. The cat ran 42 laps.");
        assert_eq!(s.word_count, 8);
        assert_eq!(s.sentence_count, 2);
        assert_eq!(s.numeric_characters, 2);
        assert_eq!(s.whitespace_characters, 7);
        assert_eq!(s.unique_words, 6);
        assert_eq!(s.average_sentence_length, 4.0);
        assert_eq!(s.lexical_diversity, 0.75);
    }

    #[test]
    fn unique_words_are_case_folded() {
        let s = calculate("Word word WORD other");
        assert_eq!(s.unique_words, 2);
        assert_eq!(s.lexical_diversity, 0.5);
    }

    #[test]
    fn empty_text_does_not_divide_by_zero() {
        let s = calculate("   ");
        assert_eq!(s.word_count, 0);
        assert_eq!(s.average_word_length, 0.0);
        assert_eq!(s.average_sentence_length, 0.0);
        assert_eq!(s.lexical_diversity, 0.0);
    }

    #[test]
    fn numeric_class_is_decimal_digits_only() {
        let s = calculate("½ cup, 3 eggs");
        assert_eq!(s.numeric_characters, 1);
        assert_eq!(s.alphabetic_characters, 7);
        assert_eq!(s.whitespace_characters, 3);
    }

    #[test]
    fn word_count_matches_whitespace_tokens() {
        let text = "tabs\tand\nnewlines   and  spaces";
        assert_eq!(calculate(text).word_count, text.split_whitespace().count());
    }
}
