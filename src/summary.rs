//! Extractive summary: first, middle and last sentence of the input.
//!
//! `summary_sentences` only decides whether the text is already short enough;
//! a longer text always yields the three-sentence pick.

use serde::{Deserialize, Serialize};

use crate::sentiment::round_to;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub summary: String,
    pub original_length: usize,
    pub summary_length: usize,
    pub reduction_percent: f64,
    pub total_sentences: usize,
    #[serde(rename = "summary_sentences")]
    pub summary_sentences_used: usize,
}

/// Period-delimited sentences, trimmed, empty fragments dropped.
pub fn split_sentences(text: &str) -> Vec<&str> {
    text.split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn summarize(text: &str, max_sentences: usize) -> SummaryResult {
    let sentences = split_sentences(text);
    let original_length = text.chars().count();

    let (summary, reduction_percent) = if sentences.len() <= max_sentences {
        (text.to_string(), 0.0)
    } else {
        let n = sentences.len();
        let picked: Vec<&str> = [0, n / 2, n - 1].iter().map(|&i| sentences[i]).collect();
        let summary = format!("{}.", picked.join(". "));
        let ratio = summary.chars().count() as f64 / original_length.max(1) as f64;
        let reduction = round_to((1.0 - ratio) * 100.0, 1);
        (summary, reduction)
    };

    SummaryResult {
        summary_length: summary.chars().count(),
        summary,
        original_length,
        reduction_percent,
        total_sentences: sentences.len(),
        summary_sentences_used: max_sentences.min(sentences.len()),
    }
}
