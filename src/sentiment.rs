use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Deserialize)]
struct Lexicon {
    positive: Vec<String>,
    negative: Vec<String>,
}

static LEXICON: Lazy<Lexicon> = Lazy::new(|| {
    let raw = include_str!("../sentiment_lexicon.json");
    serde_json::from_str::<Lexicon>(raw).expect("valid sentiment lexicon")
});

static POSITIVE_RE: Lazy<Regex> = Lazy::new(|| term_regex(&LEXICON.positive));
static NEGATIVE_RE: Lazy<Regex> = Lazy::new(|| term_regex(&LEXICON.negative));

/// `\b(?:a|b|c)\b` over the escaped terms.
fn term_regex(terms: &[String]) -> Regex {
    let alt = terms
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{alt})\b")).expect("lexicon regex")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
    Mixed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    #[serde(rename = "sentiment")]
    pub label: SentimentLabel,
    pub confidence: f64,
    #[serde(rename = "positive_indicators")]
    pub positive_count: usize,
    #[serde(rename = "negative_indicators")]
    pub negative_count: usize,
    pub insights: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SentimentAnalyzer;

impl SentimentAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Counts how many distinct lexicon terms occur as whole words in the
    /// case-folded text. Repeats of the same term count once.
    pub fn count_indicators(&self, text: &str) -> (usize, usize) {
        let folded = text.to_lowercase();
        (
            distinct_matches(&POSITIVE_RE, &folded),
            distinct_matches(&NEGATIVE_RE, &folded),
        )
    }

    pub fn analyze(&self, text: &str) -> SentimentResult {
        let (pos, neg) = self.count_indicators(text);
        let (label, confidence) = classify(pos, neg);
        SentimentResult {
            label,
            confidence: round_to(confidence, 2),
            positive_count: pos,
            negative_count: neg,
            insights: insights(label, pos, neg),
        }
    }
}

fn distinct_matches(re: &Regex, folded: &str) -> usize {
    re.find_iter(folded)
        .map(|m| m.as_str())
        .collect::<HashSet<_>>()
        .len()
}

fn classify(pos: usize, neg: usize) -> (SentimentLabel, f64) {
    let total = (pos + neg) as f64;
    match pos.cmp(&neg) {
        _ if pos + neg == 0 => (SentimentLabel::Neutral, 0.5),
        std::cmp::Ordering::Greater => (
            SentimentLabel::Positive,
            (0.6 + (pos as f64 / total) * 0.35).min(0.95),
        ),
        std::cmp::Ordering::Less => (
            SentimentLabel::Negative,
            (0.6 + (neg as f64 / total) * 0.35).min(0.95),
        ),
        std::cmp::Ordering::Equal => (SentimentLabel::Mixed, 0.5),
    }
}

fn insights(label: SentimentLabel, pos: usize, neg: usize) -> Vec<String> {
    match label {
        SentimentLabel::Positive => vec![
            format!("Strong positive sentiment detected with {pos} positive indicators"),
            if neg > 0 {
                format!("Minor negative elements present ({neg} indicators)")
            } else {
                "No negative indicators found".to_string()
            },
        ],
        SentimentLabel::Negative => vec![
            format!("Strong negative sentiment detected with {neg} negative indicators"),
            if pos > 0 {
                format!("Some positive elements present ({pos} indicators)")
            } else {
                "No positive indicators found".to_string()
            },
        ],
        SentimentLabel::Mixed => vec![format!(
            "Mixed sentiment with balanced positive ({pos}) and negative ({neg}) indicators"
        )],
        SentimentLabel::Neutral => {
            vec!["Neutral sentiment - no strong emotional indicators detected".to_string()]
        }
    }
}

pub(crate) fn round_to(x: f64, decimals: i32) -> f64 {
    let f = 10f64.powi(decimals);
    (x * f).round() / f
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexicon_sizes() {
        assert_eq!(LEXICON.positive.len(), 27);
        assert_eq!(LEXICON.negative.len(), 27);
    }

    #[test]
    fn positive_only_text() {
        let r = SentimentAnalyzer::new().analyze("Great, wonderful and simply excellent work.");
        assert_eq!(r.label, SentimentLabel::Positive);
        assert_eq!(r.positive_count, 3);
        assert_eq!(r.negative_count, 0);
        assert!(r.confidence >= 0.6);
        assert_eq!(r.insights[1], "No negative indicators found");
    }

    #[test]
    fn negative_only_text() {
        let r = SentimentAnalyzer::new().analyze("An awful, useless disaster.");
        assert_eq!(r.label, SentimentLabel::Negative);
        assert_eq!(r.negative_count, 3);
        assert!(r.confidence >= 0.6);
    }

    #[test]
    fn neutral_without_lexicon_terms() {
        let r = SentimentAnalyzer::new().analyze("The meeting starts at noon on Tuesday.");
        assert_eq!(r.label, SentimentLabel::Neutral);
        assert_eq!(r.confidence, 0.5);
    }

    #[test]
    fn mixed_on_equal_counts() {
        let r = SentimentAnalyzer::new().analyze("Good food, bad service.");
        assert_eq!(r.label, SentimentLabel::Mixed);
        assert_eq!(r.confidence, 0.5);
        assert_eq!(r.insights.len(), 1);
    }

    #[test]
    fn whole_words_only_and_case_folded() {
        let an = SentimentAnalyzer::new();
        // "goodness" and "badge" must not count.
        assert_eq!(an.count_indicators("Goodness, what a badge."), (0, 0));
        assert_eq!(an.count_indicators("GOOD. Bad!"), (1, 1));
    }

    #[test]
    fn repeated_term_counts_once() {
        assert_eq!(
            SentimentAnalyzer::new().count_indicators("good good good great"),
            (2, 0)
        );
    }

    #[test]
    fn confidence_is_capped_and_rounded() {
        let r = SentimentAnalyzer::new().analyze("love love best terrible");
        // 2 positive vs 1 negative: 0.6 + (2/3) * 0.35 = 0.8333..
        assert_eq!(r.confidence, 0.83);
        let r = SentimentAnalyzer::new().analyze("perfect success");
        assert_eq!(r.confidence, 0.95);
    }
}
