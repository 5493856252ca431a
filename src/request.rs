// src/request.rs
//! Request normalization: turns the loosely-typed field bag handed over by the
//! host into a strict [`AnalysisRequest`], or a single validation message.
//!
//! Order of checks (first violation wins):
//! 1) mode (always resolvable, unknown input falls back to `general`)
//! 2) ranking: `user_history` / `candidates` present, arrays, ≤ 1000 candidates;
//!    other modes: `text` is a non-empty string within the length bounds
//! 3) `max_keywords`, `summary_sentences` (every mode), `top_k` (ranking only)

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AnalysisError;

pub const MIN_TEXT_LENGTH: usize = 10;
pub const MAX_TEXT_LENGTH: usize = 100_000;
pub const MAX_CANDIDATES: usize = 1000;

pub const DEFAULT_MAX_KEYWORDS: usize = 10;
pub const DEFAULT_SUMMARY_SENTENCES: usize = 3;
pub const DEFAULT_TOP_K: usize = 10;

const KEYWORDS_RANGE: RangeInclusive<usize> = 1..=100;
const SUMMARY_RANGE: RangeInclusive<usize> = 1..=20;
const TOP_K_RANGE: RangeInclusive<usize> = 1..=100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    Sentiment,
    Summary,
    Stats,
    Keywords,
    Ranking,
    General,
}

impl AnalysisMode {
    /// Index order used by hosts that submit the option position instead of its name.
    pub const ORDERED: [AnalysisMode; 6] = [
        AnalysisMode::Sentiment,
        AnalysisMode::Summary,
        AnalysisMode::Stats,
        AnalysisMode::Keywords,
        AnalysisMode::Ranking,
        AnalysisMode::General,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisMode::Sentiment => "sentiment",
            AnalysisMode::Summary => "summary",
            AnalysisMode::Stats => "stats",
            AnalysisMode::Keywords => "keywords",
            AnalysisMode::Ranking => "ranking",
            AnalysisMode::General => "general",
        }
    }

    pub fn from_index(idx: i64) -> Option<Self> {
        usize::try_from(idx)
            .ok()
            .and_then(|i| Self::ORDERED.get(i).copied())
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisMode {
    type Err = AnalysisError;

    /// Exact, case-sensitive names. `recommendations` is the legacy label of `ranking`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sentiment" => Ok(AnalysisMode::Sentiment),
            "summary" => Ok(AnalysisMode::Summary),
            "stats" => Ok(AnalysisMode::Stats),
            "keywords" => Ok(AnalysisMode::Keywords),
            "ranking" | "recommendations" => Ok(AnalysisMode::Ranking),
            "general" => Ok(AnalysisMode::General),
            other => Err(AnalysisError::UnsupportedMode(other.to_string())),
        }
    }
}

/// The shapes a raw mode value can take on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeInput<'a> {
    Missing,
    /// `"sentiment"`, `"ranking"`, ...
    Name(&'a str),
    /// `2` or `"2"`
    Index(i64),
    /// `"[2]"`; the inner text is parsed on resolution.
    BracketedIndex(&'a str),
    /// Booleans, floats, arrays, objects.
    Unrecognized,
}

impl<'a> ModeInput<'a> {
    pub fn classify(raw: Option<&'a Value>) -> Self {
        match raw {
            None | Some(Value::Null) => ModeInput::Missing,
            Some(Value::Number(n)) => n.as_i64().map_or(ModeInput::Unrecognized, ModeInput::Index),
            Some(Value::String(s)) => {
                if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
                    s.parse::<i64>()
                        .map_or(ModeInput::Unrecognized, ModeInput::Index)
                } else if s.len() >= 2 && s.starts_with('[') && s.ends_with(']') {
                    ModeInput::BracketedIndex(s.trim_matches(|c| c == '[' || c == ']'))
                } else {
                    ModeInput::Name(s)
                }
            }
            Some(_) => ModeInput::Unrecognized,
        }
    }

    /// Total: anything that does not name a known mode resolves to `General`.
    pub fn resolve(self) -> AnalysisMode {
        let resolved = match self {
            ModeInput::Name(name) => name.parse().ok(),
            ModeInput::Index(idx) => AnalysisMode::from_index(idx),
            ModeInput::BracketedIndex(inner) => inner
                .trim()
                .parse::<i64>()
                .ok()
                .and_then(AnalysisMode::from_index),
            ModeInput::Missing | ModeInput::Unrecognized => None,
        };
        resolved.unwrap_or(AnalysisMode::General)
    }
}

pub fn normalize_mode(raw: Option<&Value>) -> AnalysisMode {
    ModeInput::classify(raw).resolve()
}

/// One past interaction of the user. Carried for a future learned model; the
/// heuristic scorer ignores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementRecord {
    #[serde(default, alias = "postId")]
    pub post_id: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateItem {
    #[serde(default = "unknown_post_id", alias = "postId")]
    pub post_id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, alias = "authorId")]
    pub author_id: String,
    #[serde(default, alias = "mediaType")]
    pub media_type: Option<String>,
}

fn unknown_post_id() -> String {
    "unknown".to_string()
}

impl CandidateItem {
    pub fn is_video(&self) -> bool {
        self.media_type.as_deref() == Some("video")
    }
}

/// Canonical request, built fresh per call.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub mode: AnalysisMode,
    pub text: String,
    pub max_keywords: usize,
    pub summary_sentences: usize,
    pub top_k: usize,
    pub user_history: Vec<EngagementRecord>,
    pub candidates: Vec<CandidateItem>,
}

impl AnalysisRequest {
    /// Accepts any JSON value; non-objects behave like an empty field bag.
    pub fn from_value(raw: &Value) -> Result<Self, AnalysisError> {
        match raw {
            Value::Object(fields) => Self::from_fields(fields),
            _ => Self::from_fields(&Map::new()),
        }
    }

    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, AnalysisError> {
        let mode = normalize_mode(fields.get("analysis_type").or_else(|| fields.get("mode")));

        if mode == AnalysisMode::Ranking {
            let history = decode_structured(fields, "user_history")?;
            let candidates = decode_structured(fields, "candidates")?;
            validate_ranking(&history, &candidates)?;
            let max_keywords = bounded_int(fields, "max_keywords", DEFAULT_MAX_KEYWORDS, KEYWORDS_RANGE)?;
            let summary_sentences =
                bounded_int(fields, "summary_sentences", DEFAULT_SUMMARY_SENTENCES, SUMMARY_RANGE)?;
            let top_k = bounded_int(fields, "top_k", DEFAULT_TOP_K, TOP_K_RANGE)?;

            let user_history: Vec<EngagementRecord> =
                serde_json::from_value(history).map_err(|e| AnalysisError::Parse {
                    field: "user_history",
                    detail: e.to_string(),
                })?;
            let candidates: Vec<CandidateItem> =
                serde_json::from_value(candidates).map_err(|e| AnalysisError::Parse {
                    field: "candidates",
                    detail: e.to_string(),
                })?;

            let text = fields
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();

            return Ok(Self {
                mode,
                text,
                max_keywords,
                summary_sentences,
                top_k,
                user_history,
                candidates,
            });
        }

        let text = validate_text(fields.get("text"))?;
        let max_keywords = bounded_int(fields, "max_keywords", DEFAULT_MAX_KEYWORDS, KEYWORDS_RANGE)?;
        let summary_sentences =
            bounded_int(fields, "summary_sentences", DEFAULT_SUMMARY_SENTENCES, SUMMARY_RANGE)?;

        Ok(Self {
            mode,
            text: text.to_string(),
            max_keywords,
            summary_sentences,
            top_k: DEFAULT_TOP_K,
            user_history: Vec::new(),
            candidates: Vec::new(),
        })
    }

    /// Length in characters, as reported in response metadata.
    pub fn text_length(&self) -> usize {
        self.text.chars().count()
    }
}

/// Structured ranking inputs may arrive as serialized JSON text.
fn decode_structured(fields: &Map<String, Value>, field: &'static str) -> Result<Value, AnalysisError> {
    match fields.get(field) {
        Some(Value::String(s)) => serde_json::from_str(s).map_err(|e| AnalysisError::Parse {
            field,
            detail: e.to_string(),
        }),
        Some(v) => Ok(v.clone()),
        None => Ok(Value::Null),
    }
}

fn validate_ranking(history: &Value, candidates: &Value) -> Result<(), AnalysisError> {
    if is_blank(history) {
        return Err(AnalysisError::validation(
            "Missing 'user_history' field - required for recommendations",
        ));
    }
    if is_blank(candidates) {
        return Err(AnalysisError::validation(
            "Missing 'candidates' field - required for recommendations",
        ));
    }
    let (Some(_), Some(cands)) = (history.as_array(), candidates.as_array()) else {
        return Err(AnalysisError::validation(
            "'user_history' and 'candidates' must be arrays",
        ));
    };
    if cands.len() > MAX_CANDIDATES {
        return Err(AnalysisError::validation(format!(
            "Too many candidates - maximum {MAX_CANDIDATES} allowed"
        )));
    }
    Ok(())
}

fn validate_text(raw: Option<&Value>) -> Result<&str, AnalysisError> {
    let text = match raw {
        Some(Value::String(s)) if !s.is_empty() => s.as_str(),
        _ => {
            return Err(AnalysisError::validation(
                "Missing or invalid 'text' field - must be a non-empty string",
            ))
        }
    };
    let len = text.chars().count();
    if len < MIN_TEXT_LENGTH {
        return Err(AnalysisError::validation(format!(
            "Text too short - minimum {MIN_TEXT_LENGTH} characters required"
        )));
    }
    if len > MAX_TEXT_LENGTH {
        return Err(AnalysisError::validation(format!(
            "Text too long - maximum {MAX_TEXT_LENGTH} characters allowed"
        )));
    }
    Ok(text)
}

/// Absent or `null` takes the default; anything else must be an in-range JSON integer.
fn bounded_int(
    fields: &Map<String, Value>,
    key: &str,
    default: usize,
    range: RangeInclusive<usize>,
) -> Result<usize, AnalysisError> {
    let value = match fields.get(key) {
        None | Some(Value::Null) => return Ok(default),
        Some(Value::Number(n)) => n.as_u64().and_then(|v| usize::try_from(v).ok()),
        Some(_) => None,
    };
    match value {
        Some(v) if range.contains(&v) => Ok(v),
        _ => Err(AnalysisError::validation(format!(
            "{key} must be an integer between {} and {}",
            range.start(),
            range.end()
        ))),
    }
}

/// "Empty" in the loose sense the host uses: null, false, 0, "", [] and {}.
fn is_blank(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
