// src/dispatcher.rs
//! # Analysis Dispatcher
//! Single entry point for the host: normalizes the raw field bag, routes the
//! request to the analyzers for its mode and wraps the outcome in the
//! `completed` / `failed` envelope.
//!
//! Nothing escapes [`AnalysisDispatcher::analyze`]: validation errors, analyzer
//! errors and panics all come back as `status: "failed"`.

use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use chrono::{SecondsFormat, Utc};
use metrics::{counter, histogram};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::error::AnalysisError;
use crate::keywords::{self, Keyword};
use crate::recommend::{BackendKind, RankingResult, RecommendationScorer};
use crate::request::{AnalysisMode, AnalysisRequest};
use crate::sentiment::{SentimentAnalyzer, SentimentResult};
use crate::stats::{self, StatsResult};
use crate::summary::{self, SummaryResult};

/// Keyword cap inside the combined `general` result.
pub const GENERAL_KEYWORD_CAP: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneralResult {
    pub sentiment: SentimentResult,
    pub stats: StatsResult,
    pub keywords: Vec<Keyword>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisResult {
    Sentiment(SentimentResult),
    Summary(SummaryResult),
    Stats(StatsResult),
    Keywords(Vec<Keyword>),
    Ranking(RankingResult),
    General(GeneralResult),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchaser: Option<String>,
    pub analysis_type: AnalysisMode,
    pub text_length: usize,
    pub processing_time_seconds: f64,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AnalysisResponse {
    Completed {
        result: AnalysisResult,
        metadata: ResponseMetadata,
    },
    Failed {
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        purchaser: Option<String>,
    },
}

impl AnalysisResponse {
    pub fn is_completed(&self) -> bool {
        matches!(self, AnalysisResponse::Completed { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            AnalysisResponse::Failed { error, .. } => Some(error),
            AnalysisResponse::Completed { .. } => None,
        }
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            AnalysisResponse::Completed { result, .. } => Some(result),
            AnalysisResponse::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisDispatcher {
    sentiment: SentimentAnalyzer,
    scorer: RecommendationScorer,
}

impl AnalysisDispatcher {
    pub fn new(scorer: RecommendationScorer) -> Self {
        Self {
            sentiment: SentimentAnalyzer::new(),
            scorer,
        }
    }

    /// Dispatcher bound to the process-wide ranking backend.
    pub fn shared() -> Self {
        Self::new(RecommendationScorer::shared())
    }

    /// Capability probe: is the learned ranking model serving.
    pub fn model_ready(&self) -> bool {
        self.scorer.backend().is_ready()
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.scorer.backend().active_kind()
    }

    /// `purchaser` is opaque: echoed into the envelope, hashed for logs, never inspected.
    pub fn analyze(&self, purchaser: Option<&str>, input: &Value) -> AnalysisResponse {
        let started = Instant::now();
        let tag = purchaser.map(purchaser_tag).unwrap_or_default();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.run(input)))
            .unwrap_or_else(|payload| Err(AnalysisError::Unexpected(panic_message(payload.as_ref()))));

        let elapsed = started.elapsed();
        histogram!("analysis_duration_ms").record(elapsed.as_secs_f64() * 1000.0);

        match outcome {
            Ok((req, result)) => {
                counter!("analysis_requests_total", "mode" => req.mode.as_str()).increment(1);
                info!(
                    purchaser = %tag,
                    mode = %req.mode,
                    text_len = req.text_length(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "analysis completed"
                );
                AnalysisResponse::Completed {
                    result,
                    metadata: ResponseMetadata {
                        purchaser: purchaser.map(str::to_string),
                        analysis_type: req.mode,
                        text_length: req.text_length(),
                        processing_time_seconds: elapsed.as_secs_f64(),
                        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
                    },
                }
            }
            Err(e) => {
                counter!("analysis_failures_total", "kind" => e.kind()).increment(1);
                match &e {
                    AnalysisError::Unexpected(_) | AnalysisError::BackendUnavailable(_) => {
                        error!(purchaser = %tag, error = %e, "analysis failed")
                    }
                    _ => warn!(purchaser = %tag, error = %e, "request rejected"),
                }
                AnalysisResponse::Failed {
                    error: e.to_string(),
                    purchaser: purchaser.map(str::to_string),
                }
            }
        }
    }

    fn run(&self, input: &Value) -> Result<(AnalysisRequest, AnalysisResult), AnalysisError> {
        let req = AnalysisRequest::from_value(input)?;
        let result = self.execute(&req);
        Ok((req, result))
    }

    /// Route a validated request to its analyzer(s).
    pub fn execute(&self, req: &AnalysisRequest) -> AnalysisResult {
        let text = req.text.as_str();
        match req.mode {
            AnalysisMode::Sentiment => AnalysisResult::Sentiment(self.sentiment.analyze(text)),
            AnalysisMode::Summary => {
                AnalysisResult::Summary(summary::summarize(text, req.summary_sentences))
            }
            AnalysisMode::Stats => AnalysisResult::Stats(stats::calculate(text)),
            AnalysisMode::Keywords => {
                AnalysisResult::Keywords(keywords::extract(text, req.max_keywords))
            }
            AnalysisMode::Ranking => AnalysisResult::Ranking(self.scorer.recommend(
                &req.user_history,
                &req.candidates,
                req.top_k,
            )),
            AnalysisMode::General => AnalysisResult::General(GeneralResult {
                sentiment: self.sentiment.analyze(text),
                stats: stats::calculate(text),
                keywords: keywords::extract(text, req.max_keywords.min(GENERAL_KEYWORD_CAP)),
            }),
        }
    }
}

/// Short, stable tag for log lines (first 6 bytes of SHA-256, hex).
pub(crate) fn purchaser_tag(id: &str) -> String {
    use sha2::{Digest, Sha256};
    use std::fmt::Write as _;

    let digest = Sha256::digest(id.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "analysis panicked".to_string()
    }
}
