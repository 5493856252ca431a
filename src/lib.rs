// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod keywords;
pub mod metrics;
pub mod recommend;
pub mod request;
pub mod schema;
pub mod sentiment;
pub mod stats;
pub mod summary;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::dispatcher::{AnalysisDispatcher, AnalysisResponse, AnalysisResult};
pub use crate::error::AnalysisError;
pub use crate::request::{AnalysisMode, AnalysisRequest, CandidateItem, EngagementRecord};

use serde_json::Value;

/// One-shot analysis through the process-wide dispatcher.
///
/// ```ignore
/// let resp = feed_analyst::analyze(Some("buyer-id"), &serde_json::json!({
///     "analysis_type": "sentiment",
///     "text": "This product is absolutely amazing!"
/// }));
/// assert!(resp.is_completed());
/// ```
pub fn analyze(purchaser: Option<&str>, input: &Value) -> AnalysisResponse {
    AnalysisDispatcher::shared().analyze(purchaser, input)
}

/// Whether the learned ranking model is currently serving.
pub fn model_ready() -> bool {
    recommend::shared_backend().is_ready()
}
