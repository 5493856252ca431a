use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::backend::{shared_backend, BackendKind, EngagementPredictions, ModelBackend};
use crate::request::{CandidateItem, EngagementRecord};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub post_id: String,
    pub rank: usize,
    pub score: f64,
    pub predictions: EngagementPredictions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_type: String,
    pub using_mock: bool,
    pub total_candidates: usize,
    pub returned_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingResult {
    pub recommendations: Vec<RankedCandidate>,
    pub model_info: ModelInfo,
    pub insights: Vec<String>,
}

/// Ranks candidates through the shared (or an injected) backend.
#[derive(Debug, Clone)]
pub struct RecommendationScorer {
    backend: Arc<ModelBackend>,
}

impl RecommendationScorer {
    pub fn new(backend: Arc<ModelBackend>) -> Self {
        Self { backend }
    }

    pub fn shared() -> Self {
        Self::new(shared_backend())
    }

    pub fn backend(&self) -> &ModelBackend {
        &self.backend
    }

    /// Sorted by score descending; equal scores keep input order. Ranks are
    /// 1-based and contiguous, the list is cut to `top_k`.
    pub fn rank(
        &self,
        history: &[EngagementRecord],
        candidates: &[CandidateItem],
        top_k: usize,
    ) -> Vec<RankedCandidate> {
        let mut scored = self.backend.predict(history, candidates);
        // `sort_by` is stable.
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));

        scored
            .into_iter()
            .take(top_k)
            .enumerate()
            .map(|(i, s)| RankedCandidate {
                post_id: s.post_id,
                rank: i + 1,
                score: s.score,
                predictions: s.predictions,
            })
            .collect()
    }

    pub fn recommend(
        &self,
        history: &[EngagementRecord],
        candidates: &[CandidateItem],
        top_k: usize,
    ) -> RankingResult {
        let recommendations = self.rank(history, candidates, top_k);
        let kind = self.backend.active_kind();
        debug!(
            candidates = candidates.len(),
            returned = recommendations.len(),
            backend = ?kind,
            "ranked candidates"
        );

        let top_line = match recommendations.first() {
            Some(top) => format!("Top recommendation has score: {:.3}", top.score),
            None => "No recommendations generated".to_string(),
        };

        RankingResult {
            model_info: ModelInfo {
                model_type: match kind {
                    BackendKind::Real => "learned engagement transformer",
                    BackendKind::Mock => "heuristic engagement scorer",
                }
                .to_string(),
                using_mock: kind == BackendKind::Mock,
                total_candidates: candidates.len(),
                returned_count: recommendations.len(),
            },
            insights: vec![
                format!(
                    "Ranked {} candidates based on user engagement history",
                    candidates.len()
                ),
                top_line,
            ],
            recommendations,
        }
    }
}
