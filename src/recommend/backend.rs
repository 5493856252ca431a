//! Ranking backends: a learned model (not wired to inference yet) and the
//! deterministic heuristic used whenever the learned model cannot serve.
//!
//! The process holds one [`ModelBackend`], built on first use from
//! [`BackendConfig`]. Once the learned model fails, the backend stays on the
//! heuristic for the rest of the process.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::BackendConfig;
use crate::error::AnalysisError;
use crate::request::{CandidateItem, EngagementRecord};

/// Reference length used to normalize candidate text (one classic post).
const TEXT_NORM_CHARS: f64 = 280.0;
const KEYWORD_BOOST: f64 = 0.1;
const ENGAGEMENT_KEYWORDS: &[&str] = &["ai", "ml", "tech", "news", "breaking", "important"];

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EngagementPredictions {
    pub like: f64,
    pub repost: f64,
    pub reply: f64,
    pub click: f64,
    pub profile_click: f64,
    pub video_view: f64,
}

impl EngagementPredictions {
    /// Fixed fractions of the overall score.
    pub fn from_score(score: f64, is_video: bool) -> Self {
        Self {
            like: score * 0.8,
            repost: score * 0.3,
            reply: score * 0.2,
            click: score * 0.6,
            profile_click: score * 0.1,
            video_view: if is_video { score * 0.4 } else { 0.0 },
        }
    }
}

/// Unranked prediction for one candidate, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub post_id: String,
    pub score: f64,
    pub predictions: EngagementPredictions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Real,
    Mock,
}

/// Scores candidates for one user.
pub trait EngagementModel: Send + Sync {
    fn predict(
        &self,
        history: &[EngagementRecord],
        candidates: &[CandidateItem],
    ) -> Result<Vec<ScoredCandidate>, AnalysisError>;

    fn name(&self) -> &'static str;
}

/// Learned ranker backed by a checkpoint on disk.
#[derive(Debug, Clone)]
pub struct LearnedModel {
    checkpoint: PathBuf,
}

impl LearnedModel {
    pub fn load(path: &Path) -> Result<Self, AnalysisError> {
        if !path.exists() {
            return Err(AnalysisError::BackendUnavailable(format!(
                "model path not found: {}",
                path.display()
            )));
        }
        Ok(Self {
            checkpoint: path.to_path_buf(),
        })
    }
}

impl EngagementModel for LearnedModel {
    fn predict(
        &self,
        _history: &[EngagementRecord],
        candidates: &[CandidateItem],
    ) -> Result<Vec<ScoredCandidate>, AnalysisError> {
        debug!(
            checkpoint = %self.checkpoint.display(),
            candidates = candidates.len(),
            "learned model invoked"
        );
        // TODO: feature hashing + forward pass once checkpoints are exported for Rust.
        Err(AnalysisError::BackendUnavailable(
            "Real model inference not yet implemented".to_string(),
        ))
    }

    fn name(&self) -> &'static str {
        "learned"
    }
}

/// Length + keyword heuristic. Ignores engagement history.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicModel;

impl HeuristicModel {
    pub fn score(text: &str) -> f64 {
        let base = (text.chars().count() as f64 / TEXT_NORM_CHARS).min(1.0);
        let folded = text.to_lowercase();
        let hits = ENGAGEMENT_KEYWORDS
            .iter()
            .filter(|kw| folded.contains(*kw))
            .count();
        (base + hits as f64 * KEYWORD_BOOST).min(1.0)
    }

}

impl EngagementModel for HeuristicModel {
    fn predict(
        &self,
        _history: &[EngagementRecord],
        candidates: &[CandidateItem],
    ) -> Result<Vec<ScoredCandidate>, AnalysisError> {
        Ok(candidates
            .iter()
            .map(|c| {
                let score = Self::score(&c.text);
                ScoredCandidate {
                    post_id: c.post_id.clone(),
                    score,
                    predictions: EngagementPredictions::from_score(score, c.is_video()),
                }
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}

/// Selected backend. The learned model is only present when configured and
/// loadable; `degraded` latches after its first failure.
#[derive(Debug)]
pub struct ModelBackend {
    real: Option<LearnedModel>,
    mock: HeuristicModel,
    degraded: AtomicBool,
}

impl ModelBackend {
    pub fn mock() -> Self {
        Self {
            real: None,
            mock: HeuristicModel,
            degraded: AtomicBool::new(false),
        }
    }

    pub fn with_learned(model: LearnedModel) -> Self {
        Self {
            real: Some(model),
            ..Self::mock()
        }
    }

    pub fn from_config(cfg: &BackendConfig) -> Self {
        if cfg.use_mock {
            info!("ranking backend: heuristic (forced by config)");
            return Self::mock();
        }
        let Some(path) = cfg.model_path.as_deref() else {
            info!("ranking backend: heuristic (no model path configured)");
            return Self::mock();
        };
        match LearnedModel::load(path) {
            Ok(model) => {
                info!(checkpoint = %path.display(), "ranking backend: learned model loaded");
                Self::with_learned(model)
            }
            Err(e) => {
                warn!(error = %e, "learned model unavailable; using heuristic backend");
                Self::mock()
            }
        }
    }

    /// True while the learned model is loaded and has not failed.
    pub fn is_ready(&self) -> bool {
        self.real.is_some() && !self.degraded.load(Ordering::Acquire)
    }

    pub fn active_kind(&self) -> BackendKind {
        if self.is_ready() {
            BackendKind::Real
        } else {
            BackendKind::Mock
        }
    }

    /// Never fails: a learned-model error is logged and answered by the heuristic.
    pub fn predict(
        &self,
        history: &[EngagementRecord],
        candidates: &[CandidateItem],
    ) -> Vec<ScoredCandidate> {
        if let Some(real) = self.real.as_ref().filter(|_| self.is_ready()) {
            match real.predict(history, candidates) {
                Ok(scored) => return scored,
                Err(e) => {
                    warn!(
                        error = %e,
                        model = real.name(),
                        "prediction failed; switching to heuristic backend"
                    );
                    self.degraded.store(true, Ordering::Release);
                    counter!("model_backend_fallbacks_total").increment(1);
                }
            }
        }
        match self.mock.predict(history, candidates) {
            Ok(scored) => scored,
            Err(e) => {
                warn!(error = %e, model = self.mock.name(), "heuristic scoring failed");
                Vec::new()
            }
        }
    }
}

static SHARED: OnceLock<Arc<ModelBackend>> = OnceLock::new();

/// Process-wide backend, built once from the resolved config.
pub fn shared_backend() -> Arc<ModelBackend> {
    SHARED
        .get_or_init(|| {
            let cfg = BackendConfig::load().unwrap_or_else(|e| {
                warn!(error = ?e, "backend config unreadable; using defaults");
                BackendConfig::default()
            });
            Arc::new(ModelBackend::from_config(&cfg))
        })
        .clone()
}
