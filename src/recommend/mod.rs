// src/recommend/mod.rs
//! Candidate ranking: backend selection and rank assembly.

pub mod backend;
pub mod scorer;

pub use backend::{
    shared_backend, BackendKind, EngagementModel, EngagementPredictions, HeuristicModel,
    LearnedModel, ModelBackend, ScoredCandidate,
};
pub use scorer::{ModelInfo, RankedCandidate, RankingResult, RecommendationScorer};
