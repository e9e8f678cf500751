//! Evaluation engine: one grade per enrollment, pass/fail derived from the score.

pub mod domain;
pub mod engine;
pub mod repository;
pub mod router;

#[cfg(test)]
mod tests;

pub use domain::{
    Evaluation, EvaluationId, EvaluationRequest, EvaluationView, GradedEvaluation,
    PendingEvaluation, Score, ScoreUpdate, MAX_SCORE, MIN_SCORE, PASSING_SCORE,
};
pub use engine::EvaluationEngine;
pub use repository::{EvaluationRepository, EvaluationTransaction};
pub use router::evaluation_router;
