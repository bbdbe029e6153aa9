//! Baumann skin-type survey: question tables, scoring engine, session state, and the
//! hand-off to the profile service.

pub mod questions;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod session;
pub mod submission;

pub use questions::{Axis, Letter, Question, QuestionCatalog, Scoring};
pub use repository::{RepositoryError, SessionRepository};
pub use router::survey_router;
pub use scoring::{
    apply_reverse, compute_axis_stats, compute_confidence, decide_letter, evaluate, AxisResult,
    AxisStats, EvaluationResult, InvalidLikert, Likert, PendingTieBreak, Responses,
};
pub use service::{SurveyService, SurveyServiceError};
pub use session::{SessionError, SessionId, SessionPhase, SurveySession};
pub use submission::{
    AxisSummary, HttpProfileStore, ProfileStore, RespondentProfile, SkinDiagnosisPayload,
    SubmissionError,
};

#[cfg(test)]
mod tests;
