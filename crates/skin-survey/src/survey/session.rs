use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::questions::{find_primary, find_tie_breaker, first_tie_breaker, Axis};
use super::scoring::{evaluate, EvaluationResult, Likert, Responses};
use super::submission::RespondentProfile;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub String);

/// Where a survey session sits in the answer / score / submit flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionPhase {
    AnsweringPrimary,
    AnsweringTieBreak { pending: Vec<Axis> },
    Scored { type_code: String },
    Submitted { type_code: String },
}

impl SessionPhase {
    pub fn label(&self) -> &'static str {
        match self {
            SessionPhase::AnsweringPrimary => "Answering primary questions",
            SessionPhase::AnsweringTieBreak { .. } => "Answering tie-breakers",
            SessionPhase::Scored { .. } => "Scored",
            SessionPhase::Submitted { .. } => "Submitted",
        }
    }
}

/// Serializable survey state. All scoring goes through [`evaluate`]; this type only
/// tracks answers and which transitions are allowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveySession {
    pub id: SessionId,
    pub phase: SessionPhase,
    pub responses: Responses,
    pub tie_break_responses: Responses,
    pub last_result: Option<EvaluationResult>,
    pub profile: RespondentProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("unknown question '{0}'")]
    UnknownQuestion(String),
    #[error("tie-breaker '{0}' is not pending for this session")]
    NotPending(String),
    #[error("survey has not produced a final type code yet")]
    NotFinal,
    #[error("survey was already submitted")]
    AlreadySubmitted,
}

impl SurveySession {
    pub fn new(id: SessionId, profile: RespondentProfile) -> Self {
        let now = Utc::now();
        Self {
            id,
            phase: SessionPhase::AnsweringPrimary,
            responses: Responses::new(),
            tie_break_responses: Responses::new(),
            last_result: None,
            profile,
            created_at: now,
            updated_at: now,
        }
    }

    /// Records an answer, routing it to the primary or tie-break set by question id.
    pub fn answer(&mut self, question_id: &str, value: Option<Likert>) -> Result<(), SessionError> {
        if find_primary(question_id).is_some() {
            self.answer_primary(question_id, value)
        } else if find_tie_breaker(question_id).is_some() {
            self.answer_tie_break(question_id, value)
        } else {
            Err(SessionError::UnknownQuestion(question_id.to_string()))
        }
    }

    /// Changing a primary answer invalidates any earlier result.
    pub fn answer_primary(
        &mut self,
        question_id: &str,
        value: Option<Likert>,
    ) -> Result<(), SessionError> {
        self.ensure_open()?;
        let question = find_primary(question_id)
            .ok_or_else(|| SessionError::UnknownQuestion(question_id.to_string()))?;

        self.responses.set(question.id, value);
        self.phase = SessionPhase::AnsweringPrimary;
        self.last_result = None;
        self.touch();
        Ok(())
    }

    pub fn answer_tie_break(
        &mut self,
        question_id: &str,
        value: Option<Likert>,
    ) -> Result<(), SessionError> {
        self.ensure_open()?;
        let question = find_tie_breaker(question_id)
            .ok_or_else(|| SessionError::UnknownQuestion(question_id.to_string()))?;

        let pending = match &self.phase {
            SessionPhase::AnsweringTieBreak { pending } => pending,
            _ => return Err(SessionError::NotPending(question_id.to_string())),
        };
        let is_pending = pending
            .iter()
            .any(|&axis| first_tie_breaker(axis).id == question.id);
        if !is_pending {
            return Err(SessionError::NotPending(question_id.to_string()));
        }

        self.tie_break_responses.set(question.id, value);
        self.touch();
        Ok(())
    }

    /// Scores the current answers. Pending tie-breakers move the session into the
    /// tie-break phase; otherwise it becomes final.
    pub fn score(&mut self) -> Result<&EvaluationResult, SessionError> {
        self.ensure_open()?;
        let result = evaluate(&self.responses, &self.tie_break_responses);

        self.phase = match &result.type_code {
            Some(type_code) => SessionPhase::Scored {
                type_code: type_code.clone(),
            },
            None => SessionPhase::AnsweringTieBreak {
                pending: result.pending_axes(),
            },
        };
        self.touch();
        Ok(&*self.last_result.insert(result))
    }

    /// Clears every answer and result and returns to the primary questions.
    pub fn reset(&mut self) {
        self.responses.clear();
        self.tie_break_responses.clear();
        self.last_result = None;
        self.phase = SessionPhase::AnsweringPrimary;
        self.touch();
    }

    /// The final result, ready to hand to the profile store.
    pub fn final_result(&self) -> Result<&EvaluationResult, SessionError> {
        match (&self.phase, &self.last_result) {
            (SessionPhase::Submitted { .. }, _) => Err(SessionError::AlreadySubmitted),
            (SessionPhase::Scored { .. }, Some(result)) if result.is_final() => Ok(result),
            _ => Err(SessionError::NotFinal),
        }
    }

    pub fn mark_submitted(&mut self) -> Result<(), SessionError> {
        let type_code = match &self.phase {
            SessionPhase::Scored { type_code } => type_code.clone(),
            SessionPhase::Submitted { .. } => return Err(SessionError::AlreadySubmitted),
            _ => return Err(SessionError::NotFinal),
        };
        self.phase = SessionPhase::Submitted { type_code };
        self.touch();
        Ok(())
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self.phase, SessionPhase::Submitted { .. })
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.is_submitted() {
            Err(SessionError::AlreadySubmitted)
        } else {
            Ok(())
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
