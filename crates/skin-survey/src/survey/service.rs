use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, warn};

use super::repository::{RepositoryError, SessionRepository};
use super::scoring::Likert;
use super::session::{SessionError, SessionId, SurveySession};
use super::submission::{ProfileStore, RespondentProfile, SkinDiagnosisPayload, SubmissionError};

/// Service composing session storage, the scoring engine, and the profile store.
pub struct SurveyService<R, P> {
    repository: Arc<R>,
    store: Arc<P>,
    in_flight: Mutex<HashSet<SessionId>>,
}

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> SessionId {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SessionId(format!("svy-{id:06}"))
}

impl<R, P> SurveyService<R, P>
where
    R: SessionRepository + 'static,
    P: ProfileStore + 'static,
{
    pub fn new(repository: Arc<R>, store: Arc<P>) -> Self {
        Self {
            repository,
            store,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Open a new, empty survey session.
    pub fn start(&self, profile: RespondentProfile) -> Result<SurveySession, SurveyServiceError> {
        let session = SurveySession::new(next_session_id(), profile);
        let stored = self.repository.insert(session)?;
        debug!(session = %stored.id.0, "survey session started");
        Ok(stored)
    }

    pub fn get(&self, id: &SessionId) -> Result<SurveySession, SurveyServiceError> {
        let session = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(session)
    }

    /// Record a primary or tie-break answer; `None` records "unknown".
    pub fn answer(
        &self,
        id: &SessionId,
        question_id: &str,
        value: Option<Likert>,
    ) -> Result<SurveySession, SurveyServiceError> {
        let session = self.repository.modify(id, |session| -> Result<_, SurveyServiceError> {
            self.ensure_no_submission(id)?;
            session.answer(question_id, value)?;
            Ok(session.clone())
        })?;
        debug!(
            session = %id.0,
            question = question_id,
            phase = session.phase.label(),
            "answer recorded"
        );
        Ok(session)
    }

    pub fn score(&self, id: &SessionId) -> Result<SurveySession, SurveyServiceError> {
        let session = self.repository.modify(id, |session| -> Result<_, SurveyServiceError> {
            self.ensure_no_submission(id)?;
            session.score()?;
            Ok(session.clone())
        })?;
        if let Some(result) = &session.last_result {
            info!(
                session = %id.0,
                type_code = result.type_code.as_deref().unwrap_or("pending"),
                pending = result.pending_tie_breaks.len(),
                "survey scored"
            );
        }
        Ok(session)
    }

    pub fn reset(&self, id: &SessionId) -> Result<SurveySession, SurveyServiceError> {
        let session = self.repository.modify(id, |session| -> Result<_, SurveyServiceError> {
            self.ensure_no_submission(id)?;
            session.reset();
            Ok(session.clone())
        })?;
        debug!(session = %id.0, "survey session reset");
        Ok(session)
    }

    /// Hand the final diagnosis to the profile store and lock the session.
    ///
    /// Only one submission per session may be in flight, and answers, scoring and resets
    /// are refused until it settles. A failed attempt leaves the session scored so the
    /// caller can retry.
    pub async fn submit(&self, id: &SessionId) -> Result<SurveySession, SurveyServiceError> {
        let _guard = InFlightGuard::acquire(&self.in_flight, id)?;

        let session = self.get(id)?;
        let payload = SkinDiagnosisPayload::from_result(session.final_result()?, &session.profile)?;

        if let Err(err) = self.store.save(&payload).await {
            warn!(session = %id.0, error = %err, "diagnosis submission failed");
            return Err(err.into());
        }

        let session = self.repository.modify(id, |session| -> Result<_, SurveyServiceError> {
            session.mark_submitted()?;
            Ok(session.clone())
        })?;
        info!(session = %id.0, type_code = %payload.skin_type_code, "survey submitted");
        Ok(session)
    }

    fn ensure_no_submission(&self, id: &SessionId) -> Result<(), SurveyServiceError> {
        let in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if in_flight.contains(id) {
            Err(SurveyServiceError::SubmissionInFlight)
        } else {
            Ok(())
        }
    }
}

struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<SessionId>>,
    id: SessionId,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(
        set: &'a Mutex<HashSet<SessionId>>,
        id: &SessionId,
    ) -> Result<Self, SurveyServiceError> {
        let mut guard = set.lock().unwrap_or_else(PoisonError::into_inner);
        if !guard.insert(id.clone()) {
            return Err(SurveyServiceError::SubmissionInFlight);
        }
        Ok(Self {
            set,
            id: id.clone(),
        })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

/// Error raised by the survey service.
#[derive(Debug, thiserror::Error)]
pub enum SurveyServiceError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("saving the diagnosis failed, please retry ({0})")]
    Submission(#[from] SubmissionError),
    #[error("a submission for this session is already in progress")]
    SubmissionInFlight,
}
