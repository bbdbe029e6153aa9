use metrics_exporter_prometheus::PrometheusHandle;
use skin_survey::survey::{RepositoryError, SessionId, SessionRepository, SurveySession};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local session storage; sessions do not survive a restart.
#[derive(Default, Clone)]
pub(crate) struct InMemorySessionRepository {
    sessions: Arc<Mutex<HashMap<SessionId, SurveySession>>>,
}

impl InMemorySessionRepository {
    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<SessionId, SurveySession>>, RepositoryError>
    {
        self.sessions
            .lock()
            .map_err(|_| RepositoryError::Unavailable("session store poisoned".to_string()))
    }
}

impl SessionRepository for InMemorySessionRepository {
    fn insert(&self, session: SurveySession) -> Result<SurveySession, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.contains_key(&session.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<SurveySession>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard.get(id).cloned())
    }

    fn modify<T, E, F>(&self, id: &SessionId, change: F) -> Result<T, E>
    where
        F: FnOnce(&mut SurveySession) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let mut guard = self.lock()?;
        let stored = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        let mut draft = stored.clone();
        let value = change(&mut draft)?;
        *stored = draft;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skin_survey::survey::{Likert, RespondentProfile};

    fn session(id: &str) -> SurveySession {
        SurveySession::new(SessionId(id.to_string()), RespondentProfile::default())
    }

    #[test]
    fn insert_rejects_duplicate_ids() {
        let repository = InMemorySessionRepository::default();
        repository.insert(session("svy-1")).expect("first insert");

        let err = repository
            .insert(session("svy-1"))
            .expect_err("duplicate rejected");
        assert!(matches!(err, RepositoryError::Conflict));
    }

    #[test]
    fn modify_requires_existing_session() {
        let repository = InMemorySessionRepository::default();
        let err = repository
            .modify(&SessionId("svy-2".to_string()), |session| {
                session.reset();
                Ok::<_, RepositoryError>(())
            })
            .expect_err("unknown session");
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[test]
    fn failed_modify_keeps_stored_session() {
        let repository = InMemorySessionRepository::default();
        let id = SessionId("svy-3".to_string());
        repository.insert(session("svy-3")).expect("insert");

        let err = repository
            .modify(&id, |session| {
                session
                    .answer("Q1", Likert::new(5))
                    .expect("answer accepted");
                Err::<(), _>(RepositoryError::Unavailable("write refused".to_string()))
            })
            .expect_err("change rejected");
        assert!(matches!(err, RepositoryError::Unavailable(_)));

        let stored = repository.fetch(&id).expect("fetch").expect("stored");
        assert!(stored.responses.is_empty());

        repository
            .modify(&id, |session| {
                session
                    .answer("Q1", Likert::new(5))
                    .expect("answer accepted");
                Ok::<_, RepositoryError>(())
            })
            .expect("change applied");
        let stored = repository.fetch(&id).expect("fetch").expect("stored");
        assert_eq!(stored.responses.len(), 1);
    }
}
