use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;
use tokio::sync::Notify;

use crate::survey::questions::PRIMARY_QUESTIONS;
use crate::survey::repository::{RepositoryError, SessionRepository};
use crate::survey::session::{SessionId, SurveySession};
use crate::survey::submission::{ProfileStore, SkinDiagnosisPayload, SubmissionError};
use crate::survey::{survey_router, Likert, SurveyService};

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    sessions: Arc<Mutex<HashMap<SessionId, SurveySession>>>,
}

impl SessionRepository for MemoryRepository {
    fn insert(&self, session: SurveySession) -> Result<SurveySession, RepositoryError> {
        let mut guard = self.sessions.lock().expect("repository mutex poisoned");
        if guard.contains_key(&session.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<SurveySession>, RepositoryError> {
        let guard = self.sessions.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn modify<T, E, F>(&self, id: &SessionId, change: F) -> Result<T, E>
    where
        F: FnOnce(&mut SurveySession) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let mut guard = self.sessions.lock().expect("repository mutex poisoned");
        let stored = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        let mut draft = stored.clone();
        let value = change(&mut draft)?;
        *stored = draft;
        Ok(value)
    }
}

/// Repository whose reads stall once `slow_reads` is switched on, widening any window
/// between reading a session and writing it back.
#[derive(Default, Clone)]
pub(super) struct SlowReadRepository {
    inner: MemoryRepository,
    slow_reads: Arc<AtomicBool>,
}

impl SlowReadRepository {
    pub(super) fn slow_reads(&self) {
        self.slow_reads.store(true, Ordering::SeqCst);
    }
}

impl SessionRepository for SlowReadRepository {
    fn insert(&self, session: SurveySession) -> Result<SurveySession, RepositoryError> {
        self.inner.insert(session)
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<SurveySession>, RepositoryError> {
        if self.slow_reads.load(Ordering::SeqCst) {
            std::thread::sleep(Duration::from_millis(200));
        }
        self.inner.fetch(id)
    }

    fn modify<T, E, F>(&self, id: &SessionId, change: F) -> Result<T, E>
    where
        F: FnOnce(&mut SurveySession) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        self.inner.modify(id, change)
    }
}

pub(super) struct UnavailableRepository;

impl SessionRepository for UnavailableRepository {
    fn insert(&self, _session: SurveySession) -> Result<SurveySession, RepositoryError> {
        Err(RepositoryError::Unavailable("storage offline".to_string()))
    }

    fn fetch(&self, _id: &SessionId) -> Result<Option<SurveySession>, RepositoryError> {
        Err(RepositoryError::Unavailable("storage offline".to_string()))
    }

    fn modify<T, E, F>(&self, _id: &SessionId, _change: F) -> Result<T, E>
    where
        F: FnOnce(&mut SurveySession) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        Err(RepositoryError::Unavailable("storage offline".to_string()).into())
    }
}

/// Profile store that records payloads and can be told to reject them.
#[derive(Default, Clone)]
pub(super) struct RecordingStore {
    payloads: Arc<Mutex<Vec<SkinDiagnosisPayload>>>,
    reject_with: Option<u16>,
}

impl RecordingStore {
    pub(super) fn rejecting(status: u16) -> Self {
        Self {
            payloads: Arc::default(),
            reject_with: Some(status),
        }
    }

    pub(super) fn payloads(&self) -> Vec<SkinDiagnosisPayload> {
        self.payloads.lock().expect("store mutex poisoned").clone()
    }
}

#[async_trait]
impl ProfileStore for RecordingStore {
    async fn save(&self, payload: &SkinDiagnosisPayload) -> Result<(), SubmissionError> {
        if let Some(status) = self.reject_with {
            return Err(SubmissionError::Rejected {
                status,
                detail: "backend unavailable".to_string(),
            });
        }
        self.payloads
            .lock()
            .expect("store mutex poisoned")
            .push(payload.clone());
        Ok(())
    }
}

/// Profile store that parks every save until the test releases it.
#[derive(Default, Clone)]
pub(super) struct GatedStore {
    pub(super) entered: Arc<Notify>,
    pub(super) release: Arc<Notify>,
    saved: Arc<AtomicUsize>,
}

impl GatedStore {
    pub(super) fn saved(&self) -> usize {
        self.saved.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileStore for GatedStore {
    async fn save(&self, _payload: &SkinDiagnosisPayload) -> Result<(), SubmissionError> {
        self.entered.notify_one();
        self.release.notified().await;
        self.saved.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub(super) fn build_service() -> (
    SurveyService<MemoryRepository, RecordingStore>,
    MemoryRepository,
    RecordingStore,
) {
    let repository = MemoryRepository::default();
    let store = RecordingStore::default();
    let service = SurveyService::new(Arc::new(repository.clone()), Arc::new(store.clone()));
    (service, repository, store)
}

pub(super) fn router_with_service(
    service: SurveyService<MemoryRepository, RecordingStore>,
) -> axum::Router {
    survey_router(Arc::new(service))
}

pub(super) fn answer_all_primary<R, P>(
    service: &SurveyService<R, P>,
    id: &SessionId,
    value: u8,
) where
    R: SessionRepository + 'static,
    P: ProfileStore + 'static,
{
    for question in PRIMARY_QUESTIONS.iter() {
        service
            .answer(id, question.id, Likert::new(value))
            .expect("answer accepted");
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
