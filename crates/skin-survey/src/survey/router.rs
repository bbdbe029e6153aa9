use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;

use super::questions::QuestionCatalog;
use super::repository::SessionRepository;
use super::scoring::{evaluate, EvaluationResult, Likert, Responses};
use super::service::SurveyService;
use super::session::{SessionId, SurveySession};
use super::submission::{ProfileStore, RespondentProfile};
use crate::error::AppError;

#[derive(Debug, Default, Deserialize)]
pub struct EvaluateRequest {
    #[serde(default)]
    pub responses: Responses,
    #[serde(default)]
    pub tie_break_responses: Responses,
}

#[derive(Debug, Default, Deserialize)]
pub struct StartSessionRequest {
    #[serde(default)]
    pub profile: RespondentProfile,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub question_id: String,
    /// `null` records "unknown".
    #[serde(default)]
    pub value: Option<Likert>,
}

/// Router exposing the questionnaire, stateless scoring, and session endpoints.
pub fn survey_router<R, P>(service: Arc<SurveyService<R, P>>) -> Router
where
    R: SessionRepository + 'static,
    P: ProfileStore + 'static,
{
    Router::new()
        .route("/api/v1/survey/questions", get(questions_handler))
        .route("/api/v1/survey/evaluate", post(evaluate_handler))
        .route("/api/v1/survey/sessions", post(start_handler::<R, P>))
        .route("/api/v1/survey/sessions/:session_id", get(session_handler::<R, P>))
        .route(
            "/api/v1/survey/sessions/:session_id/answers",
            put(answer_handler::<R, P>),
        )
        .route(
            "/api/v1/survey/sessions/:session_id/score",
            post(score_handler::<R, P>),
        )
        .route(
            "/api/v1/survey/sessions/:session_id/reset",
            post(reset_handler::<R, P>),
        )
        .route(
            "/api/v1/survey/sessions/:session_id/submit",
            post(submit_handler::<R, P>),
        )
        .with_state(service)
}

pub(crate) async fn questions_handler() -> Json<QuestionCatalog> {
    Json(QuestionCatalog::standard())
}

pub(crate) async fn evaluate_handler(
    Json(request): Json<EvaluateRequest>,
) -> Json<EvaluationResult> {
    Json(evaluate(&request.responses, &request.tie_break_responses))
}

pub(crate) async fn start_handler<R, P>(
    State(service): State<Arc<SurveyService<R, P>>>,
    Json(request): Json<StartSessionRequest>,
) -> Result<(StatusCode, Json<SurveySession>), AppError>
where
    R: SessionRepository + 'static,
    P: ProfileStore + 'static,
{
    let session = service.start(request.profile)?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub(crate) async fn session_handler<R, P>(
    State(service): State<Arc<SurveyService<R, P>>>,
    Path(session_id): Path<String>,
) -> Result<Json<SurveySession>, AppError>
where
    R: SessionRepository + 'static,
    P: ProfileStore + 'static,
{
    Ok(Json(service.get(&SessionId(session_id))?))
}

pub(crate) async fn answer_handler<R, P>(
    State(service): State<Arc<SurveyService<R, P>>>,
    Path(session_id): Path<String>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<SurveySession>, AppError>
where
    R: SessionRepository + 'static,
    P: ProfileStore + 'static,
{
    let session = service.answer(&SessionId(session_id), &request.question_id, request.value)?;
    Ok(Json(session))
}

pub(crate) async fn score_handler<R, P>(
    State(service): State<Arc<SurveyService<R, P>>>,
    Path(session_id): Path<String>,
) -> Result<Json<SurveySession>, AppError>
where
    R: SessionRepository + 'static,
    P: ProfileStore + 'static,
{
    Ok(Json(service.score(&SessionId(session_id))?))
}

pub(crate) async fn reset_handler<R, P>(
    State(service): State<Arc<SurveyService<R, P>>>,
    Path(session_id): Path<String>,
) -> Result<Json<SurveySession>, AppError>
where
    R: SessionRepository + 'static,
    P: ProfileStore + 'static,
{
    Ok(Json(service.reset(&SessionId(session_id))?))
}

pub(crate) async fn submit_handler<R, P>(
    State(service): State<Arc<SurveyService<R, P>>>,
    Path(session_id): Path<String>,
) -> Result<Json<SurveySession>, AppError>
where
    R: SessionRepository + 'static,
    P: ProfileStore + 'static,
{
    Ok(Json(service.submit(&SessionId(session_id)).await?))
}
