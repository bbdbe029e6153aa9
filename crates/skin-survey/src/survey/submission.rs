use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::questions::Letter;
use super::scoring::EvaluationResult;

/// Respondent details forwarded alongside the diagnosis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RespondentProfile {
    pub user_id: i64,
    pub nickname: Option<String>,
    pub birth_year: Option<i32>,
    pub gender: String,
}

impl Default for RespondentProfile {
    fn default() -> Self {
        Self {
            user_id: 1,
            nickname: None,
            birth_year: None,
            gender: "na".to_string(),
        }
    }
}

/// Per-axis breakdown stored with the profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSummary {
    pub avg: f64,
    pub letter: Letter,
    pub confidence: u8,
}

/// Body of `POST /api/profile/skin-diagnosis`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinDiagnosisPayload {
    pub user_id: i64,
    pub skin_type_code: String,
    /// JSON-encoded `axis code -> AxisSummary` map; the backend expects a string here.
    pub skin_axes_json: String,
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_year: Option<i32>,
    pub gender: String,
}

impl SkinDiagnosisPayload {
    pub fn from_result(
        result: &EvaluationResult,
        profile: &RespondentProfile,
    ) -> Result<Self, SubmissionError> {
        let skin_type_code = result.type_code.clone().ok_or(SubmissionError::Unresolved)?;

        let mut axes = BTreeMap::new();
        for axis in &result.axes {
            let letter = axis.letter.ok_or(SubmissionError::Unresolved)?;
            axes.insert(
                axis.axis.code(),
                AxisSummary {
                    avg: axis.average,
                    letter,
                    confidence: axis.confidence,
                },
            );
        }

        Ok(Self {
            user_id: profile.user_id,
            skin_type_code,
            skin_axes_json: serde_json::to_string(&axes)?,
            nickname: profile.nickname.clone(),
            birth_year: profile.birth_year,
            gender: profile.gender.clone(),
        })
    }
}

/// Outbound boundary to the backend that persists skin profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn save(&self, payload: &SkinDiagnosisPayload) -> Result<(), SubmissionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("survey has undecided axes; answer the pending tie-breakers first")]
    Unresolved,
    #[error("failed to encode axis breakdown: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("profile service unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("profile service rejected the diagnosis (HTTP {status}): {detail}")]
    Rejected { status: u16, detail: String },
}

/// [`ProfileStore`] backed by the profile REST API.
#[derive(Debug, Clone)]
pub struct HttpProfileStore {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpProfileStore {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SubmissionError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!(
                "{}/api/profile/skin-diagnosis",
                base_url.trim_end_matches('/')
            ),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ProfileStore for HttpProfileStore {
    async fn save(&self, payload: &SkinDiagnosisPayload) -> Result<(), SubmissionError> {
        let response = self.client.post(&self.endpoint).json(payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(%status, user_id = payload.user_id, "profile service rejected diagnosis");
            return Err(SubmissionError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        info!(
            user_id = payload.user_id,
            type_code = %payload.skin_type_code,
            "skin diagnosis stored"
        );
        Ok(())
    }
}
