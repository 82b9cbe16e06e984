//! REST client for the quiz backend. One trait per operation, like the
//! persistence seam the handlers are generic over, so editor logic stays
//! testable without a live backend.

use std::collections::BTreeMap;

use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

use crate::draft::save::{SaveOutcome, SavePayload};
use crate::draft::Draft;

pub mod dto;

use dto::{EditorDataDto, ErrorDto, QuizSummary, SaveResponseDto};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message}")]
    Backend { status: StatusCode, message: String },
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub(crate) trait FetchQuiz {
    async fn list_quizzes(&self) -> Result<Vec<QuizSummary>, ApiError>;

    /// Persisted translations for a quiz, keyed by language code. Languages
    /// the quiz has no translation for are simply absent.
    async fn fetch_editor_data(
        &self,
        quiz_id: i64,
        languages: &[String],
    ) -> Result<BTreeMap<String, Draft>, ApiError>;
}

#[derive(Debug, Clone)]
pub struct SaveReceipt {
    pub quiz_id: i64,
    pub outcome: SaveOutcome,
}

pub(crate) trait SaveQuiz {
    /// Multipart save: JSON translations map plus any pending cover images.
    /// `quiz_id` absent means create, present means update.
    async fn save_quiz(
        &self,
        quiz_id: Option<i64>,
        owner: &str,
        payload: &SavePayload,
    ) -> Result<SaveReceipt, ApiError>;
}

pub(crate) trait DeleteQuiz {
    async fn delete_quiz(&self, quiz_id: i64) -> Result<(), ApiError>;

    async fn delete_translation(&self, quiz_id: i64, language: &str) -> Result<(), ApiError>;
}

#[derive(Debug, Clone)]
pub struct Backend {
    http: reqwest::Client,
    base: Url,
}

impl Backend {
    pub fn new(base: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            base,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base.join(path).map_err(|e| ApiError::Backend {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("bad endpoint '{}': {}", path, e),
        })
    }

    /// Reads the body, turning non-success statuses into `ApiError::Backend`
    /// with the backend's message when it sent one.
    async fn read_body(response: reqwest::Response) -> Result<String, ApiError> {
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            return Ok(body);
        }
        let message = serde_json::from_str::<ErrorDto>(&body)
            .map(|e| e.message)
            .unwrap_or_else(|_| format!("backend returned {}", status));
        Err(ApiError::Backend { status, message })
    }
}

impl FetchQuiz for Backend {
    async fn list_quizzes(&self) -> Result<Vec<QuizSummary>, ApiError> {
        let url = self.endpoint("quizzes")?;
        let body = Self::read_body(self.http.get(url).send().await?).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn fetch_editor_data(
        &self,
        quiz_id: i64,
        languages: &[String],
    ) -> Result<BTreeMap<String, Draft>, ApiError> {
        let mut url = self.endpoint(&format!("quizzes/{}", quiz_id))?;
        url.query_pairs_mut()
            .append_pair("languages", &languages.join(","));
        let body = Self::read_body(self.http.get(url).send().await?).await?;
        let data: EditorDataDto = serde_json::from_str(&body)?;
        Ok(data
            .translations
            .into_iter()
            .map(|(code, translation)| {
                let draft = translation.into_draft(&code);
                (code, draft)
            })
            .collect())
    }
}

impl SaveQuiz for Backend {
    async fn save_quiz(
        &self,
        quiz_id: Option<i64>,
        owner: &str,
        payload: &SavePayload,
    ) -> Result<SaveReceipt, ApiError> {
        let url = match quiz_id {
            Some(id) => self.endpoint(&format!("quizzes/{}", id))?,
            None => self.endpoint("quizzes")?,
        };

        let mut form = Form::new()
            .text("translations", payload.translations_json()?)
            .text("owner", owner.to_owned());
        for cover in &payload.covers {
            let part = Part::bytes(cover.bytes.clone()).file_name(cover.file_name.clone());
            form = form.part(format!("cover_{}", cover.language_code), part);
        }

        let body = Self::read_body(self.http.post(url).multipart(form).send().await?).await?;
        let response: SaveResponseDto = serde_json::from_str(&body)?;
        Ok(SaveReceipt {
            quiz_id: response.quiz_id,
            outcome: SaveOutcome {
                saved: response.saved,
                failed: response.failed.into_iter().collect(),
            },
        })
    }
}

impl DeleteQuiz for Backend {
    async fn delete_quiz(&self, quiz_id: i64) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("quizzes/{}", quiz_id))?;
        Self::read_body(self.http.delete(url).send().await?).await?;
        Ok(())
    }

    async fn delete_translation(&self, quiz_id: i64, language: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("quizzes/{}/translations/{}", quiz_id, language))?;
        Self::read_body(self.http.delete(url).send().await?).await?;
        Ok(())
    }
}
