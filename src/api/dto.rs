//! Wire shapes as the backend defines them. This crate only consumes these;
//! decoding converts straight into the editor's draft model.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::draft::{AnswerOption, CoverImage, Draft, Question, QuestionId};

#[derive(Debug, Clone, Deserialize)]
pub struct QuizSummary {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnswerDto {
    pub id: i64,
    pub text: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionDto {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub answers: Vec<AnswerDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranslationDto {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub modules: Vec<i64>,
    #[serde(default)]
    pub tags: Vec<i64>,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub questions: Vec<QuestionDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditorDataDto {
    pub translations: BTreeMap<String, TranslationDto>,
}

/// Per-language save result. Keys of `failed` are language codes, values are
/// the backend's error messages.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveResponseDto {
    pub quiz_id: i64,
    #[serde(default)]
    pub saved: Vec<String>,
    #[serde(default)]
    pub failed: BTreeMap<String, String>,
}

/// Error body the backend sends on non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDto {
    pub message: String,
}

impl TranslationDto {
    /// A persisted translation becomes a clean, already-saved draft.
    pub fn into_draft(self, language_code: &str) -> Draft {
        let mut draft = Draft::empty(language_code);
        draft.title = self.title;
        draft.description = self.description;
        draft.is_active = self.is_active;
        draft.modules = self.modules.into_iter().collect();
        draft.tags = self.tags.into_iter().collect();
        draft.cover_image = self.cover_url.map(CoverImage::Stored);
        draft.questions = self
            .questions
            .into_iter()
            .map(|question| Question {
                id: QuestionId::Persisted(question.id),
                title: question.title,
                description: question.description,
                options: question
                    .answers
                    .into_iter()
                    .map(|answer| AnswerOption {
                        server_id: Some(answer.id),
                        text: answer.text,
                        is_correct: answer.is_correct,
                    })
                    .collect(),
            })
            .collect();
        draft.has_saved_translation = true;
        draft
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persisted_translation_decodes_into_a_clean_draft() {
        let dto: TranslationDto = serde_json::from_value(serde_json::json!({
            "title": "Capitals",
            "description": "European capitals",
            "is_active": true,
            "modules": [3, 1],
            "tags": [9],
            "questions": [{
                "id": 42,
                "title": "Capital of Estonia?",
                "answers": [
                    {"id": 7, "text": "Tallinn", "is_correct": true},
                    {"id": 8, "text": "Tartu", "is_correct": false}
                ]
            }]
        }))
        .unwrap();

        let draft = dto.into_draft("en");
        assert_eq!(draft.language_code, "en");
        assert!(draft.has_saved_translation);
        assert!(!draft.is_dirty);
        assert_eq!(draft.modules.iter().copied().collect::<Vec<_>>(), [1, 3]);

        let question = &draft.questions[0];
        assert_eq!(question.id, QuestionId::Persisted(42));
        assert_eq!(question.options[0].server_id, Some(7));
        assert_eq!(question.correct_indices(), vec![0]);
    }

    #[test]
    fn optional_fields_default_when_absent() {
        let dto: TranslationDto =
            serde_json::from_value(serde_json::json!({"title": "Bare"})).unwrap();
        let draft = dto.into_draft("et");
        assert!(draft.questions.is_empty());
        assert!(draft.cover_image.is_none());
        assert!(!draft.is_active);
    }
}
