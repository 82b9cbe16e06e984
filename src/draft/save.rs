//! Save policy and serialization: decide which languages a save covers,
//! assemble the outbound translations payload, and feed the backend's
//! per-language result back into the dirty flags.

use std::collections::BTreeMap;

use serde::Serialize;

use super::store::DraftStore;
use super::{CoverImage, Draft, Question};

/// Outcome of [`plan_save`]. `ChooseScope` means some language other than the
/// active one has unsaved edits and the caller must ask the user whether to
/// save everything or only the active language. Pure decision, no prompt here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SavePlan {
    ActiveOnly(String),
    ChooseScope {
        active: String,
        dirty_others: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveScope {
    ActiveOnly,
    AllDirty,
}

pub fn plan_save(store: &DraftStore) -> SavePlan {
    let active = store.active_language().to_owned();
    let dirty_others: Vec<String> = store
        .dirty_languages()
        .into_iter()
        .filter(|code| *code != active)
        .collect();
    if dirty_others.is_empty() {
        SavePlan::ActiveOnly(active)
    } else {
        SavePlan::ChooseScope { active, dirty_others }
    }
}

/// The languages a chosen scope covers. The active language is always
/// included: a first save of a clean-looking template is still a save.
pub fn scope_languages(store: &DraftStore, scope: SaveScope) -> Vec<String> {
    let active = store.active_language().to_owned();
    match scope {
        SaveScope::ActiveOnly => vec![active],
        SaveScope::AllDirty => {
            let mut languages = store.dirty_languages();
            if !languages.contains(&active) {
                languages.push(active);
                languages.sort();
            }
            languages
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AnswerPayload {
    pub id: Option<i64>,
    pub text: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct QuestionPayload {
    /// Server id for persisted questions, `null` for questions created this
    /// session. The backend keys insert-vs-update off this field.
    pub id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub answers: Vec<AnswerPayload>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TranslationPayload {
    pub language_code: String,
    pub title: String,
    pub description: String,
    pub is_active: bool,
    pub questions: Vec<QuestionPayload>,
    pub modules: Vec<i64>,
    pub tags: Vec<i64>,
    /// URL of an already persisted cover. Absent when a fresh image is being
    /// uploaded as a binary attachment instead; never both.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
}

/// A locally selected cover image going out as a multipart file part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverAttachment {
    pub language_code: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavePayload {
    pub translations: BTreeMap<String, TranslationPayload>,
    pub covers: Vec<CoverAttachment>,
    /// Draft revisions at snapshot time, per language. Lets the result
    /// handler tell apart "clean now" from "edited while the save was in
    /// flight".
    pub revisions: BTreeMap<String, u64>,
}

impl SavePayload {
    pub fn translations_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.translations)
    }
}

fn question_payload(question: &Question) -> QuestionPayload {
    QuestionPayload {
        id: question.id.server_id(),
        title: question.title.clone(),
        description: question.description.clone(),
        answers: question
            .options
            .iter()
            .map(|option| AnswerPayload {
                id: option.server_id,
                text: option.text.clone(),
                is_correct: option.is_correct,
            })
            .collect(),
    }
}

fn translation_payload(draft: &Draft) -> (TranslationPayload, Option<CoverAttachment>) {
    let (cover_url, attachment) = match &draft.cover_image {
        Some(CoverImage::Stored(url)) => (Some(url.clone()), None),
        Some(CoverImage::Pending { file_name, bytes }) => (
            None,
            Some(CoverAttachment {
                language_code: draft.language_code.clone(),
                file_name: file_name.clone(),
                bytes: bytes.clone(),
            }),
        ),
        None => (None, None),
    };
    let payload = TranslationPayload {
        language_code: draft.language_code.clone(),
        title: draft.title.clone(),
        description: draft.description.clone(),
        is_active: draft.is_active,
        questions: draft.questions.iter().map(question_payload).collect(),
        modules: draft.modules.iter().copied().collect(),
        tags: draft.tags.iter().copied().collect(),
        cover_url,
    };
    (payload, attachment)
}

/// Snapshots the drafts for `languages` into the request shape. Edits made
/// after this call are not part of the request and stay dirty. A language
/// without a draft serializes as its empty template.
pub fn build_payload(store: &DraftStore, languages: &[String]) -> SavePayload {
    let mut translations = BTreeMap::new();
    let mut covers = Vec::new();
    let mut revisions = BTreeMap::new();
    for language in languages {
        let template;
        let draft = match store.get(language) {
            Some(draft) => draft,
            None => {
                template = Draft::empty(language.clone());
                &template
            }
        };
        let (payload, attachment) = translation_payload(draft);
        translations.insert(language.clone(), payload);
        covers.extend(attachment);
        revisions.insert(language.clone(), draft.revision);
    }
    SavePayload {
        translations,
        covers,
        revisions,
    }
}

/// Per-language result of a save request as reported by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveOutcome {
    pub saved: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl SaveOutcome {
    pub fn all_saved(languages: &[String]) -> Self {
        Self {
            saved: languages.to_vec(),
            failed: Vec::new(),
        }
    }
}

/// Marks clean exactly the languages the backend confirmed, and only when the
/// draft was not edited after the payload snapshot. Failed languages keep
/// their dirty flag so the user can retry without losing anything.
pub fn apply_save_result(store: &mut DraftStore, payload: &SavePayload, outcome: &SaveOutcome) {
    for language in &outcome.saved {
        match payload.revisions.get(language) {
            Some(revision) => store.confirm_saved(language, *revision),
            None => store.mark_clean(language),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::AnswerOption;

    fn store_with_two_languages() -> DraftStore {
        let mut store = DraftStore::new("en");
        store.update_active(|d| d.title = "Capitals".into());
        store.create_draft("et");
        store
    }

    #[test]
    fn plan_is_active_only_when_no_sibling_is_dirty() {
        let mut store = DraftStore::new("en");
        store.update_active(|d| d.title = "Capitals".into());
        assert_eq!(plan_save(&store), SavePlan::ActiveOnly("en".into()));
    }

    #[test]
    fn plan_asks_for_scope_when_a_sibling_is_dirty() {
        let store = store_with_two_languages();
        assert_eq!(
            plan_save(&store),
            SavePlan::ChooseScope {
                active: "en".into(),
                dirty_others: vec!["et".into()],
            }
        );
    }

    #[test]
    fn scope_languages_always_include_the_active_one() {
        let mut store = store_with_two_languages();
        store.mark_clean("en");
        assert_eq!(scope_languages(&store, SaveScope::ActiveOnly), ["en"]);
        assert_eq!(scope_languages(&store, SaveScope::AllDirty), ["en", "et"]);
    }

    #[test]
    fn pending_question_ids_serialize_as_null() {
        let mut store = DraftStore::new("en");
        store.update_active(|d| {
            let id = d.add_question_with_options(0);
            let question = d.question_mut(id).unwrap();
            question.title = "Capital of Estonia?".into();
            question.options.push(AnswerOption {
                server_id: Some(7),
                text: "Tallinn".into(),
                is_correct: true,
            });
            question.options.push(AnswerOption {
                server_id: None,
                text: "Tartu".into(),
                is_correct: false,
            });
        });

        let payload = build_payload(&store, &["en".into()]);
        let json: serde_json::Value =
            serde_json::from_str(&payload.translations_json().unwrap()).unwrap();
        let question = &json["en"]["questions"][0];
        assert!(question["id"].is_null());
        assert_eq!(question["answers"][0]["id"], 7);
        assert!(question["answers"][1]["id"].is_null());
        assert_eq!(question["answers"][0]["is_correct"], true);
    }

    #[test]
    fn empty_never_edited_draft_serializes_cleanly() {
        let mut store = DraftStore::new("en");
        store.create_draft("fi");

        let payload = build_payload(&store, &["fi".into()]);
        let translation = &payload.translations["fi"];
        assert!(translation.questions.is_empty());
        assert_eq!(translation.title, "");
        assert_eq!(translation.description, "");
        assert!(payload.covers.is_empty());
    }

    #[test]
    fn cover_is_either_url_or_attachment_never_both() {
        let mut store = DraftStore::new("en");
        store.update_active(|d| {
            d.cover_image = Some(CoverImage::Stored("https://cdn.example/cover.png".into()))
        });
        let payload = build_payload(&store, &["en".into()]);
        assert_eq!(
            payload.translations["en"].cover_url.as_deref(),
            Some("https://cdn.example/cover.png")
        );
        assert!(payload.covers.is_empty());

        store.update_active(|d| {
            d.cover_image = Some(CoverImage::Pending {
                file_name: "cover.png".into(),
                bytes: vec![1, 2, 3],
            })
        });
        let payload = build_payload(&store, &["en".into()]);
        assert!(payload.translations["en"].cover_url.is_none());
        assert_eq!(payload.covers.len(), 1);
        assert_eq!(payload.covers[0].file_name, "cover.png");
    }

    #[test]
    fn edits_during_an_inflight_save_stay_dirty() {
        let mut store = DraftStore::new("en");
        store.update_active(|d| d.title = "Before".into());
        let payload = build_payload(&store, &["en".into()]);
        store.update_active(|d| d.title = "After".into());
        assert_eq!(payload.translations["en"].title, "Before");

        // The save succeeded, but it persisted the pre-edit snapshot: the
        // draft is recorded as saved yet remains dirty.
        apply_save_result(&mut store, &payload, &SaveOutcome::all_saved(&["en".into()]));
        assert!(store.is_dirty("en"));
        assert!(store.get("en").unwrap().has_saved_translation);
    }

    #[test]
    fn successful_save_without_interleaved_edits_cleans_the_draft() {
        let mut store = DraftStore::new("en");
        store.update_active(|d| d.title = "Capitals".into());
        let payload = build_payload(&store, &["en".into()]);
        apply_save_result(&mut store, &payload, &SaveOutcome::all_saved(&["en".into()]));
        assert!(!store.is_dirty("en"));
    }

    #[test]
    fn partial_failure_keeps_failed_languages_dirty() {
        let mut store = store_with_two_languages();
        let payload = build_payload(&store, &["en".into(), "et".into()]);
        let outcome = SaveOutcome {
            saved: vec!["en".into()],
            failed: vec![("et".into(), "validation failed".into())],
        };
        apply_save_result(&mut store, &payload, &outcome);
        assert!(!store.is_dirty("en"));
        assert!(store.is_dirty("et"));
        assert!(store.get("en").unwrap().has_saved_translation);
        assert!(!store.get("et").unwrap().has_saved_translation);
    }
}
