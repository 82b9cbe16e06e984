//! Single source of truth for the editor session: one draft per language
//! code, plus the currently active language. All dirtiness tracking funnels
//! through [`DraftStore::update_active`].

use std::borrow::Cow;
use std::collections::BTreeMap;

use super::Draft;

#[derive(Debug, Clone)]
pub struct DraftStore {
    drafts: BTreeMap<String, Draft>,
    active: String,
}

/// What `delete_draft` did. `QuizCleared` means the deleted language was the
/// only one holding data, the whole store was emptied and the caller must
/// leave the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    QuizCleared,
    TranslationRemoved,
}

impl DraftStore {
    /// An empty store activated on `language`. No draft exists yet; the
    /// active draft is served as a template until the first edit.
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            drafts: BTreeMap::new(),
            active: language.into(),
        }
    }

    /// A store pre-populated from persisted translations, all clean.
    pub fn from_translations(drafts: BTreeMap<String, Draft>, active: impl Into<String>) -> Self {
        let active = active.into();
        let active = if drafts.contains_key(&active) {
            active
        } else {
            drafts.keys().next().cloned().unwrap_or(active)
        };
        Self { drafts, active }
    }

    pub fn active_language(&self) -> &str {
        &self.active
    }

    pub fn get(&self, language: &str) -> Option<&Draft> {
        self.drafts.get(language)
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.drafts.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    /// The active language's draft, or a fresh template when that language
    /// has not been edited yet. Never absent, so callers need no `None` arm.
    pub fn active_draft(&self) -> Cow<'_, Draft> {
        match self.drafts.get(&self.active) {
            Some(draft) => Cow::Borrowed(draft),
            None => Cow::Owned(Draft::empty(self.active.clone())),
        }
    }

    /// Applies `f` to the active draft, materializing the template entry if
    /// needed, and unconditionally marks it dirty. This is the only way a
    /// draft becomes dirty.
    pub fn update_active<T>(&mut self, f: impl FnOnce(&mut Draft) -> T) -> T {
        let draft = self
            .drafts
            .entry(self.active.clone())
            .or_insert_with(|| Draft::empty(self.active.clone()));
        let result = f(draft);
        draft.is_dirty = true;
        draft.revision += 1;
        result
    }

    /// Inserts a fresh empty draft for `language`. Returns false (and changes
    /// nothing) when a draft for that code already exists.
    pub fn create_draft(&mut self, language: &str) -> bool {
        if self.drafts.contains_key(language) {
            return false;
        }
        let mut draft = Draft::empty(language);
        draft.is_dirty = true;
        self.drafts.insert(language.to_owned(), draft);
        true
    }

    /// Removes one language's draft. When no other language holds data this
    /// is a whole-quiz deletion: the store is cleared and the caller is told
    /// to navigate away.
    pub fn delete_draft(&mut self, language: &str) -> DeleteOutcome {
        let siblings_hold_data = self
            .drafts
            .iter()
            .any(|(code, draft)| code != language && draft.holds_data());

        if !siblings_hold_data {
            self.drafts.clear();
            return DeleteOutcome::QuizCleared;
        }

        self.drafts.remove(language);
        if self.active == language {
            if let Some(first) = self.drafts.keys().next() {
                self.active = first.clone();
            }
        }
        DeleteOutcome::TranslationRemoved
    }

    /// Confirms a successful save of one language. Per-language so a partial
    /// multi-language save leaves failed languages dirty.
    pub fn mark_clean(&mut self, language: &str) {
        if let Some(draft) = self.drafts.get_mut(language) {
            draft.is_dirty = false;
            draft.has_saved_translation = true;
        }
    }

    /// Confirms a save whose payload snapshotted the draft at `revision`.
    /// The translation is recorded as persisted either way, but the dirty
    /// flag only clears when no edit landed while the request was in flight.
    pub fn confirm_saved(&mut self, language: &str, revision: u64) {
        if let Some(draft) = self.drafts.get_mut(language) {
            draft.has_saved_translation = true;
            if draft.revision == revision {
                draft.is_dirty = false;
            }
        }
    }

    pub fn is_dirty(&self, language: &str) -> bool {
        self.drafts.get(language).is_some_and(|d| d.is_dirty)
    }

    pub fn dirty_languages(&self) -> Vec<String> {
        self.drafts
            .iter()
            .filter(|(_, draft)| draft.is_dirty)
            .map(|(code, _)| code.clone())
            .collect()
    }

    pub(crate) fn activate(&mut self, language: &str) {
        self.active = language.to_owned();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_draft_is_never_absent() {
        let store = DraftStore::new("en");
        let draft = store.active_draft();
        assert_eq!(draft.language_code, "en");
        assert!(!draft.is_dirty);
        assert!(store.is_empty());
    }

    #[test]
    fn any_update_marks_dirty_even_without_change() {
        let mut store = DraftStore::new("en");
        store.update_active(|d| d.title = "Capitals".into());
        assert!(store.is_dirty("en"));

        store.mark_clean("en");
        assert!(!store.is_dirty("en"));

        // Writing the identical value still dirties the draft.
        store.update_active(|d| d.title = "Capitals".into());
        assert!(store.is_dirty("en"));
    }

    #[test]
    fn create_draft_is_a_noop_when_present() {
        let mut store = DraftStore::new("en");
        assert!(store.create_draft("et"));
        store.mark_clean("et");
        assert!(!store.create_draft("et"));
        // The existing draft was not replaced.
        assert!(!store.is_dirty("et"));
    }

    #[test]
    fn fresh_draft_starts_dirty_and_unsaved() {
        let mut store = DraftStore::new("en");
        store.create_draft("fi");
        let draft = store.get("fi").unwrap();
        assert!(draft.is_dirty);
        assert!(!draft.has_saved_translation);
    }

    #[test]
    fn deleting_the_only_data_holding_language_clears_the_store() {
        let mut store = DraftStore::new("en");
        store.update_active(|d| d.title = "Capitals".into());
        // A sibling tab was opened but never got content.
        store.create_draft("et");

        assert_eq!(store.delete_draft("en"), DeleteOutcome::QuizCleared);
        assert!(store.is_empty());
    }

    #[test]
    fn deleting_a_language_with_saved_siblings_removes_only_it() {
        let mut store = DraftStore::new("en");
        store.update_active(|d| d.title = "Capitals".into());
        store.mark_clean("en");
        store.create_draft("et");

        assert_eq!(store.delete_draft("et"), DeleteOutcome::TranslationRemoved);
        assert_eq!(store.get("en").unwrap().title, "Capitals");
        assert!(store.get("et").is_none());
    }

    #[test]
    fn deleting_the_active_language_falls_back_to_first_remaining() {
        let mut store = DraftStore::new("et");
        store.update_active(|d| d.title = "Pealinnad".into());
        store.create_draft("en");
        store.update_active(|_| {});
        store.mark_clean("en");

        store.activate("et");
        assert_eq!(store.delete_draft("et"), DeleteOutcome::TranslationRemoved);
        assert_eq!(store.active_language(), "en");
    }

    #[test]
    fn mark_clean_only_touches_the_named_language() {
        let mut store = DraftStore::new("en");
        store.update_active(|d| d.title = "A".into());
        store.create_draft("et");

        store.mark_clean("en");
        assert!(!store.is_dirty("en"));
        assert!(store.is_dirty("et"));
        assert_eq!(store.dirty_languages(), vec!["et".to_string()]);
    }

    #[test]
    fn from_translations_falls_back_when_preferred_language_missing() {
        let mut drafts = BTreeMap::new();
        drafts.insert("et".to_string(), Draft::empty("et"));
        let store = DraftStore::from_translations(drafts, "en");
        assert_eq!(store.active_language(), "et");
    }
}
