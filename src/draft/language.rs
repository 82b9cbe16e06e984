//! Policy over the [`DraftStore`](super::store::DraftStore) for which
//! language is being edited: the per-language status summary, the
//! unsaved-changes warning on switching, and creating new translations.

use std::collections::BTreeSet;

use super::store::DraftStore;
use super::SUPPORTED_LANGUAGES;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageStatus {
    pub code: String,
    pub label: String,
    pub has_translation: bool,
    pub is_active: bool,
    pub is_dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchOutcome {
    Switched,
    /// The active draft has unsaved edits and the user has not been warned
    /// about leaving `from` yet. The caller must confirm before switching.
    NeedsConfirmation { from: String },
}

#[derive(Debug, Clone, Default)]
pub struct LanguageSwitchCoordinator {
    /// Languages the user has already been warned about leaving dirty.
    /// Lives for the editor session, so declining and later accepting a
    /// switch away from the same language does not prompt twice.
    warned: BTreeSet<String>,
}

impl LanguageSwitchCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// One entry per supported language, whether or not it has a draft yet.
    pub fn language_statuses(&self, store: &DraftStore) -> Vec<LanguageStatus> {
        SUPPORTED_LANGUAGES
            .iter()
            .map(|(code, label)| {
                let draft = store.get(code);
                LanguageStatus {
                    code: (*code).to_owned(),
                    label: (*label).to_owned(),
                    has_translation: draft.is_some_and(|d| d.holds_data()),
                    is_active: store.active_language() == *code,
                    is_dirty: draft.is_some_and(|d| d.is_dirty),
                }
            })
            .collect()
    }

    /// Switches the active language, unless the draft being left is dirty and
    /// this is the first attempt to leave it this session. The caller resolves
    /// `NeedsConfirmation` with [`Self::confirm_switch`] (accept) or by doing
    /// nothing (decline: active language unchanged).
    pub fn switch_to(&self, store: &mut DraftStore, language: &str) -> SwitchOutcome {
        let active = store.active_language().to_owned();
        if active == language {
            return SwitchOutcome::Switched;
        }
        if store.is_dirty(&active) && !self.warned.contains(&active) {
            return SwitchOutcome::NeedsConfirmation { from: active };
        }
        store.activate(language);
        SwitchOutcome::Switched
    }

    /// Accepts a pending switch: remembers that the user was warned about the
    /// language being left, then switches. Nothing is saved or reset.
    pub fn confirm_switch(&mut self, store: &mut DraftStore, language: &str) {
        self.warned.insert(store.active_language().to_owned());
        store.activate(language);
    }

    /// Creates an empty draft for `language` and activates it immediately.
    /// Creating an empty draft cannot lose data, so no dirty check applies.
    pub fn create_translation(&self, store: &mut DraftStore, language: &str) {
        store.create_draft(language);
        store.activate(language);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_cover_all_supported_languages() {
        let mut store = DraftStore::new("en");
        store.update_active(|d| d.title = "Capitals".into());
        let coordinator = LanguageSwitchCoordinator::new();

        let statuses = coordinator.language_statuses(&store);
        assert_eq!(statuses.len(), SUPPORTED_LANGUAGES.len());

        let en = statuses.iter().find(|s| s.code == "en").unwrap();
        assert!(en.has_translation && en.is_active && en.is_dirty);

        let et = statuses.iter().find(|s| s.code == "et").unwrap();
        assert!(!et.has_translation && !et.is_active && !et.is_dirty);
    }

    #[test]
    fn switching_away_from_a_clean_draft_needs_no_confirmation() {
        let mut store = DraftStore::new("en");
        store.update_active(|d| d.title = "Capitals".into());
        store.mark_clean("en");

        let coordinator = LanguageSwitchCoordinator::new();
        assert_eq!(coordinator.switch_to(&mut store, "et"), SwitchOutcome::Switched);
        assert_eq!(store.active_language(), "et");
    }

    #[test]
    fn dirty_draft_prompts_once_per_language_per_session() {
        let mut store = DraftStore::new("en");
        store.update_active(|d| d.title = "Capitals".into());
        let mut coordinator = LanguageSwitchCoordinator::new();

        // First attempt prompts; declining leaves the active language alone.
        assert_eq!(
            coordinator.switch_to(&mut store, "et"),
            SwitchOutcome::NeedsConfirmation { from: "en".into() }
        );
        assert_eq!(store.active_language(), "en");

        // Accepting switches without saving anything.
        coordinator.confirm_switch(&mut store, "et");
        assert_eq!(store.active_language(), "et");
        assert!(store.is_dirty("en"));

        // Leaving the same still-dirty language again does not re-prompt.
        coordinator.confirm_switch(&mut store, "en");
        assert_eq!(coordinator.switch_to(&mut store, "et"), SwitchOutcome::Switched);
        assert_eq!(store.active_language(), "et");
    }

    #[test]
    fn switching_to_the_active_language_is_a_noop() {
        let mut store = DraftStore::new("en");
        store.update_active(|d| d.title = "Capitals".into());
        let coordinator = LanguageSwitchCoordinator::new();
        assert_eq!(coordinator.switch_to(&mut store, "en"), SwitchOutcome::Switched);
        assert_eq!(store.active_language(), "en");
    }

    #[test]
    fn create_translation_switches_immediately() {
        let mut store = DraftStore::new("en");
        store.update_active(|d| d.title = "Capitals".into());
        let coordinator = LanguageSwitchCoordinator::new();

        coordinator.create_translation(&mut store, "fi");
        assert_eq!(store.active_language(), "fi");
        assert!(store.is_dirty("fi"));
        assert!(!store.get("fi").unwrap().has_saved_translation);
    }
}
