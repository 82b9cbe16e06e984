use crate::api::dto::QuizSummary;
use crate::draft::language::LanguageSwitchCoordinator;
use crate::draft::store::DraftStore;
use crate::draft::{Draft, QuestionId};

/// Everything one editing session owns: the draft map, the language-switch
/// policy state, and the save-in-flight guard. Carried through the dialogue
/// states while a quiz is being edited; dropped on exit without saving.
#[derive(Debug, Clone)]
pub struct EditorSession {
    /// Present when editing a persisted quiz; absent until the first save of
    /// a new one.
    pub quiz_id: Option<i64>,
    pub owner: String,
    pub store: DraftStore,
    pub coordinator: LanguageSwitchCoordinator,
    pub save_in_flight: bool,
}

impl EditorSession {
    pub fn new_quiz(owner: impl Into<String>, language: &str) -> Self {
        let mut store = DraftStore::new(language);
        store.create_draft(language);
        Self {
            quiz_id: None,
            owner: owner.into(),
            store,
            coordinator: LanguageSwitchCoordinator::new(),
            save_in_flight: false,
        }
    }

    pub fn existing_quiz(quiz_id: i64, owner: impl Into<String>, store: DraftStore) -> Self {
        Self {
            quiz_id: Some(quiz_id),
            owner: owner.into(),
            store,
            coordinator: LanguageSwitchCoordinator::new(),
            save_in_flight: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub enum QuizState {
    #[default]
    Start,

    // PART FOR --- CREATING QUIZ ---
    ReceiveQuizLanguage,
    ReceiveQuizTitle {
        session: EditorSession,
    },
    ReceiveQuizDescription {
        session: EditorSession,
    },

    // PART FOR --- EDITING ---
    SelectQuiz {
        quizzes: Vec<QuizSummary>,
    },
    HandleQuiz {
        session: EditorSession,
    },
    EditTitle {
        session: EditorSession,
    },
    EditDescription {
        session: EditorSession,
    },
    EditTags {
        session: EditorSession,
    },
    EditModules {
        session: EditorSession,
    },
    EditCover {
        session: EditorSession,
    },
    SelectQuestion {
        session: EditorSession,
    },
    HandleQuestion {
        session: EditorSession,
        question_id: QuestionId,
    },
    EditQuestionTitle {
        session: EditorSession,
        question_id: QuestionId,
    },
    EditQuestionDescription {
        session: EditorSession,
        question_id: QuestionId,
    },
    MoveQuestionTo {
        session: EditorSession,
        question_id: QuestionId,
    },
    SelectOption {
        session: EditorSession,
        question_id: QuestionId,
    },
    HandleOption {
        session: EditorSession,
        question_id: QuestionId,
        option_index: usize,
    },
    EditOptionText {
        session: EditorSession,
        question_id: QuestionId,
        option_index: usize,
    },
    MoveOptionTo {
        session: EditorSession,
        question_id: QuestionId,
        option_index: usize,
    },

    // PART FOR --- LANGUAGES ---
    HandleLanguages {
        session: EditorSession,
    },
    SelectLanguageToSwitch {
        session: EditorSession,
    },
    ConfirmLanguageSwitch {
        session: EditorSession,
        target: String,
    },
    SelectNewTranslation {
        session: EditorSession,
    },
    SelectTranslationToDelete {
        session: EditorSession,
    },
    ConfirmDeleteTranslation {
        session: EditorSession,
        target: String,
    },
    ConfirmDeleteQuiz {
        session: EditorSession,
    },

    // PART FOR --- SAVING ---
    ChooseSaveScope {
        session: EditorSession,
    },

    // PART FOR --- RUNNING QUIZ ---
    SelectQuizToTake {
        quizzes: Vec<QuizSummary>,
    },
    SelectRunLanguage {
        quiz_id: i64,
        languages: Vec<String>,
    },
    ReadyToRun {
        quiz: Draft,
        curr_idx: usize,
    },
    Running {
        quiz: Draft,
        curr_idx: usize,
        score: u32,
    },
}
