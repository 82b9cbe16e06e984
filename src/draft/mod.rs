use std::collections::BTreeSet;
use std::fmt;

use uuid::Uuid;

pub mod language;
pub mod questions;
pub mod save;
pub mod store;

/// Languages a quiz can be authored in, as `(code, label)` pairs.
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("et", "Estonian"),
    ("fi", "Finnish"),
    ("ru", "Russian"),
];

pub fn language_label(code: &str) -> Option<&'static str> {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
}

pub fn language_by_label(label: &str) -> Option<&'static str> {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(_, l)| *l == label)
        .map(|(c, _)| *c)
}

/// Question identity as the backend sees it: a persisted question carries the
/// server-assigned id and is updated in place; a pending question was created
/// in this editor session and is serialized with a null id so the backend
/// inserts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionId {
    Persisted(i64),
    Pending(Uuid),
}

impl QuestionId {
    pub fn fresh() -> Self {
        Self::Pending(Uuid::new_v4())
    }

    pub fn server_id(&self) -> Option<i64> {
        match self {
            Self::Persisted(id) => Some(*id),
            Self::Pending(_) => None,
        }
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Persisted(id) => write!(f, "#{}", id),
            Self::Pending(token) => write!(f, "new:{}", token),
        }
    }
}

/// One answer option. `server_id` is `None` for options added in this session
/// and not yet persisted; correctness lives on the record so it always travels
/// with its option through reorders and deletions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerOption {
    pub server_id: Option<i64>,
    pub text: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: QuestionId,
    pub title: String,
    pub description: Option<String>,
    pub options: Vec<AnswerOption>,
}

/// A quiz cover image is either bytes picked in this session and not yet
/// uploaded, or the URL of a previously persisted image. Never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverImage {
    Pending { file_name: String, bytes: Vec<u8> },
    Stored(String),
}

/// One language's quiz variant as edited in the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub language_code: String,
    pub title: String,
    pub description: String,
    pub questions: Vec<Question>,
    pub is_active: bool,
    pub cover_image: Option<CoverImage>,
    pub modules: BTreeSet<i64>,
    pub tags: BTreeSet<i64>,
    pub has_saved_translation: bool,
    pub is_dirty: bool,
    /// Bumped on every edit; save results only clear the dirty flag when the
    /// draft is still at the revision the payload snapshotted.
    pub revision: u64,
}

impl Draft {
    pub fn empty(language_code: impl Into<String>) -> Self {
        Self {
            language_code: language_code.into(),
            title: String::new(),
            description: String::new(),
            questions: Vec::new(),
            is_active: false,
            cover_image: None,
            modules: BTreeSet::new(),
            tags: BTreeSet::new(),
            has_saved_translation: false,
            is_dirty: false,
            revision: 0,
        }
    }

    /// A draft holds data once it has a title, any questions, or has ever been
    /// persisted. Drives the delete-last-language semantics.
    pub fn holds_data(&self) -> bool {
        !self.title.is_empty() || !self.questions.is_empty() || self.has_saved_translation
    }

    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn question_mut(&mut self, id: QuestionId) -> Option<&mut Question> {
        self.questions.iter_mut().find(|q| q.id == id)
    }
}

impl fmt::Display for Draft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "<b>{}</b> [{}]{}",
            if self.title.is_empty() { "(untitled)" } else { &self.title },
            self.language_code,
            if self.is_active { "" } else { " (hidden)" },
        )?;
        if !self.description.is_empty() {
            writeln!(f, "<i>{}</i>", self.description)?;
        }
        for (i, question) in self.questions.iter().enumerate() {
            writeln!(f, "{}. {}", i + 1, question)?;
        }
        Ok(())
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", if self.title.is_empty() { "(untitled question)" } else { &self.title })?;
        if let Some(description) = &self.description {
            write!(f, " — {}", description)?;
        }
        for option in &self.options {
            write!(f, "\n  {}", option)?;
        }
        Ok(())
    }
}

impl fmt::Display for AnswerOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({})",
            if self.text.is_empty() { "(empty)" } else { &self.text },
            if self.is_correct { 'V' } else { 'X' }
        )
    }
}
