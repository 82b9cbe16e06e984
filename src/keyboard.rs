use dotenvy::dotenv;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup};

use crate::api::dto::QuizSummary;
use crate::draft::language::LanguageStatus;
use crate::draft::{AnswerOption, Question, SUPPORTED_LANGUAGES};

pub(crate) fn yes_no_keyboard() -> KeyboardMarkup {
    let keyboard: Vec<Vec<KeyboardButton>> = vec![vec![
        KeyboardButton::new("Yes✔️"),
        KeyboardButton::new("No❌"),
    ]];

    KeyboardMarkup::new(keyboard)
}

pub(crate) fn answers_keyboard(options: &[AnswerOption]) -> InlineKeyboardMarkup {
    let keyboard: Vec<Vec<InlineKeyboardButton>> = options
        .iter()
        .filter(|option| !option.text.is_empty())
        .map(|option| vec![InlineKeyboardButton::callback(&option.text, &option.text)])
        .collect();

    InlineKeyboardMarkup::new(keyboard)
}

pub(crate) fn quizes_keyboard(quizes: &[QuizSummary]) -> KeyboardMarkup {
    let keyboard = quizes
        .iter()
        .map(|quiz| vec![KeyboardButton::new(&quiz.title)]);

    KeyboardMarkup::new(keyboard)
}

/// One button per question, numbered so duplicate titles stay selectable.
pub(crate) fn questions_keyboard(questions: &[Question]) -> KeyboardMarkup {
    let keyboard = questions.iter().enumerate().map(|(i, question)| {
        let title = if question.title.is_empty() {
            "(untitled question)"
        } else {
            &question.title
        };
        vec![KeyboardButton::new(format!("{}. {}", i + 1, title))]
    });

    KeyboardMarkup::new(keyboard)
}

pub(crate) fn options_keyboard(options: &[AnswerOption]) -> KeyboardMarkup {
    let keyboard = options
        .iter()
        .enumerate()
        .map(|(i, option)| vec![KeyboardButton::new(format!("{}. {}", i + 1, option))]);

    KeyboardMarkup::new(keyboard)
}

/// All supported languages, by label. Used when creating a quiz or adding a
/// translation.
pub(crate) fn supported_languages_keyboard() -> KeyboardMarkup {
    let keyboard = SUPPORTED_LANGUAGES
        .iter()
        .map(|(_, label)| vec![KeyboardButton::new(*label)]);

    KeyboardMarkup::new(keyboard)
}

pub(crate) fn language_statuses_keyboard(statuses: &[LanguageStatus]) -> KeyboardMarkup {
    let keyboard = statuses
        .iter()
        .map(|status| vec![KeyboardButton::new(&status.label)]);

    KeyboardMarkup::new(keyboard)
}

/// Only languages that already have a draft in this session.
pub(crate) fn existing_translations_keyboard(statuses: &[LanguageStatus]) -> KeyboardMarkup {
    let keyboard = statuses
        .iter()
        .filter(|status| status.has_translation || status.is_dirty)
        .map(|status| vec![KeyboardButton::new(&status.label)]);

    KeyboardMarkup::new(keyboard)
}

pub(crate) fn action_keyboard(username: impl Into<String>) -> KeyboardMarkup {
    dotenv().ok();

    let admin = std::env::var("ADMIN_NAME").unwrap_or_default();

    let mut keyboard = vec![vec![KeyboardButton::new("Take a quiz📝")]];

    if username.into() == admin {
        keyboard.push(vec![KeyboardButton::new("Create a new quiz🏗️")]);
        keyboard.push(vec![KeyboardButton::new("Edit an existing quiz✏️️")]);
    }

    KeyboardMarkup::new(keyboard)
}

pub(crate) fn edit_quiz_keyboard() -> KeyboardMarkup {
    let keyboard = vec![
        vec![
            KeyboardButton::new("Edit title"),
            KeyboardButton::new("Edit description"),
        ],
        vec![
            KeyboardButton::new("Toggle visibility"),
            KeyboardButton::new("Cover image"),
        ],
        vec![
            KeyboardButton::new("Edit tags"),
            KeyboardButton::new("Edit modules"),
        ],
        vec![
            KeyboardButton::new("Add question"),
            KeyboardButton::new("Edit question"),
        ],
        vec![
            KeyboardButton::new("Languages🌐"),
            KeyboardButton::new("Save💾"),
        ],
        vec![KeyboardButton::new("Delete quiz🗑️")],
    ];

    KeyboardMarkup::new(keyboard)
}

pub(crate) fn edit_question_keyboard() -> KeyboardMarkup {
    let keyboard = vec![
        vec![
            KeyboardButton::new("Edit title"),
            KeyboardButton::new("Edit description"),
        ],
        vec![
            KeyboardButton::new("Toggle description"),
            KeyboardButton::new("Add option"),
        ],
        vec![
            KeyboardButton::new("Edit option"),
            KeyboardButton::new("Move up"),
        ],
        vec![
            KeyboardButton::new("Move down"),
            KeyboardButton::new("Move to…"),
        ],
        vec![KeyboardButton::new("Delete question🗑️")],
    ];

    KeyboardMarkup::new(keyboard)
}

pub(crate) fn edit_option_keyboard() -> KeyboardMarkup {
    let keyboard = vec![
        vec![
            KeyboardButton::new("Edit text"),
            KeyboardButton::new("Toggle correct"),
        ],
        vec![
            KeyboardButton::new("Move to…"),
            KeyboardButton::new("Delete option"),
        ],
    ];

    KeyboardMarkup::new(keyboard)
}

pub(crate) fn languages_menu_keyboard() -> KeyboardMarkup {
    let keyboard = vec![
        vec![
            KeyboardButton::new("Switch language"),
            KeyboardButton::new("Add translation"),
        ],
        vec![KeyboardButton::new("Delete translation🗑️")],
    ];

    KeyboardMarkup::new(keyboard)
}

pub(crate) fn save_scope_keyboard() -> KeyboardMarkup {
    let keyboard = vec![
        vec![KeyboardButton::new("Active language only")],
        vec![KeyboardButton::new("All changed languages")],
    ];

    KeyboardMarkup::new(keyboard)
}
