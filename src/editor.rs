//! Quiz-level editing handlers: field edits on the active draft, the
//! language menu (switch / add / delete translations), and the save flow.
//! Every mutation goes through `DraftStore::update_active`, so dirtiness
//! tracking never depends on the individual handler remembering it.

use std::collections::BTreeSet;
use std::sync::Arc;

use teloxide::net::Download;
use teloxide::types::ChatId;
use teloxide::{payloads::SendMessageSetters, prelude::Requester, types::Message, Bot};
use tracing::instrument;
use url::Url;

use crate::api::dto::QuizSummary;
use crate::api::{DeleteQuiz, FetchQuiz, SaveQuiz};
use crate::draft::language::SwitchOutcome;
use crate::draft::save::{self, SaveScope};
use crate::draft::store::{DeleteOutcome, DraftStore};
use crate::draft::{language_by_label, language_label, CoverImage, SUPPORTED_LANGUAGES};
use crate::keyboard::{
    self, action_keyboard, edit_quiz_keyboard, languages_menu_keyboard, save_scope_keyboard,
    yes_no_keyboard,
};
use crate::state::{EditorSession, QuizState};
use crate::{HandlerResult, UserDialogue};

fn all_language_codes() -> Vec<String> {
    SUPPORTED_LANGUAGES
        .iter()
        .map(|(code, _)| (*code).to_owned())
        .collect()
}

async fn show_hub(bot: &Bot, chat: ChatId, session: &EditorSession) -> HandlerResult {
    let draft = session.store.active_draft();
    bot.send_message(
        chat,
        format!(
            "Editing [{}]\n{}",
            session.store.active_language(),
            draft
        ),
    )
    .reply_markup(edit_quiz_keyboard())
    .await?;
    Ok(())
}

#[instrument(level = "info", skip(connection, bot, dialogue, quizzes))]
pub(crate) async fn select_quiz<Connect: FetchQuiz>(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    quizzes: Vec<QuizSummary>,
    connection: Arc<Connect>,
) -> HandlerResult {
    match msg.text() {
        Some(title) => match quizzes.iter().find(|quiz| quiz.title == title) {
            Some(summary) => {
                let languages = if summary.languages.is_empty() {
                    all_language_codes()
                } else {
                    summary.languages.clone()
                };
                match connection.fetch_editor_data(summary.id, &languages).await {
                    Ok(translations) => {
                        let active = languages[0].clone();
                        let store = DraftStore::from_translations(translations, active);
                        let session = EditorSession::existing_quiz(
                            summary.id,
                            msg.chat.username().unwrap_or("anonymous"),
                            store,
                        );
                        bot.send_message(
                            msg.chat.id,
                            format!("Quiz '{}' loaded. Please, select an action:", summary.title),
                        )
                        .await?;
                        show_hub(&bot, msg.chat.id, &session).await?;
                        dialogue.update(QuizState::HandleQuiz { session }).await?;
                    }
                    Err(e) => {
                        log::error!("Failed to load quiz '{}': {}", title, e);
                        bot.send_message(msg.chat.id, format!("Failed to load quiz: {}", e))
                            .await?;
                    }
                }
            }
            None => {
                bot.send_message(msg.chat.id, format!("Quiz '{}' not found. Try again.", title))
                    .await?;
            }
        },
        None => {
            bot.send_message(msg.chat.id, "Please, select a quiz.").await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(connection, bot, dialogue, session))]
pub(crate) async fn handle_quiz<Connect: SaveQuiz>(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    mut session: EditorSession,
    connection: Arc<Connect>,
) -> HandlerResult {
    match msg.text() {
        Some("/back") => {
            bot.send_message(msg.chat.id, "Leaving the editor. Unsaved edits are discarded.")
                .reply_markup(action_keyboard(msg.chat.username().unwrap_or_default()))
                .await?;
            dialogue.update(QuizState::Start).await?;
        }
        Some("Edit title") => {
            bot.send_message(msg.chat.id, "What's the new quiz title?").await?;
            dialogue.update(QuizState::EditTitle { session }).await?;
        }
        Some("Edit description") => {
            bot.send_message(msg.chat.id, "What's the new quiz description?")
                .await?;
            dialogue.update(QuizState::EditDescription { session }).await?;
        }
        Some("Toggle visibility") => {
            let now_active = session.store.update_active(|d| {
                d.is_active = !d.is_active;
                d.is_active
            });
            bot.send_message(
                msg.chat.id,
                if now_active {
                    "This language is now publicly visible."
                } else {
                    "This language is now hidden."
                },
            )
            .reply_markup(edit_quiz_keyboard())
            .await?;
            dialogue.update(QuizState::HandleQuiz { session }).await?;
        }
        Some("Cover image") => {
            bot.send_message(msg.chat.id, "Send a photo, or a URL of an existing image.")
                .await?;
            dialogue.update(QuizState::EditCover { session }).await?;
        }
        Some("Edit tags") => {
            bot.send_message(msg.chat.id, "Send tag ids, comma-separated (e.g. 1,4,9).")
                .await?;
            dialogue.update(QuizState::EditTags { session }).await?;
        }
        Some("Edit modules") => {
            bot.send_message(msg.chat.id, "Send module ids, comma-separated (e.g. 2,3).")
                .await?;
            dialogue.update(QuizState::EditModules { session }).await?;
        }
        Some("Add question") => {
            let question_id = session.store.update_active(|d| d.add_question());
            let draft = session.store.active_draft();
            let question = draft.question(question_id).cloned();
            bot.send_message(
                msg.chat.id,
                format!(
                    "Question added.\n{}",
                    question.map(|q| q.to_string()).unwrap_or_default()
                ),
            )
            .reply_markup(keyboard::edit_question_keyboard())
            .await?;
            dialogue
                .update(QuizState::HandleQuestion { session, question_id })
                .await?;
        }
        Some("Edit question") => {
            let draft = session.store.active_draft();
            if draft.questions.is_empty() {
                bot.send_message(msg.chat.id, "No available questions.")
                    .reply_markup(edit_quiz_keyboard())
                    .await?;
                dialogue.update(QuizState::HandleQuiz { session }).await?;
            } else {
                bot.send_message(msg.chat.id, "Choose question to edit:")
                    .reply_markup(keyboard::questions_keyboard(&draft.questions))
                    .await?;
                dialogue.update(QuizState::SelectQuestion { session }).await?;
            }
        }
        Some("Languages🌐") => {
            let statuses = session.coordinator.language_statuses(&session.store);
            let mut summary = String::from("Languages:\n");
            for status in &statuses {
                summary.push_str(&format!(
                    "{} {}{}{}\n",
                    if status.is_active { "▶" } else { "·" },
                    status.label,
                    if status.has_translation { " — translated" } else { "" },
                    if status.is_dirty { " (unsaved)" } else { "" },
                ));
            }
            bot.send_message(msg.chat.id, summary)
                .reply_markup(languages_menu_keyboard())
                .await?;
            dialogue.update(QuizState::HandleLanguages { session }).await?;
        }
        Some("Delete quiz🗑️") => {
            bot.send_message(
                msg.chat.id,
                "Delete the whole quiz, all languages included. Are you sure?",
            )
            .reply_markup(yes_no_keyboard())
            .await?;
            dialogue.update(QuizState::ConfirmDeleteQuiz { session }).await?;
        }
        Some("Save💾") => {
            if session.save_in_flight {
                bot.send_message(msg.chat.id, "A save is already in progress. Hold on.")
                    .await?;
                dialogue.update(QuizState::HandleQuiz { session }).await?;
                return Ok(());
            }
            match save::plan_save(&session.store) {
                save::SavePlan::ActiveOnly(_) => {
                    perform_save(&bot, &dialogue, msg.chat.id, session, SaveScope::ActiveOnly, connection)
                        .await?;
                }
                save::SavePlan::ChooseScope { active, dirty_others } => {
                    let labels: Vec<&str> = dirty_others
                        .iter()
                        .map(|code| language_label(code).unwrap_or(code))
                        .collect();
                    bot.send_message(
                        msg.chat.id,
                        format!(
                            "Other languages have unsaved changes too ({}). Save everything, or only {}?",
                            labels.join(", "),
                            language_label(&active).unwrap_or(&active),
                        ),
                    )
                    .reply_markup(save_scope_keyboard())
                    .await?;
                    dialogue.update(QuizState::ChooseSaveScope { session }).await?;
                }
            }
        }
        _ => {
            bot.send_message(msg.chat.id, "Invalid input. Try again.").await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn edit_title(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    mut session: EditorSession,
) -> HandlerResult {
    match msg.text() {
        Some(new_title) => {
            session.store.update_active(|d| d.title = new_title.to_owned());
            bot.send_message(msg.chat.id, "Quiz title updated.")
                .reply_markup(edit_quiz_keyboard())
                .await?;
            dialogue.update(QuizState::HandleQuiz { session }).await?;
        }
        None => {
            bot.send_message(msg.chat.id, "Nothing entered. Try again.").await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn edit_description(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    mut session: EditorSession,
) -> HandlerResult {
    match msg.text() {
        Some(new_description) => {
            session
                .store
                .update_active(|d| d.description = new_description.to_owned());
            bot.send_message(msg.chat.id, "Quiz description updated.")
                .reply_markup(edit_quiz_keyboard())
                .await?;
            dialogue.update(QuizState::HandleQuiz { session }).await?;
        }
        None => {
            bot.send_message(msg.chat.id, "Nothing entered. Try again.").await?;
        }
    }

    Ok(())
}

fn parse_id_list(text: &str) -> Option<BTreeSet<i64>> {
    text.split(',')
        .map(|part| part.trim().parse::<i64>().ok())
        .collect()
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn edit_tags(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    mut session: EditorSession,
) -> HandlerResult {
    match msg.text().and_then(parse_id_list) {
        Some(tags) => {
            session.store.update_active(|d| d.tags = tags);
            bot.send_message(msg.chat.id, "Tags updated.")
                .reply_markup(edit_quiz_keyboard())
                .await?;
            dialogue.update(QuizState::HandleQuiz { session }).await?;
        }
        None => {
            bot.send_message(msg.chat.id, "Could not parse that. Send ids like 1,4,9.")
                .await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn edit_modules(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    mut session: EditorSession,
) -> HandlerResult {
    match msg.text().and_then(parse_id_list) {
        Some(modules) => {
            session.store.update_active(|d| d.modules = modules);
            bot.send_message(msg.chat.id, "Modules updated.")
                .reply_markup(edit_quiz_keyboard())
                .await?;
            dialogue.update(QuizState::HandleQuiz { session }).await?;
        }
        None => {
            bot.send_message(msg.chat.id, "Could not parse that. Send ids like 2,3.")
                .await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn edit_cover(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    mut session: EditorSession,
) -> HandlerResult {
    if let Some(photos) = msg.photo() {
        if let Some(photo) = photos.last() {
            let file = bot.get_file(&photo.file.id).await?;
            let mut bytes = Vec::new();
            bot.download_file(&file.path, &mut bytes).await?;
            session.store.update_active(|d| {
                d.cover_image = Some(CoverImage::Pending {
                    file_name: "cover.jpg".to_owned(),
                    bytes,
                })
            });
            bot.send_message(msg.chat.id, "Cover image attached. It uploads on the next save.")
                .reply_markup(edit_quiz_keyboard())
                .await?;
            dialogue.update(QuizState::HandleQuiz { session }).await?;
            return Ok(());
        }
    }

    match msg.text().map(str::trim).filter(|t| Url::parse(t).is_ok()) {
        Some(url) => {
            session
                .store
                .update_active(|d| d.cover_image = Some(CoverImage::Stored(url.to_owned())));
            bot.send_message(msg.chat.id, "Cover image URL set.")
                .reply_markup(edit_quiz_keyboard())
                .await?;
            dialogue.update(QuizState::HandleQuiz { session }).await?;
        }
        None => {
            bot.send_message(msg.chat.id, "Send a photo or a valid image URL.")
                .await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn handle_languages(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    session: EditorSession,
) -> HandlerResult {
    let statuses = session.coordinator.language_statuses(&session.store);
    match msg.text() {
        Some("/back") => {
            show_hub(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::HandleQuiz { session }).await?;
        }
        Some("Switch language") => {
            bot.send_message(msg.chat.id, "Switch to which language?")
                .reply_markup(keyboard::language_statuses_keyboard(&statuses))
                .await?;
            dialogue
                .update(QuizState::SelectLanguageToSwitch { session })
                .await?;
        }
        Some("Add translation") => {
            bot.send_message(msg.chat.id, "Add a translation in which language?")
                .reply_markup(keyboard::supported_languages_keyboard())
                .await?;
            dialogue.update(QuizState::SelectNewTranslation { session }).await?;
        }
        Some("Delete translation🗑️") => {
            bot.send_message(msg.chat.id, "Delete which translation?")
                .reply_markup(keyboard::existing_translations_keyboard(&statuses))
                .await?;
            dialogue
                .update(QuizState::SelectTranslationToDelete { session })
                .await?;
        }
        _ => {
            bot.send_message(msg.chat.id, "Invalid input. Try again.").await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn select_language_to_switch(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    mut session: EditorSession,
) -> HandlerResult {
    match msg.text().and_then(language_by_label) {
        Some(code) => match session.coordinator.switch_to(&mut session.store, code) {
            SwitchOutcome::Switched => {
                bot.send_message(
                    msg.chat.id,
                    format!("Now editing {}.", language_label(code).unwrap_or(code)),
                )
                .await?;
                show_hub(&bot, msg.chat.id, &session).await?;
                dialogue.update(QuizState::HandleQuiz { session }).await?;
            }
            SwitchOutcome::NeedsConfirmation { from } => {
                bot.send_message(
                    msg.chat.id,
                    format!(
                        "You have unsaved changes in {}. Switch anyway? They stay in memory but are lost if you leave the editor.",
                        language_label(&from).unwrap_or(&from),
                    ),
                )
                .reply_markup(yes_no_keyboard())
                .await?;
                dialogue
                    .update(QuizState::ConfirmLanguageSwitch {
                        session,
                        target: code.to_owned(),
                    })
                    .await?;
            }
        },
        None => {
            bot.send_message(msg.chat.id, "Please pick one of the listed languages.")
                .await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn confirm_language_switch(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    (mut session, target): (EditorSession, String),
) -> HandlerResult {
    match msg.text() {
        Some("Yes") | Some("Yes✔️") => {
            session.coordinator.confirm_switch(&mut session.store, &target);
            bot.send_message(
                msg.chat.id,
                format!("Now editing {}.", language_label(&target).unwrap_or(&target)),
            )
            .await?;
            show_hub(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::HandleQuiz { session }).await?;
        }
        Some("No") | Some("No❌") => {
            bot.send_message(msg.chat.id, "OK, staying on the current language.")
                .await?;
            show_hub(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::HandleQuiz { session }).await?;
        }
        _ => {
            bot.send_message(msg.chat.id, "Please answer Yes or No.")
                .reply_markup(yes_no_keyboard())
                .await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn select_new_translation(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    mut session: EditorSession,
) -> HandlerResult {
    match msg.text().and_then(language_by_label) {
        Some(code) => {
            if session.store.get(code).is_some() {
                bot.send_message(msg.chat.id, "That translation already exists.")
                    .await?;
                show_hub(&bot, msg.chat.id, &session).await?;
                dialogue.update(QuizState::HandleQuiz { session }).await?;
            } else {
                session
                    .coordinator
                    .create_translation(&mut session.store, code);
                bot.send_message(
                    msg.chat.id,
                    format!(
                        "Translation in {} created. Now editing it.",
                        language_label(code).unwrap_or(code)
                    ),
                )
                .await?;
                show_hub(&bot, msg.chat.id, &session).await?;
                dialogue.update(QuizState::HandleQuiz { session }).await?;
            }
        }
        None => {
            bot.send_message(msg.chat.id, "Please pick one of the listed languages.")
                .await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn select_translation_to_delete(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    session: EditorSession,
) -> HandlerResult {
    match msg.text().and_then(language_by_label) {
        Some(code) if session.store.get(code).is_some() => {
            let siblings_hold_data = session
                .store
                .languages()
                .any(|lang| lang != code && session.store.get(lang).is_some_and(|d| d.holds_data()));
            let warning = if siblings_hold_data {
                format!(
                    "Delete the {} translation?",
                    language_label(code).unwrap_or(code)
                )
            } else {
                format!(
                    "{} is the last language with content — deleting it deletes the whole quiz. Continue?",
                    language_label(code).unwrap_or(code)
                )
            };
            bot.send_message(msg.chat.id, warning)
                .reply_markup(yes_no_keyboard())
                .await?;
            dialogue
                .update(QuizState::ConfirmDeleteTranslation {
                    session,
                    target: code.to_owned(),
                })
                .await?;
        }
        Some(_) => {
            bot.send_message(msg.chat.id, "No translation exists for that language.")
                .await?;
        }
        None => {
            bot.send_message(msg.chat.id, "Please pick one of the listed languages.")
                .await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(connection, bot, dialogue, session))]
pub(crate) async fn confirm_delete_translation<Connect: DeleteQuiz>(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    (mut session, target): (EditorSession, String),
    connection: Arc<Connect>,
) -> HandlerResult {
    match msg.text() {
        Some("Yes") | Some("Yes✔️") => {
            let was_persisted = session
                .store
                .get(&target)
                .is_some_and(|d| d.has_saved_translation);
            match session.store.delete_draft(&target) {
                DeleteOutcome::QuizCleared => {
                    if let Some(quiz_id) = session.quiz_id {
                        if let Err(e) = connection.delete_quiz(quiz_id).await {
                            log::error!("Failed to delete quiz {}: {}", quiz_id, e);
                            bot.send_message(msg.chat.id, format!("Backend error: {}", e))
                                .await?;
                        }
                    }
                    bot.send_message(msg.chat.id, "Quiz deleted.")
                        .reply_markup(action_keyboard(msg.chat.username().unwrap_or_default()))
                        .await?;
                    dialogue.update(QuizState::Start).await?;
                }
                DeleteOutcome::TranslationRemoved => {
                    if was_persisted {
                        if let Some(quiz_id) = session.quiz_id {
                            if let Err(e) = connection.delete_translation(quiz_id, &target).await {
                                log::error!(
                                    "Failed to delete translation {}/{}: {}",
                                    quiz_id,
                                    target,
                                    e
                                );
                                bot.send_message(msg.chat.id, format!("Backend error: {}", e))
                                    .await?;
                            }
                        }
                    }
                    bot.send_message(msg.chat.id, "Translation deleted.").await?;
                    show_hub(&bot, msg.chat.id, &session).await?;
                    dialogue.update(QuizState::HandleQuiz { session }).await?;
                }
            }
        }
        Some("No") | Some("No❌") => {
            bot.send_message(msg.chat.id, "OK, nothing deleted.").await?;
            show_hub(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::HandleQuiz { session }).await?;
        }
        _ => {
            bot.send_message(msg.chat.id, "Please answer Yes or No.")
                .reply_markup(yes_no_keyboard())
                .await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(connection, bot, dialogue, session))]
pub(crate) async fn confirm_delete_quiz<Connect: DeleteQuiz>(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    session: EditorSession,
    connection: Arc<Connect>,
) -> HandlerResult {
    match msg.text() {
        Some("Yes") | Some("Yes✔️") => {
            if let Some(quiz_id) = session.quiz_id {
                if let Err(e) = connection.delete_quiz(quiz_id).await {
                    log::error!("Failed to delete quiz {}: {}", quiz_id, e);
                    bot.send_message(msg.chat.id, format!("Backend error: {}", e))
                        .await?;
                    show_hub(&bot, msg.chat.id, &session).await?;
                    dialogue.update(QuizState::HandleQuiz { session }).await?;
                    return Ok(());
                }
            }
            bot.send_message(msg.chat.id, "Quiz deleted.")
                .reply_markup(action_keyboard(msg.chat.username().unwrap_or_default()))
                .await?;
            dialogue.update(QuizState::Start).await?;
        }
        Some("No") | Some("No❌") => {
            bot.send_message(msg.chat.id, "OK, nothing deleted.").await?;
            show_hub(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::HandleQuiz { session }).await?;
        }
        _ => {
            bot.send_message(msg.chat.id, "Please answer Yes or No.")
                .reply_markup(yes_no_keyboard())
                .await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(connection, bot, dialogue, session))]
pub(crate) async fn choose_save_scope<Connect: SaveQuiz>(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    session: EditorSession,
    connection: Arc<Connect>,
) -> HandlerResult {
    match msg.text() {
        Some("Active language only") => {
            perform_save(&bot, &dialogue, msg.chat.id, session, SaveScope::ActiveOnly, connection)
                .await?;
        }
        Some("All changed languages") => {
            perform_save(&bot, &dialogue, msg.chat.id, session, SaveScope::AllDirty, connection)
                .await?;
        }
        _ => {
            bot.send_message(msg.chat.id, "Please pick one of the two options.")
                .reply_markup(save_scope_keyboard())
                .await?;
        }
    }

    Ok(())
}

/// Runs one save request. The in-flight flag is committed to the dialogue
/// before the request goes out, so a second Save💾 while it is running is
/// rejected. Edits made meanwhile are not in the snapshot and stay dirty.
pub(crate) async fn perform_save<Connect: SaveQuiz>(
    bot: &Bot,
    dialogue: &UserDialogue,
    chat: ChatId,
    mut session: EditorSession,
    scope: SaveScope,
    connection: Arc<Connect>,
) -> HandlerResult {
    let languages = save::scope_languages(&session.store, scope);
    let payload = save::build_payload(&session.store, &languages);

    session.save_in_flight = true;
    dialogue
        .update(QuizState::HandleQuiz { session: session.clone() })
        .await?;

    let result = connection
        .save_quiz(session.quiz_id, &session.owner, &payload)
        .await;
    session.save_in_flight = false;

    match result {
        Ok(receipt) => {
            session.quiz_id = Some(receipt.quiz_id);
            save::apply_save_result(&mut session.store, &payload, &receipt.outcome);

            let mut report = format!("Saved: {}.", receipt.outcome.saved.join(", "));
            for (language, reason) in &receipt.outcome.failed {
                report.push_str(&format!("\nFailed {}: {} (still unsaved)", language, reason));
            }
            log::info!(
                "Quiz {:?} saved, scope {:?}: {} ok, {} failed",
                session.quiz_id,
                scope,
                receipt.outcome.saved.len(),
                receipt.outcome.failed.len()
            );
            bot.send_message(chat, report)
                .reply_markup(edit_quiz_keyboard())
                .await?;
        }
        Err(e) => {
            log::error!("Save failed: {}", e);
            bot.send_message(
                chat,
                format!("Save failed: {}. Your edits are kept, try again.", e),
            )
            .reply_markup(edit_quiz_keyboard())
            .await?;
        }
    }

    dialogue.update(QuizState::HandleQuiz { session }).await?;
    Ok(())
}
