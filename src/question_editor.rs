//! Question and answer-option handlers: everything under "Edit question" in
//! the hub. Structural edits delegate to the draft's question-list
//! operations; the handlers only parse input and render menus.

use teloxide::{payloads::SendMessageSetters, prelude::Requester, types::Message, Bot};
use tracing::instrument;

use crate::draft::questions::MoveDirection;
use crate::draft::{Draft, QuestionId};
use crate::keyboard::{
    edit_option_keyboard, edit_question_keyboard, edit_quiz_keyboard, options_keyboard,
};
use crate::state::{EditorSession, QuizState};
use crate::{HandlerResult, UserDialogue};

/// Keyboard rows are rendered as "N. text"; selection comes back as that
/// text. The leading number is the authority, titles may repeat.
fn parse_indexed_choice(text: &str) -> Option<usize> {
    let (number, _) = text.split_once('.')?;
    let position: usize = number.trim().parse().ok()?;
    position.checked_sub(1)
}

fn question_index(draft: &Draft, id: QuestionId) -> Option<usize> {
    draft.questions.iter().position(|q| q.id == id)
}

async fn show_question(
    bot: &Bot,
    msg: &Message,
    session: &EditorSession,
    question_id: QuestionId,
) -> HandlerResult {
    let draft = session.store.active_draft();
    match draft.question(question_id) {
        Some(question) => {
            bot.send_message(msg.chat.id, question.to_string())
                .reply_markup(edit_question_keyboard())
                .await?;
        }
        None => {
            bot.send_message(msg.chat.id, "Question no longer exists.")
                .reply_markup(edit_quiz_keyboard())
                .await?;
        }
    }
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn select_question(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    session: EditorSession,
) -> HandlerResult {
    let choice = msg.text().and_then(parse_indexed_choice);
    let question_id = {
        let draft = session.store.active_draft();
        choice.and_then(|index| draft.questions.get(index).map(|q| q.id))
    };
    match question_id {
        Some(question_id) => {
            show_question(&bot, &msg, &session, question_id).await?;
            dialogue
                .update(QuizState::HandleQuestion { session, question_id })
                .await?;
        }
        None => {
            bot.send_message(msg.chat.id, "Please, select a question.").await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn handle_question(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    (mut session, question_id): (EditorSession, QuestionId),
) -> HandlerResult {
    match msg.text() {
        Some("/back") => {
            let draft = session.store.active_draft();
            bot.send_message(msg.chat.id, draft.to_string())
                .reply_markup(edit_quiz_keyboard())
                .await?;
            dialogue.update(QuizState::HandleQuiz { session }).await?;
        }
        Some("Edit title") => {
            bot.send_message(msg.chat.id, "What's the new question title?").await?;
            dialogue
                .update(QuizState::EditQuestionTitle { session, question_id })
                .await?;
        }
        Some("Edit description") => {
            bot.send_message(msg.chat.id, "What's the new question description?")
                .await?;
            dialogue
                .update(QuizState::EditQuestionDescription { session, question_id })
                .await?;
        }
        Some("Toggle description") => {
            session.store.update_active(|d| {
                if let Some(question) = d.question_mut(question_id) {
                    question.description = match question.description.take() {
                        Some(_) => None,
                        None => Some(String::new()),
                    };
                }
            });
            show_question(&bot, &msg, &session, question_id).await?;
            dialogue
                .update(QuizState::HandleQuestion { session, question_id })
                .await?;
        }
        Some("Add option") => {
            session.store.update_active(|d| d.add_option(question_id));
            show_question(&bot, &msg, &session, question_id).await?;
            dialogue
                .update(QuizState::HandleQuestion { session, question_id })
                .await?;
        }
        Some("Edit option") => {
            let draft = session.store.active_draft();
            match draft.question(question_id) {
                Some(question) if !question.options.is_empty() => {
                    bot.send_message(msg.chat.id, "Choose option to edit:")
                        .reply_markup(options_keyboard(&question.options))
                        .await?;
                    dialogue
                        .update(QuizState::SelectOption { session, question_id })
                        .await?;
                }
                _ => {
                    bot.send_message(msg.chat.id, "No options to edit.").await?;
                }
            }
        }
        Some("Move up") | Some("Move down") => {
            let direction = if msg.text() == Some("Move up") {
                MoveDirection::Up
            } else {
                MoveDirection::Down
            };
            session.store.update_active(|d| {
                if let Some(index) = question_index(d, question_id) {
                    d.move_question(index, direction);
                }
            });
            let draft = session.store.active_draft();
            bot.send_message(msg.chat.id, draft.to_string())
                .reply_markup(edit_question_keyboard())
                .await?;
            dialogue
                .update(QuizState::HandleQuestion { session, question_id })
                .await?;
        }
        Some("Move to…") => {
            bot.send_message(msg.chat.id, "Move the question to which position (1-based)?")
                .await?;
            dialogue
                .update(QuizState::MoveQuestionTo { session, question_id })
                .await?;
        }
        Some("Delete question🗑️") => {
            session.store.update_active(|d| d.delete_question(question_id));
            let draft = session.store.active_draft();
            bot.send_message(msg.chat.id, format!("Question deleted.\n{}", draft))
                .reply_markup(edit_quiz_keyboard())
                .await?;
            dialogue.update(QuizState::HandleQuiz { session }).await?;
        }
        _ => {
            bot.send_message(msg.chat.id, "Invalid input. Try again.").await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn edit_question_title(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    (mut session, question_id): (EditorSession, QuestionId),
) -> HandlerResult {
    match msg.text() {
        Some(new_title) => {
            session.store.update_active(|d| {
                if let Some(question) = d.question_mut(question_id) {
                    question.title = new_title.to_owned();
                }
            });
            bot.send_message(msg.chat.id, "Question title updated.").await?;
            show_question(&bot, &msg, &session, question_id).await?;
            dialogue
                .update(QuizState::HandleQuestion { session, question_id })
                .await?;
        }
        None => {
            bot.send_message(msg.chat.id, "Nothing entered. Try again.").await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn edit_question_description(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    (mut session, question_id): (EditorSession, QuestionId),
) -> HandlerResult {
    match msg.text() {
        Some(new_description) => {
            session.store.update_active(|d| {
                if let Some(question) = d.question_mut(question_id) {
                    question.description = Some(new_description.to_owned());
                }
            });
            bot.send_message(msg.chat.id, "Question description updated.").await?;
            show_question(&bot, &msg, &session, question_id).await?;
            dialogue
                .update(QuizState::HandleQuestion { session, question_id })
                .await?;
        }
        None => {
            bot.send_message(msg.chat.id, "Nothing entered. Try again.").await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn move_question_to(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    (mut session, question_id): (EditorSession, QuestionId),
) -> HandlerResult {
    let target = msg
        .text()
        .and_then(|t| t.trim().parse::<usize>().ok())
        .and_then(|p| p.checked_sub(1));
    match target {
        Some(to) => {
            session.store.update_active(|d| {
                if let Some(from) = question_index(d, question_id) {
                    d.reorder_questions(from, to);
                }
            });
            let draft = session.store.active_draft();
            bot.send_message(msg.chat.id, draft.to_string())
                .reply_markup(edit_question_keyboard())
                .await?;
            dialogue
                .update(QuizState::HandleQuestion { session, question_id })
                .await?;
        }
        None => {
            bot.send_message(msg.chat.id, "Send a position number, e.g. 2.").await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn select_option(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    (session, question_id): (EditorSession, QuestionId),
) -> HandlerResult {
    let option_index = {
        let draft = session.store.active_draft();
        msg.text()
            .and_then(parse_indexed_choice)
            .filter(|&index| {
                draft
                    .question(question_id)
                    .is_some_and(|q| index < q.options.len())
            })
    };
    match option_index {
        Some(option_index) => {
            bot.send_message(msg.chat.id, "What do you want to do with the option?")
                .reply_markup(edit_option_keyboard())
                .await?;
            dialogue
                .update(QuizState::HandleOption {
                    session,
                    question_id,
                    option_index,
                })
                .await?;
        }
        None => {
            bot.send_message(msg.chat.id, "Please, select an option.").await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn handle_option(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    (mut session, question_id, option_index): (EditorSession, QuestionId, usize),
) -> HandlerResult {
    match msg.text() {
        Some("/back") => {
            show_question(&bot, &msg, &session, question_id).await?;
            dialogue
                .update(QuizState::HandleQuestion { session, question_id })
                .await?;
        }
        Some("Edit text") => {
            bot.send_message(msg.chat.id, "What's the new option text?").await?;
            dialogue
                .update(QuizState::EditOptionText {
                    session,
                    question_id,
                    option_index,
                })
                .await?;
        }
        Some("Toggle correct") => {
            session
                .store
                .update_active(|d| d.toggle_correct(question_id, option_index));
            show_question(&bot, &msg, &session, question_id).await?;
            dialogue
                .update(QuizState::HandleOption {
                    session,
                    question_id,
                    option_index,
                })
                .await?;
        }
        Some("Move to…") => {
            bot.send_message(msg.chat.id, "Move the option to which position (1-based)?")
                .await?;
            dialogue
                .update(QuizState::MoveOptionTo {
                    session,
                    question_id,
                    option_index,
                })
                .await?;
        }
        Some("Delete option") => {
            session
                .store
                .update_active(|d| d.delete_option(question_id, option_index));
            bot.send_message(msg.chat.id, "Option deleted.").await?;
            show_question(&bot, &msg, &session, question_id).await?;
            dialogue
                .update(QuizState::HandleQuestion { session, question_id })
                .await?;
        }
        _ => {
            bot.send_message(msg.chat.id, "Invalid input. Try again.").await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn edit_option_text(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    (mut session, question_id, option_index): (EditorSession, QuestionId, usize),
) -> HandlerResult {
    match msg.text() {
        Some(new_text) => {
            session.store.update_active(|d| {
                if let Some(option) = d
                    .question_mut(question_id)
                    .and_then(|q| q.options.get_mut(option_index))
                {
                    option.text = new_text.to_owned();
                }
            });
            bot.send_message(msg.chat.id, "Option text updated.").await?;
            show_question(&bot, &msg, &session, question_id).await?;
            dialogue
                .update(QuizState::HandleOption {
                    session,
                    question_id,
                    option_index,
                })
                .await?;
        }
        None => {
            bot.send_message(msg.chat.id, "Nothing entered. Try again.").await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn move_option_to(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    (mut session, question_id, option_index): (EditorSession, QuestionId, usize),
) -> HandlerResult {
    let target = msg
        .text()
        .and_then(|t| t.trim().parse::<usize>().ok())
        .and_then(|p| p.checked_sub(1));
    match target {
        Some(to) => {
            session
                .store
                .update_active(|d| d.reorder_options(question_id, option_index, to));
            show_question(&bot, &msg, &session, question_id).await?;
            dialogue
                .update(QuizState::HandleQuestion { session, question_id })
                .await?;
        }
        None => {
            bot.send_message(msg.chat.id, "Send a position number, e.g. 2.").await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::parse_indexed_choice;

    #[test]
    fn indexed_choice_parses_keyboard_rows() {
        assert_eq!(parse_indexed_choice("1. Capital of Estonia?"), Some(0));
        assert_eq!(parse_indexed_choice("12. Something"), Some(11));
        assert_eq!(parse_indexed_choice("0. Nothing"), None);
        assert_eq!(parse_indexed_choice("Capitals"), None);
    }
}
