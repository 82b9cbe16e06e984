//! Bootstrap flow for a brand-new quiz: pick the initial language, enter the
//! title and description, then land in the editor hub with a dirty draft.
//! Nothing is persisted until the user saves from the hub.

use teloxide::types::ReplyMarkup;
use teloxide::{payloads::SendMessageSetters, prelude::Requester, types::Message, Bot};
use tracing::instrument;

use crate::draft::language_by_label;
use crate::keyboard::{edit_quiz_keyboard, supported_languages_keyboard};
use crate::state::{EditorSession, QuizState};
use crate::{HandlerResult, UserDialogue};

#[instrument(level = "info", skip(bot, dialogue))]
pub(crate) async fn receive_quiz_language(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
) -> HandlerResult {
    match msg.text().and_then(language_by_label) {
        Some(code) => {
            log::info!(
                "{} starts a new quiz in '{}'",
                msg.chat.username().unwrap_or("anonymous"),
                code
            );
            let session =
                EditorSession::new_quiz(msg.chat.username().unwrap_or("anonymous"), code);
            bot.send_message(msg.chat.id, "Let's start creating a new quiz! What's its title?")
                .reply_markup(ReplyMarkup::kb_remove())
                .await?;
            dialogue.update(QuizState::ReceiveQuizTitle { session }).await?;
        }
        None => {
            bot.send_message(msg.chat.id, "Please pick one of the listed languages.")
                .reply_markup(supported_languages_keyboard())
                .await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn receive_quiz_title(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    mut session: EditorSession,
) -> HandlerResult {
    match msg.text() {
        Some(title) => {
            log::info!(
                "{} titles the new quiz '{}'",
                msg.chat.username().unwrap_or("anonymous"),
                title
            );
            session.store.update_active(|d| d.title = title.to_owned());
            bot.send_message(msg.chat.id, "OK. What is the new quiz about?")
                .await?;
            dialogue
                .update(QuizState::ReceiveQuizDescription { session })
                .await?;
        }
        None => {
            bot.send_message(msg.chat.id, "Please, send a title of the new quiz.")
                .await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn receive_quiz_description(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    mut session: EditorSession,
) -> HandlerResult {
    match msg.text() {
        Some(description) => {
            session
                .store
                .update_active(|d| d.description = description.to_owned());
            bot.send_message(
                msg.chat.id,
                "Draft created. Nothing is saved yet — use Save💾 when ready.",
            )
            .await?;
            bot.send_message(msg.chat.id, session.store.active_draft().to_string())
                .reply_markup(edit_quiz_keyboard())
                .await?;
            dialogue.update(QuizState::HandleQuiz { session }).await?;
        }
        None => {
            bot.send_message(msg.chat.id, "Please, send a description of the new quiz.")
                .await?;
        }
    }

    Ok(())
}
