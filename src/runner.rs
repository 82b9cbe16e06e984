//! Quiz-taking flow: pick a quiz and language, answer via inline keyboards,
//! get a score at the end. Works off the same draft model the editor uses,
//! fetched read-only from the backend.

use std::sync::Arc;

use teloxide::{
    dispatching::dialogue::GetChatId,
    payloads::SendMessageSetters,
    prelude::Requester,
    types::{CallbackQuery, ChatId, Message, ReplyMarkup},
    Bot,
};
use tracing::instrument;

use crate::api::dto::QuizSummary;
use crate::api::FetchQuiz;
use crate::draft::language::LanguageStatus;
use crate::draft::{language_by_label, language_label, Draft};
use crate::keyboard::{action_keyboard, answers_keyboard, language_statuses_keyboard, yes_no_keyboard};
use crate::state::QuizState;
use crate::{HandlerResult, UserDialogue};

async fn load_and_offer<Retreiver: FetchQuiz>(
    bot: &Bot,
    dialogue: &UserDialogue,
    chat: ChatId,
    quiz_id: i64,
    language: &str,
    connection: Arc<Retreiver>,
) -> HandlerResult {
    match connection
        .fetch_editor_data(quiz_id, &[language.to_owned()])
        .await
    {
        Ok(mut translations) => match translations.remove(language) {
            Some(quiz) => {
                bot.send_message(
                    chat,
                    format!(
                        "Title: {}\nDescription: {}\nQuestions: {}\nAre you ready to begin? (Yes/No)",
                        quiz.title,
                        quiz.description,
                        quiz.questions.len()
                    ),
                )
                .reply_markup(yes_no_keyboard())
                .await?;
                dialogue
                    .update(QuizState::ReadyToRun { quiz, curr_idx: 0 })
                    .await?;
            }
            None => {
                bot.send_message(
                    chat,
                    format!(
                        "This quiz has no {} version.",
                        language_label(language).unwrap_or(language)
                    ),
                )
                .await?;
            }
        },
        Err(e) => {
            log::error!("Failed to fetch quiz {}: {}", quiz_id, e);
            bot.send_message(chat, format!("Failed to fetch quiz: {}", e))
                .await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(connection, bot, dialogue, quizzes))]
pub(crate) async fn selection<Retreiver: FetchQuiz>(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    quizzes: Vec<QuizSummary>,
    connection: Arc<Retreiver>,
) -> HandlerResult {
    match msg.text() {
        Some(title) => match quizzes.iter().find(|quiz| quiz.title == title) {
            Some(summary) => {
                log::info!(
                    "{} selected '{}'",
                    msg.chat.username().unwrap_or("anonymous"),
                    summary.title
                );
                match summary.languages.as_slice() {
                    [] => {
                        bot.send_message(msg.chat.id, "That quiz has no published languages.")
                            .await?;
                    }
                    [only] => {
                        load_and_offer(&bot, &dialogue, msg.chat.id, summary.id, only, connection)
                            .await?;
                    }
                    languages => {
                        let statuses: Vec<_> = languages
                            .iter()
                            .map(|code| LanguageStatus {
                                code: code.clone(),
                                label: language_label(code).unwrap_or(code.as_str()).to_owned(),
                                has_translation: true,
                                is_active: false,
                                is_dirty: false,
                            })
                            .collect();
                        bot.send_message(msg.chat.id, "Take the quiz in which language?")
                            .reply_markup(language_statuses_keyboard(&statuses))
                            .await?;
                        dialogue
                            .update(QuizState::SelectRunLanguage {
                                quiz_id: summary.id,
                                languages: languages.to_vec(),
                            })
                            .await?;
                    }
                }
            }
            None => {
                bot.send_message(msg.chat.id, format!("Quiz with name '{}' not found.", title))
                    .await?;
            }
        },
        None => {
            bot.send_message(msg.chat.id, "Failed to retrieve quiz: no input provided")
                .await?;
        }
    };
    Ok(())
}

#[instrument(level = "info", skip(connection, bot, dialogue))]
pub(crate) async fn select_run_language<Retreiver: FetchQuiz>(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    (quiz_id, languages): (i64, Vec<String>),
    connection: Arc<Retreiver>,
) -> HandlerResult {
    match msg
        .text()
        .and_then(language_by_label)
        .filter(|code| languages.iter().any(|l| l == code))
    {
        Some(code) => {
            load_and_offer(&bot, &dialogue, msg.chat.id, quiz_id, code, connection).await?;
        }
        None => {
            bot.send_message(msg.chat.id, "Please pick one of the listed languages.")
                .await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue))]
pub(crate) async fn running_ready(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    (quiz, mut curr_idx): (Draft, usize),
) -> HandlerResult {
    match msg.text() {
        Some("Yes") | Some("Yes✔️") => {
            if quiz.questions.is_empty() {
                bot.send_message(msg.chat.id, "Sorry, no questions for that quiz available.")
                    .reply_markup(action_keyboard(msg.chat.username().unwrap_or_default()))
                    .await?;
                dialogue.update(QuizState::Start).await?;
                return Ok(());
            }
            bot.send_message(msg.chat.id, "Let's begin!")
                .reply_markup(ReplyMarkup::kb_remove())
                .await?;

            let mut curr_question = &quiz.questions[curr_idx];
            let mut answers_keyboard_markup = answers_keyboard(&curr_question.options);

            while answers_keyboard_markup.inline_keyboard.is_empty() {
                bot.send_message(
                    msg.chat.id,
                    "Sorry, it seems that current question doesn't have answers. Skipping...",
                )
                .await?;
                curr_idx += 1;

                if curr_idx >= quiz.questions.len() {
                    bot.send_message(msg.chat.id, "Oh, no answerable questions left. Quitting quiz...")
                        .reply_markup(action_keyboard(msg.chat.username().unwrap_or_default()))
                        .await?;
                    dialogue.update(QuizState::Start).await?;
                    return Ok(());
                }
                curr_question = &quiz.questions[curr_idx];
                answers_keyboard_markup = answers_keyboard(&curr_question.options);
            }

            bot.send_message(
                msg.chat.id,
                format!("Question #{}\n{}", curr_idx + 1, curr_question.title),
            )
            .reply_markup(answers_keyboard_markup)
            .parse_mode(teloxide::types::ParseMode::Html)
            .await?;
            dialogue
                .update(QuizState::Running {
                    quiz,
                    curr_idx,
                    score: 0,
                })
                .await?;
        }
        Some("No") | Some("No❌") => {
            log::info!(
                "{} quits quiz '{}'",
                msg.chat.username().unwrap_or("anonymous"),
                &quiz.title
            );
            bot.send_message(msg.chat.id, "OK. Quitting quiz...").await?;
            dialogue.update(QuizState::Start).await?;
            bot.send_message(msg.chat.id, "What do you want to do now?")
                .reply_markup(action_keyboard(msg.chat.username().unwrap_or_default()))
                .await?;
        }
        _ => {
            bot.send_message(
                msg.chat.id,
                "Please, enter a valid answer <b>Yes</b> or <b>No</b>.",
            )
            .parse_mode(teloxide::types::ParseMode::Html)
            .await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue))]
pub(crate) async fn take_answer(
    bot: Bot,
    dialogue: UserDialogue,
    q: CallbackQuery,
    (quiz, mut curr_idx, mut score): (Draft, usize, u32),
) -> HandlerResult {
    let Some(answer_str) = &q.data else {
        return Ok(());
    };
    let Some(chat_id) = q.chat_id() else {
        return Ok(());
    };

    let is_correct = quiz.questions[curr_idx]
        .options
        .iter()
        .find(|option| option.text == *answer_str)
        .is_some_and(|option| option.is_correct);
    log::info!(
        "{} answers '{}' to question '{}' of quiz '{}'. Correctness: {}",
        q.from.username.as_deref().unwrap_or("anonymous"),
        answer_str,
        quiz.questions[curr_idx].title,
        quiz.title,
        is_correct
    );
    let text = if is_correct {
        score += 1;
        format!("Given answer {}. Answer is correct.✅", answer_str)
    } else {
        format!("Given answer {}. Answer is incorrect.❌", answer_str)
    };

    bot.answer_callback_query(&q.id).await?;

    if let Some(message) = &q.message {
        if let Some(original) = message.regular_message().and_then(|m| m.text()) {
            bot.edit_message_text(chat_id, message.id(), format!("{}\n{}", original, text))
                .await?;
        }
    }

    if curr_idx + 1 >= quiz.questions.len() {
        log::info!(
            "{} completed quiz '{}' with score {}/{}",
            q.from.username.as_deref().unwrap_or("anonymous"),
            quiz.title,
            score,
            quiz.questions.len()
        );
        bot.send_message(chat_id, "Congratulations! You completed the quiz!")
            .await?;
        bot.send_message(
            chat_id,
            format!("Your result is {}/{}", score, quiz.questions.len()),
        )
        .await?;
        dialogue.update(QuizState::Start).await?;
        bot.send_message(chat_id, "What do you want to do now?")
            .reply_markup(action_keyboard(q.from.username.clone().unwrap_or_default()))
            .await?;
    } else {
        let mut curr_question = &quiz.questions[curr_idx + 1];
        let mut answers_keyboard_markup = answers_keyboard(&curr_question.options);

        while answers_keyboard_markup.inline_keyboard.is_empty() {
            bot.send_message(
                chat_id,
                "Sorry, it seems that current question doesn't have answers. Skipping...",
            )
            .await?;
            curr_idx += 1;

            if curr_idx + 1 >= quiz.questions.len() {
                bot.send_message(
                    chat_id,
                    format!(
                        "Oh, no more questions left. Your score is {}/{}",
                        score,
                        quiz.questions.len()
                    ),
                )
                .reply_markup(action_keyboard(q.from.username.clone().unwrap_or_default()))
                .await?;
                dialogue.update(QuizState::Start).await?;
                return Ok(());
            }
            curr_question = &quiz.questions[curr_idx + 1];
            answers_keyboard_markup = answers_keyboard(&curr_question.options);
        }

        bot.send_message(
            chat_id,
            format!("Question #{}\n{}", curr_idx + 2, curr_question.title),
        )
        .reply_markup(answers_keyboard_markup)
        .parse_mode(teloxide::types::ParseMode::Html)
        .await?;
        dialogue
            .update(QuizState::Running {
                quiz,
                curr_idx: curr_idx + 1,
                score,
            })
            .await?;
    }

    Ok(())
}
