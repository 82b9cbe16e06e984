use std::{error::Error, sync::Arc};

use teloxide::{
    dispatching::{
        dialogue::{self, InMemStorage},
        DpHandlerDescription, UpdateFilterExt, UpdateHandler,
    },
    dptree::{self, Handler},
    payloads::SendMessageSetters,
    prelude::{DependencyMap, Requester},
    types::{Message, Update},
    Bot,
};
use tracing::instrument;

use crate::{
    api::{Backend, FetchQuiz},
    commands::{cancel, help, start, Command},
    constructor, editor,
    keyboard::{quizes_keyboard, supported_languages_keyboard},
    question_editor, runner,
    state::QuizState,
    HandlerResult, UserDialogue,
};

pub fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    use dptree::case;

    let command_handler = teloxide::filter_command::<Command, _>()
        .branch(case![Command::Help].endpoint(help))
        .branch(case![Command::Start].endpoint(start))
        .branch(case![Command::Cancel].endpoint(cancel));

    let handler = Update::filter_message()
        .branch(command_handler)
        .branch(case![QuizState::Start].endpoint(choose_what_to_do::<Backend>))
        .branch(constructor_scheme())
        .branch(running_scheme())
        .branch(editor_scheme())
        .branch(question_scheme())
        .branch(language_scheme())
        .endpoint(invalid_state);

    dialogue::enter::<Update, InMemStorage<QuizState>, QuizState, _>()
        .branch(handler)
        .branch(callback_query_scheme())
}

async fn choose_what_to_do<Connect: FetchQuiz>(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    connection: Arc<Connect>,
) -> HandlerResult {
    match msg.text() {
        Some("Create a new quiz🏗️") => {
            bot.send_message(msg.chat.id, "In which language will you write it first?")
                .reply_markup(supported_languages_keyboard())
                .await?;
            dialogue.update(QuizState::ReceiveQuizLanguage).await?;
        }
        Some("Take a quiz📝") => {
            let quizzes = connection.list_quizzes().await?;
            if quizzes.is_empty() {
                bot.send_message(msg.chat.id, "No available quizes.")
                    .await?;
            } else {
                bot.send_message(msg.chat.id, "Please, choose available quiz:")
                    .reply_markup(quizes_keyboard(&quizzes))
                    .await?;
                dialogue
                    .update(QuizState::SelectQuizToTake { quizzes })
                    .await?;
            }
        }
        Some("Edit an existing quiz✏️️") => {
            let quizzes = connection.list_quizzes().await?;
            if quizzes.is_empty() {
                bot.send_message(msg.chat.id, "No available quizes.")
                    .await?;
            } else {
                bot.send_message(msg.chat.id, "Select a quiz.")
                    .reply_markup(quizes_keyboard(&quizzes))
                    .await?;
                dialogue.update(QuizState::SelectQuiz { quizzes }).await?;
            }
        }
        _ => {
            bot.send_message(msg.chat.id, "Invalid input. Please try again.")
                .await?;
        }
    }

    Ok(())
}

#[instrument(level = "debug")]
fn constructor_scheme() -> Handler<
    'static,
    DependencyMap,
    Result<(), Box<(dyn Error + Send + Sync + 'static)>>,
    DpHandlerDescription,
> {
    use dptree::case;
    Update::filter_message()
        .branch(case![QuizState::ReceiveQuizLanguage].endpoint(constructor::receive_quiz_language))
        .branch(
            case![QuizState::ReceiveQuizTitle { session }]
                .endpoint(constructor::receive_quiz_title),
        )
        .branch(
            case![QuizState::ReceiveQuizDescription { session }]
                .endpoint(constructor::receive_quiz_description),
        )
}

#[instrument(level = "debug")]
fn running_scheme() -> Handler<
    'static,
    DependencyMap,
    Result<(), Box<(dyn Error + Send + Sync + 'static)>>,
    DpHandlerDescription,
> {
    use dptree::case;
    Update::filter_message()
        .branch(case![QuizState::SelectQuizToTake { quizzes }].endpoint(runner::selection::<Backend>))
        .branch(
            case![QuizState::SelectRunLanguage { quiz_id, languages }]
                .endpoint(runner::select_run_language::<Backend>),
        )
        .branch(case![QuizState::ReadyToRun { quiz, curr_idx }].endpoint(runner::running_ready))
}

#[instrument(level = "debug")]
fn callback_query_scheme() -> Handler<
    'static,
    DependencyMap,
    Result<(), Box<(dyn Error + Send + Sync + 'static)>>,
    DpHandlerDescription,
> {
    use dptree::case;

    Update::filter_callback_query().branch(
        case![QuizState::Running {
            quiz,
            curr_idx,
            score
        }]
        .endpoint(runner::take_answer),
    )
}

#[instrument(level = "debug")]
fn editor_scheme() -> Handler<
    'static,
    DependencyMap,
    Result<(), Box<(dyn Error + Send + Sync + 'static)>>,
    DpHandlerDescription,
> {
    use dptree::case;
    Update::filter_message()
        .branch(case![QuizState::SelectQuiz { quizzes }].endpoint(editor::select_quiz::<Backend>))
        .branch(case![QuizState::HandleQuiz { session }].endpoint(editor::handle_quiz::<Backend>))
        .branch(case![QuizState::EditTitle { session }].endpoint(editor::edit_title))
        .branch(case![QuizState::EditDescription { session }].endpoint(editor::edit_description))
        .branch(case![QuizState::EditTags { session }].endpoint(editor::edit_tags))
        .branch(case![QuizState::EditModules { session }].endpoint(editor::edit_modules))
        .branch(case![QuizState::EditCover { session }].endpoint(editor::edit_cover))
        .branch(
            case![QuizState::ConfirmDeleteQuiz { session }]
                .endpoint(editor::confirm_delete_quiz::<Backend>),
        )
        .branch(
            case![QuizState::ChooseSaveScope { session }]
                .endpoint(editor::choose_save_scope::<Backend>),
        )
}

#[instrument(level = "debug")]
fn question_scheme() -> Handler<
    'static,
    DependencyMap,
    Result<(), Box<(dyn Error + Send + Sync + 'static)>>,
    DpHandlerDescription,
> {
    use dptree::case;
    Update::filter_message()
        .branch(case![QuizState::SelectQuestion { session }].endpoint(question_editor::select_question))
        .branch(
            case![QuizState::HandleQuestion {
                session,
                question_id
            }]
            .endpoint(question_editor::handle_question),
        )
        .branch(
            case![QuizState::EditQuestionTitle {
                session,
                question_id
            }]
            .endpoint(question_editor::edit_question_title),
        )
        .branch(
            case![QuizState::EditQuestionDescription {
                session,
                question_id
            }]
            .endpoint(question_editor::edit_question_description),
        )
        .branch(
            case![QuizState::MoveQuestionTo {
                session,
                question_id
            }]
            .endpoint(question_editor::move_question_to),
        )
        .branch(
            case![QuizState::SelectOption {
                session,
                question_id
            }]
            .endpoint(question_editor::select_option),
        )
        .branch(
            case![QuizState::HandleOption {
                session,
                question_id,
                option_index
            }]
            .endpoint(question_editor::handle_option),
        )
        .branch(
            case![QuizState::EditOptionText {
                session,
                question_id,
                option_index
            }]
            .endpoint(question_editor::edit_option_text),
        )
        .branch(
            case![QuizState::MoveOptionTo {
                session,
                question_id,
                option_index
            }]
            .endpoint(question_editor::move_option_to),
        )
}

#[instrument(level = "debug")]
fn language_scheme() -> Handler<
    'static,
    DependencyMap,
    Result<(), Box<(dyn Error + Send + Sync + 'static)>>,
    DpHandlerDescription,
> {
    use dptree::case;
    Update::filter_message()
        .branch(case![QuizState::HandleLanguages { session }].endpoint(editor::handle_languages))
        .branch(
            case![QuizState::SelectLanguageToSwitch { session }]
                .endpoint(editor::select_language_to_switch),
        )
        .branch(
            case![QuizState::ConfirmLanguageSwitch { session, target }]
                .endpoint(editor::confirm_language_switch),
        )
        .branch(
            case![QuizState::SelectNewTranslation { session }]
                .endpoint(editor::select_new_translation),
        )
        .branch(
            case![QuizState::SelectTranslationToDelete { session }]
                .endpoint(editor::select_translation_to_delete),
        )
        .branch(
            case![QuizState::ConfirmDeleteTranslation { session, target }]
                .endpoint(editor::confirm_delete_translation::<Backend>),
        )
}

#[instrument(level = "info")]
async fn invalid_state(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(
        msg.chat.id,
        "Unable to handle the message. Enter /help to see usages.",
    )
    .await?;
    Ok(())
}
