use state::QuizState;
use teloxide::{dispatching::dialogue::InMemStorage, prelude::Dialogue};

pub mod api;
pub mod commands;
pub mod constructor;
pub mod draft;
pub mod editor;
pub mod keyboard;
pub mod question_editor;
pub mod runner;
pub mod schema;
pub mod state;

pub type UserDialogue = Dialogue<QuizState, InMemStorage<QuizState>>;
pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>;
