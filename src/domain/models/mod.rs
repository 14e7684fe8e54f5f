mod action;
mod auth;
mod backend;
mod chat;
mod course;
mod errors;
mod event;
mod message;
mod progress;
mod sender;
mod slash_commands;
mod slide;
mod theme;

pub use action::*;
pub use auth::*;
pub use backend::*;
pub use chat::*;
pub use course::*;
pub use errors::*;
pub use event::*;
pub use message::*;
pub use progress::*;
pub use sender::*;
pub use slash_commands::*;
pub use slide::*;
pub use theme::*;
