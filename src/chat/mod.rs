mod chat;
mod command_handlers;
mod display;

pub use chat::{chat_loop, server_url};
