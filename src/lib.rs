pub mod chat;
pub mod config;
pub mod inference;
pub mod server;
