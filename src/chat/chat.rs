use std::error::Error;
use std::io::Write;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::info;

use crate::config::ServerConfig;
use super::command_handlers::{handle_generate, handle_status, ChatContext};
use super::display::print_help;

/// Base URL of a server started with `config`. Wildcard bind addresses are dialed on loopback.
pub fn server_url(config: &ServerConfig) -> String {
    let host = match config.host.as_str() {
        "0.0.0.0" | "" => "127.0.0.1",
        "::" | "[::]" => "[::1]",
        host => host,
    };
    format!("http://{}:{}", host, config.port)
}

pub async fn chat_loop(server_url: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("Starting chat session against {}", server_url);
    println!("Connected to {}", server_url);
    print_help();

    let mut rl = DefaultEditor::new()?;
    let client = reqwest::Client::new();
    let context = ChatContext {
        client: &client,
        server_url,
    };

    loop {
        match rl.readline("[you] > ") {
            Ok(input) => {
                let input_trimmed = input.trim();
                if input_trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(input_trimmed);

                match input_trimmed.to_lowercase().as_str() {
                    "exit" | "bye" | "quit" => {
                        println!("Goodbye!");
                        break;
                    }
                    "help" => print_help(),
                    "clear" => {
                        print!("\x1B[2J\x1B[1;1H");
                        std::io::stdout().flush()?;
                    }
                    "status" => handle_status(&context).await,
                    _ => handle_generate(&context, input_trimmed).await,
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    info!("Chat session ended");
    Ok(())
}
