use colored::*;

use crate::server::HealthResponse;

pub fn print_help() {
    println!("\n{}", "seqgen chat commands".cyan());
    println!("{}", "=".repeat(60).bright_cyan());
    println!("{}  - Exit the chat", "exit, bye, quit".green());
    println!("{}             - Show this help message", "help".green());
    println!("{}            - Clear the screen", "clear".green());
    println!("{}           - Show server and model status", "status".green());
    println!("Anything else is sent to the model.");
    println!();
}

pub fn display_generated(text: &str) {
    if text.is_empty() {
        println!("{} {}", "[model]".bright_cyan().bold(), "(empty response)".dimmed());
    } else {
        println!("{} {}", "[model]".bright_cyan().bold(), text);
    }
}

pub fn display_health(health: &HealthResponse) {
    println!(
        "{} {} serving {} (v{})",
        "[status]".yellow().bold(),
        health.status.green(),
        health.model.bold(),
        health.version
    );
}

pub fn display_error(message: &str) {
    println!("{} {}", "[error]".red().bold(), message);
}
