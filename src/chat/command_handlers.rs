use reqwest::{Client, StatusCode};
use crate::server::{ErrorResponse, GenerateRequest, GenerateResponse, HealthResponse};
use super::display::{display_error, display_generated, display_health};

/// Shared resources for the chat command handlers
pub(super) struct ChatContext<'a> {
    pub client: &'a Client,
    pub server_url: &'a str,
}

/// Turns a `/generate` reply into either the generated text or a printable error.
pub(super) fn interpret_generate_reply(status: StatusCode, body: &str) -> Result<String, String> {
    if status.is_success() {
        return serde_json::from_str::<GenerateResponse>(body)
            .map(|reply| reply.generated_text)
            .map_err(|e| format!("Unexpected response from server: {}", e));
    }

    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(reply) => Err(format!("{} ({})", reply.error, status)),
        Err(_) => Err(format!("Server returned {}", status)),
    }
}

pub(super) async fn handle_generate(context: &ChatContext<'_>, text: &str) {
    let url = format!("{}/generate", context.server_url);
    let request = GenerateRequest { text: text.to_string() };
    let response = match context.client.post(url).json(&request).send().await {
        Ok(response) => response,
        Err(e) => {
            display_error(&format!("Error sending request: {}", e));
            return;
        }
    };

    let status = response.status();
    match response.text().await {
        Ok(body) => match interpret_generate_reply(status, &body) {
            Ok(generated) => display_generated(&generated),
            Err(message) => display_error(&message),
        },
        Err(e) => display_error(&format!("Error reading response: {}", e)),
    }
}

pub(super) async fn handle_status(context: &ChatContext<'_>) {
    let url = format!("{}/health", context.server_url);
    match context.client.get(url).send().await {
        Ok(response) => match response.json::<HealthResponse>().await {
            Ok(health) => display_health(&health),
            Err(e) => display_error(&format!("Error reading response: {}", e)),
        },
        Err(e) => display_error(&format!("Server unreachable at {}: {}", context.server_url, e)),
    }
}
