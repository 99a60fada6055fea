use axum::{body::Bytes, extract::State, Json};
use std::sync::Arc;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::inference::InferenceEngine;
use super::types::{ApiError, GenerateRequest, GenerateResponse, HealthResponse};

/// Reports that the model is loaded and the service is accepting requests.
pub async fn health_check(State(engine): State<Arc<InferenceEngine>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ready".to_string(),
        model: engine.model_id().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handles `POST /generate`: `{"text": ...}` in, `{"generated_text": ...}` out.
///
/// The body is taken as raw bytes so that every malformed shape maps to the same
/// 400 response instead of the extractor's own rejections.
pub async fn generate(
    State(engine): State<Arc<InferenceEngine>>,
    body: Bytes,
) -> Result<Json<GenerateResponse>, ApiError> {
    let request = GenerateRequest::from_body(&body).inspect_err(|e| {
        warn!("Rejected generate request: {}", e);
    })?;

    let request_id = Uuid::new_v4();
    let span = info_span!("generate", %request_id);

    async move {
        info!("Received input text: {}", request.text);

        match engine.generate(&request.text).await {
            Ok(generation) => {
                info!(
                    input_tokens = generation.input_tokens,
                    output_tokens = generation.output_tokens,
                    elapsed_ms = generation.elapsed.as_millis() as u64,
                    "Generated text: {}",
                    generation.text
                );
                Ok(Json(GenerateResponse {
                    generated_text: generation.text,
                }))
            }
            Err(e) => {
                error!("Generation failed: {}", e);
                Err(ApiError::from(e))
            }
        }
    }
    .instrument(span)
    .await
}
