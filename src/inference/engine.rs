use std::sync::Arc;
use std::time::{Duration, Instant};
use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;
use tokio::sync::{Mutex, Semaphore};
use tracing::{info, warn, Span};

use crate::config::Settings;
use super::loader::{select_device, ModelFiles};
use super::model::{GenerationConfig, Seq2SeqModel};
use super::t5::T5Model;
use super::tokenizer::{HfTokenizer, TokenizerStrategy};

/// Errors surfaced by a generation request
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Too many pending generation requests")]
    Busy,

    #[error("Tokenization failed: {0}")]
    Tokenization(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Decoding failed: {0}")]
    Decoding(String),

    #[error("Generation worker failed: {0}")]
    WorkerFailed(String),
}

/// Outcome of a single generation
#[derive(Debug, Clone)]
pub struct Generation {
    pub text: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub elapsed: Duration,
}

/// The loaded tokenizer/model pair, shared by every request for the life of the process.
///
/// The model needs exclusive access while generating, so requests take turns on an
/// async mutex and run the blocking work on tokio's blocking pool. A semaphore bounds
/// how many requests may be in flight or waiting at once.
pub struct InferenceEngine {
    model_id: String,
    tokenizer: Arc<dyn TokenizerStrategy>,
    model: Arc<Mutex<Box<dyn Seq2SeqModel>>>,
    generation: GenerationConfig,
    admission: Semaphore,
}

impl InferenceEngine {
    pub fn new(
        model_id: impl Into<String>,
        tokenizer: Arc<dyn TokenizerStrategy>,
        model: Box<dyn Seq2SeqModel>,
        generation: GenerationConfig,
        max_pending_requests: usize,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            tokenizer,
            model: Arc::new(Mutex::new(model)),
            generation,
            admission: Semaphore::new(max_pending_requests),
        }
    }

    /// Resolves, downloads if needed, and loads the configured tokenizer and model.
    ///
    /// Blocks until loading is complete; any failure here is fatal for the process.
    pub fn load(settings: &Settings) -> anyhow::Result<Self> {
        let model_config = &settings.model;
        info!("Loading model: {}...", model_config.id);

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{prefix:.bold.dim} {spinner} {wide_msg}")?
        );
        pb.enable_steady_tick(Duration::from_millis(120));

        pb.set_message(format!("Resolving {}...", model_config.id));
        let files = ModelFiles::resolve(model_config)?;

        pb.set_message("Loading tokenizer...");
        let tokenizer = HfTokenizer::from_file(&files.tokenizer)
            .map_err(|e| anyhow::anyhow!(e))?;

        pb.set_message("Loading model weights...");
        let device = select_device(model_config.device)?;
        let model = T5Model::load(&files, &device, settings.inference.use_kv_cache)
            .with_context(|| format!("Failed to load model {}", model_config.id))?;

        pb.finish_and_clear();
        info!("Model loaded successfully!");

        Ok(Self::new(
            model_config.id.clone(),
            Arc::new(tokenizer),
            Box::new(model),
            GenerationConfig::from(&settings.inference),
            settings.inference.max_pending_requests,
        ))
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn generation_config(&self) -> &GenerationConfig {
        &self.generation
    }

    /// Encodes `text`, generates, and decodes the result with special tokens removed.
    ///
    /// Returns `EngineError::Busy` straight away when the pending-request limit is reached.
    pub async fn generate(&self, text: &str) -> Result<Generation, EngineError> {
        let _permit = self.admission.try_acquire().map_err(|_| EngineError::Busy)?;

        let model = Arc::clone(&self.model).lock_owned().await;
        let tokenizer = Arc::clone(&self.tokenizer);
        let config = self.generation.clone();
        let text = text.to_owned();
        let span = Span::current();

        tokio::task::spawn_blocking(move || {
            let _entered = span.enter();
            let mut model = model;
            run_generation(tokenizer.as_ref(), &mut **model, &text, &config)
        })
        .await
        .map_err(|e| EngineError::WorkerFailed(e.to_string()))?
    }
}

fn run_generation(
    tokenizer: &dyn TokenizerStrategy,
    model: &mut dyn Seq2SeqModel,
    text: &str,
    config: &GenerationConfig,
) -> Result<Generation, EngineError> {
    let started = Instant::now();

    let input_ids = tokenizer
        .encode(text)
        .map_err(|e| EngineError::Tokenization(e.to_string()))?;

    let mut output_ids = model
        .generate(&input_ids, config)
        .map_err(|e| EngineError::Generation(e.to_string()))?;

    if output_ids.len() > config.max_length {
        warn!(
            "Model returned {} tokens, truncating to max_length {}",
            output_ids.len(),
            config.max_length
        );
        output_ids.truncate(config.max_length);
    }

    let text = tokenizer
        .decode(&output_ids, true)
        .map_err(|e| EngineError::Decoding(e.to_string()))?;

    Ok(Generation {
        text,
        input_tokens: input_ids.len(),
        output_tokens: output_ids.len(),
        elapsed: started.elapsed(),
    })
}
