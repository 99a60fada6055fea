use std::error::Error;
use std::fs;
use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::generation::LogitsProcessor;
use candle_transformers::models::t5;
use candle_transformers::utils::apply_repeat_penalty;
use tracing::{debug, info};

use super::loader::ModelFiles;
use super::model::{GenerationConfig, Seq2SeqModel};

/// T5-family encoder-decoder model (T5, Flan-T5) running on candle
pub struct T5Model {
    model: t5::T5ForConditionalGeneration,
    device: Device,
    decoder_start_token_id: u32,
    eos_token_id: u32,
    use_kv_cache: bool,
}

impl T5Model {
    /// Builds the model from `config.json` and memory-mapped safetensors weights.
    pub fn load(files: &ModelFiles, device: &Device, use_kv_cache: bool) -> Result<Self> {
        let config_json = fs::read_to_string(&files.config)
            .with_context(|| format!("Failed to read {}", files.config.display()))?;
        let mut config: t5::Config = serde_json::from_str(&config_json)
            .context("Failed to parse T5 config.json")?;
        config.use_cache = use_kv_cache;

        info!(
            vocab_size = config.vocab_size,
            d_model = config.d_model,
            num_layers = config.num_layers,
            "Parsed T5 config"
        );

        // Safety: the weights file is not modified while mapped.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[files.weights.clone()], DType::F32, device)
                .with_context(|| format!("Failed to map weights from {}", files.weights.display()))?
        };
        let model = t5::T5ForConditionalGeneration::load(vb, &config)
            .context("Failed to build T5 model graph")?;

        let decoder_start_token_id = config
            .decoder_start_token_id
            .unwrap_or(config.pad_token_id) as u32;

        Ok(Self {
            model,
            device: device.clone(),
            decoder_start_token_id,
            eos_token_id: config.eos_token_id as u32,
            use_kv_cache,
        })
    }
}

impl Seq2SeqModel for T5Model {
    fn generate(&mut self, input_ids: &[u32], config: &GenerationConfig) -> Result<Vec<u32>, Box<dyn Error + Send + Sync>> {
        self.model.clear_kv_cache();

        let input = Tensor::new(input_ids, &self.device)?.unsqueeze(0)?;
        let encoder_output = self.model.encode(&input)?;

        let mut logits_processor = LogitsProcessor::new(config.seed, config.temperature, config.top_p);
        let mut output_ids = vec![self.decoder_start_token_id];

        while output_ids.len() < config.max_length {
            let decoder_input = if output_ids.len() == 1 || !self.use_kv_cache {
                Tensor::new(output_ids.as_slice(), &self.device)?.unsqueeze(0)?
            } else {
                let last = output_ids[output_ids.len() - 1];
                Tensor::new(&[last], &self.device)?.unsqueeze(0)?
            };

            let logits = self.model.decode(&decoder_input, &encoder_output)?.squeeze(0)?;
            let logits = if config.repeat_penalty == 1.0 {
                logits
            } else {
                let start = output_ids.len().saturating_sub(config.repeat_last_n);
                apply_repeat_penalty(&logits, config.repeat_penalty, &output_ids[start..])?
            };

            let next_token = logits_processor.sample(&logits)?;
            output_ids.push(next_token);
            if next_token == self.eos_token_id {
                break;
            }
        }

        debug!("Decoder produced {} tokens", output_ids.len());
        Ok(output_ids)
    }
}
