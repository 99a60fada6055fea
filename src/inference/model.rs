use std::error::Error;
use crate::config::InferenceConfig;

/// Parameters controlling autoregressive generation
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    /// Upper bound on the returned token sequence, decoder start token included
    pub max_length: usize,
    pub seed: u64,
    /// `None` or 0 selects greedy (argmax) decoding
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub repeat_penalty: f32,
    pub repeat_last_n: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_length: 500,
            seed: 299_792_458,
            temperature: None,
            top_p: None,
            repeat_penalty: 1.0,
            repeat_last_n: 64,
        }
    }
}

impl From<&InferenceConfig> for GenerationConfig {
    fn from(config: &InferenceConfig) -> Self {
        Self {
            max_length: config.max_length,
            seed: config.seed,
            temperature: config.temperature.filter(|t| *t > 0.0),
            top_p: config.top_p,
            repeat_penalty: config.repeat_penalty,
            repeat_last_n: config.repeat_last_n,
        }
    }
}

/// An encoder-decoder model that turns an input token sequence into an output one.
///
/// Implementations may keep per-call state (e.g. a key/value cache), hence `&mut self`.
/// The returned sequence starts with the decoder start token and may end with the
/// end-of-sequence token; callers decode it with special tokens skipped.
pub trait Seq2SeqModel: Send {
    fn generate(&mut self, input_ids: &[u32], config: &GenerationConfig) -> Result<Vec<u32>, Box<dyn Error + Send + Sync>>;
}
