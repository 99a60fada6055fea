use std::error::Error;
use std::path::Path;

/// Trait defining the interface for all tokenizer implementations
pub trait TokenizerStrategy: Send + Sync {
    /// Convert text into token IDs, adding the model's special tokens
    fn encode(&self, text: &str) -> Result<Vec<u32>, Box<dyn Error + Send + Sync>>;

    /// Convert token IDs back into text
    fn decode(&self, tokens: &[u32], skip_special_tokens: bool) -> Result<String, Box<dyn Error + Send + Sync>>;
}

/// Tokenizer backed by a HuggingFace `tokenizer.json`
pub struct HfTokenizer {
    inner: tokenizers::Tokenizer,
}

impl HfTokenizer {
    pub fn new(inner: tokenizers::Tokenizer) -> Self {
        Self { inner }
    }

    /// Loads a tokenizer from a `tokenizer.json` file
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let inner = tokenizers::Tokenizer::from_file(path)
            .map_err(|e| format!("Failed to load tokenizer from {}: {}", path.display(), e))?;
        Ok(Self::new(inner))
    }
}

impl TokenizerStrategy for HfTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>, Box<dyn Error + Send + Sync>> {
        let encoding = self.inner.encode(text, true)?;
        Ok(encoding.get_ids().to_vec())
    }

    fn decode(&self, tokens: &[u32], skip_special_tokens: bool) -> Result<String, Box<dyn Error + Send + Sync>> {
        self.inner.decode(tokens, skip_special_tokens)
    }
}
