//! Deterministic stand-ins for the tokenizer and model so the HTTP contract can be
//! exercised without downloading weights.
#![allow(dead_code)]

use std::error::Error;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

use seqgen::inference::{GenerationConfig, InferenceEngine, Seq2SeqModel, TokenizerStrategy};

pub const PAD: u32 = 0;
pub const EOS: u32 = 1;
const OFFSET: u32 = 2;

/// Byte-level tokenizer: every byte is one token, `EOS` is appended on encode.
pub struct ByteTokenizer;

impl TokenizerStrategy for ByteTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>, Box<dyn Error + Send + Sync>> {
        let mut ids: Vec<u32> = text.bytes().map(|b| b as u32 + OFFSET).collect();
        ids.push(EOS);
        Ok(ids)
    }

    fn decode(&self, tokens: &[u32], skip_special_tokens: bool) -> Result<String, Box<dyn Error + Send + Sync>> {
        let mut bytes = Vec::with_capacity(tokens.len());
        for &id in tokens {
            match id {
                PAD | EOS if skip_special_tokens => {}
                PAD => bytes.extend_from_slice(b"<pad>"),
                EOS => bytes.extend_from_slice(b"</s>"),
                id => bytes.push(u8::try_from(id - OFFSET)?),
            }
        }
        Ok(String::from_utf8(bytes)?)
    }
}

/// Answers with the input upper-cased, framed like a real decoder output
/// (`PAD` start token, trailing `EOS`) and capped at `max_length`.
pub struct ShoutingModel {
    pub delay: Duration,
}

impl ShoutingModel {
    pub fn new() -> Self {
        Self { delay: Duration::ZERO }
    }

    pub fn slow(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Seq2SeqModel for ShoutingModel {
    fn generate(&mut self, input_ids: &[u32], config: &GenerationConfig) -> Result<Vec<u32>, Box<dyn Error + Send + Sync>> {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }

        let mut output = vec![PAD];
        for &id in input_ids.iter().filter(|&&id| id >= OFFSET) {
            let byte = (id - OFFSET) as u8;
            output.push(byte.to_ascii_uppercase() as u32 + OFFSET);
        }
        output.push(EOS);
        output.truncate(config.max_length);
        Ok(output)
    }
}

/// A `ShoutingModel` that holds every generation until its `Gate` is opened.
pub struct GatedModel {
    inner: ShoutingModel,
    started: Arc<Notify>,
    release: mpsc::Receiver<()>,
}

/// Test-side handle of a `GatedModel`.
pub struct Gate {
    started: Arc<Notify>,
    release: mpsc::Sender<()>,
}

impl GatedModel {
    pub fn new() -> (Self, Gate) {
        let started = Arc::new(Notify::new());
        let (release_tx, release_rx) = mpsc::channel();
        let model = Self {
            inner: ShoutingModel::new(),
            started: Arc::clone(&started),
            release: release_rx,
        };
        (model, Gate { started, release: release_tx })
    }
}

impl Gate {
    /// Resolves once a generation is running inside the model.
    pub async fn generation_started(&self) {
        self.started.notified().await;
    }

    /// Lets the held generation and every later one run to completion.
    pub fn open(self) {
        drop(self.release);
    }
}

impl Seq2SeqModel for GatedModel {
    fn generate(&mut self, input_ids: &[u32], config: &GenerationConfig) -> Result<Vec<u32>, Box<dyn Error + Send + Sync>> {
        self.started.notify_one();
        // Returns Err once the gate is dropped
        let _ = self.release.recv();
        self.inner.generate(input_ids, config)
    }
}

/// Ignores `max_length` and keeps emitting tokens.
pub struct RunawayModel {
    pub overrun: usize,
}

impl Seq2SeqModel for RunawayModel {
    fn generate(&mut self, _input_ids: &[u32], config: &GenerationConfig) -> Result<Vec<u32>, Box<dyn Error + Send + Sync>> {
        let mut output = vec![PAD];
        output.extend(std::iter::repeat(b'a' as u32 + OFFSET).take(config.max_length + self.overrun));
        Ok(output)
    }
}

/// Always fails, like a runtime running out of memory mid-generation.
pub struct FailingModel;

impl Seq2SeqModel for FailingModel {
    fn generate(&mut self, _input_ids: &[u32], _config: &GenerationConfig) -> Result<Vec<u32>, Box<dyn Error + Send + Sync>> {
        Err("device out of memory".into())
    }
}

pub fn engine_with(model: impl Seq2SeqModel + 'static, max_length: usize, max_pending_requests: usize) -> Arc<InferenceEngine> {
    let generation = GenerationConfig {
        max_length,
        ..GenerationConfig::default()
    };
    Arc::new(InferenceEngine::new(
        "test/shouting-model",
        Arc::new(ByteTokenizer),
        Box::new(model),
        generation,
        max_pending_requests,
    ))
}

pub fn shouting_engine() -> Arc<InferenceEngine> {
    engine_with(ShoutingModel::new(), 500, 64)
}
