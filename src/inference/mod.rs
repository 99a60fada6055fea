//! # Inference Module
//!
//! Loads a pretrained sequence-to-sequence model once and turns text into generated
//! text: encode with the tokenizer, autoregressively generate, decode with special
//! tokens skipped.
//!
//! ## Key Components
//!
//! - `TokenizerStrategy` / `HfTokenizer`: text ↔ token ids
//! - `Seq2SeqModel` / `T5Model`: token ids → generated token ids
//! - `ModelFiles`: locates model artifacts locally or in the HuggingFace Hub cache
//! - `InferenceEngine`: the shared, load-once model pair that serves requests

pub mod engine;
pub mod loader;
pub mod model;
pub mod t5;
pub mod tokenizer;

pub use engine::{EngineError, Generation, InferenceEngine};
pub use loader::ModelFiles;
pub use model::{GenerationConfig, Seq2SeqModel};
pub use t5::T5Model;
pub use tokenizer::{HfTokenizer, TokenizerStrategy};
