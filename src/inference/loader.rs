use std::path::{Path, PathBuf};
use anyhow::{bail, Context, Result};
use candle_core::Device;
use hf_hub::api::sync::ApiBuilder;
use hf_hub::{Repo, RepoType};
use tracing::info;

use crate::config::{DeviceKind, ModelConfig};

pub const CONFIG_FILE: &str = "config.json";
pub const TOKENIZER_FILE: &str = "tokenizer.json";
pub const WEIGHTS_FILE: &str = "model.safetensors";

/// On-disk locations of everything needed to build the model
#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub weights: PathBuf,
}

impl ModelFiles {
    /// Resolves the model artifacts, either from `model.path` or through the hub cache
    /// (downloading on first use).
    pub fn resolve(config: &ModelConfig) -> Result<Self> {
        match &config.path {
            Some(dir) => Self::from_dir(dir),
            None => Self::from_hub(config),
        }
    }

    /// Uses a local directory laid out like a hub snapshot
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let files = Self {
            config: dir.join(CONFIG_FILE),
            tokenizer: dir.join(TOKENIZER_FILE),
            weights: dir.join(WEIGHTS_FILE),
        };

        for path in [&files.config, &files.tokenizer, &files.weights] {
            if !path.is_file() {
                bail!("Model file not found: {}", path.display());
            }
        }

        info!("Using local model files from {}", dir.display());
        Ok(files)
    }

    fn from_hub(config: &ModelConfig) -> Result<Self> {
        let mut builder = ApiBuilder::new().with_progress(false);
        if let Some(cache_dir) = &config.cache_dir {
            builder = builder.with_cache_dir(cache_dir.clone());
        }
        let api = builder.build().context("Failed to initialize HuggingFace Hub client")?;

        let repo = api.repo(Repo::with_revision(
            config.id.clone(),
            RepoType::Model,
            config.revision.clone(),
        ));

        info!("Resolving {}@{} from the HuggingFace Hub", config.id, config.revision);
        let fetch = |name: &str| {
            repo.get(name)
                .with_context(|| format!("Failed to download {} for {}", name, config.id))
        };

        Ok(Self {
            config: fetch(CONFIG_FILE)?,
            tokenizer: fetch(TOKENIZER_FILE)?,
            weights: fetch(WEIGHTS_FILE)?,
        })
    }
}

/// Opens the configured compute device. An unavailable accelerator is an error,
/// not a silent CPU fallback.
pub fn select_device(kind: DeviceKind) -> Result<Device> {
    let device = match kind {
        DeviceKind::Cpu => Device::Cpu,
        DeviceKind::Cuda => Device::new_cuda(0).context("CUDA device requested but not available")?,
        DeviceKind::Metal => Device::new_metal(0).context("Metal device requested but not available")?,
    };
    info!("Selected device: {:?}", device);
    Ok(device)
}
