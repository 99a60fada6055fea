use serde::Deserialize;
use std::path::{Path, PathBuf};
use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};

/// Compute device the model weights are placed on
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Cpu,
    Cuda,
    Metal,
}

/// Configuration for locating and loading the model
#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    /// HuggingFace Hub repository id, e.g. `google/flan-t5-small`
    pub id: String,
    /// Hub revision (branch, tag or commit)
    pub revision: String,
    /// Local directory with `config.json`, `tokenizer.json` and `model.safetensors`.
    /// When set, the hub is never contacted.
    pub path: Option<PathBuf>,
    /// Override for the hub cache directory
    pub cache_dir: Option<PathBuf>,
    /// Device to run the model on
    pub device: DeviceKind,
}

/// Configuration for generation
#[derive(Debug, Deserialize, Clone)]
pub struct InferenceConfig {
    /// Upper bound on the generated token sequence
    pub max_length: usize,
    /// Seed for the logits processor; every request starts from it
    pub seed: u64,
    /// Sampling temperature; unset or 0 means greedy decoding
    pub temperature: Option<f64>,
    /// Nucleus sampling threshold
    pub top_p: Option<f64>,
    /// Penalty applied to recently generated tokens (1.0 disables it)
    pub repeat_penalty: f32,
    /// Window the repeat penalty looks back over
    pub repeat_last_n: usize,
    /// Reuse decoder key/value state between steps
    pub use_kv_cache: bool,
    /// Generations allowed in flight or waiting before new ones are rejected
    pub max_pending_requests: usize,
}

/// Configuration for the HTTP server
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

/// Configuration for application logging
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Directory for the rolling log files
    pub directory: PathBuf,
    /// Emit JSON lines instead of plain text
    pub json: bool,
}

/// Main settings struct that contains all configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub model: ModelConfig,
    pub inference: InferenceConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

impl Settings {
    /// Loads settings from `./config`.
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("config"))
    }

    /// Loads settings in the following order of precedence (highest to lowest):
    /// 1. Environment variables prefixed with `SEQGEN__` (e.g. `SEQGEN__SERVER__PORT`)
    /// 2. `<config_dir>/local.toml` if present
    /// 3. `<config_dir>/default.toml` if present
    /// 4. Built-in defaults
    pub fn load_from(config_dir: &Path) -> Result<Self, ConfigError> {
        let default_config = config_dir.join("default.toml");
        let local_config = config_dir.join("local.toml");

        let settings = Self::builder()?
            .add_source(File::from(default_config).required(false))
            .add_source(File::from(local_config).required(false))
            .add_source(
                Environment::with_prefix("SEQGEN")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;

        Ok(settings)
    }

    /// Builder pre-populated with the built-in defaults
    pub(crate) fn builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("model.id", "google/flan-t5-small")?
            .set_default("model.revision", "main")?
            .set_default("model.device", "cpu")?
            .set_default("inference.max_length", 500)?
            .set_default("inference.seed", 299_792_458i64)?
            .set_default("inference.repeat_penalty", 1.0)?
            .set_default("inference.repeat_last_n", 64)?
            .set_default("inference.use_kv_cache", true)?
            .set_default("inference.max_pending_requests", 64)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("logging.level", "info")?
            .set_default("logging.directory", "logs")?
            .set_default("logging.json", false)
    }

    /// Validate configuration values
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.inference.max_length == 0 {
            return Err(ConfigError::Message(
                "max_length must be greater than 0".to_string()
            ));
        }

        if self.inference.max_pending_requests == 0 {
            return Err(ConfigError::Message(
                "max_pending_requests must be greater than 0".to_string()
            ));
        }

        if let Some(temperature) = self.inference.temperature {
            if temperature < 0.0 {
                return Err(ConfigError::Message(
                    format!("Temperature must not be negative, got: {}", temperature)
                ));
            }
        }

        if let Some(top_p) = self.inference.top_p {
            if !(top_p > 0.0 && top_p <= 1.0) {
                return Err(ConfigError::Message(
                    format!("top_p must be in (0.0, 1.0], got: {}", top_p)
                ));
            }
        }

        if self.inference.repeat_penalty <= 0.0 {
            return Err(ConfigError::Message(
                format!("repeat_penalty must be positive, got: {}", self.inference.repeat_penalty)
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::Message(
                "Port must be between 1 and 65535, got: 0".to_string()
            ));
        }

        match self.logging.level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
            _ => Err(ConfigError::Message(
                format!("Invalid logging level: {}. Must be one of: error, warn, info, debug, trace",
                    self.logging.level)
            )),
        }?;

        if !self.logging.directory.exists() {
            std::fs::create_dir_all(&self.logging.directory).map_err(|e| {
                ConfigError::Message(format!(
                    "Failed to create log directory at {}: {}",
                    self.logging.directory.display(), e
                ))
            })?;
        }

        Ok(())
    }
}
