use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use crate::domain::prompt::PromptTemplate;

pub const DEFAULT_CONFIG_FILE: &str = "zipstream.toml";
pub const ENV_PREFIX: &str = "ZIPSTREAM_";

/// Provider credential variables, first match wins over any configured key
const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "GOOGLE_API_KEY"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub llm: LLMConfig,
    /// Rows of the table included in prompts
    pub preview_rows: usize,
    pub prompt_template: PromptTemplate,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm: LLMConfig::default(),
            preview_rows: 10,
            prompt_template: PromptTemplate::default(),
        }
    }
}

/// Layered configuration: defaults, then the TOML file, then `ZIPSTREAM_*` env vars,
/// then `GEMINI_API_KEY` / `GOOGLE_API_KEY` for the credential.
pub struct ConfigService {
    path: PathBuf,
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigService {
    pub fn new() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_CONFIG_FILE),
        }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn figment(&self) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(&self.path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn load(&self) -> Result<AppConfig> {
        let mut config: AppConfig = self
            .figment()
            .extract()
            .map_err(|e| AppError::ConfigError(e.to_string()))?;

        if let Some(key) = API_KEY_ENV_VARS
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
        {
            config.llm.api_key = Some(key);
        }

        // Deserialization does not go through the template constructor
        config.prompt_template = PromptTemplate::new(config.prompt_template.as_str())
            .map_err(|e| AppError::ConfigError(e.to_string()))?;

        debug!(
            config_file = %self.path.display(),
            model = %config.llm.model,
            has_api_key = config.llm.has_api_key(),
            "Loaded configuration"
        );
        Ok(config)
    }
}
