pub mod gemini;

use crate::domain::error::Result;
use crate::domain::llm_config::LLMConfig;
use crate::domain::model::ModelDescriptor;
use async_trait::async_trait;

pub use gemini::GeminiClient;

#[async_trait]
pub trait LLMClient {
    /// Send one prompt to `config.model` and return the generated text.
    async fn generate(&self, config: &LLMConfig, system: &str, user: &str) -> Result<String>;

    async fn list_models(&self, config: &LLMConfig) -> Result<Vec<ModelDescriptor>>;

    /// Look up a single model by name; `NotFound` when the service does not know it.
    async fn get_model(&self, config: &LLMConfig, name: &str) -> Result<ModelDescriptor>;
}
