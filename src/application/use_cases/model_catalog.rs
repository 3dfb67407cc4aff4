use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::error::Result;
use crate::domain::llm_config::LLMConfig;
use crate::domain::model::{normalize_model_name, ModelDescriptor};
use crate::infrastructure::llm_clients::LLMClient;

/// Entry point to the remote model service for one configured credential.
pub struct ModelCatalog {
    llm_client: Arc<dyn LLMClient + Send + Sync>,
    config: LLMConfig,
}

impl ModelCatalog {
    pub fn new(llm_client: Arc<dyn LLMClient + Send + Sync>, config: LLMConfig) -> Self {
        Self { llm_client, config }
    }

    /// Replace the credential used by every later call.
    pub fn configure(&mut self, api_key: impl Into<String>) {
        self.config.api_key = Some(api_key.into());
    }

    pub fn config(&self) -> &LLMConfig {
        &self.config
    }

    pub async fn list_models(&self) -> Result<Vec<ModelDescriptor>> {
        self.llm_client.list_models(&self.config).await
    }

    pub async fn select_model(&self, name: &str) -> Result<GenerativeModel> {
        let descriptor = self.llm_client.get_model(&self.config, name).await?;

        if !descriptor.supported_generation_methods.is_empty()
            && !descriptor.supports_generate_content()
        {
            warn!(model = %descriptor.name, "Model does not advertise generateContent");
        }

        info!(model = %descriptor.name, "Selected model");
        Ok(GenerativeModel {
            llm_client: Arc::clone(&self.llm_client),
            config: self.config.clone().with_model(normalize_model_name(&descriptor.name)),
            descriptor,
        })
    }
}

/// A selected model bound to its client and credential.
pub struct GenerativeModel {
    llm_client: Arc<dyn LLMClient + Send + Sync>,
    config: LLMConfig,
    descriptor: ModelDescriptor,
}

impl GenerativeModel {
    pub fn descriptor(&self) -> &ModelDescriptor {
        &self.descriptor
    }

    pub fn name(&self) -> &str {
        &self.config.model
    }

    /// Single blocking call, no retry.
    pub async fn generate_content(&self, prompt: &str) -> Result<String> {
        self.llm_client.generate(&self.config, "", prompt).await
    }
}
