use reqwest::Client;
use std::sync::Arc;
use tracing::info;

use crate::agent::stateless_llm::{OpenAICompatibleLLM, StatelessLLMInterface, OPENAI_BASE_URL};
use crate::config_manager::LLMConfig;
use crate::error::ConfigError;

/// Factory for creating stateless LLM instances
pub struct StatelessLLMFactory;

impl StatelessLLMFactory {
    /// Create an LLM client from a resolved config record.
    ///
    /// The record's own transport is reused when it has one; otherwise a
    /// default client is built.
    pub fn create_llm(
        config: &LLMConfig,
    ) -> Result<Arc<dyn StatelessLLMInterface>, ConfigError> {
        info!("Initializing LLM: tags={:?}, model={}", config.tags, config.model);

        let client = match &config.http_client {
            Some(client) => client.clone(),
            None => Client::builder().build()?,
        };
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| OPENAI_BASE_URL.to_string());

        Ok(Arc::new(OpenAICompatibleLLM::new(
            client,
            config.model.clone(),
            base_url,
            config.api_key.clone(),
            config.api_rate_limit,
        )))
    }
}
