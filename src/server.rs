use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

use crate::agent::{
    AgentFactory, ConversableAgent, StatelessLLMFactory, StatelessLLMInterface, UserProxyAgent,
};
use crate::config_manager::resolve_llm_config;
use crate::conversations::{ChatRequest, ChatResult};
use crate::error::{ChatError, RegistrationError};
use crate::tools::{register_tools, MemoMaker, Tool, ToolContext};
use crate::ui::{StandbyIndicator, UiElement, UiSink};

/// Turn cap for the boss/employee chat.
pub const MAX_TURNS: usize = 2;

pub fn memo_message(subject: &str) -> String {
    format!("Write a short memo about {}.", subject)
}

/// Everything one form submission produced.
#[derive(Debug)]
pub struct Interaction {
    pub results: Vec<ChatResult>,
    pub elements: Vec<UiElement>,
}

/// Owns the agents and runs one memo chat per submission.
pub struct Server {
    name: String,
    user_proxy: UserProxyAgent,
    boss: Arc<ConversableAgent>,
    employee: Arc<ConversableAgent>,
    standby: StandbyIndicator,
}

impl Server {
    /// Resolve the backend for `llm_tag` from the environment and wire the agents.
    pub fn new(name: &str, llm_tag: &str) -> Result<Self> {
        info!("{}: resolving LLM config for tag '{}'", name, llm_tag);
        let llm_config = resolve_llm_config(llm_tag)?;
        let llm = StatelessLLMFactory::create_llm(&llm_config)?;
        let tools: Vec<Arc<dyn Tool>> = vec![Arc::new(MemoMaker)];
        Ok(Self::with_llm(name, llm, &tools)?)
    }

    /// Build the server around an already-constructed model client.
    pub fn with_llm(
        name: &str,
        llm: Arc<dyn StatelessLLMInterface>,
        tools: &[Arc<dyn Tool>],
    ) -> Result<Self, RegistrationError> {
        let user_proxy = AgentFactory::user_proxy();
        let mut boss = AgentFactory::boss(llm.clone());
        let mut employee = AgentFactory::employee(llm);

        register_tools(tools, &mut boss, &mut employee)?;
        debug!("{}: registered {} tool(s)", name, tools.len());

        Ok(Self {
            name: name.to_string(),
            user_proxy,
            boss: Arc::new(boss),
            employee: Arc::new(employee),
            standby: StandbyIndicator::default(),
        })
    }

    pub fn standby(&self) -> &StandbyIndicator {
        &self.standby
    }

    pub fn chat_request(&self, subject: &str) -> ChatRequest {
        ChatRequest::new(
            self.boss.clone(),
            self.employee.clone(),
            memo_message(subject),
            MAX_TURNS,
        )
    }

    /// Handle a form submission. The standby indicator is held for the
    /// whole chat and released however it ends.
    pub async fn on_submit(&self, subject: &str) -> Result<Interaction, ChatError> {
        let _standby = self.standby.enter();
        info!("{}: memo requested about '{}'", self.name, subject);

        let context = ToolContext::new(UiSink::default());
        let results = self
            .user_proxy
            .initiate_chats(vec![self.chat_request(subject)], &context)
            .await?;
        let elements = context.ui.take().await;

        info!(
            "{}: interaction finished with {} UI element(s)",
            self.name,
            elements.len()
        );
        Ok(Interaction { results, elements })
    }
}
