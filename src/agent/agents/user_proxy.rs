use std::ops::Deref;
use tracing::info;

use super::conversable_agent::{ConversableAgent, HumanInputMode};
use crate::conversations::{initiate_chat, ChatRequest, ChatResult};
use crate::error::ChatError;
use crate::tools::ToolContext;

pub const USER_PROXY_NAME: &str = "Victor";

/// Code execution settings. Nothing is ever executed; this records that
/// any execution would happen without a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeExecutionConfig {
    pub use_docker: bool,
}

/// An agent standing in for the user. Has no model of its own and, with no
/// console to ask, never replies in a chat.
#[derive(Debug)]
pub struct UserProxyAgent {
    agent: ConversableAgent,
    code_execution: CodeExecutionConfig,
}

impl UserProxyAgent {
    pub fn new(name: impl Into<String>, code_execution: CodeExecutionConfig) -> Self {
        Self {
            agent: ConversableAgent::new(name, "", None, HumanInputMode::Always),
            code_execution,
        }
    }

    /// Run chats one after another. Each chat's message is extended with
    /// the summaries of the chats before it.
    pub async fn initiate_chats(
        &self,
        requests: Vec<ChatRequest>,
        context: &ToolContext,
    ) -> Result<Vec<ChatResult>, ChatError> {
        let mut results: Vec<ChatResult> = Vec::with_capacity(requests.len());
        for mut request in requests {
            if !results.is_empty() {
                let carryover: Vec<&str> = results.iter().map(|r| r.summary.as_str()).collect();
                request.message = with_carryover(&request.message, &carryover);
            }
            info!(
                "{}: running chat {} of sequence (code execution off, use_docker={})",
                self.agent.name(),
                results.len() + 1,
                self.code_execution.use_docker
            );
            results.push(initiate_chat(&request, context).await?);
        }
        Ok(results)
    }
}

impl Default for UserProxyAgent {
    fn default() -> Self {
        Self::new(USER_PROXY_NAME, CodeExecutionConfig { use_docker: false })
    }
}

impl Deref for UserProxyAgent {
    type Target = ConversableAgent;

    fn deref(&self) -> &Self::Target {
        &self.agent
    }
}

fn with_carryover(message: &str, summaries: &[&str]) -> String {
    format!("{}\nContext: \n{}", message, summaries.join("\n"))
}
