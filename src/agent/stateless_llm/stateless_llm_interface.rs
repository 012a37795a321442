use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::tools::ToolDefinition;

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    /// JSON-encoded arguments, as sent by the model.
    pub arguments: String,
}

/// One message in the view an agent sends to its model.
#[derive(Debug, Clone, PartialEq)]
pub enum LLMMessage {
    User {
        name: Option<String>,
        content: String,
    },
    Assistant {
        content: Option<String>,
        tool_calls: Vec<ToolCall>,
    },
    Tool {
        tool_call_id: String,
        content: String,
    },
}

/// A single assistant turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LLMReply {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}

#[cfg(test)]
impl LLMReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    pub fn tool_call(call: ToolCall) -> Self {
        Self {
            content: None,
            tool_calls: vec![call],
        }
    }
}

/// Interface for a stateless language model.
/// Stateless means the LLM doesn't store memory, system prompts, or user messages;
/// the caller sends the whole view each time.
#[async_trait]
pub trait StatelessLLMInterface: Send + Sync {
    async fn chat_completion(
        &self,
        messages: Vec<LLMMessage>,
        system: Option<&str>,
        tools: &[ToolDefinition],
    ) -> Result<LLMReply, LlmError>;
}
