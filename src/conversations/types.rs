use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::agent::agents::ConversableAgent;
use crate::agent::stateless_llm::{LLMReply, ToolCall};

/// The result of running one tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolResponse {
    pub tool_call_id: String,
    pub content: String,
}

/// One entry in a chat transcript.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    /// Name of the agent that sent it.
    pub sender: String,
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tool_responses: Vec<ToolResponse>,
}

impl ChatMessage {
    pub fn text(sender: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_responses: Vec::new(),
        }
    }

    pub fn from_reply(sender: impl Into<String>, reply: LLMReply) -> Self {
        Self {
            sender: sender.into(),
            content: reply.content,
            tool_calls: reply.tool_calls,
            tool_responses: Vec::new(),
        }
    }

    pub fn tool_responses(sender: impl Into<String>, responses: Vec<ToolResponse>) -> Self {
        let content = responses
            .iter()
            .map(|r| r.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        Self {
            sender: sender.into(),
            content: Some(content),
            tool_calls: Vec::new(),
            tool_responses: responses,
        }
    }

    pub fn content_str(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}

/// A chat to run between two agents.
#[derive(Clone)]
pub struct ChatRequest {
    pub chat_id: Uuid,
    pub sender: Arc<ConversableAgent>,
    pub recipient: Arc<ConversableAgent>,
    pub message: String,
    pub max_turns: usize,
}

impl ChatRequest {
    pub fn new(
        sender: Arc<ConversableAgent>,
        recipient: Arc<ConversableAgent>,
        message: impl Into<String>,
        max_turns: usize,
    ) -> Self {
        Self {
            chat_id: Uuid::new_v4(),
            sender,
            recipient,
            message: message.into(),
            max_turns,
        }
    }
}

impl fmt::Debug for ChatRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatRequest")
            .field("chat_id", &self.chat_id)
            .field("sender", &self.sender.name())
            .field("recipient", &self.recipient.name())
            .field("message", &self.message)
            .field("max_turns", &self.max_turns)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResult {
    pub chat_id: Uuid,
    pub transcript: Vec<ChatMessage>,
    /// Content of the last message, empty when it had none.
    pub summary: String,
}
