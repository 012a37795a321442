use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::agent::stateless_llm::{LLMMessage, StatelessLLMInterface, ToolCall};
use crate::conversations::{ChatMessage, ToolResponse};
use crate::error::ChatError;
use crate::tools::{Tool, ToolContext, ToolDefinition};

/// Content of a message that ends a chat.
pub const TERMINATION_MARKER: &str = "TERMINATE";

/// When an agent would ask a human before replying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HumanInputMode {
    /// Before every reply. There is no console here, so the agent stays silent.
    Always,
    #[default]
    Never,
}

/// A named chat participant with an optional model behind it.
pub struct ConversableAgent {
    name: String,
    system_message: String,
    llm: Option<Arc<dyn StatelessLLMInterface>>,
    human_input_mode: HumanInputMode,
    /// Tools this agent's model may request.
    llm_tools: Vec<ToolDefinition>,
    /// Tools this agent runs when the other party requests them.
    function_map: HashMap<String, Arc<dyn Tool>>,
}

impl ConversableAgent {
    pub fn new(
        name: impl Into<String>,
        system_message: impl Into<String>,
        llm: Option<Arc<dyn StatelessLLMInterface>>,
        human_input_mode: HumanInputMode,
    ) -> Self {
        Self {
            name: name.into(),
            system_message: system_message.into(),
            llm,
            human_input_mode,
            llm_tools: Vec::new(),
            function_map: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn system_message(&self) -> &str {
        &self.system_message
    }

    pub fn human_input_mode(&self) -> HumanInputMode {
        self.human_input_mode
    }

    pub fn has_llm(&self) -> bool {
        self.llm.is_some()
    }

    pub fn llm_tools(&self) -> &[ToolDefinition] {
        &self.llm_tools
    }

    pub fn offers_tool(&self, name: &str) -> bool {
        self.llm_tools().iter().any(|t| t.name == name)
    }

    pub fn can_execute(&self, name: &str) -> bool {
        self.function_map.contains_key(name)
    }

    pub(crate) fn register_for_llm(&mut self, definition: ToolDefinition) {
        self.llm_tools.push(definition);
    }

    pub(crate) fn register_for_execution(&mut self, tool: Arc<dyn Tool>) {
        self.function_map.insert(tool.name(), tool);
    }

    pub fn is_termination_msg(message: &ChatMessage) -> bool {
        message
            .content
            .as_deref()
            .map(|c| c.trim() == TERMINATION_MARKER)
            .unwrap_or(false)
    }

    /// Produce this agent's next message given the transcript so far.
    ///
    /// `Ok(None)` means the agent has nothing to say, which ends the chat.
    pub async fn generate_reply(
        &self,
        transcript: &[ChatMessage],
        context: &ToolContext,
    ) -> Result<Option<ChatMessage>, ChatError> {
        if self.human_input_mode() == HumanInputMode::Always {
            warn!(
                "{}: human input requested but not available; not replying",
                self.name
            );
            return Ok(None);
        }

        let Some(last) = transcript.last() else {
            return Ok(None);
        };

        if last.sender != self.name && !last.tool_calls.is_empty() {
            let responses = self.execute_tool_calls(&last.tool_calls, context).await;
            return Ok(Some(ChatMessage::tool_responses(
                self.name.as_str(),
                responses,
            )));
        }

        let Some(llm) = &self.llm else {
            debug!("{}: no LLM configured; not replying", self.name);
            return Ok(None);
        };

        let system = Some(self.system_message()).filter(|s| !s.is_empty());
        let reply = llm
            .chat_completion(self.view(transcript), system, self.llm_tools())
            .await
            .map_err(|source| {
                error!("{}: LLM request failed: {}", self.name, source);
                ChatError::Llm {
                    agent: self.name.clone(),
                    source,
                }
            })?;

        Ok(Some(ChatMessage::from_reply(self.name.as_str(), reply)))
    }

    /// The transcript as this agent's model sees it.
    fn view(&self, transcript: &[ChatMessage]) -> Vec<LLMMessage> {
        let mut messages = Vec::with_capacity(transcript.len());
        for message in transcript {
            if message.sender == self.name {
                messages.push(LLMMessage::Assistant {
                    content: message.content.clone(),
                    tool_calls: message.tool_calls.clone(),
                });
            } else if !message.tool_responses.is_empty() {
                messages.extend(message.tool_responses.iter().map(|r| LLMMessage::Tool {
                    tool_call_id: r.tool_call_id.clone(),
                    content: r.content.clone(),
                }));
            } else if !message.tool_calls.is_empty() {
                // The model never issued these calls, so they travel as text.
                let mut text = message.content_str().to_string();
                for call in &message.tool_calls {
                    if !text.is_empty() {
                        text.push('\n');
                    }
                    text.push_str(&format!(
                        "***** Suggested tool call ({}): {} *****\nArguments: {}",
                        call.id, call.name, call.arguments
                    ));
                }
                messages.push(LLMMessage::User {
                    name: Some(message.sender.clone()),
                    content: text,
                });
            } else {
                messages.push(LLMMessage::User {
                    name: Some(message.sender.clone()),
                    content: message.content_str().to_string(),
                });
            }
        }
        messages
    }

    async fn execute_tool_calls(
        &self,
        calls: &[ToolCall],
        context: &ToolContext,
    ) -> Vec<ToolResponse> {
        let mut responses = Vec::with_capacity(calls.len());
        for call in calls {
            info!(
                "{}: executing tool call '{}' ({})",
                self.name, call.name, call.id
            );
            let content = match self.function_map.get(&call.name) {
                None => {
                    warn!("{}: no function registered for '{}'", self.name, call.name);
                    format!("Error: Function {} not found.", call.name)
                }
                Some(tool) => match parse_arguments(&call.arguments) {
                    Err(e) => {
                        error!("{}: bad arguments for '{}': {}", self.name, call.name, e);
                        format!("Error: {}", e)
                    }
                    Ok(params) => match tool.execute(params, context).await {
                        Ok(output) => output,
                        Err(e) => {
                            error!("{}: tool '{}' failed: {}", self.name, call.name, e);
                            format!("Error: {}", e)
                        }
                    },
                },
            };
            responses.push(ToolResponse {
                tool_call_id: call.id.clone(),
                content,
            });
        }
        responses
    }
}

fn parse_arguments(arguments: &str) -> Result<Value, serde_json::Error> {
    if arguments.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(arguments)
}

impl fmt::Debug for ConversableAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut functions: Vec<&String> = self.function_map.keys().collect();
        functions.sort();
        f.debug_struct("ConversableAgent")
            .field("name", &self.name)
            .field("system_message", &self.system_message)
            .field("has_llm", &self.llm.is_some())
            .field("human_input_mode", &self.human_input_mode)
            .field(
                "llm_tools",
                &self.llm_tools.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
            )
            .field("function_map", &functions)
            .finish()
    }
}
