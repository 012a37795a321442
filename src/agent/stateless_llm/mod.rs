pub mod stateless_llm_interface;
pub mod openai_compatible_llm;

pub use stateless_llm_interface::*;
pub use openai_compatible_llm::*;

#[cfg(test)]
pub(crate) mod scripted {
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::{LLMMessage, LLMReply, StatelessLLMInterface};
    use crate::error::LlmError;
    use crate::tools::ToolDefinition;

    /// What the model was asked on one call.
    #[derive(Debug, Clone)]
    pub struct RecordedCall {
        pub messages: Vec<LLMMessage>,
        pub system: Option<String>,
        pub tool_names: Vec<String>,
    }

    /// Replays queued replies in order; errors once the queue is empty.
    #[derive(Default)]
    pub struct ScriptedLLM {
        replies: Mutex<VecDeque<Result<LLMReply, LlmError>>>,
        calls: Mutex<Vec<RecordedCall>>,
        on_call: Option<Box<dyn Fn() + Send + Sync>>,
    }

    impl ScriptedLLM {
        pub fn new(replies: Vec<Result<LLMReply, LlmError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                ..Default::default()
            }
        }

        pub fn with_hook(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
            self.on_call = Some(Box::new(hook));
            self
        }

        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StatelessLLMInterface for ScriptedLLM {
        async fn chat_completion(
            &self,
            messages: Vec<LLMMessage>,
            system: Option<&str>,
            tools: &[ToolDefinition],
        ) -> Result<LLMReply, LlmError> {
            if let Some(hook) = &self.on_call {
                hook();
            }
            self.calls.lock().unwrap().push(RecordedCall {
                messages,
                system: system.map(str::to_string),
                tool_names: tools.iter().map(|t| t.name.clone()).collect(),
            });
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(LlmError::Api("script exhausted".to_string())))
        }
    }
}
