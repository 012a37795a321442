use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

use super::stateless_llm_interface::{LLMMessage, LLMReply, StatelessLLMInterface, ToolCall};
use crate::error::LlmError;
use crate::tools::ToolDefinition;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI compatible LLM implementation
pub struct OpenAICompatibleLLM {
    client: Client,
    model: String,
    base_url: String,
    api_key: String,
    min_interval: Option<Duration>,
    last_request: Mutex<Option<Instant>>,
}

impl OpenAICompatibleLLM {
    /// `api_rate_limit` is in requests per second; non-positive values disable it.
    pub fn new(
        client: Client,
        model: String,
        base_url: String,
        api_key: String,
        api_rate_limit: Option<f64>,
    ) -> Self {
        info!(
            "Initialized OpenAICompatibleLLM: model={}, base_url={}",
            model, base_url
        );
        let min_interval = api_rate_limit
            .filter(|rate| *rate > 0.0)
            .map(|rate| Duration::from_secs_f64(1.0 / rate));

        Self {
            client,
            model,
            base_url,
            api_key,
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    fn build_payload(
        &self,
        messages: &[LLMMessage],
        system: Option<&str>,
        tools: &[ToolDefinition],
    ) -> Value {
        let mut messages_spec = Vec::with_capacity(messages.len() + 1);
        if let Some(sys) = system {
            messages_spec.push(json!({ "role": "system", "content": sys }));
        }
        messages_spec.extend(messages.iter().map(message_to_spec));

        let mut payload = json!({
            "model": self.model,
            "messages": messages_spec,
        });

        if !tools.is_empty() {
            let tools_spec: Vec<Value> = tools
                .iter()
                .map(|tool| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": tool.name,
                            "description": tool.description,
                            "parameters": tool.parameters,
                        }
                    })
                })
                .collect();
            payload["tools"] = Value::Array(tools_spec);
        }

        payload
    }

    /// Space requests at least `min_interval` apart.
    async fn throttle(&self) {
        let Some(interval) = self.min_interval else {
            return;
        };
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < interval {
                tokio::time::sleep(interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    async fn post(&self, payload: Value) -> Result<Value, LlmError> {
        self.throttle().await;

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

fn message_to_spec(message: &LLMMessage) -> Value {
    match message {
        LLMMessage::User { name, content } => {
            let mut spec = json!({ "role": "user", "content": content });
            if let Some(name) = name {
                spec["name"] = json!(name);
            }
            spec
        }
        LLMMessage::Assistant {
            content,
            tool_calls,
        } => {
            let mut spec = json!({ "role": "assistant", "content": content });
            if !tool_calls.is_empty() {
                spec["tool_calls"] = tool_calls
                    .iter()
                    .map(|call| {
                        json!({
                            "id": call.id,
                            "type": "function",
                            "function": {
                                "name": call.name,
                                "arguments": call.arguments,
                            }
                        })
                    })
                    .collect();
            }
            spec
        }
        LLMMessage::Tool {
            tool_call_id,
            content,
        } => json!({
            "role": "tool",
            "tool_call_id": tool_call_id,
            "content": content,
        }),
    }
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<ResponseToolCall>>,
}

#[derive(Deserialize)]
struct ResponseToolCall {
    id: String,
    function: ResponseFunction,
}

#[derive(Deserialize)]
struct ResponseFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

fn parse_reply(response: Value) -> Result<LLMReply, LlmError> {
    if let Some(error) = response.get("error") {
        return Err(LlmError::Api(error.to_string()));
    }

    let parsed: CompletionResponse = serde_json::from_value(response)
        .map_err(|e| LlmError::MalformedResponse(e.to_string()))?;
    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::MalformedResponse("no choices in response".to_string()))?;

    let tool_calls = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|call| ToolCall {
            id: call.id,
            name: call.function.name,
            arguments: call.function.arguments,
        })
        .collect();

    Ok(LLMReply {
        content: choice.message.content,
        tool_calls,
    })
}

#[async_trait]
impl StatelessLLMInterface for OpenAICompatibleLLM {
    async fn chat_completion(
        &self,
        messages: Vec<LLMMessage>,
        system: Option<&str>,
        tools: &[ToolDefinition],
    ) -> Result<LLMReply, LlmError> {
        debug!(
            "requesting chat completion: model={}, messages={}, tools={}",
            self.model,
            messages.len(),
            tools.len()
        );
        let payload = self.build_payload(&messages, system, tools);
        let response = self.post(payload).await?;
        parse_reply(response)
    }
}
