use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error};

use crate::agent::agents::ConversableAgent;
use crate::error::{RegistrationError, ToolError};
use crate::ui::UiSink;

/// What the requesting agent's model sees of a tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema of the arguments object.
    pub parameters: Value,
}

/// Per-interaction state handed to a tool when it runs.
#[derive(Debug, Clone, Default)]
pub struct ToolContext {
    pub ui: UiSink,
}

impl ToolContext {
    pub fn new(ui: UiSink) -> Self {
        Self { ui }
    }
}

/// Trait that all tools must implement
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the tool definition for the AI API
    fn definition(&self) -> ToolDefinition;

    /// Executes the tool; the returned text goes back to the model.
    async fn execute(&self, params: Value, context: &ToolContext) -> Result<String, ToolError>;

    fn name(&self) -> String {
        self.definition().name
    }
}

/// Bind each tool so `caller` may request it and `executor` runs it.
///
/// Nothing is registered unless every tool in the list binds; the first
/// failure is logged once and returned.
pub fn register_tools(
    tools: &[Arc<dyn Tool>],
    caller: &mut ConversableAgent,
    executor: &mut ConversableAgent,
) -> Result<(), RegistrationError> {
    let mut staged: Vec<(ToolDefinition, Arc<dyn Tool>)> = Vec::with_capacity(tools.len());
    let mut seen = HashSet::new();

    for tool in tools {
        let definition = tool.definition();
        debug!(
            "registering '{}' as a tool for {} to use",
            definition.name,
            caller.name()
        );
        if let Err(e) = validate(&definition, &seen, caller, executor) {
            error!("{}", e);
            return Err(e);
        }
        seen.insert(definition.name.clone());
        staged.push((definition, tool.clone()));
    }

    for (definition, tool) in staged {
        caller.register_for_llm(definition);
        executor.register_for_execution(tool);
    }
    Ok(())
}

fn validate(
    definition: &ToolDefinition,
    seen: &HashSet<String>,
    caller: &ConversableAgent,
    executor: &ConversableAgent,
) -> Result<(), RegistrationError> {
    let name = &definition.name;
    if !is_valid_tool_name(name) {
        return Err(RegistrationError::InvalidName(name.clone()));
    }
    if definition.description.trim().is_empty() {
        return Err(RegistrationError::MissingDescription(name.clone()));
    }
    if !caller.has_llm() {
        return Err(RegistrationError::CallerWithoutLlm {
            tool: name.clone(),
            agent: caller.name().to_string(),
        });
    }
    if seen.contains(name) || caller.offers_tool(name) {
        return Err(RegistrationError::Duplicate {
            tool: name.clone(),
            agent: caller.name().to_string(),
        });
    }
    if executor.can_execute(name) {
        return Err(RegistrationError::Duplicate {
            tool: name.clone(),
            agent: executor.name().to_string(),
        });
    }
    Ok(())
}

/// Function names accepted by OpenAI-style tool specs.
fn is_valid_tool_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 64
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
