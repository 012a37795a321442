use std::sync::Arc;
use tracing::info;

use crate::agent::agents::{ConversableAgent, HumanInputMode, UserProxyAgent};
use crate::agent::stateless_llm::StatelessLLMInterface;

pub const BOSS_NAME: &str = "Bill";
pub const BOSS_INSTRUCTION: &str = "You are responsible for ensuring your staff of writers produce memorandums in accordance with Army Regulation 25-50.";

pub const EMPLOYEE_NAME: &str = "Milton";
pub const EMPLOYEE_INSTRUCTION: &str = "You create memorandums.";

/// Factory for the fixed cast of the memo chat
pub struct AgentFactory;

impl AgentFactory {
    /// The supervisor who requests memos.
    pub fn boss(llm: Arc<dyn StatelessLLMInterface>) -> ConversableAgent {
        info!("Initializing agent: {}", BOSS_NAME);
        ConversableAgent::new(BOSS_NAME, BOSS_INSTRUCTION, Some(llm), HumanInputMode::Never)
    }

    /// The writer who drafts memos and runs the memo tool.
    pub fn employee(llm: Arc<dyn StatelessLLMInterface>) -> ConversableAgent {
        info!("Initializing agent: {}", EMPLOYEE_NAME);
        ConversableAgent::new(
            EMPLOYEE_NAME,
            EMPLOYEE_INSTRUCTION,
            Some(llm),
            HumanInputMode::Never,
        )
    }

    pub fn user_proxy() -> UserProxyAgent {
        UserProxyAgent::default()
    }
}
