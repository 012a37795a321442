use tracing::{debug, info};

use super::types::{ChatMessage, ChatRequest, ChatResult};
use crate::agent::agents::ConversableAgent;
use crate::error::ChatError;
use crate::tools::ToolContext;

/// Run a turn-capped chat between `request.sender` and `request.recipient`.
///
/// The first turn sends `request.message` as-is; each later turn lets the
/// sender reply before the recipient answers. The chat stops early when an
/// agent has nothing to say or a message is just the termination marker.
pub async fn initiate_chat(
    request: &ChatRequest,
    context: &ToolContext,
) -> Result<ChatResult, ChatError> {
    if request.max_turns == 0 {
        return Err(ChatError::InvalidRequest(
            "max_turns must be at least 1".to_string(),
        ));
    }

    let sender = request.sender.as_ref();
    let recipient = request.recipient.as_ref();
    info!(
        "starting chat {}: {} -> {} (max_turns={})",
        request.chat_id,
        sender.name(),
        recipient.name(),
        request.max_turns
    );

    let mut transcript = Vec::new();
    let opening = ChatMessage::text(sender.name(), request.message.as_str());

    if push(&mut transcript, opening, recipient) {
        for turn in 1..=request.max_turns {
            if turn > 1 && !take_turn(sender, recipient, &mut transcript, context).await? {
                break;
            }
            if !take_turn(recipient, sender, &mut transcript, context).await? {
                break;
            }
        }
    }

    let summary = transcript
        .last()
        .map(|m: &ChatMessage| m.content_str().to_string())
        .unwrap_or_default();
    info!(
        "chat {} finished after {} messages",
        request.chat_id,
        transcript.len()
    );

    Ok(ChatResult {
        chat_id: request.chat_id,
        transcript,
        summary,
    })
}

/// Let `speaker` reply to `listener`. Returns false when the chat should stop.
async fn take_turn(
    speaker: &ConversableAgent,
    listener: &ConversableAgent,
    transcript: &mut Vec<ChatMessage>,
    context: &ToolContext,
) -> Result<bool, ChatError> {
    match speaker.generate_reply(transcript, context).await? {
        Some(message) => Ok(push(transcript, message, listener)),
        None => {
            debug!("{} has no reply; ending chat", speaker.name());
            Ok(false)
        }
    }
}

fn push(
    transcript: &mut Vec<ChatMessage>,
    message: ChatMessage,
    listener: &ConversableAgent,
) -> bool {
    info!(
        "{} (to {}): {}",
        message.sender,
        listener.name(),
        describe(&message)
    );
    let terminated = ConversableAgent::is_termination_msg(&message);
    transcript.push(message);
    if terminated {
        debug!("termination message received by {}", listener.name());
    }
    !terminated
}

fn describe(message: &ChatMessage) -> String {
    if !message.tool_calls.is_empty() {
        let names: Vec<&str> = message.tool_calls.iter().map(|c| c.name.as_str()).collect();
        format!("[tool calls: {}]", names.join(", "))
    } else if !message.tool_responses.is_empty() {
        format!("[tool responses: {}]", message.content_str())
    } else {
        message.content_str().to_string()
    }
}
