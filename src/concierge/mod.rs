// concierge/mod.rs — Context Assembler.
//
// The request-scoped orchestration behind the chat endpoint: fetch the room,
// normalize the turn history for the provider's constraints, build the system
// instruction, call the provider, and fold every outcome into the uniform
// `{success, response}` envelope. Nothing here persists state and no error
// escapes past `send_message`.

pub mod prompt;

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::provider::{ChatProvider, ProviderTurn, TurnRole};
use crate::storage::Storage;

/// Reply used whenever the room lookup fails — absent slug and storage
/// errors look identical to the guest.
pub const ROOM_NOT_FOUND_REPLY: &str = "I couldn't find the room details.";

const SYSTEM_ERROR_PREFIX: &str = "System Error: ";
const UNKNOWN_ERROR: &str = "Unknown error";

/// One client-held conversation turn. Lifecycle is entirely page-session
/// scoped — turns arrive with each request and are never stored.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatTurn {
    #[serde(default)]
    pub id: Option<String>,
    pub role: String,
    #[serde(alias = "content")]
    pub text: String,
}

/// Uniform chat response envelope. `response` carries either generated text
/// or a human-readable error message — never null.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatOutcome {
    pub success: bool,
    pub response: String,
}

impl ChatOutcome {
    fn ok(response: String) -> Self {
        Self {
            success: true,
            response,
        }
    }

    fn fail(response: impl Into<String>) -> Self {
        Self {
            success: false,
            response: response.into(),
        }
    }
}

/// Map client roles onto the provider vocabulary and enforce the provider's
/// ordering constraint that a conversation must open with a user turn.
///
/// `user` stays `user`; any other role becomes `model`. If the first
/// normalized turn is a model turn it is removed — exactly one leading
/// element, not a loop (the guest UI seeds the page with a single welcome
/// message, which is the only way a history can start with the assistant).
pub fn normalize_history(history: &[ChatTurn]) -> Vec<ProviderTurn> {
    let mut turns: Vec<ProviderTurn> = history
        .iter()
        .map(|t| ProviderTurn {
            role: if t.role == "user" {
                TurnRole::User
            } else {
                TurnRole::Model
            },
            text: t.text.clone(),
        })
        .collect();

    if turns.first().is_some_and(|t| t.role == TurnRole::Model) {
        turns.remove(0);
    }
    turns
}

/// Handle one guest chat request.
///
/// The message is deliberately not validated for non-emptiness — the provider
/// sees exactly what the client sent. No retries, no streaming, and a failed
/// provider call surfaces immediately in the envelope.
pub async fn send_message(
    storage: &Storage,
    provider: &dyn ChatProvider,
    slug: &str,
    message: &str,
    history: &[ChatTurn],
) -> ChatOutcome {
    let room = match storage.get_room(slug).await {
        Ok(Some(room)) => room,
        Ok(None) => {
            error!(slug = %slug, "chat request for unknown room");
            return ChatOutcome::fail(ROOM_NOT_FOUND_REPLY);
        }
        Err(e) => {
            error!(slug = %slug, err = %e, "room lookup failed");
            return ChatOutcome::fail(ROOM_NOT_FOUND_REPLY);
        }
    };

    let system_prompt = prompt::build_system_prompt(&room);
    let turns = normalize_history(history);

    match provider.generate(&system_prompt, &turns, message).await {
        Ok(text) => ChatOutcome::ok(text),
        Err(e) => {
            error!(slug = %slug, err = %e, "provider call failed");
            let mut msg = e.to_string();
            if msg.is_empty() {
                msg = UNKNOWN_ERROR.to_string();
            }
            ChatOutcome::fail(format!("{SYSTEM_ERROR_PREFIX}{msg}"))
        }
    }
}
