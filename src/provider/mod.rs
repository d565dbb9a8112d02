// provider/mod.rs — Conversational AI provider seam.
//
// The Context Assembler talks to a `ChatProvider` trait object so the hosted
// API can be swapped for a spy in tests. The only shipped implementation is
// the Gemini client in `gemini.rs`.

pub mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role vocabulary of the provider's turn history.
///
/// The provider only knows `user` and `model`; the Assembler maps every
/// non-user role onto `Model` before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

/// One normalized turn handed to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderTurn {
    pub role: TurnRole,
    pub text: String,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network-level failure (DNS, TLS, timeout, connection reset).
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    /// The provider answered with a non-success status.
    #[error("{message}")]
    Api { status: u16, message: String },
    /// A success response that carried no generated text.
    #[error("provider returned an empty response")]
    Empty,
}

/// A hosted chat-completion service: one system instruction, a turn history,
/// and a new user message in; generated text out.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn generate(
        &self,
        system_instruction: &str,
        history: &[ProviderTurn],
        message: &str,
    ) -> Result<String, ProviderError>;
}
