// rest/routes/chat.rs — Guest chat endpoint.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::concierge::{self, ChatOutcome, ChatTurn};
use crate::AppContext;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

/// The envelope is the protocol: failures answer 200 with `success:false`
/// and a human-readable message, exactly what the chat UI renders.
pub async fn send(
    State(ctx): State<Arc<AppContext>>,
    Path(slug): Path<String>,
    Json(body): Json<ChatRequest>,
) -> Json<ChatOutcome> {
    let outcome = concierge::send_message(
        &ctx.storage,
        ctx.provider.as_ref(),
        &slug,
        &body.message,
        &body.history,
    )
    .await;
    Json(outcome)
}
