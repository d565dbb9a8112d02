// rest/routes/pages.rs — Guest chat page.
//
// `GET /{slug}` serves the embedded chat shell for a resolving slug, 404
// otherwise. The shell is static apart from the slug/name/color substitution;
// branding and FAQ quick-questions are fetched client-side from the public
// info endpoint.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;

use crate::AppContext;

const CHAT_SHELL: &str = include_str!("../assets/chat.html");
const DEFAULT_COLOR: &str = "#0f172a";

pub async fn guest_page(State(ctx): State<Arc<AppContext>>, Path(slug): Path<String>) -> Response {
    let room = match ctx.storage.get_room(&slug).await {
        Ok(Some(room)) => room,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Html("<!doctype html><title>Not found</title><p>This room does not exist.</p>"),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!(slug = %slug, err = %e, "guest page lookup failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("<!doctype html><title>Error</title><p>Something went wrong.</p>"),
            )
                .into_response();
        }
    };

    let color = room.primary_color.as_deref().unwrap_or(DEFAULT_COLOR);
    let page = CHAT_SHELL
        .replace("__SLUG__", &room.slug)
        .replace("__NAME__", &html_escape(&room.name))
        .replace("__COLOR__", &html_escape(color));
    Html(page).into_response()
}

fn html_escape(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            '\'' => "&#39;".to_string(),
            _ => c.to_string(),
        })
        .collect()
}
