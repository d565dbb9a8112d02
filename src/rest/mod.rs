// rest/mod.rs — HTTP surface.
//
// Public (never gated):
//   GET  /api/v1/health
//   GET  /api/v1/rooms/{slug}              (branding + FAQ for the chat page)
//   POST /api/v1/rooms/{slug}/chat
//   GET  /{slug}                           (guest chat page)
//   GET  /media/*                          (stored gallery images)
//
// Admin (behind the access gate):
//   GET  /                                 (dashboard data)
//   POST /add
//   GET  /edit/{slug}    POST /edit/{slug}
//   POST /edit/{slug}/delete
//   POST /edit/{slug}/gallery
//   POST /edit/{slug}/gallery/{item_id}/remove

pub mod auth;
pub mod routes;

use anyhow::Result;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir};
use tracing::info;

use crate::AppContext;

pub async fn start_server(ctx: Arc<AppContext>) -> Result<()> {
    let bind = format!("{}:{}", ctx.config.bind_address, ctx.config.port);
    let addr: SocketAddr = bind.parse()?;

    let router = build_router(ctx);

    info!("concierge listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    let admin = Router::new()
        .route("/", get(routes::rooms::dashboard))
        .route("/add", post(routes::rooms::create))
        .route(
            "/edit/{slug}",
            get(routes::rooms::edit_form).post(routes::rooms::update),
        )
        .route("/edit/{slug}/delete", post(routes::rooms::delete))
        .route("/edit/{slug}/gallery", post(routes::gallery::add))
        .route(
            "/edit/{slug}/gallery/{item_id}/remove",
            post(routes::gallery::remove),
        )
        .layer(middleware::from_fn_with_state(
            ctx.clone(),
            auth::require_admin,
        ));

    let api = Router::new()
        .route("/api/v1/health", get(routes::health::health))
        .route("/api/v1/rooms/{slug}", get(routes::rooms::public_info))
        .route("/api/v1/rooms/{slug}/chat", post(routes::chat::send))
        .layer(CorsLayer::permissive());

    Router::new()
        .merge(admin)
        .merge(api)
        .route("/{slug}", get(routes::pages::guest_page))
        .nest_service("/media", ServeDir::new(ctx.media.root()))
        .with_state(ctx)
}
