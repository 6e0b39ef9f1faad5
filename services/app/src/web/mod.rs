pub mod protocol;
pub mod rest;
pub mod state;
pub mod ws_handler;

// Re-export the main WebSocket handler to make it easily accessible
// to the binary that will build the web server router.
pub use ws_handler::ws_handler;

use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, post, put},
    Router,
};
use rest::*;
use state::ServerState;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Builds the complete application router: REST API, WebSocket feed and Swagger UI.
pub fn router(state: Arc<ServerState>) -> Router {
    let origin = state.config.app_origin.origin().ascii_serialization();
    let mut cors = CorsLayer::new()
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, ACCEPT]);
    match origin.parse::<HeaderValue>() {
        Ok(origin) => cors = cors.allow_origin(origin),
        Err(e) => warn!("Ignoring unusable CORS origin {:?}: {}", origin, e),
    }

    let api_router = Router::new()
        .route("/api/state", get(get_state_handler))
        .route("/api/theme/toggle", post(toggle_theme_handler))
        .route("/api/sidebar/toggle", post(toggle_sidebar_handler))
        .route("/api/summaries", post(add_summary_handler))
        .route(
            "/api/summaries/{id}",
            axum::routing::patch(update_summary_handler).delete(delete_summary_handler),
        )
        .route("/api/summaries/{id}/favorite", post(toggle_favorite_handler))
        .route("/api/selection", put(set_selection_handler))
        .route("/api/loading", put(set_loading_handler))
        .route("/api/youtube-videos", put(set_youtube_videos_handler))
        .route("/api/summarize", post(summarize_handler))
        .route("/api/jobs/{id}", get(job_status_handler))
        .route("/api/handoff", get(handoff_handler))
        .route("/ws", get(ws_handler))
        .layer(cors)
        .with_state(state);

    // Merge the API router with the Swagger UI router for a complete application.
    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
