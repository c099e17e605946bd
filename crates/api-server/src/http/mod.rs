use axum::routing::{delete, get, post};
use axum::{Router, middleware};
use shared::service::MindMapService;
use tower_http::cors::CorsLayer;

mod ask;
mod errors;
mod observability;
mod sessions;
mod status;

#[derive(Clone)]
pub struct AppState {
    pub service: MindMapService,
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(status::status))
        .route("/stats", get(status::stats))
        .route("/ask", post(ask::ask))
        .route("/clear/{chat_id}", delete(sessions::clear_session))
        .layer(middleware::from_fn(
            observability::request_observability_middleware,
        ))
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
