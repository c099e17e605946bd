use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};

use super::AppState;
use super::errors::mind_map_error_response;

pub(super) async fn status(State(state): State<AppState>) -> Response {
    match state.service.status().await {
        Ok(status) => Json(status).into_response(),
        Err(err) => mind_map_error_response(err),
    }
}

pub(super) async fn stats(State(state): State<AppState>) -> Response {
    match state.service.stats().await {
        Ok(stats) => Json(stats).into_response(),
        Err(err) => mind_map_error_response(err),
    }
}
