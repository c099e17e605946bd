use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};

use super::AppState;
use super::errors::mind_map_error_response;

pub(super) async fn clear_session(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
) -> Response {
    match state.service.clear_session(&chat_id).await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(err) => mind_map_error_response(err),
    }
}
