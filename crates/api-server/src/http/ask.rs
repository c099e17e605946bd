use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::models::AskRequest;
use tracing::warn;

use super::AppState;
use super::errors::{mind_map_error_response, unprocessable_body_response};

pub(super) async fn ask(
    State(state): State<AppState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "rejected malformed ask body");
            return unprocessable_body_response(
                "Request body must be a JSON object with a string prompt",
            );
        }
    };

    match state
        .service
        .handle_ask(request.chat_id.as_deref(), request.prompt.as_deref())
        .await
    {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(err) => mind_map_error_response(err),
    }
}
