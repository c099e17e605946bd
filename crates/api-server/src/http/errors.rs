use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::models::ErrorDetail;
use shared::service::MindMapError;
use tracing::error;

const EMPTY_PROMPT_DETAIL: &str = "Prompt must not be empty";
const UPSTREAM_FORMAT_DETAIL: &str = "The AI returned a response in an invalid format";
const INTERNAL_ERROR_DETAIL: &str = "Unexpected server error";

fn detail_response(status: StatusCode, detail: &str) -> Response {
    (status, Json(ErrorDetail::new(detail))).into_response()
}

pub(super) fn unprocessable_body_response(detail: &str) -> Response {
    detail_response(StatusCode::UNPROCESSABLE_ENTITY, detail)
}

pub(super) fn internal_error_response() -> Response {
    detail_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_DETAIL)
}

pub(super) fn mind_map_error_response(err: MindMapError) -> Response {
    match err {
        MindMapError::InvalidRequest => {
            detail_response(StatusCode::BAD_REQUEST, EMPTY_PROMPT_DETAIL)
        }
        // Already logged with the raw reply by the service.
        MindMapError::UpstreamFormat(_) => {
            detail_response(StatusCode::INTERNAL_SERVER_ERROR, UPSTREAM_FORMAT_DETAIL)
        }
        MindMapError::Store(err) => {
            error!(error = %err, "session store operation failed");
            internal_error_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use shared::service::MindMapError;

    use super::mind_map_error_response;

    #[test]
    fn maps_service_errors_to_statuses() {
        assert_eq!(
            mind_map_error_response(MindMapError::InvalidRequest).status(),
            StatusCode::BAD_REQUEST
        );

        let parse_err = serde_json::from_str::<serde_json::Value>("{")
            .expect_err("truncated json must fail");
        assert_eq!(
            mind_map_error_response(MindMapError::UpstreamFormat(parse_err)).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
