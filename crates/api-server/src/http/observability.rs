use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::http::{HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

const REQUEST_ID_HEADER: &str = "x-request-id";
const MAX_REQUEST_ID_LEN: usize = 128;

pub(super) async fn request_observability_middleware(req: Request, next: Next) -> Response {
    let request_id = resolve_request_id(&req);
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or(path);
    let started_at = Instant::now();

    let span = info_span!("http_request", request_id = %request_id);
    let mut response = next.run(req).instrument(span).await;
    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), header_value);
    }

    let status = response.status().as_u16();
    let latency_ms = started_at.elapsed().as_millis() as u64;
    if status >= 500 {
        warn!(
            request_id = %request_id,
            method = %method,
            route = %route,
            status,
            latency_ms,
            "request completed with server error"
        );
    } else {
        info!(
            request_id = %request_id,
            method = %method,
            route = %route,
            status,
            latency_ms,
            "request completed"
        );
    }

    response
}

fn resolve_request_id(req: &Request) -> String {
    req.headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(normalize_request_id)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

fn normalize_request_id(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_REQUEST_ID_LEN {
        return None;
    }

    let valid = trimmed
        .bytes()
        .all(|byte| byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.'));
    valid.then(|| trimmed.to_string())
}
