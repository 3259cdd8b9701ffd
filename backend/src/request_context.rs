use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::{Instant, SystemTime, UNIX_EPOCH},
};

use axum::{
    extract::Request,
    http::{header::HeaderName, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;

/// Request id header, echoed on the response.
pub const REQUEST_ID_HEADER: &str = "x-request-id";
/// Trace id header, echoed on the response.
pub const TRACE_ID_HEADER: &str = "x-trace-id";

/// Client supplied ids longer than this are replaced.
const MAX_ID_LEN: usize = 128;

static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Wrap each request in an `http_request` span, echo the request and trace
/// ids back as response headers and log completion with status and latency.
pub async fn request_context_middleware(request: Request, next: Next) -> Response {
    let request_id = incoming_or_new_id(request.headers(), REQUEST_ID_HEADER, "req");
    let trace_id = incoming_or_new_id(request.headers(), TRACE_ID_HEADER, "trace");

    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started_at = Instant::now();

    let span = tracing::info_span!(
        "http_request",
        request_id = %request_id,
        trace_id = %trace_id,
        method = %method,
        path = %path,
    );

    let mut response = next.run(request).instrument(span.clone()).await;

    set_response_header(response.headers_mut(), REQUEST_ID_HEADER, &request_id);
    set_response_header(response.headers_mut(), TRACE_ID_HEADER, &trace_id);

    let status = response.status();
    let elapsed_ms = started_at.elapsed().as_millis();
    if status.is_server_error() {
        tracing::warn!(parent: &span, status = status.as_u16(), elapsed_ms, "request failed");
    } else {
        tracing::info!(parent: &span, status = status.as_u16(), elapsed_ms, "request completed");
    }

    response
}

fn incoming_or_new_id(headers: &HeaderMap, header_name: &'static str, prefix: &str) -> String {
    headers
        .get(header_name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| is_acceptable_id(value))
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| generate_id(prefix))
}

fn is_acceptable_id(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_ID_LEN
        && value
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | ':'))
}

fn generate_id(prefix: &str) -> String {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|value| value.as_millis())
        .unwrap_or_default();
    let counter = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{now_ms:x}-{counter:06x}")
}

fn set_response_header(headers: &mut HeaderMap, header_name: &'static str, value: &str) {
    let Ok(header_value) = HeaderValue::from_str(value) else {
        return;
    };
    headers.insert(HeaderName::from_static(header_name), header_value);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_well_formed_incoming_ids() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("abc-123"));
        assert_eq!(incoming_or_new_id(&headers, REQUEST_ID_HEADER, "req"), "abc-123");
    }

    #[test]
    fn replaces_missing_or_hostile_ids() {
        let mut headers = HeaderMap::new();
        headers.insert(TRACE_ID_HEADER, HeaderValue::from_static("<script>"));
        let trace = incoming_or_new_id(&headers, TRACE_ID_HEADER, "trace");
        assert!(trace.starts_with("trace-"));

        let request = incoming_or_new_id(&HeaderMap::new(), REQUEST_ID_HEADER, "req");
        assert!(request.starts_with("req-"));
        assert_ne!(request, incoming_or_new_id(&HeaderMap::new(), REQUEST_ID_HEADER, "req"));
    }
}
