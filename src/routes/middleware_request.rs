use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use uuid::Uuid;

pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Tags the request with an id (the caller's `X-Request-Id`, or a fresh
/// UUID), echoes it on the response and logs the outcome.
pub async fn trace_request(mut req: Request, next: Next) -> Response {
    let start = Instant::now();

    let header = req
        .headers()
        .get(&REQUEST_ID_HEADER)
        .filter(|v| !v.is_empty())
        .cloned();
    let id = match header {
        Some(value) => value,
        None => {
            let fresh = HeaderValue::from_str(&Uuid::new_v4().simple().to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("unknown"));
            req.headers_mut().insert(REQUEST_ID_HEADER.clone(), fresh.clone());
            fresh
        }
    };
    let req_id = id.to_str().unwrap_or("invalid").to_string();

    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let mut response = next.run(req).await;
    response.headers_mut().insert(REQUEST_ID_HEADER.clone(), id);

    tracing::info!(
        req_id = %req_id,
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        dur = ?start.elapsed(),
        "request"
    );

    response
}
