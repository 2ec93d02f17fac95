//! Audit logging middleware.
//!
//! Logs every API request with recipient, method, path, and
//! response status. Runs innermost (after the recipient layer).

use std::time::Instant;

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::types::RecipientContext;

pub async fn log_access(
    req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let recipient = req
        .extensions()
        .get::<RecipientContext>()
        .map(|r| r.recipient_id.to_string())
        .unwrap_or_else(|| "anonymous".to_string());
    let started = Instant::now();

    let response = next.run(req).await;

    tracing::info!(
        %method,
        %path,
        %recipient,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "API access"
    );

    response
}
