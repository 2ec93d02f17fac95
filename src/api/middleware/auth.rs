//! Recipient identity middleware.
//!
//! Authentication is performed by the portal's gateway, which forwards
//! the account id in `X-Recipient-Id` (and optionally the role in
//! `X-Recipient-Role`). This layer validates those headers and injects
//! `RecipientContext` for downstream handlers.

use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{RecipientContext, RECIPIENT_ID_HEADER, RECIPIENT_ROLE_HEADER};
use crate::models::enums::Role;

/// Require a recipient identity on every protected route.
pub async fn require_recipient(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    match recipient_from_headers(req.headers()) {
        Ok(recipient) => {
            req.extensions_mut().insert(recipient);
            next.run(req).await
        }
        Err(err) => err.into_response(),
    }
}

fn recipient_from_headers(headers: &HeaderMap) -> Result<RecipientContext, ApiError> {
    let recipient_id = headers
        .get(RECIPIENT_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
        .ok_or(ApiError::Unauthorized)?;

    let role = match headers.get(RECIPIENT_ROLE_HEADER) {
        None => None,
        Some(value) => {
            let raw = value.to_str().map_err(|_| ApiError::Unauthorized)?;
            Some(raw.trim().parse::<Role>().map_err(|_| ApiError::Unauthorized)?)
        }
    };

    Ok(RecipientContext { recipient_id, role })
}
