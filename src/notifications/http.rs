//! HTTP-backed notification store.
//!
//! Talks to the notification API under `/api/notifications`, sending the
//! recipient identity headers on every call.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use uuid::Uuid;

use super::store::{NotificationStore, StoreError};
use crate::api::types::{RECIPIENT_ID_HEADER, RECIPIENT_ROLE_HEADER};
use crate::config::CacheConfig;
use crate::models::enums::Role;
use crate::models::Notification;

pub struct HttpNotificationStore {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

/// Identity headers sent with every request.
fn identity_headers(recipient_id: Uuid, role: Option<Role>) -> Result<HeaderMap, StoreError> {
    let mut headers = HeaderMap::new();
    let id = HeaderValue::from_str(&recipient_id.hyphenated().to_string())
        .map_err(|e| StoreError::Client(format!("Invalid recipient header: {e}")))?;
    headers.insert(RECIPIENT_ID_HEADER, id);
    if let Some(role) = role {
        headers.insert(RECIPIENT_ROLE_HEADER, HeaderValue::from_static(role.as_str()));
    }
    Ok(headers)
}

impl HttpNotificationStore {
    /// Store bound to `recipient_id`, using `config.request_timeout` for
    /// every call.
    pub fn new(
        base_url: &str,
        recipient_id: Uuid,
        role: Option<Role>,
        config: &CacheConfig,
    ) -> Result<Self, StoreError> {
        let timeout = config.request_timeout;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(identity_headers(recipient_id, role)?)
            .build()
            .map_err(|e| StoreError::Client(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/notifications{path}", self.base_url)
    }

    fn transport_error(&self, e: reqwest::Error) -> StoreError {
        if e.is_timeout() {
            StoreError::Network(format!("Request timed out after {}s", self.timeout.as_secs()))
        } else if e.is_connect() {
            StoreError::Network(format!("Cannot reach {}", self.base_url))
        } else {
            StoreError::Network(e.to_string())
        }
    }

    async fn check(&self, response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(error_from_body(status, &body))
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// Map a non-2xx response to a store error, keeping the server's message.
fn error_from_body(status: StatusCode, body: &str) -> StoreError {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok().map(|e| e.error);

    match (status, parsed) {
        (StatusCode::NOT_FOUND, parsed) => StoreError::NotFound {
            message: parsed.map(|b| b.message),
        },
        (StatusCode::BAD_REQUEST, Some(b)) if b.code == "VALIDATION_FAILED" => {
            StoreError::Validation(b.message)
        }
        (status, parsed) => StoreError::Server {
            status: status.as_u16(),
            message: parsed.map(|b| b.message),
        },
    }
}

impl NotificationStore for HttpNotificationStore {
    async fn list(&self) -> Result<Vec<Notification>, StoreError> {
        let response = self
            .client
            .get(self.url(""))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let response = self.check(response).await?;
        response
            .json::<Vec<Notification>>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn mark_read(&self, id: Uuid) -> Result<(), StoreError> {
        let response = self
            .client
            .patch(self.url(&format!("/{id}/read")))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.check(response).await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let response = self
            .client
            .delete(self.url(&format!("/{id}")))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.check(response).await?;
        Ok(())
    }
}
