//! Notification REST API.
//!
//! Exposes the notification store as HTTP endpoints for the portal's
//! role shells. Routes are nested under `/api/`; protected routes run
//! behind Recipient → Audit middleware.
//!
//! The router is composable: `notification_api_router()` returns a
//! `Router` that can be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::notification_api_router;
pub use server::{start_api_server_on, ApiServer, ApiSession};
pub use types::ApiContext;
