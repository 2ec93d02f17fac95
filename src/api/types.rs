//! Shared types for the API layer.

use std::sync::Arc;

use uuid::Uuid;

use crate::core_state::CoreState;
use crate::models::enums::Role;

/// Header carrying the authenticated recipient's account id.
pub const RECIPIENT_ID_HEADER: &str = "x-recipient-id";

/// Header carrying the authenticated recipient's role.
pub const RECIPIENT_ROLE_HEADER: &str = "x-recipient-role";

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

/// Caller identity, injected into request extensions by the recipient
/// middleware. Authentication itself happens upstream.
#[derive(Debug, Clone)]
pub struct RecipientContext {
    pub recipient_id: Uuid,
    pub role: Option<Role>,
}
