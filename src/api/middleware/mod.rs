//! API middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. Recipient: resolves caller identity from gateway headers
//! 2. Audit logger: logs after identity is known

pub mod audit;
pub mod auth;
