//! Repository layer: entity-scoped database operations.

mod notification;

pub use notification::*;
