//! Notification client cache.
//!
//! One reusable cache abstraction shared by every role shell:
//! - `store`: the `NotificationStore` seam and its error taxonomy
//! - `http`: reqwest-backed store talking to the notification API
//! - `cache`: the ordered, de-duplicated in-memory projection
//! - `session`: refresh / mark-read / mark-all / delete against a store
//! - `poller`: scoped poll timer, aborted on drop
//! - `shell`: role-parameterized shell owning one session and one poller
//! - `feedback`: transient user-visible messages (toasts)
//!
//! The server is the source of truth. The cache is reset on every
//! successful refresh and never flips an entry from read back to unread.

pub mod cache;
pub mod feedback;
pub mod http;
pub mod poller;
pub mod session;
pub mod shell;
pub mod store;

pub use cache::{badge_label, CacheSnapshot, NotificationCache};
pub use feedback::{FeedbackSink, LogFeedback, Toast, ToastLevel};
pub use http::HttpNotificationStore;
pub use poller::PollHandle;
pub use session::{MarkAllReport, NotificationSession, RefreshOutcome};
pub use shell::{nav_items, NavItem, RoleShell};
pub use store::{NotificationStore, StoreError};

#[cfg(test)]
pub(crate) mod testing;
