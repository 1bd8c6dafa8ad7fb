//! Paginated feed loading.
//!
//! [`FeedController`] pulls pages from a [`FeedProvider`] one at a time and
//! exposes a visible window that grows as the consumer nears the bottom.

mod controller;
mod provider;
mod scroll;

pub use controller::{FeedConfig, FeedController, FetchState};
pub use provider::{ApiFeedProvider, FeedProvider};
pub use scroll::{NearBottom, ScrollMetrics};

/// Anything the controller can buffer. Identifiers must be stable across
/// pages so duplicates can be spotted.
pub trait FeedEntry {
    fn entry_id(&self) -> &str;
}
