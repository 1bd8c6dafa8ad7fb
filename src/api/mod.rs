mod client;
mod error;
mod types;

pub use client::{DEFAULT_API_URL, StyleClient};
pub use error::ApiError;
pub use types::{Post, Registration, SearchFilters, UserProfile};
