use std::future::Future;

use crate::api::{ApiError, Post, StyleClient};

use super::FeedEntry;

/// Source of feed pages. Pages are numbered from 1. Returning fewer than
/// `page_size` items (or none) tells the controller the feed has ended.
pub trait FeedProvider: Clone + Send + Sync + 'static {
    type Item: FeedEntry + Send + 'static;

    fn fetch_page(
        &self,
        page: usize,
        page_size: usize,
    ) -> impl Future<Output = Result<Vec<Self::Item>, ApiError>> + Send;
}

/// Feed pages for one user, served by the recommendation service.
#[derive(Clone)]
pub struct ApiFeedProvider {
    client: StyleClient,
    user_id: String,
}

impl ApiFeedProvider {
    pub fn new(client: StyleClient, user_id: impl Into<String>) -> Self {
        Self {
            client,
            user_id: user_id.into(),
        }
    }
}

impl FeedProvider for ApiFeedProvider {
    type Item = Post;

    async fn fetch_page(&self, page: usize, page_size: usize) -> Result<Vec<Post>, ApiError> {
        self.client
            .fetch_feed_page(&self.user_id, page, page_size)
            .await
    }
}
