//! Test doubles and data builders.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::api::{ApiError, Post, UserProfile};
use crate::feed::{FeedEntry, FeedProvider};

#[derive(Debug, Clone, PartialEq)]
pub struct TestItem {
    pub id: String,
}

impl TestItem {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string() }
    }
}

impl FeedEntry for TestItem {
    fn entry_id(&self) -> &str {
        &self.id
    }
}

/// `count` items with ids `{prefix}0`, `{prefix}1`, ...
pub fn items(prefix: &str, count: usize) -> Vec<TestItem> {
    (0..count)
        .map(|i| TestItem::new(&format!("{prefix}{i}")))
        .collect()
}

type Script<T> = VecDeque<Result<Vec<T>, ApiError>>;

/// Provider that replays a fixed list of page results, in call order, and
/// records what was asked of it. Once the script runs out every page is empty.
#[derive(Clone)]
pub struct ScriptedProvider<T = TestItem> {
    script: Arc<Mutex<Script<T>>>,
    calls: Arc<Mutex<Vec<usize>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    completed: Arc<AtomicUsize>,
    delay: Option<Duration>,
    slow: bool,
}

impl<T> Default for ScriptedProvider<T> {
    fn default() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::default(),
            in_flight: Arc::default(),
            max_in_flight: Arc::default(),
            completed: Arc::default(),
            delay: None,
            slow: false,
        }
    }
}

#[allow(dead_code)]
impl<T> ScriptedProvider<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, result: Result<Vec<T>, ApiError>) -> Self {
        self.script.lock().unwrap().push_back(result);
        self
    }

    /// Sleep this long before answering.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Yield to the scheduler a few times before answering.
    pub fn slow(mut self) -> Self {
        self.slow = true;
        self
    }

    pub fn calls(&self) -> Vec<usize> {
        self.calls.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

impl<T: FeedEntry + Clone + Send + 'static> FeedProvider for ScriptedProvider<T> {
    type Item = T;

    async fn fetch_page(&self, page: usize, _page_size: usize) -> Result<Vec<T>, ApiError> {
        self.calls.lock().unwrap().push(page);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.slow {
            for _ in 0..3 {
                tokio::task::yield_now().await;
            }
        }

        let result = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(Vec::new()));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.completed.fetch_add(1, Ordering::SeqCst);
        result
    }
}

pub struct PostBuilder {
    id: String,
    text: String,
    product_link: Option<String>,
    image_url: Option<String>,
    likes: u64,
    comments: u64,
}

impl Default for PostBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
impl PostBuilder {
    pub fn new() -> Self {
        Self {
            id: "p1".to_string(),
            text: "Oversized linen shirt in sand".to_string(),
            product_link: Some("https://shop.example.com/p1".to_string()),
            image_url: Some("https://img.example.com/p1.jpg".to_string()),
            likes: 12,
            comments: 3,
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn no_link(mut self) -> Self {
        self.product_link = None;
        self
    }

    pub fn likes(mut self, likes: u64) -> Self {
        self.likes = likes;
        self
    }

    pub fn comments(mut self, comments: u64) -> Self {
        self.comments = comments;
        self
    }

    pub fn build(self) -> Post {
        Post {
            id: self.id,
            text: self.text,
            product_link: self.product_link,
            image_url: self.image_url,
            likes: self.likes,
            comments: self.comments,
        }
    }
}

pub fn sample_profile() -> UserProfile {
    UserProfile {
        id: "u1".to_string(),
        username: "mona".to_string(),
        email: "mona@example.com".to_string(),
        profile_picture: None,
        skin_tone: "olive".to_string(),
        body_type: "athletic".to_string(),
        weight: 61.5,
        height: 168.0,
        age: 29,
        style_preference: "minimal".to_string(),
        additional_info: String::new(),
    }
}
