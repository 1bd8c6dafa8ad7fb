use std::collections::HashSet;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::{FeedEntry, FeedProvider};
use crate::api::ApiError;

#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Items per page request and per window increment.
    pub batch_size: usize,
    pub fetch_timeout: Duration,
    /// Drop items whose id is already buffered.
    pub dedupe: bool,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            batch_size: 5,
            fetch_timeout: Duration::from_secs(10),
            dedupe: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    FetchingInitial,
    FetchingMore,
    /// The provider returned its last page. Terminal.
    Exhausted,
}

/// A finished fetch, delivered back to the controller's owner.
pub struct FetchOutcome<T> {
    generation: u64,
    page: usize,
    result: Result<Vec<T>, ApiError>,
}

/// Incremental feed loader.
///
/// Owns the buffer of fetched items and reveals it one batch at a time.
/// Fetches run as spawned tasks and report over a channel; the owner drains
/// the channel with [`poll_results`](Self::poll_results) or
/// [`settle`](Self::settle). At most one fetch is in flight at any time.
pub struct FeedController<P: FeedProvider> {
    provider: P,
    config: FeedConfig,
    buffer: Vec<P::Item>,
    seen: HashSet<String>,
    /// Next page to request. Advances only when a page arrives.
    next_page: usize,
    /// Number of batches revealed to the consumer.
    revealed_pages: usize,
    state: FetchState,
    error: Option<String>,
    generation: u64,
    cancel: CancellationToken,
    result_tx: mpsc::Sender<FetchOutcome<P::Item>>,
    result_rx: mpsc::Receiver<FetchOutcome<P::Item>>,
}

impl<P: FeedProvider> FeedController<P> {
    pub fn new(provider: P, config: FeedConfig) -> Self {
        let (result_tx, result_rx) = mpsc::channel(4);
        Self {
            provider,
            config: FeedConfig {
                batch_size: config.batch_size.max(1),
                ..config
            },
            buffer: Vec::new(),
            seen: HashSet::new(),
            next_page: 1,
            revealed_pages: 1,
            state: FetchState::Idle,
            error: None,
            generation: 0,
            cancel: CancellationToken::new(),
            result_tx,
            result_rx,
        }
    }

    /// Starts a fresh load from page 1, dropping anything loaded or in
    /// flight before.
    pub fn initialize(&mut self) {
        self.generation += 1;
        self.cancel.cancel();
        self.cancel = CancellationToken::new();

        self.buffer.clear();
        self.seen.clear();
        self.next_page = 1;
        self.revealed_pages = 1;
        self.error = None;
        self.state = FetchState::Idle;

        info!(generation = self.generation, "loading feed");
        self.start_fetch();
    }

    /// The consumer is close to the end of what it has shown.
    pub fn on_near_bottom(&mut self) {
        if self.is_fetching() {
            trace!(state = ?self.state, "near-bottom ignored");
            return;
        }
        let consumed = self.window_consumed();
        if self.is_exhausted() {
            // Nothing more to fetch, but a short last page may still be hidden.
            if consumed && self.buffer.len() > self.visible().len() {
                self.reveal();
            }
            return;
        }
        if consumed {
            self.reveal();
        }
        self.maybe_prefetch();
    }

    /// Re-issues the request that last failed. Returns false when there is
    /// nothing to retry.
    pub fn retry(&mut self) -> bool {
        if self.state != FetchState::Idle || self.error.is_none() {
            return false;
        }
        info!(page = self.next_page, "retrying");
        self.start_fetch();
        true
    }

    pub fn visible(&self) -> &[P::Item] {
        let len = (self.revealed_pages * self.config.batch_size).min(self.buffer.len());
        &self.buffer[..len]
    }

    pub fn buffer(&self) -> &[P::Item] {
        &self.buffer
    }

    pub fn state(&self) -> FetchState {
        self.state
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_fetching(&self) -> bool {
        matches!(
            self.state,
            FetchState::FetchingInitial | FetchState::FetchingMore
        )
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == FetchState::Exhausted
    }

    /// Applies every fetch that has already finished. Never blocks.
    pub fn poll_results(&mut self) {
        while let Ok(outcome) = self.result_rx.try_recv() {
            self.handle_result(outcome);
        }
    }

    /// Waits for the next finished fetch without applying it.
    pub async fn next_result(&mut self) -> Option<FetchOutcome<P::Item>> {
        self.result_rx.recv().await
    }

    /// Applies results until no fetch is in flight, following any prefetch
    /// chain the results trigger.
    pub async fn settle(&mut self) {
        while self.is_fetching() {
            match self.result_rx.recv().await {
                Some(outcome) => self.handle_result(outcome),
                None => break,
            }
        }
    }

    pub fn handle_result(&mut self, outcome: FetchOutcome<P::Item>) {
        let FetchOutcome {
            generation,
            page,
            result,
        } = outcome;

        if generation != self.generation {
            debug!(page, generation, "discarded stale page");
            return;
        }

        match result {
            Ok(items) if items.is_empty() => {
                info!(page, "feed exhausted");
                self.state = FetchState::Exhausted;
            }
            Ok(items) => {
                let received = items.len();
                let added = self.append(items);
                self.next_page += 1;
                debug!(page, received, added, buffered = self.buffer.len(), "page loaded");

                if received < self.config.batch_size {
                    info!(page, received, "short page, feed exhausted");
                    self.state = FetchState::Exhausted;
                } else if added == 0 {
                    // The provider is repeating itself; paging further would never end.
                    info!(page, received, "page held only known items, feed exhausted");
                    self.state = FetchState::Exhausted;
                } else {
                    self.state = FetchState::Idle;
                    self.maybe_prefetch();
                }
            }
            Err(e) => {
                warn!(page, error = %e, "page fetch failed");
                self.error = Some(e.user_message());
                self.state = FetchState::Idle;
            }
        }
    }

    /// Appends in arrival order and returns how many items were new.
    fn append(&mut self, items: Vec<P::Item>) -> usize {
        let before = self.buffer.len();
        for item in items {
            if self.config.dedupe && !self.seen.insert(item.entry_id().to_string()) {
                debug!(id = item.entry_id(), "dropping duplicate item");
                continue;
            }
            self.buffer.push(item);
        }
        self.buffer.len() - before
    }

    fn reveal(&mut self) {
        self.revealed_pages += 1;
        debug!(revealed = self.revealed_pages, "revealing next batch");
    }

    fn window_consumed(&self) -> bool {
        self.visible().len() == self.revealed_pages * self.config.batch_size
    }

    fn maybe_prefetch(&mut self) {
        let wanted = (self.revealed_pages + 1) * self.config.batch_size;
        if self.state == FetchState::Idle && self.buffer.len() < wanted {
            trace!(buffered = self.buffer.len(), wanted, "prefetching");
            self.start_fetch();
        }
    }

    fn start_fetch(&mut self) {
        let page = self.next_page;
        self.state = if self.buffer.is_empty() && page == 1 {
            FetchState::FetchingInitial
        } else {
            FetchState::FetchingMore
        };
        self.error = None;

        let provider = self.provider.clone();
        let page_size = self.config.batch_size;
        let timeout = self.config.fetch_timeout;
        let generation = self.generation;
        let cancel = self.cancel.clone();
        let tx = self.result_tx.clone();

        debug!(page, page_size, "fetching page");
        tokio::spawn(async move {
            let fetch = tokio::time::timeout(timeout, provider.fetch_page(page, page_size));
            let result = tokio::select! {
                _ = cancel.cancelled() => return,
                res = fetch => res.unwrap_or(Err(ApiError::Timeout)),
            };
            let _ = tx
                .send(FetchOutcome {
                    generation,
                    page,
                    result,
                })
                .await;
        });
    }
}

impl<P: FeedProvider> Drop for FeedController<P> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
