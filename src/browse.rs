//! Plain-text feed browsing on top of [`FeedController`].
//!
//! The terminal is treated as a viewport of `viewport_rows` lines. Each
//! Enter scrolls one screen; when the screen lands close to the end of the
//! loaded content the controller gets a near-bottom signal.

use anyhow::{Context, Result, bail};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::api::Post;
use crate::feed::{FeedController, FeedProvider, FetchState, NearBottom, ScrollMetrics};

pub fn format_post(index: usize, post: &Post) -> Vec<String> {
    let mut meta = format!("     {} likes, {} comments", post.likes, post.comments);
    if let Some(link) = &post.product_link {
        meta.push_str("  ");
        meta.push_str(link);
    }
    vec![
        format!("{:>3}. {}", index + 1, post.text.trim()),
        meta,
        String::new(),
    ]
}

pub fn status_line(shown: usize, buffered: usize, state: FetchState) -> String {
    match state {
        FetchState::Exhausted if shown == buffered => {
            format!("-- {shown} posts, end of feed (q: quit)")
        }
        FetchState::FetchingInitial | FetchState::FetchingMore => {
            format!("-- {shown} posts, loading more...")
        }
        _ => format!("-- {shown} posts (Enter: more, q: quit)"),
    }
}

/// Rendered lines of the visible window and how far the user has paged
/// through them.
pub struct Pager {
    viewport_rows: u32,
    near_bottom: NearBottom,
    lines: Vec<String>,
    rendered_items: usize,
    shown_rows: usize,
}

impl Pager {
    pub fn new(viewport_rows: u32, near_bottom_rows: u32) -> Self {
        Self {
            viewport_rows: viewport_rows.max(1),
            near_bottom: NearBottom::new(near_bottom_rows),
            lines: Vec::new(),
            rendered_items: 0,
            shown_rows: 0,
        }
    }

    /// Renders items that became visible since the last call.
    pub fn sync(&mut self, visible: &[Post]) {
        for (i, post) in visible.iter().enumerate().skip(self.rendered_items) {
            self.lines.extend(format_post(i, post));
        }
        self.rendered_items = self.rendered_items.max(visible.len());
    }

    pub fn next_screen(&mut self) -> &[String] {
        let start = self.shown_rows;
        let end = (start + self.viewport_rows as usize).min(self.lines.len());
        self.shown_rows = end;
        &self.lines[start..end]
    }

    pub fn shown_items(&self) -> usize {
        self.rendered_items
    }

    pub fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics {
            offset: self.shown_rows.saturating_sub(self.viewport_rows as usize) as u32,
            content_height: self.lines.len() as u32,
            viewport_height: self.viewport_rows,
        }
    }

    pub fn near_bottom(&self) -> bool {
        self.near_bottom.check(self.metrics())
    }
}

fn print_screen(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

fn print_status<P: FeedProvider<Item = Post>>(feed: &FeedController<P>, pager: &Pager) {
    if let Some(err) = feed.error() {
        println!("!! {err} (r: retry)");
    }
    println!(
        "{}",
        status_line(pager.shown_items(), feed.buffer().len(), feed.state())
    );
}

/// Interactive browsing: results are applied as they arrive while the user
/// pages through what is already loaded.
pub async fn run<P: FeedProvider<Item = Post>>(
    feed: &mut FeedController<P>,
    pager: &mut Pager,
) -> Result<()> {
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut first_screen = true;

    println!("Loading your personalised feed...");
    feed.initialize();

    loop {
        tokio::select! {
            Some(outcome) = feed.next_result() => {
                feed.handle_result(outcome);
                pager.sync(feed.visible());
                if first_screen && (!feed.buffer().is_empty() || feed.is_exhausted()) {
                    first_screen = false;
                    print_screen(pager.next_screen());
                    print_status(feed, pager);
                } else if feed.error().is_some() {
                    print_status(feed, pager);
                }
            }
            line = input.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    break;
                };
                match line.trim() {
                    "q" | "quit" => break,
                    "r" | "retry" => {
                        if !feed.retry() {
                            println!("Nothing to retry.");
                        }
                    }
                    _ => {
                        feed.poll_results();
                        pager.sync(feed.visible());
                        print_screen(pager.next_screen());
                        if pager.near_bottom() {
                            debug!(metrics = ?pager.metrics(), "near bottom");
                            feed.on_near_bottom();
                            pager.sync(feed.visible());
                        }
                        first_screen = false;
                        print_status(feed, pager);
                    }
                }
            }
        }
    }
    Ok(())
}

/// Non-interactive: loads `batches` windows, prints them and returns.
pub async fn print_batches<P: FeedProvider<Item = Post>>(
    feed: &mut FeedController<P>,
    batches: usize,
) -> Result<()> {
    for (i, post) in load_batches(feed, batches).await.iter().enumerate() {
        print_screen(&format_post(i, post));
    }
    if let Some(err) = feed.error() {
        bail!("{err}");
    }
    Ok(())
}

/// Reveals up to `batches` windows, stopping at the first failed fetch.
async fn load_batches<P: FeedProvider>(
    feed: &mut FeedController<P>,
    batches: usize,
) -> &[P::Item] {
    feed.initialize();
    feed.settle().await;
    for _ in 1..batches {
        if feed.error().is_some() {
            break;
        }
        feed.on_near_bottom();
        feed.settle().await;
    }
    feed.visible()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::feed::FeedConfig;
    use crate::test_utils::{PostBuilder, ScriptedProvider};
    use insta::assert_snapshot;

    fn posts(count: usize) -> Vec<Post> {
        (0..count)
            .map(|i| PostBuilder::new().id(&format!("p{i}")).build())
            .collect()
    }

    #[test]
    fn post_lines() {
        let post = PostBuilder::new()
            .text("  Pleated midi skirt ")
            .likes(40)
            .comments(2)
            .build();
        let lines = format_post(0, &post);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "  1. Pleated midi skirt");
        assert_eq!(
            lines[1],
            "     40 likes, 2 comments  https://shop.example.com/p1"
        );
        assert!(lines[2].is_empty());
    }

    #[test]
    fn post_without_link() {
        let post = PostBuilder::new().no_link().likes(0).comments(0).build();
        assert_eq!(format_post(9, &post)[1], "     0 likes, 0 comments");
        assert!(format_post(9, &post)[0].starts_with(" 10. "));
    }

    #[test]
    fn status_lines() {
        assert_snapshot!(status_line(10, 10, FetchState::Exhausted), @"-- 10 posts, end of feed (q: quit)");
        assert_snapshot!(status_line(5, 10, FetchState::FetchingMore), @"-- 5 posts, loading more...");
        assert_snapshot!(status_line(5, 10, FetchState::Idle), @"-- 5 posts (Enter: more, q: quit)");
        assert_snapshot!(status_line(5, 7, FetchState::Exhausted), @"-- 5 posts (Enter: more, q: quit)");
    }

    #[test]
    fn pager_pages_through_lines() {
        let mut pager = Pager::new(4, 2);
        pager.sync(&posts(2)); // 6 lines

        assert_eq!(pager.next_screen().len(), 4);
        assert_eq!(pager.next_screen().len(), 2);
        assert!(pager.next_screen().is_empty());
    }

    #[test]
    fn pager_only_renders_new_items() {
        let mut pager = Pager::new(24, 6);
        let all = posts(4);
        pager.sync(&all[..2]);
        pager.sync(&all[..2]);
        assert_eq!(pager.lines.len(), 6);

        pager.sync(&all);
        assert_eq!(pager.lines.len(), 12);
        assert_eq!(pager.shown_items(), 4);
        assert!(pager.lines[6].starts_with("  3. "));
    }

    #[test]
    fn near_bottom_follows_scroll_position() {
        let mut pager = Pager::new(6, 4);
        pager.sync(&posts(5)); // 15 lines

        pager.next_screen(); // rows 0..6, 9 rows below
        assert!(!pager.near_bottom());

        pager.next_screen(); // rows 6..12, 3 rows below
        assert!(pager.near_bottom());
    }

    fn post_page(prefix: &str, count: usize) -> Vec<Post> {
        (0..count)
            .map(|i| PostBuilder::new().id(&format!("{prefix}{i}")).build())
            .collect()
    }

    fn feed_over(provider: &ScriptedProvider<Post>) -> FeedController<ScriptedProvider<Post>> {
        FeedController::new(provider.clone(), FeedConfig::default())
    }

    #[tokio::test]
    async fn batches_reveal_one_window_each() {
        let provider = ScriptedProvider::new()
            .page(Ok(post_page("a", 5)))
            .page(Ok(post_page("b", 5)))
            .page(Ok(post_page("c", 5)))
            .page(Ok(post_page("d", 5)));
        let mut feed = feed_over(&provider);

        let shown = load_batches(&mut feed, 2).await;

        assert_eq!(shown.len(), 10);
        assert_eq!(shown[5].id, "b0");
        assert_eq!(provider.calls(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn batches_stop_at_end_of_feed() {
        let provider = ScriptedProvider::new()
            .page(Ok(post_page("a", 5)))
            .page(Ok(post_page("b", 3)));
        let mut feed = feed_over(&provider);

        print_batches(&mut feed, 4).await.unwrap();

        assert_eq!(feed.visible().len(), 8);
        assert_eq!(provider.calls(), vec![1, 2]);
    }

    #[tokio::test]
    async fn failed_fetch_is_reported_once() {
        let provider = ScriptedProvider::new()
            .page(Ok(post_page("a", 5)))
            .page(Err(ApiError::HttpStatus(500, "Feed backend down".into())))
            .page(Ok(post_page("b", 5)));
        let mut feed = feed_over(&provider);

        let err = print_batches(&mut feed, 3).await.unwrap_err();

        assert_eq!(err.to_string(), "Feed backend down");
        assert_eq!(provider.calls(), vec![1, 2]);
        assert_eq!(feed.visible().len(), 5);
    }
}
