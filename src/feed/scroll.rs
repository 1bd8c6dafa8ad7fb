/// Where the consumer's viewport sits within the rendered content, in
/// whatever units the consumer measures (pixels, rows).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollMetrics {
    pub offset: u32,
    pub content_height: u32,
    pub viewport_height: u32,
}

impl ScrollMetrics {
    /// Distance between the bottom of the viewport and the end of content.
    pub fn remaining(&self) -> u32 {
        self.content_height
            .saturating_sub(self.offset)
            .saturating_sub(self.viewport_height)
    }
}

/// Decides when a viewport is close enough to the end of its content to ask
/// the feed for more.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NearBottom {
    distance: u32,
}

impl NearBottom {
    pub const DEFAULT_DISTANCE: u32 = 500;

    pub fn new(distance: u32) -> Self {
        Self { distance }
    }

    pub fn check(&self, metrics: ScrollMetrics) -> bool {
        metrics.remaining() < self.distance
    }
}

impl Default for NearBottom {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DISTANCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(offset: u32) -> ScrollMetrics {
        ScrollMetrics {
            offset,
            content_height: 3000,
            viewport_height: 800,
        }
    }

    #[test]
    fn far_from_bottom() {
        assert!(!NearBottom::default().check(at(0)));
        assert!(!NearBottom::default().check(at(1700)));
    }

    #[test]
    fn within_distance() {
        assert!(NearBottom::default().check(at(1701)));
        assert!(NearBottom::default().check(at(2200)));
    }

    #[test]
    fn overscroll_counts_as_bottom() {
        assert_eq!(at(2900).remaining(), 0);
        assert!(NearBottom::default().check(at(2900)));
    }

    #[test]
    fn content_shorter_than_viewport() {
        let metrics = ScrollMetrics {
            offset: 0,
            content_height: 300,
            viewport_height: 800,
        };
        assert!(NearBottom::new(1).check(metrics));
    }
}
