//! Detect when the visible window has reached the end of the rendered list.

/// Scroll geometry, in rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// First visible row.
    pub scroll_top: u32,
    /// Number of visible rows.
    pub client_height: u32,
    /// Total rows of rendered content.
    pub scroll_height: u32,
}

impl Viewport {
    pub fn at_end(&self) -> bool {
        self.scroll_top.saturating_add(self.client_height) >= self.scroll_height
    }

    /// The largest `scroll_top` that still shows a full window.
    pub fn max_scroll_top(&self) -> u32 {
        self.scroll_height.saturating_sub(self.client_height)
    }
}

/// Fires the load-more callback on scroll and resize observations.
///
/// Every observation at the end fires, including the initial one, so a
/// first page too short to fill the window pulls the next page. While
/// `suspended` nothing fires.
#[derive(Debug, Default)]
pub struct PageEndDetector {
    suspended: bool,
    fired: u64,
}

impl PageEndDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_scroll(&mut self, viewport: Viewport) -> bool {
        self.observe(viewport)
    }

    pub fn on_resize(&mut self, viewport: Viewport) -> bool {
        self.observe(viewport)
    }

    /// Suspend while a fetch is running; resume when it completes.
    pub fn set_suspended(&mut self, suspended: bool) {
        self.suspended = suspended;
    }

    pub fn fired(&self) -> u64 {
        self.fired
    }

    fn observe(&mut self, viewport: Viewport) -> bool {
        if self.suspended || !viewport.at_end() {
            return false;
        }
        self.fired += 1;
        tracing::trace!(?viewport, fired = self.fired, "Page end reached");
        true
    }
}
