//! Viewport scroll state for the chat container.
//!
//! Offsets are measured in children: `offset` is the index of the child
//! aligned to the top of the visible area.

/// How a scroll request moves the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollBehavior {
    /// Ease toward the target over several ticks.
    #[default]
    Smooth,
    /// Jump straight to the target.
    Instant,
}

/// A scroll-into-view request, as last issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest {
    /// Child index aligned to the top of the view.
    pub index: usize,
    pub behavior: ScrollBehavior,
}

/// Scroll position and in-flight smooth scroll.
#[derive(Debug, Default)]
pub struct Viewport {
    offset: usize,
    target: Option<usize>,
    last_request: Option<ScrollRequest>,
    requests: u64,
}

impl Viewport {
    /// Create a viewport at the top.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the child at the top of the view.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Target of the running smooth scroll, if any.
    pub fn target(&self) -> Option<usize> {
        self.target
    }

    /// Check if a smooth scroll is running.
    pub fn is_animating(&self) -> bool {
        self.target.is_some()
    }

    /// The most recent scroll-into-view request.
    pub fn last_request(&self) -> Option<ScrollRequest> {
        self.last_request
    }

    /// Number of scroll-into-view requests issued so far.
    pub fn request_count(&self) -> u64 {
        self.requests
    }

    /// Align child `index` to the top of the visible area.
    pub fn scroll_into_view(&mut self, index: usize, behavior: ScrollBehavior) {
        self.requests += 1;
        self.last_request = Some(ScrollRequest { index, behavior });

        match behavior {
            ScrollBehavior::Instant => {
                self.offset = index;
                self.target = None;
            }
            ScrollBehavior::Smooth => {
                if index == self.offset {
                    self.target = None;
                } else {
                    self.target = Some(index);
                }
            }
        }
    }

    /// Advance a smooth scroll by one step.
    ///
    /// Each step covers half the remaining distance (at least one child).
    /// Returns `true` while still moving.
    pub fn tick(&mut self) -> bool {
        let Some(target) = self.target else {
            return false;
        };

        let distance = target.abs_diff(self.offset);
        let step = distance.div_ceil(2).max(1);
        if target > self.offset {
            self.offset += step;
        } else {
            self.offset -= step;
        }

        if self.offset == target {
            self.target = None;
            return false;
        }
        true
    }

    /// Finish any running smooth scroll immediately.
    pub fn settle(&mut self) {
        if let Some(target) = self.target.take() {
            self.offset = target;
        }
    }

    /// Manual scroll up. Cancels a running smooth scroll.
    pub fn scroll_up(&mut self, amount: usize) {
        self.target = None;
        self.offset = self.offset.saturating_sub(amount);
    }

    /// Manual scroll down, clamped to the last child.
    pub fn scroll_down(&mut self, amount: usize, len: usize) {
        self.target = None;
        let max_offset = len.saturating_sub(1);
        self.offset = (self.offset + amount).min(max_offset);
    }

    /// Jump to the first child.
    pub fn jump_to_start(&mut self) {
        self.target = None;
        self.offset = 0;
    }

    /// Keep offsets inside a container of `len` children.
    pub fn clamp(&mut self, len: usize) {
        let max_offset = len.saturating_sub(1);
        self.offset = self.offset.min(max_offset);
        if let Some(target) = self.target {
            let target = target.min(max_offset);
            self.target = (target != self.offset).then_some(target);
        }
    }

    /// Reset to the top.
    pub fn reset(&mut self) {
        self.offset = 0;
        self.target = None;
    }
}
