//! Square render viewport derived from the window size.

/// Pixel viewport. Width and height are always equal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// The largest square that fits in a `window_width × window_height` window.
    pub fn from_window(window_width: u32, window_height: u32) -> Self {
        let side = window_width.min(window_height);
        Self {
            width: side,
            height: side,
        }
    }

    pub fn side(&self) -> u32 {
        self.width
    }

    /// A zero-sized viewport renders nothing.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Tracks the viewport across window resize notifications.
#[derive(Clone, Debug, Default)]
pub struct ViewportManager {
    current: Viewport,
}

impl ViewportManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes the viewport for a new window size and returns it.
    ///
    /// Repeating the same size is harmless and returns the same viewport.
    pub fn resize(&mut self, window_width: u32, window_height: u32) -> Viewport {
        let next = Viewport::from_window(window_width, window_height);
        if next != self.current {
            log::debug!(
                "viewport {}x{} -> {}x{} (window {}x{})",
                self.current.width,
                self.current.height,
                next.width,
                next.height,
                window_width,
                window_height
            );
            self.current = next;
        }
        next
    }

    pub fn current(&self) -> Viewport {
        self.current
    }
}
