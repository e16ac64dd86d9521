//! Wall-clock driven rotation angle.
//!
//! [`AnimationClock`] is the only mutable animation state in the crate. The
//! first tick records a baseline timestamp; every later tick advances the
//! angle by `rate * elapsed`, so the angle depends only on elapsed time and
//! never on how many frames were drawn in between.

/// Angular rate used by the demo, in degrees per second.
pub const DEFAULT_DEGREES_PER_SECOND: f64 = 30.0;

/// Whether the clock has seen its first timestamp yet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClockState {
    /// No frame has been ticked.
    Idle,
    /// A previous timestamp (milliseconds) exists.
    Running { last_ms: f64 },
}

/// Rotation angle advanced by elapsed wall-clock time.
#[derive(Clone, Debug)]
pub struct AnimationClock {
    state: ClockState,
    angle: f64,
    degrees_per_second: f64,
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self::with_rate(DEFAULT_DEGREES_PER_SECOND)
    }
}

impl AnimationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an idle clock turning at `degrees_per_second`.
    pub fn with_rate(degrees_per_second: f64) -> Self {
        Self {
            state: ClockState::Idle,
            angle: 0.0,
            degrees_per_second,
        }
    }

    /// Feeds a monotonic timestamp in milliseconds and returns the new angle.
    ///
    /// The first call only records the baseline. A timestamp earlier than
    /// the previous one advances nothing and becomes the new baseline.
    pub fn tick(&mut self, now_ms: f64) -> f64 {
        match self.state {
            ClockState::Idle => {
                log::debug!("animation clock started at {:.1}ms", now_ms);
            }
            ClockState::Running { last_ms } => {
                let delta_ms = (now_ms - last_ms).max(0.0);
                self.angle += self.degrees_per_second * delta_ms / 1000.0;
            }
        }
        self.state = ClockState::Running { last_ms: now_ms };
        self.angle
    }

    /// Current angle in degrees. Not wrapped.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, ClockState::Running { .. })
    }

    pub fn degrees_per_second(&self) -> f64 {
        self.degrees_per_second
    }

    /// Returns to idle with a zero angle.
    pub fn reset(&mut self) {
        self.state = ClockState::Idle;
        self.angle = 0.0;
    }
}
