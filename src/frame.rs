//! Per-frame orchestration.
//!
//! [`FrameDriver`] owns the [`AnimationClock`] and runs the fixed frame
//! sequence against any [`FrameTarget`]:
//!
//! 1. clear color and depth,
//! 2. advance the clock (the first tick only records a baseline),
//! 3. recompute the model-view rotation from the clock's angle,
//! 4. upload it and draw the whole mesh as a triangle list.
//!
//! The driver never schedules anything itself. It returns a [`FrameStatus`]
//! and the host requests the next redraw only while that status is
//! [`FrameStatus::Continue`]. Raising the [`StopSignal`] ends the loop at the
//! next tick.

use crate::clock::AnimationClock;
use crate::transform;
use glam::Mat4;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// The drawing operations a frame needs from the graphics context.
pub trait FrameTarget {
    /// Clears the color and depth buffers.
    fn clear(&mut self);
    /// Uploads the per-frame model-view matrix.
    fn set_model_view(&mut self, model_view: Mat4);
    /// Draws `vertex_count` vertices as a triangle list.
    fn draw_triangles(&mut self, vertex_count: u32);
}

/// Cloneable flag asking the frame loop to stop.
#[derive(Clone, Debug, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Whether the host should schedule another frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameStatus {
    Continue,
    Stopped,
}

/// Runs one frame per call to [`tick`](Self::tick).
#[derive(Debug)]
pub struct FrameDriver {
    clock: AnimationClock,
    vertex_count: u32,
    stop: StopSignal,
    frames: u64,
}

impl FrameDriver {
    pub fn new(clock: AnimationClock, vertex_count: u32, stop: StopSignal) -> Self {
        Self {
            clock,
            vertex_count,
            stop,
            frames: 0,
        }
    }

    /// Renders one frame at `now_ms` (monotonic milliseconds).
    ///
    /// Once the stop signal is raised nothing is drawn and the clock is left
    /// untouched.
    pub fn tick<T: FrameTarget + ?Sized>(&mut self, now_ms: f64, target: &mut T) -> FrameStatus {
        if self.stop.is_stopped() {
            return FrameStatus::Stopped;
        }

        target.clear();
        let angle = self.clock.tick(now_ms);
        target.set_model_view(transform::model_view(angle));
        target.draw_triangles(self.vertex_count);

        self.frames += 1;
        FrameStatus::Continue
    }

    pub fn clock(&self) -> &AnimationClock {
        &self.clock
    }

    pub fn angle(&self) -> f64 {
        self.clock.angle()
    }

    /// Frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn stop_signal(&self) -> &StopSignal {
        &self.stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::ViewportManager;

    #[derive(Debug, PartialEq)]
    enum Call {
        Clear,
        ModelView(Mat4),
        Draw(u32),
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
    }

    impl FrameTarget for Recorder {
        fn clear(&mut self) {
            self.calls.push(Call::Clear);
        }

        fn set_model_view(&mut self, model_view: Mat4) {
            self.calls.push(Call::ModelView(model_view));
        }

        fn draw_triangles(&mut self, vertex_count: u32) {
            self.calls.push(Call::Draw(vertex_count));
        }
    }

    fn driver() -> FrameDriver {
        FrameDriver::new(AnimationClock::new(), 36, StopSignal::new())
    }

    #[test]
    fn frame_runs_clear_upload_draw_in_order() {
        let mut driver = driver();
        let mut target = Recorder::default();

        assert_eq!(driver.tick(1000.0, &mut target), FrameStatus::Continue);
        assert_eq!(
            target.calls,
            vec![Call::Clear, Call::ModelView(Mat4::IDENTITY), Call::Draw(36)]
        );
    }

    #[test]
    fn second_frame_rotates_by_elapsed_time() {
        let mut driver = driver();
        let mut target = Recorder::default();

        driver.tick(1000.0, &mut target);
        driver.tick(1100.0, &mut target);

        assert_eq!(driver.angle(), 3.0);
        assert_eq!(driver.frames(), 2);
        match &target.calls[4] {
            Call::ModelView(m) => {
                assert!(m.abs_diff_eq(transform::rotate_axis(3.0, 1.0, 1.0, 1.0), 1e-6))
            }
            other => panic!("expected model-view upload, got {:?}", other),
        }
    }

    #[test]
    fn stop_signal_ends_the_loop() {
        let mut driver = driver();
        let stop = driver.stop_signal().clone();
        let mut target = Recorder::default();

        driver.tick(0.0, &mut target);
        driver.tick(500.0, &mut target);
        stop.stop();

        assert_eq!(driver.tick(1000.0, &mut target), FrameStatus::Stopped);
        assert_eq!(target.calls.len(), 6);
        assert_eq!(driver.angle(), 15.0);
        assert_eq!(driver.frames(), 2);
    }

    #[test]
    fn stopped_before_start_draws_nothing() {
        let stop = StopSignal::new();
        stop.stop();
        let mut driver = FrameDriver::new(AnimationClock::new(), 36, stop);
        let mut target = Recorder::default();

        assert_eq!(driver.tick(0.0, &mut target), FrameStatus::Stopped);
        assert!(target.calls.is_empty());
        assert!(!driver.clock().is_running());
    }

    #[test]
    fn resizing_leaves_rotation_alone() {
        let mut driver = driver();
        let mut viewports = ViewportManager::new();
        let mut target = Recorder::default();

        driver.tick(0.0, &mut target);
        driver.tick(1000.0, &mut target);
        let before = driver.angle();

        let a = viewports.resize(640, 480);
        let b = viewports.resize(640, 480);

        assert_eq!(a, b);
        assert_eq!(driver.angle(), before);

        driver.tick(2000.0, &mut target);
        assert_eq!(driver.angle(), 60.0);
    }

    #[test]
    fn works_through_a_trait_object() {
        let mut driver = driver();
        let mut recorder = Recorder::default();
        let target: &mut dyn FrameTarget = &mut recorder;

        driver.tick(0.0, target);
        assert_eq!(recorder.calls.len(), 3);
    }
}
