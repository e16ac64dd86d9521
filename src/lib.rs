//! # Isoview
//!
//! **A solid spinning under a fixed parallel projection.**
//!
//! The crate loads an indexed triangle mesh, flattens it into a vertex
//! stream with one color per face, and spins it about the `(1, 1, 1)`
//! diagonal at a constant angular rate while an isometric (or other fixed
//! parallel) view looks on. The window keeps a square viewport that follows
//! the shorter side of the window.
//!
//! ## Quick Start
//!
//! ```no_run
//! use isoview::{AppConfig, ViewPreset};
//!
//! fn main() -> isoview::Result<()> {
//!     isoview::run_with_config(
//!         AppConfig::new()
//!             .title("Cube")
//!             .view(ViewPreset::Isometric)
//!             .speed(30.0),
//!     )
//! }
//! ```
//!
//! ## Pieces
//!
//! - [`mesh::assemble`] turns [`RawGeometry`] into position and color streams.
//! - [`transform`] composes the scale, rotations and fixed views as [`Mat4`]s.
//! - [`AnimationClock`] turns wall-clock milliseconds into an angle.
//! - [`ViewportManager`] keeps the viewport square.
//! - [`FrameDriver`] runs one frame against any [`FrameTarget`].
//!
//! Everything except [`GpuContext`], [`ColorPass`] and the event loop in
//! [`run`] is plain data and can be used without a GPU.

mod app;
mod clock;
mod color_pass;
mod error;
mod frame;
mod geometry;
mod gpu;
pub mod mesh;
pub mod transform;
mod viewport;

pub use app::{AppConfig, MeshSource, run, run_with_config};
pub use clock::{AnimationClock, ClockState, DEFAULT_DEGREES_PER_SECOND};
pub use color_pass::{ColorPass, SurfaceFrame};
pub use error::{AssetLoadError, Error, Result};
pub use frame::{FrameDriver, FrameStatus, FrameTarget, StopSignal};
pub use geometry::RawGeometry;
pub use gpu::GpuContext;
pub use mesh::{AssembledMesh, ColoredMesh, FACE_PALETTE, FaceColor, Vertex};
pub use transform::{ParseViewError, ViewPreset};
pub use viewport::{Viewport, ViewportManager};

// Re-export glam math types for convenience
pub use glam::{Mat4, Vec3};
