//! Matrix composition for the fixed parallel view and the spinning model.
//!
//! All functions are pure and take angles in degrees. Matrices are
//! [`glam::Mat4`]: column-major, multiplying column vectors on the right, so
//! in `compose(&[a, b])` the matrix `b` is applied to a point first.
//!
//! Two matrices reach the shader:
//!
//! - the **projection** ([`projection`]), uploaded once at startup: a uniform
//!   scale times the orientation of the chosen [`ViewPreset`];
//! - the **model-view** ([`model_view`]), recomputed each frame from the
//!   clock's angle as a rotation about the `(1, 1, 1)` diagonal.

use glam::{Mat4, Vec3};
use std::fmt;
use std::str::FromStr;

/// X-axis tilt of the isometric view, `-atan(1 / sqrt(2))` in degrees.
pub const ISOMETRIC_TILT_DEG: f32 = -35.264;
/// Y-axis turn of the isometric view.
pub const ISOMETRIC_TURN_DEG: f32 = 45.0;
/// Uniform scale applied in front of the view orientation.
pub const DEFAULT_PROJECTION_SCALE: f32 = 0.5;

/// Diagonal scale matrix.
pub fn scale(sx: f32, sy: f32, sz: f32) -> Mat4 {
    Mat4::from_scale(Vec3::new(sx, sy, sz))
}

/// Right-handed rotation of `angle_deg` about the axis `(x, y, z)`.
///
/// The axis need not be normalized. A zero axis yields the identity.
pub fn rotate_axis(angle_deg: f32, x: f32, y: f32, z: f32) -> Mat4 {
    let axis = Vec3::new(x, y, z).normalize_or_zero();
    if axis == Vec3::ZERO {
        return Mat4::IDENTITY;
    }
    Mat4::from_axis_angle(axis, angle_deg.to_radians())
}

pub fn rotate_x(angle_deg: f32) -> Mat4 {
    Mat4::from_rotation_x(angle_deg.to_radians())
}

pub fn rotate_y(angle_deg: f32) -> Mat4 {
    Mat4::from_rotation_y(angle_deg.to_radians())
}

pub fn rotate_z(angle_deg: f32) -> Mat4 {
    Mat4::from_rotation_z(angle_deg.to_radians())
}

/// Multiplies matrices left to right; the rightmost one acts on points first.
///
/// An empty slice yields the identity.
pub fn compose(matrices: &[Mat4]) -> Mat4 {
    matrices.iter().fold(Mat4::IDENTITY, |acc, m| acc * *m)
}

/// The canonical isometric orientation: tilt about X after turning about Y.
pub fn isometric_view() -> Mat4 {
    compose(&[rotate_x(ISOMETRIC_TILT_DEG), rotate_y(ISOMETRIC_TURN_DEG)])
}

/// The per-frame model rotation about the normalized `(1, 1, 1)` diagonal.
///
/// The angle is reduced modulo 360 in double precision before it is
/// narrowed, so long-running clocks keep full accuracy.
pub fn model_view(angle_deg: f64) -> Mat4 {
    rotate_axis(angle_deg.rem_euclid(360.0) as f32, 1.0, 1.0, 1.0)
}

/// The once-set projection uniform: `scale(s, s, s) · view`.
pub fn projection(view: ViewPreset, scale_factor: f32) -> Mat4 {
    compose(&[scale(scale_factor, scale_factor, scale_factor), view.matrix()])
}

/// Fixed parallel-projection orientations selectable at startup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ViewPreset {
    /// All three axes equally foreshortened.
    #[default]
    Isometric,
    /// Two axes equally foreshortened.
    Dimetric,
    /// All three axes foreshortened differently.
    Trimetric,
    /// Looking down -Z.
    Front,
    /// Looking down -Y.
    Top,
    /// Looking down -X.
    Side,
}

impl ViewPreset {
    pub const ALL: [ViewPreset; 6] = [
        ViewPreset::Isometric,
        ViewPreset::Dimetric,
        ViewPreset::Trimetric,
        ViewPreset::Front,
        ViewPreset::Top,
        ViewPreset::Side,
    ];

    /// Orientation matrix of this view, without the projection scale.
    pub fn matrix(self) -> Mat4 {
        match self {
            ViewPreset::Isometric => isometric_view(),
            ViewPreset::Dimetric => compose(&[rotate_x(-20.705), rotate_y(45.0)]),
            ViewPreset::Trimetric => compose(&[rotate_x(-30.0), rotate_y(30.0)]),
            ViewPreset::Front => Mat4::IDENTITY,
            ViewPreset::Top => rotate_x(90.0),
            ViewPreset::Side => rotate_y(-90.0),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ViewPreset::Isometric => "isometric",
            ViewPreset::Dimetric => "dimetric",
            ViewPreset::Trimetric => "trimetric",
            ViewPreset::Front => "front",
            ViewPreset::Top => "top",
            ViewPreset::Side => "side",
        }
    }
}

impl fmt::Display for ViewPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a view name does not match any [`ViewPreset`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown view '{0}' (expected one of: isometric, dimetric, trimetric, front, top, side)")]
pub struct ParseViewError(String);

impl FromStr for ViewPreset {
    type Err = ParseViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ViewPreset::ALL
            .into_iter()
            .find(|v| v.name() == wanted)
            .ok_or_else(|| ParseViewError(s.to_string()))
    }
}
