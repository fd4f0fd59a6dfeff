// Records passed between pipeline stages.
//
// A vertex is snapshotted from the full attribute state the moment it is
// submitted, so later setter calls never affect vertices already in
// flight. The three record types correspond to the three FIFO queues:
// object-space vertices, screen-space vertices, and fragments.

use glam::{Vec3, Vec4};

use crate::color::Rgba;
use crate::state::MaterialState;

/// An object-space vertex with every attribute captured at submission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineVertex {
    /// Homogeneous object-space position (w = 1).
    pub position: Vec4,
    pub color: Rgba,
    /// Homogeneous normal (w = 0, so translations do not affect it).
    pub normal: Vec4,
    pub material: MaterialState,
    pub u: f32,
    pub v: f32,
}

/// A vertex after the transform stage.
///
/// `position.x`/`position.y` are rounded framebuffer coordinates;
/// `position.z` keeps the pre-projection view-space depth for
/// interpolation and depth normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenVertex {
    pub position: Vec3,
    pub color: Rgba,
    /// Modelview-transformed normal (uniform-scale assumption; no
    /// inverse-transpose).
    pub normal: Vec3,
    pub material: MaterialState,
    pub u: f32,
    pub v: f32,
}

/// A candidate pixel contribution produced by rasterization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    pub row: i32,
    pub col: i32,
    pub color: Rgba,
    /// Normalized depth in [0, 1] for triangle fragments; raw view-space z
    /// for point and line fragments.
    pub depth: f32,
}
