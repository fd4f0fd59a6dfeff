// Pipeline state machine: selectors, bit masks, and the mutable state
// blocks read at each vertex submission.
//
// Every selector decodes from its raw API value with a `from_u32` that
// returns `None` for unknown input; callers warn and ignore, so invalid
// arguments never abort the pipeline.

use glam::{Mat4, Vec3, Vec4};
use log::warn;

use crate::color::Rgba;

// ── Buffer masks ────────────────────────────────────────────────

/// Clear-mask bit selecting the color framebuffer.
pub const COLOR_BUFFER_BIT: u32 = 1;
/// Clear-mask bit selecting the depth buffer.
pub const DEPTH_BUFFER_BIT: u32 = 2;

// ── Light / material masks ──────────────────────────────────────

/// Light parameter: homogeneous position.
pub const POSITION: u32 = 1;
/// Light or material parameter: ambient RGBA.
pub const AMBIENT: u32 = 2;
/// Light or material parameter: diffuse RGBA.
pub const DIFFUSE: u32 = 4;
/// Combined ambient + diffuse mask.
pub const AMBIENT_AND_DIFFUSE: u32 = AMBIENT | DIFFUSE;
/// Light or material parameter: specular RGBA.
pub const SPECULAR: u32 = 8;
/// Material parameter: emissive RGBA.
pub const EMISSION: u32 = 16;
/// Material parameter: specular exponent.
pub const SHININESS: u32 = 32;

const MATERIAL_MASK: u32 = AMBIENT | DIFFUSE | SPECULAR | EMISSION | SHININESS;
const LIGHT_MASK: u32 = POSITION | AMBIENT | DIFFUSE | SPECULAR;

// ── Selectors ───────────────────────────────────────────────────

/// Primitive types accepted by `begin`, matching API command values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Primitive {
    Points = 0,
    Lines = 1,
    Triangles = 2,
}

impl Primitive {
    /// Decode a raw API value into a primitive type.
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Points),
            1 => Some(Self::Lines),
            2 => Some(Self::Triangles),
            _ => None,
        }
    }

    /// Number of screen vertices consumed per primitive.
    pub fn vertex_count(self) -> usize {
        match self {
            Self::Points => 1,
            Self::Lines => 2,
            Self::Triangles => 3,
        }
    }
}

/// Which matrix stack subsequent matrix operations target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum MatrixMode {
    ModelView = 1,
    Projection = 2,
}

impl MatrixMode {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::ModelView),
            2 => Some(Self::Projection),
            _ => None,
        }
    }
}

/// Toggleable pipeline capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Capability {
    Lighting = 1,
    Texture2d = 2,
    DepthTest = 3,
    PhongShading = 4,
}

impl Capability {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::Lighting),
            2 => Some(Self::Texture2d),
            3 => Some(Self::DepthTest),
            4 => Some(Self::PhongShading),
            _ => None,
        }
    }
}

// ── Enable flags ────────────────────────────────────────────────

/// The four capability flags, with power-on defaults.
///
/// Per-fragment (Phong) shading starts enabled; everything else starts off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderFlags {
    pub lighting: bool,
    pub texturing: bool,
    pub depth_test: bool,
    pub phong_shading: bool,
}

impl Default for RenderFlags {
    fn default() -> Self {
        Self {
            lighting: false,
            texturing: false,
            depth_test: false,
            phong_shading: true,
        }
    }
}

impl RenderFlags {
    pub fn set(&mut self, capability: Capability, enabled: bool) {
        match capability {
            Capability::Lighting => self.lighting = enabled,
            Capability::Texture2d => self.texturing = enabled,
            Capability::DepthTest => self.depth_test = enabled,
            Capability::PhongShading => self.phong_shading = enabled,
        }
    }
}

// ── Current vertex attributes ───────────────────────────────────

/// Attribute state captured into each vertex at submission time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttributeState {
    /// Current color. Alpha is only changed by 4-component setters.
    pub color: Rgba,
    /// Current normal. Assumed unit; not re-normalized on input.
    pub normal: Vec3,
    pub u: f32,
    pub v: f32,
}

impl Default for AttributeState {
    fn default() -> Self {
        Self {
            color: Rgba::WHITE,
            normal: Vec3::Z,
            u: 0.0,
            v: 0.0,
        }
    }
}

// ── Material ────────────────────────────────────────────────────

/// Surface material: four RGBA reflectance components plus the specular
/// exponent. Snapshotted by value into every submitted vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialState {
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub emissive: [f32; 4],
    pub shininess: f32,
}

impl Default for MaterialState {
    fn default() -> Self {
        Self {
            ambient: [0.2, 0.2, 0.2, 1.0],
            diffuse: [0.8, 0.8, 0.8, 1.0],
            specular: [0.0, 0.0, 0.0, 1.0],
            emissive: [0.0, 0.0, 0.0, 1.0],
            shininess: 0.0,
        }
    }
}

impl MaterialState {
    /// Apply one scalar to the RGB channels of every component named in
    /// `mask` (alpha untouched); `SHININESS` sets the exponent.
    pub fn set_scalar(&mut self, mask: u32, value: f32) {
        if mask & !MATERIAL_MASK != 0 {
            warn!("material mask 0x{:X} has unknown bits, ignoring them", mask);
        }
        if mask & AMBIENT != 0 {
            self.ambient[..3].fill(value);
        }
        if mask & DIFFUSE != 0 {
            self.diffuse[..3].fill(value);
        }
        if mask & SPECULAR != 0 {
            self.specular[..3].fill(value);
        }
        if mask & EMISSION != 0 {
            self.emissive[..3].fill(value);
        }
        if mask & SHININESS != 0 {
            self.shininess = value;
        }
    }

    /// Apply a full RGBA value to every component named in `mask`;
    /// `SHININESS` takes the first element.
    pub fn set_vector(&mut self, mask: u32, values: &[f32; 4]) {
        if mask & !MATERIAL_MASK != 0 {
            warn!("material mask 0x{:X} has unknown bits, ignoring them", mask);
        }
        if mask & AMBIENT != 0 {
            self.ambient = *values;
        }
        if mask & DIFFUSE != 0 {
            self.diffuse = *values;
        }
        if mask & SPECULAR != 0 {
            self.specular = *values;
        }
        if mask & EMISSION != 0 {
            self.emissive = *values;
        }
        if mask & SHININESS != 0 {
            self.shininess = values[0];
        }
    }

    /// Barycentric blend of three materials, used by per-fragment shading.
    pub fn interpolate(m0: &Self, m1: &Self, m2: &Self, weights: [f32; 3]) -> Self {
        let blend = |a: &[f32; 4], b: &[f32; 4], c: &[f32; 4]| {
            let mut out = [0.0f32; 4];
            for ch in 0..4 {
                out[ch] = weights[0] * a[ch] + weights[1] * b[ch] + weights[2] * c[ch];
            }
            out
        };
        Self {
            ambient: blend(&m0.ambient, &m1.ambient, &m2.ambient),
            diffuse: blend(&m0.diffuse, &m1.diffuse, &m2.diffuse),
            specular: blend(&m0.specular, &m1.specular, &m2.specular),
            emissive: blend(&m0.emissive, &m1.emissive, &m2.emissive),
            shininess: weights[0] * m0.shininess
                + weights[1] * m1.shininess
                + weights[2] * m2.shininess,
        }
    }
}

// ── Light ───────────────────────────────────────────────────────

/// The single light source.
///
/// The position is stored already transformed by the modelview matrix that
/// was current when it was set; later modelview changes do not move it.
/// `w == 0` marks a directional light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightState {
    pub position: Vec4,
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
}

impl Default for LightState {
    fn default() -> Self {
        Self {
            position: Vec4::new(0.0, 0.0, 1.0, 0.0),
            ambient: [0.0, 0.0, 0.0, 1.0],
            diffuse: [0.0, 0.0, 0.0, 1.0],
            specular: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl LightState {
    /// Apply `values` to every parameter named in `mask`. The position is
    /// captured through `modelview` at call time.
    pub fn apply(&mut self, mask: u32, values: &[f32; 4], modelview: &Mat4) {
        if mask & !LIGHT_MASK != 0 {
            warn!("light mask 0x{:X} has unknown bits, ignoring them", mask);
        }
        if mask & POSITION != 0 {
            let supplied = Vec4::new(values[0], values[1], values[2], values[3]);
            self.position = *modelview * supplied;
        }
        if mask & AMBIENT != 0 {
            self.ambient = *values;
        }
        if mask & DIFFUSE != 0 {
            self.diffuse = *values;
        }
        if mask & SPECULAR != 0 {
            self.specular = *values;
        }
    }
}

// ── Shading calibration ─────────────────────────────────────────

/// Post-correction applied to lit fragment channels:
/// `channel' = channel^gamma + lift` (byte-range channels).
///
/// These are display-calibration constants; callers may tune them per
/// output device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadingTuning {
    pub gamma: f32,
    pub lift: f32,
}

impl Default for ShadingTuning {
    fn default() -> Self {
        Self {
            gamma: 1.065,
            lift: 44.0,
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────
