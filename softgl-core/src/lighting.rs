// Phong reflectance for the single light source.
//
// Intensity is computed per channel (RGBA) either once per vertex
// (Gouraud) or once per fragment from interpolated attributes (Phong);
// the same color combine is shared by both paths. The specular term uses
// the scaled light vector `vl / 2` as a stand-in for the true halfway
// vector.

use glam::{Vec3, Vec4};

use crate::color::Rgba;
use crate::state::{LightState, MaterialState, ShadingTuning};

/// Resolve the stored homogeneous light position into a direction vector:
/// positional lights (w != 0) divide through by w, directional lights
/// (w == 0) use xyz as-is.
pub fn light_vector(position: Vec4) -> Vec3 {
    if position.w != 0.0 {
        position.truncate() / position.w
    } else {
        position.truncate()
    }
}

/// Per-channel reflected intensity at a surface point.
///
/// `normal` must already be unit length. Both cosines clamp at zero so
/// back-facing surfaces receive only ambient and emissive light.
pub fn intensity(normal: Vec3, vl: Vec3, material: &MaterialState, light: &LightState) -> [f32; 4] {
    let cos_dif = (normal.dot(vl) / vl.length()).max(0.0);
    let half = vl / 2.0;
    let cos_spec = (normal.dot(half) / half.length()).max(0.0);

    let mut out = [0.0f32; 4];
    for ch in 0..4 {
        out[ch] = light.ambient[ch] * material.ambient[ch]
            + light.diffuse[ch] * material.diffuse[ch] * cos_dif
            + light.specular[ch] * material.specular[ch] * cos_spec.powf(material.shininess)
            + material.emissive[ch];
    }
    out
}

/// Combine three vertex colors, barycentric weights, and per-vertex
/// intensities into a lit fragment color, applying the calibration
/// post-correction `channel^gamma + lift` in byte range.
///
/// Per-fragment shading passes the same intensity for all three slots.
pub fn shade(
    colors: [Rgba; 3],
    weights: [f32; 3],
    intensities: [[f32; 4]; 3],
    tuning: &ShadingTuning,
) -> Rgba {
    let channels = [colors[0].channels(), colors[1].channels(), colors[2].channels()];
    let mut out = [0.0f32; 4];
    for ch in 0..4 {
        let lit = weights[0] * channels[0][ch] * intensities[0][ch]
            + weights[1] * channels[1][ch] * intensities[1][ch]
            + weights[2] * channels[2][ch] * intensities[2][ch];
        out[ch] = lit.powf(tuning.gamma) + tuning.lift;
    }
    Rgba::from_channels(out)
}

// ── Tests ───────────────────────────────────────────────────────
