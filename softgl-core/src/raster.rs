// Scan conversion: points, line segments, and barycentric triangles.
//
// Rasterizers consume screen-space vertices and append fragments to the
// fragment queue. All clipping happens here in pixel space: fragments are
// only emitted for addresses inside the framebuffer, and triangle
// fragments outside the [0, 1] normalized depth range are dropped before
// they reach the fragment stage.

use std::collections::VecDeque;

use glam::Vec3;

use crate::color::Rgba;
use crate::lighting;
use crate::matrix::DepthRange;
use crate::state::{LightState, MaterialState, RenderFlags, ShadingTuning};
use crate::texture::{TexEnv, Texture};
use crate::vertex::{Fragment, ScreenVertex};

/// Everything the rasterizers read besides the vertices themselves.
pub struct RasterState<'a> {
    pub flags: RenderFlags,
    pub light: &'a LightState,
    pub tuning: ShadingTuning,
    pub texture: &'a Texture,
    pub tex_env: TexEnv,
    pub depth_range: DepthRange,
    pub line_width: f32,
    pub width: u32,
    pub height: u32,
}

/// Pixel rows (or columns) touched by a float interval, clipped to the
/// buffer extent. The lower bound truncates toward zero, the upper bound
/// is the last whole coordinate not above the interval end.
fn pixel_span(min: f32, max: f32, extent: u32) -> std::ops::RangeInclusive<i32> {
    let start = (min as i32).max(0);
    let end = (max.floor() as i32).min(extent as i32 - 1);
    start..=end
}

/// Rasterize a point: a disk of fragments around the vertex, bounded by a
/// square of side `size`. A pixel is covered while its squared distance
/// from the vertex stays strictly below `size²`.
pub fn point(
    vertex: &ScreenVertex,
    size: f32,
    width: u32,
    height: u32,
    fragments: &mut VecDeque<Fragment>,
) {
    let half = size / 2.0;
    let center = vertex.position;

    for row in pixel_span(center.y - half, center.y + half, height) {
        for col in pixel_span(center.x - half, center.x + half, width) {
            let dx = center.x - col as f32;
            let dy = center.y - row as f32;
            if dx * dx + dy * dy >= size * size {
                continue;
            }
            fragments.push_back(Fragment {
                row,
                col,
                color: vertex.color,
                depth: center.z,
            });
        }
    }
}

/// Rasterize a line segment by oversampling the parametric form
/// `p(t) = (1 - t)·v0 + t·v1` and stamping a half-width point at each
/// sample. Color interpolates linearly; depth comes from the lerped z.
pub fn line(
    v0: &ScreenVertex,
    v1: &ScreenVertex,
    state: &RasterState,
    fragments: &mut VecDeque<Fragment>,
) {
    // Half the line width, pushed through the same round-and-floor-at-one
    // rule as the point size API.
    let stamp = {
        let rounded = (state.line_width / 2.0).round();
        if rounded > 0.0 {
            rounded
        } else {
            1.0
        }
    };

    let longest = state.width.max(state.height) as f32;
    let step = 1.0 / (2.0 * longest);

    let mut t = 0.0f32;
    while t <= 1.0 {
        let sample = ScreenVertex {
            position: v0.position.lerp(v1.position, t),
            color: v0.color.lerp(v1.color, t),
            ..*v0
        };
        point(&sample, stamp, state.width, state.height, fragments);
        t += step;
    }
}

/// Rasterize a triangle with the half-plane test over its bounding box.
///
/// Collinear projections are skipped outright; adjacent triangles in a
/// surface cover those pixels. Shading follows the enable flags: plain
/// barycentric color, Gouraud (per-vertex intensity), or Phong
/// (per-fragment intensity from interpolated attributes), then the
/// optional texture combine.
pub fn triangle(
    v0: &ScreenVertex,
    v1: &ScreenVertex,
    v2: &ScreenVertex,
    state: &RasterState,
    fragments: &mut VecDeque<Fragment>,
) {
    let (p0, p1, p2) = (v0.position, v1.position, v2.position);

    let min_x = p0.x.min(p1.x).min(p2.x);
    let max_x = p0.x.max(p1.x).max(p2.x);
    let min_y = p0.y.min(p1.y).min(p2.y);
    let max_y = p0.y.max(p1.y).max(p2.y);

    // Edge vectors, their 2D normals, and the line constants n·v.
    let e01 = p1 - p0;
    let e12 = p2 - p1;
    let e20 = p0 - p2;
    let n01 = Vec3::new(-e01.y, e01.x, 0.0);
    let n12 = Vec3::new(-e12.y, e12.x, 0.0);
    let n20 = Vec3::new(-e20.y, e20.x, 0.0);
    let c01 = n01.dot(p0);
    let c12 = n12.dot(p1);
    let c20 = n20.dot(p2);

    // Signed distance of each vertex from the opposite edge. A zero means
    // the projected vertices are collinear: nothing to fill.
    let dist0 = n12.dot(p0) - c12;
    let dist1 = n20.dot(p1) - c20;
    let dist2 = n01.dot(p2) - c01;
    if dist0 == 0.0 || dist1 == 0.0 || dist2 == 0.0 {
        return;
    }

    let n0 = v0.normal.normalize_or_zero();
    let n1 = v1.normal.normalize_or_zero();
    let n2 = v2.normal.normalize_or_zero();
    let vl = lighting::light_vector(state.light.position);

    // Gouraud path: light once per vertex, interpolate below.
    let vertex_intensity = if state.flags.lighting && !state.flags.phong_shading {
        [
            lighting::intensity(n0, vl, &v0.material, state.light),
            lighting::intensity(n1, vl, &v1.material, state.light),
            lighting::intensity(n2, vl, &v2.material, state.light),
        ]
    } else {
        [[0.0; 4]; 3]
    };

    let DepthRange { near, far } = state.depth_range;

    for row in pixel_span(min_y, max_y, state.height) {
        for col in pixel_span(min_x, max_x, state.width) {
            let pixel = Vec3::new(col as f32, row as f32, 0.0);

            let alpha = (n12.dot(pixel) - c12) / dist0;
            let beta = (n20.dot(pixel) - c20) / dist1;
            let gamma = (n01.dot(pixel) - c01) / dist2;

            // Half-plane test; edges themselves are inclusive.
            if alpha < 0.0 || beta < 0.0 || gamma < 0.0 {
                continue;
            }
            let weights = [alpha, beta, gamma];

            let frag_z = alpha * p0.z + beta * p1.z + gamma * p2.z;
            let depth = (far - frag_z) / (far - near);
            if !(0.0..=1.0).contains(&depth) {
                continue;
            }

            let mut color = if state.flags.lighting {
                let intensities = if state.flags.phong_shading {
                    let normal = (alpha * n0 + beta * n1 + gamma * n2).normalize_or_zero();
                    let material =
                        MaterialState::interpolate(&v0.material, &v1.material, &v2.material, weights);
                    let i = lighting::intensity(normal, vl, &material, state.light);
                    [i, i, i]
                } else {
                    vertex_intensity
                };
                lighting::shade(
                    [v0.color, v1.color, v2.color],
                    weights,
                    intensities,
                    &state.tuning,
                )
            } else {
                Rgba::blend3(v0.color, v1.color, v2.color, weights)
            };

            if state.flags.texturing {
                let u = alpha * v0.u + beta * v1.u + gamma * v2.u;
                let v = alpha * v0.v + beta * v1.v + gamma * v2.v;
                let texel = state.texture.sample(u, v);
                color = match state.tex_env {
                    TexEnv::Modulate => color.modulate(texel),
                    TexEnv::Replace => texel,
                };
            }

            fragments.push_back(Fragment {
                row,
                col,
                color,
                depth,
            });
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn screen_vertex(x: f32, y: f32, z: f32, color: Rgba) -> ScreenVertex {
        ScreenVertex {
            position: Vec3::new(x, y, z),
            color,
            normal: Vec3::Z,
            material: MaterialState::default(),
            u: 0.0,
            v: 0.0,
        }
    }

    fn plain_state<'a>(light: &'a LightState, texture: &'a Texture) -> RasterState<'a> {
        RasterState {
            flags: RenderFlags::default(),
            light,
            tuning: ShadingTuning::default(),
            texture,
            tex_env: TexEnv::Modulate,
            depth_range: DepthRange::default(),
            line_width: 1.0,
            width: 10,
            height: 10,
        }
    }

    fn addresses(fragments: &VecDeque<Fragment>) -> BTreeSet<(i32, i32)> {
        fragments.iter().map(|f| (f.col, f.row)).collect()
    }

    #[test]
    fn unit_point_covers_exactly_its_pixel() {
        let mut fragments = VecDeque::new();
        let v = screen_vertex(5.0, 5.0, 0.0, Rgba::WHITE);
        point(&v, 1.0, 10, 10, &mut fragments);
        assert_eq!(addresses(&fragments), BTreeSet::from([(5, 5)]));
    }

    #[test]
    fn point_coverage_is_translation_invariant() {
        let reference: BTreeSet<_> = {
            let mut fragments = VecDeque::new();
            point(
                &screen_vertex(4.0, 4.0, 0.0, Rgba::WHITE),
                3.0,
                32,
                32,
                &mut fragments,
            );
            addresses(&fragments)
                .iter()
                .map(|(c, r)| (c - 4, r - 4))
                .collect()
        };
        for offset in [3, 9, 20] {
            let mut fragments = VecDeque::new();
            let at = 4.0 + offset as f32;
            point(
                &screen_vertex(at, at, 0.0, Rgba::WHITE),
                3.0,
                32,
                32,
                &mut fragments,
            );
            let translated: BTreeSet<_> = addresses(&fragments)
                .iter()
                .map(|(c, r)| (c - 4 - offset, r - 4 - offset))
                .collect();
            assert_eq!(translated, reference, "offset {offset}");
        }
    }

    #[test]
    fn point_clips_to_framebuffer() {
        let mut fragments = VecDeque::new();
        point(
            &screen_vertex(0.0, 0.0, 0.0, Rgba::WHITE),
            5.0,
            10,
            10,
            &mut fragments,
        );
        assert!(!fragments.is_empty());
        for fragment in &fragments {
            assert!(fragment.col >= 0 && fragment.col < 10);
            assert!(fragment.row >= 0 && fragment.row < 10);
        }
    }

    #[test]
    fn point_fragments_carry_vertex_depth_and_color() {
        let mut fragments = VecDeque::new();
        let color = Rgba::new(9, 8, 7, 255);
        point(&screen_vertex(3.0, 3.0, -2.5, color), 1.0, 10, 10, &mut fragments);
        let fragment = fragments.front().unwrap();
        assert_eq!(fragment.color, color);
        assert_eq!(fragment.depth, -2.5);
    }

    #[test]
    fn line_covers_both_endpoints() {
        let light = LightState::default();
        let texture = Texture::new();
        let state = plain_state(&light, &texture);
        let mut fragments = VecDeque::new();
        line(
            &screen_vertex(1.0, 1.0, 0.0, Rgba::WHITE),
            &screen_vertex(8.0, 8.0, 0.0, Rgba::WHITE),
            &state,
            &mut fragments,
        );
        let set = addresses(&fragments);
        assert!(set.contains(&(1, 1)));
        assert!(set.contains(&(8, 8)));
    }

    #[test]
    fn line_interpolates_color_along_span() {
        let light = LightState::default();
        let texture = Texture::new();
        let state = plain_state(&light, &texture);
        let mut fragments = VecDeque::new();
        line(
            &screen_vertex(0.0, 5.0, 0.0, Rgba::new(0, 0, 0, 255)),
            &screen_vertex(9.0, 5.0, 0.0, Rgba::new(200, 0, 0, 255)),
            &state,
            &mut fragments,
        );
        let start = fragments
            .iter()
            .find(|f| f.col == 0 && f.row == 5)
            .expect("start pixel covered");
        let end = fragments
            .iter()
            .rev()
            .find(|f| f.col == 9 && f.row == 5)
            .expect("end pixel covered");
        assert!(start.color.r < 20);
        assert!(end.color.r > 180);
    }

    #[test]
    fn collinear_triangle_is_skipped() {
        let light = LightState::default();
        let texture = Texture::new();
        let state = plain_state(&light, &texture);
        let mut fragments = VecDeque::new();
        triangle(
            &screen_vertex(0.0, 0.0, 0.0, Rgba::WHITE),
            &screen_vertex(4.0, 4.0, 0.0, Rgba::WHITE),
            &screen_vertex(8.0, 8.0, 0.0, Rgba::WHITE),
            &state,
            &mut fragments,
        );
        assert!(fragments.is_empty());
    }

    #[test]
    fn triangle_covers_inclusive_half_plane() {
        let light = LightState::default();
        let texture = Texture::new();
        let state = plain_state(&light, &texture);
        let mut fragments = VecDeque::new();
        triangle(
            &screen_vertex(0.0, 0.0, 0.0, Rgba::WHITE),
            &screen_vertex(10.0, 0.0, 0.0, Rgba::WHITE),
            &screen_vertex(0.0, 10.0, 0.0, Rgba::WHITE),
            &state,
            &mut fragments,
        );
        let set = addresses(&fragments);
        for row in 0..10 {
            for col in 0..10 {
                let covered = set.contains(&(col, row));
                assert_eq!(covered, col + row <= 10, "pixel ({col},{row})");
            }
        }
    }

    #[test]
    fn interpolated_color_weights_sum_to_one() {
        let light = LightState::default();
        let texture = Texture::new();
        let state = plain_state(&light, &texture);
        let mut fragments = VecDeque::new();
        triangle(
            &screen_vertex(0.0, 0.0, 0.0, Rgba::new(255, 0, 0, 255)),
            &screen_vertex(9.0, 0.0, 0.0, Rgba::new(0, 255, 0, 255)),
            &screen_vertex(0.0, 9.0, 0.0, Rgba::new(0, 0, 255, 255)),
            &state,
            &mut fragments,
        );
        assert!(!fragments.is_empty());
        for fragment in &fragments {
            let sum = fragment.color.r as i32 + fragment.color.g as i32 + fragment.color.b as i32;
            // each channel truncates independently, so up to 3 counts low
            assert!((sum - 255).abs() <= 3, "sum {sum} at ({},{})", fragment.col, fragment.row);
        }
    }

    #[test]
    fn fragments_outside_depth_range_are_dropped() {
        let light = LightState::default();
        let texture = Texture::new();
        let state = plain_state(&light, &texture);
        // view z = 5 with near 1 / far -1: depth = (-1 - 5) / -2 = 3
        let mut fragments = VecDeque::new();
        triangle(
            &screen_vertex(0.0, 0.0, 5.0, Rgba::WHITE),
            &screen_vertex(9.0, 0.0, 5.0, Rgba::WHITE),
            &screen_vertex(0.0, 9.0, 5.0, Rgba::WHITE),
            &state,
            &mut fragments,
        );
        assert!(fragments.is_empty());
    }

    #[test]
    fn triangle_depth_is_normalized_view_z() {
        let light = LightState::default();
        let texture = Texture::new();
        let state = plain_state(&light, &texture);
        let mut fragments = VecDeque::new();
        triangle(
            &screen_vertex(0.0, 0.0, 0.0, Rgba::WHITE),
            &screen_vertex(9.0, 0.0, 0.0, Rgba::WHITE),
            &screen_vertex(0.0, 9.0, 0.0, Rgba::WHITE),
            &state,
            &mut fragments,
        );
        for fragment in &fragments {
            assert!((fragment.depth - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn replace_texture_overrides_vertex_color() {
        let light = LightState::default();
        let mut texture = Texture::new();
        let mut source = image::RgbaImage::new(1, 1);
        source.put_pixel(0, 0, image::Rgba([12, 34, 56, 255]));
        texture.upload(&source);

        let mut state = plain_state(&light, &texture);
        state.flags.texturing = true;
        state.tex_env = TexEnv::Replace;

        let mut fragments = VecDeque::new();
        triangle(
            &screen_vertex(0.0, 0.0, 0.0, Rgba::WHITE),
            &screen_vertex(9.0, 0.0, 0.0, Rgba::WHITE),
            &screen_vertex(0.0, 9.0, 0.0, Rgba::WHITE),
            &state,
            &mut fragments,
        );
        assert!(!fragments.is_empty());
        for fragment in &fragments {
            assert_eq!(fragment.color, Rgba::new(12, 34, 56, 255));
        }
    }

    #[test]
    fn gouraud_uniform_setup_shades_uniformly() {
        let mut light = LightState::default();
        light.apply(
            crate::state::DIFFUSE,
            &[1.0, 1.0, 1.0, 1.0],
            &glam::Mat4::IDENTITY,
        );
        let texture = Texture::new();
        let mut state = plain_state(&light, &texture);
        state.flags.lighting = true;
        state.flags.phong_shading = false;

        let mut material = MaterialState::default();
        material.set_vector(crate::state::DIFFUSE, &[1.0, 1.0, 1.0, 1.0]);
        let vertex = |x: f32, y: f32| ScreenVertex {
            material,
            ..screen_vertex(x, y, 0.0, Rgba::new(127, 127, 127, 255))
        };

        let mut fragments = VecDeque::new();
        triangle(&vertex(0.0, 0.0), &vertex(9.0, 0.0), &vertex(0.0, 9.0), &state, &mut fragments);
        assert!(!fragments.is_empty());
        let first = fragments[0].color;
        for fragment in &fragments {
            assert_eq!(fragment.color, first);
        }
    }
}
