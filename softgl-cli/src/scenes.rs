// Built-in demo scenes exercising each part of the pipeline.

use image::RgbaImage;
use softgl_core::{
    Capability, Context, MatrixMode, Primitive, TexEnv, AMBIENT, COLOR_BUFFER_BIT,
    DEPTH_BUFFER_BIT, DIFFUSE, POSITION, SHININESS, SPECULAR,
};

/// Names accepted by `render`, in display order.
pub const NAMES: &[&str] = &["point", "lines", "triangle", "depth", "texture", "lit-cube"];

/// Render a built-in scene into a fresh square framebuffer.
///
/// `angle` is the turntable rotation in degrees, used by the scenes with a
/// 3D camera and ignored by the flat ones. Returns `None` for an unknown
/// scene name.
pub fn render(name: &str, size: u32, angle: f32) -> Option<RgbaImage> {
    let mut context = Context::new(size, size);
    context.viewport(0, 0, size as i32, size as i32);
    match name {
        "point" => point(&mut context),
        "lines" => lines(&mut context),
        "triangle" => triangle(&mut context),
        "depth" => depth(&mut context),
        "texture" => texture(&mut context),
        "lit-cube" => lit_cube(&mut context, angle),
        _ => return None,
    }
    Some(context.framebuffer().clone())
}

fn unit_ortho(context: &mut Context) {
    context.matrix_mode(MatrixMode::Projection as u32);
    context.ortho(-1.0, 1.0, -1.0, 1.0, 1.0, -1.0);
    context.matrix_mode(MatrixMode::ModelView as u32);
    context.load_identity();
    context.clear_color(0.05, 0.05, 0.1, 1.0);
    context.clear(COLOR_BUFFER_BIT | DEPTH_BUFFER_BIT);
}

/// A single large red point at the origin.
fn point(context: &mut Context) {
    unit_ortho(context);
    context.color_3f(1.0, 0.2, 0.2);
    context.point_size(context.width() as f32 / 8.0);
    context.begin(Primitive::Points as u32);
    context.vertex_3f(0.0, 0.0, 0.0);
    context.end();
}

/// A fan of lines from the center, hue shifting around the circle.
fn lines(context: &mut Context) {
    unit_ortho(context);
    context.line_width(2.0);
    context.begin(Primitive::Lines as u32);
    let spokes = 24;
    for i in 0..spokes {
        let theta = i as f32 / spokes as f32 * std::f32::consts::TAU;
        let t = i as f32 / spokes as f32;
        context.color_3f(1.0, 1.0, 0.2);
        context.vertex_3f(0.0, 0.0, 0.0);
        context.color_3f(t, 1.0 - t, 1.0);
        context.vertex_3f(0.9 * theta.cos(), 0.9 * theta.sin(), 0.0);
    }
    context.end();
}

/// One triangle with red, green, and blue corners.
fn triangle(context: &mut Context) {
    unit_ortho(context);
    context.begin(Primitive::Triangles as u32);
    context.color_3f(1.0, 0.0, 0.0);
    context.vertex_3f(-0.8, -0.7, 0.0);
    context.color_3f(0.0, 1.0, 0.0);
    context.vertex_3f(0.8, -0.7, 0.0);
    context.color_3f(0.0, 0.0, 1.0);
    context.vertex_3f(0.0, 0.8, 0.0);
    context.end();
}

/// Two interpenetrating triangles resolved by the depth test.
fn depth(context: &mut Context) {
    unit_ortho(context);
    context.enable(Capability::DepthTest as u32);
    context.clear(COLOR_BUFFER_BIT | DEPTH_BUFFER_BIT);

    context.begin(Primitive::Triangles as u32);
    // slopes from z = -0.5 (near edge) to z = 0.5 (far edge)
    context.color_3f(1.0, 0.4, 0.1);
    context.vertex_3f(-0.9, -0.6, -0.5);
    context.vertex_3f(0.9, -0.6, 0.5);
    context.vertex_3f(0.0, 0.8, 0.0);
    // constant z = 0 plane cutting through the first
    context.color_3f(0.1, 0.5, 1.0);
    context.vertex_3f(-0.9, 0.6, 0.0);
    context.vertex_3f(0.9, 0.6, 0.0);
    context.vertex_3f(0.0, -0.8, 0.0);
    context.end();
}

/// A procedural checkerboard modulated by a warm vertex color.
fn texture(context: &mut Context) {
    unit_ortho(context);
    let mut checker = RgbaImage::new(8, 8);
    for y in 0..8 {
        for x in 0..8 {
            let value = if (x + y) % 2 == 0 { 255 } else { 64 };
            checker.put_pixel(x, y, image::Rgba([value, value, value, 255]));
        }
    }
    context.tex_image_2d(&checker);
    context.tex_env_mode(TexEnv::Modulate as u32);
    context.enable(Capability::Texture2d as u32);
    context.color_3f(1.0, 0.8, 0.5);

    context.begin(Primitive::Triangles as u32);
    let quad = [
        ([-0.9f32, -0.9f32], [0.0f32, 0.0f32]),
        ([0.9, -0.9], [0.99, 0.0]),
        ([0.9, 0.9], [0.99, 0.99]),
        ([-0.9, 0.9], [0.0, 0.99]),
    ];
    for &index in &[0usize, 1, 2, 0, 2, 3] {
        let ([x, y], [u, v]) = quad[index];
        context.tex_coord_2f(u, v);
        context.vertex_3f(x, y, 0.0);
    }
    context.end();
}

/// A lit, depth-tested cube on a turntable under a white headlight.
fn lit_cube(context: &mut Context, angle: f32) {
    context.matrix_mode(MatrixMode::Projection as u32);
    // depth range brackets the cube's view-space z around the camera offset
    context.ortho(-2.5, 2.5, -2.5, 2.5, -2.0, -8.0);
    context.matrix_mode(MatrixMode::ModelView as u32);
    context.load_identity();
    context.clear_color(0.05, 0.05, 0.1, 1.0);
    context.clear(COLOR_BUFFER_BIT | DEPTH_BUFFER_BIT);

    context.enable(Capability::DepthTest as u32);
    context.enable(Capability::Lighting as u32);

    // headlight fixed in view space, set before the model transform
    context.light(POSITION, &[0.3, 0.5, 1.0, 0.0]);
    context.light(DIFFUSE, &[0.9, 0.9, 0.9, 1.0]);
    context.light(AMBIENT, &[0.15, 0.15, 0.15, 1.0]);
    context.light(SPECULAR, &[0.6, 0.6, 0.6, 1.0]);
    context.materialfv(DIFFUSE, &[0.9, 0.9, 0.9, 1.0]);
    context.materialfv(SPECULAR, &[0.4, 0.4, 0.4, 1.0]);
    context.materialf(SHININESS, 16.0);

    context.translatef(0.0, 0.0, -5.0);
    context.rotatef(20.0, 1.0, 0.0, 0.0);
    context.rotatef(angle, 0.0, 1.0, 0.0);

    // faces as (normal, four corners), counter-clockwise from outside
    let faces: [([f32; 3], [[f32; 3]; 4], [f32; 3]); 6] = [
        (
            [0.0, 0.0, 1.0],
            [[-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0]],
            [0.9, 0.3, 0.3],
        ),
        (
            [0.0, 0.0, -1.0],
            [[1.0, -1.0, -1.0], [-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [1.0, 1.0, -1.0]],
            [0.3, 0.9, 0.3],
        ),
        (
            [1.0, 0.0, 0.0],
            [[1.0, -1.0, 1.0], [1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0]],
            [0.3, 0.3, 0.9],
        ),
        (
            [-1.0, 0.0, 0.0],
            [[-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0], [-1.0, 1.0, -1.0]],
            [0.9, 0.9, 0.3],
        ),
        (
            [0.0, 1.0, 0.0],
            [[-1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, -1.0], [-1.0, 1.0, -1.0]],
            [0.9, 0.3, 0.9],
        ),
        (
            [0.0, -1.0, 0.0],
            [[-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [-1.0, -1.0, 1.0]],
            [0.3, 0.9, 0.9],
        ),
    ];

    context.begin(Primitive::Triangles as u32);
    for (normal, corners, color) in &faces {
        context.normal_3f(normal[0], normal[1], normal[2]);
        context.color_3f(color[0], color[1], color[2]);
        for &index in &[0usize, 1, 2, 0, 2, 3] {
            let [x, y, z] = corners[index];
            context.vertex_3f(x, y, z);
        }
    }
    context.end();
}

// ── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_scene_renders() {
        for name in NAMES {
            let image = render(name, 64, 30.0).expect("listed scene must render");
            assert_eq!(image.dimensions(), (64, 64));
        }
    }

    #[test]
    fn unknown_scene_is_none() {
        assert!(render("nope", 64, 0.0).is_none());
    }

    #[test]
    fn triangle_scene_touches_the_center() {
        let image = render("triangle", 64, 0.0).unwrap();
        let center = image.get_pixel(32, 32);
        // interpolated corner colors, not the clear color
        assert_ne!(center.0, [12, 12, 25, 255]);
    }
}
