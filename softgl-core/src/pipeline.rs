// The rendering context: the immediate-mode API surface and the
// producer/consumer chain behind it.
//
// Every `vertex_3f` call runs the pipeline to completion for the current
// primitive: the vertex is snapshotted onto the vertex queue, transformed
// onto the raster queue, assembled and scan-converted once enough
// vertices are buffered, and the resulting fragments are drained into the
// framebuffer before the call returns. The fragment queue is therefore
// empty at every call boundary that completes a primitive.

use std::collections::VecDeque;

use glam::{Vec3, Vec4};
use image::RgbaImage;
use log::warn;
use smallvec::SmallVec;

use crate::color::Rgba;
use crate::framebuffer::RenderTarget;
use crate::matrix::{MatrixStacks, Viewport};
use crate::raster::{self, RasterState};
use crate::state::{
    AttributeState, Capability, LightState, MaterialState, Primitive, RenderFlags, ShadingTuning,
};
use crate::texture::{TexEnv, Texture};
use crate::vertex::{Fragment, PipelineVertex, ScreenVertex};

/// A complete fixed-function rendering context.
///
/// Owns the matrix stacks, attribute/lighting/texture state, the three
/// pipeline queues, and the color + depth render target. Single-threaded:
/// every call runs to completion before returning.
pub struct Context {
    // -- Transform state -------------------------------------------------
    matrices: MatrixStacks,
    viewport: Viewport,

    // -- Attribute / lighting state --------------------------------------
    flags: RenderFlags,
    attributes: AttributeState,
    material: MaterialState,
    light: LightState,
    tuning: ShadingTuning,

    // -- Raster state ----------------------------------------------------
    primitive: Option<Primitive>,
    point_size: f32,
    line_width: f32,

    // -- Queues connecting the stages ------------------------------------
    vertex_queue: VecDeque<PipelineVertex>,
    raster_queue: VecDeque<ScreenVertex>,
    fragment_queue: VecDeque<Fragment>,

    // -- Texture and output ----------------------------------------------
    texture: Texture,
    tex_env: TexEnv,
    target: RenderTarget,
}

impl Context {
    /// Create a context rendering into `width` x `height` buffers.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            matrices: MatrixStacks::new(),
            viewport: Viewport::default(),
            flags: RenderFlags::default(),
            attributes: AttributeState::default(),
            material: MaterialState::default(),
            light: LightState::default(),
            tuning: ShadingTuning::default(),
            primitive: None,
            point_size: 1.0,
            line_width: 1.0,
            vertex_queue: VecDeque::new(),
            raster_queue: VecDeque::new(),
            fragment_queue: VecDeque::new(),
            texture: Texture::new(),
            tex_env: TexEnv::Modulate,
            target: RenderTarget::new(width, height),
        }
    }

    // -- Primitive lifecycle ---------------------------------------------

    /// Start a primitive sequence. Unknown types leave no primitive
    /// active, so subsequent vertices accumulate without assembling.
    pub fn begin(&mut self, primitive_type: u32) {
        self.primitive = Primitive::from_u32(primitive_type);
        if self.primitive.is_none() {
            warn!("begin with unknown primitive type {}", primitive_type);
        }
    }

    /// End the current primitive sequence.
    pub fn end(&mut self) {
        self.primitive = None;
    }

    /// Set the point diameter in pixels; rounded, minimum 1.
    pub fn point_size(&mut self, size: f32) {
        let rounded = size.round();
        self.point_size = if rounded > 0.0 { rounded } else { 1.0 };
    }

    /// Set the line width in pixels; rounded, minimum 1.
    pub fn line_width(&mut self, width: f32) {
        let rounded = width.round();
        self.line_width = if rounded > 0.0 { rounded } else { 1.0 };
    }

    // -- Matrix manipulation ---------------------------------------------

    pub fn matrix_mode(&mut self, mode: u32) {
        self.matrices.set_mode(mode);
    }

    pub fn push_matrix(&mut self) {
        self.matrices.push();
    }

    pub fn pop_matrix(&mut self) {
        self.matrices.pop();
    }

    pub fn load_identity(&mut self) {
        self.matrices.load_identity();
    }

    /// Right-multiply the current matrix by `m`, given column-major.
    pub fn mult_matrixf(&mut self, m: &[f32; 16]) {
        self.matrices.mult_column_major(m);
    }

    pub fn frustum(&mut self, left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) {
        self.matrices.frustum(left, right, bottom, top, near, far);
    }

    pub fn ortho(&mut self, left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) {
        self.matrices.ortho(left, right, bottom, top, near, far);
    }

    pub fn rotatef(&mut self, angle: f32, x: f32, y: f32, z: f32) {
        self.matrices.rotate(angle, x, y, z);
    }

    pub fn scalef(&mut self, x: f32, y: f32, z: f32) {
        self.matrices.scale(x, y, z);
    }

    pub fn translatef(&mut self, x: f32, y: f32, z: f32) {
        self.matrices.translate(x, y, z);
    }

    pub fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.viewport.set(x, y, width, height);
    }

    // -- Vertex attributes -----------------------------------------------

    /// Set the current color from unit-range floats; alpha is untouched.
    pub fn color_3f(&mut self, red: f32, green: f32, blue: f32) {
        let alpha = self.attributes.color.a;
        self.attributes.color = Rgba::from_unit(red, green, blue, 1.0);
        self.attributes.color.a = alpha;
    }

    /// Set the current normal. Assumed unit length; not re-normalized.
    pub fn normal_3f(&mut self, x: f32, y: f32, z: f32) {
        self.attributes.normal = Vec3::new(x, y, z);
    }

    /// Set the current texture coordinates.
    pub fn tex_coord_2f(&mut self, u: f32, v: f32) {
        self.attributes.u = u;
        self.attributes.v = v;
    }

    /// Set one scalar across the material components named in `mask`.
    pub fn materialf(&mut self, mask: u32, value: f32) {
        self.material.set_scalar(mask, value);
    }

    /// Set a full RGBA value across the material components in `mask`.
    pub fn materialfv(&mut self, mask: u32, values: &[f32; 4]) {
        self.material.set_vector(mask, values);
    }

    /// Set light parameters named in `mask`. A position is transformed by
    /// the current modelview matrix and stored; later modelview changes
    /// do not move the light.
    pub fn light(&mut self, mask: u32, values: &[f32; 4]) {
        let modelview = self.matrices.modelview();
        self.light.apply(mask, values, &modelview);
    }

    /// Submit a vertex and synchronously run the pipeline.
    pub fn vertex_3f(&mut self, x: f32, y: f32, z: f32) {
        self.vertex_queue.push_back(PipelineVertex {
            position: Vec4::new(x, y, z, 1.0),
            color: self.attributes.color,
            normal: self.attributes.normal.extend(0.0),
            material: self.material,
            u: self.attributes.u,
            v: self.attributes.v,
        });

        self.transform_vertex();

        if self.rasterize_primitive() {
            self.drain_fragments();
        }
    }

    // -- Capability flags ------------------------------------------------

    pub fn enable(&mut self, capability: u32) {
        self.set_capability(capability, true);
    }

    pub fn disable(&mut self, capability: u32) {
        self.set_capability(capability, false);
    }

    fn set_capability(&mut self, capability: u32, enabled: bool) {
        match Capability::from_u32(capability) {
            Some(capability) => self.flags.set(capability, enabled),
            None => warn!("unknown capability {} ignored", capability),
        }
    }

    // -- Texture ---------------------------------------------------------

    /// Select the texture combine mode. Unknown modes are ignored.
    pub fn tex_env_mode(&mut self, mode: u32) {
        match TexEnv::from_u32(mode) {
            Some(mode) => self.tex_env = mode,
            None => warn!("unknown texture environment mode {} ignored", mode),
        }
    }

    /// Upload the texture image. The input is copied; the caller may free
    /// or reuse it immediately.
    pub fn tex_image_2d(&mut self, image: &RgbaImage) {
        self.texture.upload(image);
    }

    // -- Frame buffer ----------------------------------------------------

    /// Clear the buffers selected by `mask`.
    pub fn clear(&mut self, mask: u32) {
        self.target.clear(mask);
    }

    /// Set the framebuffer clear color from unit-range floats.
    pub fn clear_color(&mut self, red: f32, green: f32, blue: f32, alpha: f32) {
        self.target
            .set_clear_color(Rgba::from_unit(red, green, blue, alpha));
    }

    /// Drain any fragments still queued into the framebuffer.
    pub fn flush(&mut self) {
        self.drain_fragments();
    }

    // -- Output access ---------------------------------------------------

    /// The color framebuffer, for the display layer. Callers may read it
    /// between draw calls but must not mutate it.
    pub fn framebuffer(&self) -> &RgbaImage {
        self.target.color()
    }

    /// The depth buffer; depth lives in the alpha channel.
    pub fn depth_buffer(&self) -> &RgbaImage {
        self.target.depth()
    }

    pub fn width(&self) -> u32 {
        self.target.width()
    }

    pub fn height(&self) -> u32 {
        self.target.height()
    }

    /// Resize both output buffers, discarding their contents.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.target.resize(width, height);
    }

    /// Shading calibration constants, tunable per output device.
    pub fn tuning_mut(&mut self) -> &mut ShadingTuning {
        &mut self.tuning
    }

    /// Number of screen vertices waiting for primitive assembly.
    pub fn pending_vertices(&self) -> usize {
        self.raster_queue.len()
    }

    /// Number of fragments not yet resolved into the framebuffer.
    pub fn pending_fragments(&self) -> usize {
        self.fragment_queue.len()
    }

    // -- Pipeline stages -------------------------------------------------

    /// Transform stage: modelview, projection, perspective divide, and
    /// viewport mapping for the front vertex of the vertex queue. The
    /// screen vertex keeps the pre-projection view-space z.
    fn transform_vertex(&mut self) {
        let Some(vertex) = self.vertex_queue.pop_front() else {
            return;
        };

        let modelview = self.matrices.modelview();
        let view_pos = modelview * vertex.position;
        let clip_pos = self.matrices.projection() * view_pos;
        let ndc = clip_pos.truncate() / clip_pos.w;

        let half = self.viewport.size / 2.0;
        let position = Vec3::new(
            (ndc.x * half + half + self.viewport.x_origin).round(),
            (ndc.y * half + half + self.viewport.y_origin).round(),
            view_pos.z,
        );

        self.raster_queue.push_back(ScreenVertex {
            position,
            color: vertex.color,
            normal: (modelview * vertex.normal).truncate(),
            material: vertex.material,
            u: vertex.u,
            v: vertex.v,
        });
    }

    /// Primitive assembly: if the raster queue holds enough vertices for
    /// the active primitive, consume them and scan-convert. Returns false
    /// while waiting for more vertices or with no primitive active.
    fn rasterize_primitive(&mut self) -> bool {
        if self.raster_queue.is_empty() {
            return false;
        }
        let Some(primitive) = self.primitive else {
            return false;
        };
        let needed = primitive.vertex_count();
        if self.raster_queue.len() < needed {
            return false;
        }

        let vertices: SmallVec<[ScreenVertex; 3]> = self.raster_queue.drain(..needed).collect();
        let state = RasterState {
            flags: self.flags,
            light: &self.light,
            tuning: self.tuning,
            texture: &self.texture,
            tex_env: self.tex_env,
            depth_range: self.matrices.depth_range,
            line_width: self.line_width,
            width: self.target.width(),
            height: self.target.height(),
        };

        match primitive {
            Primitive::Points => raster::point(
                &vertices[0],
                self.point_size,
                state.width,
                state.height,
                &mut self.fragment_queue,
            ),
            Primitive::Lines => {
                raster::line(&vertices[0], &vertices[1], &state, &mut self.fragment_queue)
            }
            Primitive::Triangles => raster::triangle(
                &vertices[0],
                &vertices[1],
                &vertices[2],
                &state,
                &mut self.fragment_queue,
            ),
        }
        true
    }

    /// Fragment stage: resolve every queued fragment into the target.
    fn drain_fragments(&mut self) {
        while let Some(fragment) = self.fragment_queue.pop_front() {
            self.target.resolve(&fragment, self.flags.depth_test);
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────
