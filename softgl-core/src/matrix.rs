// Matrix stacks and the viewport transform.
//
// Two independent LIFO stacks of column-major 4x4 matrices (modelview and
// projection), each guaranteed non-empty. A mode selector chooses which
// stack the manipulation calls target. Projection helpers build the
// standard GL matrices and right-multiply the current top; degenerate
// parameters are rejected with a warning and no state change.

use glam::{Mat4, Vec3, Vec4};
use log::warn;

use crate::state::MatrixMode;

// ── Depth range ─────────────────────────────────────────────────

/// Near/far planes recorded by the most recent projection setup, used to
/// normalize view-space z into [0, 1] at rasterization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthRange {
    pub near: f32,
    pub far: f32,
}

impl Default for DepthRange {
    fn default() -> Self {
        Self {
            near: 1.0,
            far: -1.0,
        }
    }
}

// ── Matrix stacks ───────────────────────────────────────────────

/// The modelview and projection stacks plus the mode selector.
#[derive(Debug, Clone)]
pub struct MatrixStacks {
    mode: Option<MatrixMode>,
    modelview: Vec<Mat4>,
    projection: Vec<Mat4>,
    pub depth_range: DepthRange,
}

impl Default for MatrixStacks {
    fn default() -> Self {
        Self::new()
    }
}

impl MatrixStacks {
    pub fn new() -> Self {
        Self {
            mode: Some(MatrixMode::ModelView),
            modelview: vec![Mat4::IDENTITY],
            projection: vec![Mat4::IDENTITY],
            depth_range: DepthRange::default(),
        }
    }

    /// Select which stack subsequent operations target. Unknown raw values
    /// leave every later operation a no-op until a valid mode is set.
    pub fn set_mode(&mut self, raw: u32) {
        self.mode = MatrixMode::from_u32(raw);
        if self.mode.is_none() {
            warn!("unknown matrix mode {}, matrix operations disabled", raw);
        }
    }

    /// Current top of the modelview stack.
    pub fn modelview(&self) -> Mat4 {
        *self.modelview.last().expect("modelview stack is never empty")
    }

    /// Current top of the projection stack.
    pub fn projection(&self) -> Mat4 {
        *self.projection.last().expect("projection stack is never empty")
    }

    pub fn modelview_depth(&self) -> usize {
        self.modelview.len()
    }

    pub fn projection_depth(&self) -> usize {
        self.projection.len()
    }

    fn selected(&mut self) -> Option<&mut Vec<Mat4>> {
        match self.mode? {
            MatrixMode::ModelView => Some(&mut self.modelview),
            MatrixMode::Projection => Some(&mut self.projection),
        }
    }

    /// Duplicate the top of the selected stack.
    pub fn push(&mut self) {
        if let Some(stack) = self.selected() {
            let top = *stack.last().expect("matrix stack is never empty");
            stack.push(top);
        }
    }

    /// Remove the top of the selected stack. The last entry is retained:
    /// popping a stack of depth 1 warns and changes nothing.
    pub fn pop(&mut self) {
        if let Some(stack) = self.selected() {
            if stack.len() > 1 {
                stack.pop();
            } else {
                warn!("matrix stack pop at depth 1 ignored");
            }
        }
    }

    /// Replace the top of the selected stack with the identity.
    pub fn load_identity(&mut self) {
        if let Some(stack) = self.selected() {
            *stack.last_mut().expect("matrix stack is never empty") = Mat4::IDENTITY;
        }
    }

    /// Right-multiply the top of the selected stack: `top = top · m`.
    pub fn mult(&mut self, m: Mat4) {
        if let Some(stack) = self.selected() {
            let top = stack.last_mut().expect("matrix stack is never empty");
            *top = *top * m;
        }
    }

    /// Right-multiply by a matrix supplied in column-major element order.
    pub fn mult_column_major(&mut self, elements: &[f32; 16]) {
        self.mult(Mat4::from_cols_array(elements));
    }

    // ── Projection helpers ──────────────────────────────────────

    /// Right-multiply by a perspective frustum matrix and record the depth
    /// range. Non-positive near/far or empty extents are rejected.
    pub fn frustum(&mut self, left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) {
        if near <= 0.0 || far <= 0.0 || left == right || bottom == top || near == far {
            warn!("rejecting degenerate frustum parameters");
            return;
        }
        let m = Mat4::from_cols(
            Vec4::new(2.0 * near / (right - left), 0.0, 0.0, 0.0),
            Vec4::new(0.0, 2.0 * near / (top - bottom), 0.0, 0.0),
            Vec4::new(
                (right + left) / (right - left),
                (top + bottom) / (top - bottom),
                -(far + near) / (far - near),
                -1.0,
            ),
            Vec4::new(0.0, 0.0, -2.0 * far * near / (far - near), 0.0),
        );
        self.mult(m);
        self.depth_range = DepthRange { near, far };
    }

    /// Right-multiply by an orthographic projection matrix and record the
    /// depth range. Empty extents are rejected.
    pub fn ortho(&mut self, left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) {
        if left == right || bottom == top || near == far {
            warn!("rejecting degenerate ortho parameters");
            return;
        }
        let m = Mat4::from_cols(
            Vec4::new(2.0 / (right - left), 0.0, 0.0, 0.0),
            Vec4::new(0.0, 2.0 / (top - bottom), 0.0, 0.0),
            Vec4::new(0.0, 0.0, -2.0 / (far - near), 0.0),
            Vec4::new(
                -(right + left) / (right - left),
                -(top + bottom) / (top - bottom),
                -(far + near) / (far - near),
                1.0,
            ),
        );
        self.mult(m);
        self.depth_range = DepthRange { near, far };
    }

    /// Right-multiply by a rotation of `angle` degrees about the given
    /// axis. The axis is normalized only when longer than unit.
    pub fn rotate(&mut self, angle: f32, x: f32, y: f32, z: f32) {
        let mut axis = Vec3::new(x, y, z);
        if axis.length() > 1.0 {
            axis = axis.normalize();
        }
        let radians = angle.to_radians();
        let (s, c) = radians.sin_cos();
        let t = 1.0 - c;
        let (x, y, z) = (axis.x, axis.y, axis.z);

        let m = Mat4::from_cols(
            Vec4::new(x * x * t + c, y * x * t + z * s, x * z * t - y * s, 0.0),
            Vec4::new(x * y * t - z * s, y * y * t + c, y * z * t + x * s, 0.0),
            Vec4::new(x * z * t + y * s, y * z * t - x * s, z * z * t + c, 0.0),
            Vec4::W,
        );
        self.mult(m);
    }

    /// Right-multiply by a scale matrix.
    pub fn scale(&mut self, sx: f32, sy: f32, sz: f32) {
        self.mult(Mat4::from_scale(Vec3::new(sx, sy, sz)));
    }

    /// Right-multiply by a translation matrix.
    pub fn translate(&mut self, tx: f32, ty: f32, tz: f32) {
        self.mult(Mat4::from_translation(Vec3::new(tx, ty, tz)));
    }
}

// ── Viewport ────────────────────────────────────────────────────

/// The raster area: a centered square within the requested rectangle.
///
/// `size` is the side of the square (the smaller of width and height) and
/// the origins place it centered inside the rectangle.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub size: f32,
    pub x_origin: f32,
    pub y_origin: f32,
}

impl Viewport {
    /// Set the viewport rectangle. Negative extents are rejected.
    pub fn set(&mut self, x: i32, y: i32, width: i32, height: i32) {
        if width < 0 || height < 0 {
            warn!("rejecting viewport with negative extent {}x{}", width, height);
            return;
        }
        let size = width.min(height) as f32;
        self.size = size;
        self.x_origin = x as f32 + (width as f32 / 2.0 - size / 2.0);
        self.y_origin = y as f32 + (height as f32 / 2.0 - size / 2.0);
    }
}

// ── Tests ───────────────────────────────────────────────────────
