// softgl-core — a software fixed-function immediate-mode 3D pipeline.
//
// Primitives are described vertex-by-vertex with attached attributes,
// transformed through a matrix hierarchy, scan-converted into fragments,
// shaded with a per-vertex or per-fragment Phong model, optionally
// textured, depth-tested, and written to a color framebuffer with an
// 8-bit depth buffer. `pipeline::Context` is the top-level entry point;
// submodules implement the individual stages.

pub mod color;
pub mod framebuffer;
pub mod lighting;
pub mod matrix;
pub mod pipeline;
pub mod raster;
pub mod state;
pub mod texture;
pub mod vertex;

pub use color::Rgba;
pub use framebuffer::RenderTarget;
pub use matrix::{DepthRange, MatrixStacks, Viewport};
pub use pipeline::Context;
pub use state::{
    AttributeState, Capability, LightState, MaterialState, MatrixMode, Primitive, RenderFlags,
    ShadingTuning, AMBIENT, AMBIENT_AND_DIFFUSE, COLOR_BUFFER_BIT, DEPTH_BUFFER_BIT, DIFFUSE,
    EMISSION, POSITION, SHININESS, SPECULAR,
};
pub use texture::{TexEnv, Texture};
pub use vertex::{Fragment, PipelineVertex, ScreenVertex};
