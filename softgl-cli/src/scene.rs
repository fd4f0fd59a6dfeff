// JSON scene descriptions: a small declarative format mapped 1:1 onto
// pipeline calls, so a scene file can exercise anything the API can.

use std::path::Path;

use serde::Deserialize;
use softgl_core::{
    Capability, Context, MatrixMode, Primitive, TexEnv, AMBIENT, COLOR_BUFFER_BIT,
    DEPTH_BUFFER_BIT, DIFFUSE, EMISSION, POSITION, SHININESS, SPECULAR,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SceneError {
    #[error("failed to read scene file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse scene file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown primitive {0:?} (expected points, lines, or triangles)")]
    UnknownPrimitive(String),

    #[error("failed to load texture image: {0}")]
    Texture(#[from] image::ImageError),
}

/// Top-level scene description.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_clear_color")]
    pub clear_color: [f32; 4],
    pub projection: Projection,
    #[serde(default)]
    pub camera: Vec<Transform>,
    #[serde(default)]
    pub depth_test: bool,
    #[serde(default)]
    pub light: Option<Light>,
    #[serde(default)]
    pub tuning: Option<Tuning>,
    #[serde(default)]
    pub texture: Option<TextureDesc>,
    pub objects: Vec<Object>,
}

fn default_clear_color() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Projection {
    Ortho {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    },
    Frustum {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Transform {
    Translate { x: f32, y: f32, z: f32 },
    Rotate { angle: f32, x: f32, y: f32, z: f32 },
    Scale { x: f32, y: f32, z: f32 },
}

#[derive(Debug, Deserialize)]
pub struct Light {
    pub position: [f32; 4],
    #[serde(default)]
    pub ambient: Option<[f32; 4]>,
    #[serde(default)]
    pub diffuse: Option<[f32; 4]>,
    #[serde(default)]
    pub specular: Option<[f32; 4]>,
}

#[derive(Debug, Deserialize)]
pub struct Tuning {
    pub gamma: f32,
    pub lift: f32,
}

#[derive(Debug, Deserialize)]
pub struct TextureDesc {
    pub path: String,
    #[serde(default)]
    pub replace: bool,
}

#[derive(Debug, Deserialize)]
pub struct Material {
    #[serde(default)]
    pub ambient: Option<[f32; 4]>,
    #[serde(default)]
    pub diffuse: Option<[f32; 4]>,
    #[serde(default)]
    pub specular: Option<[f32; 4]>,
    #[serde(default)]
    pub emissive: Option<[f32; 4]>,
    #[serde(default)]
    pub shininess: Option<f32>,
}

#[derive(Debug, Deserialize)]
pub struct Object {
    pub primitive: String,
    pub vertices: Vec<[f32; 3]>,
    #[serde(default)]
    pub colors: Vec<[f32; 3]>,
    #[serde(default)]
    pub normals: Vec<[f32; 3]>,
    #[serde(default)]
    pub texcoords: Vec<[f32; 2]>,
    #[serde(default)]
    pub transforms: Vec<Transform>,
    #[serde(default)]
    pub lit: bool,
    #[serde(default)]
    pub textured: bool,
    #[serde(default)]
    pub material: Option<Material>,
    #[serde(default)]
    pub point_size: Option<f32>,
    #[serde(default)]
    pub line_width: Option<f32>,
}

/// Load a scene description from a JSON file.
pub fn load(path: &Path) -> Result<Scene, SceneError> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn parse_primitive(name: &str) -> Result<Primitive, SceneError> {
    match name {
        "points" => Ok(Primitive::Points),
        "lines" => Ok(Primitive::Lines),
        "triangles" => Ok(Primitive::Triangles),
        other => Err(SceneError::UnknownPrimitive(other.to_string())),
    }
}

fn apply_transforms(context: &mut Context, transforms: &[Transform]) {
    for transform in transforms {
        match *transform {
            Transform::Translate { x, y, z } => context.translatef(x, y, z),
            Transform::Rotate { angle, x, y, z } => context.rotatef(angle, x, y, z),
            Transform::Scale { x, y, z } => context.scalef(x, y, z),
        }
    }
}

impl Scene {
    /// Replay the scene into a fresh context and return it.
    pub fn render(&self) -> Result<Context, SceneError> {
        let mut context = Context::new(self.width, self.height);
        context.viewport(0, 0, self.width as i32, self.height as i32);

        context.matrix_mode(MatrixMode::Projection as u32);
        match self.projection {
            Projection::Ortho {
                left,
                right,
                bottom,
                top,
                near,
                far,
            } => context.ortho(left, right, bottom, top, near, far),
            Projection::Frustum {
                left,
                right,
                bottom,
                top,
                near,
                far,
            } => context.frustum(left, right, bottom, top, near, far),
        }
        context.matrix_mode(MatrixMode::ModelView as u32);
        context.load_identity();

        let [r, g, b, a] = self.clear_color;
        context.clear_color(r, g, b, a);
        context.clear(COLOR_BUFFER_BIT | DEPTH_BUFFER_BIT);

        if self.depth_test {
            context.enable(Capability::DepthTest as u32);
        }
        if let Some(tuning) = &self.tuning {
            context.tuning_mut().gamma = tuning.gamma;
            context.tuning_mut().lift = tuning.lift;
        }
        if let Some(light) = &self.light {
            context.light(POSITION, &light.position);
            if let Some(ambient) = light.ambient {
                context.light(AMBIENT, &ambient);
            }
            if let Some(diffuse) = light.diffuse {
                context.light(DIFFUSE, &diffuse);
            }
            if let Some(specular) = light.specular {
                context.light(SPECULAR, &specular);
            }
        }
        if let Some(texture) = &self.texture {
            let image = image::open(&texture.path)?.to_rgba8();
            context.tex_image_2d(&image);
            let mode = if texture.replace {
                TexEnv::Replace
            } else {
                TexEnv::Modulate
            };
            context.tex_env_mode(mode as u32);
        }

        apply_transforms(&mut context, &self.camera);

        for object in &self.objects {
            self.draw_object(&mut context, object)?;
        }
        context.flush();
        Ok(context)
    }

    fn draw_object(&self, context: &mut Context, object: &Object) -> Result<(), SceneError> {
        let primitive = parse_primitive(&object.primitive)?;

        if let Some(size) = object.point_size {
            context.point_size(size);
        }
        if let Some(width) = object.line_width {
            context.line_width(width);
        }
        if object.lit {
            context.enable(Capability::Lighting as u32);
        } else {
            context.disable(Capability::Lighting as u32);
        }
        if object.textured {
            context.enable(Capability::Texture2d as u32);
        } else {
            context.disable(Capability::Texture2d as u32);
        }
        if let Some(material) = &object.material {
            if let Some(ambient) = material.ambient {
                context.materialfv(AMBIENT, &ambient);
            }
            if let Some(diffuse) = material.diffuse {
                context.materialfv(DIFFUSE, &diffuse);
            }
            if let Some(specular) = material.specular {
                context.materialfv(SPECULAR, &specular);
            }
            if let Some(emissive) = material.emissive {
                context.materialfv(EMISSION, &emissive);
            }
            if let Some(shininess) = material.shininess {
                context.materialf(SHININESS, shininess);
            }
        }

        context.push_matrix();
        apply_transforms(context, &object.transforms);

        context.begin(primitive as u32);
        for (index, vertex) in object.vertices.iter().enumerate() {
            if let Some([r, g, b]) = object.colors.get(index) {
                context.color_3f(*r, *g, *b);
            }
            if let Some([x, y, z]) = object.normals.get(index) {
                context.normal_3f(*x, *y, *z);
            }
            if let Some([u, v]) = object.texcoords.get(index) {
                context.tex_coord_2f(*u, *v);
            }
            context.vertex_3f(vertex[0], vertex[1], vertex[2]);
        }
        context.end();

        context.pop_matrix();
        Ok(())
    }
}

// ── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "width": 16,
        "height": 16,
        "projection": {"kind": "ortho", "left": -1, "right": 1,
                       "bottom": -1, "top": 1, "near": 1, "far": -1},
        "objects": [
            {"primitive": "triangles",
             "colors": [[1, 0, 0], [0, 1, 0], [0, 0, 1]],
             "vertices": [[-1, -1, 0], [1, -1, 0], [0, 1, 0]]}
        ]
    }"#;

    #[test]
    fn minimal_scene_parses_and_renders() {
        let scene: Scene = serde_json::from_str(MINIMAL).unwrap();
        let context = scene.render().unwrap();
        assert_eq!(context.width(), 16);
        // center pixel is covered by the triangle
        let pixel = context.framebuffer().get_pixel(8, 8);
        assert_ne!(pixel.0, [0, 0, 0, 255]);
    }

    #[test]
    fn unknown_primitive_is_an_error() {
        let mut scene: Scene = serde_json::from_str(MINIMAL).unwrap();
        scene.objects[0].primitive = "quads".to_string();
        let error = scene.render().err().expect("render must fail");
        match error {
            SceneError::UnknownPrimitive(name) => assert_eq!(name, "quads"),
            other => panic!("expected UnknownPrimitive, got {other}"),
        }
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let text = r#"{"width": 8, "height": 8, "bogus": 1, "projection":
            {"kind": "ortho", "left": -1, "right": 1, "bottom": -1,
             "top": 1, "near": 1, "far": -1}, "objects": []}"#;
        assert!(serde_json::from_str::<Scene>(text).is_err());
    }
}
