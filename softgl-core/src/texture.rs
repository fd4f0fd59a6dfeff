// The single bound texture and its environment mode.
//
// The store keeps the uploaded image with its axes transposed (width and
// height swapped), and sampling indexes it `[col][row]`; together the two
// swaps keep the image origin consistent with the screen's row/column
// addressing. Exactly one of the two conventions may be changed, never
// both.

use image::RgbaImage;
use log::debug;

use crate::color::Rgba;

/// How a sampled texel combines with the incoming fragment color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum TexEnv {
    /// Fragment color multiplied componentwise by the texel.
    Modulate = 1,
    /// Texel replaces the fragment color.
    Replace = 2,
}

impl TexEnv {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::Modulate),
            2 => Some(Self::Replace),
            _ => None,
        }
    }
}

/// Transposed store for the one bound texture image.
#[derive(Debug, Clone, Default)]
pub struct Texture {
    store: RgbaImage,
}

impl Texture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.store.width() > 0 && self.store.height() > 0
    }

    /// Stored dimensions, swapped relative to the uploaded image.
    pub fn dimensions(&self) -> (u32, u32) {
        self.store.dimensions()
    }

    /// Copy `image` into the store, transposing its axes. The caller may
    /// free or reuse the source immediately.
    pub fn upload(&mut self, image: &RgbaImage) {
        let (width, height) = image.dimensions();
        self.store = RgbaImage::new(height, width);
        for row in 0..height {
            for col in 0..width {
                self.store.put_pixel(row, col, *image.get_pixel(col, row));
            }
        }
    }

    /// Nearest sample at texture coordinates `(u, v)`, expected in [0, 1).
    ///
    /// The row index scales by the stored height and the column index by
    /// the stored width, mirroring the transposed store. Out-of-range
    /// coordinates clamp to the edge; sampling with no texture loaded
    /// yields opaque white.
    pub fn sample(&self, u: f32, v: f32) -> Rgba {
        if !self.is_loaded() {
            debug!("texture sample with no texture loaded");
            return Rgba::WHITE;
        }
        let (width, height) = self.store.dimensions();
        let row = ((u * height as f32) as i64).clamp(0, height as i64 - 1) as u32;
        let col = ((v * width as f32) as i64).clamp(0, width as i64 - 1) as u32;
        Rgba::from(*self.store.get_pixel(col, row))
    }
}

// ── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn test_image() -> RgbaImage {
        // 2 wide, 3 tall, uniquely colored pixels
        let mut image = RgbaImage::new(2, 3);
        for y in 0..3 {
            for x in 0..2 {
                image.put_pixel(x, y, image::Rgba([x as u8, y as u8, 0, 255]));
            }
        }
        image
    }

    #[test]
    fn upload_transposes_dimensions() {
        let mut texture = Texture::new();
        texture.upload(&test_image());
        assert_eq!(texture.dimensions(), (3, 2));
    }

    #[test]
    fn sampling_recovers_source_pixels() {
        let mut texture = Texture::new();
        texture.upload(&test_image());
        // u scales by source width, v by source height: the transposed
        // store and the swapped indices cancel out.
        for y in 0..3u32 {
            for x in 0..2u32 {
                let u = (x as f32 + 0.5) / 2.0;
                let v = (y as f32 + 0.5) / 3.0;
                let texel = texture.sample(u, v);
                assert_eq!((texel.r, texel.g), (x as u8, y as u8), "at ({x},{y})");
            }
        }
    }

    #[test]
    fn out_of_range_coordinates_clamp() {
        let mut texture = Texture::new();
        texture.upload(&test_image());
        assert_eq!(texture.sample(2.0, 2.0), texture.sample(0.99, 0.99));
        assert_eq!(texture.sample(-1.0, -1.0), texture.sample(0.0, 0.0));
    }

    #[test]
    fn empty_texture_samples_white() {
        let texture = Texture::new();
        assert_eq!(texture.sample(0.5, 0.5), Rgba::WHITE);
        assert!(!texture.is_loaded());
    }

    #[test]
    fn tex_env_decodes() {
        assert_eq!(TexEnv::from_u32(1), Some(TexEnv::Modulate));
        assert_eq!(TexEnv::from_u32(2), Some(TexEnv::Replace));
        assert!(TexEnv::from_u32(0).is_none());
    }
}
