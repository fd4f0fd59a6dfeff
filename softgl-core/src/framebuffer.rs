// The render target: color framebuffer, depth buffer, clear state, and
// the fragment stage that resolves rasterized fragments into both.
//
// The depth buffer is a second RGBA image whose alpha channel holds the
// 8-bit quantized depth; 255 is the cleared "farthest" value and closer
// fragments only ever decrease it.

use image::RgbaImage;

use crate::color::Rgba;
use crate::state::{COLOR_BUFFER_BIT, DEPTH_BUFFER_BIT};
use crate::vertex::Fragment;

/// Color + depth image pair of identical dimensions.
#[derive(Debug, Clone)]
pub struct RenderTarget {
    color: RgbaImage,
    depth: RgbaImage,
    clear_color: Rgba,
    depth_clear: Rgba,
}

impl RenderTarget {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            color: RgbaImage::new(width, height),
            depth: RgbaImage::new(width, height),
            clear_color: Rgba::new(0, 0, 0, 0),
            depth_clear: Rgba::new(0, 0, 0, 255),
        }
    }

    /// Resize both buffers, discarding their contents.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.color = RgbaImage::new(width, height);
        self.depth = RgbaImage::new(width, height);
    }

    pub fn width(&self) -> u32 {
        self.color.width()
    }

    pub fn height(&self) -> u32 {
        self.color.height()
    }

    pub fn color(&self) -> &RgbaImage {
        &self.color
    }

    pub fn depth(&self) -> &RgbaImage {
        &self.depth
    }

    pub fn set_clear_color(&mut self, color: Rgba) {
        self.clear_color = color;
    }

    pub fn clear_color_value(&self) -> Rgba {
        self.clear_color
    }

    /// Fill the buffers selected by `mask` with their clear values.
    pub fn clear(&mut self, mask: u32) {
        if mask & COLOR_BUFFER_BIT != 0 {
            let fill: image::Rgba<u8> = self.clear_color.into();
            for pixel in self.color.pixels_mut() {
                *pixel = fill;
            }
        }
        if mask & DEPTH_BUFFER_BIT != 0 {
            let fill: image::Rgba<u8> = self.depth_clear.into();
            for pixel in self.depth.pixels_mut() {
                *pixel = fill;
            }
        }
    }

    /// The fragment stage: depth-test (when enabled) and write.
    ///
    /// A fragment passes while its quantized depth is at most the stored
    /// value, then overwrites the stored depth with its own truncated
    /// quantization. Fragments are assumed in-bounds; the rasterizer never
    /// emits addresses outside the buffers.
    pub fn resolve(&mut self, fragment: &Fragment, depth_test: bool) {
        let (col, row) = (fragment.col as u32, fragment.row as u32);
        if depth_test {
            let stored = self.depth.get_pixel(col, row).0[3];
            if fragment.depth * 255.0 <= stored as f32 {
                self.color.put_pixel(col, row, fragment.color.into());
                let quantized = (fragment.depth * 255.0) as u8;
                self.depth.put_pixel(col, row, image::Rgba([0, 0, 0, quantized]));
            }
        } else {
            self.color.put_pixel(col, row, fragment.color.into());
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(col: i32, row: i32, color: Rgba, depth: f32) -> Fragment {
        Fragment {
            row,
            col,
            color,
            depth,
        }
    }

    #[test]
    fn clear_fills_selected_buffers() {
        let mut target = RenderTarget::new(4, 4);
        target.set_clear_color(Rgba::new(10, 20, 30, 40));
        target.clear(COLOR_BUFFER_BIT | DEPTH_BUFFER_BIT);
        for pixel in target.color().pixels() {
            assert_eq!(Rgba::from(*pixel), Rgba::new(10, 20, 30, 40));
        }
        for pixel in target.depth().pixels() {
            assert_eq!(pixel.0[3], 255);
        }
    }

    #[test]
    fn clear_with_color_bit_leaves_depth() {
        let mut target = RenderTarget::new(2, 2);
        target.clear(DEPTH_BUFFER_BIT);
        target.resolve(&fragment(0, 0, Rgba::WHITE, 0.5), true);
        let before = target.depth().get_pixel(0, 0).0[3];
        target.clear(COLOR_BUFFER_BIT);
        assert_eq!(target.depth().get_pixel(0, 0).0[3], before);
    }

    #[test]
    fn depth_test_accepts_closer_and_rejects_farther() {
        let mut target = RenderTarget::new(2, 2);
        target.clear(COLOR_BUFFER_BIT | DEPTH_BUFFER_BIT);
        let red = Rgba::new(255, 0, 0, 255);
        let blue = Rgba::new(0, 0, 255, 255);

        target.resolve(&fragment(1, 1, red, 0.25), true);
        assert_eq!(Rgba::from(*target.color().get_pixel(1, 1)), red);
        assert_eq!(target.depth().get_pixel(1, 1).0[3], 63); // floor(0.25 * 255)

        target.resolve(&fragment(1, 1, blue, 0.75), true);
        assert_eq!(Rgba::from(*target.color().get_pixel(1, 1)), red);

        target.resolve(&fragment(1, 1, blue, 0.1), true);
        assert_eq!(Rgba::from(*target.color().get_pixel(1, 1)), blue);
    }

    #[test]
    fn depth_disabled_always_writes() {
        let mut target = RenderTarget::new(2, 2);
        target.clear(COLOR_BUFFER_BIT | DEPTH_BUFFER_BIT);
        target.resolve(&fragment(0, 0, Rgba::new(255, 0, 0, 255), 0.1), false);
        target.resolve(&fragment(0, 0, Rgba::new(0, 255, 0, 255), 0.9), false);
        assert_eq!(
            Rgba::from(*target.color().get_pixel(0, 0)),
            Rgba::new(0, 255, 0, 255),
        );
        // depth buffer untouched without the test
        assert_eq!(target.depth().get_pixel(0, 0).0[3], 255);
    }

    #[test]
    fn truncated_store_makes_first_fragment_win_ties() {
        let mut target = RenderTarget::new(1, 1);
        target.clear(COLOR_BUFFER_BIT | DEPTH_BUFFER_BIT);
        let red = Rgba::new(255, 0, 0, 255);
        let blue = Rgba::new(0, 0, 255, 255);
        // 0.5 * 255 = 127.5 stores as 127; the second fragment compares
        // 127.5 <= 127 and fails.
        target.resolve(&fragment(0, 0, red, 0.5), true);
        target.resolve(&fragment(0, 0, blue, 0.5), true);
        assert_eq!(Rgba::from(*target.color().get_pixel(0, 0)), red);
    }

    #[test]
    fn resize_matches_new_dimensions() {
        let mut target = RenderTarget::new(4, 4);
        target.resize(8, 2);
        assert_eq!(target.width(), 8);
        assert_eq!(target.height(), 2);
        assert_eq!(target.depth().dimensions(), (8, 2));
    }
}
