#![forbid(unsafe_code)]

//! Paint targets.
//!
//! The host shell owns the real paint surface; the panel only needs the
//! small contract in [`Surface`]. [`PixelSurface`] is the bundled software
//! implementation, used by headless tests and by hosts that hand the panel
//! a plain pixel buffer.

use minimap_core::color::Rgba;
use minimap_core::geometry::Rect;

use crate::raster::RasterBuffer;

/// A drawable pixel target.
///
/// All drawing is clipped to the surface bounds. Fills and strokes blend
/// with source-over semantics, so translucent overlay colors read as
/// overlays instead of opaque boxes.
pub trait Surface {
    /// Surface width in pixels.
    fn width(&self) -> u32;

    /// Surface height in pixels.
    fn height(&self) -> u32;

    /// Fill `rect` with `color`, blending by the color's alpha.
    fn fill(&mut self, rect: Rect, color: Rgba);

    /// Draw a one-pixel outline of `rect`, blending by the color's alpha.
    fn stroke(&mut self, rect: Rect, color: Rgba);

    /// Blit source rows `[src_y, src_y + src_h)` of `src`, scaled to cover
    /// `dst`. Samples outside the source grid leave the destination
    /// untouched.
    fn blit_scaled(&mut self, src: &RasterBuffer, src_y: u32, src_h: u32, dst: Rect);
}

/// Software [`Surface`] backed by a row-major RGBA buffer.
#[derive(Debug, Clone)]
pub struct PixelSurface {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl PixelSurface {
    /// Create a surface filled with transparent black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::TRANSPARENT; width as usize * height as usize],
        }
    }

    /// Sample a pixel, or `None` outside the surface.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[(y * self.width + x) as usize])
    }

    fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    #[inline]
    fn blend_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        let idx = (y * self.width + x) as usize;
        self.pixels[idx] = color.over(self.pixels[idx]);
    }
}

impl Surface for PixelSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn fill(&mut self, rect: Rect, color: Rgba) {
        let clipped = self.bounds().intersection(&rect);
        for y in clipped.y..clipped.bottom() {
            for x in clipped.x..clipped.right() {
                self.blend_pixel(x as u32, y as u32, color);
            }
        }
    }

    fn stroke(&mut self, rect: Rect, color: Rgba) {
        if rect.is_empty() {
            return;
        }
        let Rect {
            x,
            y,
            width,
            height,
        } = rect;
        self.fill(Rect::new(x, y, width, 1), color);
        if height > 1 {
            self.fill(Rect::new(x, rect.bottom() - 1, width, 1), color);
        }
        if height > 2 {
            let inner = height - 2;
            self.fill(Rect::new(x, y + 1, 1, inner), color);
            if width > 1 {
                self.fill(Rect::new(rect.right() - 1, y + 1, 1, inner), color);
            }
        }
    }

    fn blit_scaled(&mut self, src: &RasterBuffer, src_y: u32, src_h: u32, dst: Rect) {
        if dst.is_empty() || src_h == 0 {
            return;
        }
        let clipped = self.bounds().intersection(&dst);
        for y in clipped.y..clipped.bottom() {
            let sy = src_y + ((y - dst.y) as u64 * src_h as u64 / dst.height as u64) as u32;
            for x in clipped.x..clipped.right() {
                let sx = ((x - dst.x) as u64 * src.width() as u64 / dst.width as u64) as u32;
                if let Some(sample) = src.pixel(sx, sy) {
                    self.pixels[(y as u32 * self.width + x as u32) as usize] = sample;
                }
            }
        }
    }
}
