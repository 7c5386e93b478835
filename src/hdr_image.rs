use bevy::math::Vec3;
use image::{ImageBuffer, ImageFormat, Rgb, RgbImage};
use std::path::Path;

use crate::error::RenderError;

/// Floating point RGB frame buffer.
///
/// Logical coordinates put (0, 0) at the bottom-left; rows are stored
/// top-first so the buffer can be written out without another flip.
#[derive(Clone, Debug)]
pub struct HdrImage {
    width: u32,
    height: u32,
    pixels: Vec<Vec3>,
}

impl HdrImage {
    /// Create a black image
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Vec3::ZERO; (width * height) as usize],
        }
    }

    /// Decode an image file into linear [0, 1] floats
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RenderError> {
        let decoded = image::open(path.as_ref())?.to_rgb32f();
        let (width, height) = decoded.dimensions();
        let pixels = decoded
            .pixels()
            .map(|p| Vec3::new(p.0[0], p.0[1], p.0[2]))
            .collect();

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Encode as an 8-bit RGB PNG
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RenderError> {
        let img: RgbImage = ImageBuffer::from_fn(self.width, self.height, |x, y| {
            let color = self.pixels[(y * self.width + x) as usize];
            Rgb([
                quantize_channel(color.x),
                quantize_channel(color.y),
                quantize_channel(color.z),
            ])
        });
        img.save_with_format(path.as_ref(), ImageFormat::Png)?;
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw pixel storage in top-first row order
    pub fn pixels(&self) -> &[Vec3] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Vec3] {
        &mut self.pixels
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        ((self.height - 1 - y) * self.width + x) as usize
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Vec3 {
        self.pixels[self.index(x, y)]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Vec3) {
        let idx = self.index(x, y);
        self.pixels[idx] = color;
    }

    /// Fill the inclusive vertical run `y0..=y1` of column `x`, clamped to the image
    pub fn set_line(&mut self, x: u32, y0: i32, y1: i32, color: Vec3) {
        let y0 = y0.max(0);
        let y1 = y1.min(self.height as i32 - 1);
        for y in y0..=y1 {
            self.set_pixel(x, y as u32, color);
        }
    }

    /// Copy a bottom-up column of pixels into column `x`
    pub fn write_column(&mut self, x: u32, column: &[Vec3]) {
        for (y, color) in column.iter().take(self.height as usize).enumerate() {
            self.set_pixel(x, y as u32, *color);
        }
    }
}

/// Float channel to byte: truncate, saturate at 255. NaN and negatives become 0.
#[inline]
fn quantize_channel(value: f32) -> u8 {
    ((value * 255.0) as i32).clamp(0, 255) as u8
}
