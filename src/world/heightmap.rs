use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use std::path::Path;

use crate::error::RenderError;
use crate::hdr_image::HdrImage;

/// Parameters for fractal noise terrain
#[derive(Clone, Debug, PartialEq)]
pub struct NoiseParams {
    pub seed: u32,
    pub frequency: f64,
    pub persistence: f64,
    pub lacunarity: f64,
    pub octaves: usize,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            seed: 42,
            frequency: 4.0,
            persistence: 0.5,
            lacunarity: 2.0,
            octaves: 4,
        }
    }
}

/// Resolution of the voxel grid that procedural terrain is snapped to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridResolution {
    pub x: u32,
    pub y: u32,
}

impl Default for GridResolution {
    fn default() -> Self {
        Self { x: 32, y: 32 }
    }
}

impl GridResolution {
    /// Snap a normalized coordinate to the lower-left corner of its grid cell
    #[inline]
    pub fn snap(&self, x: f32, y: f32) -> (f32, f32) {
        let rx = self.x as f32;
        let ry = self.y as f32;
        ((x * rx).floor() / rx, (y * ry).floor() / ry)
    }
}

/// Height field decoded from the red channel of an image
#[derive(Clone, Debug)]
pub struct ImageHeightmap {
    width: u32,
    height: u32,
    /// Row-major, row 0 at the bottom
    texels: Vec<f32>,
}

impl ImageHeightmap {
    /// Build from raw bottom-up rows. Returns `None` when the sizes disagree or are empty.
    pub fn from_raw(width: u32, height: u32, texels: Vec<f32>) -> Option<Self> {
        if width == 0 || height == 0 || texels.len() != (width * height) as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            texels,
        })
    }

    pub fn from_image(image: &HdrImage) -> Option<Self> {
        let (width, height) = (image.width(), image.height());
        let mut texels = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                texels.push(image.get_pixel(x, y).x);
            }
        }
        Self::from_raw(width, height, texels)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, RenderError> {
        let path = path.as_ref();
        let image = HdrImage::load(path)?;
        Self::from_image(&image).ok_or_else(|| {
            RenderError::InvalidArgument(format!("heightmap {} is empty", path.display()))
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Nearest texel lookup in pixel space, tiled infinitely in both axes
    pub fn texel(&self, px: f32, py: f32) -> f32 {
        let xi = (px.floor() as i64).rem_euclid(self.width as i64) as usize;
        let yi = (py.floor() as i64).rem_euclid(self.height as i64) as usize;
        self.texels[yi * self.width as usize + xi]
    }

    /// Sample with normalized coordinates, one tile per unit
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        self.texel(x * self.width as f32, y * self.height as f32)
    }
}

/// Terrain height as a pure function of normalized ground-plane coordinates.
///
/// Sampled several times per pixel for finite-difference normals, so every
/// variant must return the same value for the same input.
#[derive(Clone)]
pub enum HeightmapSource {
    /// Fractal noise evaluated at voxel grid corners
    Procedural {
        fbm: Fbm<Perlin>,
        grid: GridResolution,
    },
    /// Tiled image, red channel
    Image(ImageHeightmap),
    /// Single gaussian hill centered on the tile, snapped to the voxel grid
    GaussianBump { grid: GridResolution },
}

impl HeightmapSource {
    pub fn procedural(params: &NoiseParams, grid: GridResolution) -> Self {
        let fbm = Fbm::<Perlin>::new(params.seed)
            .set_frequency(params.frequency)
            .set_persistence(params.persistence)
            .set_lacunarity(params.lacunarity)
            .set_octaves(params.octaves);
        HeightmapSource::Procedural { fbm, grid }
    }

    pub fn sample(&self, x: f32, y: f32) -> f32 {
        match self {
            HeightmapSource::Procedural { fbm, grid } => {
                let (qx, qy) = grid.snap(x, y);
                let n = fbm.get([qx as f64, qy as f64]) as f32;
                // fBm can slightly overshoot [-1, 1]
                (n * 0.5 + 0.5).clamp(0.0, 1.0)
            }
            HeightmapSource::Image(map) => map.sample(x, y),
            HeightmapSource::GaussianBump { grid } => {
                let (qx, qy) = grid.snap(x, y);
                let a = 2.0 * qx - 1.0;
                let b = 2.0 * qy - 1.0;
                (-(a * a + b * b)).exp()
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            HeightmapSource::Procedural { grid, .. } => {
                format!("procedural fBm on a {}x{} grid", grid.x, grid.y)
            }
            HeightmapSource::Image(map) => {
                format!("image heightmap {}x{}", map.width(), map.height())
            }
            HeightmapSource::GaussianBump { grid } => {
                format!("gaussian bump on a {}x{} grid", grid.x, grid.y)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_map() -> ImageHeightmap {
        let texels = (0..12).map(|i| i as f32 / 12.0).collect();
        ImageHeightmap::from_raw(4, 3, texels).unwrap()
    }

    #[test]
    fn test_from_raw_rejects_bad_sizes() {
        assert!(ImageHeightmap::from_raw(2, 2, vec![0.0; 3]).is_none());
        assert!(ImageHeightmap::from_raw(0, 2, vec![]).is_none());
    }

    #[test]
    fn test_image_heightmap_wraps() {
        let map = ramp_map();
        for xi in 0..4 {
            for yi in 0..3 {
                let x = xi as f32 + 0.5;
                let y = yi as f32 + 0.5;
                let base = map.texel(x, y);
                for n in [-3.0, -1.0, 1.0, 2.0, 5.0] {
                    assert_eq!(map.texel(x + n * 4.0, y), base);
                    assert_eq!(map.texel(x, y + n * 3.0), base);
                }
            }
        }
    }

    #[test]
    fn test_normalized_sampling_tiles() {
        let map = ramp_map();
        let source = HeightmapSource::Image(map);
        let a = source.sample(0.375, 0.5);
        assert_eq!(source.sample(1.375, 0.5), a);
        assert_eq!(source.sample(-0.625, 1.5), a);
    }

    #[test]
    fn test_image_heightmap_reads_red_channel() {
        let mut img = HdrImage::new(2, 2);
        img.set_pixel(1, 0, bevy::math::Vec3::new(0.75, 0.1, 0.2));
        let map = ImageHeightmap::from_image(&img).unwrap();
        assert_eq!(map.texel(1.0, 0.0), 0.75);
        assert_eq!(map.texel(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_grid_snap_to_cell_corner() {
        let grid = GridResolution { x: 4, y: 8 };
        assert_eq!(grid.snap(0.3, 0.3), (0.25, 0.25));
        assert_eq!(grid.snap(0.99, 0.126), (0.75, 0.125));
    }

    #[test]
    fn test_procedural_is_deterministic_and_bounded() {
        let source = HeightmapSource::procedural(&NoiseParams::default(), GridResolution::default());
        for i in 0..50 {
            let x = i as f32 * 0.0213;
            let y = 1.0 - i as f32 * 0.017;
            let h = source.sample(x, y);
            assert!((0.0..=1.0).contains(&h));
            assert_eq!(h, source.sample(x, y));
        }
    }

    #[test]
    fn test_procedural_is_blocky() {
        let grid = GridResolution { x: 8, y: 8 };
        let source = HeightmapSource::procedural(&NoiseParams::default(), grid);
        // Same grid cell, same height
        assert_eq!(source.sample(0.26, 0.51), source.sample(0.37, 0.62));
    }

    #[test]
    fn test_gaussian_bump_peaks_at_center() {
        let source = HeightmapSource::GaussianBump {
            grid: GridResolution::default(),
        };
        let center = source.sample(0.5, 0.5);
        let corner = source.sample(0.01, 0.01);
        assert!((center - 1.0).abs() < 1e-6);
        assert!(corner < 0.2);
        assert!(center > corner);
    }
}
