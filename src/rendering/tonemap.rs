use bevy::math::Vec3;

use crate::hdr_image::HdrImage;
use crate::math::luminance;

/// Keeps log() finite on black pixels
const LOG_DELTA: f32 = 0.001;

/// Parameters of the global Reinhard operator
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReinhardTonemap {
    /// Key value the log-average luminance is scaled to
    pub exposure: f32,
    /// Smallest scaled luminance that maps to pure white
    pub white: f32,
    /// Exponent applied per channel after compression
    pub gamma: f32,
}

impl Default for ReinhardTonemap {
    fn default() -> Self {
        Self {
            exposure: 0.15,
            white: 20.0,
            gamma: 1.0 / 2.2,
        }
    }
}

/// Geometric mean of pixel luminance, `exp(mean(ln(0.001 + L)))`.
/// Returns 0 for an empty buffer.
pub fn log_average_luminance(pixels: &[Vec3]) -> f32 {
    if pixels.is_empty() {
        return 0.0;
    }
    // Accumulate in f64: large frames lose precision in an f32 sum
    let sum: f64 = pixels
        .iter()
        .map(|p| ((LOG_DELTA + luminance(*p)) as f64).ln())
        .sum();
    (sum / pixels.len() as f64).exp() as f32
}

/// Compressive luminance curve `L (1 + L / white^2) / (1 + L)`
#[inline]
pub fn compress_luminance(l: f32, white: f32) -> f32 {
    l * (1.0 + l / (white * white)) / (1.0 + l)
}

impl ReinhardTonemap {
    /// Map a single linear pixel to display range given the frame's reference luminance
    pub fn map_pixel(&self, pixel: Vec3, lum_avg: f32) -> Vec3 {
        let lp = luminance(pixel);
        if lp <= 0.0 {
            return Vec3::ZERO;
        }

        let l = lp * self.exposure / lum_avg;
        let ld = compress_luminance(l, self.white);
        let scaled = (pixel * (ld / lp)).clamp(Vec3::ZERO, Vec3::ONE);
        scaled.powf(self.gamma)
    }

    /// Tonemap the whole frame in place. Needs the complete frame, so it
    /// always runs as a separate pass after rendering. Returns the log-average
    /// luminance used as reference.
    pub fn apply(&self, image: &mut HdrImage) -> f32 {
        let lum_avg = log_average_luminance(image.pixels());
        for pixel in image.pixels_mut() {
            *pixel = self.map_pixel(*pixel, lum_avg);
        }
        lum_avg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_average_of_uniform_image() {
        let gray = vec![Vec3::splat(0.5); 64];
        let avg = log_average_luminance(&gray);
        assert!((avg - 0.5).abs() < 2e-3, "avg = {}", avg);

        let bright = vec![Vec3::splat(7.0); 9];
        assert!((log_average_luminance(&bright) - 7.0).abs() < 2e-3);
    }

    #[test]
    fn test_log_average_of_black_image() {
        let black = vec![Vec3::ZERO; 16];
        assert!((log_average_luminance(&black) - LOG_DELTA).abs() < 1e-6);
    }

    #[test]
    fn test_black_image_stays_black() {
        let mut img = HdrImage::new(8, 8);
        ReinhardTonemap::default().apply(&mut img);
        assert!(img.pixels().iter().all(|p| *p == Vec3::ZERO));
    }

    #[test]
    fn test_compression_is_monotonic() {
        let white = 20.0;
        let mut prev = compress_luminance(0.0, white);
        for i in 1..2000 {
            let l = i as f32 * 0.05;
            let ld = compress_luminance(l, white);
            assert!(ld >= prev, "curve decreased at L = {}", l);
            prev = ld;
        }
    }

    #[test]
    fn test_white_point_maps_to_one() {
        let ld = compress_luminance(20.0, 20.0);
        assert!((ld - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_output_in_display_range() {
        let mut img = HdrImage::new(3, 1);
        img.set_pixel(0, 0, Vec3::new(0.01, 0.02, 0.03));
        img.set_pixel(1, 0, Vec3::new(5.0, 2.0, 0.5));
        img.set_pixel(2, 0, Vec3::new(1000.0, 900.0, 800.0));
        ReinhardTonemap::default().apply(&mut img);
        for p in img.pixels() {
            assert!(p.min_element() >= 0.0 && p.max_element() <= 1.0, "{:?}", p);
        }
    }

    #[test]
    fn test_hue_is_preserved_before_gamma() {
        let op = ReinhardTonemap {
            gamma: 1.0,
            ..Default::default()
        };
        let mapped = op.map_pixel(Vec3::new(0.2, 0.1, 0.05), 0.5);
        assert!((mapped.x / mapped.y - 2.0).abs() < 1e-4);
        assert!((mapped.y / mapped.z - 2.0).abs() < 1e-4);
    }
}
