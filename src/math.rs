use bevy::math::Vec3;

/// Rec. 709 luminance weights
pub const LUMINANCE_WEIGHTS: Vec3 = Vec3::new(0.2126, 0.7152, 0.0722);

/// Convert spherical angles to a cartesian direction.
/// `theta` rotates around the Y axis, `phi` is the elevation above the XZ plane.
pub fn to_spherical(theta: f32, phi: f32, rho: f32) -> Vec3 {
    let r = rho * phi.cos();
    Vec3::new(r * theta.sin(), rho * phi.sin(), r * theta.cos())
}

/// Relative luminance of a linear RGB color
#[inline]
pub fn luminance(color: Vec3) -> f32 {
    color.dot(LUMINANCE_WEIGHTS)
}

/// Map a pixel index to normalized device coordinates in [-1, 1]
#[inline]
pub fn ndc(pixel: i32, extent: u32) -> f32 {
    (pixel as f32 / extent as f32) * 2.0 - 1.0
}

/// Map normalized device coordinates back to a pixel index (truncating).
/// NaN maps to 0.
#[inline]
pub fn ndc_to_pixel(ndc: f32, extent: u32) -> i32 {
    ((ndc + 1.0) * 0.5 * extent as f32) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

    #[test]
    fn test_spherical_axes() {
        let forward = to_spherical(0.0, 0.0, 1.0);
        assert!((forward - Vec3::Z).length() < 1e-6);

        let right = to_spherical(FRAC_PI_2, 0.0, 1.0);
        assert!((right - Vec3::X).length() < 1e-6);

        let down = to_spherical(0.0, -FRAC_PI_2, 2.0);
        assert!((down - Vec3::new(0.0, -2.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_spherical_keeps_radius() {
        let v = to_spherical(-FRAC_PI_4, 0.3, 3.5);
        assert!((v.length() - 3.5).abs() < 1e-5);
    }

    #[test]
    fn test_luminance_of_white_is_one() {
        assert!((luminance(Vec3::ONE) - 1.0).abs() < 1e-6);
        assert_eq!(luminance(Vec3::ZERO), 0.0);
    }

    #[test]
    fn test_ndc_mapping() {
        assert_eq!(ndc(0, 100), -1.0);
        assert_eq!(ndc(50, 100), 0.0);
        assert_eq!(ndc_to_pixel(-1.0, 100), 0);
        assert_eq!(ndc_to_pixel(0.0, 100), 50);
        assert_eq!(ndc_to_pixel(f32::NAN, 100), 0);
    }
}
