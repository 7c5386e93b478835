use bevy::math::{Vec2, Vec3};
use std::f32::consts::FRAC_PI_2;

use crate::math::to_spherical;

/// Spherical description of where the camera looks from
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewpoint {
    /// Rotation around the vertical axis
    pub theta: f32,
    /// Elevation of the view direction; must not be zero
    pub phi: f32,
    pub rho: f32,
    /// Camera origin in world space
    pub center: Vec3,
}

impl Default for Viewpoint {
    fn default() -> Self {
        Self {
            theta: -std::f32::consts::FRAC_PI_4,
            phi: -std::f32::consts::FRAC_PI_6,
            rho: 1.0,
            // Moved from (2.4, 1.4, -1.0) so the screen center lands on the
            // middle of the default [0, 4]^2 tile
            center: Vec3::new(3.7, 1.4, 0.3),
        }
    }
}

/// Orthographic camera for the isometric landscape view.
///
/// Every ray shares the direction `fwd`; only the origin moves across the
/// image plane. Immutable once built.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrthoCamera {
    pub eye: Vec3,
    pub fwd: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    /// Orthographic zoom per screen axis
    pub scale: Vec2,
}

impl OrthoCamera {
    /// Build the orthonormal basis from spherical angles.
    ///
    /// `fwd.y` must be non-zero (a horizontal view never meets the ground);
    /// this is not checked and yields non-finite projections.
    pub fn from_viewpoint(viewpoint: &Viewpoint, scale: Vec2) -> Self {
        let fwd = to_spherical(viewpoint.theta, viewpoint.phi, viewpoint.rho).normalize();
        let right = to_spherical(viewpoint.theta + FRAC_PI_2, 0.0, viewpoint.rho).normalize();
        let up = fwd.cross(right).normalize();

        Self {
            eye: viewpoint.center,
            fwd,
            right,
            up,
            scale,
        }
    }

    /// Intersect the ray through image plane position (u, v) with the ground plane y = 0
    pub fn project(&self, u: f32, v: f32) -> Vec3 {
        let ro = self.eye + self.right * (u / self.scale.x) + self.up * (v / self.scale.y);
        let rd = self.fwd;

        let t = -ro.y / rd.y;
        ro + rd * t
    }

    /// Screen-space v of the top of a column of height `h` standing on the
    /// ground point seen at (u, v).
    ///
    /// First-order estimate along the vertical screen axis only. The radicand
    /// is left unclamped, so rounding can produce NaN for a camera looking
    /// straight down.
    pub fn unproject(&self, _u: f32, v: f32, h: f32) -> f32 {
        let cos_theta = -self.fwd.y / self.fwd.length();
        let dx = h * cos_theta;
        let da = (h * h - dx * dx).sqrt();
        v + da * self.scale.y
    }
}
