use bevy::math::Vec3;

/// Single point light illuminating the terrain
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneLight {
    pub position: Vec3,
    /// Linear radiance, not limited to [0, 1]
    pub color: Vec3,
}

impl Default for SceneLight {
    fn default() -> Self {
        Self {
            position: Vec3::new(2.0, 3.0, 2.0),
            color: Vec3::new(12.0, 11.0, 9.5),
        }
    }
}

impl SceneLight {
    /// Lambertian response with inverse-square falloff
    pub fn shade(&self, point: Vec3, normal: Vec3) -> Vec3 {
        let to_light = self.position - point;
        let dist_sq = to_light.length_squared();
        let intensity = to_light.normalize().dot(normal).max(0.0) / dist_sq;
        self.color * intensity
    }
}
