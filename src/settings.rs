use bevy::math::{Vec2, Vec3};
use bevy::prelude::Resource;
use std::path::PathBuf;

use crate::error::RenderError;
use crate::lighting::SceneLight;
use crate::rendering::{LandscapeScene, OrthoCamera, ReinhardTonemap, TileBounds, Viewpoint};
use crate::world::{GridResolution, HeightmapSource, ImageHeightmap, NoiseParams};

/// Heightmap argument selecting [`HeightmapConfig::GaussianBump`]
pub const BUMP_KEYWORD: &str = "bump";

/// Which terrain to render
#[derive(Clone, Debug, PartialEq)]
pub enum HeightmapConfig {
    Procedural {
        noise: NoiseParams,
        grid: GridResolution,
    },
    Image {
        path: PathBuf,
    },
    GaussianBump {
        grid: GridResolution,
    },
}

impl Default for HeightmapConfig {
    fn default() -> Self {
        HeightmapConfig::Procedural {
            noise: NoiseParams::default(),
            grid: GridResolution::default(),
        }
    }
}

impl HeightmapConfig {
    /// Resolve into a sampler, loading the image from disk if needed
    pub fn build(&self) -> Result<HeightmapSource, RenderError> {
        Ok(match self {
            HeightmapConfig::Procedural { noise, grid } => HeightmapSource::procedural(noise, *grid),
            HeightmapConfig::Image { path } => HeightmapSource::Image(ImageHeightmap::load(path)?),
            HeightmapConfig::GaussianBump { grid } => HeightmapSource::GaussianBump { grid: *grid },
        })
    }
}

/// Everything a single render run needs
#[derive(Resource, Clone, Debug)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    pub output: PathBuf,
    pub viewpoint: Viewpoint,
    /// Orthographic zoom (scale_x, scale_y)
    pub scale: Vec2,
    /// World-space height of a heightmap value of 1.0
    pub height_scale: f32,
    pub tile: TileBounds,
    pub heightmap: HeightmapConfig,
    pub light: SceneLight,
    pub sky_color: Vec3,
    /// World-space offset for finite-difference normals
    pub normal_epsilon: f32,
    pub tonemap: ReinhardTonemap,
    /// Render columns on the rayon pool
    pub parallel: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 500,
            height: 500,
            output: PathBuf::from("result.png"),
            viewpoint: Viewpoint::default(),
            scale: Vec2::splat(0.5),
            height_scale: 0.8,
            tile: TileBounds::default(),
            heightmap: HeightmapConfig::default(),
            light: SceneLight::default(),
            sky_color: Vec3::ZERO,
            normal_epsilon: 0.01,
            tonemap: ReinhardTonemap::default(),
            parallel: true,
        }
    }
}

impl RenderSettings {
    /// Parse positional `[scale_x] [scale_y] [heightmap]`; missing values keep defaults.
    /// The heightmap is an image path, or `bump` for the built-in gaussian hill.
    pub fn from_args<I>(args: I) -> Result<Self, RenderError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut settings = Self::default();
        let mut args = args.into_iter();

        if let Some(arg) = args.next() {
            settings.scale.x = parse_scale("scale_x", &arg)?;
        }
        if let Some(arg) = args.next() {
            settings.scale.y = parse_scale("scale_y", &arg)?;
        }
        if let Some(arg) = args.next() {
            settings.heightmap = if arg == BUMP_KEYWORD {
                HeightmapConfig::GaussianBump {
                    grid: GridResolution::default(),
                }
            } else {
                HeightmapConfig::Image {
                    path: PathBuf::from(arg),
                }
            };
        }
        if let Some(extra) = args.next() {
            return Err(RenderError::InvalidArgument(format!(
                "unexpected argument '{}'",
                extra
            )));
        }

        Ok(settings)
    }

    pub fn camera(&self) -> OrthoCamera {
        OrthoCamera::from_viewpoint(&self.viewpoint, self.scale)
    }

    /// Assemble the read-only state shared by every column
    pub fn build_scene(&self) -> Result<LandscapeScene, RenderError> {
        Ok(LandscapeScene {
            camera: self.camera(),
            heightmap: self.heightmap.build()?,
            tile: self.tile,
            height_scale: self.height_scale,
            light: self.light,
            sky_color: self.sky_color,
            normal_epsilon: self.normal_epsilon,
        })
    }
}

fn parse_scale(name: &str, arg: &str) -> Result<f32, RenderError> {
    let value: f32 = arg
        .parse()
        .map_err(|_| RenderError::InvalidArgument(format!("{} '{}' is not a number", name, arg)))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(RenderError::InvalidArgument(format!(
            "{} must be a positive number, got {}",
            name, value
        )));
    }
    Ok(value)
}
