use bevy::prelude::*;
use rayon::prelude::*;

use crate::error::RenderError;
use crate::hdr_image::HdrImage;
use crate::lighting::SceneLight;
use crate::math::{ndc, ndc_to_pixel};
use crate::rendering::OrthoCamera;
use crate::settings::RenderSettings;
use crate::world::HeightmapSource;

/// Ground-plane rectangle covered by one heightmap tile, in world x/z
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileBounds {
    /// (min x, min z)
    pub min: Vec2,
    /// (max x, max z)
    pub max: Vec2,
}

impl Default for TileBounds {
    fn default() -> Self {
        Self {
            min: Vec2::ZERO,
            max: Vec2::splat(4.0),
        }
    }
}

impl TileBounds {
    /// True when a ground point falls off the tile. NaN coordinates count as inside.
    #[inline]
    pub fn is_outside(&self, p: Vec3) -> bool {
        p.x < self.min.x || p.x > self.max.x || p.z < self.min.y || p.z > self.max.y
    }

    /// Map world x/z into the heightmap's [0, 1] sampling domain
    #[inline]
    pub fn normalize(&self, x: f32, z: f32) -> Vec2 {
        (Vec2::new(x, z) - self.min) / (self.max - self.min)
    }
}

/// What a single screen pixel resolves to
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PixelSample {
    /// Ray misses the tile
    Sky,
    /// Terrain column rising from this pixel up to `top_row`
    Column {
        ground: Vec3,
        height: f32,
        top_row: i32,
        color: Vec3,
    },
}

/// Read-only state shared by every column of a frame
#[derive(Clone)]
pub struct LandscapeScene {
    pub camera: OrthoCamera,
    pub heightmap: HeightmapSource,
    pub tile: TileBounds,
    pub height_scale: f32,
    pub light: SceneLight,
    pub sky_color: Vec3,
    pub normal_epsilon: f32,
}

impl LandscapeScene {
    /// World-space terrain height at ground position (x, z)
    pub fn terrain_height(&self, x: f32, z: f32) -> f32 {
        let n = self.tile.normalize(x, z);
        self.heightmap.sample(n.x, n.y) * self.height_scale
    }

    /// Central-difference surface normal
    pub fn terrain_normal(&self, x: f32, z: f32) -> Vec3 {
        let e = self.normal_epsilon;
        let dx = self.terrain_height(x - e, z) - self.terrain_height(x + e, z);
        let dz = self.terrain_height(x, z - e) - self.terrain_height(x, z + e);
        Vec3::new(dx, 2.0 * e, dz).normalize()
    }

    /// Project pixel (x, y) to the ground, then shade and size its column
    pub fn sample_pixel(&self, x: i32, y: i32, width: u32, height: u32) -> PixelSample {
        let u = ndc(x, width);
        let v = ndc(y, height);

        let p = self.camera.project(u, v);
        if self.tile.is_outside(p) {
            return PixelSample::Sky;
        }

        let n = self.tile.normalize(p.x, p.z);
        let raw = self.heightmap.sample(n.x, n.y);
        let h = raw * self.height_scale;

        let v_top = self.camera.unproject(u, v, h);
        let top_row = ndc_to_pixel(v_top, height);

        let normal = self.terrain_normal(p.x, p.z);
        let surface = Vec3::new(p.x, h, p.z);
        // Fade towards black at ground level
        let color = self.light.shade(surface, normal) * raw;

        PixelSample::Column {
            ground: p,
            height: h,
            top_row,
            color,
        }
    }

    /// Walk one screen column from the top row down, emitting inclusive
    /// vertical runs `(y0, y1, color)`. Runs started lower on screen are
    /// emitted later and overwrite earlier ones.
    pub fn trace_column(&self, x: u32, width: u32, height: u32, mut fill: impl FnMut(i32, i32, Vec3)) {
        for y in (0..height as i32).rev() {
            match self.sample_pixel(x as i32, y, width, height) {
                PixelSample::Sky => fill(y, y, self.sky_color),
                PixelSample::Column { top_row, color, .. } => {
                    if top_row >= y {
                        fill(y, top_row, color);
                    }
                }
            }
        }
    }

    /// Render column `x` into its own bottom-up pixel buffer
    pub fn render_column(&self, x: u32, width: u32, height: u32) -> Vec<Vec3> {
        let mut column = vec![Vec3::ZERO; height as usize];
        self.trace_column(x, width, height, |y0, y1, color| {
            fill_span(&mut column, y0, y1, color)
        });
        column
    }

    /// Render every column of `image`.
    ///
    /// Columns write disjoint pixels, so the parallel path renders them into
    /// private buffers and copies them in after the join.
    pub fn render_frame(&self, image: &mut HdrImage, parallel: bool) {
        let (width, height) = (image.width(), image.height());

        if parallel {
            let columns: Vec<Vec<Vec3>> = (0..width)
                .into_par_iter()
                .map(|x| self.render_column(x, width, height))
                .collect();
            for (x, column) in columns.iter().enumerate() {
                image.write_column(x as u32, column);
            }
        } else {
            for x in 0..width {
                self.trace_column(x, width, height, |y0, y1, color| {
                    image.set_line(x, y0, y1, color)
                });
            }
        }
    }
}

/// Fill `column[y0..=y1]`, clamped to the column
fn fill_span(column: &mut [Vec3], y0: i32, y1: i32, color: Vec3) {
    let y0 = y0.max(0);
    let y1 = y1.min(column.len() as i32 - 1);
    for y in y0..=y1 {
        column[y as usize] = color;
    }
}

/// Render, tonemap and save one frame as described by `settings`
pub fn run_render(settings: &RenderSettings) -> Result<(), RenderError> {
    let scene = settings.build_scene()?;
    info!(
        "Rendering {}x{} landscape from {}",
        settings.width,
        settings.height,
        scene.heightmap.describe()
    );
    debug!(
        "Camera eye {:?}, forward {:?}, scale {:?}",
        scene.camera.eye, scene.camera.fwd, scene.camera.scale
    );
    if scene.camera.fwd.y == 0.0 {
        warn!("View direction is horizontal; every pixel will be undefined");
    }

    let mut image = HdrImage::new(settings.width, settings.height);
    scene.render_frame(&mut image, settings.parallel);

    let lum_avg = settings.tonemap.apply(&mut image);
    debug!("Tonemapped with log-average luminance {:.5}", lum_avg);

    image.save(&settings.output)?;
    info!("Result saved as {}", settings.output.display());
    Ok(())
}

/// Plugin that renders a single landscape frame at startup
pub struct LandscapePlugin {
    pub settings: RenderSettings,
}

impl Plugin for LandscapePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.settings.clone())
            .add_systems(Startup, render_landscape);
    }
}

fn render_landscape(settings: Res<RenderSettings>, mut exit: EventWriter<AppExit>) {
    if let Err(err) = run_render(&settings) {
        error!("Render failed: {}", err);
        exit.write(AppExit::error());
    }
}
