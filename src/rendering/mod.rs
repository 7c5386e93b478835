/// Rendering for the isometric voxel landscape
///
/// Orthographic camera, per-column terrain rasterization and HDR tonemapping.

pub mod isometric_projection;
pub mod isometric_voxel_renderer;
pub mod tonemap;

pub use isometric_projection::*;
pub use isometric_voxel_renderer::*;
pub use tonemap::*;
