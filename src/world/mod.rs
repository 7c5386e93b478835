/// Terrain representation for the landscape renderer
///
/// Height sources map normalized ground-plane coordinates to heights in [0, 1].

pub mod heightmap;

pub use heightmap::*;
