//! Terrain analysis algorithms
//!
//! Algorithms for analyzing Digital Elevation Models (DEMs):
//! - Gradient: per-cell first derivatives along both grid axes
//! - Hillshade: shaded relief visualization

mod gradient;
mod hillshade;

pub use gradient::{gradient, Gradient};
pub use hillshade::{hillshade, Hillshade, HillshadeParams};
