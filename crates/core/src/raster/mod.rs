//! Raster data structures and operations

mod element;
mod extent;
mod grid;

pub use element::RasterElement;
pub use extent::{GeoExtent, PixelWindow};
pub use grid::{Raster, RasterStatistics};
