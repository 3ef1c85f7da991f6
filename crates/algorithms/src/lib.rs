//! # Tessera Algorithms
//!
//! Raster composition and terrain shading for Tessera.
//!
//! ## Available Algorithm Categories
//!
//! - **mosaic**: assemble a grid of tiles into one raster
//! - **imagery**: value-range normalization for display
//! - **clip**: crop by geographic bounding box
//! - **terrain**: gradient, hillshade
//! - **pipeline**: fluent chaining and JSON-configured runs

pub mod clip;
pub mod imagery;
mod maybe_rayon;
pub mod mosaic;
pub mod pipeline;
pub mod terrain;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::clip::crop;
    pub use crate::imagery::{normalize, Normalize, NormalizeParams, ValueRange};
    pub use crate::mosaic::{assemble, read_mosaic, Mosaic, MosaicLayout};
    pub use crate::pipeline::{run_pipeline, Operation, PipelineConfig, PipelineState, RasterPipeline};
    pub use crate::terrain::{gradient, hillshade, Hillshade, HillshadeParams};
    pub use tessera_core::prelude::*;
}
