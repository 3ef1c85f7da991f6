//! Display preparation for raster values
//!
//! - Normalize: linear rescaling of sample values into a display range

mod normalize;

pub use normalize::{normalize, resolve_source_range, Normalize, NormalizeParams, ValueRange};
