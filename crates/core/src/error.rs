//! Error types for Tessera

use thiserror::Error;

/// Main error type for Tessera operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Grid is not rectangular: {reason}")]
    InvalidShape { reason: String },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Mosaic shape mismatch: {reason}")]
    MosaicShapeMismatch { reason: String },

    #[error("Degenerate value range: [{min}, {max}] has no usable span")]
    DegenerateRange { min: f64, max: f64 },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Raster decode error: {0}")]
    Decode(String),

    #[error("Raster encode error: {0}")]
    Encode(String),
}

/// Result type alias for Tessera operations
pub type Result<T> = std::result::Result<T, Error>;
