//! Mosaic assembly from a grid of tiles

mod assemble;

pub use assemble::{assemble, read_mosaic, Mosaic, MosaicLayout};
