//! I/O at the raster codec boundary
//!
//! Rasters are decoded from and encoded to TIFF through the `tiff` crate.
//! Georeferencing tags are optional: an extent is read back when present
//! and written only when the caller supplies one.

mod native;

pub use native::{
    read_geotiff, read_geotiff_from_buffer, read_geotiff_with_extent, write_geotiff,
    write_geotiff_to_buffer, GeoTiffOptions, SampleFormat,
};
