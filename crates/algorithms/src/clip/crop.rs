//! Crop a raster to a geographic bounding box
//!
//! The raster carries no georeferencing of its own, so the caller passes the
//! extent the raster covers alongside the bounding box to keep. Windows that
//! reach past the raster are clipped to it rather than rejected.

use tessera_core::raster::{GeoExtent, PixelWindow, Raster, RasterElement};
use tessera_core::Result;
use tracing::{debug, warn};

/// Pixel window of a `rows × cols` raster covering `extent` that `bbox`
/// selects, clipped to the raster.
pub fn crop_window(extent: &GeoExtent, bbox: &GeoExtent, rows: usize, cols: usize) -> Result<PixelWindow> {
    let (window, clipped) = extent.pixel_window(bbox, rows, cols)?;
    if clipped {
        warn!(
            ?bbox,
            ?extent,
            rows = window.row_end - window.row_start,
            cols = window.col_end - window.col_start,
            "crop window clipped to raster bounds"
        );
    }
    Ok(window)
}

/// Crop `raster` to `bbox`.
///
/// `extent` is the geographic coverage of the whole raster; both use
/// `(x_min, y_min, x_max, y_max)` anchored at column 0 / row 0 (see
/// [`GeoExtent`]). Edge offsets are truncated toward zero. The returned
/// raster covers `bbox`; tracking that is up to the caller.
///
/// # Errors
/// [`tessera_core::Error::InvalidParameter`] when `extent` has zero width
/// or height or either box has non-finite coordinates.
pub fn crop<T: RasterElement>(raster: &Raster<T>, extent: &GeoExtent, bbox: &GeoExtent) -> Result<Raster<T>> {
    let (rows, cols) = raster.shape();
    let window = crop_window(extent, bbox, rows, cols)?;

    debug!(
        row_start = window.row_start,
        row_end = window.row_end,
        col_start = window.col_start,
        col_end = window.col_end,
        "cropping raster"
    );

    raster.window(&window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::Error;

    fn indexed(rows: usize, cols: usize) -> Raster<f64> {
        Raster::from_fn(rows, cols, |r, c| (r * cols + c) as f64)
    }

    #[test]
    fn test_top_left_quadrant() {
        let raster = indexed(100, 100);
        let extent = GeoExtent::new(0.0, 0.0, 10.0, 10.0);
        let bbox = GeoExtent::new(0.0, 0.0, 5.0, 5.0);

        let result = crop(&raster, &extent, &bbox).unwrap();
        assert_eq!(result.shape(), (50, 50));
        for r in 0..50 {
            for c in 0..50 {
                assert_eq!(result.get(r, c).unwrap(), raster.get(r, c).unwrap());
            }
        }
    }

    #[test]
    fn test_full_extent_is_identity() {
        let raster = indexed(30, 40);
        let extent = GeoExtent::new(-48.0, -21.0, -46.0, -23.0);

        let result = crop(&raster, &extent, &extent).unwrap();
        assert_eq!(result, raster);
    }

    #[test]
    fn test_fractional_offsets_truncate() {
        let raster = indexed(10, 10);
        let extent = GeoExtent::new(0.0, 0.0, 10.0, 10.0);
        let bbox = GeoExtent::new(1.9, 2.5, 6.99, 7.2);

        let result = crop(&raster, &extent, &bbox).unwrap();
        assert_eq!(result.shape(), (5, 5));
        assert_eq!(result.get(0, 0).unwrap(), 21.0);
    }

    #[test]
    fn test_outside_window_is_clipped() {
        let raster = indexed(10, 10);
        let extent = GeoExtent::new(0.0, 0.0, 10.0, 10.0);
        let bbox = GeoExtent::new(8.0, 8.0, 25.0, 25.0);

        let result = crop(&raster, &extent, &bbox).unwrap();
        assert_eq!(result.shape(), (2, 2));
        assert_eq!(result.get(1, 1).unwrap(), 99.0);
    }

    #[test]
    fn test_window_past_raster_is_empty() {
        let raster = indexed(10, 10);
        let extent = GeoExtent::new(0.0, 0.0, 10.0, 10.0);
        let bbox = GeoExtent::new(20.0, 20.0, 30.0, 30.0);

        let result = crop(&raster, &extent, &bbox).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_zero_width_extent() {
        let raster = indexed(10, 10);
        let extent = GeoExtent::new(5.0, 0.0, 5.0, 10.0);
        let bbox = GeoExtent::new(0.0, 0.0, 5.0, 5.0);

        assert!(matches!(
            crop(&raster, &extent, &bbox),
            Err(Error::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_generic_over_sample_type() {
        let raster: Raster<u8> = Raster::from_fn(4, 4, |r, c| (r * 4 + c) as u8);
        let extent = GeoExtent::new(0.0, 0.0, 4.0, 4.0);
        let bbox = GeoExtent::new(2.0, 2.0, 4.0, 4.0);

        let result = crop(&raster, &extent, &bbox).unwrap();
        assert_eq!(result.data().as_slice().unwrap(), &[10, 11, 14, 15]);
    }
}
