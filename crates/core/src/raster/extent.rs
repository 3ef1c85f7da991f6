//! Geographic extent and its mapping onto pixel space

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Real-world bounding box covered by a raster, `(x_min, y_min, x_max, y_max)`.
///
/// The extent is anchored at the raster's first row and column:
/// `x_min` is the edge that coincides with column 0 and `y_min` the edge
/// that coincides with row 0. For north-up imagery that makes `y_min` the
/// northern edge, so an image spanning 21°S..23°S is described as
/// `GeoExtent::new(-48.0, -21.0, -46.0, -23.0)`.
///
/// A raster never stores its extent; every geography-aware operation takes
/// one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoExtent {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

/// Integer pixel window `[row_start, row_end) × [col_start, col_end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWindow {
    pub row_start: usize,
    pub row_end: usize,
    pub col_start: usize,
    pub col_end: usize,
}

impl PixelWindow {
    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.row_end - self.row_start, self.col_end - self.col_start)
    }

    /// Whether the window selects no cells
    pub fn is_empty(&self) -> bool {
        self.row_start == self.row_end || self.col_start == self.col_end
    }
}

impl GeoExtent {
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Extent of a `rows × cols` raster whose upper-left corner sits at
    /// `(origin_x, origin_y)` with the given cell sizes.
    ///
    /// `pixel_height` is usually negative for north-up imagery.
    pub fn from_origin(
        origin_x: f64,
        origin_y: f64,
        pixel_width: f64,
        pixel_height: f64,
        rows: usize,
        cols: usize,
    ) -> Self {
        Self {
            x_min: origin_x,
            y_min: origin_y,
            x_max: origin_x + cols as f64 * pixel_width,
            y_max: origin_y + rows as f64 * pixel_height,
        }
    }

    /// Geographic width (always positive)
    pub fn width(&self) -> f64 {
        (self.x_max - self.x_min).abs()
    }

    /// Geographic height (always positive)
    pub fn height(&self) -> f64 {
        (self.y_max - self.y_min).abs()
    }

    /// Reject extents that cannot be mapped onto pixels.
    pub fn validate(&self) -> Result<()> {
        let coords = [self.x_min, self.y_min, self.x_max, self.y_max];
        if coords.iter().any(|c| !c.is_finite()) {
            return Err(Error::InvalidParameter {
                name: "extent",
                value: format!("{:?}", coords),
                reason: "coordinates must be finite".into(),
            });
        }
        if self.width() == 0.0 || self.height() == 0.0 {
            return Err(Error::InvalidParameter {
                name: "extent",
                value: format!("{:?}", coords),
                reason: "extent must have non-zero width and height".into(),
            });
        }
        Ok(())
    }

    /// Pixels per geographic unit along (x, y) for a `rows × cols` raster
    /// covering this extent.
    pub fn pixel_density(&self, rows: usize, cols: usize) -> Result<(f64, f64)> {
        self.validate()?;
        Ok((cols as f64 / self.width(), rows as f64 / self.height()))
    }

    /// Map `bbox` onto a pixel window of a `rows × cols` raster covering
    /// this extent.
    ///
    /// Edge offsets are measured as absolute distances from the extent's
    /// anchor edges and truncated toward zero. The window is clipped to the
    /// raster; a window whose end precedes its start is empty along that
    /// axis. Returns the window and whether clipping changed it.
    pub fn pixel_window(
        &self,
        bbox: &GeoExtent,
        rows: usize,
        cols: usize,
    ) -> Result<(PixelWindow, bool)> {
        let (px_per_x, px_per_y) = self.pixel_density(rows, cols)?;
        bbox.validate_finite()?;

        let offset = |edge: f64, anchor: f64, density: f64| (edge - anchor).abs() * density;

        let x_min_px = offset(bbox.x_min, self.x_min, px_per_x);
        let x_max_px = offset(bbox.x_max, self.x_min, px_per_x);
        let y_min_px = offset(bbox.y_min, self.y_min, px_per_y);
        let y_max_px = offset(bbox.y_max, self.y_min, px_per_y);

        // `as usize` truncates toward zero and saturates; offsets are never negative.
        let (col_start, col_end, col_clipped) = clip_span(x_min_px as usize, x_max_px as usize, cols);
        let (row_start, row_end, row_clipped) = clip_span(y_min_px as usize, y_max_px as usize, rows);

        Ok((
            PixelWindow {
                row_start,
                row_end,
                col_start,
                col_end,
            },
            col_clipped || row_clipped,
        ))
    }

    fn validate_finite(&self) -> Result<()> {
        let coords = [self.x_min, self.y_min, self.x_max, self.y_max];
        if coords.iter().any(|c| !c.is_finite()) {
            return Err(Error::InvalidParameter {
                name: "bbox",
                value: format!("{:?}", coords),
                reason: "coordinates must be finite".into(),
            });
        }
        Ok(())
    }
}

impl From<(f64, f64, f64, f64)> for GeoExtent {
    fn from((x_min, y_min, x_max, y_max): (f64, f64, f64, f64)) -> Self {
        Self::new(x_min, y_min, x_max, y_max)
    }
}

impl From<[f64; 4]> for GeoExtent {
    fn from(c: [f64; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }
}

/// Clamp `[start, end)` into `[0, len]`, collapsing reversed spans.
fn clip_span(start: usize, end: usize, len: usize) -> (usize, usize, bool) {
    let s = start.min(len);
    let e = end.min(len).max(s);
    (s, e, s != start || e != end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_quadrant_window() {
        let extent = GeoExtent::new(0.0, 0.0, 10.0, 10.0);
        let bbox = GeoExtent::new(0.0, 0.0, 5.0, 5.0);
        let (window, clipped) = extent.pixel_window(&bbox, 100, 100).unwrap();

        assert_eq!(
            window,
            PixelWindow {
                row_start: 0,
                row_end: 50,
                col_start: 0,
                col_end: 50
            }
        );
        assert_eq!(window.shape(), (50, 50));
        assert!(!clipped);
    }

    #[test]
    fn test_north_anchored_extent() {
        // Rows run from -21 (row 0) down to -23.
        let extent = GeoExtent::new(-48.0, -21.0, -46.0, -23.0);
        let bbox = GeoExtent::new(-47.0, -21.5, -46.5, -22.0);
        let (window, _) = extent.pixel_window(&bbox, 200, 200).unwrap();

        assert_eq!((window.row_start, window.row_end), (50, 100));
        assert_eq!((window.col_start, window.col_end), (100, 150));
    }

    #[test]
    fn test_window_is_clipped() {
        let extent = GeoExtent::new(0.0, 0.0, 10.0, 10.0);
        let bbox = GeoExtent::new(5.0, 5.0, 20.0, 30.0);
        let (window, clipped) = extent.pixel_window(&bbox, 10, 10).unwrap();

        assert_eq!(window.shape(), (5, 5));
        assert!(clipped);
    }

    #[test]
    fn test_reversed_window_is_empty() {
        let extent = GeoExtent::new(0.0, 0.0, 10.0, 10.0);
        let bbox = GeoExtent::new(8.0, 0.0, 2.0, 10.0);
        let (window, _) = extent.pixel_window(&bbox, 10, 10).unwrap();

        assert!(window.is_empty());
        assert_eq!(window.shape(), (10, 0));
    }

    #[test]
    fn test_degenerate_extent() {
        let extent = GeoExtent::new(1.0, 0.0, 1.0, 10.0);
        assert!(matches!(
            extent.pixel_density(10, 10),
            Err(Error::InvalidParameter { name: "extent", .. })
        ));
    }

    #[test]
    fn test_from_origin() {
        let extent = GeoExtent::from_origin(100.0, 200.0, 10.0, -10.0, 20, 30);
        assert_relative_eq!(extent.x_max, 400.0);
        assert_relative_eq!(extent.y_max, 0.0);
        assert_relative_eq!(extent.width(), 300.0);
        assert_relative_eq!(extent.height(), 200.0);
    }
}
