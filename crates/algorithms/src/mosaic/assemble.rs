//! Mosaic assembly
//!
//! Arranges a flat, row-major sequence of tiles into one raster. Tiles are
//! only placed side by side; nothing is resampled.

use ndarray::{concatenate, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tessera_core::io::read_geotiff;
use tessera_core::raster::{Raster, RasterElement};
use tessera_core::{Algorithm, Error, Result};
use tracing::debug;

/// Arrangement of tiles in a mosaic, read row-major: the first `tile_cols`
/// tiles form the top tile-row, the next `tile_cols` the second, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MosaicLayout {
    pub tile_rows: usize,
    pub tile_cols: usize,
}

impl MosaicLayout {
    pub fn new(tile_rows: usize, tile_cols: usize) -> Self {
        Self {
            tile_rows,
            tile_cols,
        }
    }

    /// Number of tiles the layout expects
    pub fn tile_count(&self) -> Result<usize> {
        self.tile_rows.checked_mul(self.tile_cols).ok_or_else(|| {
            mismatch(format!(
                "layout {}x{} has too many tiles",
                self.tile_rows, self.tile_cols
            ))
        })
    }

    /// Check that `supplied` tiles fill a non-empty layout exactly
    pub fn check_tile_count(&self, supplied: usize) -> Result<()> {
        if self.tile_rows == 0 || self.tile_cols == 0 {
            return Err(mismatch(format!(
                "layout {}x{} has no tiles",
                self.tile_rows, self.tile_cols
            )));
        }

        let expected = self.tile_count()?;
        if supplied != expected {
            return Err(mismatch(format!(
                "{} tiles supplied for a {}x{} layout ({} expected)",
                supplied, self.tile_rows, self.tile_cols, expected
            )));
        }
        Ok(())
    }
}

impl Default for MosaicLayout {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

/// Mosaic algorithm
#[derive(Debug, Clone, Default)]
pub struct Mosaic;

impl Algorithm for Mosaic {
    type Input = Vec<Raster<f64>>;
    type Output = Raster<f64>;
    type Params = MosaicLayout;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Mosaic"
    }

    fn description(&self) -> &'static str {
        "Assemble a grid of raster tiles into a single raster"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        assemble(&input, params)
    }
}

fn mismatch(reason: String) -> Error {
    Error::MosaicShapeMismatch { reason }
}

/// Check tile count and that tiles line up along both axes.
fn validate_layout<T: RasterElement>(tiles: &[Raster<T>], layout: MosaicLayout) -> Result<()> {
    layout.check_tile_count(tiles.len())?;

    for tr in 0..layout.tile_rows {
        for tc in 0..layout.tile_cols {
            let idx = tr * layout.tile_cols + tc;
            let (rows, cols) = tiles[idx].shape();

            // Height is fixed by the first tile of the tile-row
            let height = tiles[tr * layout.tile_cols].rows();
            if rows != height {
                return Err(mismatch(format!(
                    "tile {} at ({}, {}) has {} rows, tile-row {} has {}",
                    idx, tr, tc, rows, tr, height
                )));
            }

            // Width is fixed by the top tile of the tile-column
            let width = tiles[tc].cols();
            if cols != width {
                return Err(mismatch(format!(
                    "tile {} at ({}, {}) has {} columns, tile-column {} has {}",
                    idx, tr, tc, cols, tc, width
                )));
            }
        }
    }

    Ok(())
}

/// Assemble `tiles` into a single raster following `layout`.
///
/// Tiles in a tile-row are joined left to right, then the tile-rows are
/// stacked top to bottom. The result has the summed height of one tile per
/// tile-row and the summed width of one tile per tile-column.
///
/// # Errors
/// [`Error::MosaicShapeMismatch`] when the tile count differs from
/// `layout.tile_rows * layout.tile_cols`, when the layout is empty, or when
/// tiles sharing a tile-row differ in height or tiles sharing a tile-column
/// differ in width.
pub fn assemble<T: RasterElement>(tiles: &[Raster<T>], layout: MosaicLayout) -> Result<Raster<T>> {
    validate_layout(tiles, layout)?;

    let tile_rows: Vec<Array2<T>> = tiles
        .chunks(layout.tile_cols)
        .map(|row| {
            let views: Vec<_> = row.iter().map(|t| t.view()).collect();
            concatenate(Axis(1), &views).map_err(|e| mismatch(e.to_string()))
        })
        .collect::<Result<_>>()?;

    let views: Vec<_> = tile_rows.iter().map(|r| r.view()).collect();
    let mosaic = concatenate(Axis(0), &views).map_err(|e| mismatch(e.to_string()))?;

    debug!(
        tile_rows = layout.tile_rows,
        tile_cols = layout.tile_cols,
        rows = mosaic.nrows(),
        cols = mosaic.ncols(),
        "assembled mosaic"
    );

    Ok(Raster::from_array(mosaic))
}

/// Read each tile from disk and assemble them.
///
/// The tile count is checked before any file is opened.
pub fn read_mosaic<T, P>(paths: &[P], layout: MosaicLayout) -> Result<Raster<T>>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    layout.check_tile_count(paths.len())?;

    let tiles = paths
        .iter()
        .map(read_geotiff::<T, _>)
        .collect::<Result<Vec<_>>>()?;

    assemble(&tiles, layout)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(rows: usize, cols: usize, value: f64) -> Raster<f64> {
        Raster::filled(rows, cols, value)
    }

    #[test]
    fn test_single_tile_is_identity() {
        let t = Raster::from_fn(7, 5, |r, c| (r * 5 + c) as f64);
        let result = assemble(&[t.clone()], MosaicLayout::default()).unwrap();
        assert_eq!(result, t);
    }

    #[test]
    fn test_shape_law() {
        let tiles: Vec<_> = (0..6).map(|i| tile(4, 3, i as f64)).collect();
        let result = assemble(&tiles, MosaicLayout::new(2, 3)).unwrap();
        assert_eq!(result.shape(), (8, 9));
    }

    #[test]
    fn test_row_major_placement() {
        let tiles: Vec<_> = (0..4).map(|i| tile(2, 2, i as f64)).collect();
        let result = assemble(&tiles, MosaicLayout::new(2, 2)).unwrap();

        assert_eq!(result.get(0, 0).unwrap(), 0.0);
        assert_eq!(result.get(0, 3).unwrap(), 1.0);
        assert_eq!(result.get(3, 0).unwrap(), 2.0);
        assert_eq!(result.get(3, 3).unwrap(), 3.0);
    }

    #[test]
    fn test_uneven_tiles_that_align() {
        // Heights vary per tile-row, widths per tile-column
        let tiles = vec![tile(2, 3, 0.0), tile(2, 1, 1.0), tile(5, 3, 2.0), tile(5, 1, 3.0)];
        let result = assemble(&tiles, MosaicLayout::new(2, 2)).unwrap();
        assert_eq!(result.shape(), (7, 4));
        assert_eq!(result.get(6, 3).unwrap(), 3.0);
    }

    #[test]
    fn test_count_mismatch() {
        let tiles: Vec<_> = (0..3).map(|i| tile(2, 2, i as f64)).collect();
        assert!(matches!(
            assemble(&tiles, MosaicLayout::new(2, 2)),
            Err(Error::MosaicShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_height_mismatch_in_row() {
        let tiles = vec![tile(2, 2, 0.0), tile(3, 2, 1.0)];
        assert!(matches!(
            assemble(&tiles, MosaicLayout::new(1, 2)),
            Err(Error::MosaicShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_width_mismatch_in_column() {
        let tiles = vec![tile(2, 2, 0.0), tile(2, 4, 1.0)];
        assert!(matches!(
            assemble(&tiles, MosaicLayout::new(2, 1)),
            Err(Error::MosaicShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_empty_layout() {
        let tiles: Vec<Raster<u8>> = Vec::new();
        assert!(matches!(
            assemble(&tiles, MosaicLayout::new(0, 3)),
            Err(Error::MosaicShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_oversized_layout_is_rejected() {
        let tiles: Vec<Raster<f64>> = Vec::new();
        let layout = MosaicLayout::new(1 << 40, 1 << 40);

        assert!(matches!(layout.tile_count(), Err(Error::MosaicShapeMismatch { .. })));
        assert!(matches!(
            assemble(&tiles, layout),
            Err(Error::MosaicShapeMismatch { .. })
        ));
        let result: Result<Raster<f64>> = read_mosaic(&["a.tif"], MosaicLayout::new(usize::MAX, 2));
        assert!(matches!(result, Err(Error::MosaicShapeMismatch { .. })));
    }

    #[test]
    fn test_read_mosaic_checks_count_first() {
        let paths = ["does-not-exist.tif"];
        let result: Result<Raster<f64>> = read_mosaic(&paths, MosaicLayout::new(2, 2));
        assert!(matches!(result, Err(Error::MosaicShapeMismatch { .. })));
    }

    #[test]
    fn test_algorithm_trait() {
        let tiles: Vec<_> = (0..2).map(|i| tile(3, 3, i as f64)).collect();
        let result = Mosaic.execute(tiles, MosaicLayout::new(1, 2)).unwrap();
        assert_eq!(result.shape(), (3, 6));
    }
}
