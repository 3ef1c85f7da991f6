//! Discrete elevation gradient
//!
//! Central differences in the interior, one-sided first differences on the
//! border cells. An axis of length 1 has no neighbours and a zero gradient.

use ndarray::{Array2, ArrayView2};
use tessera_core::raster::Raster;

/// Per-cell first derivatives along both grid axes, in elevation units per cell.
#[derive(Debug, Clone)]
pub struct Gradient {
    /// Derivative along the rows axis (downward)
    pub d_row: Array2<f64>,
    /// Derivative along the columns axis (rightward)
    pub d_col: Array2<f64>,
}

/// Derivative of a sample given its neighbours on one axis.
#[inline]
fn axis_diff(prev: Option<f64>, current: f64, next: Option<f64>) -> f64 {
    match (prev, next) {
        (Some(p), Some(n)) => (n - p) / 2.0,
        (None, Some(n)) => n - current,
        (Some(p), None) => current - p,
        (None, None) => 0.0,
    }
}

/// Gradient of the cell at (row, col)
#[inline]
fn cell_gradient(z: &ArrayView2<'_, f64>, row: usize, col: usize) -> (f64, f64) {
    let (rows, cols) = z.dim();
    let e = z[(row, col)];

    let up = (row > 0).then(|| z[(row - 1, col)]);
    let down = (row + 1 < rows).then(|| z[(row + 1, col)]);
    let left = (col > 0).then(|| z[(row, col - 1)]);
    let right = (col + 1 < cols).then(|| z[(row, col + 1)]);

    (axis_diff(up, e, down), axis_diff(left, e, right))
}

/// Compute the gradient of an elevation raster.
///
/// Both derivative arrays have the same shape as the input.
pub fn gradient(dem: &Raster<f64>) -> Gradient {
    let z = dem.view();
    let cells = Array2::from_shape_fn(dem.shape(), |(row, col)| cell_gradient(&z, row, col));

    Gradient {
        d_row: cells.mapv(|(dr, _)| dr),
        d_col: cells.mapv(|(_, dc)| dc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_plane_gradient_is_constant() {
        let dem = Raster::from_fn(6, 7, |r, c| 2.0 * r as f64 + 3.0 * c as f64);
        let g = gradient(&dem);

        for v in g.d_row.iter() {
            assert_relative_eq!(*v, 2.0, epsilon = 1e-12);
        }
        for v in g.d_col.iter() {
            assert_relative_eq!(*v, 3.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_edges_are_one_sided() {
        let dem = Raster::from_rows(&[[1.0, 2.0, 4.0, 8.0]]).unwrap();
        let g = gradient(&dem);

        assert_eq!(g.d_col.as_slice().unwrap(), &[1.0, 1.5, 3.0, 4.0]);
        // Single row: no neighbours along the rows axis
        assert!(g.d_row.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_shape_matches_input() {
        let dem: Raster<f64> = Raster::new(1, 1);
        let g = gradient(&dem);
        assert_eq!(g.d_row.dim(), (1, 1));
        assert_eq!(g.d_col.dim(), (1, 1));
    }
}
