//! Main Raster type

use crate::error::{Error, Result};
use crate::raster::{PixelWindow, RasterElement};
use ndarray::{s, Array2, ArrayView2};

/// A rectangular 2D grid of samples.
///
/// `Raster<T>` stores values of type `T` row-major: row indices grow
/// downward, column indices grow rightward. The grid carries no
/// georeferencing; operations that need a geographic extent take a
/// [`GeoExtent`](crate::GeoExtent) argument.
///
/// # Type Parameters
///
/// - `T`: The cell value type, must implement [`RasterElement`]
///
/// # Example
///
/// ```ignore
/// use tessera_core::Raster;
///
/// let mut raster: Raster<f64> = Raster::new(100, 100);
/// raster.set(10, 20, 42.0)?;
/// assert_eq!(raster.get(10, 20)?, 42.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Raster<T: RasterElement> {
    /// Raster data stored in row-major order (row, col)
    data: Array2<T>,
}

impl<T: RasterElement> Raster<T> {
    /// Create a new raster filled with zeros
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            data: Array2::zeros((rows, cols)),
        }
    }

    /// Create a new raster filled with a specific value
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            data: Array2::from_elem((rows, cols), value),
        }
    }

    /// Create a raster from a flat row-major vector
    pub fn from_vec(data: Vec<T>, rows: usize, cols: usize) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }

        let array = Array2::from_shape_vec((rows, cols), data).map_err(|_| {
            Error::InvalidDimensions {
                width: cols,
                height: rows,
            }
        })?;

        Ok(Self { data: array })
    }

    /// Create a raster from nested rows.
    ///
    /// Fails with [`Error::InvalidShape`] if any row differs in length from
    /// the first one.
    pub fn from_rows<R: AsRef<[T]>>(rows: &[R]) -> Result<Self> {
        let cols = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * cols);

        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(Error::InvalidShape {
                    reason: format!("row {} has {} columns, expected {}", i, row.len(), cols),
                });
            }
            data.extend_from_slice(row);
        }

        Self::from_vec(data, rows.len(), cols)
    }

    /// Create a raster from an ndarray
    pub fn from_array(data: Array2<T>) -> Self {
        Self { data }
    }

    /// Create a raster of the given shape by evaluating `f(row, col)`
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> T,
    {
        Self {
            data: Array2::from_shape_fn((rows, cols), |(r, c)| f(r, c)),
        }
    }

    // Dimensions

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the raster is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // Data access

    /// Get value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        self.data
            .get((row, col))
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            })
    }

    /// Set value at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        if row >= self.rows() || col >= self.cols() {
            return Err(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            });
        }
        self.data[(row, col)] = value;
        Ok(())
    }

    /// Get a view of the underlying data
    pub fn view(&self) -> ArrayView2<'_, T> {
        self.data.view()
    }

    /// Get a reference to the underlying array
    pub fn data(&self) -> &Array2<T> {
        &self.data
    }

    /// Consume the raster and return the underlying array
    pub fn into_array(self) -> Array2<T> {
        self.data
    }

    /// Copy the cells selected by `window` into a new raster.
    ///
    /// The window must lie within the raster.
    pub fn window(&self, window: &PixelWindow) -> Result<Self> {
        let (rows, cols) = self.shape();
        if window.row_start > window.row_end
            || window.col_start > window.col_end
            || window.row_end > rows
            || window.col_end > cols
        {
            return Err(Error::IndexOutOfBounds {
                row: window.row_end,
                col: window.col_end,
                rows,
                cols,
            });
        }

        let view = self.data.slice(s![
            window.row_start..window.row_end,
            window.col_start..window.col_end
        ]);
        Ok(Self {
            data: view.to_owned(),
        })
    }

    // Conversion

    /// Convert into an 8-bit display raster.
    ///
    /// Samples are rounded and clamped to `0..=255`; NaN becomes 0.
    pub fn to_display_u8(&self) -> Raster<u8> {
        Raster {
            data: self.data.mapv(|v| match v.to_f64() {
                Some(f) if f.is_finite() => f.round().clamp(0.0, 255.0) as u8,
                Some(f) if f == f64::INFINITY => u8::MAX,
                _ => 0,
            }),
        }
    }

    // Statistics

    /// Calculate basic statistics over the finite samples
    pub fn statistics(&self) -> RasterStatistics {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum: f64 = 0.0;
        let mut count: usize = 0;

        for v in self.data.iter().filter_map(|v| v.to_f64()) {
            if !v.is_finite() {
                continue;
            }
            min = min.min(v);
            max = max.max(v);
            sum += v;
            count += 1;
        }

        if count == 0 {
            return RasterStatistics {
                min: None,
                max: None,
                mean: None,
                valid_count: 0,
                invalid_count: self.len(),
            };
        }

        RasterStatistics {
            min: Some(min),
            max: Some(max),
            mean: Some(sum / count as f64),
            valid_count: count,
            invalid_count: self.len() - count,
        }
    }
}

impl Raster<f64> {
    /// Apply `f` to every sample, producing a new raster of the same shape
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Raster<f64> {
        Raster {
            data: self.data.mapv(f),
        }
    }
}

/// Basic statistics for a raster
#[derive(Debug, Clone, PartialEq)]
pub struct RasterStatistics {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    /// Number of finite samples
    pub valid_count: usize,
    /// Number of NaN or infinite samples
    pub invalid_count: usize,
}
