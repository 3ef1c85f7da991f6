//! Linear value-range normalization
//!
//! Projects raw sample values (elevation, reflectance, ...) onto a display
//! range, by default the 8-bit gray range `0..=255`.

use serde::{Deserialize, Serialize};
use tessera_core::raster::Raster;
use tessera_core::{Algorithm, Error, Result};
use tracing::debug;

/// Closed value interval `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// 8-bit display range `0..=255`
    pub fn display() -> Self {
        Self::new(0.0, 255.0)
    }

    /// Signed width of the interval
    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

impl From<(f64, f64)> for ValueRange {
    fn from((min, max): (f64, f64)) -> Self {
        Self::new(min, max)
    }
}

/// Parameters for normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeParams {
    /// Range the source range is mapped onto
    pub target: ValueRange,
    /// Range of input values to map; `None` uses the raster's own min/max
    pub source: Option<ValueRange>,
}

impl Default for NormalizeParams {
    fn default() -> Self {
        Self {
            target: ValueRange::display(),
            source: None,
        }
    }
}

/// Normalization algorithm
#[derive(Debug, Clone, Default)]
pub struct Normalize;

impl Algorithm for Normalize {
    type Input = Raster<f64>;
    type Output = Raster<f64>;
    type Params = NormalizeParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Normalize"
    }

    fn description(&self) -> &'static str {
        "Linearly rescale raster values into a target range"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        normalize(&input, params)
    }
}

/// Determine the source range to normalize from.
///
/// An explicit range is used as given; otherwise the min and max of the
/// finite samples are taken. Fails with [`Error::DegenerateRange`] when the
/// range has zero span, a non-finite bound, or the raster holds no finite
/// samples.
pub fn resolve_source_range(raster: &Raster<f64>, source: Option<ValueRange>) -> Result<ValueRange> {
    let range = match source {
        Some(range) => range,
        None => {
            let stats = raster.statistics();
            match (stats.min, stats.max) {
                (Some(min), Some(max)) => ValueRange::new(min, max),
                _ => {
                    return Err(Error::DegenerateRange {
                        min: f64::NAN,
                        max: f64::NAN,
                    })
                }
            }
        }
    };

    let span = range.span();
    if !span.is_finite() || span == 0.0 {
        return Err(Error::DegenerateRange {
            min: range.min,
            max: range.max,
        });
    }

    Ok(range)
}

/// Linearly rescale every sample of `raster`.
///
/// Each value `v` becomes
/// `target.min + (v - source.min) * target.span() / source.span()`.
/// Results are neither rounded nor clamped: with an explicit source range,
/// samples outside it land outside the target range. NaN stays NaN.
///
/// The input raster is left untouched; a new raster is returned.
pub fn normalize(raster: &Raster<f64>, params: NormalizeParams) -> Result<Raster<f64>> {
    let source = resolve_source_range(raster, params.source)?;
    let target = params.target;

    if !target.min.is_finite() || !target.max.is_finite() {
        return Err(Error::InvalidParameter {
            name: "target",
            value: format!("[{}, {}]", target.min, target.max),
            reason: "target range bounds must be finite".into(),
        });
    }

    let factor = target.span() / source.span();
    debug!(
        source_min = source.min,
        source_max = source.max,
        target_min = target.min,
        target_max = target.max,
        factor,
        "normalizing raster"
    );

    Ok(raster.map(|v| target.min + (v - source.min) * factor))
}
