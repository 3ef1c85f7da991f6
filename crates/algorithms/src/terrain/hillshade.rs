//! Hillshade (shaded relief) calculation
//!
//! Creates a shaded relief visualization from a DEM based on
//! illumination angle and direction.

use super::gradient::{gradient, Gradient};
use crate::maybe_rayon::*;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use tessera_core::raster::Raster;
use tessera_core::{Algorithm, Error, Result};
use tracing::debug;

/// Parameters for hillshade calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HillshadeParams {
    /// Sun azimuth in degrees
    pub azimuth: f64,
    /// Sun altitude in degrees above the horizon
    pub altitude: f64,
    /// Z-factor for vertical exaggeration
    pub z_factor: f64,
}

impl Default for HillshadeParams {
    fn default() -> Self {
        Self {
            azimuth: 90.0,
            altitude: 60.0,
            z_factor: 1.0,
        }
    }
}

impl HillshadeParams {
    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("azimuth", self.azimuth),
            ("altitude", self.altitude),
            ("z_factor", self.z_factor),
        ] {
            if !value.is_finite() {
                return Err(Error::InvalidParameter {
                    name,
                    value: value.to_string(),
                    reason: "must be finite".into(),
                });
            }
        }
        Ok(())
    }
}

/// Hillshade algorithm
#[derive(Debug, Clone, Default)]
pub struct Hillshade;

impl Algorithm for Hillshade {
    type Input = Raster<f64>;
    type Output = Raster<f64>;
    type Params = HillshadeParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Hillshade"
    }

    fn description(&self) -> &'static str {
        "Calculate shaded relief from a DEM"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        hillshade(&input, params)
    }
}

/// Shade value in `[0, 255]` for one cell.
///
/// `dx` is the derivative along the rows axis and `dy` along the columns
/// axis; `sin_alt`/`cos_alt` belong to the sun altitude.
#[inline]
fn shade(dx: f64, dy: f64, azimuth_rad: f64, sin_alt: f64, cos_alt: f64) -> f64 {
    let slope = FRAC_PI_2 - (dx * dx + dy * dy).sqrt().atan();
    let aspect = (-dx).atan2(dy);

    let illumination = sin_alt * slope.sin() + cos_alt * slope.cos() * (azimuth_rad - aspect).cos();

    255.0 * (illumination + 1.0) / 2.0
}

/// Calculate hillshade from a DEM
///
/// The per-cell gradient (central differences, one-sided on the border)
/// gives the slope angle `π/2 − atan(|∇z|)` and the aspect
/// `atan2(−dz/drow, dz/dcol)`. Illumination from the sun at `azimuth` and
/// `altitude` lies in `[−1, 1]` and is mapped linearly onto `[0, 255]`.
///
/// # Arguments
/// * `dem` - Input DEM raster
/// * `params` - Hillshade parameters (azimuth, altitude, z-factor)
///
/// # Returns
/// Raster of the same shape as `dem` with values in `[0, 255]`; NaN
/// elevations propagate to the cells whose gradient touches them.
pub fn hillshade(dem: &Raster<f64>, params: HillshadeParams) -> Result<Raster<f64>> {
    params.validate()?;

    let (rows, cols) = dem.shape();

    let azimuth_rad = params.azimuth.to_radians();
    let altitude_rad = params.altitude.to_radians();
    let (sin_alt, cos_alt) = altitude_rad.sin_cos();
    let z_factor = params.z_factor;

    debug!(
        rows,
        cols,
        azimuth = params.azimuth,
        altitude = params.altitude,
        z_factor,
        "computing hillshade"
    );

    let Gradient { d_row, d_col } = gradient(dem);

    // Process rows in parallel
    let output_data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            (0..cols)
                .map(|col| {
                    let dx = d_row[(row, col)] * z_factor;
                    let dy = d_col[(row, col)] * z_factor;
                    shade(dx, dy, azimuth_rad, sin_alt, cos_alt)
                })
                .collect::<Vec<_>>()
        })
        .collect();

    let data = Array2::from_shape_vec((rows, cols), output_data).map_err(|_| Error::InvalidDimensions {
        width: cols,
        height: rows,
    })?;

    Ok(Raster::from_array(data))
}
