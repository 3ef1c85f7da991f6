//! Chained raster processing
//!
//! Two ways to run a sequence of operations:
//!
//! - [`RasterPipeline`]: method chaining on an owned `Raster<f64>`, each
//!   step consuming the raster and returning the next one:
//!
//! ```ignore
//! let shaded = assemble(&tiles, MosaicLayout::new(2, 2))?
//!     .normalize(NormalizeParams::default())?
//!     .crop(&extent, &bbox)?
//!     .hillshade(HillshadeParams::default())?;
//! ```
//!
//! - [`PipelineConfig`]: the same sequence described as data (JSON), read
//!   from tiles on disk and optionally written back out.

use crate::clip;
use crate::imagery::{self, NormalizeParams};
use crate::mosaic::{assemble, MosaicLayout};
use crate::terrain::{self, HillshadeParams};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tessera_core::io::{read_geotiff_with_extent, write_geotiff, GeoTiffOptions, SampleFormat};
use tessera_core::raster::{GeoExtent, Raster};
use tessera_core::{Error, Result};
use tracing::{debug, info};

/// Fluent chaining of the raster operations.
///
/// Every method takes the raster by value and hands back a new one. On
/// error the consumed raster is dropped; borrow-based free functions
/// ([`imagery::normalize`], [`clip::crop`], [`terrain::hillshade`]) keep
/// the input when that matters.
pub trait RasterPipeline: Sized {
    /// Rescale values, see [`imagery::normalize`]
    fn normalize(self, params: NormalizeParams) -> Result<Self>;

    /// Keep the part of the raster inside `bbox`, see [`clip::crop`]
    fn crop(self, extent: &GeoExtent, bbox: &GeoExtent) -> Result<Self>;

    /// Replace elevations by shaded relief, see [`terrain::hillshade`]
    fn hillshade(self, params: HillshadeParams) -> Result<Self>;
}

impl RasterPipeline for Raster<f64> {
    fn normalize(self, params: NormalizeParams) -> Result<Self> {
        imagery::normalize(&self, params)
    }

    fn crop(self, extent: &GeoExtent, bbox: &GeoExtent) -> Result<Self> {
        clip::crop(&self, extent, bbox)
    }

    fn hillshade(self, params: HillshadeParams) -> Result<Self> {
        terrain::hillshade(&self, params)
    }
}

/// One step of a configured pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    Normalize(NormalizeParams),
    Crop {
        bbox: GeoExtent,
        /// Overrides the extent tracked by the pipeline
        #[serde(default)]
        extent: Option<GeoExtent>,
    },
    Hillshade(HillshadeParams),
}

/// Where and how the final raster is written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub sample_format: SampleFormat,
    /// Record the tracked extent as GeoTIFF tags
    #[serde(default = "default_true")]
    pub georeference: bool,
}

fn default_true() -> bool {
    true
}

/// A complete pipeline description.
///
/// ```json
/// {
///   "tiles": ["S22W048.tif", "S22W047.tif", "S23W048.tif", "S23W047.tif"],
///   "layout": {"tile_rows": 2, "tile_cols": 2},
///   "extent": {"x_min": -48, "y_min": -21, "x_max": -46, "y_max": -23},
///   "steps": [
///     {"op": "normalize"},
///     {"op": "crop", "bbox": {"x_min": -46.8, "y_min": -21.7, "x_max": -46.3, "y_max": -22.1}},
///     {"op": "hillshade", "azimuth": 90, "altitude": 60}
///   ],
///   "output": {"path": "relief.tif", "sample_format": "gray8"}
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Tile files, row-major
    pub tiles: Vec<PathBuf>,
    #[serde(default)]
    pub layout: MosaicLayout,
    /// Extent of the assembled mosaic; taken from the tile's GeoTIFF tags
    /// when omitted and a single tile is used
    #[serde(default)]
    pub extent: Option<GeoExtent>,
    #[serde(default)]
    pub steps: Vec<Operation>,
    #[serde(default)]
    pub output: Option<OutputConfig>,
}

impl PipelineConfig {
    /// Parse a JSON pipeline description
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json_error(serde_json::from_str(json))
    }

    /// Read a JSON pipeline description from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

fn serde_json_error<T>(result: serde_json::Result<T>) -> Result<T> {
    result.map_err(|e| Error::InvalidParameter {
        name: "pipeline",
        value: String::from("<json>"),
        reason: e.to_string(),
    })
}

/// A raster in flight together with the extent it currently covers, if known.
#[derive(Debug, Clone)]
pub struct PipelineState {
    pub raster: Raster<f64>,
    pub extent: Option<GeoExtent>,
}

impl PipelineState {
    pub fn new(raster: Raster<f64>, extent: Option<GeoExtent>) -> Self {
        Self { raster, extent }
    }

    /// Apply one operation. A crop narrows the tracked extent to its bbox.
    pub fn apply(self, op: &Operation) -> Result<Self> {
        debug!(?op, shape = ?self.raster.shape(), "applying operation");
        match op {
            Operation::Normalize(params) => Ok(Self {
                raster: self.raster.normalize(params.clone())?,
                extent: self.extent,
            }),
            Operation::Crop { bbox, extent } => {
                let extent = extent.or(self.extent).ok_or_else(|| Error::InvalidParameter {
                    name: "extent",
                    value: String::from("none"),
                    reason: "crop needs the extent of the raster it is applied to".into(),
                })?;
                Ok(Self {
                    raster: self.raster.crop(&extent, bbox)?,
                    extent: Some(*bbox),
                })
            }
            Operation::Hillshade(params) => Ok(Self {
                raster: self.raster.hillshade(params.clone())?,
                extent: self.extent,
            }),
        }
    }

    /// Apply operations in order
    pub fn apply_all<'a, I>(self, ops: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Operation>,
    {
        ops.into_iter().try_fold(self, |state, op| state.apply(op))
    }
}

/// Read the tiles, run every step and write the output if one is configured.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineState> {
    let layout = config.layout;
    layout.check_tile_count(config.tiles.len())?;

    let mut tiles = Vec::with_capacity(config.tiles.len());
    let mut tile_extent = None;
    for path in &config.tiles {
        let (tile, extent) = read_geotiff_with_extent::<f64, _>(path)?;
        info!(path = %path.display(), rows = tile.rows(), cols = tile.cols(), "read tile");
        tile_extent = extent;
        tiles.push(tile);
    }

    let raster = assemble(&tiles, layout)?;
    let extent = config
        .extent
        .or(if tiles.len() == 1 { tile_extent } else { None });

    let state = PipelineState::new(raster, extent).apply_all(&config.steps)?;

    if let Some(output) = &config.output {
        let options = GeoTiffOptions {
            sample_format: output.sample_format,
            extent: if output.georeference { state.extent } else { None },
        };
        write_geotiff(&state.raster, &output.path, Some(options))?;
        info!(path = %output.path.display(), "wrote output");
    }

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn dem() -> Raster<f64> {
        Raster::from_fn(20, 20, |r, c| (r as f64 * 0.3).sin() * 50.0 + c as f64 * 2.0)
    }

    #[test]
    fn test_fluent_chain() {
        let extent = GeoExtent::new(0.0, 0.0, 20.0, 20.0);
        let bbox = GeoExtent::new(5.0, 5.0, 15.0, 15.0);

        let result = dem()
            .normalize(NormalizeParams::default())
            .and_then(|r| r.crop(&extent, &bbox))
            .and_then(|r| r.hillshade(HillshadeParams::default()))
            .unwrap();

        assert_eq!(result.shape(), (10, 10));
    }

    #[test]
    fn test_crop_tracks_extent() {
        let state = PipelineState::new(dem(), Some(GeoExtent::new(0.0, 0.0, 20.0, 20.0)));
        let ops = vec![
            Operation::Crop {
                bbox: GeoExtent::new(0.0, 0.0, 10.0, 10.0),
                extent: None,
            },
            // Relative to the already-cropped extent
            Operation::Crop {
                bbox: GeoExtent::new(0.0, 0.0, 5.0, 5.0),
                extent: None,
            },
        ];

        let state = state.apply_all(&ops).unwrap();
        assert_eq!(state.raster.shape(), (5, 5));
        assert_eq!(state.extent, Some(GeoExtent::new(0.0, 0.0, 5.0, 5.0)));
    }

    #[test]
    fn test_crop_without_extent_fails() {
        let state = PipelineState::new(dem(), None);
        let op = Operation::Crop {
            bbox: GeoExtent::new(0.0, 0.0, 1.0, 1.0),
            extent: None,
        };
        assert!(matches!(
            state.apply(&op),
            Err(Error::InvalidParameter { name: "extent", .. })
        ));
    }

    #[test]
    fn test_parse_config() {
        let config = PipelineConfig::from_json(
            r#"{
                "tiles": ["a.tif", "b.tif", "c.tif", "d.tif"],
                "layout": {"tile_rows": 2, "tile_cols": 2},
                "extent": {"x_min": -48, "y_min": -21, "x_max": -46, "y_max": -23},
                "steps": [
                    {"op": "normalize"},
                    {"op": "crop", "bbox": {"x_min": -46.8, "y_min": -21.7, "x_max": -46.3, "y_max": -22.1}},
                    {"op": "hillshade", "altitude": 45}
                ],
                "output": {"path": "out.tif", "sample_format": "gray8"}
            }"#,
        )
        .unwrap();

        assert_eq!(config.layout, MosaicLayout::new(2, 2));
        assert_eq!(config.steps.len(), 3);
        assert_eq!(config.steps[0], Operation::Normalize(NormalizeParams::default()));
        match &config.steps[2] {
            Operation::Hillshade(p) => {
                assert_relative_eq!(p.altitude, 45.0);
                assert_relative_eq!(p.azimuth, 90.0);
            }
            other => panic!("unexpected step {:?}", other),
        }
        let output = config.output.unwrap();
        assert_eq!(output.sample_format, SampleFormat::Gray8);
        assert!(output.georeference);
    }

    #[test]
    fn test_bad_config_is_invalid_parameter() {
        assert!(matches!(
            PipelineConfig::from_json(r#"{"tiles": 3}"#),
            Err(Error::InvalidParameter { name: "pipeline", .. })
        ));
    }

    #[test]
    fn test_unknown_operation_rejected() {
        assert!(PipelineConfig::from_json(r#"{"tiles": [], "steps": [{"op": "reproject"}]}"#).is_err());
    }
}
