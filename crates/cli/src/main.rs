//! Tessera CLI - raster mosaics, normalization, cropping and hillshading

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use tessera_algorithms::clip::crop;
use tessera_algorithms::imagery::{normalize, NormalizeParams, ValueRange};
use tessera_algorithms::mosaic::{read_mosaic, MosaicLayout};
use tessera_algorithms::pipeline::{run_pipeline, PipelineConfig};
use tessera_algorithms::terrain::{hillshade, HillshadeParams};
use tessera_core::io::{read_geotiff_with_extent, write_geotiff, GeoTiffOptions, SampleFormat};
use tessera_core::{GeoExtent, Raster};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "tessera")]
#[command(author, version, about = "Raster mosaics and shaded relief", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct OutputArgs {
    /// Output file
    output: PathBuf,
    /// Write 8-bit gray samples instead of 32-bit float
    #[arg(long)]
    gray8: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a raster file
    Info {
        /// Input raster file
        input: PathBuf,
    },
    /// Assemble tiles into a mosaic (tiles listed row-major)
    Mosaic {
        /// Number of tile rows
        #[arg(long)]
        rows: usize,
        /// Number of tile columns
        #[arg(long)]
        cols: usize,
        /// Tile file; repeat once per tile
        #[arg(short, long = "tile", required = true)]
        tiles: Vec<PathBuf>,
        #[command(flatten)]
        out: OutputArgs,
    },
    /// Rescale values into a display range
    Normalize {
        /// Input raster file
        input: PathBuf,
        #[command(flatten)]
        out: OutputArgs,
        /// Lower bound of the target range
        #[arg(long, default_value = "0")]
        target_min: f64,
        /// Upper bound of the target range
        #[arg(long, default_value = "255")]
        target_max: f64,
        /// Source range as MIN,MAX (default: raster min/max)
        #[arg(long, value_parser = parse_range)]
        source: Option<ValueRange>,
    },
    /// Crop by a geographic bounding box
    Crop {
        /// Input raster file
        input: PathBuf,
        #[command(flatten)]
        out: OutputArgs,
        /// Bounding box to keep as XMIN,YMIN,XMAX,YMAX
        #[arg(long, value_parser = parse_extent, allow_hyphen_values = true)]
        bbox: GeoExtent,
        /// Extent of the input as XMIN,YMIN,XMAX,YMAX (default: GeoTIFF tags)
        #[arg(long, value_parser = parse_extent, allow_hyphen_values = true)]
        extent: Option<GeoExtent>,
    },
    /// Shaded relief from a DEM
    Hillshade {
        /// Input DEM file
        input: PathBuf,
        #[command(flatten)]
        out: OutputArgs,
        /// Sun azimuth in degrees
        #[arg(short, long, default_value = "90")]
        azimuth: f64,
        /// Sun altitude in degrees
        #[arg(short = 'l', long, default_value = "60")]
        altitude: f64,
        /// Vertical exaggeration
        #[arg(short, long, default_value = "1")]
        z_factor: f64,
    },
    /// Run a pipeline described by a JSON file
    Run {
        /// Pipeline configuration
        config: PathBuf,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("logging disabled: {}", e);
    }
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn parse_floats<const N: usize>(s: &str) -> std::result::Result<[f64; N], String> {
    let values: Vec<f64> = s
        .split(',')
        .map(|v| v.trim().parse::<f64>().map_err(|e| format!("'{}': {}", v, e)))
        .collect::<std::result::Result<_, _>>()?;
    values
        .try_into()
        .map_err(|v: Vec<f64>| format!("expected {} comma-separated numbers, got {}", N, v.len()))
}

fn parse_extent(s: &str) -> std::result::Result<GeoExtent, String> {
    parse_floats::<4>(s).map(GeoExtent::from)
}

fn parse_range(s: &str) -> std::result::Result<ValueRange, String> {
    parse_floats::<2>(s).map(|[min, max]| ValueRange::new(min, max))
}

fn read_raster(path: &Path) -> Result<(Raster<f64>, Option<GeoExtent>)> {
    let pb = spinner("Reading raster...");
    let (raster, extent) = read_geotiff_with_extent::<f64, _>(path)
        .with_context(|| format!("Failed to read raster {}", path.display()))?;
    pb.finish_and_clear();
    info!("Input: {} x {}", raster.cols(), raster.rows());
    Ok((raster, extent))
}

fn write_result(raster: &Raster<f64>, out: &OutputArgs, extent: Option<GeoExtent>) -> Result<()> {
    let pb = spinner("Writing output...");
    let options = GeoTiffOptions {
        sample_format: if out.gray8 {
            SampleFormat::Gray8
        } else {
            SampleFormat::Float32
        },
        extent,
    };
    write_geotiff(raster, &out.output, Some(options)).context("Failed to write output")?;
    pb.finish_and_clear();
    Ok(())
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Info { input } => {
            let (raster, extent) = read_raster(&input)?;
            let (rows, cols) = raster.shape();
            let stats = raster.statistics();

            println!("File: {}", input.display());
            println!("Dimensions: {} x {} ({} cells)", cols, rows, raster.len());
            if let Some(e) = extent {
                println!(
                    "Extent: ({:.6}, {:.6}) - ({:.6}, {:.6})",
                    e.x_min, e.y_min, e.x_max, e.y_max
                );
            }
            println!("\nStatistics:");
            if let Some(min) = stats.min {
                println!("  Min: {:.4}", min);
            }
            if let Some(max) = stats.max {
                println!("  Max: {:.4}", max);
            }
            if let Some(mean) = stats.mean {
                println!("  Mean: {:.4}", mean);
            }
            if !raster.is_empty() {
                println!(
                    "  Valid cells: {} ({:.1}%)",
                    stats.valid_count,
                    100.0 * stats.valid_count as f64 / raster.len() as f64
                );
            }
        }

        Commands::Mosaic { rows, cols, tiles, out } => {
            let start = Instant::now();
            let pb = spinner("Reading tiles...");
            let mosaic: Raster<f64> =
                read_mosaic(&tiles, MosaicLayout::new(rows, cols)).context("Failed to assemble mosaic")?;
            pb.finish_and_clear();
            info!("Mosaic: {} x {}", mosaic.cols(), mosaic.rows());
            write_result(&mosaic, &out, None)?;
            done("Mosaic", &out.output, start.elapsed());
        }

        Commands::Normalize {
            input,
            out,
            target_min,
            target_max,
            source,
        } => {
            let (raster, extent) = read_raster(&input)?;
            let start = Instant::now();
            let params = NormalizeParams {
                target: ValueRange::new(target_min, target_max),
                source,
            };
            let result = normalize(&raster, params).context("Normalization failed")?;
            write_result(&result, &out, extent)?;
            done("Normalized raster", &out.output, start.elapsed());
        }

        Commands::Crop {
            input,
            out,
            bbox,
            extent,
        } => {
            let (raster, tagged) = read_raster(&input)?;
            let extent = extent
                .or(tagged)
                .context("Input has no GeoTIFF extent; pass --extent")?;
            let start = Instant::now();
            let result = crop(&raster, &extent, &bbox).context("Crop failed")?;
            info!("Cropped: {} x {}", result.cols(), result.rows());
            write_result(&result, &out, Some(bbox))?;
            done("Cropped raster", &out.output, start.elapsed());
        }

        Commands::Hillshade {
            input,
            out,
            azimuth,
            altitude,
            z_factor,
        } => {
            let (dem, extent) = read_raster(&input)?;
            let start = Instant::now();
            let params = HillshadeParams {
                azimuth,
                altitude,
                z_factor,
            };
            let result = hillshade(&dem, params).context("Hillshade failed")?;
            write_result(&result, &out, extent)?;
            done("Hillshade", &out.output, start.elapsed());
        }

        Commands::Run { config } => {
            let pipeline = PipelineConfig::from_file(&config)
                .with_context(|| format!("Failed to load pipeline {}", config.display()))?;
            let start = Instant::now();
            let pb = spinner("Running pipeline...");
            let state = run_pipeline(&pipeline).context("Pipeline failed")?;
            pb.finish_and_clear();
            info!("Result: {} x {}", state.raster.cols(), state.raster.rows());
            match &pipeline.output {
                Some(output) => done("Pipeline output", &output.path, start.elapsed()),
                None => println!("Pipeline finished without output in {:.2?}", start.elapsed()),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_extent() {
        let e = parse_extent("-48,-21, -46,-23").unwrap();
        assert_eq!(e, GeoExtent::new(-48.0, -21.0, -46.0, -23.0));
    }

    #[test]
    fn rejects_short_extent() {
        assert!(parse_extent("1,2,3").is_err());
        assert!(parse_extent("1,2,x,4").is_err());
    }

    #[test]
    fn parses_range() {
        assert_eq!(parse_range("0,1000").unwrap(), ValueRange::new(0.0, 1000.0));
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
