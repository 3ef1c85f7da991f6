//! Native TIFF reading/writing
//!
//! Uses the `tiff` crate. Georeferencing is limited to the
//! ModelPixelScale / ModelTiepoint pair. The tiepoint anchors the row 0 /
//! column 0 corner of the [`GeoExtent`]. Scales are positive for north-up
//! imagery and negative along an axis whose coordinates run the other way.

use crate::error::{Error, Result};
use crate::raster::{GeoExtent, Raster, RasterElement};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::{ColorType, Gray32Float, Gray8};
use tiff::encoder::{DirectoryEncoder, TiffEncoder, TiffKind, TiffValue};
use tiff::tags::Tag;

/// Sample encoding used when writing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    /// 32-bit float, samples passed through unchanged
    #[default]
    Float32,
    /// 8-bit gray, samples rounded and clamped to 0..=255
    Gray8,
}

/// Options for writing TIFF files
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoTiffOptions {
    /// Sample encoding
    pub sample_format: SampleFormat,
    /// Extent to record as GeoTIFF tags; plain TIFF when `None`
    pub extent: Option<GeoExtent>,
}

/// Read a TIFF file into a Raster
pub fn read_geotiff<T, P>(path: P) -> Result<Raster<T>>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    read_geotiff_with_extent(path).map(|(raster, _)| raster)
}

/// Read a TIFF file along with the extent recorded in its GeoTIFF tags.
///
/// The extent is `None` when the file carries no pixel-scale/tiepoint tags.
pub fn read_geotiff_with_extent<T, P>(path: P) -> Result<(Raster<T>, Option<GeoExtent>)>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref())?;
    decode_geotiff(file)
}

/// Read a TIFF from an in-memory buffer into a Raster
pub fn read_geotiff_from_buffer<T>(data: &[u8]) -> Result<(Raster<T>, Option<GeoExtent>)>
where
    T: RasterElement,
{
    decode_geotiff(Cursor::new(data))
}

fn cast_all<S, T>(buf: Vec<S>) -> Vec<T>
where
    S: num_traits::NumCast,
    T: RasterElement,
{
    buf.into_iter()
        .map(|v| num_traits::cast(v).unwrap_or_else(T::fill_value))
        .collect()
}

fn decode_geotiff<T, R>(reader: R) -> Result<(Raster<T>, Option<GeoExtent>)>
where
    T: RasterElement,
    R: Read + Seek,
{
    let mut decoder = Decoder::new(reader).map_err(|e| Error::Decode(e.to_string()))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Decode(format!("cannot read dimensions: {}", e)))?;

    let rows = height as usize;
    let cols = width as usize;

    let result = decoder
        .read_image()
        .map_err(|e| Error::Decode(format!("cannot read image data: {}", e)))?;

    let data: Vec<T> = match result {
        DecodingResult::F32(buf) => cast_all(buf),
        DecodingResult::F64(buf) => cast_all(buf),
        DecodingResult::U8(buf) => cast_all(buf),
        DecodingResult::U16(buf) => cast_all(buf),
        DecodingResult::U32(buf) => cast_all(buf),
        DecodingResult::U64(buf) => cast_all(buf),
        DecodingResult::I8(buf) => cast_all(buf),
        DecodingResult::I16(buf) => cast_all(buf),
        DecodingResult::I32(buf) => cast_all(buf),
        DecodingResult::I64(buf) => cast_all(buf),
        #[allow(unreachable_patterns)]
        _ => {
            return Err(Error::UnsupportedDataType(
                "unsupported TIFF pixel format".to_string(),
            ))
        }
    };

    // Interleaved multi-band data decodes to more samples than cells.
    if data.len() != rows * cols {
        return Err(Error::InvalidShape {
            reason: format!(
                "decoded {} samples for a {}x{} image",
                data.len(),
                cols,
                rows
            ),
        });
    }

    let raster = Raster::from_vec(data, rows, cols)?;
    let extent = read_extent(&mut decoder, rows, cols);

    Ok((raster, extent))
}

/// Reconstruct the extent from ModelPixelScale + ModelTiepoint
fn read_extent<R: Read + Seek>(
    decoder: &mut Decoder<R>,
    rows: usize,
    cols: usize,
) -> Option<GeoExtent> {
    let scale = decoder.get_tag_f64_vec(Tag::ModelPixelScaleTag).ok()?;
    let tiepoint = decoder.get_tag_f64_vec(Tag::ModelTiepointTag).ok()?;

    if scale.len() < 2 || tiepoint.len() < 6 {
        return None;
    }
    if scale[..2].iter().any(|s| !s.is_finite() || *s == 0.0) {
        return None;
    }

    // tiepoint: [I, J, K, X, Y, Z], scale: [ScaleX, ScaleY, ScaleZ]
    let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
    let origin_y = tiepoint[4] + tiepoint[1] * scale[1];

    Some(GeoExtent::from_origin(
        origin_x, origin_y, scale[0], -scale[1], rows, cols,
    ))
}

/// Write a Raster to a TIFF file
pub fn write_geotiff<T, P>(raster: &Raster<T>, path: P, options: Option<GeoTiffOptions>) -> Result<()>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::create(path.as_ref())?;
    encode_geotiff(raster, file, &options.unwrap_or_default())
}

/// Write a Raster to an in-memory TIFF buffer
pub fn write_geotiff_to_buffer<T>(raster: &Raster<T>, options: Option<GeoTiffOptions>) -> Result<Vec<u8>>
where
    T: RasterElement,
{
    let mut buf = Vec::new();
    encode_geotiff(raster, Cursor::new(&mut buf), &options.unwrap_or_default())?;
    Ok(buf)
}

fn encode_geotiff<T, W>(raster: &Raster<T>, writer: W, options: &GeoTiffOptions) -> Result<()>
where
    T: RasterElement,
    W: Write + Seek,
{
    let mut encoder = TiffEncoder::new(writer).map_err(|e| Error::Encode(e.to_string()))?;

    let (rows, cols) = raster.shape();
    if rows == 0 || cols == 0 {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }

    let extent = options.extent.as_ref();
    match options.sample_format {
        SampleFormat::Float32 => {
            let data: Vec<f32> = raster
                .data()
                .iter()
                .map(|&v| num_traits::cast(v).unwrap_or(f32::NAN))
                .collect();
            write_image::<Gray32Float, _>(&mut encoder, &data, rows, cols, extent)
        }
        SampleFormat::Gray8 => {
            let display = raster.to_display_u8();
            let data: Vec<u8> = display.data().iter().copied().collect();
            write_image::<Gray8, _>(&mut encoder, &data, rows, cols, extent)
        }
    }
}

/// Encode one image, tagging it with `extent` when given
fn write_image<C, W>(
    encoder: &mut TiffEncoder<W>,
    data: &[C::Inner],
    rows: usize,
    cols: usize,
    extent: Option<&GeoExtent>,
) -> Result<()>
where
    C: ColorType,
    [C::Inner]: TiffValue,
    W: Write + Seek,
{
    let mut image = encoder
        .new_image::<C>(cols as u32, rows as u32)
        .map_err(|e| Error::Encode(format!("cannot create TIFF image: {}", e)))?;
    if let Some(extent) = extent {
        write_geo_tags(image.encoder(), extent, rows, cols)?;
    }
    image
        .write_data(data)
        .map_err(|e| Error::Encode(format!("cannot write image data: {}", e)))
}

fn write_geo_tags<W, K>(
    dir: &mut DirectoryEncoder<'_, W, K>,
    extent: &GeoExtent,
    rows: usize,
    cols: usize,
) -> Result<()>
where
    W: Write + Seek,
    K: TiffKind,
{
    extent.validate()?;

    // Signed, so the row 0 / column 0 corner stays at (x_min, y_min)
    let scale = [
        (extent.x_max - extent.x_min) / cols as f64,
        (extent.y_min - extent.y_max) / rows as f64,
        0.0,
    ];
    dir.write_tag(Tag::ModelPixelScaleTag, &scale[..])
        .map_err(|e| Error::Encode(format!("cannot write scale tag: {}", e)))?;

    let tiepoint = [0.0, 0.0, 0.0, extent.x_min, extent.y_min, 0.0];
    dir.write_tag(Tag::ModelTiepointTag, &tiepoint[..])
        .map_err(|e| Error::Encode(format!("cannot write tiepoint tag: {}", e)))?;

    // GTModelTypeGeoKey=1 (Projected), GTRasterTypeGeoKey=1 (RasterPixelIsArea)
    let geokeys: [u16; 12] = [1, 1, 0, 2, 1024, 0, 1, 1, 1025, 0, 1, 1];
    dir.write_tag(Tag::GeoKeyDirectoryTag, &geokeys[..])
        .map_err(|e| Error::Encode(format!("cannot write geokey tag: {}", e)))?;

    Ok(())
}
