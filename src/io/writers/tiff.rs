use gdal::Dataset;
use gdal::DriverManager;
use gdal::raster::{Buffer, ColorInterpretation, GdalType};
use ndarray::Array2;
use std::path::Path;
use tracing::{info, warn};

use crate::io::gdal::GdalError;
use crate::types::{GeoReference, PixelType};

fn write_typed<T: GdalType + Copy>(
    output: &Path,
    bands: &[&Array2<f64>],
    georef: &GeoReference,
    no_data: Option<f64>,
    cast: fn(f64) -> T,
) -> Result<Dataset, GdalError> {
    let (rows, cols) = bands
        .first()
        .map(|b| b.dim())
        .ok_or_else(|| GdalError::UnsupportedFormat("no band to write".into()))?;
    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let mut ds = driver.create_with_band_type::<T, _>(output, cols, rows, bands.len())?;
    ds.set_geo_transform(&georef.geotransform)?;
    if !georef.projection.is_empty() {
        ds.set_projection(&georef.projection)?;
    }

    for (idx, data) in bands.iter().enumerate() {
        if data.dim() != (rows, cols) {
            let (r, c) = data.dim();
            return Err(GdalError::DimensionMismatch(cols, rows, c, r));
        }
        let mut band = ds.rasterband(idx + 1)?;
        if let Some(nd) = no_data {
            band.set_no_data_value(Some(nd))?;
        }
        // iter() walks logical row-major order whatever the memory layout
        let mut buf = Buffer::new((cols, rows), data.iter().map(|&v| cast(v)).collect());
        band.write((0, 0), (cols, rows), &mut buf)?;
    }
    Ok(ds)
}

/// Write `bands` as one GeoTIFF of the given pixel type.
///
/// Integer pixel types receive values rounded to the nearest integer, then clamped to the
/// type's range by the saturating float-to-int cast; NaN becomes 0.
pub fn write_geotiff(
    output: &Path,
    bands: &[&Array2<f64>],
    georef: &GeoReference,
    pixel_type: PixelType,
    no_data: Option<f64>,
) -> Result<Dataset, GdalError> {
    let ds = match pixel_type {
        PixelType::U8 => write_typed::<u8>(output, bands, georef, no_data, |v| v.round() as u8)?,
        PixelType::U16 => {
            write_typed::<u16>(output, bands, georef, no_data, |v| v.round() as u16)?
        }
        PixelType::I16 => {
            write_typed::<i16>(output, bands, georef, no_data, |v| v.round() as i16)?
        }
        PixelType::U32 => {
            write_typed::<u32>(output, bands, georef, no_data, |v| v.round() as u32)?
        }
        PixelType::I32 => {
            write_typed::<i32>(output, bands, georef, no_data, |v| v.round() as i32)?
        }
        PixelType::F32 => write_typed::<f32>(output, bands, georef, no_data, |v| v as f32)?,
        PixelType::F64 => write_typed::<f64>(output, bands, georef, no_data, |v| v)?,
    };
    info!(
        "Wrote {:?}: {} band(s) {}x{} {}",
        output,
        bands.len(),
        ds.raster_size().0,
        ds.raster_size().1,
        pixel_type
    );
    Ok(ds)
}

/// Write a 3-band R, G, B GeoTIFF and tag the colour interpretation of each band.
pub fn write_rgb_geotiff(
    output: &Path,
    bands: [&Array2<f64>; 3],
    georef: &GeoReference,
    pixel_type: PixelType,
) -> Result<Dataset, GdalError> {
    let ds = write_geotiff(output, &bands, georef, pixel_type, None)?;
    let interpretations = [
        ColorInterpretation::RedBand,
        ColorInterpretation::GreenBand,
        ColorInterpretation::BlueBand,
    ];
    for (idx, ci) in interpretations.into_iter().enumerate() {
        let mut band = ds.rasterband(idx + 1)?;
        if let Err(e) = band.set_color_interpretation(ci) {
            warn!("Could not set colour interpretation of band {}: {}", idx + 1, e);
        }
    }
    Ok(ds)
}

/// Write a validity mask as a byte raster, 255 for valid pixels and 0 elsewhere.
pub fn write_mask_u8(output: &Path, mask: &Array2<bool>) -> Result<(), GdalError> {
    let (rows, cols) = mask.dim();
    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let ds = driver.create_with_band_type::<u8, _>(output, cols, rows, 1)?;
    let data: Vec<u8> = mask.iter().map(|&m| if m { 255 } else { 0 }).collect();
    let mut buf = Buffer::new((cols, rows), data);
    let mut band = ds.rasterband(1)?;
    band.set_color_interpretation(ColorInterpretation::GrayIndex)?;
    band.write((0, 0), (cols, rows), &mut buf)?;
    info!("Wrote mask {:?} ({}x{})", output, cols, rows);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::gdal::{read_metadata, read_raster};
    use crate::types::INVALID_VALUE;
    use ndarray::array;

    fn georef() -> GeoReference {
        GeoReference {
            geotransform: [600000.0, 20.0, 0.0, 4900020.0, 0.0, -20.0],
            projection: String::new(),
        }
    }

    #[test]
    fn test_int16_rounds_to_nearest_and_keeps_invalid_marker() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("channel.tif");
        let data = array![[120.4, INVALID_VALUE, -7.6], [3000.0, 7.6, 2.5]];
        let ds = write_geotiff(&path, &[&data], &georef(), PixelType::I16, Some(INVALID_VALUE));
        drop(ds.unwrap());

        let raster = read_raster(&path).unwrap();
        assert_eq!(raster.pixel_type, PixelType::I16);
        assert_eq!(raster.georef.geotransform, georef().geotransform);
        assert_eq!(
            raster.data,
            array![[120.0, INVALID_VALUE, -8.0], [3000.0, 8.0, 3.0]]
        );
    }

    #[test]
    fn test_uint16_rounds_and_saturates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("u16.tif");
        let data = array![[1.6, -3.0], [70000.0, 65534.5]];
        drop(write_geotiff(&path, &[&data], &georef(), PixelType::U16, None).unwrap());
        let raster = read_raster(&path).unwrap();
        assert_eq!(raster.data, array![[2.0, 0.0], [65535.0, 65535.0]]);
    }

    #[test]
    fn test_rgb_has_three_bands() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rgb.tif");
        let r = Array2::from_elem((4, 4), 1.0);
        let g = Array2::from_elem((4, 4), 2.0);
        let b = Array2::from_elem((4, 4), 3.0);
        drop(write_rgb_geotiff(&path, [&r, &g, &b], &georef(), PixelType::U16).unwrap());
        let meta = read_metadata(&path).unwrap();
        assert_eq!(meta.bands, 3);
        assert_eq!((meta.size_x, meta.size_y), (4, 4));
        assert_eq!(meta.pixel_type, PixelType::U16);
    }

    #[test]
    fn test_band_shape_mismatch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let a = Array2::from_elem((2, 2), 1.0);
        let b = Array2::from_elem((3, 3), 1.0);
        let path = dir.path().join("x.tif");
        let res = write_geotiff(&path, &[&a, &b], &georef(), PixelType::F32, None);
        assert!(matches!(res, Err(GdalError::DimensionMismatch(..))));
    }
}
