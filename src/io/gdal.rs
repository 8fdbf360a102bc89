use gdal::raster::{GdalDataType, ResampleAlg};
use gdal::spatial_ref::SpatialRef;
use gdal::{Dataset, errors::GdalError as GdalCrateError};
use ndarray::Array2;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::types::{GeoReference, PixelType, Raster};

/// Errors encountered when using GDAL reader
#[derive(Debug, Error)]
pub enum GdalError {
    #[error("GDAL error: {0}")]
    Gdal(#[from] GdalCrateError),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Dimension mismatch: expected {0}x{1}, got {2}x{3}")]
    DimensionMismatch(usize, usize, usize, usize),
}

/// Metadata extracted from a GDAL-supported dataset
#[derive(Debug, Clone)]
pub struct GdalMetadata {
    /// Width (pixels) of the raster
    pub size_x: usize,
    /// Height (lines) of the raster
    pub size_y: usize,
    /// Number of raster bands
    pub bands: usize,
    /// Affine geotransform coefficients ([origin_x, pixel_width, rot_x, origin_y, rot_y, pixel_height])
    pub geotransform: [f64; 6],
    /// Projection in WKT format
    pub projection: String,
    /// Pixel type of the first band
    pub pixel_type: PixelType,
}

impl GdalMetadata {
    pub fn georef(&self) -> GeoReference {
        GeoReference {
            geotransform: self.geotransform,
            projection: self.projection.clone(),
        }
    }
}

/// Reader for single-band rasters via GDAL
pub struct GdalReader {
    pub dataset: Dataset,
    pub metadata: GdalMetadata,
}

fn pixel_type_of(data_type: GdalDataType) -> PixelType {
    match data_type {
        GdalDataType::UInt8 => PixelType::U8,
        GdalDataType::UInt16 => PixelType::U16,
        GdalDataType::Int16 => PixelType::I16,
        GdalDataType::UInt32 => PixelType::U32,
        GdalDataType::Int32 => PixelType::I32,
        GdalDataType::Float32 => PixelType::F32,
        _ => PixelType::F64,
    }
}

/// Parse a WKT definition with OSR; empty or malformed text yields `None`.
fn spatial_ref(wkt: &str) -> Option<SpatialRef> {
    if wkt.trim().is_empty() {
        return None;
    }
    match SpatialRef::from_wkt(wkt) {
        Ok(srs) => Some(srs),
        Err(e) => {
            debug!("Unparseable WKT: {}", e);
            None
        }
    }
}

/// Whether a WKT definition describes a projected CRS (compound ones included).
pub fn is_projected(wkt: &str) -> bool {
    spatial_ref(wkt).is_some_and(|srs| srs.is_projected())
}

/// Root authority of a WKT definition as `NAME:CODE`.
///
/// When the root node carries no authority, OSR is asked to identify an EPSG code
/// (WGS 84 UTM zones and the like) before giving up.
pub fn authority(wkt: &str) -> Option<String> {
    let mut srs = spatial_ref(wkt)?;
    if srs.auth_code().is_err() {
        if let Err(e) = srs.auto_identify_epsg() {
            debug!("No EPSG code identified: {}", e);
        }
    }
    let name = srs.auth_name()?;
    let code = srs.auth_code().ok()?;
    Some(format!("{}:{}", name, code))
}

impl GdalReader {
    /// Open a GDAL-supported dataset (e.g., GeoTIFF)
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GdalError> {
        let dataset = Dataset::open(path.as_ref())?;
        let (size_x, size_y) = dataset.raster_size();
        let bands = dataset.raster_count() as usize;
        if bands == 0 {
            return Err(GdalError::UnsupportedFormat("No raster bands found".into()));
        }
        let geotransform = match dataset.geo_transform() {
            Ok(gt) => gt,
            Err(_) => [0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
        };
        let projection = dataset.projection();
        let pixel_type = pixel_type_of(dataset.rasterband(1)?.band_type());
        Ok(GdalReader {
            dataset,
            metadata: GdalMetadata {
                size_x,
                size_y,
                bands,
                geotransform,
                projection,
                pixel_type,
            },
        })
    }

    /// Read a single band (1-based index) as an f64 ndarray of shape (height, width)
    pub fn read_band(&self, index: usize) -> Result<Array2<f64>, GdalError> {
        if index == 0 || index > self.metadata.bands {
            return Err(GdalError::UnsupportedFormat(format!(
                "Band index {} out of range",
                index
            )));
        }
        let band = self.dataset.rasterband(index)?;
        let window = (self.metadata.size_x, self.metadata.size_y);
        let buf = band.read_as::<f64>((0, 0), window, window, Some(ResampleAlg::NearestNeighbour))?;
        let data_vec = buf.data().to_vec();
        let len = data_vec.len();
        Array2::from_shape_vec((self.metadata.size_y, self.metadata.size_x), data_vec).map_err(
            |_| {
                GdalError::DimensionMismatch(
                    self.metadata.size_x,
                    self.metadata.size_y,
                    len,
                    1,
                )
            },
        )
    }
}

/// Read band 1 and the georeference of a raster, releasing the dataset before returning.
pub fn read_raster<P: AsRef<Path>>(path: P) -> Result<Raster, GdalError> {
    let reader = GdalReader::open(path.as_ref())?;
    let data = reader.read_band(1)?;
    let GdalReader { dataset, metadata } = reader;
    drop(dataset);
    debug!(
        "Read {:?}: {}x{} {}",
        path.as_ref(),
        metadata.size_x,
        metadata.size_y,
        metadata.pixel_type
    );
    Ok(Raster {
        data,
        georef: metadata.georef(),
        pixel_type: metadata.pixel_type,
    })
}

/// Georeference and size of a raster without reading its pixels.
pub fn read_metadata<P: AsRef<Path>>(path: P) -> Result<GdalMetadata, GdalError> {
    Ok(GdalReader::open(path)?.metadata)
}
