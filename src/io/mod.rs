//! I/O layer for Sentinel-2 L2A datasets and GDAL-backed rasters.
//! Provides the `sentinel2` product layout, `gdal` adapters, the `warp`
//! reprojection service and `writers` for GeoTIFF outputs and metadata tags.
pub mod sentinel2;
pub use self::sentinel2::{L2aProduct, read_byte_grid};

pub mod gdal;
pub use self::gdal::{GdalError, GdalMetadata, GdalReader};

pub mod warp;
pub use self::warp::{GdalWarp, Warper};

pub mod writers;
