#![doc = r#"
s2uc: Sentinel-2 L2A to UltraCam band synthesis.

This crate turns a Sentinel-2 L2A (MAJA, FRE reflectance) dataset into the four
channels of an UltraCam aerial camera (Blue, Green, Red, NIR). Each channel is a fixed,
sensor-specific weighted combination of Sentinel-2 bands, masked by the cloud, geophysical
and saturation classifications of the dataset, reprojected to a target CRS (EPSG:2154 by
default) and finally assembled into an RGB composite GeoTIFF.

Requirements
------------
- GDAL development headers and runtime available on your system.
- `gdalwarp` on `PATH` for the reprojection stage.
- Rust 2024 edition toolchain.

Quick start: process one dataset
--------------------------------
```rust,no_run
use std::path::Path;
use s2uc::{process_dataset, PipelineParams};

fn main() -> s2uc::Result<()> {
    let params = PipelineParams::default();
    let report = process_dataset(
        Path::new("/data/l2a"),
        "SENTINEL2A_20230601-105857-000_L2A_T31TCJ_C_V3-1",
        Path::new("/out"),
        &params,
    )?;
    println!("composite written to {:?}", report.composite);
    Ok(())
}
```

Batch helper
------------
```rust,no_run
use std::path::Path;
use s2uc::{process_directory, PipelineParams};

fn main() -> s2uc::Result<()> {
    let params = PipelineParams {
        target_crs: "EPSG:32631".to_string(),
        ..PipelineParams::default()
    };
    let report = process_directory(Path::new("/data/l2a"), Path::new("/out"), &params, true)?;
    println!("processed={} skipped={} errors={}", report.processed, report.skipped, report.errors);
    Ok(())
}
```

Lower-level building blocks
---------------------------
```rust
use ndarray::Array2;
use s2uc::core::calibration::coefficients;
use s2uc::core::processing::resample::resample;
use s2uc::{Channel, Sensor};

fn main() -> s2uc::Result<()> {
    let nir = coefficients(Sensor::A, Channel::Nir);
    assert_eq!(nir.terms.len(), 5);

    let fine = Array2::<f64>::from_elem((4, 4), 2.0);
    let coarse = resample(&fine, 2, 2)?;
    assert_eq!(coarse.dim(), (2, 2));
    Ok(())
}
```

Error handling
--------------
All public functions return `s2uc::Result<T>`. Pipeline failures are wrapped in
`Error::Stage`, which names the aborted stage.

```rust,no_run
use std::path::Path;
use s2uc::{process_dataset, Error, PipelineParams};

fn main() {
    let params = PipelineParams::default();
    match process_dataset(Path::new("/data"), "SENTINEL2C_unknown", Path::new("/out"), &params) {
        Ok(_) => {}
        Err(Error::Stage { stage, source }) => eprintln!("{stage} failed: {source}"),
        Err(other) => eprintln!("Other error: {other}"),
    }
}
```

Useful modules
--------------
- [`api`]: high-level entry points.
- [`core`]: calibration table, masks, resampling, synthesis, reprojection, composite.
- [`types`]: sensors, channels, band names and raster containers.
- [`io`]: L2A product layout, GDAL readers, `gdalwarp` service and GeoTIFF writers.
- [`error`]: crate-level `Error` and `Result`.
"#]

// Core modules (public)
pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

// Curated public API surface
// Types
pub use core::params::PipelineParams;
pub use error::{Error, Result};
pub use types::{
    BandName, Channel, GeoReference, INVALID_VALUE, MaskTier, PixelType, Raster, Sensor,
};

// Readers and services
pub use io::gdal::{GdalError, GdalMetadata, GdalReader};
pub use io::sentinel2::L2aProduct;
pub use io::warp::{GdalWarp, Warper};

// High-level API re-exports
pub use api::{
    BatchReport, DatasetReport, process_dataset, process_dataset_with_warper, process_directory,
};
