use ndarray::Array2;
use tracing::info;

use crate::core::processing::resample::resample_to_grid;
use crate::error::Result;
use crate::types::{Raster, VisualComposite};

/// Stack R, G, B on the Red channel's grid.
///
/// Green and Blue are area-resampled to Red's size when they differ; no reprojection
/// happens here. The composite keeps Red's georeference and pixel type.
pub fn build_composite(red: Raster, green: Raster, blue: Raster) -> Result<VisualComposite> {
    let (nx, ny) = (red.nx(), red.ny());
    let green: Array2<f64> = resample_to_grid(green.data, nx, ny)?;
    let blue: Array2<f64> = resample_to_grid(blue.data, nx, ny)?;
    info!("Visual composite assembled on a {}x{} grid", nx, ny);
    Ok(VisualComposite {
        red: red.data,
        green,
        blue,
        georef: red.georef,
        pixel_type: red.pixel_type,
    })
}
