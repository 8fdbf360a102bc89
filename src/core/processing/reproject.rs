use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Error, Result};
use crate::io::gdal::{authority, is_projected, read_metadata};
use crate::io::warp::Warper;
use crate::types::{Channel, GeoReference, ReprojectedChannel};

/// Relative tolerance of the ground sample distance check.
pub const GSD_TOLERANCE: f64 = 1e-9;

/// `AUTHORITY:CODE` of a projected source CRS.
pub fn source_crs(georef: &GeoReference, path: &Path) -> Result<String> {
    if !is_projected(&georef.projection) {
        return Err(Error::UnresolvableCrs {
            path: path.to_path_buf(),
        });
    }
    authority(&georef.projection).ok_or_else(|| Error::UnresolvableCrs {
        path: path.to_path_buf(),
    })
}

/// Fail unless the output pixel width equals the source pixel width.
pub fn check_ground_sample_distance(source: &GeoReference, output: &GeoReference) -> Result<()> {
    let (src, dst) = (source.pixel_size().abs(), output.pixel_size().abs());
    if (dst - src).abs() <= GSD_TOLERANCE * src.abs() {
        Ok(())
    } else {
        Err(Error::GsdMismatch {
            source_gsd: src,
            output_gsd: dst,
        })
    }
}

/// Normalize a channel raster into `target_crs` at its own pixel size.
///
/// An unidentifiable source CRS is reported before the warp service is called.
pub fn reproject<W: Warper + ?Sized>(
    channel: Channel,
    src: &Path,
    dst: &Path,
    target_crs: &str,
    warper: &W,
) -> Result<ReprojectedChannel> {
    let source = read_metadata(src)?.georef();
    let crs = source_crs(&source, src)?;
    let pixel_size = source.pixel_size();
    info!(
        "Reprojecting {} channel {} -> {} at {} m",
        channel,
        crs,
        target_crs,
        pixel_size.abs()
    );

    warper.warp(src, dst, target_crs, pixel_size)?;

    let output = read_metadata(dst)?;
    let georef = output.georef();
    check_ground_sample_distance(&source, &georef)?;
    Ok(ReprojectedChannel {
        channel,
        path: PathBuf::from(dst),
        source_crs: crs,
        georef,
        nx: output.size_x,
        ny: output.size_y,
        pixel_type: output.pixel_type,
    })
}
