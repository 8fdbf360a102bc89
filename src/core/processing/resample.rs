use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer, images::Image};
use ndarray::Array2;
use tracing::debug;

use crate::error::{Error, Result};

/// Coverage weights of a 1D area reduction from `src` to `dst` cells (`dst <= src`).
///
/// Output cell `i` spans `[i * scale, (i + 1) * scale)` in source units; each source
/// cell contributes the fraction of that span it covers.
fn area_weights(src: usize, dst: usize) -> Vec<Vec<(usize, f64)>> {
    let scale = src as f64 / dst as f64;
    (0..dst)
        .map(|i| {
            let start = i as f64 * scale;
            let end = start + scale;
            let first = start.floor() as usize;
            let last = (end.ceil() as usize).min(src);
            (first..last)
                .filter_map(|j| {
                    let overlap = end.min((j + 1) as f64) - start.max(j as f64);
                    (overlap > 1e-12).then_some((j, overlap / scale))
                })
                .collect()
        })
        .collect()
}

/// Area-average downsampling, separable over columns then rows, in f64.
fn area_reduce(array: &Array2<f64>, target_nx: usize, target_ny: usize) -> Array2<f64> {
    let (ny, nx) = array.dim();
    let wx = area_weights(nx, target_nx);
    let wy = area_weights(ny, target_ny);
    let rows = Array2::from_shape_fn((ny, target_nx), |(r, i)| {
        wx[i].iter().map(|&(j, w)| w * array[[r, j]]).sum::<f64>()
    });
    Array2::from_shape_fn((target_ny, target_nx), |(k, i)| {
        wy[k].iter().map(|&(r, w)| w * rows[[r, i]]).sum::<f64>()
    })
}

/// Bilinear enlargement through fast_image_resize on `F32` pixels.
fn bilinear_enlarge(
    array: &Array2<f64>,
    target_nx: usize,
    target_ny: usize,
) -> Result<Array2<f64>> {
    let (ny, nx) = array.dim();
    let resize_options =
        ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear));
    let mut resizer = Resizer::new();

    // fast_image_resize works on raw little-endian bytes
    let mut src_bytes = Vec::with_capacity(nx * ny * 4);
    for &v in array.iter() {
        src_bytes.extend_from_slice(&(v as f32).to_le_bytes());
    }

    let src_image = Image::from_vec_u8(nx as u32, ny as u32, src_bytes, PixelType::F32)
        .map_err(Error::resample)?;
    let mut dst_image = Image::new(target_nx as u32, target_ny as u32, PixelType::F32);
    resizer
        .resize(&src_image, &mut dst_image, &resize_options)
        .map_err(Error::resample)?;

    let out: Vec<f64> = dst_image
        .into_vec()
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]) as f64)
        .collect();
    Array2::from_shape_vec((target_ny, target_nx), out).map_err(Error::resample)
}

/// Resize a 2D array to `target_nx` x `target_ny` with area averaging.
///
/// When both axes shrink, every output pixel is the coverage-weighted mean of the source
/// pixels under it, fractional overlaps included. When either axis grows, area averaging
/// degenerates to interpolation and bilinear enlargement is used instead. When the grid
/// already matches, the input is returned unchanged.
pub fn resample(array: &Array2<f64>, target_nx: usize, target_ny: usize) -> Result<Array2<f64>> {
    let (ny, nx) = array.dim();
    if (nx, ny) == (target_nx, target_ny) {
        return Ok(array.clone());
    }
    if target_nx == 0 || target_ny == 0 || nx == 0 || ny == 0 {
        return Err(Error::Resample(format!(
            "cannot resample {}x{} to {}x{}",
            nx, ny, target_nx, target_ny
        )));
    }
    debug!("Area resampling {}x{} -> {}x{}", nx, ny, target_nx, target_ny);

    if target_nx <= nx && target_ny <= ny {
        Ok(area_reduce(array, target_nx, target_ny))
    } else {
        bilinear_enlarge(array, target_nx, target_ny)
    }
}

/// Resample only when the grid differs from the reference grid.
pub fn resample_to_grid(
    array: Array2<f64>,
    target_nx: usize,
    target_ny: usize,
) -> Result<Array2<f64>> {
    if array.dim() == (target_ny, target_nx) {
        Ok(array)
    } else {
        resample(&array, target_nx, target_ny)
    }
}
