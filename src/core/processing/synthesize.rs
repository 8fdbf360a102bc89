//! UltraCam channel synthesis.
//!
//! One routine serves all four channels: the calibration table decides which bands are
//! combined, which of them defines the output grid and which validity mask applies.
use ndarray::{Array2, Zip};
use tracing::{debug, info};

use crate::core::calibration::coefficients;
use crate::core::processing::mask::ValidityMasks;
use crate::core::processing::resample::resample_to_grid;
use crate::error::{Error, Result};
use crate::types::{
    BandName, Channel, INVALID_VALUE, Raster, Sensor, SpectralBand, SynthesizedChannel,
};

/// Source of spectral bands for one dataset.
pub trait BandProvider {
    fn band(&self, name: BandName) -> Result<SpectralBand>;
}

/// Overwrite every pixel that is non-positive or masked out with [`INVALID_VALUE`].
///
/// NaN fails the positivity test and is invalidated as well.
pub fn apply_validity(result: &mut Array2<f64>, mask: &Array2<bool>) -> Result<()> {
    if result.dim() != mask.dim() {
        let (expected_ny, expected_nx) = result.dim();
        let (ny, nx) = mask.dim();
        return Err(Error::GridMismatch {
            what: "validity mask".to_string(),
            expected_nx,
            expected_ny,
            nx,
            ny,
        });
    }
    Zip::from(result).and(mask).for_each(|r, &valid| {
        if !(*r > 0.0 && valid) {
            *r = INVALID_VALUE;
        }
    });
    Ok(())
}

/// Synthesize one UltraCam channel.
///
/// `sensor_code` is the raw platform character of the dataset; anything but `A` or `B`
/// fails before a single band is read. Bands are loaded one at a time and accumulated
/// into the running result, so at most one input band is held next to it.
pub fn synthesize<P: BandProvider + ?Sized>(
    channel: Channel,
    sensor_code: char,
    provider: &P,
    masks: &ValidityMasks,
) -> Result<SynthesizedChannel> {
    let sensor = Sensor::from_code(sensor_code)?;
    let set = coefficients(sensor, channel);
    let reference_weight = set.weight_of(set.reference).ok_or_else(|| {
        Error::Unsupported(format!("{} is not part of the {} combination", set.reference, channel))
    })?;

    let reference = provider.band(set.reference)?;
    let Raster {
        data: mut result,
        georef,
        pixel_type,
    } = reference.raster;
    let (ny, nx) = result.dim();
    debug!(
        "{} channel: reference {} {}x{} ({})",
        channel, set.reference, nx, ny, pixel_type
    );
    result.mapv_inplace(|v| v * reference_weight);

    for (name, weight) in set.terms.iter().filter(|(b, _)| *b != set.reference) {
        let band = provider.band(*name)?;
        let data = resample_to_grid(band.raster.data, nx, ny)?;
        result.scaled_add(*weight, &data);
    }

    apply_validity(&mut result, masks.get(set.mask_tier))?;
    info!("UltraCam {} channel done (sensor {})", channel, sensor);

    Ok(SynthesizedChannel {
        channel,
        sensor,
        raster: Raster {
            data: result,
            georef,
            pixel_type,
        },
    })
}
