//! Validity masks from the per-pixel classification rasters of an L2A product.
//!
//! A pixel is valid when every classification raster of its tier reports zero: no cloud
//! (CLM), no geophysical flag (MG2), no saturation (SAT). The cloud mask is the primary
//! raster and fixes the grid of its tier.
use ndarray::{Array2, Zip};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::types::MaskTier;

/// Classification rasters shipped in the `MASKS/` directory.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Classification {
    /// Cloud mask (primary)
    Clm,
    /// Geophysical mask (water, snow, shadows, ...)
    Mg2,
    /// Saturation mask
    Sat,
}

impl Classification {
    /// Primary raster first.
    pub const ALL: [Classification; 3] = [
        Classification::Clm,
        Classification::Mg2,
        Classification::Sat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Clm => "CLM",
            Classification::Mg2 => "MG2",
            Classification::Sat => "SAT",
        }
    }
}

/// Source of classification rasters for one dataset.
pub trait ClassificationProvider {
    fn classification(&self, kind: Classification, tier: MaskTier) -> Result<Array2<u8>>;
}

/// Validity masks of both resolution tiers.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidityMasks {
    pub r1: Array2<bool>,
    pub r2: Array2<bool>,
}

impl ValidityMasks {
    pub fn get(&self, tier: MaskTier) -> &Array2<bool> {
        match tier {
            MaskTier::R1 => &self.r1,
            MaskTier::R2 => &self.r2,
        }
    }
}

/// AND in `raster == 0` for every raster of one grid.
pub fn combine_flags(rasters: &[Array2<u8>]) -> Result<Array2<bool>> {
    let (first, rest) = rasters
        .split_first()
        .ok_or_else(|| Error::Unsupported("no classification raster to combine".into()))?;
    let mut mask = first.mapv(|v| v == 0);
    for raster in rest {
        and_flag(&mut mask, raster, "classification raster")?;
    }
    Ok(mask)
}

fn and_flag(mask: &mut Array2<bool>, raster: &Array2<u8>, what: &str) -> Result<()> {
    if raster.dim() != mask.dim() {
        let (expected_ny, expected_nx) = mask.dim();
        let (ny, nx) = raster.dim();
        return Err(Error::GridMismatch {
            what: what.to_string(),
            expected_nx,
            expected_ny,
            nx,
            ny,
        });
    }
    Zip::from(mask).and(raster).for_each(|m, &v| *m = *m && v == 0);
    Ok(())
}

/// Build the mask of one tier from its CLM, MG2 and SAT rasters.
pub fn build_tier_mask<P: ClassificationProvider + ?Sized>(
    provider: &P,
    tier: MaskTier,
) -> Result<Array2<bool>> {
    let rasters = Classification::ALL
        .iter()
        .map(|kind| provider.classification(*kind, tier))
        .collect::<Result<Vec<_>>>()?;
    let mask = combine_flags(&rasters)?;
    let valid = mask.iter().filter(|&&m| m).count();
    debug!("Mask {}: {} of {} pixels valid", tier, valid, mask.len());
    Ok(mask)
}

/// Build the R1 and R2 validity masks of a dataset.
pub fn build_masks<P: ClassificationProvider + ?Sized>(provider: &P) -> Result<ValidityMasks> {
    let r1 = build_tier_mask(provider, MaskTier::R1)?;
    let r2 = build_tier_mask(provider, MaskTier::R2)?;
    info!(
        "Validity masks built: R1 {}x{}, R2 {}x{}",
        r1.ncols(),
        r1.nrows(),
        r2.ncols(),
        r2.nrows()
    );
    Ok(ValidityMasks { r1, r2 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use std::collections::HashMap;
    use std::path::PathBuf;

    struct InMemory(HashMap<(Classification, MaskTier), Array2<u8>>);

    impl ClassificationProvider for InMemory {
        fn classification(&self, kind: Classification, tier: MaskTier) -> Result<Array2<u8>> {
            self.0.get(&(kind, tier)).cloned().ok_or_else(|| Error::MissingInput {
                path: PathBuf::from(format!("{}_{}.tif", kind.as_str(), tier)),
            })
        }
    }

    fn sample_rasters() -> Vec<Array2<u8>> {
        vec![
            array![[0, 1, 0], [0, 0, 0]],
            array![[0, 0, 4], [0, 0, 0]],
            array![[0, 0, 0], [0, 0, 2]],
        ]
    }

    #[test]
    fn test_valid_only_where_all_flags_zero() {
        let mask = combine_flags(&sample_rasters()).unwrap();
        assert_eq!(mask, array![[true, false, false], [true, true, false]]);
    }

    #[test]
    fn test_composition_is_order_independent() {
        let r = sample_rasters();
        let forward = combine_flags(&r).unwrap();
        let reversed = combine_flags(&[r[2].clone(), r[1].clone(), r[0].clone()]).unwrap();
        let rotated = combine_flags(&[r[1].clone(), r[2].clone(), r[0].clone()]).unwrap();
        assert_eq!(forward, reversed);
        assert_eq!(forward, rotated);

        // (a & b) & c == a & (b & c)
        let ab = combine_flags(&r[..2]).unwrap();
        let bc = combine_flags(&r[1..]).unwrap();
        let left = Zip::from(&ab).and(&r[2]).map_collect(|&m, &v| m && v == 0);
        let right = Zip::from(&bc).and(&r[0]).map_collect(|&m, &v| m && v == 0);
        assert_eq!(left, right);
        assert_eq!(left, forward);
    }

    #[test]
    fn test_grid_mismatch_is_rejected() {
        let rasters: Vec<Array2<u8>> = vec![Array2::zeros((2, 2)), Array2::zeros((3, 2))];
        assert!(matches!(combine_flags(&rasters), Err(Error::GridMismatch { .. })));
    }

    #[test]
    fn test_build_masks_per_tier() {
        let mut map = HashMap::new();
        for kind in Classification::ALL {
            map.insert((kind, MaskTier::R1), Array2::<u8>::zeros((4, 4)));
            map.insert((kind, MaskTier::R2), Array2::<u8>::zeros((2, 2)));
        }
        map.get_mut(&(Classification::Sat, MaskTier::R2)).unwrap()[[1, 1]] = 1;
        let masks = build_masks(&InMemory(map)).unwrap();
        assert_eq!(masks.get(MaskTier::R1).dim(), (4, 4));
        assert!(masks.r1.iter().all(|&m| m));
        assert_eq!(masks.get(MaskTier::R2), &array![[true, true], [true, false]]);
    }

    #[test]
    fn test_tier_mask_ignores_which_raster_carries_a_flag() {
        let r = sample_rasters();
        let expected = combine_flags(&r).unwrap();
        // Same flags dealt to CLM/MG2/SAT in every rotation.
        for shift in 0..3 {
            let mut map = HashMap::new();
            for (i, kind) in Classification::ALL.into_iter().enumerate() {
                map.insert((kind, MaskTier::R1), r[(i + shift) % 3].clone());
            }
            let mask = build_tier_mask(&InMemory(map), MaskTier::R1).unwrap();
            assert_eq!(mask, expected);
        }
    }

    #[test]
    fn test_tier_grid_mismatch_is_rejected() {
        let mut map = HashMap::new();
        map.insert((Classification::Clm, MaskTier::R2), Array2::<u8>::zeros((2, 2)));
        map.insert((Classification::Mg2, MaskTier::R2), Array2::<u8>::zeros((2, 2)));
        map.insert((Classification::Sat, MaskTier::R2), Array2::<u8>::zeros((4, 4)));
        assert!(matches!(
            build_tier_mask(&InMemory(map), MaskTier::R2),
            Err(Error::GridMismatch { .. })
        ));
    }

    #[test]
    fn test_missing_classification_is_fatal() {
        let mut map = HashMap::new();
        map.insert((Classification::Clm, MaskTier::R1), Array2::<u8>::zeros((2, 2)));
        let err = build_masks(&InMemory(map)).unwrap_err();
        assert!(matches!(err, Error::MissingInput { .. }));
    }
}
