//! Sensor-specific UltraCam calibration coefficients.
//!
//! The table is built once, on first access, and is read-only afterwards. Every
//! channel synthesis goes through [`coefficients`], so the table is always populated
//! before the first band is combined.
use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::types::{BandName, Channel, MaskTier, Sensor};

/// Linear combination weights for one (sensor, channel) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientSet {
    /// Ordered (band, weight) pairs.
    pub terms: Vec<(BandName, f64)>,
    /// Band whose native grid defines the output grid of the channel.
    pub reference: BandName,
    /// Validity mask tier matching the reference band's resolution.
    pub mask_tier: MaskTier,
}

impl CoefficientSet {
    fn new(bands: &[BandName], weights: &[f64], reference: BandName, mask_tier: MaskTier) -> Self {
        debug_assert_eq!(bands.len(), weights.len());
        Self {
            terms: bands.iter().copied().zip(weights.iter().copied()).collect(),
            reference,
            mask_tier,
        }
    }

    pub fn bands(&self) -> impl Iterator<Item = BandName> + '_ {
        self.terms.iter().map(|(b, _)| *b)
    }

    pub fn weights(&self) -> impl Iterator<Item = f64> + '_ {
        self.terms.iter().map(|(_, w)| *w)
    }

    pub fn weight_of(&self, band: BandName) -> Option<f64> {
        self.terms.iter().find(|(b, _)| *b == band).map(|(_, w)| *w)
    }
}

use BandName::*;

const BLUE_BANDS: [BandName; 1] = [B2];
const GREEN_BANDS: [BandName; 3] = [B2, B3, B4];
const RED_BANDS: [BandName; 3] = [B3, B4, B5];
const NIR_BANDS: [BandName; 5] = [B4, B5, B6, B7, B8A];

const S2A_BLUE: [f64; 1] = [0.97086669];
const S2B_BLUE: [f64; 1] = [0.97129836];
const S2A_GREEN: [f64; 3] = [0.34913303, 0.63495627, 0.01866673];
const S2B_GREEN: [f64; 3] = [0.34435740, 0.63423135, 0.02418108];
const S2A_RED: [f64; 3] = [0.21497731, 0.75052792, 0.03294420];
const S2B_RED: [f64; 3] = [0.21389771, 0.74952970, 0.03500057];
const S2A_NIR: [f64; 5] = [0.02496498, 0.22020289, 0.27045367, 0.20769001, 0.27688184];
const S2B_NIR: [f64; 5] = [0.02510620, 0.21460815, 0.26341978, 0.21363374, 0.28344226];

static CALIBRATION: Lazy<HashMap<(Sensor, Channel), CoefficientSet>> = Lazy::new(|| {
    let mut table = HashMap::with_capacity(8);
    for sensor in Sensor::ALL {
        let (blue, green, red, nir): (&[f64], &[f64], &[f64], &[f64]) = match sensor {
            Sensor::A => (&S2A_BLUE, &S2A_GREEN, &S2A_RED, &S2A_NIR),
            Sensor::B => (&S2B_BLUE, &S2B_GREEN, &S2B_RED, &S2B_NIR),
        };
        table.insert(
            (sensor, Channel::Blue),
            CoefficientSet::new(&BLUE_BANDS, blue, B2, MaskTier::R1),
        );
        table.insert(
            (sensor, Channel::Green),
            CoefficientSet::new(&GREEN_BANDS, green, B2, MaskTier::R1),
        );
        table.insert(
            (sensor, Channel::Red),
            CoefficientSet::new(&RED_BANDS, red, B5, MaskTier::R2),
        );
        table.insert(
            (sensor, Channel::Nir),
            CoefficientSet::new(&NIR_BANDS, nir, B8A, MaskTier::R2),
        );
    }
    table
});

/// Coefficient set for a sensor and output channel.
pub fn coefficients(sensor: Sensor, channel: Channel) -> &'static CoefficientSet {
    // Every (sensor, channel) pair is inserted above.
    &CALIBRATION[&(sensor, channel)]
}
