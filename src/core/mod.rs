//! Core processing building blocks: calibration table, validity masks, area
//! resampling, channel synthesis, reprojection and the RGB composite. These are
//! the primitives consumed by the high-level `api` module.
pub mod calibration;
pub mod params;
pub mod processing;
