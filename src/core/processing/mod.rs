pub mod composite;
pub mod mask;
pub mod reproject;
pub mod resample;
pub mod synthesize;
