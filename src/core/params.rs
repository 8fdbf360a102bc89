use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Canonical CRS of every reprojected output (Lambert-93).
pub const DEFAULT_TARGET_CRS: &str = "EPSG:2154";

/// Pipeline parameters suitable for config files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParams {
    /// Target CRS handed to the warp service
    pub target_crs: String,
    /// Suffix of the reflectance files, `<dataset>_<suffix>_<band>.tif`
    pub product_suffix: String,
    /// `gdalwarp -r` resampling method
    pub warp_resampling: String,
    /// File name of the RGB composite inside the dataset output directory
    pub composite_name: String,
    /// Keep the `tmp/` directory content after a successful run
    pub keep_intermediates: bool,
    /// Persist the validity masks next to the synthesized channels
    pub write_masks: bool,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            target_crs: DEFAULT_TARGET_CRS.to_string(),
            product_suffix: "FRE".to_string(),
            warp_resampling: "near".to_string(),
            composite_name: "rgb16.tif".to_string(),
            keep_intermediates: false,
            write_masks: false,
        }
    }
}

impl PipelineParams {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Header shared by all band files of a dataset, e.g. `<dataset>_FRE`.
    pub fn header(&self, dataset: &str) -> String {
        format!("{}_{}", dataset, self.product_suffix)
    }

    /// Prefix of reprojected outputs, e.g. `epsg2154` for `EPSG:2154`.
    pub fn output_prefix(&self) -> String {
        self.target_crs.replace(':', "").to_ascii_lowercase()
    }
}
