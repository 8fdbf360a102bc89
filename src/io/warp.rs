//! Reprojection service backed by the `gdalwarp` executable.
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Warp a raster file to a target CRS at a fixed pixel size.
pub trait Warper {
    fn warp(&self, src: &Path, dst: &Path, target_crs: &str, pixel_size: f64) -> Result<()>;
}

/// `gdalwarp -t_srs <crs> -tr <ps> <ps>` on the command line.
#[derive(Debug, Clone)]
pub struct GdalWarp {
    /// Executable to run
    pub program: String,
    /// `-r` resampling method
    pub resampling: String,
}

impl Default for GdalWarp {
    fn default() -> Self {
        Self {
            program: "gdalwarp".to_string(),
            resampling: "near".to_string(),
        }
    }
}

impl GdalWarp {
    pub fn with_resampling(resampling: &str) -> Self {
        Self {
            resampling: resampling.to_string(),
            ..Self::default()
        }
    }

    pub fn args(&self, src: &Path, dst: &Path, target_crs: &str, pixel_size: f64) -> Vec<String> {
        let ps = pixel_size.abs().to_string();
        vec![
            "-of".into(),
            "GTiff".into(),
            "-overwrite".into(),
            "-r".into(),
            self.resampling.clone(),
            "-t_srs".into(),
            target_crs.to_string(),
            "-tr".into(),
            ps.clone(),
            ps,
            src.to_string_lossy().into_owned(),
            dst.to_string_lossy().into_owned(),
        ]
    }
}

impl Warper for GdalWarp {
    fn warp(&self, src: &Path, dst: &Path, target_crs: &str, pixel_size: f64) -> Result<()> {
        let dst_dir = dst.parent().unwrap_or_else(|| Path::new("."));
        // Warp into a temporary file next to the destination so a failed run never
        // leaves a truncated output behind.
        let tmp_file = tempfile::Builder::new()
            .prefix(".warp_")
            .suffix(".tif")
            .tempfile_in(dst_dir)?;
        let args = self.args(src, tmp_file.path(), target_crs, pixel_size);
        debug!("{} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|e| Error::Warp(format!("{} exec error: {}", self.program, e)))?;
        if !output.status.success() {
            return Err(Error::Warp(format!(
                "{} failed ({}): {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        tmp_file.persist(dst).map_err(|e| Error::Io(e.error))?;
        info!("Warped {:?} -> {:?} ({}, {} m)", src, dst, target_crs, pixel_size.abs());
        Ok(())
    }
}
