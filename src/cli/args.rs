use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "s2uc",
    version,
    about = "Synthesize UltraCam channels from Sentinel-2 L2A reflectances"
)]
pub struct CliArgs {
    /// Directory holding the L2A dataset directories
    #[arg(short = 'p', long = "path")]
    pub path: Option<PathBuf>,

    /// Dataset identifier, e.g. SENTINEL2A_20230601-105857-000_L2A_T31TCJ_C_V3-1 (single mode)
    #[arg(short = 'n', long = "name")]
    pub name: Option<String>,

    /// Output root directory; one sub-directory is created per dataset
    #[arg(short = 'd', long = "dstpath")]
    pub dstpath: Option<PathBuf>,

    /// Batch mode: process every dataset under --path and continue past failures
    #[arg(long, default_value_t = false)]
    pub batch: bool,

    /// JSON file with pipeline parameters; command line flags take precedence
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Target CRS for reprojection (e.g. EPSG:2154)
    #[arg(long)]
    pub target_crs: Option<String>,

    /// gdalwarp resampling method (near, bilinear, cubic, average)
    #[arg(long)]
    pub warp_resampling: Option<String>,

    /// Keep synthesized channels in <dstpath>/<name>/tmp
    #[arg(long, default_value_t = false)]
    pub keep_intermediates: bool,

    /// Write the R1/R2 validity masks next to the intermediates
    #[arg(long, default_value_t = false)]
    pub write_masks: bool,

    /// Enable logging (filter with RUST_LOG, default info)
    #[arg(long, default_value_t = false)]
    pub log: bool,
}
