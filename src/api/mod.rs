//! High-level, ergonomic library API: run one Sentinel-2 L2A dataset through the
//! whole UltraCam pipeline, or every dataset of a directory. Prefer these entrypoints
//! over the low-level processing modules when integrating the crate.
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::core::params::PipelineParams;
use crate::core::processing::composite::build_composite;
use crate::core::processing::mask::build_masks;
use crate::core::processing::reproject::reproject;
use crate::core::processing::synthesize::synthesize;
use crate::error::{Error, Result, StageExt};
use crate::io::gdal::read_raster;
use crate::io::sentinel2::L2aProduct;
use crate::io::warp::{GdalWarp, Warper};
use crate::io::writers::metadata::embed_channel_metadata;
use crate::io::writers::tiff::{write_geotiff, write_mask_u8, write_rgb_geotiff};
use crate::types::{
    Channel, INVALID_VALUE, MaskTier, ReprojectedChannel, Sensor, SynthesizedChannel,
};

/// Outputs of one successful dataset run
#[derive(Debug, Clone)]
pub struct DatasetReport {
    pub dataset: String,
    pub sensor: Sensor,
    /// Reprojected channel files, Blue, Green, Red, NIR
    pub channels: Vec<(Channel, PathBuf)>,
    pub composite: PathBuf,
}

/// Summary of a directory run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// Write a synthesized channel with the invalid marker as no-data value.
pub fn write_channel(path: &Path, channel: &SynthesizedChannel) -> Result<()> {
    let raster = &channel.raster;
    let mut ds = write_geotiff(
        path,
        &[&raster.data],
        &raster.georef,
        raster.pixel_type,
        Some(INVALID_VALUE),
    )?;
    embed_channel_metadata(&mut ds, channel.channel, channel.sensor)?;
    Ok(())
}

fn remove_intermediates(tmp: &Path) -> Result<()> {
    for entry in fs::read_dir(tmp)? {
        let path = entry?.path();
        let is_tif = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("tif"));
        if is_tif {
            fs::remove_file(&path)?;
        }
    }
    if fs::read_dir(tmp)?.next().is_none() {
        fs::remove_dir(tmp)?;
    }
    Ok(())
}

/// Process `<src_root>/<dataset>` into `<dst_root>/<dataset>` using `gdalwarp`.
pub fn process_dataset(
    src_root: &Path,
    dataset: &str,
    dst_root: &Path,
    params: &PipelineParams,
) -> Result<DatasetReport> {
    let warper = GdalWarp::with_resampling(&params.warp_resampling);
    process_dataset_with_warper(src_root, dataset, dst_root, params, &warper)
}

/// Process one dataset with a caller-provided warp service.
///
/// Any failure aborts the dataset. Files already written are left in place; the
/// temporary directory is only cleaned on success.
pub fn process_dataset_with_warper<W: Warper + ?Sized>(
    src_root: &Path,
    dataset: &str,
    dst_root: &Path,
    params: &PipelineParams,
    warper: &W,
) -> Result<DatasetReport> {
    let product = L2aProduct::open(src_root, dataset, &params.product_suffix).stage("input check")?;
    let sensor_code = product.sensor_code().stage("input check")?;
    let dst = dst_root.join(dataset);
    let tmp = dst.join("tmp");
    fs::create_dir_all(&tmp).map_err(Error::from).stage("output setup")?;
    info!("Input: {:?}", product.root);
    info!("Output: {:?}", dst);

    info!("- Create mask image");
    let masks = build_masks(&product).stage("mask creation")?;
    if params.write_masks {
        for tier in MaskTier::ALL {
            write_mask_u8(&tmp.join(format!("mask_{}.tif", tier)), masks.get(tier))
                .map_err(Error::from)
                .stage("mask creation")?;
        }
    }

    info!("- Band transformation");
    let mut synthesized = Vec::with_capacity(Channel::ALL.len());
    let mut sensor = None;
    for channel in Channel::ALL {
        let uc = synthesize(channel, sensor_code, &product, &masks).stage("band transformation")?;
        let path = tmp.join(format!("{}_{}.tif", product.header, channel.file_tag()));
        write_channel(&path, &uc).stage("band transformation")?;
        sensor = Some(uc.sensor);
        synthesized.push((channel, path));
    }
    drop(masks);

    info!("- Change projection");
    let prefix = params.output_prefix();
    let mut channels = Vec::with_capacity(synthesized.len());
    let (mut red, mut green, mut blue): (
        Option<ReprojectedChannel>,
        Option<ReprojectedChannel>,
        Option<ReprojectedChannel>,
    ) = (None, None, None);
    for (channel, src) in &synthesized {
        let out = dst.join(format!("{}_{}_{}.tif", prefix, product.header, channel.file_tag()));
        let reprojected =
            reproject(*channel, src, &out, &params.target_crs, warper).stage("reprojection")?;
        channels.push((*channel, out));
        match channel {
            Channel::Red => red = Some(reprojected),
            Channel::Green => green = Some(reprojected),
            Channel::Blue => blue = Some(reprojected),
            Channel::Nir => {}
        }
    }

    if params.keep_intermediates {
        info!("- Keeping temporary files in {:?}", tmp);
    } else {
        info!("- Remove tmp files");
        remove_intermediates(&tmp).stage("cleanup")?;
    }

    let (Some(red), Some(green), Some(blue), Some(sensor)) = (red, green, blue, sensor) else {
        return Err(Error::Unsupported(format!("incomplete channel set for {}", dataset)));
    };
    let composite = read_raster(&red.path)
        .and_then(|r| Ok((r, read_raster(&green.path)?, read_raster(&blue.path)?)))
        .map_err(Error::from)
        .and_then(|(r, g, b)| build_composite(r, g, b))
        .stage("composite")?;
    let composite_path = dst.join(&params.composite_name);
    write_rgb_geotiff(
        &composite_path,
        composite.bands(),
        &composite.georef,
        composite.pixel_type,
    )
    .map_err(Error::from)
    .stage("composite")?;
    info!("Dataset {} done", dataset);

    Ok(DatasetReport {
        dataset: dataset.to_string(),
        sensor,
        channels,
        composite: composite_path,
    })
}

/// Process every dataset directory under `src_root`.
///
/// With `continue_on_error`, failing datasets are counted and skipped; otherwise the
/// first failure is returned.
pub fn process_directory(
    src_root: &Path,
    dst_root: &Path,
    params: &PipelineParams,
    continue_on_error: bool,
) -> Result<BatchReport> {
    fs::create_dir_all(dst_root)?;
    let mut report = BatchReport::default();
    let mut entries: Vec<PathBuf> = fs::read_dir(src_root)?
        .map(|e| e.map(|e| e.path()))
        .collect::<std::io::Result<_>>()?;
    entries.sort();

    for path in entries {
        let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
            report.skipped += 1;
            continue;
        };
        if !path.is_dir() {
            info!("Skipping non-directory: {:?}", path);
            report.skipped += 1;
            continue;
        }
        info!("Processing: {}", name);
        match process_dataset(src_root, &name, dst_root, params) {
            Ok(_) => report.processed += 1,
            Err(e) if continue_on_error => {
                warn!("Error processing {}: {}", name, e);
                report.errors += 1;
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        "Batch complete: processed={} skipped={} errors={}",
        report.processed, report.skipped, report.errors
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::gdal::read_metadata;
    use crate::types::{BandName, GeoReference, PixelType};
    use gdal::spatial_ref::SpatialRef;
    use ndarray::Array2;
    use tiff::encoder::{TiffEncoder, colortype};

    const NAME_A: &str = "SENTINEL2A_20230601-105857-000_L2A_T31TCJ_C_V3-1";

    /// Copies the synthesized channel unchanged, standing in for `gdalwarp`.
    struct CopyWarper;

    impl Warper for CopyWarper {
        fn warp(&self, src: &Path, dst: &Path, _crs: &str, _ps: f64) -> Result<()> {
            fs::copy(src, dst)?;
            Ok(())
        }
    }

    fn write_masks(src_root: &Path, name: &str) {
        let dir = src_root.join(name).join("MASKS");
        fs::create_dir_all(&dir).unwrap();
        for kind in ["CLM", "MG2", "SAT"] {
            for (tier, n) in [("R1", 4u32), ("R2", 2u32)] {
                let file = fs::File::create(dir.join(format!("{}_{}_{}.tif", name, kind, tier)));
                let mut encoder = TiffEncoder::new(file.unwrap()).unwrap();
                let zeros = vec![0u8; (n * n) as usize];
                encoder.write_image::<colortype::Gray8>(n, n, &zeros).unwrap();
            }
        }
    }

    /// A 40 m x 40 m UTM 31N scene: 10 m bands on 4x4, 20 m bands on 2x2, no flags.
    fn write_dataset(src_root: &Path, name: &str) {
        write_masks(src_root, name);
        let projection = SpatialRef::from_epsg(32631).unwrap().to_wkt().unwrap();
        let bands = [
            (BandName::B2, 10.0, 1000.0),
            (BandName::B3, 10.0, 2000.0),
            (BandName::B4, 10.0, 500.0),
            (BandName::B5, 20.0, 3000.0),
            (BandName::B6, 20.0, 3100.0),
            (BandName::B7, 20.0, 3200.0),
            (BandName::B8A, 20.0, 3300.0),
        ];
        for (band, ps, value) in bands {
            let n = (40.0 / ps) as usize;
            let georef = GeoReference {
                geotransform: [600000.0, ps, 0.0, 4900000.0, 0.0, -ps],
                projection: projection.clone(),
            };
            let path = src_root.join(name).join(format!("{}_FRE_{}.tif", name, band));
            let data = Array2::from_elem((n, n), value);
            drop(write_geotiff(&path, &[&data], &georef, PixelType::I16, None).unwrap());
        }
    }

    #[test]
    fn test_dataset_produces_channels_and_composite() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        write_dataset(src.path(), NAME_A);

        let params = PipelineParams::default();
        let report =
            process_dataset_with_warper(src.path(), NAME_A, dst.path(), &params, &CopyWarper)
                .unwrap();
        assert_eq!(report.sensor, Sensor::A);

        let out = dst.path().join(NAME_A);
        let tags: Vec<&str> = report.channels.iter().map(|(c, _)| c.code()).collect();
        assert_eq!(tags, ["B", "G", "R", "N"]);
        for (channel, path) in &report.channels {
            let expected = out.join(format!("epsg2154_{}_FRE_UC.{}.tif", NAME_A, channel.code()));
            assert_eq!(path, &expected);
            let meta = read_metadata(path).unwrap();
            let size = if matches!(channel, Channel::Blue | Channel::Green) { 4 } else { 2 };
            assert_eq!((meta.size_x, meta.size_y), (size, size));
        }

        assert_eq!(report.composite, out.join("rgb16.tif"));
        let rgb = read_metadata(&report.composite).unwrap();
        assert_eq!(rgb.bands, 3);
        assert_eq!((rgb.size_x, rgb.size_y), (2, 2));
        assert_eq!(rgb.geotransform[1], 20.0);
        assert_eq!(rgb.pixel_type, PixelType::I16);

        assert!(!out.join("tmp").exists());
    }

    #[test]
    fn test_intermediates_and_masks_can_be_kept() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        write_dataset(src.path(), NAME_A);

        let params = PipelineParams {
            keep_intermediates: true,
            write_masks: true,
            ..PipelineParams::default()
        };
        process_dataset_with_warper(src.path(), NAME_A, dst.path(), &params, &CopyWarper).unwrap();

        let tmp = dst.path().join(NAME_A).join("tmp");
        for channel in Channel::ALL {
            let path = tmp.join(format!("{}_FRE_{}.tif", NAME_A, channel.file_tag()));
            assert!(path.is_file(), "missing {:?}", path);
        }
        assert!(tmp.join("mask_R1.tif").is_file());
        assert!(tmp.join("mask_R2.tif").is_file());
    }

    #[test]
    fn test_missing_dataset_names_input_stage() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let err = process_dataset(
            src.path(),
            "SENTINEL2A_missing",
            dst.path(),
            &PipelineParams::default(),
        )
        .unwrap_err();
        match err {
            Error::Stage { stage, source } => {
                assert_eq!(stage, "input check");
                assert!(matches!(*source, Error::MissingDataset { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!dst.path().join("SENTINEL2A_missing").exists());
    }

    #[test]
    fn test_unwritable_output_names_setup_stage() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        write_masks(src.path(), NAME_A);
        let not_a_dir = dst.path().join("occupied");
        fs::write(&not_a_dir, "file").unwrap();

        let err = process_dataset(src.path(), NAME_A, &not_a_dir, &PipelineParams::default())
            .unwrap_err();
        match err {
            Error::Stage { stage, source } => {
                assert_eq!(stage, "output setup");
                assert!(matches!(*source, Error::Io(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_sensor_writes_no_channel() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let name = "SENTINEL2C_20250101-000000-000_L2A_T31TCJ_C_V3-1";
        // Masks are all valid; no band files are needed to reach the sensor check.
        write_masks(src.path(), name);

        let err = process_dataset(src.path(), name, dst.path(), &PipelineParams::default())
            .unwrap_err();
        match err {
            Error::Stage { stage, source } => {
                assert_eq!(stage, "band transformation");
                assert!(matches!(*source, Error::UnknownSensor { code: 'C' }));
            }
            other => panic!("unexpected error: {other}"),
        }
        let tmp = dst.path().join(name).join("tmp");
        assert_eq!(fs::read_dir(tmp).unwrap().count(), 0);
    }

    #[test]
    fn test_batch_skips_files_and_counts_errors() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        fs::write(src.path().join("README.txt"), "not a dataset").unwrap();
        fs::create_dir(src.path().join("SENTINEL2A_empty")).unwrap();

        let params = PipelineParams::default();
        let report = process_directory(src.path(), dst.path(), &params, true).unwrap();
        assert_eq!(
            report,
            BatchReport {
                processed: 0,
                skipped: 1,
                errors: 1
            }
        );
        assert!(process_directory(src.path(), dst.path(), &params, false).is_err());
    }
}
