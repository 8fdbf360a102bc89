use ndarray::Array2;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tiff::decoder::{Decoder, DecodingResult};
use tracing::info;

use crate::core::processing::mask::{Classification, ClassificationProvider};
use crate::core::processing::synthesize::BandProvider;
use crate::error::{Error, Result};
use crate::io::gdal::read_raster;
use crate::types::{BandName, MaskTier, Sensor, SpectralBand};

/// One Sentinel-2 L2A dataset directory.
///
/// Layout:
/// - `<root>/<header>_<band>.tif` with `header = <dataset>_<suffix>`
/// - `<root>/MASKS/<dataset>_<CLM|MG2|SAT>_<R1|R2>.tif`
#[derive(Debug, Clone)]
pub struct L2aProduct {
    pub root: PathBuf,
    pub dataset: String,
    pub header: String,
}

impl L2aProduct {
    /// Locate `<src_root>/<dataset>`; a missing directory is fatal.
    pub fn open<P: AsRef<Path>>(src_root: P, dataset: &str, product_suffix: &str) -> Result<Self> {
        let root = src_root.as_ref().join(dataset);
        if !root.is_dir() {
            return Err(Error::MissingDataset { path: root });
        }
        Ok(Self {
            root,
            dataset: dataset.to_string(),
            header: format!("{}_{}", dataset, product_suffix),
        })
    }

    pub fn band_path(&self, band: BandName) -> PathBuf {
        self.root.join(format!("{}_{}.tif", self.header, band))
    }

    pub fn mask_path(&self, kind: Classification, tier: MaskTier) -> PathBuf {
        self.root
            .join("MASKS")
            .join(format!("{}_{}_{}.tif", self.dataset, kind.as_str(), tier))
    }

    /// Raw platform character of the dataset name.
    pub fn sensor_code(&self) -> Result<char> {
        Sensor::code_from_dataset_name(&self.dataset)
    }
}

fn require_file(path: PathBuf) -> Result<PathBuf> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(Error::MissingInput { path })
    }
}

/// Decode a single-sample classification TIFF into a byte grid.
///
/// Wider integer samples are reduced to 0 / 1, which keeps the zero test intact.
pub fn read_byte_grid(path: &Path) -> Result<Array2<u8>> {
    let file = File::open(path)?;
    let mut decoder = Decoder::new(BufReader::new(file))?;
    let (width, height) = decoder.dimensions()?;
    let data: Vec<u8> = match decoder.read_image()? {
        DecodingResult::U8(buf) => buf,
        DecodingResult::U16(buf) => buf.into_iter().map(|v| u8::from(v != 0)).collect(),
        DecodingResult::U32(buf) => buf.into_iter().map(|v| u8::from(v != 0)).collect(),
        _ => {
            return Err(Error::Unsupported(format!(
                "classification raster {:?} is not an unsigned integer image",
                path
            )));
        }
    };
    let len = data.len();
    Array2::from_shape_vec((height as usize, width as usize), data).map_err(|_| {
        Error::Unsupported(format!(
            "classification raster {:?}: {} samples for {}x{} pixels",
            path, len, width, height
        ))
    })
}

impl BandProvider for L2aProduct {
    fn band(&self, name: BandName) -> Result<SpectralBand> {
        let path = require_file(self.band_path(name))?;
        info!("Loading band {} from {:?}", name, path);
        let raster = read_raster(&path)?;
        Ok(SpectralBand { name, raster })
    }
}

impl ClassificationProvider for L2aProduct {
    fn classification(&self, kind: Classification, tier: MaskTier) -> Result<Array2<u8>> {
        let path = require_file(self.mask_path(kind, tier))?;
        info!("Loading {} mask {} from {:?}", kind.as_str(), tier, path);
        read_byte_grid(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiff::encoder::{TiffEncoder, colortype};

    const NAME: &str = "SENTINEL2B_20230203-104806-123_L2A_T31TCJ_C_V3-1";

    fn write_u8_tiff(path: &Path, width: u32, height: u32, data: &[u8]) {
        let file = File::create(path).unwrap();
        let mut encoder = TiffEncoder::new(file).unwrap();
        encoder
            .write_image::<colortype::Gray8>(width, height, data)
            .unwrap();
    }

    #[test]
    fn test_layout_paths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(NAME)).unwrap();
        let product = L2aProduct::open(dir.path(), NAME, "FRE").unwrap();
        assert_eq!(product.sensor_code().unwrap(), 'B');
        assert_eq!(
            product.band_path(BandName::B8A),
            dir.path().join(NAME).join(format!("{}_FRE_B8A.tif", NAME))
        );
        assert_eq!(
            product.mask_path(Classification::Mg2, MaskTier::R2),
            dir.path()
                .join(NAME)
                .join("MASKS")
                .join(format!("{}_MG2_R2.tif", NAME))
        );
    }

    #[test]
    fn test_missing_dataset() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            L2aProduct::open(dir.path(), NAME, "FRE"),
            Err(Error::MissingDataset { .. })
        ));
    }

    #[test]
    fn test_missing_band_is_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(NAME)).unwrap();
        let product = L2aProduct::open(dir.path(), NAME, "FRE").unwrap();
        assert!(matches!(
            product.band(BandName::B2),
            Err(Error::MissingInput { .. })
        ));
        assert!(matches!(
            product.classification(Classification::Clm, MaskTier::R1),
            Err(Error::MissingInput { .. })
        ));
    }

    #[test]
    fn test_read_byte_grid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clm.tif");
        write_u8_tiff(&path, 3, 2, &[0, 1, 0, 0, 0, 64]);
        let grid = read_byte_grid(&path).unwrap();
        assert_eq!(grid.dim(), (2, 3));
        assert_eq!(grid[[0, 1]], 1);
        assert_eq!(grid[[1, 2]], 64);
        assert_eq!(grid[[1, 0]], 0);
    }
}
