//! Shared types and enums used across the crate.
//! Includes `Sensor`, `Channel`, `BandName`, `MaskTier`, `PixelType`, and the raster
//! payloads flowing through the pipeline (`Raster`, `SpectralBand`, `SynthesizedChannel`,
//! `ReprojectedChannel`, `VisualComposite`).
use std::path::PathBuf;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Fixed marker written to every invalid pixel of a synthesized channel.
pub const INVALID_VALUE: f64 = -10000.0;

/// Sentinel-2 platform identity.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Sensor {
    A,
    B,
}

impl Sensor {
    pub const ALL: [Sensor; 2] = [Sensor::A, Sensor::B];

    pub fn from_code(code: char) -> Result<Self> {
        match code {
            'A' => Ok(Sensor::A),
            'B' => Ok(Sensor::B),
            other => Err(Error::UnknownSensor { code: other }),
        }
    }

    /// The 10th character of a dataset identifier, e.g. `SENTINEL2A_20230131-...`.
    pub fn code_from_dataset_name(name: &str) -> Result<char> {
        name.chars().nth(9).ok_or_else(|| Error::InvalidDatasetName {
            name: name.to_string(),
        })
    }
}

impl std::fmt::Display for Sensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sensor::A => write!(f, "A"),
            Sensor::B => write!(f, "B"),
        }
    }
}

/// Synthetic UltraCam output channel.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Channel {
    Blue,
    Green,
    Red,
    Nir,
}

impl Channel {
    /// Processing order of the pipeline.
    pub const ALL: [Channel; 4] = [Channel::Blue, Channel::Green, Channel::Red, Channel::Nir];

    /// Short code used in output file names (`UC.B`, `UC.G`, ...).
    pub fn code(&self) -> &'static str {
        match self {
            Channel::Blue => "B",
            Channel::Green => "G",
            Channel::Red => "R",
            Channel::Nir => "N",
        }
    }

    pub fn file_tag(&self) -> String {
        format!("UC.{}", self.code())
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::Blue => write!(f, "Blue"),
            Channel::Green => write!(f, "Green"),
            Channel::Red => write!(f, "Red"),
            Channel::Nir => write!(f, "NIR"),
        }
    }
}

/// Sentinel-2 spectral bands consumed by the synthesis.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum BandName {
    B2,
    B3,
    B4,
    B5,
    B6,
    B7,
    B8A,
}

impl BandName {
    pub fn as_str(&self) -> &'static str {
        match self {
            BandName::B2 => "B2",
            BandName::B3 => "B3",
            BandName::B4 => "B4",
            BandName::B5 => "B5",
            BandName::B6 => "B6",
            BandName::B7 => "B7",
            BandName::B8A => "B8A",
        }
    }
}

impl std::fmt::Display for BandName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resolution tier of a classification mask: R1 is the 10m grid, R2 the 20m grid.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum MaskTier {
    R1,
    R2,
}

impl MaskTier {
    pub const ALL: [MaskTier; 2] = [MaskTier::R1, MaskTier::R2];

    pub fn as_str(&self) -> &'static str {
        match self {
            MaskTier::R1 => "R1",
            MaskTier::R2 => "R2",
        }
    }
}

impl std::fmt::Display for MaskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Native pixel type of a raster, carried to the persistence boundary.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum PixelType {
    U8,
    U16,
    I16,
    U32,
    I32,
    F32,
    F64,
}

impl std::fmt::Display for PixelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PixelType::U8 => "Byte",
            PixelType::U16 => "UInt16",
            PixelType::I16 => "Int16",
            PixelType::U32 => "UInt32",
            PixelType::I32 => "Int32",
            PixelType::F32 => "Float32",
            PixelType::F64 => "Float64",
        };
        write!(f, "{}", s)
    }
}

/// Georeferencing of a raster grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoReference {
    /// Affine geotransform coefficients ([origin_x, pixel_width, rot_x, origin_y, rot_y, pixel_height])
    pub geotransform: [f64; 6],
    /// Projection in WKT format
    pub projection: String,
}

impl GeoReference {
    /// Ground sample distance along X (pixel width).
    pub fn pixel_size(&self) -> f64 {
        self.geotransform[1]
    }
}

/// A single-band raster held in memory as f64, shape (ny, nx).
#[derive(Debug, Clone)]
pub struct Raster {
    pub data: Array2<f64>,
    pub georef: GeoReference,
    pub pixel_type: PixelType,
}

impl Raster {
    pub fn nx(&self) -> usize {
        self.data.ncols()
    }

    pub fn ny(&self) -> usize {
        self.data.nrows()
    }
}

/// One Sentinel-2 band as read from disk.
#[derive(Debug, Clone)]
pub struct SpectralBand {
    pub name: BandName,
    pub raster: Raster,
}

/// One UltraCam channel on the grid of its reference band.
#[derive(Debug, Clone)]
pub struct SynthesizedChannel {
    pub channel: Channel,
    pub sensor: Sensor,
    pub raster: Raster,
}

/// A synthesized channel after normalization to the target CRS.
///
/// Only the grid is described; pixels stay on disk at `path`.
#[derive(Debug, Clone)]
pub struct ReprojectedChannel {
    pub channel: Channel,
    pub path: PathBuf,
    /// `AUTHORITY:CODE` of the source CRS
    pub source_crs: String,
    pub georef: GeoReference,
    pub nx: usize,
    pub ny: usize,
    pub pixel_type: PixelType,
}

/// R, G, B stacked on the Red channel's grid.
#[derive(Debug, Clone)]
pub struct VisualComposite {
    pub red: Array2<f64>,
    pub green: Array2<f64>,
    pub blue: Array2<f64>,
    pub georef: GeoReference,
    pub pixel_type: PixelType,
}

impl VisualComposite {
    /// Bands in file order.
    pub fn bands(&self) -> [&Array2<f64>; 3] {
        [&self.red, &self.green, &self.blue]
    }
}
