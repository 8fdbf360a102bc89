pub mod metadata;
pub mod tiff;
