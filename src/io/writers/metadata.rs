use gdal::Dataset;
use gdal::Metadata;
use std::collections::BTreeMap;

use crate::core::calibration::coefficients;
use crate::io::gdal::GdalError;
use crate::types::{Channel, Sensor};

/// Provenance tags written into every synthesized channel.
pub fn channel_metadata_fields(channel: Channel, sensor: Sensor) -> BTreeMap<String, String> {
    let set = coefficients(sensor, channel);
    let mut fields = BTreeMap::new();
    fields.insert("UC_CHANNEL".to_string(), channel.to_string());
    fields.insert("UC_SENSOR".to_string(), format!("SENTINEL2{}", sensor));
    fields.insert(
        "UC_BANDS".to_string(),
        set.bands().map(|b| b.as_str()).collect::<Vec<_>>().join(","),
    );
    fields.insert(
        "UC_COEFFICIENTS".to_string(),
        set.weights()
            .map(|w| format!("{:.8}", w))
            .collect::<Vec<_>>()
            .join(","),
    );
    fields.insert("UC_REFERENCE_BAND".to_string(), set.reference.to_string());
    fields.insert(
        "PROCESSING_TIMESTAMP".to_string(),
        chrono::Utc::now().to_rfc3339(),
    );
    fields.insert(
        "PROCESSING_TOOL".to_string(),
        format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
    );
    fields
}

/// Embed channel provenance into a GeoTIFF dataset
pub fn embed_channel_metadata(
    ds: &mut Dataset,
    channel: Channel,
    sensor: Sensor,
) -> Result<(), GdalError> {
    for (key, value) in channel_metadata_fields(channel, sensor) {
        ds.set_metadata_item(&key, &value, "")?;
    }
    Ok(())
}
