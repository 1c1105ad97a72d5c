// Hops to renderable map points

use crate::classify::classify;
use crate::model::{Coordinate, GeoPoint, Language};
use routelens_telemetry::HopRecord;
use tracing::debug;

/// Projects hops onto the map in hop order. Hops without a usable coordinate
/// are dropped; hops sharing a coordinate are all kept.
pub fn project_points(hops: &[HopRecord], language: Language) -> Vec<GeoPoint> {
    hops.iter()
        .filter(|hop| {
            let keep = hop.has_valid_coordinates();
            if !keep {
                debug!("Hop {} has no usable coordinate, leaving it off the map", hop.hop_index);
            }
            keep
        })
        .map(|hop| project_point(hop, language))
        .collect()
}

fn project_point(hop: &HopRecord, language: Language) -> GeoPoint {
    let classification = classify(hop, language);
    GeoPoint {
        label: classification.label,
        coordinate: Coordinate::new(hop.lon, hop.lat),
        latency: point_latency(hop),
        hop_index: hop.hop_index,
        precision: classification.precision,
    }
}

/// The scatter glyph always needs a number, so unknown latency shows as 0 here.
/// Tabular views keep the distinction (see `report`).
pub fn point_latency(hop: &HopRecord) -> f64 {
    hop.latency_last.or(hop.latency_avg).unwrap_or(0.0)
}
