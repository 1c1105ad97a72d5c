// Colored path lines between precisely located hops

use crate::model::{GeoPoint, PathSegment, SegmentColor};

pub const HIGH_LATENCY_MS: f64 = 200.0;
pub const MEDIUM_LATENCY_MS: f64 = 100.0;

/// Segments between consecutive city/subdivision points. Country and
/// unlocated points are skipped so the path never runs through a guess.
pub fn build_segments(points: &[GeoPoint]) -> Vec<PathSegment> {
    let precise: Vec<&GeoPoint> = points
        .iter()
        .filter(|point| point.precision.is_path_eligible())
        .collect();

    precise
        .windows(2)
        .map(|pair| PathSegment {
            from: pair[0].coordinate,
            to: pair[1].coordinate,
            color: segment_color(pair[1].latency),
        })
        .collect()
}

/// Colored by the destination hop; upper bounds are inclusive.
pub fn segment_color(latency_ms: f64) -> SegmentColor {
    if latency_ms > HIGH_LATENCY_MS {
        SegmentColor::High
    } else if latency_ms > MEDIUM_LATENCY_MS {
        SegmentColor::Medium
    } else {
        SegmentColor::Low
    }
}
