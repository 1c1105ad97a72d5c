// Auto-framing of the map around the projected points

use crate::model::{Bounds, Coordinate, GeoPoint, ViewportFrame};

/// Relative padding added on each side of an axis.
pub const PADDING_RATIO: f64 = 0.15;
/// Padding in degrees for an axis whose span is zero.
pub const MIN_PADDING_DEGREES: f64 = 10.0;
/// Zoom used when there is exactly one point.
pub const SINGLE_POINT_ZOOM: f64 = 5.0;
/// Zoom for an empty map.
pub const WORLD_ZOOM: f64 = 1.0;
pub const WORLD_CENTER: Coordinate = Coordinate::new(0.0, 20.0);
pub const WORLD_BOUNDS: Bounds = Bounds {
    min_lon: -180.0,
    max_lon: 180.0,
    min_lat: -90.0,
    max_lat: 90.0,
};

/// (span strictly greater than, zoom), widest first. Spans at or below the
/// last threshold get `CLOSEST_ZOOM`.
pub const ZOOM_LADDER: [(f64, f64); 7] = [
    (150.0, 1.0),
    (100.0, 1.3),
    (60.0, 1.8),
    (30.0, 2.5),
    (15.0, 3.5),
    (8.0, 5.0),
    (4.0, 6.0),
];
pub const CLOSEST_ZOOM: f64 = 7.0;

impl Default for ViewportFrame {
    fn default() -> Self {
        Self {
            center: WORLD_CENTER,
            zoom: WORLD_ZOOM,
            bounds: WORLD_BOUNDS,
        }
    }
}

/// Frames every drawable point, low-precision ones included.
pub fn frame_points(points: &[GeoPoint]) -> ViewportFrame {
    let Some(raw) = raw_bounds(points) else {
        return ViewportFrame::default();
    };

    let lon_pad = axis_padding(raw.lon_span());
    let lat_pad = axis_padding(raw.lat_span());
    let bounds = Bounds {
        min_lon: raw.min_lon - lon_pad,
        max_lon: raw.max_lon + lon_pad,
        min_lat: raw.min_lat - lat_pad,
        max_lat: raw.max_lat + lat_pad,
    };

    let zoom = if points.len() < 2 {
        SINGLE_POINT_ZOOM
    } else {
        zoom_for_span(raw.lon_span().max(raw.lat_span()))
    };

    ViewportFrame {
        center: bounds.center(),
        zoom,
        bounds,
    }
}

/// Walks the ladder; the first threshold the span exceeds picks the zoom.
pub fn zoom_for_span(span: f64) -> f64 {
    ZOOM_LADDER
        .iter()
        .find(|(threshold, _)| span > *threshold)
        .map(|(_, zoom)| *zoom)
        .unwrap_or(CLOSEST_ZOOM)
}

fn axis_padding(span: f64) -> f64 {
    if span == 0.0 {
        MIN_PADDING_DEGREES
    } else {
        span * PADDING_RATIO
    }
}

fn raw_bounds(points: &[GeoPoint]) -> Option<Bounds> {
    let first = points.first()?.coordinate;
    let seed = Bounds {
        min_lon: first.lon,
        max_lon: first.lon,
        min_lat: first.lat,
        max_lat: first.lat,
    };

    Some(points.iter().skip(1).fold(seed, |acc, point| Bounds {
        min_lon: acc.min_lon.min(point.coordinate.lon),
        max_lon: acc.max_lon.max(point.coordinate.lon),
        min_lat: acc.min_lat.min(point.coordinate.lat),
        max_lat: acc.max_lat.max(point.coordinate.lat),
    }))
}
