// View model types handed to the map and chart renderer

use routelens_telemetry::PrecisionTier;
use serde::{Deserialize, Serialize};

/// Which set of place names labels use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Localized names (`city_localized`, `subdivision_localized`).
    #[default]
    Primary,
    /// Names as delivered by the geo database (`city`, `subdivision`).
    Fallback,
}

impl Language {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "primary" | "localized" => Some(Language::Primary),
            "fallback" => Some(Language::Fallback),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Primary => "primary",
            Language::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub label: String,
    pub coordinate: Coordinate,
    /// Always a number: last, else average, else 0.
    pub latency: f64,
    pub hop_index: u32,
    pub precision: PrecisionTier,
}

impl GeoPoint {
    /// Hover text for the scatter glyph.
    pub fn tooltip(&self) -> String {
        format!("Node: {}\nLatency: {:.1}ms", self.label, self.latency)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentColor {
    Low,
    Medium,
    High,
}

impl SegmentColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentColor::Low => "low",
            SegmentColor::Medium => "medium",
            SegmentColor::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSegment {
    pub from: Coordinate,
    pub to: Coordinate,
    pub color: SegmentColor,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl Bounds {
    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.min_lon + self.max_lon) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportFrame {
    pub center: Coordinate,
    pub zoom: f64,
    pub bounds: Bounds,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregateStats {
    pub average_latency: f64,
    pub average_loss: f64,
    pub latest_speed: f64,
}

/// Everything the renderer needs for one (trace, history, language) input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewModel {
    pub points: Vec<GeoPoint>,
    pub segments: Vec<PathSegment>,
    pub frame: ViewportFrame,
    pub stats: AggregateStats,
}
