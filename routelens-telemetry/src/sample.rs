use crate::error::{Result, TelemetryError, json_kind};
use chrono::{DateTime, Utc};
use crate::lenient;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One periodic measurement for a target.
///
/// Every metric is optional: an absent value means "unknown", which is not
/// the same thing as zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "WireSample")]
pub struct MetricSample {
    #[serde(rename = "created_at", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<f64>,
    #[serde(rename = "packet_loss", skip_serializing_if = "Option::is_none")]
    pub packet_loss_percent: Option<f64>,
    #[serde(rename = "speed_down", skip_serializing_if = "Option::is_none")]
    pub speed_down_mbps: Option<f64>,
}

impl MetricSample {
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp: Some(timestamp),
            ..Self::default()
        }
    }

    pub fn with_latency(mut self, latency_ms: f64) -> Self {
        self.latency_ms = Some(latency_ms);
        self
    }

    pub fn with_loss(mut self, packet_loss_percent: f64) -> Self {
        self.packet_loss_percent = Some(packet_loss_percent);
        self
    }

    pub fn with_speed_down(mut self, speed_down_mbps: f64) -> Self {
        self.speed_down_mbps = Some(speed_down_mbps);
        self
    }
}

/// A sample as stored: the current snake_case scheme and the older
/// PascalCase scheme can both appear, even within the same record.
///
/// Values of the wrong JSON type decode as absent instead of failing the
/// whole sample.
#[derive(Debug, Default, Deserialize)]
struct WireSample {
    #[serde(default, deserialize_with = "lenient::timestamp")]
    created_at: Option<DateTime<Utc>>,
    #[serde(rename = "CreatedAt", default, deserialize_with = "lenient::timestamp")]
    legacy_created_at: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "lenient::number")]
    latency_ms: Option<f64>,
    #[serde(rename = "LatencyMs", default, deserialize_with = "lenient::number")]
    legacy_latency_ms: Option<f64>,

    #[serde(default, deserialize_with = "lenient::number")]
    packet_loss: Option<f64>,
    #[serde(rename = "PacketLoss", default, deserialize_with = "lenient::number")]
    legacy_packet_loss: Option<f64>,

    #[serde(default, deserialize_with = "lenient::number")]
    speed_down: Option<f64>,
    #[serde(rename = "SpeedDown", default, deserialize_with = "lenient::number")]
    legacy_speed_down: Option<f64>,
}

/// Field resolution order: the current scheme's value if present, else the
/// legacy scheme's, else absent.
fn resolve_field<T>(current: Option<T>, legacy: Option<T>) -> Option<T> {
    current.or(legacy)
}

impl From<WireSample> for MetricSample {
    fn from(wire: WireSample) -> Self {
        Self {
            timestamp: resolve_field(wire.created_at, wire.legacy_created_at),
            latency_ms: resolve_field(wire.latency_ms, wire.legacy_latency_ms),
            packet_loss_percent: resolve_field(wire.packet_loss, wire.legacy_packet_loss),
            speed_down_mbps: resolve_field(wire.speed_down, wire.legacy_speed_down),
        }
    }
}

/// Decodes a stored history array, oldest first. Entries that are not
/// objects are skipped; the order of the rest is kept as given.
pub fn decode_history(value: &serde_json::Value) -> Result<Vec<MetricSample>> {
    let entries = value
        .as_array()
        .ok_or_else(|| TelemetryError::NotAnObject(json_kind(value)))?;

    let samples = entries
        .iter()
        .enumerate()
        .filter_map(|(idx, entry)| {
            if !entry.is_object() {
                debug!("Skipping history entry {}: {}", idx, json_kind(entry));
                return None;
            }
            match MetricSample::deserialize(entry) {
                Ok(sample) => Some(sample),
                Err(e) => {
                    debug!("Skipping history entry {}: {}", idx, e);
                    None
                }
            }
        })
        .collect();

    Ok(samples)
}

pub fn decode_history_str(raw: &str) -> Result<Vec<MetricSample>> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    decode_history(&value)
}
