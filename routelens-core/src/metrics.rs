// Summary statistics and chart series over a target's metric history

use crate::model::AggregateStats;
use chrono::{DateTime, Utc};
use routelens_telemetry::MetricSample;
use serde::{Deserialize, Serialize};

/// Rolls a chronological history up into the summary tiles.
///
/// Averages are a "blended trend": a sample missing latency or loss counts
/// as 0 in the mean rather than being left out. Speed is the last sample's
/// downlink, or 0.
pub fn aggregate(history: &[MetricSample]) -> AggregateStats {
    if history.is_empty() {
        return AggregateStats::default();
    }

    let count = history.len() as f64;
    let latency_sum: f64 = history.iter().map(|s| s.latency_ms.unwrap_or(0.0)).sum();
    let loss_sum: f64 = history
        .iter()
        .map(|s| s.packet_loss_percent.unwrap_or(0.0))
        .sum();

    AggregateStats {
        average_latency: latency_sum / count,
        average_loss: loss_sum / count,
        latest_speed: history
            .last()
            .and_then(|s| s.speed_down_mbps)
            .unwrap_or(0.0),
    }
}

/// One point of the latency/loss trend chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub timestamp: Option<DateTime<Utc>>,
    pub latency: f64,
    pub loss: f64,
}

impl TrendPoint {
    /// Axis label, `HH:MM`. Samples without a timestamp get `--:--`.
    pub fn time_label(&self) -> String {
        self.timestamp
            .map(|ts| ts.format("%H:%M").to_string())
            .unwrap_or_else(|| "--:--".to_string())
    }
}

/// The chart draws continuous lines, so gaps are plotted as 0 like the tiles.
pub fn trend_series(history: &[MetricSample]) -> Vec<TrendPoint> {
    history
        .iter()
        .map(|s| TrendPoint {
            timestamp: s.timestamp,
            latency: s.latency_ms.unwrap_or(0.0),
            loss: s.packet_loss_percent.unwrap_or(0.0),
        })
        .collect()
}
