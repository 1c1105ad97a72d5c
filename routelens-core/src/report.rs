// Console report generation from an assembled view model

use crate::classify::classify;
use crate::metrics::{TrendPoint, trend_series};
use crate::model::{Language, ViewModel};
use routelens_telemetry::{HopRecord, MetricSample, PrecisionTier, TraceInput};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";
const NOT_AVAILABLE: &str = "n/a";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
    Markdown,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            _ => None,
        }
    }
}

/// One row of the hop table. Unlike map points, every hop is listed and
/// missing measurements stay missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HopRow {
    pub hop_index: u32,
    pub label: String,
    pub ip: String,
    pub precision: PrecisionTier,
    pub on_map: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_last: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_avg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_best: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_worst: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loss_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isp: Option<String>,
}

impl HopRow {
    pub fn from_hop(hop: &HopRecord, language: Language) -> Self {
        let classification = classify(hop, language);
        Self {
            hop_index: hop.hop_index,
            label: classification.label,
            ip: hop.ip.clone(),
            precision: classification.precision,
            on_map: hop.has_valid_coordinates(),
            latency_last: hop.latency_last,
            latency_avg: hop.latency_avg,
            latency_best: hop.latency_best,
            latency_worst: hop.latency_worst,
            loss_percent: hop.loss_percent,
            asn: hop.asn.clone(),
            isp: hop.isp.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportData {
    pub target: String,
    pub language: Language,
    /// `None` when there is no usable trace.
    pub truncated: Option<bool>,
    pub hops: Vec<HopRow>,
    pub view: ViewModel,
    pub trend: Vec<TrendPoint>,
}

pub fn gather_report_data(
    target: &str,
    trace: &TraceInput,
    history: &[MetricSample],
    view: &ViewModel,
    language: Language,
) -> ReportData {
    let snapshot = trace.resolve();
    let hops: Vec<HopRow> = snapshot
        .as_ref()
        .map(|s| s.hops.iter().map(|hop| HopRow::from_hop(hop, language)).collect())
        .unwrap_or_default();

    let target = match snapshot.as_ref() {
        Some(s) if target.is_empty() => s.target.clone(),
        _ => target.to_string(),
    };

    ReportData {
        target,
        language,
        truncated: snapshot.as_ref().map(|s| s.truncated),
        hops,
        view: view.clone(),
        trend: trend_series(history),
    }
}

pub fn generate_text_report(data: &ReportData) -> String {
    let mut report = String::new();
    let stats = &data.view.stats;
    let frame = &data.view.frame;

    // Header
    report.push_str(RULE);
    report.push('\n');
    report.push_str("                         ROUTELENS PATH QUALITY REPORT\n");
    report.push_str(RULE);
    report.push_str("\n\n");

    report.push_str(&format!("Target:       {}\n", display_target(&data.target)));
    report.push_str(&format!("Language:     {}\n", data.language.as_str()));
    report.push_str(&format!("Trace:        {}\n", trace_status(data)));
    report.push('\n');

    // Summary tiles
    section(&mut report, "SUMMARY");
    report.push_str(&format!("Avg Latency:  {:.1} ms\n", stats.average_latency));
    report.push_str(&format!("Packet Loss:  {:.2} %\n", stats.average_loss));
    report.push_str(&format!("Downlink:     {:.1} Mbps\n", stats.latest_speed));
    report.push('\n');

    // Map
    section(&mut report, "ROUTE MAP");
    report.push_str(&format!("Points:       {}\n", data.view.points.len()));
    report.push_str(&format!("Segments:     {}\n", data.view.segments.len()));
    report.push_str(&format!(
        "Center:       {:.2}, {:.2}  (zoom {})\n",
        frame.center.lon, frame.center.lat, frame.zoom
    ));
    report.push_str(&format!(
        "Bounds:       lon {:.2} .. {:.2}, lat {:.2} .. {:.2}\n",
        frame.bounds.min_lon, frame.bounds.max_lon, frame.bounds.min_lat, frame.bounds.max_lat
    ));
    report.push('\n');

    for point in &data.view.points {
        report.push_str(&format!(
            "  [{:>2}] {:<28} {:>8.2}, {:>7.2}  {:>7.1} ms  {}\n",
            point.hop_index,
            truncate(&point.label, 28),
            point.coordinate.lon,
            point.coordinate.lat,
            point.latency,
            point.precision
        ));
    }
    if !data.view.segments.is_empty() {
        report.push('\n');
        for segment in &data.view.segments {
            report.push_str(&format!(
                "  {:.2},{:.2} -> {:.2},{:.2}  [{}]\n",
                segment.from.lon,
                segment.from.lat,
                segment.to.lon,
                segment.to.lat,
                segment.color.as_str().to_uppercase()
            ));
        }
    }
    report.push('\n');

    // Hop table
    if !data.hops.is_empty() {
        section(&mut report, "HOPS");
        report.push_str(&format!(
            "{:>3}  {:<28} {:<16} {:>7} {:>7} {:>7} {:>7} {:>6}  {}\n",
            "#", "Host", "IP", "Last", "Avg", "Best", "Worst", "Loss%", "ASN"
        ));
        for row in &data.hops {
            report.push_str(&format!(
                "{:>3}  {:<28} {:<16} {:>7} {:>7} {:>7} {:>7} {:>6}  {}\n",
                row.hop_index,
                truncate(&row.label, 28),
                truncate(&row.ip, 16),
                format_metric(row.latency_last, 1),
                format_metric(row.latency_avg, 1),
                format_metric(row.latency_best, 1),
                format_metric(row.latency_worst, 1),
                format_metric(row.loss_percent, 1),
                row.asn.as_deref().unwrap_or(NOT_AVAILABLE)
            ));
        }
        report.push('\n');
    }

    // Trend
    if !data.trend.is_empty() {
        section(&mut report, "HISTORY");
        for point in &data.trend {
            report.push_str(&format!(
                "  {}  latency {:>7.1} ms  loss {:>6.2} %\n",
                point.time_label(),
                point.latency,
                point.loss
            ));
        }
        report.push('\n');
    }

    // Footer
    report.push_str(RULE);
    report.push('\n');
    report.push_str("                                End of Report\n");
    report.push_str(RULE);
    report.push('\n');

    report
}

pub fn generate_markdown_report(data: &ReportData) -> String {
    let mut md = String::new();
    let stats = &data.view.stats;
    let frame = &data.view.frame;

    md.push_str(&format!("# RouteLens Report: {}\n\n", display_target(&data.target)));
    md.push_str(&format!("- **Language:** {}\n", data.language.as_str()));
    md.push_str(&format!("- **Trace:** {}\n\n", trace_status(data)));

    md.push_str("## Summary\n\n");
    md.push_str("| Avg Latency | Packet Loss | Downlink |\n");
    md.push_str("|---|---|---|\n");
    md.push_str(&format!(
        "| {:.1} ms | {:.2} % | {:.1} Mbps |\n\n",
        stats.average_latency, stats.average_loss, stats.latest_speed
    ));

    md.push_str("## Route Map\n\n");
    md.push_str(&format!(
        "Center `{:.2}, {:.2}`, zoom `{}`, {} points, {} segments.\n\n",
        frame.center.lon,
        frame.center.lat,
        frame.zoom,
        data.view.points.len(),
        data.view.segments.len()
    ));

    if !data.hops.is_empty() {
        md.push_str("## Hops\n\n");
        md.push_str(
            "| # | Host | IP | Last | Avg | Best | Worst | Loss % | ASN | Precision | On map |\n",
        );
        md.push_str("|---|---|---|---|---|---|---|---|---|---|---|\n");
        for row in &data.hops {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} | {} | {} | {} | {} |\n",
                row.hop_index,
                escape_markdown(&row.label),
                escape_markdown(&row.ip),
                format_metric(row.latency_last, 1),
                format_metric(row.latency_avg, 1),
                format_metric(row.latency_best, 1),
                format_metric(row.latency_worst, 1),
                format_metric(row.loss_percent, 1),
                escape_markdown(row.asn.as_deref().unwrap_or(NOT_AVAILABLE)),
                row.precision,
                if row.on_map { "yes" } else { "no" }
            ));
        }
        md.push('\n');
    }

    if !data.trend.is_empty() {
        md.push_str("## History\n\n");
        md.push_str("| Time | Latency (ms) | Loss (%) |\n");
        md.push_str("|---|---|---|\n");
        for point in &data.trend {
            md.push_str(&format!(
                "| {} | {:.1} | {:.2} |\n",
                point.time_label(),
                point.latency,
                point.loss
            ));
        }
        md.push('\n');
    }

    md
}

pub fn generate_json_report(data: &ReportData) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "RouteLens",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "target": data.target,
            "language": data.language,
            "truncated": data.truncated,
            "view": data.view,
            "hops": data.hops,
            "trend": data.trend
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn generate_report(
    data: &ReportData,
    format: ReportFormat,
) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(data)),
        ReportFormat::Markdown => Ok(generate_markdown_report(data)),
        ReportFormat::Json => generate_json_report(data),
    }
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

/// Absent measurements render as `n/a`, never as 0.
pub fn format_metric(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{:.*}", precision, v))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn section(report: &mut String, title: &str) {
    report.push_str(RULE);
    report.push('\n');
    report.push_str(title);
    report.push('\n');
    report.push_str(RULE);
    report.push_str("\n\n");
}

fn trace_status(data: &ReportData) -> String {
    match data.truncated {
        None => "none".to_string(),
        Some(true) => format!("{} hops (truncated)", data.hops.len()),
        Some(false) => format!("{} hops", data.hops.len()),
    }
}

fn display_target(target: &str) -> &str {
    if target.is_empty() { "(unnamed)" } else { target }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let kept: String = text.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}

fn escape_markdown(text: &str) -> String {
    text.replace('|', "\\|")
}
