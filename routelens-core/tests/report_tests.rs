// Tests for report generation functionality

use routelens_core::report::{
    HopRow, ReportData, ReportFormat, format_metric, gather_report_data, generate_json_report,
    generate_markdown_report, generate_report, generate_text_report, save_report,
};
use routelens_core::{Language, assemble};
use routelens_telemetry::{HopRecord, MetricSample, PrecisionTier, TraceInput, TraceSnapshot};
use tempfile::TempDir;

fn sample_trace() -> TraceInput {
    let mut first = HopRecord::new(1, "gw.lan", "192.168.1.1");
    first.latency_last = Some(0.8);
    first.loss_percent = Some(0.0);

    let mut second = HopRecord::new(2, "fra-core-1.example", "203.0.113.7")
        .with_coordinates(8.68, 50.11)
        .with_precision(PrecisionTier::City);
    second.city = Some("Frankfurt".to_string());
    second.latency_last = Some(14.2);
    second.latency_avg = Some(15.0);
    second.asn = Some("AS3320".to_string());

    let mut third = HopRecord::new(3, "ams|edge", "198.51.100.9")
        .with_coordinates(4.9, 52.37)
        .with_precision(PrecisionTier::Subdivision);
    third.latency_avg = Some(210.5);

    TraceInput::from(TraceSnapshot::new("edge.example", vec![first, second, third], true))
}

fn sample_history() -> Vec<MetricSample> {
    vec![
        MetricSample::default().with_latency(12.0).with_loss(1.0),
        MetricSample::default().with_latency(18.0).with_speed_down(94.3),
    ]
}

fn sample_report(target: &str) -> ReportData {
    let trace = sample_trace();
    let history = sample_history();
    let view = assemble(&trace, &history, Language::Fallback);
    gather_report_data(target, &trace, &history, &view, Language::Fallback)
}

// ============================================================================
// Report Format Tests
// ============================================================================

#[test]
fn test_report_format_from_str() {
    assert_eq!(ReportFormat::from_str("text"), Some(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("json"), Some(ReportFormat::Json));
    assert_eq!(ReportFormat::from_str("markdown"), Some(ReportFormat::Markdown));
    assert_eq!(ReportFormat::from_str("md"), Some(ReportFormat::Markdown));
}

#[test]
fn test_report_format_from_str_case_insensitive() {
    assert_eq!(ReportFormat::from_str("TEXT"), Some(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("Json"), Some(ReportFormat::Json));
    assert_eq!(ReportFormat::from_str("MD"), Some(ReportFormat::Markdown));
}

#[test]
fn test_report_format_from_str_invalid() {
    assert_eq!(ReportFormat::from_str("html"), None);
    assert_eq!(ReportFormat::from_str(""), None);
}

// ============================================================================
// Data Gathering Tests
// ============================================================================

#[test]
fn test_gather_lists_every_hop() {
    let data = sample_report("edge.example");

    assert_eq!(data.hops.len(), 3);
    assert_eq!(data.view.points.len(), 2);
    assert_eq!(data.truncated, Some(true));
    assert_eq!(data.trend.len(), 2);

    assert!(!data.hops[0].on_map);
    assert!(data.hops[1].on_map);
    assert_eq!(data.hops[1].label, "Frankfurt");
    assert_eq!(data.hops[0].precision, PrecisionTier::Country);
}

#[test]
fn test_gather_falls_back_to_snapshot_target() {
    let data = sample_report("");
    assert_eq!(data.target, "edge.example");

    let named = sample_report("frankfurt-probe");
    assert_eq!(named.target, "frankfurt-probe");
}

#[test]
fn test_gather_without_trace() {
    let view = assemble(&TraceInput::Absent, &[], Language::Primary);
    let data = gather_report_data("", &TraceInput::Absent, &[], &view, Language::Primary);

    assert!(data.hops.is_empty());
    assert_eq!(data.truncated, None);
    assert_eq!(data.target, "");
}

#[test]
fn test_hop_row_keeps_missing_metrics_missing() {
    let hop = HopRecord::new(4, "silent", "");
    let row = HopRow::from_hop(&hop, Language::Primary);

    assert_eq!(row.latency_last, None);
    assert_eq!(row.loss_percent, None);
    assert_eq!(row.label, "silent");
}

// ============================================================================
// Metric Formatting Tests
// ============================================================================

#[test]
fn test_format_metric() {
    assert_eq!(format_metric(Some(14.26), 1), "14.3");
    assert_eq!(format_metric(Some(0.0), 2), "0.00");
    assert_eq!(format_metric(None, 1), "n/a");
}

// ============================================================================
// Text Report Tests
// ============================================================================

#[test]
fn test_text_report_sections() {
    let report = generate_text_report(&sample_report("edge.example"));

    assert!(report.contains("ROUTELENS PATH QUALITY REPORT"));
    assert!(report.contains("Target:       edge.example"));
    assert!(report.contains("Trace:        3 hops (truncated)"));
    assert!(report.contains("SUMMARY"));
    assert!(report.contains("Avg Latency:  15.0 ms"));
    assert!(report.contains("Packet Loss:  0.50 %"));
    assert!(report.contains("Downlink:     94.3 Mbps"));
    assert!(report.contains("ROUTE MAP"));
    assert!(report.contains("Segments:     1"));
    assert!(report.contains("[HIGH]"));
    assert!(report.contains("HOPS"));
    assert!(report.contains("HISTORY"));
    assert!(report.contains("End of Report"));
}

#[test]
fn test_text_report_shows_unavailable_hop_metrics() {
    let report = generate_text_report(&sample_report("edge.example"));

    let gateway = report
        .lines()
        .find(|line| line.contains("gw.lan"))
        .expect("gateway row");
    assert!(gateway.contains("0.8"));
    assert!(gateway.contains("n/a"));
}

#[test]
fn test_text_report_without_data() {
    let view = assemble(&TraceInput::Absent, &[], Language::Primary);
    let data = gather_report_data("", &TraceInput::Absent, &[], &view, Language::Primary);
    let report = generate_text_report(&data);

    assert!(report.contains("Target:       (unnamed)"));
    assert!(report.contains("Trace:        none"));
    assert!(report.contains("Avg Latency:  0.0 ms"));
    assert!(!report.contains("HOPS"));
    assert!(!report.contains("HISTORY"));
}

// ============================================================================
// Markdown Report Tests
// ============================================================================

#[test]
fn test_markdown_report() {
    let md = generate_markdown_report(&sample_report("edge.example"));

    assert!(md.starts_with("# RouteLens Report: edge.example"));
    assert!(md.contains("## Summary"));
    assert!(md.contains("| 15.0 ms | 0.50 % | 94.3 Mbps |"));
    assert!(md.contains("## Hops"));
    assert!(md.contains("ams\\|edge"));
    assert!(md.contains("| AS3320 |"));
    assert!(md.contains("## History"));
}

// ============================================================================
// JSON Report Tests
// ============================================================================

#[test]
fn test_json_report_structure() {
    let json = generate_json_report(&sample_report("edge.example")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

    let report = &parsed["report"];
    assert_eq!(report["metadata"]["generator"], "RouteLens");
    assert_eq!(report["metadata"]["format"], "json");
    assert_eq!(report["target"], "edge.example");
    assert_eq!(report["truncated"], true);
    assert_eq!(report["hops"].as_array().unwrap().len(), 3);
    assert_eq!(report["view"]["points"].as_array().unwrap().len(), 2);
    assert_eq!(report["view"]["segments"][0]["color"], "high");
}

#[test]
fn test_json_report_omits_missing_hop_metrics() {
    let json = generate_json_report(&sample_report("edge.example")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

    let gateway = &parsed["report"]["hops"][0];
    assert_eq!(gateway["latency_last"], 0.8);
    assert!(gateway.get("latency_avg").is_none());
}

#[test]
fn test_generate_report_dispatches_on_format() {
    let data = sample_report("edge.example");

    let text = generate_report(&data, ReportFormat::Text).unwrap();
    assert!(text.contains("End of Report"));

    let md = generate_report(&data, ReportFormat::Markdown).unwrap();
    assert!(md.starts_with("# RouteLens Report"));

    let json = generate_report(&data, ReportFormat::Json).unwrap();
    assert!(serde_json::from_str::<serde_json::Value>(&json).is_ok());
}

// ============================================================================
// Save Report Tests
// ============================================================================

#[test]
fn test_save_report() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("report.md");

    save_report("# hello\n", &path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "# hello\n");
}
