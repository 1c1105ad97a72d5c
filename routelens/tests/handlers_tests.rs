use routelens::config::{CONFIG_FILE_NAME, ConsoleConfig, expand_config_dir};
use routelens::handlers::*;
use routelens_core::report::ReportFormat;
use routelens_core::{DashboardSession, Language};
use routelens_telemetry::{PrecisionTier, TraceInput};
use std::io::Write;
use std::path::PathBuf;
use tempfile::{NamedTempFile, TempDir};

const TRACE_DOCUMENT: &str = r#"{
    "target": "edge.example",
    "truncated": false,
    "hops": [
        {"hop": 1, "host": "gw.lan", "ip": "192.168.1.1", "lon": 0, "lat": 0},
        {"hop": 2, "host": "r2", "lon": 8.68, "lat": 50.11, "geo_precision": "city", "latency_last": 14.2},
        {"hop": 3, "host": "r3", "lon": 4.9, "lat": 52.37, "geo_precision": "city", "latency_last": 21.0}
    ]
}"#;

const MTR_REPORT: &str = r#"{
    "report": {
        "mtr": {"src": "probe", "dst": "edge.example", "tests": 10},
        "hubs": [
            {"count": 1, "host": "192.168.1.1", "Loss%": 0.0, "Snt": 10, "Last": 0.5, "Avg": 0.6, "Best": 0.4, "Wrst": 1.1, "StDev": 0.1},
            {"count": 2, "host": "???", "Loss%": 100.0, "Snt": 10, "Last": 0.0, "Avg": 0.0, "Best": 0.0, "Wrst": 0.0, "StDev": 0.0}
        ]
    }
}"#;

const HISTORY: &str = r#"[
    {"created_at": "2026-10-18T08:00:00Z", "latency_ms": 20, "packet_loss": 1},
    {"CreatedAt": "2026-10-18T08:05:00Z", "LatencyMs": 40, "SpeedDown": 88.5}
]"#;

fn write_temp(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", content).unwrap();
    file
}

// ============================================================================
// Init Tests
// ============================================================================

#[test]
fn test_init_config_creates_default_file() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let config_dir = temp_dir.path().join("routelens");

    let outcome = init_config(&config_dir, false)?;
    let expected = config_dir.join(CONFIG_FILE_NAME);
    assert_eq!(outcome, InitOutcome::Created(expected.clone()));

    let loaded = ConsoleConfig::load(&expected)?;
    assert_eq!(loaded, ConsoleConfig::default());
    Ok(())
}

#[test]
fn test_init_config_keeps_existing_file() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, r#"{"language": "fallback"}"#)?;

    let outcome = init_config(temp_dir.path(), false)?;
    assert_eq!(outcome, InitOutcome::AlreadyExists(path.clone()));
    assert_eq!(ConsoleConfig::load(&path)?.language, Language::Fallback);
    Ok(())
}

#[test]
fn test_init_config_force_overwrites() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, r#"{"language": "fallback"}"#)?;

    let outcome = init_config(temp_dir.path(), true)?;
    assert_eq!(outcome, InitOutcome::Created(path.clone()));
    assert_eq!(ConsoleConfig::load(&path)?, ConsoleConfig::default());
    Ok(())
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_config_missing_file_gives_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config = ConsoleConfig::load(&temp_dir.path().join("absent.json")).unwrap();

    assert_eq!(config.language, Language::Primary);
    assert_eq!(config.format, "text");
    assert!(config.color);
}

#[test]
fn test_config_partial_file_fills_defaults() {
    let file = write_temp(r#"{"format": "md", "color": false}"#);
    let config = ConsoleConfig::load(file.path()).unwrap();

    assert_eq!(config.language, Language::Primary);
    assert_eq!(config.report_format().unwrap(), ReportFormat::Markdown);
    assert!(!config.color);
}

#[test]
fn test_config_save_and_load() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(CONFIG_FILE_NAME);
    let config = ConsoleConfig {
        language: Language::Fallback,
        format: "json".to_string(),
        color: false,
    };

    config.save(&path).unwrap();
    assert_eq!(ConsoleConfig::load(&path).unwrap(), config);
}

#[test]
fn test_config_rejects_unknown_format() {
    let file = write_temp(r#"{"format": "pdf"}"#);
    assert!(ConsoleConfig::load(file.path()).is_err());
}

#[test]
fn test_config_rejects_invalid_json() {
    let file = write_temp("language = fallback");
    assert!(ConsoleConfig::load(file.path()).is_err());
}

#[test]
fn test_expand_config_dir_keeps_plain_paths() {
    assert_eq!(expand_config_dir("/etc/routelens"), PathBuf::from("/etc/routelens"));
}

// ============================================================================
// Trace Loading Tests
// ============================================================================

#[test]
fn test_load_trace_document() {
    let file = write_temp(TRACE_DOCUMENT);
    let source = TraceSource::Document(file.path().to_path_buf());

    let input = load_trace_input(&source, "fallback").unwrap();
    let snapshot = input.resolve().expect("decodable trace");
    assert_eq!(snapshot.target, "edge.example");
    assert_eq!(snapshot.hops.len(), 3);
    assert_eq!(snapshot.hops[1].geo_precision, Some(PrecisionTier::City));
}

#[test]
fn test_load_trace_non_json_is_passed_through() {
    let file = write_temp("traceroute to edge.example, 30 hops max");
    let source = TraceSource::Document(file.path().to_path_buf());

    let input = load_trace_input(&source, "").unwrap();
    assert!(matches!(input, TraceInput::Raw(serde_json::Value::String(_))));
    assert!(input.resolve().is_none());
}

#[test]
fn test_trace_input_from_json_string_text() {
    let wrapped = serde_json::to_string(TRACE_DOCUMENT).unwrap();
    let input = trace_input_from_text(wrapped);

    assert!(matches!(input, TraceInput::Raw(serde_json::Value::String(_))));
    assert_eq!(input.resolve().unwrap().hops.len(), 3);
}

#[test]
fn test_load_trace_missing_file_is_error() {
    let source = TraceSource::Document(PathBuf::from("/nonexistent/trace.json"));
    assert!(load_trace_input(&source, "").is_err());
}

#[test]
fn test_load_mtr_report() {
    let file = write_temp(MTR_REPORT);
    let source = TraceSource::Mtr(file.path().to_path_buf());

    let input = load_trace_input(&source, "fallback").unwrap();
    let snapshot = input.resolve().unwrap();
    assert_eq!(snapshot.target, "edge.example");
    assert_eq!(snapshot.hops.len(), 2);
    assert_eq!(snapshot.hops[0].ip, "192.168.1.1");
    assert_eq!(snapshot.hops[1].loss_percent, Some(100.0));
}

#[test]
fn test_load_mtr_report_undecodable_is_absent() {
    let file = write_temp(TRACE_DOCUMENT);
    let source = TraceSource::Mtr(file.path().to_path_buf());
    assert_eq!(load_trace_input(&source, "").unwrap(), TraceInput::Absent);

    let garbage = write_temp("HOST: probe  Loss%   Snt   Last");
    let source = TraceSource::Mtr(garbage.path().to_path_buf());
    assert_eq!(load_trace_input(&source, "").unwrap(), TraceInput::Absent);
}

#[test]
fn test_load_mtr_report_missing_file_is_error() {
    let source = TraceSource::Mtr(PathBuf::from("/nonexistent/mtr.json"));
    assert!(load_trace_input(&source, "").is_err());
}

// ============================================================================
// History Loading Tests
// ============================================================================

#[test]
fn test_load_history_mixed_schemes() {
    let file = write_temp(HISTORY);
    let history = load_history(file.path()).unwrap();

    assert_eq!(history.len(), 2);
    assert_eq!(history[0].latency_ms, Some(20.0));
    assert_eq!(history[1].latency_ms, Some(40.0));
    assert_eq!(history[1].speed_down_mbps, Some(88.5));
}

#[test]
fn test_load_history_undecodable_is_empty() {
    let file = write_temp(r#"{"samples": []}"#);
    assert!(load_history(file.path()).unwrap().is_empty());

    let garbage = write_temp("not json");
    assert!(load_history(garbage.path()).unwrap().is_empty());
}

#[test]
fn test_load_history_missing_file_is_error() {
    assert!(load_history(&PathBuf::from("/nonexistent/history.json")).is_err());
}

// ============================================================================
// Retrieval Tests
// ============================================================================

#[tokio::test]
async fn test_retrieve_into_session() {
    let trace = write_temp(TRACE_DOCUMENT);
    let history = write_temp(HISTORY);
    let mut session = DashboardSession::new(Language::Fallback);

    retrieve_into_session(
        &mut session,
        "edge.example",
        Some(TraceSource::Document(trace.path().to_path_buf())),
        Some(history.path().to_path_buf()),
    )
    .await
    .unwrap();

    assert_eq!(session.target(), Some("edge.example"));
    let view = session.view_model();
    assert_eq!(view.points.len(), 2);
    assert_eq!(view.segments.len(), 1);
    assert_eq!(view.stats.average_latency, 30.0);
    assert_eq!(view.stats.latest_speed, 88.5);
}

#[tokio::test]
async fn test_retrieve_replaces_previous_target() {
    let trace = write_temp(TRACE_DOCUMENT);
    let mut session = DashboardSession::default();

    retrieve_into_session(
        &mut session,
        "edge.example",
        Some(TraceSource::Document(trace.path().to_path_buf())),
        None,
    )
    .await
    .unwrap();
    assert_eq!(session.view_model().points.len(), 2);

    retrieve_into_session(&mut session, "other.example", None, None)
        .await
        .unwrap();
    assert_eq!(session.target(), Some("other.example"));
    assert!(session.view_model().points.is_empty());
    assert_eq!(session.generation().value(), 2);
}

#[tokio::test]
async fn test_retrieve_with_malformed_mtr_keeps_history() {
    let mtr = write_temp("not json");
    let history = write_temp(HISTORY);
    let mut session = DashboardSession::default();

    retrieve_into_session(
        &mut session,
        "edge.example",
        Some(TraceSource::Mtr(mtr.path().to_path_buf())),
        Some(history.path().to_path_buf()),
    )
    .await
    .unwrap();

    assert_eq!(session.trace(), &TraceInput::Absent);
    assert_eq!(session.view_model().stats.latest_speed, 88.5);
}

#[tokio::test]
async fn test_retrieve_propagates_read_errors() {
    let mut session = DashboardSession::default();
    let result = retrieve_into_session(
        &mut session,
        "edge.example",
        Some(TraceSource::Document(PathBuf::from("/nonexistent/trace.json"))),
        None,
    )
    .await;

    assert!(result.is_err());
    assert_eq!(session.trace(), &TraceInput::Absent);
}
