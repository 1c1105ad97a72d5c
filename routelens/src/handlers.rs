use crate::config::{CONFIG_FILE_NAME, ConsoleConfig, default_config_path, expand_config_dir};
use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use colored::Colorize;
use routelens_core::report::{ReportFormat, gather_report_data, generate_report, save_report};
use routelens_core::{DashboardSession, Delivery, Language, Retrieval, RetrievalPayload};
use routelens_telemetry::{
    MetricSample, TelemetryError, TraceInput, TraceSnapshot, decode_history_str,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Where a trace document comes from and how to read it.
#[derive(Debug, Clone)]
pub enum TraceSource {
    /// A RouteLens trace document (object with a `hops` array).
    Document(PathBuf),
    /// An `mtr --json` report.
    Mtr(PathBuf),
}

/// Outcome of `init`.
#[derive(Debug, Clone, PartialEq)]
pub enum InitOutcome {
    Created(PathBuf),
    AlreadyExists(PathBuf),
}

// Helper functions for the render handler

/// Reads a trace file. Text that is not JSON is passed on as an opaque
/// payload, which the pipeline treats as "no trace". An MTR report that
/// cannot be decoded gives no trace with a warning. A file that cannot be
/// read is an error.
pub fn load_trace_input(source: &TraceSource, fallback_target: &str) -> Result<TraceInput> {
    match source {
        TraceSource::Document(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read trace file {}", path.display()))?;
            Ok(trace_input_from_text(raw))
        }
        TraceSource::Mtr(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read MTR report {}", path.display()))?;
            let decoded = serde_json::from_str::<serde_json::Value>(&raw)
                .map_err(TelemetryError::from)
                .and_then(|value| TraceSnapshot::from_mtr_report(&value, fallback_target));
            match decoded {
                Ok(snapshot) => Ok(TraceInput::Snapshot(snapshot)),
                Err(e) => {
                    warn!("Ignoring MTR report {}: {}", path.display(), e);
                    Ok(TraceInput::Absent)
                }
            }
        }
    }
}

pub fn trace_input_from_text(raw: String) -> TraceInput {
    match serde_json::from_str::<serde_json::Value>(&raw) {
        Ok(value) => TraceInput::Raw(value),
        Err(e) => {
            debug!("Trace file is not JSON ({}), passing it on as text", e);
            TraceInput::Raw(serde_json::Value::String(raw))
        }
    }
}

/// Reads a history file. A file that cannot be decoded gives an empty
/// history with a warning; a file that cannot be read is an error.
pub fn load_history(path: &Path) -> Result<Vec<MetricSample>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read history file {}", path.display()))?;

    match decode_history_str(&raw) {
        Ok(history) => Ok(history),
        Err(e) => {
            warn!("Ignoring history file {}: {}", path.display(), e);
            Ok(Vec::new())
        }
    }
}

/// Selects `target` in the session and loads its trace and history
/// concurrently. Each result is handed over with the generation it was
/// requested under, so a result for an older selection is dropped.
pub async fn retrieve_into_session(
    session: &mut DashboardSession,
    target: &str,
    trace: Option<TraceSource>,
    history: Option<PathBuf>,
) -> Result<()> {
    let generation = session.select_target(target);

    let fallback_target = target.to_string();
    let trace_task = tokio::task::spawn_blocking(move || {
        trace
            .map(|source| load_trace_input(&source, &fallback_target))
            .transpose()
    });
    let history_task =
        tokio::task::spawn_blocking(move || history.map(|path| load_history(&path)).transpose());

    let (trace_result, history_result) = tokio::join!(trace_task, history_task);

    if let Some(trace) = trace_result.context("Trace loader panicked")?? {
        deliver(session, generation, target, RetrievalPayload::Trace(trace));
    }
    if let Some(history) = history_result.context("History loader panicked")?? {
        deliver(session, generation, target, RetrievalPayload::History(history));
    }

    Ok(())
}

fn deliver(
    session: &mut DashboardSession,
    generation: routelens_core::Generation,
    target: &str,
    payload: RetrievalPayload,
) {
    let retrieval = Retrieval {
        generation,
        target: target.to_string(),
        payload,
    };
    if session.accept(retrieval) == Delivery::Stale {
        warn!("Dropped a stale result for {}", target);
    }
}

/// Config path from `--config`, else the default location.
pub fn resolve_config_path(args: &ArgMatches) -> PathBuf {
    args.get_one::<PathBuf>("config")
        .cloned()
        .unwrap_or_else(default_config_path)
}

pub fn resolve_language(args: &ArgMatches, config: &ConsoleConfig) -> Language {
    args.get_one::<String>("lang")
        .and_then(|raw| Language::from_str(raw))
        .unwrap_or(config.language)
}

pub fn resolve_format(args: &ArgMatches, config: &ConsoleConfig) -> Result<ReportFormat> {
    match args.get_one::<String>("format") {
        Some(raw) => {
            ReportFormat::from_str(raw).ok_or_else(|| anyhow!("Unknown report format '{}'", raw))
        }
        None => config.report_format(),
    }
}

pub fn init_config(config_dir: &Path, force: bool) -> Result<InitOutcome> {
    let config_path = config_dir.join(CONFIG_FILE_NAME);
    if config_path.exists() && !force {
        return Ok(InitOutcome::AlreadyExists(config_path));
    }

    fs::create_dir_all(config_dir)
        .with_context(|| format!("Failed to create config directory {}", config_dir.display()))?;
    ConsoleConfig::default().save(&config_path)?;
    Ok(InitOutcome::Created(config_path))
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

pub fn handle_init(args: &ArgMatches) -> Result<()> {
    let raw_dir = args
        .get_one::<String>("PATH")
        .map(String::as_str)
        .unwrap_or(crate::config::DEFAULT_CONFIG_DIR);
    let force = args.get_flag("force");
    let config_dir = expand_config_dir(raw_dir);

    print_divider();
    println!("{}", "  ROUTELENS INITIALIZATION".bright_white().bold());
    print_divider();
    println!();

    match init_config(&config_dir, force)? {
        InitOutcome::Created(path) => {
            println!(
                "{} Config written: {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            );
        }
        InitOutcome::AlreadyExists(path) => {
            println!("{}", "⚠ WARNING".yellow().bold());
            println!(
                "  {} {} already exists",
                "•".yellow(),
                path.display().to_string().bright_white()
            );
            println!("{} Re-run with --force to overwrite it.", "→".blue());
        }
    }
    println!();
    Ok(())
}

pub async fn handle_render(args: &ArgMatches) -> Result<()> {
    let config = ConsoleConfig::load(&resolve_config_path(args))?;
    if !config.color {
        colored::control::set_override(false);
    }

    let language = resolve_language(args, &config);
    let format = resolve_format(args, &config)?;

    let trace = match (args.get_one::<PathBuf>("trace"), args.get_one::<PathBuf>("mtr")) {
        (Some(path), _) => Some(TraceSource::Document(path.clone())),
        (None, Some(path)) => Some(TraceSource::Mtr(path.clone())),
        (None, None) => None,
    };
    let history = args.get_one::<PathBuf>("history").cloned();
    let target = args
        .get_one::<String>("target")
        .cloned()
        .unwrap_or_default();

    let mut session = DashboardSession::new(language);
    retrieve_into_session(&mut session, &target, trace, history).await?;

    let view = session.view_model();
    let data = gather_report_data(&target, session.trace(), session.history(), &view, language);
    let content = generate_report(&data, format).context("Failed to serialize report")?;

    match args.get_one::<PathBuf>("output") {
        Some(path) => {
            save_report(&content, path)
                .with_context(|| format!("Failed to write report {}", path.display()))?;
            println!(
                "{} Report saved: {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            );
        }
        None => print!("{}", content),
    }

    Ok(())
}
