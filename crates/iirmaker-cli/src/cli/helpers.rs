use anyhow::Context;
use iirmaker_core::domain::{AggregationSummary, OUTER_SLOTS};
use serde::Serialize;
use std::fs;
use std::io::IsTerminal;
use std::path::Path;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "warn";

/// Installs the stderr subscriber; `RUST_LOG` overrides the default filter.
pub(super) fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    // A subscriber may already be installed when running under a test harness.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryReport<'a> {
    tool: &'static str,
    version: &'static str,
    groups: Vec<usize>,
    #[serde(flatten)]
    summary: &'a AggregationSummary,
}

pub(super) fn render_human_summary(summary: &AggregationSummary) -> String {
    format!(
        "Wrote {}: {} populated slot(s), {} skipped, {} row(s).",
        summary.output_path.display(),
        summary.populated_count(),
        summary.skipped_slots,
        summary.rows_written
    )
}

pub(super) fn write_summary_report(path: &Path, summary: &AggregationSummary) -> anyhow::Result<()> {
    let report = SummaryReport {
        tool: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        groups: (0..OUTER_SLOTS)
            .map(|outer| summary.populated_in_group(outer))
            .collect(),
        summary,
    };

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| {
            format!("failed to create summary directory '{}'", parent.display())
        })?;
    }

    let mut content =
        serde_json::to_string_pretty(&report).context("failed to serialize run summary")?;
    content.push('\n');
    fs::write(path, content)
        .with_context(|| format!("failed to write run summary '{}'", path.display()))
}
