//! Self-service password reset audit export.
//!
//! Queries directory audit events for one activity over a trailing UTC
//! window and exports them as CSV and/or JSON.
//!
//! # Usage
//!
//! ```bash
//! # Last 7 days of SSPR events, CSV and JSON (default)
//! entra-audit sspr-audit
//!
//! # Compact five-column CSV for the last 30 days
//! entra-audit sspr-audit --days 30 --fields summary --format csv
//!
//! # Reproducible window ending at a fixed instant
//! entra-audit sspr-audit --as-of 2025-07-29T00:00:00Z --output-dir reports/
//! ```
//!
//! # Output
//!
//! Writes `sspr_audit_logs.csv` and/or `sspr_audit_logs.json`. An empty
//! result still produces the files (header-only CSV, `[]` JSON).

use crate::audit::export::{export_rows, ExportFormat, ExportRecord};
use crate::audit::filter::{build_filter, format_bound, AuditWindow};
use crate::audit::projection::{AuditSummaryRow, FieldSet, SsprAuditRow};
use crate::audit::types::DirectoryAudit;
use crate::graph_api::GraphClient;
use crate::utils::format::format_count;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

pub const OUTPUT_STEM: &str = "sspr_audit_logs";

#[derive(Debug, Clone)]
pub struct AuditExportOptions {
    pub activity: String,
    pub days: u32,
    /// End of the window; the current time when unset
    pub as_of: Option<DateTime<Utc>>,
    pub fields: FieldSet,
    pub format: ExportFormat,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct AuditExportReport {
    pub window: AuditWindow,
    pub filter: String,
    pub record_count: usize,
    pub truncated: bool,
    pub written: Vec<PathBuf>,
}

pub async fn run(client: &GraphClient, options: &AuditExportOptions) -> Result<AuditExportReport> {
    let window = match options.as_of {
        Some(as_of) => AuditWindow::trailing(as_of, options.days)?,
        None => AuditWindow::trailing_from_now(options.days)?,
    };
    let filter = build_filter(&options.activity, &window);

    eprintln!("=== Directory Audit Export ===");
    eprintln!("Activity: {}", options.activity);
    eprintln!(
        "Window: {} .. {}",
        format_bound(&window.lower),
        format_bound(&window.upper)
    );
    eprintln!();
    tracing::debug!(%filter, "querying directory audits");

    let page = client
        .list_directory_audits(&filter)
        .await
        .context("Failed to query directory audit logs")?;

    let truncated = page.next_link.is_some();
    if truncated {
        tracing::warn!(
            "more audit records are available than the first page; export contains the first page only"
        );
    }

    let records = page.value;
    if records.is_empty() {
        eprintln!("No audit logs found");
    } else {
        eprintln!("Found {}", format_count(records.len(), "audit record"));
    }

    let written = match options.fields {
        FieldSet::Full => export_projected(
            &records,
            SsprAuditRow::project,
            &options.output_dir,
            options.format,
        )?,
        FieldSet::Summary => export_projected(
            &records,
            AuditSummaryRow::project,
            &options.output_dir,
            options.format,
        )?,
    };

    for path in &written {
        eprintln!("Written to: {}", path.display());
    }

    Ok(AuditExportReport {
        window,
        filter,
        record_count: records.len(),
        truncated,
        written,
    })
}

fn export_projected<R: ExportRecord>(
    records: &[DirectoryAudit],
    project: fn(&DirectoryAudit) -> R,
    output_dir: &Path,
    format: ExportFormat,
) -> Result<Vec<PathBuf>> {
    let rows: Vec<R> = records.iter().map(project).collect();
    export_rows(output_dir, OUTPUT_STEM, format, &rows)
}
