//! Directory role-assignment export.
//!
//! Lists role assignments (with the principal expanded), resolves every
//! principal to a user or enterprise application and every role definition to
//! its display name, and exports one row per assignment.
//!
//! # Usage
//!
//! ```bash
//! entra-audit role-assignments
//! entra-audit role-assignments --format both --output-dir reports/
//! ```
//!
//! # Output
//!
//! `role_assignment_logs.csv` (and `.json` when requested) with columns
//! `roleName`, `principalName`, `principalEmail`, `principalType`.
//!
//! Lookups that find nothing leave the affected columns empty and are
//! counted as degraded rows in the summary; they never abort the export.

use crate::audit::export::{export_rows, ExportFormat};
use crate::audit::roles::{
    DirectoryLookup, EnrichedAssignment, EnrichmentOutcome, EnrichmentSummary, RoleEnricher,
};
use crate::audit::types::RoleAssignment;
use crate::graph_api::GraphClient;
use crate::utils::format::{format_count, format_number};
use crate::utils::progress::ProgressBar;
use anyhow::{Context, Result};
use std::path::PathBuf;

pub const OUTPUT_STEM: &str = "role_assignment_logs";

#[derive(Debug, Clone)]
pub struct RoleExportOptions {
    pub format: ExportFormat,
    pub output_dir: PathBuf,
    pub show_progress: bool,
}

#[derive(Debug, Clone)]
pub struct RoleExportReport {
    pub summary: EnrichmentSummary,
    pub truncated: bool,
    pub written: Vec<PathBuf>,
}

/// Enrich assignments one at a time, in listing order.
pub async fn enrich_assignments<L: DirectoryLookup>(
    lookup: &L,
    assignments: &[RoleAssignment],
    progress: &ProgressBar,
) -> Result<Vec<EnrichedAssignment>> {
    let mut enricher = RoleEnricher::new(lookup);
    let mut results = Vec::with_capacity(assignments.len());

    for assignment in assignments {
        let enriched = enricher.enrich(assignment).await.with_context(|| {
            format!(
                "Failed to enrich role assignment {}",
                assignment.id.as_deref().unwrap_or("<no id>")
            )
        })?;

        if let EnrichmentOutcome::Degraded(reasons) = &enriched.outcome {
            progress.println(format!(
                "⚠️  {}: {}",
                enriched.assignment_id,
                reasons.join("; ")
            ));
        }

        results.push(enriched);
        progress.inc();
    }

    Ok(results)
}

pub async fn run(client: &GraphClient, options: &RoleExportOptions) -> Result<RoleExportReport> {
    eprintln!("=== Role Assignment Export ===");
    eprintln!("Graph: {}", client.base_url());
    eprintln!();

    let page = client
        .list_role_assignments()
        .await
        .context("Failed to list directory role assignments")?;

    let truncated = page.next_link.is_some();
    if truncated {
        tracing::warn!(
            "more role assignments are available than the first page; export contains the first page only"
        );
    }

    let assignments = page.value;
    if assignments.is_empty() {
        eprintln!("No role assignments found");
    } else {
        eprintln!("Found {}", format_count(assignments.len(), "role assignment"));
    }

    let progress = if options.show_progress && !assignments.is_empty() {
        ProgressBar::new(assignments.len(), "Resolving principals")
    } else {
        ProgressBar::hidden()
    };

    let results = enrich_assignments(client, &assignments, &progress).await?;
    progress.finish_with_message("Resolved principals");

    let summary = EnrichmentSummary::from_results(&results);
    eprintln!();
    eprintln!("=== Summary ===");
    eprintln!("Total assignments: {}", format_number(summary.total));
    eprintln!("Fully resolved: {}", format_number(summary.complete));
    eprintln!("Degraded: {}", format_number(summary.degraded));
    eprintln!();

    let rows: Vec<_> = results.into_iter().map(|r| r.row).collect();
    let written = export_rows(&options.output_dir, OUTPUT_STEM, options.format, &rows)?;
    for path in &written {
        eprintln!("Written to: {}", path.display());
    }

    Ok(RoleExportReport {
        summary,
        truncated,
        written,
    })
}
