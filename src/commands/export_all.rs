//! Run the audit export and the role-assignment export back to back.
//!
//! Both pipelines share one authenticated session and run sequentially;
//! a fatal error in the first stops the run before the second starts.

use crate::commands::role_assignments::{self, RoleExportOptions, RoleExportReport};
use crate::commands::sspr_audit::{self, AuditExportOptions, AuditExportReport};
use crate::graph_api::GraphClient;
use anyhow::Result;

pub async fn run(
    client: &GraphClient,
    audit_options: &AuditExportOptions,
    role_options: &RoleExportOptions,
) -> Result<(AuditExportReport, RoleExportReport)> {
    let audit_report = sspr_audit::run(client, audit_options).await?;
    eprintln!();
    let role_report = role_assignments::run(client, role_options).await?;
    Ok((audit_report, role_report))
}
