//! Projection of directory audit records onto flat export rows.
//!
//! Two field sets are available:
//!
//! - [`SsprAuditRow`]: the full 17-column export
//! - [`AuditSummaryRow`]: the compact 5-column export
//!
//! Only the first target resource and the first additional detail of a
//! record are projected. Absent values always become empty strings.

use crate::audit::export::ExportRecord;
use crate::audit::types::DirectoryAudit;
use crate::utils::time::format_activity_time;
use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FieldSet {
    Full,
    Summary,
}

fn text(value: Option<&String>) -> String {
    value.cloned().unwrap_or_default()
}

fn activity_time(audit: &DirectoryAudit) -> String {
    audit
        .activity_date_time
        .as_ref()
        .map(format_activity_time)
        .unwrap_or_default()
}

fn result_text(audit: &DirectoryAudit) -> String {
    audit
        .result
        .map(|r| r.as_str().to_string())
        .unwrap_or_default()
}

/// Full audit export row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SsprAuditRow {
    pub activity_date_time: String,
    pub correlation_id: String,
    pub logged_by_service: String,
    pub category: String,
    pub activity_display_name: String,
    pub result: String,
    pub result_reason: String,
    pub initiator_type: String,
    pub initiator_id: String,
    pub initiator_user_principal_name: String,
    pub initiator_display_name: String,
    pub target_type: String,
    pub target_display_name: String,
    pub target_user_principal_name: String,
    pub target_id: String,
    pub additional_detail_key: String,
    pub additional_detail_value: String,
}

impl SsprAuditRow {
    pub fn project(audit: &DirectoryAudit) -> Self {
        let (initiator_type, initiator_id, initiator_upn, initiator_name) =
            if let Some(user) = audit.initiating_user() {
                (
                    "User".to_string(),
                    text(user.id.as_ref()),
                    text(user.user_principal_name.as_ref()),
                    text(user.display_name.as_ref()),
                )
            } else if let Some(app) = audit.initiating_app() {
                (
                    "Application".to_string(),
                    text(app.service_principal_id.as_ref().or(app.app_id.as_ref())),
                    text(app.service_principal_name.as_ref()),
                    text(app.display_name.as_ref()),
                )
            } else {
                Default::default()
            };

        let target = audit.first_target();
        let detail = audit.first_detail();

        Self {
            activity_date_time: activity_time(audit),
            correlation_id: text(audit.correlation_id.as_ref()),
            logged_by_service: text(audit.logged_by_service.as_ref()),
            category: text(audit.category.as_ref()),
            activity_display_name: text(audit.activity_display_name.as_ref()),
            result: result_text(audit),
            result_reason: text(audit.result_reason.as_ref()),
            initiator_type,
            initiator_id,
            initiator_user_principal_name: initiator_upn,
            initiator_display_name: initiator_name,
            target_type: text(target.and_then(|t| t.resource_type.as_ref())),
            target_display_name: text(target.and_then(|t| t.display_name.as_ref())),
            target_user_principal_name: text(target.and_then(|t| t.user_principal_name.as_ref())),
            target_id: text(target.and_then(|t| t.id.as_ref())),
            additional_detail_key: text(detail.and_then(|d| d.key.as_ref())),
            additional_detail_value: text(detail.and_then(|d| d.value.as_ref())),
        }
    }
}

impl ExportRecord for SsprAuditRow {
    const HEADER: &'static [&'static str] = &[
        "activityDateTime",
        "correlationId",
        "loggedByService",
        "category",
        "activityDisplayName",
        "result",
        "resultReason",
        "initiatorType",
        "initiatorId",
        "initiatorUserPrincipalName",
        "initiatorDisplayName",
        "targetType",
        "targetDisplayName",
        "targetUserPrincipalName",
        "targetId",
        "additionalDetailKey",
        "additionalDetailValue",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.activity_date_time.clone(),
            self.correlation_id.clone(),
            self.logged_by_service.clone(),
            self.category.clone(),
            self.activity_display_name.clone(),
            self.result.clone(),
            self.result_reason.clone(),
            self.initiator_type.clone(),
            self.initiator_id.clone(),
            self.initiator_user_principal_name.clone(),
            self.initiator_display_name.clone(),
            self.target_type.clone(),
            self.target_display_name.clone(),
            self.target_user_principal_name.clone(),
            self.target_id.clone(),
            self.additional_detail_key.clone(),
            self.additional_detail_value.clone(),
        ]
    }
}

/// Compact audit export row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditSummaryRow {
    pub activity_display_name: String,
    pub activity_date_time: String,
    pub initiated_by: String,
    pub category: String,
    pub result: String,
}

impl AuditSummaryRow {
    pub fn project(audit: &DirectoryAudit) -> Self {
        let initiated_by = audit
            .initiating_user()
            .and_then(|u| u.user_principal_name.as_ref())
            .or_else(|| audit.initiating_app().and_then(|a| a.display_name.as_ref()));

        Self {
            activity_display_name: text(audit.activity_display_name.as_ref()),
            activity_date_time: activity_time(audit),
            initiated_by: text(initiated_by),
            category: text(audit.category.as_ref()),
            result: result_text(audit),
        }
    }
}

impl ExportRecord for AuditSummaryRow {
    const HEADER: &'static [&'static str] = &[
        "activityDisplayName",
        "activityDateTime",
        "initiatedBy",
        "category",
        "result",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.activity_display_name.clone(),
            self.activity_date_time.clone(),
            self.initiated_by.clone(),
            self.category.clone(),
            self.result.clone(),
        ]
    }
}
