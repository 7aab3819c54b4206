//! Data structures representing Microsoft Graph directory resources.
//!
//! These types mirror the JSON returned by the Graph `v1.0` endpoints for
//! directory audits, role assignments and the identities they reference.
//! Almost every field is optional: Graph omits or nulls properties freely,
//! and the exporters substitute empty strings rather than failing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Collection wrapper returned by Graph list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphCollection<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    /// Present when the server has more pages than it returned
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

/// A single directory audit event (`/auditLogs/directoryAudits`).
///
/// # Fields
///
/// - `activity_display_name`: e.g. "Reset password (self-service)"
/// - `activity_date_time`: when the activity happened, UTC
/// - `correlation_id`: groups events from one logical operation
/// - `initiated_by`: user or application that started the activity
/// - `target_resources`: objects the activity acted upon
/// - `additional_details`: free-form key/value pairs
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryAudit {
    pub id: Option<String>,
    pub category: Option<String>,
    pub correlation_id: Option<String>,
    pub result: Option<AuditResult>,
    pub result_reason: Option<String>,
    pub activity_display_name: Option<String>,
    pub activity_date_time: Option<DateTime<Utc>>,
    pub logged_by_service: Option<String>,
    pub operation_type: Option<String>,
    pub initiated_by: Option<AuditActivityInitiator>,
    pub target_resources: Option<Vec<TargetResource>>,
    pub additional_details: Option<Vec<KeyValue>>,
}

/// Outcome of an audited activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AuditResult {
    Success,
    Failure,
    Timeout,
    UnknownFutureValue,
    #[serde(other)]
    Other,
}

impl AuditResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Timeout => "timeout",
            Self::UnknownFutureValue => "unknownFutureValue",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for AuditResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who started an audited activity. At most one side is normally populated.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditActivityInitiator {
    pub user: Option<UserIdentity>,
    pub app: Option<AppIdentity>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub id: Option<String>,
    pub display_name: Option<String>,
    pub user_principal_name: Option<String>,
    pub ip_address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppIdentity {
    pub app_id: Option<String>,
    pub display_name: Option<String>,
    pub service_principal_id: Option<String>,
    pub service_principal_name: Option<String>,
}

/// An object acted upon by an audited activity.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetResource {
    pub id: Option<String>,
    pub display_name: Option<String>,
    #[serde(rename = "type")]
    pub resource_type: Option<String>,
    pub user_principal_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct KeyValue {
    pub key: Option<String>,
    pub value: Option<String>,
}

impl DirectoryAudit {
    /// First target resource, if any
    pub fn first_target(&self) -> Option<&TargetResource> {
        self.target_resources.as_ref()?.first()
    }

    /// First additional detail, if any
    pub fn first_detail(&self) -> Option<&KeyValue> {
        self.additional_details.as_ref()?.first()
    }

    /// The initiating user, if the activity was user-initiated
    pub fn initiating_user(&self) -> Option<&UserIdentity> {
        self.initiated_by.as_ref()?.user.as_ref()
    }

    /// The initiating application, if the activity was app-initiated
    pub fn initiating_app(&self) -> Option<&AppIdentity> {
        self.initiated_by.as_ref()?.app.as_ref()
    }
}

/// A directory role assignment (`/roleManagement/directory/roleAssignments`).
///
/// `principal` is only populated when the listing was requested with
/// `$expand=principal`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAssignment {
    pub id: Option<String>,
    pub principal_id: Option<String>,
    pub role_definition_id: Option<String>,
    pub directory_scope_id: Option<String>,
    pub principal: Option<DirectoryObject>,
}

impl RoleAssignment {
    /// Principal id, preferring the expanded object over the flat property
    pub fn principal_ref_id(&self) -> Option<&str> {
        self.principal
            .as_ref()
            .and_then(|p| p.id.as_deref())
            .filter(|id| !id.is_empty())
            .or_else(|| self.principal_id.as_deref().filter(|id| !id.is_empty()))
    }

    /// The reported `@odata.type` tag of the expanded principal
    pub fn principal_odata_type(&self) -> Option<&str> {
        self.principal.as_ref()?.odata_type.as_deref()
    }
}

/// Minimal polymorphic directory object as returned by `$expand`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryObject {
    #[serde(rename = "@odata.type")]
    pub odata_type: Option<String>,
    pub id: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Option<String>,
    pub display_name: Option<String>,
    pub mail: Option<String>,
    pub user_principal_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePrincipal {
    pub id: Option<String>,
    pub display_name: Option<String>,
    pub app_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleDefinition {
    pub id: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
}
