//! Role-assignment enrichment.
//!
//! Joins each directory role assignment with the identity of its principal
//! and the display name of its role definition. Principals are probed as a
//! user first and as a service principal second. Lookup misses degrade the
//! row instead of aborting the export. Transport and authorization failures
//! still propagate.

use crate::audit::export::ExportRecord;
use crate::audit::types::{RoleAssignment, RoleDefinition, ServicePrincipal, User};
use crate::graph_api::GraphError;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Id-keyed directory lookups used by the joiner.
///
/// A missing object must be reported as [`GraphError::NotFound`]; every other
/// error is treated as fatal.
#[allow(async_fn_in_trait)]
pub trait DirectoryLookup {
    async fn get_user(&self, id: &str) -> Result<User, GraphError>;
    async fn get_service_principal(&self, id: &str) -> Result<ServicePrincipal, GraphError>;
    async fn get_role_definition(&self, id: &str) -> Result<RoleDefinition, GraphError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityKind {
    User,
    EnterpriseApplication,
    Unknown,
}

impl IdentityKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::EnterpriseApplication => "Enterprise Application",
            Self::Unknown => "",
        }
    }
}

impl fmt::Display for IdentityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("Unknown"),
            other => f.write_str(other.label()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub kind: IdentityKind,
    pub name: String,
    pub email: String,
}

impl ResolvedIdentity {
    fn unknown() -> Self {
        Self {
            kind: IdentityKind::Unknown,
            name: String::new(),
            email: String::new(),
        }
    }
}

/// Resolve a principal id by probing users, then service principals.
///
/// Returns [`IdentityKind::Unknown`] for an empty id or when neither lookup
/// finds the object.
pub async fn resolve_identity<L: DirectoryLookup>(
    lookup: &L,
    principal_id: &str,
) -> Result<ResolvedIdentity, GraphError> {
    if principal_id.is_empty() {
        return Ok(ResolvedIdentity::unknown());
    }

    match lookup.get_user(principal_id).await {
        Ok(user) => {
            return Ok(ResolvedIdentity {
                kind: IdentityKind::User,
                name: user.display_name.unwrap_or_default(),
                email: user.mail.unwrap_or_default(),
            })
        }
        Err(e) if e.is_not_found() => {
            tracing::debug!(principal_id, "not a user, trying service principal");
        }
        Err(e) => return Err(e),
    }

    match lookup.get_service_principal(principal_id).await {
        Ok(sp) => Ok(ResolvedIdentity {
            kind: IdentityKind::EnterpriseApplication,
            name: sp.display_name.unwrap_or_default(),
            email: String::new(),
        }),
        Err(e) if e.is_not_found() => Ok(ResolvedIdentity::unknown()),
        Err(e) => Err(e),
    }
}

/// Map a reported `@odata.type` tag to a display label
pub fn principal_type_label(odata_type: &str) -> &'static str {
    if odata_type.ends_with("servicePrincipal") {
        "Enterprise Application"
    } else if odata_type.ends_with("user") {
        "User"
    } else {
        ""
    }
}

/// One row of `role_assignment_logs.csv`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAssignmentRow {
    pub role_name: String,
    pub principal_name: String,
    pub principal_email: String,
    pub principal_type: String,
}

impl ExportRecord for RoleAssignmentRow {
    const HEADER: &'static [&'static str] =
        &["roleName", "principalName", "principalEmail", "principalType"];

    fn fields(&self) -> Vec<String> {
        vec![
            self.role_name.clone(),
            self.principal_name.clone(),
            self.principal_email.clone(),
            self.principal_type.clone(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentOutcome {
    Complete,
    Degraded(Vec<String>),
}

/// Result of joining one assignment
#[derive(Debug, Clone)]
pub struct EnrichedAssignment {
    pub assignment_id: String,
    pub identity: ResolvedIdentity,
    /// Label derived from the reported `@odata.type`, empty when absent
    pub reported_type: String,
    pub row: RoleAssignmentRow,
    pub outcome: EnrichmentOutcome,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentSummary {
    pub total: usize,
    pub complete: usize,
    pub degraded: usize,
}

impl EnrichmentSummary {
    pub fn from_results(results: &[EnrichedAssignment]) -> Self {
        let degraded = results
            .iter()
            .filter(|r| matches!(r.outcome, EnrichmentOutcome::Degraded(_)))
            .count();
        Self {
            total: results.len(),
            complete: results.len() - degraded,
            degraded,
        }
    }
}

/// Joins assignments against a [`DirectoryLookup`], memoizing role names.
pub struct RoleEnricher<'a, L> {
    lookup: &'a L,
    role_names: HashMap<String, Option<String>>,
}

impl<'a, L: DirectoryLookup> RoleEnricher<'a, L> {
    pub fn new(lookup: &'a L) -> Self {
        Self {
            lookup,
            role_names: HashMap::new(),
        }
    }

    async fn role_name(&mut self, role_definition_id: &str) -> Result<Option<String>, GraphError> {
        if let Some(cached) = self.role_names.get(role_definition_id) {
            return Ok(cached.clone());
        }

        let name = match self.lookup.get_role_definition(role_definition_id).await {
            Ok(def) => Some(def.display_name.unwrap_or_default()),
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e),
        };
        self.role_names
            .insert(role_definition_id.to_string(), name.clone());
        Ok(name)
    }

    /// Enrich a single assignment.
    pub async fn enrich(
        &mut self,
        assignment: &RoleAssignment,
    ) -> Result<EnrichedAssignment, GraphError> {
        let assignment_id = assignment.id.clone().unwrap_or_default();
        let mut reasons = Vec::new();

        let identity = match assignment.principal_ref_id() {
            Some(principal_id) => {
                let identity = resolve_identity(self.lookup, principal_id).await?;
                if identity.kind == IdentityKind::Unknown {
                    reasons.push(format!(
                        "principal {} is neither a user nor a service principal",
                        principal_id
                    ));
                }
                identity
            }
            None => {
                reasons.push("assignment has no principal id".to_string());
                ResolvedIdentity::unknown()
            }
        };

        let reported_type = principal_type_label(assignment.principal_odata_type().unwrap_or(""));
        let principal_type = reconcile_principal_type(&assignment_id, reported_type, identity.kind);

        let role_name = match assignment
            .role_definition_id
            .as_deref()
            .filter(|id| !id.is_empty())
        {
            Some(role_id) => match self.role_name(role_id).await? {
                Some(name) => name,
                None => {
                    reasons.push(format!("role definition {} not found", role_id));
                    String::new()
                }
            },
            None => {
                reasons.push("assignment has no role definition id".to_string());
                String::new()
            }
        };

        let outcome = if reasons.is_empty() {
            EnrichmentOutcome::Complete
        } else {
            tracing::warn!(assignment = %assignment_id, reasons = ?reasons, "degraded role assignment row");
            EnrichmentOutcome::Degraded(reasons)
        };

        Ok(EnrichedAssignment {
            assignment_id,
            row: RoleAssignmentRow {
                role_name,
                principal_name: identity.name.clone(),
                principal_email: identity.email.clone(),
                principal_type,
            },
            identity,
            reported_type: reported_type.to_string(),
            outcome,
        })
    }
}

/// Prefer the reported tag; fall back to the resolved kind when it is absent.
fn reconcile_principal_type(assignment_id: &str, reported: &str, resolved: IdentityKind) -> String {
    if reported.is_empty() {
        return resolved.label().to_string();
    }
    if resolved != IdentityKind::Unknown && resolved.label() != reported {
        tracing::warn!(
            assignment = %assignment_id,
            reported,
            resolved = %resolved,
            "reported principal type disagrees with resolved identity"
        );
    }
    reported.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::types::DirectoryObject;
    use std::cell::Cell;

    #[derive(Default)]
    struct FakeDirectory {
        users: HashMap<String, User>,
        service_principals: HashMap<String, ServicePrincipal>,
        roles: HashMap<String, RoleDefinition>,
        fail_transport: bool,
        role_lookups: Cell<usize>,
    }

    fn not_found(id: &str) -> GraphError {
        GraphError::NotFound {
            url: format!("fake://{}", id),
        }
    }

    impl DirectoryLookup for FakeDirectory {
        async fn get_user(&self, id: &str) -> Result<User, GraphError> {
            if self.fail_transport {
                return Err(GraphError::Status {
                    url: "fake://users".to_string(),
                    status: reqwest::StatusCode::BAD_GATEWAY,
                    body: String::new(),
                });
            }
            self.users.get(id).cloned().ok_or_else(|| not_found(id))
        }

        async fn get_service_principal(&self, id: &str) -> Result<ServicePrincipal, GraphError> {
            self.service_principals
                .get(id)
                .cloned()
                .ok_or_else(|| not_found(id))
        }

        async fn get_role_definition(&self, id: &str) -> Result<RoleDefinition, GraphError> {
            self.role_lookups.set(self.role_lookups.get() + 1);
            self.roles.get(id).cloned().ok_or_else(|| not_found(id))
        }
    }

    fn directory() -> FakeDirectory {
        let mut dir = FakeDirectory::default();
        dir.users.insert(
            "user-1".to_string(),
            User {
                id: Some("user-1".to_string()),
                display_name: Some("Ada Lovelace".to_string()),
                mail: Some("ada@contoso.com".to_string()),
                ..Default::default()
            },
        );
        dir.users.insert(
            "user-2".to_string(),
            User {
                id: Some("user-2".to_string()),
                display_name: Some("No Mailbox".to_string()),
                mail: None,
                ..Default::default()
            },
        );
        dir.service_principals.insert(
            "sp-1".to_string(),
            ServicePrincipal {
                id: Some("sp-1".to_string()),
                display_name: Some("Backup Agent".to_string()),
                app_id: Some("app-1".to_string()),
            },
        );
        dir.roles.insert(
            "role-ga".to_string(),
            RoleDefinition {
                id: Some("role-ga".to_string()),
                display_name: Some("Global Administrator".to_string()),
                description: None,
            },
        );
        dir
    }

    fn assignment(principal: &str, odata_type: Option<&str>, role: &str) -> RoleAssignment {
        RoleAssignment {
            id: Some(format!("ra-{}", principal)),
            principal_id: Some(principal.to_string()),
            role_definition_id: Some(role.to_string()),
            directory_scope_id: Some("/".to_string()),
            principal: odata_type.map(|t| DirectoryObject {
                odata_type: Some(t.to_string()),
                id: Some(principal.to_string()),
                display_name: None,
            }),
        }
    }

    #[tokio::test]
    async fn test_resolve_user() {
        let dir = directory();
        let identity = resolve_identity(&dir, "user-1").await.unwrap();
        assert_eq!(identity.kind, IdentityKind::User);
        assert_eq!(identity.name, "Ada Lovelace");
        assert_eq!(identity.email, "ada@contoso.com");
    }

    #[tokio::test]
    async fn test_resolve_user_without_mail() {
        let dir = directory();
        let identity = resolve_identity(&dir, "user-2").await.unwrap();
        assert_eq!(identity.kind, IdentityKind::User);
        assert_eq!(identity.email, "");
    }

    #[tokio::test]
    async fn test_resolve_falls_back_to_service_principal() {
        let dir = directory();
        let identity = resolve_identity(&dir, "sp-1").await.unwrap();
        assert_eq!(identity.kind, IdentityKind::EnterpriseApplication);
        assert_eq!(identity.name, "Backup Agent");
        assert_eq!(identity.email, "");
    }

    #[tokio::test]
    async fn test_resolve_unknown_does_not_abort() {
        let dir = directory();
        let identity = resolve_identity(&dir, "ghost").await.unwrap();
        assert_eq!(identity.kind, IdentityKind::Unknown);
        assert!(identity.name.is_empty());

        let empty = resolve_identity(&dir, "").await.unwrap();
        assert_eq!(empty.kind, IdentityKind::Unknown);
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let dir = FakeDirectory {
            fail_transport: true,
            ..directory()
        };
        let err = resolve_identity(&dir, "user-1").await.unwrap_err();
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_principal_type_label() {
        assert_eq!(
            principal_type_label("#microsoft.graph.servicePrincipal"),
            "Enterprise Application"
        );
        assert_eq!(principal_type_label("#microsoft.graph.user"), "User");
        assert_eq!(principal_type_label("#microsoft.graph.group"), "");
        assert_eq!(principal_type_label(""), "");
    }

    #[tokio::test]
    async fn test_enrich_user_assignment() {
        let dir = directory();
        let mut enricher = RoleEnricher::new(&dir);
        let result = enricher
            .enrich(&assignment("user-1", Some("#microsoft.graph.user"), "role-ga"))
            .await
            .unwrap();

        assert_eq!(result.outcome, EnrichmentOutcome::Complete);
        assert_eq!(result.identity.kind, IdentityKind::User);
        assert_eq!(
            result.row,
            RoleAssignmentRow {
                role_name: "Global Administrator".to_string(),
                principal_name: "Ada Lovelace".to_string(),
                principal_email: "ada@contoso.com".to_string(),
                principal_type: "User".to_string(),
            }
        );
        assert_eq!(result.row.fields().len(), RoleAssignmentRow::HEADER.len());
    }

    #[tokio::test]
    async fn test_enrich_service_principal_assignment() {
        let dir = directory();
        let mut enricher = RoleEnricher::new(&dir);
        let result = enricher
            .enrich(&assignment(
                "sp-1",
                Some("#microsoft.graph.servicePrincipal"),
                "role-ga",
            ))
            .await
            .unwrap();

        assert_eq!(result.identity.kind, IdentityKind::EnterpriseApplication);
        assert_eq!(result.row.principal_email, "");
        assert_eq!(result.row.principal_type, "Enterprise Application");
    }

    #[tokio::test]
    async fn test_missing_type_tag_uses_resolved_kind() {
        let dir = directory();
        let mut enricher = RoleEnricher::new(&dir);
        let result = enricher
            .enrich(&assignment("sp-1", None, "role-ga"))
            .await
            .unwrap();

        assert_eq!(result.reported_type, "");
        assert_eq!(result.row.principal_type, "Enterprise Application");
    }

    #[tokio::test]
    async fn test_unknown_role_degrades_row() {
        let dir = directory();
        let mut enricher = RoleEnricher::new(&dir);
        let result = enricher
            .enrich(&assignment("user-1", Some("#microsoft.graph.user"), "role-gone"))
            .await
            .unwrap();

        assert_eq!(result.row.role_name, "");
        assert_eq!(result.row.principal_name, "Ada Lovelace");
        match result.outcome {
            EnrichmentOutcome::Degraded(reasons) => {
                assert_eq!(reasons.len(), 1);
                assert!(reasons[0].contains("role-gone"));
            }
            EnrichmentOutcome::Complete => panic!("expected degraded outcome"),
        }
    }

    #[tokio::test]
    async fn test_role_definitions_are_memoized() {
        let dir = directory();
        let mut enricher = RoleEnricher::new(&dir);
        for principal in ["user-1", "user-2", "sp-1"] {
            enricher
                .enrich(&assignment(principal, None, "role-ga"))
                .await
                .unwrap();
        }
        assert_eq!(dir.role_lookups.get(), 1);
    }

    #[tokio::test]
    async fn test_summary_counts_outcomes() {
        let dir = directory();
        let mut enricher = RoleEnricher::new(&dir);
        let mut results = Vec::new();
        for (principal, role) in [("user-1", "role-ga"), ("ghost", "role-ga"), ("sp-1", "nope")] {
            results.push(
                enricher
                    .enrich(&assignment(principal, None, role))
                    .await
                    .unwrap(),
            );
        }

        let summary = EnrichmentSummary::from_results(&results);
        assert_eq!(
            summary,
            EnrichmentSummary {
                total: 3,
                complete: 1,
                degraded: 2,
            }
        );
    }
}
