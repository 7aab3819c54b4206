//! Directory audit and role-assignment data handling.
//!
//! ## Key Components
//!
//! - [`types`] - Graph resource types (audits, role assignments, identities)
//! - [`filter`] - OData `$filter` construction for the audit time window
//! - [`projection`] - Audit record to flat row projection
//! - [`roles`] - Role-assignment enrichment with identity and role lookups
//! - [`export`] - CSV and JSON writers
//!
//! ## Example
//!
//! ```
//! use entra_audit_tools::audit::projection::SsprAuditRow;
//! use entra_audit_tools::audit::export::ExportRecord;
//! use entra_audit_tools::audit::types::DirectoryAudit;
//!
//! let audit: DirectoryAudit = serde_json::from_str(
//!     r#"{"activityDisplayName": "Reset password (self-service)", "result": "success"}"#,
//! ).unwrap();
//! let row = SsprAuditRow::project(&audit);
//! assert_eq!(row.fields().len(), SsprAuditRow::HEADER.len());
//! ```

pub mod export;
pub mod filter;
pub mod projection;
pub mod roles;
pub mod types;
