//! # Entra Audit Tools
//!
//! Command-line tools for exporting Microsoft Entra ID directory audit logs
//! and directory role assignments through the Microsoft Graph API.
//!
//! ## Overview
//!
//! The tool authenticates as an application (OAuth2 client credentials),
//! then runs one or both export pipelines:
//!
//! - **Audit export**: builds an OData filter for one activity (by default
//!   `Reset password (self-service)`) over a trailing UTC window, fetches the
//!   matching directory audit events and projects each onto a flat row.
//! - **Role-assignment export**: lists role assignments, resolves every
//!   principal to a user or enterprise application and every role definition
//!   to its name, and emits one row per assignment.
//!
//! Rows are written as CSV (fixed header) and/or pretty-printed JSON.
//! Everything runs sequentially with one request in flight at a time.
//!
//! ## Architecture
//!
//! - [`audit`] - Graph types, filter construction, projection, enrichment, export
//! - [`commands`] - Subcommand implementations
//! - [`config`] - Credential and endpoint resolution (flags, environment, `.env`)
//! - [`graph_api`] - Token acquisition and the Graph HTTP client
//! - [`utils`] - Formatting, progress and time helpers
//!
//! ## Example Usage
//!
//! ```bash
//! # Credentials from the environment or a .env file
//! export TENANT_ID=... CLIENT_ID=... CLIENT_SECRET=...
//!
//! # Last week of self-service password resets
//! entra-audit sspr-audit
//!
//! # Role assignments with resolved principals
//! entra-audit role-assignments --format both
//!
//! # Both exports into one directory
//! entra-audit export-all --output-dir reports/
//! ```
//!
//! ## Required Graph permissions
//!
//! - `AuditLog.Read.All` for the audit export
//! - `RoleManagement.Read.Directory`, `User.Read.All` and
//!   `Application.Read.All` for the role-assignment export

pub mod audit;
pub mod commands;
pub mod config;
pub mod graph_api;
pub mod utils;
