//! Export command implementations.
//!
//! Each module implements one subcommand. All of them take an already
//! authenticated [`GraphClient`](crate::graph_api::GraphClient) session.
//!
//! - [`sspr_audit`] - Directory audit export for one activity over a trailing window
//! - [`role_assignments`] - Role-assignment export with principal and role resolution
//! - [`export_all`] - Both exports, one after the other

pub mod export_all;
pub mod role_assignments;
pub mod sspr_audit;
