//! Utility functions and helpers.
//!
//! - [`format`] - Number formatting for console summaries
//! - [`progress`] - Progress bar used while enriching role assignments
//! - [`time`] - Timestamp parsing and export formatting
//!
//! # Examples
//!
//! ```
//! use entra_audit_tools::utils::time::{format_activity_time, parse_timestamp};
//!
//! let ts = parse_timestamp("2025-07-24T09:15:42.1234567Z").unwrap();
//! assert_eq!(format_activity_time(&ts), "2025-07-24 09:15:42");
//! ```

pub mod format;
pub mod progress;
pub mod time;
