//! OData filter construction for directory audit queries.
//!
//! Builds the `$filter` expression sent to `/auditLogs/directoryAudits`:
//! an activity-name equality ANDed with a trailing UTC time window.
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use entra_audit_tools::audit::filter::{build_filter, AuditWindow, SSPR_ACTIVITY};
//!
//! let now = Utc.with_ymd_and_hms(2025, 7, 29, 14, 5, 0).unwrap();
//! let window = AuditWindow::trailing(now, 7).unwrap();
//! assert_eq!(
//!     build_filter(SSPR_ACTIVITY, &window),
//!     "activityDisplayName eq 'Reset password (self-service)' and \
//!      activityDateTime ge 2025-07-22T00:00:00Z and activityDateTime le 2025-07-29T00:00:00Z"
//! );
//! ```

use crate::config::ConfigError;
use chrono::{DateTime, Duration, NaiveTime, Utc};

/// Activity display name Graph records for self-service password resets
pub const SSPR_ACTIVITY: &str = "Reset password (self-service)";

/// Default trailing window length in days
pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// Midnight-aligned UTC window, `lower <= upper`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditWindow {
    pub lower: DateTime<Utc>,
    pub upper: DateTime<Utc>,
}

impl AuditWindow {
    /// Window of `days` whole days ending at the UTC midnight of `now`.
    pub fn trailing(now: DateTime<Utc>, days: u32) -> Result<Self, ConfigError> {
        if days == 0 {
            return Err(ConfigError::InvalidWindow(days));
        }

        let upper = truncate_to_midnight(now);
        let lower = upper
            .checked_sub_signed(Duration::days(i64::from(days)))
            .ok_or(ConfigError::InvalidWindow(days))?;
        Ok(Self { lower, upper })
    }

    /// Window ending today, recomputed from the system clock on every call
    pub fn trailing_from_now(days: u32) -> Result<Self, ConfigError> {
        Self::trailing(Utc::now(), days)
    }

    pub fn length(&self) -> Duration {
        self.upper - self.lower
    }
}

fn truncate_to_midnight(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Format a bound the way the directory audit endpoint expects it
pub fn format_bound(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT00:00:00Z").to_string()
}

/// Quote a value as an OData string literal
fn odata_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Build the `$filter` expression for `activity` inside `window`.
pub fn build_filter(activity: &str, window: &AuditWindow) -> String {
    format!(
        "activityDisplayName eq {} and activityDateTime ge {} and activityDateTime le {}",
        odata_literal(activity),
        format_bound(&window.lower),
        format_bound(&window.upper),
    )
}
