use std::time::Duration;

// Route targets baked into the transfer document and the error paths.
pub const DASHBOARD_PATH: &str = "/dashboard";
pub const ERROR_PATH: &str = "/error";

// A token counts as "expiring soon" inside this window before its exp.
pub const EXPIRY_MARGIN_MS: i64 = 60_000;

// Access tokens live ~15 minutes; refreshing every 14 keeps the
// expiring-soon window from being hit during normal use.
pub const REFRESH_TIMER_INTERVAL: Duration = Duration::from_secs(14 * 60);
