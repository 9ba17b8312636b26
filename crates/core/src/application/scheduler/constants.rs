// Scheduler and monitor defaults
use std::time::Duration;

/// Interval between scheduler ticks (30s)
pub const CHECK_INTERVAL: Duration = Duration::from_secs(30);

/// Age after which a pending/printing job counts as stuck (5 minutes)
pub const STUCK_JOB_THRESHOLD: Duration = Duration::from_secs(5 * 60);

/// Health-check request timeout (5s)
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Elapsed time above which an inconclusive response is "slow" (5s)
pub const SLOW_RESPONSE_THRESHOLD: Duration = Duration::from_secs(5);

/// Consecutive failures required before escalation
pub const DEFAULT_RETRY_THRESHOLD: u32 = 3;
