//! Timing configuration
//!
//! All parameters are compile-time constants; the structs only bundle
//! them for the components that consume them.

/// Send a keepalive ping after this long without a liveness signal
pub const PING_INTERVAL_MS: u64 = 2_500;

/// Drop the session after this long without a liveness signal
pub const TIMEOUT_INTERVAL_MS: u64 = 5_000;

/// Delay between control-loop cycles (also throttles held-key repeats)
pub const SCAN_INTERVAL_MS: u64 = 200;

/// Session keepalive timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SessionConfig {
    /// Idle time before a ping is sent (exclusive)
    pub ping_interval_ms: u64,
    /// Idle time before the session is dropped (exclusive)
    pub timeout_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ping_interval_ms: PING_INTERVAL_MS,
            timeout_ms: TIMEOUT_INTERVAL_MS,
        }
    }
}

/// Control-loop timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LoopConfig {
    /// Sleep at the end of each cycle
    pub scan_interval_ms: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            scan_interval_ms: SCAN_INTERVAL_MS,
        }
    }
}
