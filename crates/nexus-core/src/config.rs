//! Sync engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Maximum failed replay attempts before an operation is dropped for good.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Interval of the periodic backstop drain.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(30);

/// Tuning knobs for the sync engine.
///
/// Defaults match the shipped client behavior: three attempts per operation
/// and a 30 second backstop timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Retry ceiling per queued operation
    pub max_retries: u32,
    /// Backstop drain interval
    pub sync_interval: Duration,
    /// Connectivity assumed at startup, before the host reports a signal
    pub assume_online: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            sync_interval: DEFAULT_SYNC_INTERVAL,
            assume_online: true,
        }
    }
}
