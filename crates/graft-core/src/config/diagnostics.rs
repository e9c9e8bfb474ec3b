//! Resolution diagnostics settings.

use serde::{Deserialize, Serialize};

/// Controls which non-fatal resolution warnings reach the log.
///
/// Warnings are always recorded on the resolved props; these switches only
/// decide whether they are also logged. Resolved data never depends on them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Log when a declared fragment has no prop at all.
    #[serde(default = "default_true")]
    pub warn_missing_data: bool,

    /// Log when a singular prop carries no fragment pointer (mock or
    /// unfetched data).
    #[serde(default = "default_true")]
    pub warn_unfetched_data: bool,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            warn_missing_data: true,
            warn_unfetched_data: true,
        }
    }
}

impl DiagnosticsConfig {
    /// Record warnings without logging them.
    pub fn silent() -> Self {
        Self {
            warn_missing_data: false,
            warn_unfetched_data: false,
        }
    }
}

fn default_true() -> bool {
    true
}
