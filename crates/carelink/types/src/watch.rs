//! Phase shared by all status watchers.

use serde::{Deserialize, Serialize};

/// Where a watched resource is in its lifecycle.
///
/// All three poll-driven flows (signature, compliance job, document
/// readiness) share this shape; only the terminal predicate differs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WatchPhase {
    /// Still waiting; polling continues.
    Pending,
    /// Terminal success; polling has stopped.
    Complete,
    /// Terminal failure reported by the backend; polling has stopped.
    Failed,
}

impl WatchPhase {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WatchPhase::Pending)
    }
}

impl std::fmt::Display for WatchPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WatchPhase::Pending => "PENDING",
            WatchPhase::Complete => "COMPLETE",
            WatchPhase::Failed => "FAILED",
        };
        f.write_str(s)
    }
}
