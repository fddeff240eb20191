use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::executor::ActionOutcome;

/// Tally of one workflow run.
///
/// `attempted` counts actions sent to the API; `succeeded` and `failed`
/// split them. `skipped` counts candidates that never reached the API
/// (policy rejections, known ids, profiles the lookup did not return).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl RunReport {
    /// Count an executed action. Returns whether it succeeded.
    pub fn record(&mut self, outcome: &ActionOutcome) -> bool {
        self.attempted += 1;
        if outcome.is_done() {
            self.succeeded += 1;
            true
        } else {
            self.failed += 1;
            false
        }
    }

    pub fn skip(&mut self, n: usize) {
        self.skipped += n;
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "attempted: {}, succeeded: {}, failed: {}, skipped: {}",
            self.attempted, self.succeeded, self.failed, self.skipped
        )
    }
}

/// Result of a follower sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub followers: usize,
    pub following: usize,
}

/// Result of writing the non-followers report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NonFollowersReport {
    pub path: PathBuf,
    /// Accounts followed by the operator that do not follow back.
    pub total: usize,
    /// Of those, how many the lookup returned and the report lists.
    pub listed: usize,
}
