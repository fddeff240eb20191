use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::PolicyConfig;

/// Outcome of evaluating a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyDecision {
    Proceed,
    SkipLowFollowers,
    SkipRatio,
    SkipGhost,
    SkipProtected,
    SkipAlreadyFollowing,
    SkipVerifiedMismatch,
}

impl PolicyDecision {
    pub fn is_proceed(&self) -> bool {
        matches!(self, PolicyDecision::Proceed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyDecision::Proceed => "proceed",
            PolicyDecision::SkipLowFollowers => "skip_low_followers",
            PolicyDecision::SkipRatio => "skip_ratio",
            PolicyDecision::SkipGhost => "skip_ghost",
            PolicyDecision::SkipProtected => "skip_protected",
            PolicyDecision::SkipAlreadyFollowing => "skip_already_following",
            PolicyDecision::SkipVerifiedMismatch => "skip_verified_mismatch",
        }
    }
}

impl fmt::Display for PolicyDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which kind of action the decision gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionPath {
    /// Creating a relationship: acceptance rules apply.
    Follow,
    /// Removing a relationship: only the verified rule applies.
    Unfollow,
}

/// Thresholds the filter compares profiles against.
#[derive(Debug, Clone, PartialEq)]
pub struct Thresholds {
    pub min_followers: u64,
    pub min_statuses: u64,
    pub ratio_low: f64,
    pub ratio_high: f64,
    pub allow_protected: bool,
    pub unfollow_verified: bool,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::from(&PolicyConfig::default())
    }
}

impl From<&PolicyConfig> for Thresholds {
    fn from(config: &PolicyConfig) -> Self {
        Self {
            min_followers: config.min_followers,
            min_statuses: config.min_statuses,
            ratio_low: config.ratio_low,
            ratio_high: config.ratio_high,
            allow_protected: config.allow_protected,
            unfollow_verified: config.unfollow_verified,
        }
    }
}
