use tracing::info;

use crate::api::UserProfile;
use crate::metrics;
use crate::store::{IgnoreLog, StoreError};

use super::{ActionPath, PolicyDecision, Thresholds};

/// Decide whether an action on `profile` may proceed.
///
/// Rules run in a fixed order and the first match wins:
///
/// 1. already followed by the operator
/// 2. protected, unless protected accounts are allowed
/// 3. fewer followers than `min_followers`
/// 4. fewer posts than `min_statuses`
/// 5. followers / following outside `[ratio_low, ratio_high]`
///    (following nobody counts as ratio 0)
/// 6. verified flag differs from `unfollow_verified`
///
/// Rules 1-5 gate [`ActionPath::Follow`], rule 6 gates
/// [`ActionPath::Unfollow`].
pub fn decide(profile: &UserProfile, thresholds: &Thresholds, path: ActionPath) -> PolicyDecision {
    match path {
        ActionPath::Follow => {
            if profile.is_followed() {
                return PolicyDecision::SkipAlreadyFollowing;
            }
            if profile.is_protected() && !thresholds.allow_protected {
                return PolicyDecision::SkipProtected;
            }
            if profile.followers() < thresholds.min_followers {
                return PolicyDecision::SkipLowFollowers;
            }
            if profile.statuses() < thresholds.min_statuses {
                return PolicyDecision::SkipGhost;
            }
            let ratio = profile.ff_ratio();
            if ratio < thresholds.ratio_low || ratio > thresholds.ratio_high {
                return PolicyDecision::SkipRatio;
            }
        }
        ActionPath::Unfollow => {
            if profile.is_verified() != thresholds.unfollow_verified {
                return PolicyDecision::SkipVerifiedMismatch;
            }
        }
    }
    PolicyDecision::Proceed
}

/// [`decide`] plus bookkeeping: rejected accounts go to the ignore log.
#[derive(Debug)]
pub struct PolicyFilter {
    thresholds: Thresholds,
    ignored: IgnoreLog,
}

impl PolicyFilter {
    pub fn new(thresholds: Thresholds, ignored: IgnoreLog) -> Self {
        Self {
            thresholds,
            ignored,
        }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn ignored(&self) -> &IgnoreLog {
        &self.ignored
    }

    pub fn evaluate(
        &mut self,
        profile: &UserProfile,
        path: ActionPath,
    ) -> Result<PolicyDecision, StoreError> {
        let decision = decide(profile, &self.thresholds, path);
        metrics::POLICY_DECISIONS
            .with_label_values(&[decision.as_str()])
            .inc();

        if !decision.is_proceed() {
            info!(
                user_id = %profile.id,
                screen_name = %profile.screen_name,
                %decision,
                "Skipping {}",
                profile
            );
            self.ignored.record(profile.id)?;
        }

        Ok(decision)
    }
}
