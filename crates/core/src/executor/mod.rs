//! Paced execution of remote mutations.
//!
//! Every action is one attempt preceded by a randomized pause. Ordinary
//! API failures are logged and reported as [`ActionOutcome::Failed`] so a
//! batch can carry on; quota errors come back as
//! [`ExecutorError::QuotaExceeded`] and end the run.

mod action;
mod pacing;

pub use action::{Action, ActionOutcome};
pub use pacing::{NoPacer, Pacer, RandomPacer};

use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

use crate::api::{ApiError, SocialApi};
use crate::metrics;

/// Errors that stop a batch of actions.
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("Quota exceeded during {action}: {source}")]
    QuotaExceeded {
        action: String,
        #[source]
        source: ApiError,
    },
}

/// Runs [`Action`]s against a [`SocialApi`], one at a time.
pub struct ActionExecutor {
    api: Arc<dyn SocialApi>,
    pacer: Arc<dyn Pacer>,
}

impl std::fmt::Debug for ActionExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionExecutor")
            .field("api", &self.api.name())
            .field("pacer", &"<pacer>")
            .finish()
    }
}

impl ActionExecutor {
    pub fn new(api: Arc<dyn SocialApi>, pacer: Arc<dyn Pacer>) -> Self {
        Self { api, pacer }
    }

    pub fn api(&self) -> &Arc<dyn SocialApi> {
        &self.api
    }

    /// Pause, then attempt `action` once.
    pub async fn execute(&self, action: &Action) -> Result<ActionOutcome, ExecutorError> {
        self.pacer.pause().await;

        let kind = action.kind();
        match self.dispatch(action).await {
            Ok(summary) => {
                info!(action = kind, "{}: {}", action, summary);
                metrics::ACTIONS_TOTAL
                    .with_label_values(&[kind, "done"])
                    .inc();
                Ok(ActionOutcome::Done(summary))
            }
            Err(e) if e.is_quota_exceeded() => {
                error!(action = kind, error = %e, "Quota exceeded, stopping");
                metrics::ACTIONS_TOTAL
                    .with_label_values(&[kind, "quota_exceeded"])
                    .inc();
                Err(ExecutorError::QuotaExceeded {
                    action: action.to_string(),
                    source: e,
                })
            }
            Err(e) => {
                error!(action = kind, error = %e, "Failed to {}", action);
                metrics::ACTIONS_TOTAL
                    .with_label_values(&[kind, "failed"])
                    .inc();
                Ok(ActionOutcome::Failed(e.to_string()))
            }
        }
    }

    async fn dispatch(&self, action: &Action) -> Result<String, ApiError> {
        let summary = match action {
            Action::Follow(id) => self.api.follow(*id).await?.to_string(),
            Action::Unfollow(id) => self.api.unfollow(*id).await?.to_string(),
            Action::Favorite(id) => post_summary(&self.api.favorite(*id).await?),
            Action::Retweet(id) => post_summary(&self.api.retweet(*id).await?),
            Action::Unretweet(id) => post_summary(&self.api.unretweet(*id).await?),
            Action::Post { text, media } => {
                post_summary(&self.api.post_status(text, media.as_deref()).await?)
            }
            Action::DeleteStatus(id) => post_summary(&self.api.delete_status(*id).await?),
            Action::Mute(id) => self.api.mute(*id).await?.to_string(),
            Action::Unmute(id) => self.api.unmute(*id).await?.to_string(),
            Action::AddToList {
                owner,
                slug,
                screen_name,
            } => {
                let list = self.api.add_list_member(owner, slug, screen_name).await?;
                format!("@{} added to list {} ({})", screen_name, list.slug, list.id)
            }
        };
        Ok(summary)
    }
}

fn post_summary(post: &crate::api::Post) -> String {
    format!("status {} by @{}", post.id, post.user.screen_name)
}
