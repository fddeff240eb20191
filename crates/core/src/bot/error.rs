use thiserror::Error;

use crate::api::ApiError;
use crate::archive::ArchiveError;
use crate::executor::ExecutorError;
use crate::store::StoreError;

/// Errors that end a workflow.
#[derive(Debug, Error)]
pub enum BotError {
    /// The API refused further calls. The run must stop.
    #[error("Quota exceeded during {action}: {source}")]
    QuotaExceeded {
        action: String,
        #[source]
        source: ApiError,
    },

    /// An API call the workflow cannot continue without failed.
    #[error("API error: {0}")]
    Api(#[source] ApiError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

impl BotError {
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, BotError::QuotaExceeded { .. })
    }

    pub(crate) fn api(action: impl Into<String>, source: ApiError) -> Self {
        if source.is_quota_exceeded() {
            BotError::QuotaExceeded {
                action: action.into(),
                source,
            }
        } else {
            BotError::Api(source)
        }
    }
}

impl From<ExecutorError> for BotError {
    fn from(err: ExecutorError) -> Self {
        match err {
            ExecutorError::QuotaExceeded { action, source } => {
                BotError::QuotaExceeded { action, source }
            }
        }
    }
}
