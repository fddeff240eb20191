//! API error types.

use thiserror::Error;

/// API error codes that mean the account has exhausted a quota.
///
/// 88: rate limit exceeded, 161: follow limit reached,
/// 185: daily status update limit reached.
pub const QUOTA_ERROR_CODES: [i64; 3] = [88, 161, 185];

/// Errors returned by a [`SocialApi`](super::SocialApi) implementation.
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// OAuth signature generation failed
    #[error("OAuth error: {0}")]
    OAuth(String),

    /// The API rejected the request
    #[error("API error {status}{}: {message}", .code.map(|c| format!(" (code {})", c)).unwrap_or_default())]
    Api {
        status: u16,
        code: Option<i64>,
        message: String,
    },

    /// HTTP 429
    #[error("Rate limited{}", .retry_after.map(|s| format!(", retry after {} seconds", s)).unwrap_or_default())]
    RateLimited { retry_after: Option<u64> },

    /// Lookup batch exceeds the per-request limit
    #[error("Batch of {size} ids exceeds the limit of {max}")]
    BatchTooLarge { size: usize, max: usize },

    /// Media attachment could not be read or uploaded
    #[error("Media error: {0}")]
    Media(String),
}

impl ApiError {
    /// Whether this error means further calls will only burn quota.
    pub fn is_quota_exceeded(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::Api { status, code, .. } => {
                *status == 429 || code.is_some_and(|c| QUOTA_ERROR_CODES.contains(&c))
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_classification() {
        assert!(ApiError::RateLimited { retry_after: None }.is_quota_exceeded());
        assert!(ApiError::Api {
            status: 403,
            code: Some(161),
            message: "You are unable to follow more people at this time.".into(),
        }
        .is_quota_exceeded());
        assert!(ApiError::Api {
            status: 403,
            code: Some(185),
            message: "User is over daily status update limit.".into(),
        }
        .is_quota_exceeded());
        assert!(ApiError::Api {
            status: 429,
            code: None,
            message: "Too Many Requests".into(),
        }
        .is_quota_exceeded());

        assert!(!ApiError::Api {
            status: 403,
            code: Some(139),
            message: "You have already favorited this status.".into(),
        }
        .is_quota_exceeded());
        assert!(!ApiError::OAuth("bad key".into()).is_quota_exceeded());
        assert!(!ApiError::BatchTooLarge { size: 101, max: 100 }.is_quota_exceeded());
    }

    #[test]
    fn test_display() {
        let err = ApiError::Api {
            status: 404,
            code: Some(34),
            message: "Sorry, that page does not exist.".into(),
        };
        assert_eq!(
            err.to_string(),
            "API error 404 (code 34): Sorry, that page does not exist."
        );
        assert_eq!(
            ApiError::RateLimited {
                retry_after: Some(60)
            }
            .to_string(),
            "Rate limited, retry after 60 seconds"
        );
    }
}
