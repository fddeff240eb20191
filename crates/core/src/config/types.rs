use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub account: AccountConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Operator account and OAuth 1.0a user-context credentials.
///
/// Every field defaults to empty so validation can report all missing
/// settings at once instead of failing on the first one.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AccountConfig {
    /// Screen name of the operator account, with or without a leading `@`.
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub consumer_key: String,
    #[serde(default)]
    pub consumer_secret: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub access_token_secret: String,
}

impl AccountConfig {
    /// Handle without the leading `@`.
    pub fn screen_name(&self) -> &str {
        self.handle.trim().trim_start_matches('@')
    }
}

/// REST endpoint configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Media uploads live on a separate host.
    #[serde(default = "default_upload_url")]
    pub upload_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            upload_url: default_upload_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.twitter.com/1.1".to_string()
}

fn default_upload_url() -> String {
    "https://upload.twitter.com/1.1".to_string()
}

fn default_timeout() -> u32 {
    30
}

/// Relationship store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory holding the relationship files. Relative paths are
    /// resolved against the directory of the config file.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Sync files older than this trigger a warning before workflows run.
    #[serde(default = "default_stale_after_hours")]
    pub stale_after_hours: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            stale_after_hours: default_stale_after_hours(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_stale_after_hours() -> u64 {
    24
}

/// Randomized delay before each mutating call, in whole seconds.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PacingConfig {
    #[serde(default = "default_min_secs")]
    pub min_secs: u64,
    #[serde(default = "default_max_secs")]
    pub max_secs: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            min_secs: default_min_secs(),
            max_secs: default_max_secs(),
        }
    }
}

fn default_min_secs() -> u64 {
    1
}

fn default_max_secs() -> u64 {
    10
}

/// Acceptance thresholds for follow and unfollow decisions.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PolicyConfig {
    #[serde(default = "default_min_followers")]
    pub min_followers: u64,
    /// Accounts with fewer posts are treated as ghosts.
    #[serde(default = "default_min_statuses")]
    pub min_statuses: u64,
    /// Inclusive lower bound of followers / following.
    #[serde(default = "default_ratio_low")]
    pub ratio_low: f64,
    /// Inclusive upper bound of followers / following.
    #[serde(default = "default_ratio_high")]
    pub ratio_high: f64,
    #[serde(default)]
    pub allow_protected: bool,
    /// Unfollow only accounts whose verified flag equals this value.
    #[serde(default)]
    pub unfollow_verified: bool,
    /// Account ids that are never unfollowed.
    #[serde(default)]
    pub keep_following: Vec<u64>,
    /// Followed accounts that mute-following leaves alone.
    #[serde(default)]
    pub keep_unmuted: Vec<u64>,
    /// Muted accounts that unmute-all leaves muted.
    #[serde(default)]
    pub keep_muted: Vec<u64>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            min_followers: default_min_followers(),
            min_statuses: default_min_statuses(),
            ratio_low: default_ratio_low(),
            ratio_high: default_ratio_high(),
            allow_protected: false,
            unfollow_verified: false,
            keep_following: Vec::new(),
            keep_unmuted: Vec::new(),
            keep_muted: Vec::new(),
        }
    }
}

fn default_min_followers() -> u64 {
    100
}

fn default_min_statuses() -> u64 {
    10
}

fn default_ratio_low() -> f64 {
    0.2
}

fn default_ratio_high() -> f64 {
    10.0
}

/// Phrase search configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Results requested per search (API maximum is 100).
    #[serde(default = "default_search_count")]
    pub count: u32,
    #[serde(default)]
    pub result_type: ResultType,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            count: default_search_count(),
            result_type: ResultType::default(),
        }
    }
}

fn default_search_count() -> u32 {
    100
}

/// Search result bias
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResultType {
    #[default]
    Recent,
    Popular,
    Mixed,
}

impl ResultType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultType::Recent => "recent",
            ResultType::Popular => "popular",
            ResultType::Mixed => "mixed",
        }
    }
}

/// Sanitized config for display (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub account: SanitizedAccountConfig,
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub pacing: PacingConfig,
    pub policy: PolicyConfig,
    pub search: SearchConfig,
}

/// Account config with credentials hidden
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAccountConfig {
    pub handle: String,
    pub consumer_key_configured: bool,
    pub consumer_secret_configured: bool,
    pub access_token_configured: bool,
    pub access_token_secret_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            account: SanitizedAccountConfig {
                handle: config.account.screen_name().to_string(),
                consumer_key_configured: !config.account.consumer_key.is_empty(),
                consumer_secret_configured: !config.account.consumer_secret.is_empty(),
                access_token_configured: !config.account.access_token.is_empty(),
                access_token_secret_configured: !config.account.access_token_secret.is_empty(),
            },
            api: config.api.clone(),
            storage: config.storage.clone(),
            pacing: config.pacing.clone(),
            policy: config.policy.clone(),
            search: config.search.clone(),
        }
    }
}
