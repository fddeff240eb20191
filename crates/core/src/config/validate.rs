use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Account handle and all four OAuth credentials are present
/// - Pacing range is ordered
/// - Ratio band is ordered and non-negative
/// - API timeout is not 0
/// - Search count is within the API limit
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let account = &config.account;
    let required = [
        ("account.handle", account.screen_name()),
        ("account.consumer_key", account.consumer_key.as_str()),
        ("account.consumer_secret", account.consumer_secret.as_str()),
        ("account.access_token", account.access_token.as_str()),
        (
            "account.access_token_secret",
            account.access_token_secret.as_str(),
        ),
    ];
    let missing: Vec<&str> = required
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();
    if !missing.is_empty() {
        return Err(ConfigError::MissingSettings(missing.join(", ")));
    }

    if config.pacing.min_secs > config.pacing.max_secs {
        return Err(ConfigError::ValidationError(format!(
            "pacing.min_secs ({}) cannot exceed pacing.max_secs ({})",
            config.pacing.min_secs, config.pacing.max_secs
        )));
    }

    let policy = &config.policy;
    if policy.ratio_low.is_nan()
        || policy.ratio_high.is_nan()
        || policy.ratio_low < 0.0
        || policy.ratio_low > policy.ratio_high
    {
        return Err(ConfigError::ValidationError(format!(
            "policy ratio band [{}, {}] is invalid",
            policy.ratio_low, policy.ratio_high
        )));
    }

    if config.api.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "api.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.search.count == 0 || config.search.count > 100 {
        return Err(ConfigError::ValidationError(format!(
            "search.count must be between 1 and 100, got {}",
            config.search.count
        )));
    }

    Ok(())
}
