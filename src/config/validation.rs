use crate::config::types::{Config, CrawlConfig, FetchConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetch_config(&config.fetch)?;
    validate_crawl_config(&config.crawl)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

/// Validates fetch configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if !(30..=60).contains(&config.timeout_secs) {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be between 30 and 60, got {}",
            config.timeout_secs
        )));
    }

    if config.max_redirects < 1 || config.max_redirects > 20 {
        return Err(ConfigError::Validation(format!(
            "max-redirects must be between 1 and 20, got {}",
            config.max_redirects
        )));
    }

    if config.max_retry_attempts < 1 || config.max_retry_attempts > 10 {
        return Err(ConfigError::Validation(format!(
            "max-retry-attempts must be between 1 and 10, got {}",
            config.max_retry_attempts
        )));
    }

    if config.backoff_base_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "backoff-base-ms must be >= 100ms, got {}ms",
            config.backoff_base_ms
        )));
    }

    if config.backoff_max_secs < 1 {
        return Err(ConfigError::Validation(
            "backoff-max-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawl bounds
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 || config.max_pages > 10_000 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be between 1 and 10000, got {}",
            config.max_pages
        )));
    }

    if config.max_depth < 1 {
        return Err(ConfigError::Validation(
            "max-depth must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.name.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent name cannot be empty".to_string(),
        ));
    }

    if !config
        .name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "user-agent name must contain only alphanumeric characters and hyphens, got '{}'",
            config.name
        )));
    }

    if let Some(contact) = &config.contact_url {
        Url::parse(contact).map_err(|e| {
            ConfigError::Validation(format!("Invalid contact-url: {}", e))
        })?;
    }

    Ok(())
}
