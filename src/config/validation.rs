use crate::config::types::{BrowserConfig, Config, MediaConfig, SiteConfig, TimingConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_timing_config(&config.timing)?;
    validate_media_config(&config.media)?;
    validate_browser_config(&config.browser)?;

    if config.output.download_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "download_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates site configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if let Some(referer) = &config.download_referer {
        Url::parse(referer)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid download_referer: {}", e)))?;
    }

    Ok(())
}

/// Validates timing configuration
fn validate_timing_config(config: &TimingConfig) -> Result<(), ConfigError> {
    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.landing_timeout_ms == 0 || config.probe_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "navigation timeouts must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

/// Validates the media-link heuristic
fn validate_media_config(config: &MediaConfig) -> Result<(), ConfigError> {
    if config.extensions.is_empty() {
        return Err(ConfigError::Validation(
            "media extensions cannot be empty".to_string(),
        ));
    }

    if config.extensions.iter().any(|ext| ext.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "media extensions cannot contain empty entries".to_string(),
        ));
    }

    Ok(())
}

/// Validates headless browser settings
fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    if config.idle_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "browser idle_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}
