use crate::config::types::{Config, CrawlerConfig, PageEntry};
use crate::{ConfigError, ConfigResult};
use std::collections::HashSet;
use url::Url;

/// Upper bound on the result sink capacity
const MAX_RESULT_CAPACITY: usize = 1_000_000;

/// Upper bound on the simulated fetch delay (milliseconds)
const MAX_FETCH_DELAY_MS: u64 = 60_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    validate_pages(&config.pages)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    validate_url("root-url", &config.root_url)?;

    if config.result_capacity < 1 || config.result_capacity > MAX_RESULT_CAPACITY {
        return Err(ConfigError::Validation(format!(
            "result-capacity must be between 1 and {}, got {}",
            MAX_RESULT_CAPACITY, config.result_capacity
        )));
    }

    if config.max_concurrency == Some(0) {
        return Err(ConfigError::Validation(
            "max-concurrency must be >= 1 when set".to_string(),
        ));
    }

    if config.fetch_delay_ms > MAX_FETCH_DELAY_MS {
        return Err(ConfigError::Validation(format!(
            "fetch-delay-ms must be <= {}ms, got {}ms",
            MAX_FETCH_DELAY_MS, config.fetch_delay_ms
        )));
    }

    Ok(())
}

/// Validates canned page entries
fn validate_pages(pages: &[PageEntry]) -> ConfigResult<()> {
    let mut seen = HashSet::new();
    for page in pages {
        validate_url("page url", &page.url)?;

        if !seen.insert(page.url.as_str()) {
            return Err(ConfigError::Validation(format!(
                "Page '{}' is defined more than once",
                page.url
            )));
        }

        for link in &page.links {
            if link.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "Page '{}' has an empty link",
                    page.url
                )));
            }
        }
    }
    Ok(())
}

/// Validates that a URL key is non-empty
///
/// URLs are opaque keys into the canned dataset, so anything non-empty is
/// accepted. Values that do not parse as absolute URLs are only logged.
fn validate_url(field: &str, value: &str) -> ConfigResult<()> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", field)));
    }

    if let Err(e) = Url::parse(value) {
        tracing::warn!("{} '{}' is not an absolute URL ({}), using it as-is", field, value, e);
    }

    Ok(())
}
