use crate::config::types::{Config, CrawlerConfig, SelectorsConfig, SiteConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
///
/// Selector strings are checked for emptiness here; whether they compile as
/// CSS is verified when the Extractor is built, which is still part of setup
/// and therefore fatal.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    validate_selectors_config(&config.selectors)?;
    Ok(())
}

/// Validates site configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "base-url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if config.source_id.is_empty() {
        return Err(ConfigError::Validation(
            "source-id cannot be empty".to_string(),
        ));
    }

    if config.article_suffix.is_empty() {
        return Err(ConfigError::Validation(
            "article-suffix cannot be empty".to_string(),
        ));
    }

    if config.user_agent.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "max-retries must be >= 1, got {}",
            config.max_retries
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request-timeout-secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    if config.max_articles < 1 {
        return Err(ConfigError::Validation(format!(
            "max-articles must be >= 1, got {}",
            config.max_articles
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &crate::config::types::OutputConfig) -> Result<(), ConfigError> {
    if config.base_dir.is_empty() {
        return Err(ConfigError::Validation(
            "base-dir cannot be empty".to_string(),
        ));
    }

    if config.mapping_file.is_empty() {
        return Err(ConfigError::Validation(
            "mapping-file cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates selector configuration
fn validate_selectors_config(config: &SelectorsConfig) -> Result<(), ConfigError> {
    validate_selector_string("nav-menu", &config.nav_menu)?;
    validate_selector_string("nav-item", &config.nav_item)?;
    validate_selector_chain("nav-link", &config.nav_link)?;
    validate_selector_string("breadcrumb", &config.breadcrumb)?;
    validate_selector_chain("listing-containers", &config.listing_containers)?;
    validate_selector_string("listing-headings", &config.listing_headings)?;
    validate_selector_chain("thumbnail", &config.thumbnail)?;
    validate_selector_chain("sapo", &config.sapo)?;
    validate_selector_chain("time", &config.time)?;
    validate_selector_string("content", &config.content)?;
    validate_selector_chain("detail-time", &config.detail_time)?;
    validate_selector_chain("featured-image", &config.featured_image)?;
    validate_selector_string("meta-published-time", &config.meta_published_time)?;
    Ok(())
}

/// Validates that a single selector string is non-empty
fn validate_selector_string(name: &str, selector: &str) -> Result<(), ConfigError> {
    if selector.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "selector '{}' cannot be empty",
            name
        )));
    }
    Ok(())
}

/// Validates that a fallback chain is non-empty and all entries are non-empty
fn validate_selector_chain(name: &str, chain: &[String]) -> Result<(), ConfigError> {
    if chain.is_empty() {
        return Err(ConfigError::Validation(format!(
            "selector chain '{}' must have at least one entry",
            name
        )));
    }

    for selector in chain {
        validate_selector_string(name, selector)?;
    }

    Ok(())
}
