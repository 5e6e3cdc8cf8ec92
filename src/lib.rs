//! Tintuc: a category-aware news article crawler
//!
//! This crate walks a news site's category hierarchy, extracts articles with
//! their metadata using ordered selector-fallback chains, and persists them
//! into a normalized, indexed file tree for a downstream summarizer.

pub mod config;
pub mod crawl;
pub mod extract;
pub mod fetch;
pub mod mapping;
pub mod store;

use thiserror::Error;

/// Main error type for crawler operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] fetch::FetchError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },
}

/// Result type alias for crawler operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawl::{Crawler, RunStats};
pub use extract::{ArticleContent, ArticleListing, Category, Extractor};
pub use fetch::{FetchError, Fetcher, RetryPolicy};
pub use mapping::CategoryMapper;
pub use store::{ArticleStore, StoreStats};
