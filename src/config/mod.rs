//! Configuration module
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. Everything coupled to one site's markup (selector chains, URL
//! suffix, exclusion list) lives here rather than in code.
//!
//! # Example
//!
//! ```no_run
//! use tintuc::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Crawling {}", config.site.base_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, SelectorsConfig, SiteConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
