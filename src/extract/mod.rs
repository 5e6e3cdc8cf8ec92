//! Structured extraction from fetched pages
//!
//! Four read-only operations over an HTML document: top-level categories
//! from the site navigation, subcategories from a category page's
//! breadcrumb, article listings from a listing page, and full article
//! content with metadata from an article page. Selector misses are never
//! errors; they yield empty or absent fields and the crawl continues.

mod article;
mod categories;
mod listing;
pub mod selectors;

pub use selectors::{SelectorChain, SelectorSet};

use crate::config::{SelectorsConfig, SiteConfig};
use crate::{ConfigError, ConfigResult};
use regex::Regex;
use std::collections::HashSet;
use url::Url;

/// Date pattern found in the site's human-readable timestamps (dd/mm/yyyy)
const DATE_PATTERN: &str = r"\d{1,2}/\d{1,2}/\d{4}";

/// A category or subcategory discovered on the site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub title: String,
    pub url: String,
}

/// An article entry scanned from a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleListing {
    pub title: String,
    pub url: String,
    pub thumbnail: Option<String>,
    pub sapo: Option<String>,
    pub published_time: Option<String>,
}

/// Full article content and metadata from an article page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleContent {
    /// Multi-paragraph prose, paragraphs separated by a blank line
    pub body: String,
    pub author: Option<String>,
    pub date: Option<String>,
    pub published_time: Option<String>,
    pub featured_image: Option<String>,
}

impl ArticleContent {
    /// True when no usable prose was found ("no article")
    pub fn is_empty(&self) -> bool {
        self.body.trim().is_empty()
    }
}

/// Extracts structured records from HTML using compiled selector chains
pub struct Extractor {
    pub(crate) selectors: SelectorSet,
    pub(crate) base_url: Url,
    pub(crate) excluded: HashSet<String>,
    pub(crate) article_suffix: String,
    pub(crate) date_re: Regex,
}

impl Extractor {
    /// Builds an extractor, compiling every configured selector
    ///
    /// A selector that does not compile is a setup failure, not a per-page
    /// one.
    pub fn new(site: &SiteConfig, selectors: &SelectorsConfig) -> ConfigResult<Self> {
        let base_url = Url::parse(&site.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

        let excluded = site
            .excluded_categories
            .iter()
            .map(|title| title.to_lowercase())
            .collect();

        let date_re = Regex::new(DATE_PATTERN)
            .map_err(|e| ConfigError::Validation(format!("date pattern: {}", e)))?;

        Ok(Self {
            selectors: SelectorSet::compile(selectors)?,
            base_url,
            excluded,
            article_suffix: site.article_suffix.clone(),
            date_re,
        })
    }

    /// Base URL used to resolve relative links
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Extracts top-level categories from the site's primary navigation
    pub fn categories(&self, html: &str) -> Vec<Category> {
        categories::extract_categories(self, html)
    }

    /// Extracts subcategories from a category page's breadcrumb trail
    ///
    /// The entry pointing home (`/`) and the category's own URL are skipped;
    /// duplicates are removed by absolute URL, first-seen order preserved.
    pub fn subcategories(&self, html: &str, category_url: &str) -> Vec<Category> {
        categories::extract_subcategories(self, html, category_url)
    }

    /// Extracts up to `max` article listings from a listing page
    pub fn listings(&self, html: &str, max: usize) -> Vec<ArticleListing> {
        listing::extract_listings(self, html, max)
    }

    /// Extracts full article content and metadata from an article page
    ///
    /// A missing content container yields an empty [`ArticleContent`], never
    /// an error.
    pub fn article(&self, html: &str) -> ArticleContent {
        article::extract_article(self, html)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_extractor_builds_from_valid_config() {
        let extractor = test_extractor();
        assert_eq!(extractor.base_url().as_str(), "https://news.example.vn/");
        assert!(extractor.excluded.contains("trang chủ"));
    }

    #[test]
    fn test_extractor_rejects_bad_selector() {
        let mut selectors = test_selectors();
        selectors.content = "div[[[".to_string();
        let result = Extractor::new(&test_site(), &selectors);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidSelector { .. })
        ));
    }

    #[test]
    fn test_empty_article_content() {
        let content = ArticleContent::default();
        assert!(content.is_empty());

        let content = ArticleContent {
            body: "Một đoạn văn.".to_string(),
            ..Default::default()
        };
        assert!(!content.is_empty());
    }
}
