use serde::Deserialize;

/// Main configuration structure for the crawler
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
    pub selectors: SelectorsConfig,
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Base URL of the news site (e.g., "https://baochinhphu.vn")
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Constant source identifier written into article metadata
    #[serde(rename = "source-id")]
    pub source_id: String,

    /// Suffix that article URLs end with (e.g., ".htm")
    #[serde(rename = "article-suffix")]
    pub article_suffix: String,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Lowercased category titles to skip during discovery
    #[serde(rename = "excluded-categories", default)]
    pub excluded_categories: Vec<String>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum fetch attempts per URL
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Delay between fetch attempts (seconds)
    #[serde(rename = "retry-delay-secs")]
    pub retry_delay_secs: u64,

    /// Per-request transport timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Delay after each article fetch (milliseconds)
    #[serde(rename = "delay-between-requests-ms")]
    pub delay_between_requests_ms: u64,

    /// Delay after each subcategory (milliseconds)
    #[serde(rename = "delay-between-subcategories-ms")]
    pub delay_between_subcategories_ms: u64,

    /// Delay after each category (milliseconds)
    #[serde(rename = "delay-between-categories-ms")]
    pub delay_between_categories_ms: u64,

    /// Cap on top-level categories (None = all)
    #[serde(rename = "max-categories", default)]
    pub max_categories: Option<usize>,

    /// Cap on subcategories per category (None = all)
    #[serde(rename = "max-subcategories", default)]
    pub max_subcategories: Option<usize>,

    /// Cap on articles per listing page
    #[serde(rename = "max-articles", default = "default_max_articles")]
    pub max_articles: usize,
}

fn default_max_articles() -> usize {
    5
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Root directory for crawl output; a dated subdirectory is created per run
    #[serde(rename = "base-dir")]
    pub base_dir: String,

    /// Name of the category mapping file inside the dated directory
    #[serde(rename = "mapping-file", default = "default_mapping_file")]
    pub mapping_file: String,
}

fn default_mapping_file() -> String {
    "category_mapping.csv".to_string()
}

/// CSS selector configuration, coupled to the target site's current markup
///
/// Fields holding `Vec<String>` are ordered fallback chains: selectors are
/// tried in order and the first one yielding non-empty content wins.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectorsConfig {
    /// Container of the site's primary navigation
    #[serde(rename = "nav-menu")]
    pub nav_menu: String,

    /// Top-level navigation items, scoped to the nav container
    #[serde(rename = "nav-item")]
    pub nav_item: String,

    /// Anchor chain tried inside each navigation item
    #[serde(rename = "nav-link")]
    pub nav_link: Vec<String>,

    /// Breadcrumb items with anchors on a category page
    pub breadcrumb: String,

    /// Candidate article containers on a listing page
    #[serde(rename = "listing-containers")]
    pub listing_containers: Vec<String>,

    /// Heading elements that may wrap an article link directly
    #[serde(rename = "listing-headings")]
    pub listing_headings: String,

    /// Thumbnail image chain, scoped to a listing container
    pub thumbnail: Vec<String>,

    /// Short-teaser text chain, scoped to a listing container
    pub sapo: Vec<String>,

    /// Published-time chain, scoped to a listing container
    pub time: Vec<String>,

    /// Main content container on an article page
    pub content: String,

    /// Timestamp element chain on an article page
    #[serde(rename = "detail-time")]
    pub detail_time: Vec<String>,

    /// Featured image chain on an article page
    #[serde(rename = "featured-image")]
    pub featured_image: Vec<String>,

    /// Structured meta tag carrying the publish time
    #[serde(rename = "meta-published-time")]
    pub meta_published_time: String,
}
