//! Crawl orchestration
//!
//! Drives the traversal: categories from the navigation, then per category
//! the listing articles, then the breadcrumb subcategories and their
//! articles. Strictly sequential, one request at a time with configured
//! delays after each unit of work, to throttle load on the source site.
//! Failures are isolated at the level they occur: a bad article, listing,
//! or category is logged and skipped, never aborting the run.

use crate::config::Config;
use crate::extract::{Category, Extractor};
use crate::fetch::Fetcher;
use crate::store::ArticleStore;
use crate::Result;
use std::path::Path;
use std::time::Duration;

/// Aggregate counts for one crawl run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    /// Categories whose article round completed
    pub categories: u64,
    /// Subcategories that yielded a non-empty article listing
    pub subcategories: u64,
    /// Articles stored (body + metadata pairs)
    pub articles: u64,
}

/// Per-category counts folded into [`RunStats`]
#[derive(Debug, Default, Clone, Copy)]
struct CategoryStats {
    subcategories: u64,
    articles: u64,
}

/// Sequential crawl orchestrator
pub struct Crawler {
    config: Config,
    fetcher: Fetcher,
    extractor: Extractor,
    store: ArticleStore,
}

impl Crawler {
    /// Builds all components against the given output directory
    ///
    /// Any failure here (client build, selector compile, directory creation)
    /// is a setup failure and should abort the process.
    pub fn new(config: Config, output_dir: &Path) -> Result<Self> {
        let fetcher = Fetcher::new(&config.site, &config.crawler)?;
        let extractor = Extractor::new(&config.site, &config.selectors)?;
        let store = ArticleStore::open(
            output_dir,
            &output_dir.join(&config.output.mapping_file),
            &config.site.source_id,
        )?;

        Ok(Self {
            config,
            fetcher,
            extractor,
            store,
        })
    }

    /// Runs the full crawl and returns aggregated statistics
    pub async fn run(&mut self) -> Result<RunStats> {
        tracing::info!("fetching category list from {}", self.config.site.base_url);

        let home = self.fetcher.fetch(&self.config.site.base_url).await?;
        let mut categories = self.extractor.categories(&home);

        if categories.is_empty() {
            tracing::warn!("no categories found");
            return Ok(RunStats::default());
        }

        if let Some(max) = self.config.crawler.max_categories {
            categories.truncate(max);
        }

        let total = categories.len();
        let mut stats = RunStats::default();

        for (position, category) in categories.iter().enumerate() {
            tracing::info!(
                "category {}/{}: {}",
                position + 1,
                total,
                category.title
            );

            match self.crawl_category(category).await {
                Ok(category_stats) => {
                    stats.categories += 1;
                    stats.subcategories += category_stats.subcategories;
                    stats.articles += category_stats.articles;
                    tracing::info!(
                        "completed {}: {} subcategories, {} articles",
                        category.title,
                        category_stats.subcategories,
                        category_stats.articles
                    );
                }
                Err(e) => {
                    tracing::error!("error processing category {}: {}", category.title, e);
                }
            }

            self.sleep_ms(self.config.crawler.delay_between_categories_ms)
                .await;
        }

        tracing::info!(
            "crawl finished: {} categories, {} subcategories, {} articles",
            stats.categories,
            stats.subcategories,
            stats.articles
        );

        Ok(stats)
    }

    /// Crawls one category: its own listing, then its subcategories
    async fn crawl_category(&mut self, category: &Category) -> Result<CategoryStats> {
        let mut stats = CategoryStats::default();

        let listing_page = self.fetcher.fetch(&category.url).await?;
        stats.articles += self
            .crawl_articles(&listing_page, &category.title, None)
            .await;

        let mut subcategories = self
            .extractor
            .subcategories(&listing_page, &category.url);
        if let Some(max) = self.config.crawler.max_subcategories {
            subcategories.truncate(max);
        }

        for subcategory in &subcategories {
            match self.crawl_subcategory(category, subcategory).await {
                Ok(saved) => {
                    stats.articles += saved.articles;
                    stats.subcategories += saved.subcategories;
                }
                Err(e) => {
                    tracing::error!(
                        "error processing subcategory {}: {}",
                        subcategory.title,
                        e
                    );
                }
            }

            self.sleep_ms(self.config.crawler.delay_between_subcategories_ms)
                .await;
        }

        Ok(stats)
    }

    /// Crawls one subcategory's listing
    ///
    /// The subcategory counts toward the run only when its listing was
    /// non-empty.
    async fn crawl_subcategory(
        &mut self,
        category: &Category,
        subcategory: &Category,
    ) -> Result<CategoryStats> {
        tracing::info!("subcategory: {}", subcategory.title);

        let listing_page = self.fetcher.fetch(&subcategory.url).await?;
        let listings = self
            .extractor
            .listings(&listing_page, self.config.crawler.max_articles);

        let mut stats = CategoryStats::default();
        if listings.is_empty() {
            return Ok(stats);
        }
        stats.subcategories = 1;

        stats.articles = self
            .store_listings(&listings, &category.title, Some(&subcategory.title))
            .await;

        Ok(stats)
    }

    /// Extracts listings from a fetched page and stores their articles
    async fn crawl_articles(
        &mut self,
        listing_page: &str,
        category: &str,
        subcategory: Option<&str>,
    ) -> u64 {
        let listings = self
            .extractor
            .listings(listing_page, self.config.crawler.max_articles);
        self.store_listings(&listings, category, subcategory).await
    }

    /// Fetches and stores each listed article, isolating per-article failures
    async fn store_listings(
        &mut self,
        listings: &[crate::extract::ArticleListing],
        category: &str,
        subcategory: Option<&str>,
    ) -> u64 {
        let total = listings.len();
        let mut saved = 0;

        for (position, listing) in listings.iter().enumerate() {
            tracing::info!("article {}/{}: {}", position + 1, total, listing.title);

            match self.fetcher.fetch(&listing.url).await {
                Ok(article_page) => {
                    let content = self.extractor.article(&article_page);
                    if content.is_empty() {
                        tracing::warn!("no content extracted from {}", listing.url);
                    } else if self.store.save(category, subcategory, listing, &content) {
                        saved += 1;
                    }
                }
                Err(e) => {
                    tracing::error!("skipping article {}: {}", listing.url, e);
                }
            }

            self.sleep_ms(self.config.crawler.delay_between_requests_ms)
                .await;
        }

        saved
    }

    /// Read-side store statistics (recomputed from disk)
    pub fn store_stats(&self) -> Result<crate::store::StoreStats> {
        self.store.stats()
    }

    async fn sleep_ms(&self, millis: u64) {
        if millis > 0 {
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }
    }
}
