//! Article storage with normalized category paths
//!
//! Each saved article produces a body text file and a metadata JSON file
//! sharing the same per-key sequential index, laid out under the category's
//! normalized name:
//!
//! ```text
//! <category>/category/article/article_<n>.txt
//! <category>/category/metadata/metadata_<n>.json
//! <category>/sub-category/<subcategory>/article/article_<n>.txt
//! <category>/sub-category/<subcategory>/metadata/metadata_<n>.json
//! ```
//!
//! The downstream summarizer pairs files by index and later rewrites the
//! metadata JSON in place, so the naming contract here is stable.

use crate::extract::{ArticleContent, ArticleListing};
use crate::mapping::CategoryMapper;
use crate::{CrawlError, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const ARTICLE_DIR: &str = "article";
const METADATA_DIR: &str = "metadata";
const CATEGORY_DIR: &str = "category";
const SUB_CATEGORY_DIR: &str = "sub-category";

/// Metadata record written alongside each article body
///
/// Field set is a stable contract consumed by the downstream summarizer.
#[derive(Debug, Serialize)]
pub struct ArticleMetadata {
    pub index: u32,
    pub category: String,
    pub subcategory: Option<String>,
    pub category_normalized: String,
    pub subcategory_normalized: Option<String>,
    pub category_display: String,
    pub subcategory_display: Option<String>,
    pub title: String,
    pub url: String,
    pub date: Option<String>,
    pub author: Option<String>,
    pub source: String,
    pub crawl_date: String,
    pub thumbnail: Option<String>,
    pub sapo: Option<String>,
    pub published_time: Option<String>,
    pub featured_image: Option<String>,
}

/// Aggregate counts recomputed from the on-disk tree
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StoreStats {
    /// Articles per normalized category (subcategory articles included)
    pub articles_by_category: HashMap<String, u64>,
    pub categories: u64,
    pub subcategories: u64,
    pub articles: u64,
}

/// Persists articles and their metadata under normalized category paths
pub struct ArticleStore {
    base_dir: PathBuf,
    mapper: CategoryMapper,
    counters: HashMap<(String, Option<String>), u32>,
    source: String,
}

impl ArticleStore {
    /// Opens a store rooted at `base_dir`, creating it if needed
    ///
    /// The category mapping file is loaded from (and saved back to)
    /// `mapping_path`. Counters start fresh: they are not seeded from files
    /// already on disk, so re-running into the same directory overwrites
    /// from index 1.
    pub fn open(base_dir: &Path, mapping_path: &Path, source: &str) -> Result<Self> {
        fs::create_dir_all(base_dir)?;
        let mapper = CategoryMapper::load(mapping_path)?;

        Ok(Self {
            base_dir: base_dir.to_path_buf(),
            mapper,
            counters: HashMap::new(),
            source: source.to_string(),
        })
    }

    /// Saves an article body and its metadata record
    ///
    /// Returns true when both files were written. Any failure is logged and
    /// reported as false; it never propagates, so the caller can continue
    /// with the next article.
    pub fn save(
        &mut self,
        category: &str,
        subcategory: Option<&str>,
        listing: &ArticleListing,
        content: &ArticleContent,
    ) -> bool {
        match self.try_save(category, subcategory, listing, content) {
            Ok(index) => {
                tracing::info!(
                    "saved article {} under {}{}",
                    index,
                    category,
                    subcategory.map(|s| format!(" / {}", s)).unwrap_or_default()
                );
                true
            }
            Err(e) => {
                tracing::error!("failed to save article '{}': {}", listing.title, e);
                false
            }
        }
    }

    fn try_save(
        &mut self,
        category: &str,
        subcategory: Option<&str>,
        listing: &ArticleListing,
        content: &ArticleContent,
    ) -> Result<u32> {
        let category_normalized = self.mapper.normalized_name(category);
        let subcategory_normalized = subcategory.map(|s| self.mapper.normalized_name(s));

        let category_display = self
            .mapper
            .display_name(&category_normalized)
            .unwrap_or(category)
            .to_string();
        let subcategory_display = subcategory_normalized
            .as_deref()
            .and_then(|key| self.mapper.display_name(key))
            .map(str::to_string);

        // Flush the mapping after each registration batch so a crash loses
        // at most the in-flight entry.
        self.mapper.save()?;

        let target = self.resolve_path(&category_normalized, subcategory_normalized.as_deref());
        let article_dir = target.join(ARTICLE_DIR);
        let metadata_dir = target.join(METADATA_DIR);
        fs::create_dir_all(&article_dir)?;
        fs::create_dir_all(&metadata_dir)?;

        let index = self.next_index(category, subcategory);

        let article_file = article_dir.join(format!("article_{}.txt", index));
        fs::write(&article_file, &content.body)?;

        let metadata = ArticleMetadata {
            index,
            category: category.to_string(),
            subcategory: subcategory.map(str::to_string),
            category_normalized,
            subcategory_normalized,
            category_display,
            subcategory_display,
            title: listing.title.clone(),
            url: listing.url.clone(),
            date: content.date.clone(),
            author: content.author.clone(),
            source: self.source.clone(),
            crawl_date: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            thumbnail: listing.thumbnail.clone(),
            sapo: listing.sapo.clone(),
            published_time: content
                .published_time
                .clone()
                .or_else(|| listing.published_time.clone()),
            featured_image: content.featured_image.clone(),
        };

        let metadata_file = metadata_dir.join(format!("metadata_{}.json", index));
        fs::write(&metadata_file, serde_json::to_string_pretty(&metadata)?)?;

        Ok(index)
    }

    /// Resolves the storage directory for a (category, subcategory) key
    ///
    /// The same key always resolves to the same directory within a run.
    fn resolve_path(&self, category_normalized: &str, subcategory_normalized: Option<&str>) -> PathBuf {
        match subcategory_normalized {
            Some(sub) => self
                .base_dir
                .join(category_normalized)
                .join(SUB_CATEGORY_DIR)
                .join(sub),
            None => self.base_dir.join(category_normalized).join(CATEGORY_DIR),
        }
    }

    /// Next sequential index for a (category, subcategory) key, starting at 1
    fn next_index(&mut self, category: &str, subcategory: Option<&str>) -> u32 {
        let key = (category.to_string(), subcategory.map(str::to_string));
        let counter = self.counters.entry(key).or_insert(0);
        *counter += 1;
        *counter
    }

    /// Recomputes aggregate counts by scanning the on-disk tree
    ///
    /// Independent of the in-memory counters; across repeated runs into the
    /// same directory the two can disagree.
    pub fn stats(&self) -> Result<StoreStats> {
        scan(&self.base_dir)
    }
}

/// Scans a store directory and counts categories, subcategories, articles
pub fn scan(base_dir: &Path) -> Result<StoreStats> {
    let mut stats = StoreStats::default();

    if !base_dir.is_dir() {
        return Err(CrawlError::Storage(format!(
            "output directory {} does not exist",
            base_dir.display()
        )));
    }

    for entry in fs::read_dir(base_dir)? {
        let category_path = entry?.path();
        if !category_path.is_dir() {
            continue;
        }
        let category_name = match category_path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => continue,
        };

        let mut category_articles = 0u64;
        category_articles += count_articles(&category_path.join(CATEGORY_DIR))?;

        let sub_root = category_path.join(SUB_CATEGORY_DIR);
        if sub_root.is_dir() {
            for sub_entry in fs::read_dir(&sub_root)? {
                let sub_path = sub_entry?.path();
                if !sub_path.is_dir() {
                    continue;
                }
                let sub_articles = count_articles(&sub_path)?;
                if sub_articles > 0 {
                    stats.subcategories += 1;
                }
                category_articles += sub_articles;
            }
        }

        if category_articles > 0 {
            stats.categories += 1;
            stats.articles += category_articles;
            stats
                .articles_by_category
                .insert(category_name, category_articles);
        }
    }

    Ok(stats)
}

/// Counts article body files under one `article/` directory
fn count_articles(dir: &Path) -> Result<u64> {
    let article_dir = dir.join(ARTICLE_DIR);
    if !article_dir.is_dir() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in fs::read_dir(&article_dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) == Some("txt") {
            count += 1;
        }
    }
    Ok(count)
}
