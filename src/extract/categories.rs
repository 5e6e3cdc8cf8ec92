//! Category and subcategory discovery
//!
//! Categories come from the site's primary navigation; subcategories from
//! the breadcrumb trail on a category page.

use crate::extract::selectors::{collapse_ws, resolve_url, visible_text};
use crate::extract::{Category, Extractor};
use scraper::Html;
use std::collections::HashSet;

/// Extracts top-level categories from the navigation container
///
/// Entries with an empty title or unresolvable URL are skipped, as are
/// titles whose lowercased form is in the configured exclusion set.
pub(crate) fn extract_categories(extractor: &Extractor, html: &str) -> Vec<Category> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let menu = match root.select(&extractor.selectors.nav_menu).next() {
        Some(menu) => menu,
        None => {
            tracing::warn!("navigation container not found");
            return Vec::new();
        }
    };

    let mut categories = Vec::new();

    for item in menu.select(&extractor.selectors.nav_item) {
        let anchor = match extractor.selectors.nav_link.first_element(item) {
            Some(anchor) => anchor,
            None => continue,
        };

        let title = collapse_ws(&visible_text(&anchor));
        if title.is_empty() {
            continue;
        }

        if extractor.excluded.contains(&title.to_lowercase()) {
            tracing::debug!("skipping excluded category: {}", title);
            continue;
        }

        let href = match anchor.value().attr("href") {
            Some(href) => href,
            None => continue,
        };

        let url = match resolve_url(href, &extractor.base_url) {
            Some(url) => url,
            None => continue,
        };

        categories.push(Category { title, url });
    }

    tracing::info!("found {} categories", categories.len());
    categories
}

/// Extracts subcategories from a category page's breadcrumb trail
///
/// The home entry (`/`) and the category's own URL are skipped; duplicates
/// are removed by absolute URL, preserving first-seen order.
pub(crate) fn extract_subcategories(
    extractor: &Extractor,
    html: &str,
    category_url: &str,
) -> Vec<Category> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let mut seen = HashSet::new();
    let mut subcategories = Vec::new();

    for anchor in root.select(&extractor.selectors.breadcrumb) {
        let href = match anchor.value().attr("href") {
            Some(href) => href.trim(),
            None => continue,
        };

        if href == "/" || href == category_url {
            continue;
        }

        let title = collapse_ws(&visible_text(&anchor));
        if title.is_empty() {
            continue;
        }

        let url = match resolve_url(href, &extractor.base_url) {
            Some(url) => url,
            None => continue,
        };

        if url == category_url {
            continue;
        }

        if seen.insert(url.clone()) {
            subcategories.push(Category { title, url });
        }
    }

    subcategories
}
