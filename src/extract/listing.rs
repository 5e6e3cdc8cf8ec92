//! Article discovery on listing pages
//!
//! Candidates are the configured listing containers plus bare `h2`/`h3`
//! headings that wrap an article link directly. Within one page, articles
//! are deduplicated by absolute URL.

use crate::extract::selectors::{collapse_ws, resolve_url, visible_text};
use crate::extract::{ArticleListing, Extractor};
use scraper::{ElementRef, Html};
use std::collections::HashSet;

/// Extracts up to `max` article listings from a listing page
pub(crate) fn extract_listings(
    extractor: &Extractor,
    html: &str,
    max: usize,
) -> Vec<ArticleListing> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let mut seen = HashSet::new();
    let mut articles = Vec::new();

    let containers = root.select(&extractor.selectors.listing_containers);
    let headings = root.select(&extractor.selectors.listing_headings);

    for candidate in containers.chain(headings) {
        if articles.len() >= max {
            break;
        }

        if let Some(article) = extract_candidate(extractor, candidate, &mut seen) {
            articles.push(article);
        }
    }

    tracing::debug!("found {} articles on listing page", articles.len());
    articles
}

/// Extracts one listing entry from a candidate container
///
/// Returns None when the candidate has no article link, an empty title, or
/// a URL already seen on this page.
fn extract_candidate(
    extractor: &Extractor,
    container: ElementRef<'_>,
    seen: &mut HashSet<String>,
) -> Option<ArticleListing> {
    // The article link is the first anchor whose href ends with the
    // configured article suffix.
    let (anchor, href) = container
        .select(&extractor.selectors.anchors)
        .filter_map(|a| a.value().attr("href").map(|href| (a, href)))
        .find(|(_, href)| href.trim().ends_with(&extractor.article_suffix))?;

    let url = resolve_url(href, &extractor.base_url)?;

    // Title comes from a heading inside the container, from the container
    // itself when the candidate is a bare heading, else from the link text.
    let title_element = container
        .select(&extractor.selectors.listing_headings)
        .next()
        .or_else(|| {
            extractor
                .selectors
                .listing_headings
                .matches(&container)
                .then_some(container)
        })
        .unwrap_or(anchor);

    let title = collapse_ws(&visible_text(&title_element));
    if title.is_empty() {
        return None;
    }

    if !seen.insert(url.clone()) {
        return None;
    }

    let thumbnail = extractor
        .selectors
        .thumbnail
        .first_image(container, &extractor.base_url);
    let sapo = extractor.selectors.sapo.first_text(container);
    let published_time = extractor.selectors.time.first_text(container);

    Some(ArticleListing {
        title,
        url,
        thumbnail,
        sapo,
        published_time,
    })
}
