//! Full article content and metadata extraction
//!
//! The body is assembled from paragraph- and heading-level elements inside
//! the content container, with media captions and embedded code stripped.
//! The author is a heuristic over the last paragraph's bold text, and the
//! publish date falls back from the visible timestamp element to a
//! structured meta tag.

use crate::extract::selectors::{collapse_ws, visible_text, STRIPPED_TAGS};
use crate::extract::{ArticleContent, Extractor};
use scraper::{ElementRef, Html};

/// Bold text containing any of these is source attribution, not an author
const ATTRIBUTION_KEYWORDS: &[&str] = &["nguồn", "ảnh", "theo"];

/// A paragraph whose leading text contains any of these is an image caption
const CAPTION_KEYWORDS: &[&str] = &["ảnh:", "nguồn:", "hình:"];

/// Author candidates longer than this are prose, not a byline
const MAX_AUTHOR_CHARS: usize = 50;

/// Paragraphs at or under this length carry no prose worth keeping
const MIN_PARAGRAPH_CHARS: usize = 20;

/// Caption keywords are only looked for in this many leading characters
const CAPTION_SCAN_CHARS: usize = 50;

/// Extracts article content and metadata from an article page
///
/// A missing content container yields an empty result; the caller counts
/// the article as failed and moves on.
pub(crate) fn extract_article(extractor: &Extractor, html: &str) -> ArticleContent {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let content = match root.select(&extractor.selectors.content).next() {
        Some(content) => content,
        None => {
            tracing::debug!("article content container not found");
            return ArticleContent::default();
        }
    };

    let mut candidates: Vec<ElementRef> = content
        .select(&extractor.selectors.content_blocks)
        .filter(|element| !inside_stripped_subtree(element, &content))
        .collect();

    let author = take_author(extractor, &mut candidates);
    let body = assemble_body(&candidates);

    let published_time = extractor.selectors.detail_time.first_text(root);
    let date = extract_date(extractor, published_time.as_deref(), root);
    let featured_image = extractor
        .selectors
        .featured_image
        .first_image(root, &extractor.base_url);

    ArticleContent {
        body,
        author,
        date,
        published_time,
        featured_image,
    }
}

/// True when the element sits inside a stripped (non-prose) subtree
fn inside_stripped_subtree(element: &ElementRef, content_root: &ElementRef) -> bool {
    for ancestor in element.ancestors() {
        if ancestor.id() == content_root.id() {
            break;
        }
        if let Some(el) = ElementRef::wrap(ancestor) {
            if STRIPPED_TAGS.contains(&el.value().name()) {
                return true;
            }
        }
    }
    false
}

/// Pops the author off the candidate list if the last paragraph is a byline
///
/// A byline is bold text shorter than [`MAX_AUTHOR_CHARS`] that contains
/// none of the attribution keywords. Anything else leaves the paragraph in
/// place.
fn take_author(extractor: &Extractor, candidates: &mut Vec<ElementRef>) -> Option<String> {
    let last = candidates.last()?;
    let bold = last.select(&extractor.selectors.bold).next()?;

    let text = collapse_ws(&visible_text(&bold));
    if text.is_empty() || text.chars().count() >= MAX_AUTHOR_CHARS {
        return None;
    }

    let lowered = text.to_lowercase();
    if ATTRIBUTION_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        return None;
    }

    candidates.pop();
    Some(text)
}

/// Joins paragraphs into the article body, a blank line between each
///
/// Paragraphs at or under [`MIN_PARAGRAPH_CHARS`] characters and image
/// captions are dropped.
fn assemble_body(candidates: &[ElementRef]) -> String {
    let mut parts = Vec::new();

    for element in candidates {
        let text = collapse_ws(&visible_text(element));

        if text.chars().count() <= MIN_PARAGRAPH_CHARS {
            continue;
        }

        if is_caption(&text) {
            continue;
        }

        parts.push(text);
    }

    parts.join("\n\n")
}

/// True when the paragraph's leading text looks like an image caption
fn is_caption(text: &str) -> bool {
    let leading: String = text.chars().take(CAPTION_SCAN_CHARS).collect();
    let leading = leading.to_lowercase();
    CAPTION_KEYWORDS.iter().any(|kw| leading.contains(kw))
}

/// Extracts a publish date, trying the visible timestamp then the meta tag
///
/// The visible timestamp is searched for a `dd/mm/yyyy` pattern; the meta
/// tag's content is truncated to its date-only prefix.
fn extract_date(
    extractor: &Extractor,
    published_time: Option<&str>,
    root: ElementRef<'_>,
) -> Option<String> {
    if let Some(text) = published_time {
        if let Some(found) = extractor.date_re.find(text) {
            return Some(found.as_str().to_string());
        }
    }

    let meta = root
        .select(&extractor.selectors.meta_published_time)
        .next()?;
    let content = meta.value().attr("content")?;
    let prefix: String = content.chars().take(10).collect();

    if prefix.is_empty() {
        None
    } else {
        Some(prefix)
    }
}
