//! Compiled selectors and the ordered fallback engine
//!
//! All CSS selectors come from configuration as strings and are compiled
//! once when the [`Extractor`](crate::extract::Extractor) is built, so a
//! typo in the config fails at setup instead of mid-crawl. Optional fields
//! are extracted through a [`SelectorChain`]: an ordered list of selectors
//! tried against a scope, stopping at the first one that yields content.

use crate::config::SelectorsConfig;
use crate::{ConfigError, ConfigResult};
use ego_tree::NodeRef;
use scraper::{ElementRef, Node, Selector};
use url::Url;

/// Element tags stripped from article prose (media captions, embedded code)
pub(crate) const STRIPPED_TAGS: &[&str] = &[
    "figure",
    "figcaption",
    "script",
    "style",
    "iframe",
    "noscript",
];

/// An ordered list of selectors tried until one yields content
#[derive(Debug, Clone)]
pub struct SelectorChain {
    selectors: Vec<Selector>,
}

impl SelectorChain {
    /// Compiles a chain from configuration strings, preserving order
    pub fn compile(name: &str, sources: &[String]) -> ConfigResult<Self> {
        let selectors = sources
            .iter()
            .map(|s| compile_selector(name, s))
            .collect::<ConfigResult<Vec<_>>>()?;
        Ok(Self { selectors })
    }

    /// Returns the first element matched by any selector in chain order
    pub fn first_element<'a>(&self, scope: ElementRef<'a>) -> Option<ElementRef<'a>> {
        self.selectors
            .iter()
            .find_map(|selector| scope.select(selector).next())
    }

    /// Returns the first non-empty, whitespace-collapsed text in chain order
    ///
    /// Once a selector yields non-empty text, later selectors are never
    /// tried.
    pub fn first_text(&self, scope: ElementRef<'_>) -> Option<String> {
        for selector in &self.selectors {
            if let Some(element) = scope.select(selector).next() {
                let text = collapse_ws(&visible_text(&element));
                if !text.is_empty() {
                    return Some(text);
                }
            }
        }
        None
    }

    /// Returns the first resolvable image URL in chain order
    ///
    /// An image resolves through `src`, falling back to the lazy-load
    /// `data-src` attribute, then to an absolute URL against `base`.
    pub fn first_image(&self, scope: ElementRef<'_>, base: &Url) -> Option<String> {
        for selector in &self.selectors {
            if let Some(element) = scope.select(selector).next() {
                let src = element
                    .value()
                    .attr("src")
                    .or_else(|| element.value().attr("data-src"));
                if let Some(src) = src {
                    if let Some(url) = resolve_url(src, base) {
                        return Some(url);
                    }
                }
            }
        }
        None
    }
}

/// All compiled selectors used by the extractor
#[derive(Debug, Clone)]
pub struct SelectorSet {
    pub nav_menu: Selector,
    pub nav_item: Selector,
    pub nav_link: SelectorChain,
    pub breadcrumb: Selector,
    pub listing_containers: Selector,
    pub listing_headings: Selector,
    pub anchors: Selector,
    pub bold: Selector,
    pub content_blocks: Selector,
    pub thumbnail: SelectorChain,
    pub sapo: SelectorChain,
    pub time: SelectorChain,
    pub content: Selector,
    pub detail_time: SelectorChain,
    pub featured_image: SelectorChain,
    pub meta_published_time: Selector,
}

impl SelectorSet {
    /// Compiles every configured selector, failing on the first invalid one
    pub fn compile(config: &SelectorsConfig) -> ConfigResult<Self> {
        Ok(Self {
            nav_menu: compile_selector("nav-menu", &config.nav_menu)?,
            nav_item: compile_selector("nav-item", &config.nav_item)?,
            nav_link: SelectorChain::compile("nav-link", &config.nav_link)?,
            breadcrumb: compile_selector("breadcrumb", &config.breadcrumb)?,
            listing_containers: compile_selector(
                "listing-containers",
                &config.listing_containers.join(", "),
            )?,
            listing_headings: compile_selector("listing-headings", &config.listing_headings)?,
            anchors: compile_selector("anchors", "a[href]")?,
            bold: compile_selector("bold", "b, strong")?,
            content_blocks: compile_selector("content-blocks", "p, h2, h3")?,
            thumbnail: SelectorChain::compile("thumbnail", &config.thumbnail)?,
            sapo: SelectorChain::compile("sapo", &config.sapo)?,
            time: SelectorChain::compile("time", &config.time)?,
            content: compile_selector("content", &config.content)?,
            detail_time: SelectorChain::compile("detail-time", &config.detail_time)?,
            featured_image: SelectorChain::compile("featured-image", &config.featured_image)?,
            meta_published_time: compile_selector(
                "meta-published-time",
                &config.meta_published_time,
            )?,
        })
    }
}

/// Compiles a single CSS selector, attributing failures to the config key
pub(crate) fn compile_selector(name: &str, source: &str) -> ConfigResult<Selector> {
    Selector::parse(source).map_err(|e| ConfigError::InvalidSelector {
        selector: source.to_string(),
        message: format!("{}: {}", name, e),
    })
}

/// Collapses all runs of whitespace into single spaces and trims the ends
pub(crate) fn collapse_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collects the text of an element, skipping non-prose subtrees
///
/// Text inside any [`STRIPPED_TAGS`] descendant is excluded, so an embedded
/// script or figure caption never leaks into article prose.
pub(crate) fn visible_text(element: &ElementRef) -> String {
    let mut out = String::new();
    collect_text(**element, &mut out);
    out
}

fn collect_text(node: NodeRef<'_, Node>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => {
                out.push(' ');
                out.push_str(&text.text);
            }
            Node::Element(element) => {
                if !STRIPPED_TAGS.contains(&element.name()) {
                    collect_text(child, out);
                }
            }
            _ => {}
        }
    }
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None for empty hrefs, special schemes (javascript:, mailto:,
/// tel:, data:), fragment-only anchors, and anything that does not resolve
/// to http(s).
pub(crate) fn resolve_url(href: &str, base: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    if href.starts_with('#') {
        return None;
    }

    match base.join(href) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Some(url.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn base_url() -> Url {
        Url::parse("https://example.com/page").unwrap()
    }

    fn chain(sources: &[&str]) -> SelectorChain {
        let owned: Vec<String> = sources.iter().map(|s| s.to_string()).collect();
        SelectorChain::compile("test", &owned).unwrap()
    }

    #[test]
    fn test_collapse_ws() {
        assert_eq!(collapse_ws("  a \n b\t\tc  "), "a b c");
        assert_eq!(collapse_ws(""), "");
        assert_eq!(collapse_ws("   "), "");
    }

    #[test]
    fn test_chain_stops_at_first_match() {
        // Only the third of four selectors matches; the fourth element exists
        // under a class the fourth selector would match, but must never win.
        let html = r#"<div>
            <span class="third">winner</span>
            <span class="fourth">loser</span>
        </div>"#;
        let doc = Html::parse_fragment(html);
        let chain = chain(&["span.first", "span.second", "span.third", "span.fourth"]);
        let text = chain.first_text(doc.root_element());
        assert_eq!(text, Some("winner".to_string()));
    }

    #[test]
    fn test_chain_skips_empty_matches() {
        let html = r#"<div><span class="a">  </span><span class="b">content</span></div>"#;
        let doc = Html::parse_fragment(html);
        let chain = chain(&["span.a", "span.b"]);
        assert_eq!(chain.first_text(doc.root_element()), Some("content".to_string()));
    }

    #[test]
    fn test_chain_no_match() {
        let doc = Html::parse_fragment("<div><p>text</p></div>");
        let chain = chain(&["span.missing"]);
        assert_eq!(chain.first_text(doc.root_element()), None);
    }

    #[test]
    fn test_first_image_prefers_src() {
        let html = r#"<div><img class="t" src="/a.jpg" data-src="/b.jpg"></div>"#;
        let doc = Html::parse_fragment(html);
        let chain = chain(&["img.t"]);
        assert_eq!(
            chain.first_image(doc.root_element(), &base_url()),
            Some("https://example.com/a.jpg".to_string())
        );
    }

    #[test]
    fn test_first_image_lazy_load_fallback() {
        let html = r#"<div><img class="t" data-src="/lazy.jpg"></div>"#;
        let doc = Html::parse_fragment(html);
        let chain = chain(&["img.t"]);
        assert_eq!(
            chain.first_image(doc.root_element(), &base_url()),
            Some("https://example.com/lazy.jpg".to_string())
        );
    }

    #[test]
    fn test_visible_text_skips_stripped_tags() {
        let html = r#"<p>before <script>var x = 1;</script>after <figcaption>cap</figcaption>end</p>"#;
        let doc = Html::parse_fragment(html);
        let p = doc
            .select(&Selector::parse("p").unwrap())
            .next()
            .unwrap();
        assert_eq!(collapse_ws(&visible_text(&p)), "before after end");
    }

    #[test]
    fn test_resolve_url_relative() {
        assert_eq!(
            resolve_url("/bai-viet.htm", &base_url()),
            Some("https://example.com/bai-viet.htm".to_string())
        );
    }

    #[test]
    fn test_resolve_url_rejects_special_schemes() {
        assert_eq!(resolve_url("javascript:void(0)", &base_url()), None);
        assert_eq!(resolve_url("mailto:a@b.com", &base_url()), None);
        assert_eq!(resolve_url("#anchor", &base_url()), None);
        assert_eq!(resolve_url("", &base_url()), None);
    }

    #[test]
    fn test_invalid_selector_fails_compile() {
        let result = compile_selector("bad", "div[[[");
        assert!(result.is_err());
    }
}
