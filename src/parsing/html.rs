use once_cell::sync::Lazy;
use scraper::{Html, Selector};

static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("anchor selector is valid CSS"));

/// Collects the `href` of every anchor in an HTML document or fragment, in
/// document order. Whitespace around each target is trimmed and empty
/// targets are dropped.
///
/// The HTML5 parser recovers from any input, so there is no failure case:
/// a body that is not a results page simply yields whatever anchors it has,
/// usually none.
pub fn extract_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|anchor| anchor.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(str::to_string)
        .collect()
}
