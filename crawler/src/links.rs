use scraper::{Html, Selector};
use url::Url;

/// Extracts the outbound HTTP(S) links of a page, in document order, with
/// fragments stripped and duplicates removed. Relative hrefs resolve against
/// `base`; anything that still fails to parse is dropped.
pub fn find_links(base: &Url, html: &str) -> Vec<Url> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").unwrap();

    let mut links = Vec::new();
    for anchor in document.select(&selector) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Ok(url) = Url::parse(href).or_else(|_| base.join(href)) else {
            continue;
        };
        if !is_http(&url) {
            continue;
        }
        let url = normalize(url);
        if !links.contains(&url) {
            links.push(url);
        }
    }
    links
}

pub fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Drops the fragment; everything else is already normalized by the parser,
/// which percent-encodes the query string as it reads it.
pub fn normalize(mut url: Url) -> Url {
    url.set_fragment(None);
    url
}
