use sift_core::{ThreadedIndex, WorkQueue};
use sift_crawler::fetch::PageFetcher;
use sift_crawler::WebCrawler;
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

/// Serves canned pages keyed by URL.
struct FakeFetcher {
    pages: HashMap<Url, String>,
}

impl FakeFetcher {
    fn new(pages: &[(&str, &str)]) -> Self {
        FakeFetcher {
            pages: pages
                .iter()
                .map(|(url, body)| (Url::parse(url).unwrap(), body.to_string()))
                .collect(),
        }
    }
}

impl PageFetcher for FakeFetcher {
    fn fetch(&self, url: &Url) -> Option<String> {
        self.pages.get(url).cloned()
    }
}

fn crawler(fetcher: FakeFetcher) -> (Arc<WebCrawler>, Arc<ThreadedIndex>, Arc<WorkQueue>) {
    let queue = Arc::new(WorkQueue::with_threads(4));
    let index = Arc::new(ThreadedIndex::new());
    let crawler = Arc::new(WebCrawler::new(
        Arc::clone(&queue),
        Arc::clone(&index),
        Arc::new(fetcher),
    ));
    (crawler, index, queue)
}

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

#[test]
fn budget_bounds_fetches_in_a_wide_graph() {
    // Every page links to five unseen pages; a budget of three must fetch
    // exactly three URLs, seed included.
    let mut pages: Vec<(String, String)> = Vec::new();
    for page in 0..30 {
        let links: String = (0..5)
            .map(|child| format!(r#"<a href="https://site.test/p{}">x</a>"#, page * 5 + child + 1))
            .collect();
        pages.push((format!("https://site.test/p{page}"), links));
    }
    let pages: Vec<(&str, &str)> = pages
        .iter()
        .map(|(u, b)| (u.as_str(), b.as_str()))
        .collect();
    let (crawler, _index, queue) = crawler(FakeFetcher::new(&pages));

    WebCrawler::build(&crawler, url("https://site.test/p0"), 3);
    assert_eq!(crawler.crawled_urls().len(), 3);
    queue.join();
}

#[test]
fn second_seed_gets_a_fresh_budget_even_if_already_crawled() {
    // The first crawl discovers b but exhausts its budget before b's links;
    // re-seeding from b must fetch it again and reach c.
    let fetcher = FakeFetcher::new(&[
        ("https://site.test/a", r#"<a href="https://site.test/b">b</a>"#),
        ("https://site.test/b", r#"<a href="https://site.test/c">c</a>"#),
        ("https://site.test/c", "<p>deep</p>"),
    ]);
    let (crawler, index, queue) = crawler(fetcher);

    WebCrawler::build(&crawler, url("https://site.test/a"), 2);
    assert_eq!(crawler.crawled_urls().len(), 2);
    assert!(!index.contains_word("deep"));

    WebCrawler::build(&crawler, url("https://site.test/b"), 5);
    assert!(crawler.crawled_urls().contains(&url("https://site.test/c")));
    assert!(index.contains_word("deep"));
    queue.join();
}

#[test]
fn single_page_mode_ignores_links() {
    let fetcher = FakeFetcher::new(&[
        (
            "https://site.test/",
            r#"<p>seed words</p><a href="https://site.test/next">n</a>"#,
        ),
        ("https://site.test/next", "<p>unreachable</p>"),
    ]);
    let (crawler, index, queue) = crawler(fetcher);

    WebCrawler::build(&crawler, url("https://site.test/"), 1);
    assert_eq!(crawler.crawled_urls().len(), 1);
    assert!(index.contains_word("seed"));
    assert!(!index.contains_word("unreach"));
    queue.join();
}

#[test]
fn fragments_are_stripped_before_dedup() {
    let fetcher = FakeFetcher::new(&[
        (
            "https://site.test/",
            r##"<a href="https://site.test/a#one">x</a><a href="https://site.test/a#two">y</a>"##,
        ),
        ("https://site.test/a", "<p>alpha</p>"),
    ]);
    let (crawler, index, queue) = crawler(fetcher);

    WebCrawler::build(&crawler, url("https://site.test/"), 10);
    assert_eq!(crawler.crawled_urls().len(), 2);
    assert!(index.contains_word("alpha"));
    queue.join();
}

#[test]
fn relative_links_resolve_against_the_page_url() {
    let fetcher = FakeFetcher::new(&[
        ("https://site.test/docs/start", r#"<a href="next">x</a>"#),
        ("https://site.test/docs/next", "<p>found</p>"),
    ]);
    let (crawler, index, queue) = crawler(fetcher);

    WebCrawler::build(&crawler, url("https://site.test/docs/start"), 5);
    assert!(crawler
        .crawled_urls()
        .contains(&url("https://site.test/docs/next")));
    assert!(index.contains_word("found"));
    queue.join();
}

#[test]
fn non_http_links_are_discarded() {
    let fetcher = FakeFetcher::new(&[(
        "https://site.test/",
        r#"<a href="mailto:a@b.c">m</a><a href="ftp://x/y">f</a>"#,
    )]);
    let (crawler, _index, queue) = crawler(fetcher);

    WebCrawler::build(&crawler, url("https://site.test/"), 5);
    assert_eq!(crawler.crawled_urls().len(), 1);
    queue.join();
}

#[test]
fn failed_fetches_contribute_nothing() {
    let fetcher = FakeFetcher::new(&[(
        "https://site.test/",
        r#"<a href="https://site.test/missing">x</a>"#,
    )]);
    let (crawler, index, queue) = crawler(fetcher);

    WebCrawler::build(&crawler, url("https://site.test/"), 5);
    // The missing page is recorded as scheduled but adds no tokens.
    assert_eq!(crawler.crawled_urls().len(), 2);
    assert!(!index.contains_location("x", "https://site.test/missing"));
    queue.join();
}

#[test]
fn page_positions_start_at_one_per_page() {
    let fetcher = FakeFetcher::new(&[
        (
            "https://site.test/",
            r#"<p>cat dog</p><a href="https://site.test/b">b</a>"#,
        ),
        ("https://site.test/b", "<p>bird</p>"),
    ]);
    let (crawler, index, queue) = crawler(fetcher);

    WebCrawler::build(&crawler, url("https://site.test/"), 2);
    assert_eq!(index.positions("cat", "https://site.test/"), vec![1]);
    assert_eq!(index.positions("bird", "https://site.test/b"), vec![1]);
    queue.join();
}

#[test]
fn script_and_style_text_is_not_indexed() {
    let fetcher = FakeFetcher::new(&[(
        "https://site.test/",
        "<style>.hidden{}</style><script>var secret;</script><p>visible</p>",
    )]);
    let (crawler, index, queue) = crawler(fetcher);

    WebCrawler::build(&crawler, url("https://site.test/"), 1);
    assert!(index.contains_word("visibl"));
    assert!(!index.contains_word("secret"));
    assert!(!index.contains_word("hidden"));
    queue.join();
}
