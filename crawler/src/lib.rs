//! Bounded breadth-first web crawler feeding the shared inverted index.
//!
//! Every fetched page is stripped to plain text, stemmed, and added to the
//! index keyed by its normalized URL, exactly as the file builder treats one
//! text file. The crawled set and remaining-page budget live behind one
//! mutex so that link scheduling never exceeds the page budget even when
//! several fetch tasks discover links at the same time.

pub mod fetch;
pub mod html;
pub mod links;

use crate::fetch::PageFetcher;
use parking_lot::Mutex;
use sift_core::{tokenizer, ThreadedIndex, WorkQueue};
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

struct CrawlState {
    crawled: HashSet<Url>,
    budget: usize,
}

pub struct WebCrawler {
    state: Mutex<CrawlState>,
    queue: Arc<WorkQueue>,
    index: Arc<ThreadedIndex>,
    fetcher: Arc<dyn PageFetcher>,
}

impl WebCrawler {
    pub fn new(
        queue: Arc<WorkQueue>,
        index: Arc<ThreadedIndex>,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Self {
        WebCrawler {
            state: Mutex::new(CrawlState {
                crawled: HashSet::new(),
                budget: 0,
            }),
            queue,
            index,
            fetcher,
        }
    }

    /// Crawls up to `max_pages` pages starting from `seed`. With a budget of
    /// one, only the seed is fetched and nothing is scheduled; otherwise the
    /// seed is recorded and submitted as the first fetch task, and the call
    /// blocks until every scheduled fetch has finished.
    ///
    /// A seed already in the crawled set is fetched again with the fresh
    /// budget, so a later seed can reach pages an earlier crawl left behind.
    pub fn build(this: &Arc<Self>, seed: Url, max_pages: usize) {
        let seed = links::normalize(seed);
        if max_pages <= 1 {
            this.single_page(&seed);
            return;
        }
        {
            let mut state = this.state.lock();
            state.crawled.insert(seed.clone());
            state.budget = max_pages - 1;
        }
        Self::enqueue(this, seed);
        this.queue.finish();
    }

    fn enqueue(this: &Arc<Self>, url: Url) {
        let me = Arc::clone(this);
        this.queue.execute(move || Self::crawl_page(&me, &url));
    }

    /// One fetch task: pull the page, schedule its fresh links while budget
    /// remains, then index its text.
    fn crawl_page(this: &Arc<Self>, url: &Url) {
        let Some(page) = this.fetcher.fetch(url) else {
            return;
        };
        let page = html::strip_block_elements(&page);
        for link in links::find_links(url, &page) {
            // Membership check and budget decrement happen under one lock so
            // concurrent tasks cannot overshoot the page budget.
            let mut state = this.state.lock();
            if state.budget == 0 {
                break;
            }
            if state.crawled.contains(&link) {
                continue;
            }
            state.crawled.insert(link.clone());
            state.budget -= 1;
            drop(state);
            Self::enqueue(this, link);
        }
        this.add_page(url, &page);
    }

    /// Fetches and indexes one page without touching the queue or the budget.
    fn single_page(&self, url: &Url) {
        let Some(page) = self.fetcher.fetch(url) else {
            return;
        };
        self.state.lock().crawled.insert(url.clone());
        self.add_page(url, &html::strip_block_elements(&page));
    }

    fn add_page(&self, url: &Url, page: &str) {
        let text = html::strip_entities(&html::strip_tags(page));
        let words = tokenizer::stems(&text);
        tracing::debug!(%url, tokens = words.len(), "indexed page");
        self.index.add_all(&words, url.as_str());
    }

    /// Snapshot of every URL fetched or scheduled so far.
    pub fn crawled_urls(&self) -> HashSet<Url> {
        self.state.lock().crawled.clone()
    }
}
