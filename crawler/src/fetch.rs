use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use std::time::Duration;
use url::Url;

/// How many redirects a fetch follows before giving up.
const MAX_REDIRECTS: usize = 3;

/// How much of a response body is read before the page is dropped.
const MAX_BODY_BYTES: u64 = 2 * 1024 * 1024;

/// Fetches the HTML body of a page, or `None` when the page yields no usable
/// content. Injected into the crawler so tests can supply canned pages.
pub trait PageFetcher: Send + Sync {
    fn fetch(&self, url: &Url) -> Option<String>;
}

/// HTTP fetcher: follows a bounded number of redirects and only accepts
/// successful HTML responses of a bounded size.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("sift-crawler/", env!("CARGO_PKG_VERSION")))
            .redirect(Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(HttpFetcher { client })
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &Url) -> Option<String> {
        let response = match self.client.get(url.clone()).send() {
            Ok(response) => response,
            Err(error) => {
                tracing::debug!(%url, %error, "fetch failed");
                return None;
            }
        };
        if !response.status().is_success() {
            tracing::debug!(%url, status = %response.status(), "skipping non-success response");
            return None;
        }
        let html = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("text/html"));
        if !html {
            tracing::debug!(%url, "skipping non-html response");
            return None;
        }
        if response
            .content_length()
            .is_some_and(|length| length > MAX_BODY_BYTES)
        {
            tracing::debug!(%url, "skipping oversized response");
            return None;
        }
        response.text().ok()
    }
}
