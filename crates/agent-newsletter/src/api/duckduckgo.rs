//! DuckDuckGo news search client
//!
//! Two backends:
//! - `news`: fetch a `vqd` token from the search page, then query the
//!   `news.js` JSON endpoint. Results carry a date and a source.
//! - `html`: parse the plain HTML results page.

use crate::config::SearchBackend;
use crate::error::{NewsletterError, Result};
use async_trait::async_trait;
use chrono::DateTime;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use regex::Regex;
use reqwest::{Client, Url};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::{debug, instrument};

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

const DEFAULT_BASE_URL: &str = "https://duckduckgo.com";
const DEFAULT_HTML_URL: &str = "https://html.duckduckgo.com";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

/// One search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsResult {
    pub title: String,
    pub snippet: String,
    pub link: String,
    /// RFC 3339 publication time (news backend only)
    pub date: Option<String>,
    /// Publisher (news backend only)
    pub source: Option<String>,
}

impl fmt::Display for NewsResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[snippet: {}, title: {}, link: {}",
            self.snippet, self.title, self.link
        )?;
        if let Some(date) = &self.date {
            write!(f, ", date: {date}")?;
        }
        if let Some(source) = &self.source {
            write!(f, ", source: {source}")?;
        }
        f.write_str("]")
    }
}

/// Anything that can search recent news
#[async_trait]
pub trait NewsSearch: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<NewsResult>>;
}

/// DuckDuckGo client with rate limiting
pub struct DuckDuckGoClient {
    client: Client,
    base_url: String,
    html_url: String,
    backend: SearchBackend,
    rate_limiter: SharedRateLimiter,
}

impl DuckDuckGoClient {
    /// Create a client
    ///
    /// # Arguments
    /// * `backend` - Which DuckDuckGo endpoint to use
    /// * `rate_limit` - Searches per minute
    /// * `timeout` - Per-request timeout
    pub fn new(backend: SearchBackend, rate_limit: u32, timeout: Duration) -> Result<Self> {
        let per_minute = NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_minute(per_minute)));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            html_url: DEFAULT_HTML_URL.to_string(),
            backend,
            rate_limiter,
        })
    }

    /// Point both endpoints at another host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        self.html_url.clone_from(&base_url);
        self.base_url = base_url;
        self
    }

    pub fn backend(&self) -> SearchBackend {
        self.backend
    }

    async fn get_text(&self, url: &str, query: &[(&str, &str)]) -> Result<String> {
        let response = self.client.get(url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NewsletterError::Search(format!(
                "DuckDuckGo returned {status}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }
        Ok(response.text().await?)
    }

    async fn vqd(&self, query: &str) -> Result<String> {
        let page = self.get_text(&format!("{}/", self.base_url), &[("q", query)]).await?;
        extract_vqd(&page)
            .ok_or_else(|| NewsletterError::Search(format!("no vqd token for '{query}'")))
    }

    async fn search_news(&self, query: &str, max_results: usize) -> Result<Vec<NewsResult>> {
        let vqd = self.vqd(query).await?;
        let body = self
            .get_text(
                &format!("{}/news.js", self.base_url),
                &[
                    ("l", "wt-wt"),
                    ("o", "json"),
                    ("noamp", "1"),
                    ("q", query),
                    ("vqd", &vqd),
                    ("p", "-1"),
                ],
            )
            .await?;
        parse_news_json(&body, max_results)
    }

    async fn search_html(&self, query: &str, max_results: usize) -> Result<Vec<NewsResult>> {
        let body = self
            .get_text(&format!("{}/html/", self.html_url), &[("q", query)])
            .await?;
        parse_html_results(&body, max_results)
    }
}

#[async_trait]
impl NewsSearch for DuckDuckGoClient {
    #[instrument(skip(self), fields(backend = ?self.backend))]
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<NewsResult>> {
        self.rate_limiter.until_ready().await;

        let results = match self.backend {
            SearchBackend::News => self.search_news(query, max_results).await?,
            SearchBackend::Html => self.search_html(query, max_results).await?,
        };
        debug!(count = results.len(), "Search finished");
        Ok(results)
    }
}

static VQD_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"vqd=["']?([0-9-]+)"#).ok());

fn extract_vqd(page: &str) -> Option<String> {
    VQD_PATTERN
        .as_ref()?
        .captures(page)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    results: Vec<NewsItem>,
}

#[derive(Debug, Deserialize)]
struct NewsItem {
    #[serde(default)]
    date: Option<i64>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    excerpt: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    source: Option<String>,
}

fn parse_news_json(body: &str, max_results: usize) -> Result<Vec<NewsResult>> {
    let response: NewsResponse = serde_json::from_str(body)?;
    Ok(response
        .results
        .into_iter()
        .filter(|item| !item.url.is_empty())
        .take(max_results)
        .map(|item| NewsResult {
            title: strip_tags(&item.title),
            snippet: strip_tags(&item.excerpt),
            link: item.url,
            date: item
                .date
                .and_then(|ts| DateTime::from_timestamp(ts, 0))
                .map(|d| d.to_rfc3339()),
            source: item.source.filter(|s| !s.is_empty()),
        })
        .collect())
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| NewsletterError::Search(format!("bad selector {css}: {e}")))
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ")
}

fn parse_html_results(body: &str, max_results: usize) -> Result<Vec<NewsResult>> {
    let document = Html::parse_document(body);
    let result_selector = selector("div.result")?;
    let title_selector = selector("a.result__a")?;
    let snippet_selector = selector(".result__snippet")?;

    let mut results = Vec::new();
    for element in document.select(&result_selector) {
        let Some(title) = element.select(&title_selector).next() else {
            continue;
        };
        let Some(link) = title.value().attr("href").and_then(result_link) else {
            continue;
        };
        results.push(NewsResult {
            title: element_text(title),
            snippet: element
                .select(&snippet_selector)
                .next()
                .map(element_text)
                .unwrap_or_default(),
            link,
            date: None,
            source: None,
        });
        if results.len() == max_results {
            break;
        }
    }
    Ok(results)
}

/// Target of a result anchor; redirect links carry it in `uddg`
fn result_link(href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let base = Url::parse(DEFAULT_BASE_URL).ok()?;
    let Ok(url) = base.join(href) else {
        return Some(href.to_string());
    };
    if url.path().starts_with("/l/") {
        if let Some((_, target)) = url.query_pairs().find(|(key, _)| key == "uddg") {
            return Some(target.into_owned());
        }
    }
    Some(url.into())
}

/// News excerpts arrive with `<b>` highlighting and HTML entities
fn strip_tags(text: &str) -> String {
    Html::parse_fragment(text)
        .root_element()
        .text()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::GET, MockServer};

    const NEWS_BODY: &str = r#"{
        "results": [
            {"date": 1714521600, "title": "Bitcoin <b>slides</b>", "excerpt": "BTC fell 5%", "url": "https://news.example/btc", "source": "CoinDesk"},
            {"date": 1714525200, "title": "Miners sell", "excerpt": "Hashrate &amp; fees", "url": "https://news.example/miners", "source": ""},
            {"title": "No link", "excerpt": "skipped", "url": ""}
        ]
    }"#;

    const HTML_BODY: &str = r#"<html><body>
        <div class="result results_links">
          <h2><a class="result__a" href="https://example.com/aapl">Apple   beats estimates</a></h2>
          <a class="result__snippet">iPhone sales rose</a>
        </div>
        <div class="result"><span>no title</span></div>
        <div class="result">
          <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Faapl2%3Fref%3Dddg&amp;rut=abc">Apple buyback</a>
        </div>
    </body></html>"#;

    fn client(server: &MockServer, backend: SearchBackend) -> DuckDuckGoClient {
        DuckDuckGoClient::new(backend, 600, Duration::from_secs(5))
            .unwrap()
            .with_base_url(server.base_url())
    }

    #[test]
    fn test_result_display() {
        let result = NewsResult {
            title: "T".into(),
            snippet: "S".into(),
            link: "L".into(),
            date: Some("2024-05-01T00:00:00+00:00".into()),
            source: Some("Reuters".into()),
        };
        assert_eq!(
            result.to_string(),
            "[snippet: S, title: T, link: L, date: 2024-05-01T00:00:00+00:00, source: Reuters]"
        );

        let plain = NewsResult {
            date: None,
            source: None,
            ..result
        };
        assert_eq!(plain.to_string(), "[snippet: S, title: T, link: L]");
    }

    #[test]
    fn test_extract_vqd() {
        assert_eq!(
            extract_vqd(r#"<script>vqd="4-1234567890-987";</script>"#).as_deref(),
            Some("4-1234567890-987")
        );
        assert_eq!(extract_vqd("&vqd=3-55&").as_deref(), Some("3-55"));
        assert!(extract_vqd("<html></html>").is_none());
    }

    #[test]
    fn test_parse_news_json() {
        let results = parse_news_json(NEWS_BODY, 10).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Bitcoin slides");
        assert_eq!(results[0].date.as_deref(), Some("2024-05-01T00:00:00+00:00"));
        assert_eq!(results[0].source.as_deref(), Some("CoinDesk"));
        assert_eq!(results[1].snippet, "Hashrate & fees");
        assert!(results[1].source.is_none());

        assert_eq!(parse_news_json(NEWS_BODY, 1).unwrap().len(), 1);
    }

    #[test]
    fn test_parse_html_results() {
        let results = parse_html_results(HTML_BODY, 10).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Apple beats estimates");
        assert_eq!(results[0].snippet, "iPhone sales rose");
        assert_eq!(results[0].link, "https://example.com/aapl");
        assert_eq!(results[1].link, "https://example.com/aapl2?ref=ddg");
        assert!(results[1].snippet.is_empty());
    }

    #[test]
    fn test_result_link() {
        assert_eq!(
            result_link("//duckduckgo.com/l/?uddg=https%3A%2F%2Fnews.example%2Fa%20b").as_deref(),
            Some("https://news.example/a b")
        );
        assert_eq!(
            result_link("https://news.example/plain").as_deref(),
            Some("https://news.example/plain")
        );
        assert!(result_link("  ").is_none());
    }

    #[test]
    fn test_strip_tags_decodes_entities() {
        assert_eq!(
            strip_tags("S&amp;P &lt;5000&gt; isn&#39;t &nbsp;flat"),
            "S&P <5000> isn't \u{a0}flat"
        );
        assert_eq!(strip_tags("Apple <b>beats</b> &quot;estimates&quot;"), "Apple beats \"estimates\"");
    }

    #[tokio::test]
    async fn test_news_backend_uses_vqd_token() {
        let server = MockServer::start();
        let token = server.mock(|when, then| {
            when.method(GET).path("/").query_param("q", "BTC");
            then.status(200).body(r#"<script>vqd="4-111-222";</script>"#);
        });
        let news = server.mock(|when, then| {
            when.method(GET)
                .path("/news.js")
                .query_param("q", "BTC")
                .query_param("vqd", "4-111-222")
                .query_param("o", "json");
            then.status(200)
                .header("content-type", "application/json")
                .body(NEWS_BODY);
        });

        let results = client(&server, SearchBackend::News)
            .search("BTC", 10)
            .await
            .unwrap();

        token.assert();
        news.assert();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_html_backend() {
        let server = MockServer::start();
        let page = server.mock(|when, then| {
            when.method(GET).path("/html/").query_param("q", "AAPL");
            then.status(200).body(HTML_BODY);
        });

        let results = client(&server, SearchBackend::Html)
            .search("AAPL", 1)
            .await
            .unwrap();

        page.assert();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_token_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/");
            then.status(200).body("<html>blocked</html>");
        });

        let err = client(&server, SearchBackend::News)
            .search("AAPL", 10)
            .await
            .unwrap_err();
        assert!(matches!(err, NewsletterError::Search(_)));
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/html/");
            then.status(503).body("rate limited");
        });

        let err = client(&server, SearchBackend::Html)
            .search("AAPL", 10)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("503"));
    }
}
