//! Result-page fetching and candidate link extraction.
//!
//! Result pages mix links to individual posts with links to blog home pages,
//! profiles and categories. Only post links count toward a ranking, so a
//! link is kept when it carries a known post path marker or, failing that,
//! has enough path segments to address a single post.

use std::collections::HashSet;
use std::time::Duration;

use regex::Regex;
use reqwest::{StatusCode, Url};
use searchad_api::user_agent::get_user_agent;

#[derive(thiserror::Error, Debug)]
pub enum ScrapeError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {status}")]
    HttpStatus { status: StatusCode },
    #[error("invalid url: {0}")]
    Url(String),
}

impl ScrapeError {
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::HttpStatus { status } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            Self::Url(_) => false,
        }
    }
}

/// Timeout for a single result-page fetch.
const PAGE_TIMEOUT: Duration = Duration::from_secs(15);

/// What a result link looks like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkPattern {
    /// Host of result items, e.g. `blog.naver.com`.
    pub host: String,
    /// Path fragments that identify a post URL outright.
    pub post_markers: Vec<String>,
    /// Minimum number of non-empty `/`-separated segments of the whole URL
    /// (scheme and host included) for a link without a marker to count.
    pub min_segments: usize,
}

impl Default for LinkPattern {
    fn default() -> Self {
        Self {
            host: "blog.naver.com".to_string(),
            post_markers: vec!["/PostView.naver".to_string(), "/PostList.naver".to_string()],
            min_segments: 4,
        }
    }
}

impl LinkPattern {
    /// Whether a query-free URL looks like an individual post.
    pub fn is_post_url(&self, url: &str) -> bool {
        self.post_markers.iter().any(|m| url.contains(m.as_str()))
            || url.split('/').filter(|s| !s.is_empty()).count() >= self.min_segments
    }
}

/// A result link in page order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLink {
    pub url: String,
    pub normalized_url: String,
}

impl CandidateLink {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            normalized_url: normalize_url(url),
        }
    }
}

/// Canonical form for tolerant comparison: no scheme, no leading `www.`,
/// no query string or fragment, no trailing `/`, lowercase.
pub fn normalize_url(url: &str) -> String {
    let lower = url.trim().to_lowercase();
    let rest = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))
        .unwrap_or(&lower);
    let rest = rest.strip_prefix("www.").unwrap_or(rest);
    let end = rest.find(|c| c == '?' || c == '#').unwrap_or(rest.len());
    rest[..end].trim_end_matches('/').to_string()
}

fn strip_query(url: &str) -> &str {
    let end = url.find(|c| c == '?' || c == '#').unwrap_or(url.len());
    url[..end].trim_end_matches('\\')
}

/// Pulls ordered, deduplicated post links out of raw result-page markup.
pub struct ResultLinkExtractor {
    pattern: LinkPattern,
    regex: Regex,
}

impl ResultLinkExtractor {
    pub fn new(pattern: LinkPattern) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!(
            r#"https?://{}/[^"'\s<>]+"#,
            regex::escape(&pattern.host)
        ))?;
        Ok(Self { pattern, regex })
    }

    pub fn pattern(&self) -> &LinkPattern {
        &self.pattern
    }

    /// Links in order of first occurrence, one per normalized URL.
    pub fn extract(&self, body: &str) -> Vec<CandidateLink> {
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for m in self.regex.find_iter(body) {
            let url = strip_query(m.as_str());
            if !self.pattern.is_post_url(url) {
                continue;
            }
            let link = CandidateLink::new(url);
            if seen.insert(link.normalized_url.clone()) {
                links.push(link);
            }
        }

        tracing::debug!("Extracted {} candidate links", links.len());
        links
    }
}

fn build_http(timeout: Duration) -> Result<reqwest::Client, ScrapeError> {
    Ok(reqwest::Client::builder()
        .user_agent(get_user_agent())
        .timeout(timeout)
        .build()?)
}

/// Fetches search result pages as raw HTML.
pub struct SearchPageClient {
    base_url: String,
    http: reqwest::Client,
}

impl SearchPageClient {
    /// Creates a client for `https://search.naver.com`.
    pub fn new() -> Result<Self, ScrapeError> {
        Self::with_base_url("https://search.naver.com")
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, ScrapeError> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: build_http(PAGE_TIMEOUT)?,
        })
    }

    /// Replaces the per-page timeout (15 s by default).
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, ScrapeError> {
        self.http = build_http(timeout)?;
        Ok(self)
    }

    /// The combined results page (featured and organic blocks).
    pub async fn combined_page(&self, keyword: &str) -> Result<String, ScrapeError> {
        let url = self.search_url(keyword, None)?;
        self.fetch_html(url).await
    }

    /// The dedicated blog-results tab.
    pub async fn tab_page(&self, keyword: &str) -> Result<String, ScrapeError> {
        let url = self.search_url(keyword, Some("post"))?;
        self.fetch_html(url).await
    }

    fn search_url(&self, keyword: &str, tab: Option<&str>) -> Result<Url, ScrapeError> {
        let mut url = Url::parse(&format!("{}/search.naver", self.base_url))
            .map_err(|e| ScrapeError::Url(e.to_string()))?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(tab) = tab {
                pairs.append_pair("where", tab);
            }
            pairs.append_pair("query", keyword);
        }
        Ok(url)
    }

    async fn fetch_html(&self, url: Url) -> Result<String, ScrapeError> {
        tracing::debug!("Fetching {}", url);
        let resp = self
            .http
            .get(url)
            .header("accept", "text/html,application/xhtml+xml")
            .header("accept-language", "ko-KR,ko;q=0.9,en-US;q=0.8")
            .header("cache-control", "no-cache")
            .header("pragma", "no-cache")
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ScrapeError::HttpStatus {
                status: resp.status(),
            });
        }

        Ok(resp.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn extractor() -> ResultLinkExtractor {
        ResultLinkExtractor::new(LinkPattern::default()).unwrap()
    }

    #[test]
    fn normalize_strips_scheme_www_query_and_case() {
        assert_eq!(
            normalize_url("https://blog.example.com/alice/123"),
            normalize_url("http://www.blog.example.com/alice/123?ref=x")
        );
        assert_eq!(
            normalize_url("HTTPS://Blog.Naver.com/Alice/223/"),
            "blog.naver.com/alice/223"
        );
        assert_eq!(normalize_url("blog.naver.com/a/1#top"), "blog.naver.com/a/1");
    }

    #[test]
    fn keeps_posts_and_drops_home_pages() {
        let body = r#"
            <a href="https://blog.naver.com/alice">Alice's blog</a>
            <a href="https://blog.naver.com/alice/223012345678">post</a>
            <a href="https://blog.naver.com/PostView.naver?blogId=bob&logNo=2230">post</a>
            <a href='https://blog.naver.com/carol/'>home</a>
        "#;
        let links = extractor().extract(body);
        let urls: Vec<&str> = links.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://blog.naver.com/alice/223012345678",
                "https://blog.naver.com/PostView.naver",
            ]
        );
    }

    #[test]
    fn dedupes_by_normalized_url_keeping_first() {
        let body = concat!(
            r#"<a href="https://blog.naver.com/alice/1">a</a>"#,
            r#"<a href="https://blog.naver.com/bob/2">b</a>"#,
            r#"<a href="https://blog.naver.com/alice/1?fromRss=true&trackingCode=rss">a</a>"#,
        );
        let links = extractor().extract(body);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].url, "https://blog.naver.com/alice/1");
        assert_eq!(links[1].url, "https://blog.naver.com/bob/2");
    }

    #[test]
    fn same_post_bare_and_with_query_yields_one_link() {
        let body = "see https://blog.naver.com/alice/123 and \
                    <a href=\"http://blog.naver.com/alice/123?ref=share\">again</a>";
        let links = extractor().extract(body);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "https://blog.naver.com/alice/123");
        assert_eq!(links[0].normalized_url, "blog.naver.com/alice/123");
    }

    #[test]
    fn match_ends_at_quote_bracket_or_whitespace() {
        let body = "x https://blog.naver.com/dan/77<b>y</b> https://blog.naver.com/eve/88 z";
        let links = extractor().extract(body);
        let urls: Vec<&str> = links.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(
            urls,
            vec!["https://blog.naver.com/dan/77", "https://blog.naver.com/eve/88"]
        );
    }

    #[test]
    fn other_hosts_are_ignored() {
        let body = r#"<a href="https://cafe.naver.com/club/1/2">c</a><a href="https://example.com/blog.naver.com/a/b">x</a>"#;
        assert!(extractor().extract(body).is_empty());
    }

    #[test]
    fn custom_host_is_escaped() {
        let pattern = LinkPattern {
            host: "blog.example.com".to_string(),
            ..LinkPattern::default()
        };
        let extractor = ResultLinkExtractor::new(pattern).unwrap();
        let links = extractor.extract("https://blogXexample.com/a/1 https://blog.example.com/a/1");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "https://blog.example.com/a/1");
    }

    #[test]
    fn segment_threshold_counts_whole_url() {
        let pattern = LinkPattern::default();
        assert!(pattern.is_post_url("https://blog.naver.com/alice/1"));
        assert!(!pattern.is_post_url("https://blog.naver.com/alice"));
        assert!(pattern.is_post_url("https://blog.naver.com/PostList.naver"));
    }

    #[tokio::test]
    async fn fetches_combined_and_tab_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search.naver"))
            .and(query_param("where", "post"))
            .and(query_param("query", "tent"))
            .respond_with(ResponseTemplate::new(200).set_body_string("tab"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/search.naver"))
            .and(query_param("query", "tent"))
            .respond_with(ResponseTemplate::new(200).set_body_string("combined"))
            .mount(&server)
            .await;

        let client = SearchPageClient::with_base_url(&server.uri()).unwrap();
        assert_eq!(client.tab_page("tent").await.unwrap(), "tab");
        assert_eq!(client.combined_page("tent").await.unwrap(), "combined");
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = SearchPageClient::with_base_url(&server.uri()).unwrap();
        let err = client.combined_page("tent").await.unwrap_err();
        assert!(matches!(err, ScrapeError::HttpStatus { status } if status == StatusCode::FORBIDDEN));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn slow_page_times_out_as_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search.naver"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("late")
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client = SearchPageClient::with_base_url(&server.uri())
            .unwrap()
            .with_timeout(Duration::from_millis(100))
            .unwrap();
        let err = client.combined_page("tent").await.unwrap_err();
        match &err {
            ScrapeError::Http(e) => assert!(e.is_timeout()),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(err.is_transient());
    }
}
