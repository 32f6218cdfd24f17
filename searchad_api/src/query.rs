//! Query builders for the two API endpoints.

use url::Url;

/// Trait implemented by all query builders.
pub trait Query {
    /// Appends this query's parameters to the given URL, returning the modified URL.
    fn add_to_url(&self, url: &Url) -> Url;
}

/// Parameters for `GET /keywordstool`.
#[derive(Debug, Clone)]
pub struct KeywordToolQuery {
    pub hint_keywords: String,
    pub show_detail: bool,
}

impl KeywordToolQuery {
    /// Query for keywords related to `hint`, with detail statistics enabled.
    pub fn new(hint: &str) -> Self {
        Self {
            hint_keywords: hint.to_string(),
            show_detail: true,
        }
    }

    pub fn with_show_detail(mut self, show_detail: bool) -> Self {
        self.show_detail = show_detail;
        self
    }
}

impl Query for KeywordToolQuery {
    fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        url.query_pairs_mut()
            .append_pair("hintKeywords", &self.hint_keywords)
            .append_pair("showDetail", if self.show_detail { "1" } else { "0" });
        url
    }
}

/// Result ordering for blog search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlogSort {
    Similarity,
    Date,
}

impl BlogSort {
    fn as_param(self) -> &'static str {
        match self {
            Self::Similarity => "sim",
            Self::Date => "date",
        }
    }
}

/// Parameters for `GET /search/blog`.
#[derive(Debug, Clone)]
pub struct BlogSearchQuery {
    pub query: String,
    pub display: Option<u32>,
    pub sort: Option<BlogSort>,
}

impl BlogSearchQuery {
    pub fn new(query: &str) -> Self {
        Self {
            query: query.to_string(),
            display: None,
            sort: None,
        }
    }

    /// Number of items in the response body. Only `total` matters for
    /// document counts, so callers usually ask for a single item.
    pub fn with_display(mut self, display: u32) -> Self {
        self.display = Some(display);
        self
    }

    pub fn with_sort(mut self, sort: BlogSort) -> Self {
        self.sort = Some(sort);
        self
    }
}

impl Query for BlogSearchQuery {
    fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", &self.query);
            if let Some(display) = self.display {
                pairs.append_pair("display", &display.to_string());
            }
            if let Some(sort) = self.sort {
                pairs.append_pair("sort", sort.as_param());
            }
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_tool_query_params() {
        let base = Url::parse("https://api.example.com/keywordstool").unwrap();
        let url = KeywordToolQuery::new("camping chair").add_to_url(&base);
        assert_eq!(
            url.as_str(),
            "https://api.example.com/keywordstool?hintKeywords=camping+chair&showDetail=1"
        );
    }

    #[test]
    fn keyword_tool_query_without_detail() {
        let base = Url::parse("https://api.example.com/keywordstool").unwrap();
        let url = KeywordToolQuery::new("tent")
            .with_show_detail(false)
            .add_to_url(&base);
        assert!(url.as_str().ends_with("showDetail=0"));
    }

    #[test]
    fn blog_search_query_encodes_non_ascii() {
        let base = Url::parse("https://openapi.example.com/v1/search/blog").unwrap();
        let url = BlogSearchQuery::new("캠핑 의자")
            .with_display(1)
            .add_to_url(&base);
        assert_eq!(
            url.as_str(),
            "https://openapi.example.com/v1/search/blog?query=%EC%BA%A0%ED%95%91+%EC%9D%98%EC%9E%90&display=1"
        );
    }

    #[test]
    fn blog_search_query_sort() {
        let base = Url::parse("https://openapi.example.com/v1/search/blog").unwrap();
        let url = BlogSearchQuery::new("tent")
            .with_sort(BlogSort::Date)
            .add_to_url(&base);
        assert!(url.as_str().ends_with("query=tent&sort=date"));
    }
}
