mod host_matcher;

pub use host_matcher::HostPattern;

use crate::har::{Entry, Har, Log};

/// Filter criteria for HAR entries
///
/// All filter conditions are combined with AND logic - an entry must match
/// ALL specified criteria to be included in the filtered output.
#[derive(Debug, Default)]
pub struct FilterCriteria {
    /// Host patterns to match (any pattern matching = pass)
    pub hosts: Vec<HostPattern>,
    /// HTTP status filter (e.g., "2xx", "404", "500-599")
    pub status: Option<StatusFilter>,
    /// HTTP method filter (case-insensitive)
    pub method: Option<String>,
    /// Content-Type filter (substring match, case-insensitive)
    pub content_type: Option<String>,
    /// Free-text search over URL, method and MIME type (case-insensitive)
    pub search: Option<String>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add host patterns from a list of pattern strings
    pub fn with_hosts(mut self, patterns: Vec<String>) -> crate::Result<Self> {
        for pattern in patterns {
            self.hosts.push(HostPattern::parse(&pattern)?);
        }
        Ok(self)
    }

    pub fn with_status(mut self, pattern: &str) -> crate::Result<Self> {
        self.status = Some(StatusFilter::parse(pattern)?);
        Ok(self)
    }

    pub fn with_method(mut self, method: &str) -> Self {
        self.method = Some(method.to_uppercase());
        self
    }

    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = Some(content_type.to_lowercase());
        self
    }

    /// Set the free-text search; an empty string matches everything
    pub fn with_search(mut self, text: &str) -> Self {
        self.search = (!text.is_empty()).then(|| text.to_lowercase());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
            && self.status.is_none()
            && self.method.is_none()
            && self.content_type.is_none()
            && self.search.is_none()
    }

    /// Check if an entry matches all filter criteria
    pub fn matches(&self, entry: &Entry) -> bool {
        self.matches_host(entry)
            && self.matches_status(entry)
            && self.matches_method(entry)
            && self.matches_content_type(entry)
            && self.matches_search(entry)
    }

    fn matches_host(&self, entry: &Entry) -> bool {
        self.hosts.is_empty()
            || self
                .hosts
                .iter()
                .any(|pattern| pattern.matches_url(&entry.request.url))
    }

    fn matches_status(&self, entry: &Entry) -> bool {
        match &self.status {
            None => true,
            Some(filter) => filter.matches(entry.response.status),
        }
    }

    fn matches_method(&self, entry: &Entry) -> bool {
        match &self.method {
            None => true,
            Some(method) => entry.request.method.to_uppercase() == *method,
        }
    }

    fn matches_content_type(&self, entry: &Entry) -> bool {
        match &self.content_type {
            None => true,
            Some(filter) => entry
                .response
                .content
                .mime_type
                .to_lowercase()
                .contains(filter),
        }
    }

    fn matches_search(&self, entry: &Entry) -> bool {
        match &self.search {
            None => true,
            Some(text) => [
                &entry.request.url,
                &entry.request.method,
                &entry.response.content.mime_type,
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(text)),
        }
    }
}

/// Status filter for HTTP status codes
#[derive(Debug, Clone)]
pub enum StatusFilter {
    /// Exact status code (e.g., 404)
    Exact(i64),
    /// Status code range (e.g., 200-299 for "2xx")
    Range(i64, i64),
}

impl StatusFilter {
    /// Parse a status filter pattern
    ///
    /// Supports:
    /// - Exact: "404", "200"
    /// - Range shorthand: "2xx", "4xx", "5xx"
    /// - Explicit range: "200-299", "500-599"
    pub fn parse(pattern: &str) -> crate::Result<Self> {
        let pattern = pattern.trim();

        if let Some(prefix) = pattern.strip_suffix("xx")
            && prefix.len() == 1
            && let Some(digit) = prefix.chars().next().and_then(|c| c.to_digit(10))
        {
            let start = digit as i64 * 100;
            return Ok(StatusFilter::Range(start, start + 99));
        }

        if let Some((start_str, end_str)) = pattern.split_once('-') {
            let start = start_str.trim().parse::<i64>().map_err(|_| {
                crate::Error::InvalidPattern(format!("Invalid status range start: {}", start_str))
            })?;
            let end = end_str.trim().parse::<i64>().map_err(|_| {
                crate::Error::InvalidPattern(format!("Invalid status range end: {}", end_str))
            })?;
            return Ok(StatusFilter::Range(start, end));
        }

        let code = pattern.parse::<i64>().map_err(|_| {
            crate::Error::InvalidPattern(format!("Invalid status code: {}", pattern))
        })?;
        Ok(StatusFilter::Exact(code))
    }

    pub fn matches(&self, status: i64) -> bool {
        match self {
            StatusFilter::Exact(code) => status == *code,
            StatusFilter::Range(start, end) => (*start..=*end).contains(&status),
        }
    }
}

/// Entries matching `criteria`, in their original order.
///
/// An empty result is valid here; metrics over it are simply zero.
pub fn filter_entries(entries: &[Entry], criteria: &FilterCriteria) -> Vec<Entry> {
    if criteria.is_empty() {
        return entries.to_vec();
    }

    let filtered: Vec<Entry> = entries
        .iter()
        .filter(|entry| criteria.matches(entry))
        .cloned()
        .collect();

    tracing::debug!("Filter kept {} of {} entries", filtered.len(), entries.len());
    filtered
}

/// Filter a HAR file based on criteria
///
/// Returns a new HAR with only entries that match the filter criteria.
/// Preserves all metadata (creator, browser, pages).
///
/// Returns an error if no entries match the filter.
pub fn filter_har(har: &Har, criteria: &FilterCriteria) -> crate::Result<Har> {
    let entries = filter_entries(&har.log.entries, criteria);

    if entries.is_empty() {
        return Err(crate::Error::NoMatches);
    }

    Ok(Har {
        log: Log {
            version: har.log.version.clone(),
            creator: har.log.creator.clone(),
            browser: har.log.browser.clone(),
            pages: har.log.pages.clone(),
            entries,
            comment: har.log.comment.clone(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::entry;

    fn sample() -> Vec<Entry> {
        let mut html = entry("https://www.example.com/", 0, 100.0, 200);
        html.response.content.mime_type = "text/html".to_string();
        let mut script = entry("https://cdn.example.com/app.JS", 10, 40.0, 304);
        script.response.content.mime_type = "application/javascript".to_string();
        let mut api = entry("https://api.example.com/v1/items", 20, 80.0, 500);
        api.request.method = "POST".to_string();
        api.response.content.mime_type = "application/json".to_string();
        vec![html, script, api]
    }

    #[test]
    fn test_status_filter_exact() {
        let filter = StatusFilter::parse("404").unwrap();
        assert!(filter.matches(404));
        assert!(!filter.matches(200));
    }

    #[test]
    fn test_status_filter_shorthand() {
        let filter = StatusFilter::parse("4xx").unwrap();
        assert!(filter.matches(400));
        assert!(filter.matches(499));
        assert!(!filter.matches(399));
        assert!(!filter.matches(500));
    }

    #[test]
    fn test_status_filter_explicit_range() {
        let filter = StatusFilter::parse("300-399").unwrap();
        assert!(filter.matches(301));
        assert!(!filter.matches(400));
    }

    #[test]
    fn test_status_filter_invalid() {
        assert!(StatusFilter::parse("abc").is_err());
        assert!(StatusFilter::parse("1xxx").is_err());
        assert!(StatusFilter::parse("200-abc").is_err());
    }

    #[test]
    fn test_search_matches_url_method_and_mime() {
        let entries = sample();

        let by_url = filter_entries(&entries, &FilterCriteria::new().with_search("app.js"));
        assert_eq!(by_url.len(), 1);

        let by_method = filter_entries(&entries, &FilterCriteria::new().with_search("post"));
        assert_eq!(by_method[0].request.url, "https://api.example.com/v1/items");

        let by_mime = filter_entries(&entries, &FilterCriteria::new().with_search("JSON"));
        assert_eq!(by_mime.len(), 1);

        let everything = filter_entries(&entries, &FilterCriteria::new().with_search(""));
        assert_eq!(everything.len(), 3);
    }

    #[test]
    fn test_criteria_are_combined_with_and() {
        let criteria = FilterCriteria::new()
            .with_hosts(vec!["*.example.com".to_string()])
            .unwrap()
            .with_status("2xx")
            .unwrap()
            .with_content_type("HTML");

        let filtered = filter_entries(&sample(), &criteria);

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].request.url, "https://www.example.com/");
    }

    #[test]
    fn test_filter_entries_may_be_empty() {
        let criteria = FilterCriteria::new().with_method("DELETE");

        assert!(filter_entries(&sample(), &criteria).is_empty());
    }

    #[test]
    fn test_filter_har_preserves_metadata() {
        let har = Har {
            log: Log {
                version: "1.2".to_string(),
                comment: Some("recorded".to_string()),
                entries: sample(),
                ..Default::default()
            },
        };

        let filtered = filter_har(&har, &FilterCriteria::new().with_status("5xx").unwrap()).unwrap();
        assert_eq!(filtered.log.entries.len(), 1);
        assert_eq!(filtered.log.version, "1.2");
        assert_eq!(filtered.log.comment.as_deref(), Some("recorded"));

        let none = filter_har(&har, &FilterCriteria::new().with_method("PUT"));
        assert!(matches!(none, Err(crate::Error::NoMatches)));
    }
}
