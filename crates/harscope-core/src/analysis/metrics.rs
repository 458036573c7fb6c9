use super::Analyzer;
use crate::har::{Entry, Har};
use serde::Serialize;

/// Export value for a TTFB that was never observed
pub const UNMEASURED: f64 = -1.0;

const DEFAULT_THIRD_PARTY_DOMAINS: &[&str] = &[
    "googleapis.com",
    "googletagmanager.com",
    "facebook.com",
    "twitter.com",
    "analytics.google.com",
    "doubleclick.net",
    "amazon.com",
    "cdn.",
    "cdnjs.",
];

/// Where a page load time came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageLoadSource {
    /// No entries to derive a load time from
    #[default]
    None,
    /// The archive's own `onLoad` page timing
    PageTimings,
    /// Span from the earliest request start to the latest request end
    Estimated,
}

/// Aggregate performance metrics over one entry collection
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metrics {
    pub total_requests: usize,
    pub total_time: f64,
    pub total_size: u64,
    /// Smallest positive `wait` phase; `None` when no entry measured one
    pub ttfb: Option<f64>,
    pub page_load_time: f64,
    pub page_load_source: PageLoadSource,
    pub dns_time: f64,
    pub connect_time: f64,
    pub ssl_time: f64,
    pub cache_hit_ratio: f64,
    pub third_party_requests: usize,
    pub error_requests: usize,
}

impl Metrics {
    /// TTFB with the unmeasured state flattened to [`UNMEASURED`]
    pub fn ttfb_or_sentinel(&self) -> f64 {
        self.ttfb.unwrap_or(UNMEASURED)
    }
}

/// Substring patterns identifying third-party requests.
///
/// An entry is third-party when its URL contains any pattern. This is a
/// containment test on the whole URL, not a host comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThirdPartyList {
    patterns: Vec<String>,
}

impl ThirdPartyList {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| p.as_ref().trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn matches(&self, url: &str) -> bool {
        let url = url.to_lowercase();
        self.patterns.iter().any(|pattern| url.contains(pattern))
    }
}

impl Default for ThirdPartyList {
    fn default() -> Self {
        Self::new(DEFAULT_THIRD_PARTY_DOMAINS)
    }
}

#[derive(Default)]
pub struct MetricsCalculator {
    third_party: ThirdPartyList,
}

impl MetricsCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_third_party(third_party: ThirdPartyList) -> Self {
        Self { third_party }
    }

    pub fn third_party(&self) -> &ThirdPartyList {
        &self.third_party
    }

    /// Reduce `entries` to one [`Metrics`] record in a single pass.
    ///
    /// `page_on_load` is the archive's page-level `onLoad` timing; it wins
    /// over the estimated load time when it is positive.
    pub fn calculate(&self, entries: &[Entry], page_on_load: Option<f64>) -> Metrics {
        tracing::debug!("Calculating metrics over {} entries", entries.len());

        if entries.is_empty() {
            return Metrics::default();
        }

        let mut total_time = 0.0;
        let mut total_size = 0u64;
        let mut dns_sum = 0.0;
        let mut connect_sum = 0.0;
        let mut ssl_sum = 0.0;
        let mut ttfb: Option<f64> = None;
        let mut cache_hits = 0usize;
        let mut error_requests = 0usize;
        let mut third_party_requests = 0usize;
        let mut earliest_start = f64::INFINITY;
        let mut latest_end = f64::NEG_INFINITY;

        for entry in entries {
            total_time += entry.time;
            total_size += entry.content_size();

            if entry.is_error() {
                error_requests += 1;
            }

            let timings = &entry.timings;
            if timings.dns > 0.0 {
                dns_sum += timings.dns;
            }
            if timings.connect > 0.0 {
                connect_sum += timings.connect;
            }
            if timings.ssl > 0.0 {
                ssl_sum += timings.ssl;
            }
            if timings.wait > 0.0 {
                ttfb = Some(ttfb.map_or(timings.wait, |current| current.min(timings.wait)));
            }

            if entry.has_cache_state() {
                cache_hits += 1;
            }

            if self.third_party.matches(&entry.request.url) {
                third_party_requests += 1;
            }

            earliest_start = earliest_start.min(entry.start_ms());
            latest_end = latest_end.max(entry.end_ms());
        }

        let count = entries.len() as f64;
        let (page_load_time, page_load_source) = match page_on_load {
            Some(on_load) if on_load > 0.0 => (on_load, PageLoadSource::PageTimings),
            _ => ((latest_end - earliest_start).max(0.0), PageLoadSource::Estimated),
        };

        let metrics = Metrics {
            total_requests: entries.len(),
            total_time,
            total_size,
            ttfb,
            page_load_time,
            page_load_source,
            dns_time: dns_sum / count,
            connect_time: connect_sum / count,
            ssl_time: ssl_sum / count,
            cache_hit_ratio: cache_hits as f64 / count * 100.0,
            third_party_requests,
            error_requests,
        };

        tracing::info!(
            "Metrics complete: {} requests, load={:.1}ms, errors={}",
            metrics.total_requests,
            metrics.page_load_time,
            metrics.error_requests
        );

        metrics
    }
}

impl Analyzer for MetricsCalculator {
    type Output = Metrics;

    fn analyze(&self, har: &Har) -> Self::Output {
        self.calculate(&har.log.entries, har.page_on_load())
    }
}
