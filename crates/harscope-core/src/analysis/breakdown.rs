use super::{Analyzer, ResourceType};
use crate::har::{Entry, Har};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestSummary {
    pub url: String,
    pub method: String,
    pub status: i64,
    pub time: f64,
    pub size: u64,
}

impl From<&Entry> for RequestSummary {
    fn from(entry: &Entry) -> Self {
        Self {
            url: entry.request.url.clone(),
            method: entry.request.method.clone(),
            status: entry.response.status,
            time: entry.time,
            size: entry.content_size(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TypeBreakdown {
    pub count: usize,
    pub bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BreakdownStats {
    pub slowest: Vec<RequestSummary>,
    pub largest: Vec<RequestSummary>,
    pub errors: Vec<RequestSummary>,
    pub by_type: BTreeMap<ResourceType, TypeBreakdown>,
}

/// Per-request views over an entry collection: slowest, largest, failing
/// and grouped by resource type
pub struct RequestBreakdown {
    top_n: usize,
}

impl RequestBreakdown {
    pub fn new(top_n: usize) -> Self {
        Self { top_n }
    }

    pub fn calculate(&self, entries: &[Entry]) -> BreakdownStats {
        tracing::debug!("Building request breakdown over {} entries", entries.len());

        let mut slowest: Vec<&Entry> = entries.iter().collect();
        slowest.sort_by(|a, b| b.time.total_cmp(&a.time));
        slowest.truncate(self.top_n);

        let mut largest: Vec<&Entry> = entries.iter().collect();
        largest.sort_by(|a, b| b.content_size().cmp(&a.content_size()));
        largest.truncate(self.top_n);

        let errors = entries
            .iter()
            .filter(|e| e.is_error())
            .map(RequestSummary::from)
            .collect();

        let mut by_type: BTreeMap<ResourceType, TypeBreakdown> = BTreeMap::new();
        for entry in entries {
            let bucket = by_type
                .entry(ResourceType::from_mime(&entry.response.content.mime_type))
                .or_default();
            bucket.count += 1;
            bucket.bytes += entry.content_size();
        }

        BreakdownStats {
            slowest: slowest.into_iter().map(RequestSummary::from).collect(),
            largest: largest.into_iter().map(RequestSummary::from).collect(),
            errors,
            by_type,
        }
    }
}

impl Default for RequestBreakdown {
    fn default() -> Self {
        Self::new(10)
    }
}

impl Analyzer for RequestBreakdown {
    type Output = BreakdownStats;

    fn analyze(&self, har: &Har) -> Self::Output {
        self.calculate(&har.log.entries)
    }
}
