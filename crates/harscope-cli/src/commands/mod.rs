pub mod compare;
pub mod completion;
pub mod entries;
pub mod filter;
pub mod metrics;
pub mod timeline;

use anyhow::{Context, Result};
use harscope_core::analysis::{MetricsCalculator, ThirdPartyList};
use harscope_core::filter::FilterCriteria;
use harscope_core::har::{Har, HarReader};
use std::path::Path;

/// Read and validate a HAR file, naming the file in any error
pub fn load_har(file: &Path) -> Result<Har> {
    HarReader::load(file).with_context(|| format!("Invalid HAR file {}", file.display()))
}

/// Display label for a file: its file name, or the full path if it has none
pub fn file_label(file: &Path) -> String {
    file.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| file.display().to_string())
}

/// Metrics calculator using the given third-party patterns, or the built-in list
pub fn metrics_calculator(third_party: Option<&[String]>) -> MetricsCalculator {
    match third_party {
        Some(patterns) => MetricsCalculator::with_third_party(ThirdPartyList::new(patterns)),
        None => MetricsCalculator::new(),
    }
}

/// Criteria shared by the metrics, timeline and entries commands
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    pub search: Option<String>,
    pub status: Option<String>,
    pub method: Option<String>,
}

impl EntryFilter {
    pub fn criteria(&self) -> Result<FilterCriteria> {
        let mut criteria = FilterCriteria::new();

        if let Some(search) = &self.search {
            criteria = criteria.with_search(search);
        }
        if let Some(status) = &self.status {
            criteria = criteria.with_status(status)?;
        }
        if let Some(method) = &self.method {
            criteria = criteria.with_method(method);
        }

        Ok(criteria)
    }
}
