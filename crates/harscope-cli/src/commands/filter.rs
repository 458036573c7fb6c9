use super::load_har;
use anyhow::Result;
use harscope_core::filter::{FilterCriteria, filter_har};
use harscope_core::har::HarWriter;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    /// Host patterns; each value may itself be comma-separated
    pub hosts: Vec<String>,
    pub status: Option<String>,
    pub method: Option<String>,
    pub content_type: Option<String>,
    pub search: Option<String>,
    /// Write the filtered HAR here instead of stdout
    pub output: Option<PathBuf>,
}

impl FilterOptions {
    fn criteria(&self) -> Result<FilterCriteria> {
        let host_patterns: Vec<String> = self
            .hosts
            .iter()
            .flat_map(|h| h.split(',').map(|s| s.trim().to_string()))
            .filter(|h| !h.is_empty())
            .collect();

        let mut criteria = FilterCriteria::new();

        if !host_patterns.is_empty() {
            criteria = criteria.with_hosts(host_patterns)?;
        }
        if let Some(status) = &self.status {
            criteria = criteria.with_status(status)?;
        }
        if let Some(method) = &self.method {
            criteria = criteria.with_method(method);
        }
        if let Some(content_type) = &self.content_type {
            criteria = criteria.with_content_type(content_type);
        }
        if let Some(search) = &self.search {
            criteria = criteria.with_search(search);
        }

        Ok(criteria)
    }
}

pub fn execute(file: &Path, options: &FilterOptions) -> Result<()> {
    tracing::debug!("Filtering HAR file: {}", file.display());

    let criteria = options.criteria()?;
    let har = load_har(file)?;
    let filtered = filter_har(&har, &criteria)?;

    tracing::info!(
        "Kept {} of {} entries",
        filtered.log.entries.len(),
        har.log.entries.len()
    );

    match &options.output {
        Some(path) => {
            tracing::debug!("Writing filtered HAR to: {}", path.display());
            HarWriter::to_file(&filtered, path)?;
        }
        None => {
            let json = HarWriter::to_string(&filtered)?;
            let mut stdout = io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }

    Ok(())
}
