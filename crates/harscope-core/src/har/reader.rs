use crate::{Error, Result};
use super::types::Har;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const READ_BUFFER_SIZE: usize = 64 * 1024;

pub struct HarReader;

impl HarReader {
    /// Read and parse a HAR file from the given path
    pub fn from_file(path: &Path) -> Result<Har> {
        tracing::debug!("Reading HAR file from: {}", path.display());

        let file = File::open(path)?;
        let reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);
        let har: Har = serde_json::from_reader(reader)?;

        tracing::info!(
            "Successfully parsed HAR file with {} entries",
            har.log.entries.len()
        );

        Ok(har)
    }

    /// Parse a HAR file from a JSON string
    pub fn from_str(content: &str) -> Result<Har> {
        tracing::debug!("Parsing HAR from string");

        let har: Har = serde_json::from_str(content)?;

        tracing::info!(
            "Successfully parsed HAR from string with {} entries",
            har.log.entries.len()
        );

        Ok(har)
    }

    /// Read, parse and validate a HAR file in one step
    pub fn load(path: &Path) -> Result<Har> {
        let har = Self::from_file(path)?;
        Self::validate(&har)?;
        Ok(har)
    }

    /// Validate that a HAR structure is well-formed enough to analyze.
    ///
    /// Only the version and a non-empty entry set are required; any other
    /// missing field has already decoded to its zero value.
    pub fn validate(har: &Har) -> Result<()> {
        tracing::debug!("Validating HAR structure");

        if har.log.version.is_empty() {
            return Err(Error::MissingVersion);
        }

        if har.log.entries.is_empty() {
            return Err(Error::NoEntries);
        }

        tracing::debug!("HAR structure is valid");
        Ok(())
    }
}
