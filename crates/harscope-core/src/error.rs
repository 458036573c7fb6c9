use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read HAR file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse HAR file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid HAR structure: missing HAR version")]
    MissingVersion,

    #[error("Invalid HAR structure: no entries found in HAR file")]
    NoEntries,

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("No entries matched the filter criteria")]
    NoMatches,
}

pub type Result<T> = std::result::Result<T, Error>;
