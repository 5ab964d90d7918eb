use std::path::PathBuf;

/// Exit status for a fetch or structural failure.
pub const EXIT_FATAL: u8 = 2;
/// Exit status when a transcript file could not be written.
pub const EXIT_IO: u8 = 3;

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("could not fetch {url}: {reason}")]
    Unavailable { url: String, reason: String },
    #[error("unexpected page structure: {0}")]
    Structure(String),
    #[error("invalid episode number {value:?} in season {season}")]
    Parse { season: u32, value: String },
    #[error("failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid selector: {0}")]
    Selector(String),
}

impl ScrapeError {
    pub fn exit_code(&self) -> u8 {
        match self {
            ScrapeError::Unavailable { .. } | ScrapeError::Structure(_) => EXIT_FATAL,
            ScrapeError::Io { .. } => EXIT_IO,
            ScrapeError::Parse { .. } | ScrapeError::Selector(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
