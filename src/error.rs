//! Crate-wide error type and result alias.
//!
//! Ingest errors are fatal to the build they occur in; the previous good
//! index generation stays live until a build fully succeeds. Query errors
//! indicate a caller bug or startup-ordering problem and are never retried
//! internally. Ambiguity (`Shortlist`, `NoMatch`) is a normal outcome, not
//! an error, and does not appear here.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SelectError>;

#[derive(Error, Debug)]
pub enum SelectError {
    /// A skill document failed the minimal required-field contract.
    #[error("malformed skill record {path}: {reason}")]
    MalformedRecord { path: PathBuf, reason: String },

    /// Two documents in one corpus resolved to the same skill id.
    #[error("duplicate skill id '{id}': {first} and {second}")]
    DuplicateId {
        id: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// The corpus contained zero skill records.
    #[error("corpus {0} contains no skill records")]
    EmptyCorpus(PathBuf),

    /// The raw query was empty after trimming.
    #[error("invalid query input: {0}")]
    InvalidInput(String),

    /// `select` was called before any index generation was published.
    #[error("no index generation is live; run a rebuild first")]
    IndexNotReady,

    /// A rebuild was requested while another build was running.
    #[error("an index build is already in progress")]
    BuildInProgress,

    #[error("config error: {0}")]
    Config(String),

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SelectError {
    /// Stable machine-readable code for robot-mode output.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MalformedRecord { .. } => "malformed_record",
            Self::DuplicateId { .. } => "duplicate_id",
            Self::EmptyCorpus(_) => "empty_corpus",
            Self::InvalidInput(_) => "invalid_input",
            Self::IndexNotReady => "index_not_ready",
            Self::BuildInProgress => "build_in_progress",
            Self::Config(_) => "config",
            Self::Io { .. } => "io",
        }
    }
}
