// Error taxonomy for event data loading and parsing.

use thiserror::Error;

/// A raw scouting record that could not be turned into a `RobotMatchEntry`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed record {index}: field `{field}` {reason}")]
pub struct MalformedRecordError {
    /// Position of the record in the event data array.
    pub index: usize,
    pub field: String,
    pub reason: String,
}

impl MalformedRecordError {
    pub fn new(index: usize, field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            index,
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ScoutError {
    #[error(transparent)]
    Malformed(#[from] MalformedRecordError),

    #[error("duplicate entry for team {team_number} in match {match_number} (record {index})")]
    DuplicateEntry {
        index: usize,
        match_number: u32,
        team_number: u32,
    },

    #[error("invalid event slug `{0}`")]
    InvalidSlug(String),

    #[error("match results key `{key}` does not match its match `{match_key}`")]
    MatchKeyMismatch { key: String, match_key: String },

    #[error("invalid platform code `{0}`")]
    InvalidPlatformCode(String),

    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} fetching {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScoutError {
    /// Whether the failure came from the data source rather than the data itself.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            ScoutError::Http(_) | ScoutError::HttpStatus { .. } | ScoutError::Io(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ScoutError>;
