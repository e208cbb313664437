//! Error types for the storage layer.

use gavel_protocol::ErrorKind;

/// Errors a repository can report.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A save would break a uniqueness rule, e.g. a second user with the
    /// same username.
    #[error("{collection} already has a record with key {key:?}")]
    Conflict {
        collection: &'static str,
        key: String,
    },

    /// The backing store could not serve the request.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Unavailable(_) => ErrorKind::Internal,
        }
    }
}
