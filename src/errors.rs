use crate::models::EntityKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Fetch-by-id answered with a non-success status.
    #[error("Failed to fetch {kind} #{id} (status {status})")]
    NotFound {
        kind: EntityKind,
        id: i64,
        status: u16,
    },
    /// Local validation failure, or the server's error text for a rejected
    /// create/update, kept verbatim.
    #[error("{0}")]
    Validation(String),
    /// Delete answered with anything other than 204.
    #[error("Failed to delete (status {status})")]
    Delete { status: u16 },
    #[error("a request for this form is already in flight")]
    Busy,
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// HTTP status observed by the server round trip, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { status, .. } | Self::Delete { status } => Some(*status),
            Self::Transport(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }
}
