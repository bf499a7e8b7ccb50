//! Client-side session handling for consumers of the HTTP API.
//!
//! [`Session`] is the single holder of the current token and user profile.
//! It is created once at start-up, restored from its [`SessionStore`], and
//! shared by reference with everything that needs to observe it. [`ApiClient`]
//! attaches the session's bearer token to every request it sends.

pub mod api;
pub mod session;

pub use api::ApiClient;
pub use session::{Session, SessionStore, StoredSession};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response; `message` is the server's own `message` field.
    #[error("{message} (status {status})")]
    Api { status: u16, message: String },

    #[error("Session storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
