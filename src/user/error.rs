//! Profile persistence errors

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProfileError {
    #[error("Profile {0} already exists")]
    AlreadyExists(Uuid),

    #[error("Profile store rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Profile store unreachable: {0}")]
    Network(String),

    #[error("Unexpected profile store response: {0}")]
    UnexpectedResponse(String),
}
