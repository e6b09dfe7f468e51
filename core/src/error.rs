//! Error types for the profile API client.
//!
//! # Design
//! `ApiError` covers everything that can go wrong once a request is built:
//! a non-2xx status, a transport failure, or a body that does not
//! (de)serialize. Callers of the sync flow treat all of them the same way
//! and only surface a fixed message, so the status is the only detail kept
//! from a failed response.
//!
//! `ValidationError` is raised before anything reaches the network.

use thiserror::Error;

/// Errors returned by the HTTP client layer.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a status outside 200-299.
    #[error("HTTP error! status: {status}")]
    RequestFailed { status: u16 },

    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// HTTP status of a failed response, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::RequestFailed { status } => Some(*status),
            _ => None,
        }
    }
}

/// Client-side checks that reject input without issuing a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("File size must be less than 5MB ({size} bytes)")]
    FileTooLarge { size: u64 },

    #[error("Only image files are allowed (got {content_type})")]
    NotAnImage { content_type: String },

    #[error("no file was selected")]
    NoFile,

    #[error("only one file can be uploaded at a time ({count} given)")]
    MultipleFiles { count: usize },

    #[error("an upload is already in progress")]
    UploadInProgress,

    #[error("{0} is required")]
    MissingField(&'static str),
}

/// Errors returned by the upload adapter.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The file was refused locally; nothing was sent.
    #[error(transparent)]
    Rejected(#[from] ValidationError),

    #[error("Failed to upload file")]
    UploadFailed(#[source] ApiError),
}
