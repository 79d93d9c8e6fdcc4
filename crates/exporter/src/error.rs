//! Exporter Error Types

use thiserror::Error;
use tonic::codegen::http::uri::InvalidUri;

/// Exporter Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Exporter Error
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(#[from] InvalidUri),

    #[error("Transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    // Boxed: tonic::Status is too large to carry inline in every Result
    #[error("Export failed with status {}: {}", .0.code(), .0.message())]
    Status(Box<tonic::Status>),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Exporter is shut down")]
    Shutdown,
}

impl From<tonic::Status> for Error {
    fn from(status: tonic::Status) -> Self {
        Error::Status(Box::new(status))
    }
}

impl Error {
    /// gRPC status code of a failed export, if the collector answered at all
    pub fn status_code(&self) -> Option<tonic::Code> {
        match self {
            Error::Status(status) => Some(status.code()),
            _ => None,
        }
    }
}
