use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Please select a valid cookies file: {}", .0.display())]
    MissingCredentials(PathBuf),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("No active Apple Music subscription detected, cannot download")]
    NoActiveSubscription,

    #[error("Error while processing URL {url}: {message}")]
    Resolution { url: String, message: String },

    #[error("Download failed {title}: {message}")]
    ItemDownload { title: String, message: String },

    #[error("Unhandled fault during download run: {0}")]
    Unclassified(String),
}
