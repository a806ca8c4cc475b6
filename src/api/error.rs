use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Invalid cookies file: {0}")]
    Cookies(String),

    #[error("media-user-token cookie not found, sign in to music.apple.com and export cookies again")]
    MissingMediaUserToken,

    #[error("Failed to extract developer token from web player")]
    TokenExtraction,

    #[error("Unsupported URL: {0}")]
    UnsupportedUrl(String),

    #[error("External tool failed: {0}")]
    ExternalTool(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ApiError>;
