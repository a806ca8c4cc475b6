mod client;
pub mod cookies;
mod error;
pub mod media_url;
mod models;

use async_trait::async_trait;

pub use client::AppleMusicClient;
pub use error::{ApiError, Result};
pub use media_url::MediaKind;
pub use models::ApiConfig;

use crate::domain::{Credentials, DownloadRequest};
use crate::logging::RunLog;

/// Signed-in Apple Music account
#[derive(Debug, Clone)]
pub struct Session {
    pub storefront: String,
    pub language: String,
    pub active_subscription: bool,
    pub(crate) developer_token: String,
    pub(crate) media_user_token: String,
}

/// One downloadable track or video.
///
/// Callers only read the title; the rest is handed back to
/// [`MusicService::download`] untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueItem {
    title: String,
    kind: MediaKind,
    url: String,
}

impl QueueItem {
    pub(crate) fn new(title: String, kind: MediaKind, url: String) -> Self {
        Self { title, kind, url }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub(crate) fn kind(&self) -> MediaKind {
        self.kind
    }

    pub(crate) fn url(&self) -> &str {
        &self.url
    }
}

/// The download backend the orchestrator drives
#[async_trait]
pub trait MusicService: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials, language: &str) -> Result<Session>;

    /// Expands a link into its downloadable items, in catalog order
    async fn download_queue(&self, session: &Session, url: &str) -> Result<Vec<QueueItem>>;

    async fn download(
        &self,
        item: &QueueItem,
        request: &DownloadRequest,
        log: &RunLog,
    ) -> Result<()>;

    /// Warns about missing external executables before the first download
    fn check_tools(&self, _log: &RunLog) {}
}
