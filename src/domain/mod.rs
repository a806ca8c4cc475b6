pub mod error;
pub mod model;
pub mod options;

pub use error::AppError;
pub use model::{validate_start, Credentials, DownloadRequest, RunPhase, RunResult};
pub use options::{
    resolve, CoverFormat, DownloadOptions, RawSelections, SongCodec, SyncedLyricsFormat,
};
