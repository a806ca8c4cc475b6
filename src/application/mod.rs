pub mod download_coordinator;
pub mod executor;

pub use download_coordinator::DownloadCoordinator;
pub use executor::{RunEvent, RunExecutor, RunOutcome};
