use std::fmt;
use std::path::{Path, PathBuf};

use super::{AppError, DownloadOptions};
use crate::utils::parse_url_lines;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Netscape cookie jar exported from a signed-in browser session
    pub cookies_path: PathBuf,
    pub wvd_path: Option<PathBuf>,
}

/// Everything one run needs, captured from the form when Start is pressed.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub urls: Vec<String>,
    pub credentials: Credentials,
    pub output_path: PathBuf,
    pub temp_path: Option<PathBuf>,
    pub options: DownloadOptions,
}

impl DownloadRequest {
    /// Temporary files go to the working directory unless a path was given.
    pub fn temp_path_or_default(&self) -> &Path {
        self.temp_path.as_deref().unwrap_or_else(|| Path::new("."))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunResult {
    pub attempted: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Authenticating,
    Processing { url_index: usize, url_count: usize },
    Done,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunPhase::Idle => write!(f, "Enter links and press Start"),
            RunPhase::Authenticating => write!(f, "Signing in to Apple Music..."),
            RunPhase::Processing {
                url_index,
                url_count,
            } => write!(f, "Processing link {}/{}", url_index, url_count),
            RunPhase::Done => write!(f, "Finished"),
        }
    }
}

/// Checks the inputs a run cannot start without.
///
/// Returns the non-blank URLs in input order and the cookies path.
pub fn validate_start(
    urls_text: &str,
    cookies_path: &str,
) -> Result<(Vec<String>, PathBuf), AppError> {
    let urls = parse_url_lines(urls_text);
    if urls.is_empty() {
        return Err(AppError::InvalidInput(
            "Please enter at least one download link".to_string(),
        ));
    }

    let cookies_path = PathBuf::from(cookies_path.trim());
    if cookies_path.as_os_str().is_empty() || !cookies_path.is_file() {
        return Err(AppError::MissingCredentials(cookies_path));
    }

    Ok((urls, cookies_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_validate_rejects_empty_urls() {
        let err = validate_start("  \n\n ", "/does/not/matter").unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_validate_rejects_missing_cookies_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("cookies.txt");
        let err = validate_start(
            "https://music.apple.com/us/album/x/1",
            missing.to_str().unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::MissingCredentials(p) if p == missing));

        let err = validate_start("https://music.apple.com/us/album/x/1", "").unwrap_err();
        assert!(matches!(err, AppError::MissingCredentials(_)));
    }

    #[test]
    fn test_validate_keeps_order_and_duplicates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# Netscape HTTP Cookie File").unwrap();

        let (urls, path) = validate_start(
            " https://b\n\nhttps://a\nhttps://b \n",
            file.path().to_str().unwrap(),
        )
        .unwrap();
        assert_eq!(urls, vec!["https://b", "https://a", "https://b"]);
        assert_eq!(path, file.path());
    }

    #[test]
    fn test_temp_path_defaults_to_working_directory() {
        let mut request = DownloadRequest {
            urls: vec![],
            credentials: Credentials {
                cookies_path: PathBuf::from("cookies.txt"),
                wvd_path: None,
            },
            output_path: PathBuf::from("out"),
            temp_path: None,
            options: DownloadOptions::default(),
        };
        assert_eq!(request.temp_path_or_default(), Path::new("."));

        request.temp_path = Some(PathBuf::from("/tmp/gamdl"));
        assert_eq!(request.temp_path_or_default(), Path::new("/tmp/gamdl"));
    }
}
