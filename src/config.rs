use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::ApiConfig;

/// Environment variable pointing at an alternative settings file
pub const CONFIG_ENV: &str = "GAMDL_GUI_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "gamdl-gui.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadMode {
    Ytdlp,
    Nm3u8dlre,
}

impl DownloadMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DownloadMode::Ytdlp => "ytdlp",
            DownloadMode::Nm3u8dlre => "nm3u8dlre",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemuxMode {
    Ffmpeg,
    Mp4box,
}

impl RemuxMode {
    pub fn as_str(self) -> &'static str {
        match self {
            RemuxMode::Ffmpeg => "ffmpeg",
            RemuxMode::Mp4box => "mp4box",
        }
    }
}

/// Executables used for a download; bare names are looked up on `PATH`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    pub gamdl: String,
    pub nm3u8dlre: String,
    pub mp4decrypt: String,
    pub ffmpeg: String,
    pub mp4box: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            gamdl: "gamdl".to_string(),
            nm3u8dlre: "N_m3u8DL-RE".to_string(),
            mp4decrypt: "mp4decrypt".to_string(),
            ffmpeg: "ffmpeg".to_string(),
            mp4box: "MP4Box".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub tools: ToolPaths,
    pub download_mode: DownloadMode,
    pub remux_mode: RemuxMode,
    pub cover_size: u32,
    pub truncate: u32,
    pub music_video_codec: String,
    pub uploaded_video_quality: String,
    pub api: ApiConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tools: ToolPaths::default(),
            download_mode: DownloadMode::Ytdlp,
            remux_mode: RemuxMode::Ffmpeg,
            cover_size: 1200,
            truncate: 50,
            music_video_codec: "h264".to_string(),
            uploaded_video_quality: "best".to_string(),
            api: ApiConfig::default(),
        }
    }
}

impl AppConfig {
    /// Reads `$GAMDL_GUI_CONFIG`, else `./gamdl-gui.json`, else defaults.
    pub fn load() -> Result<Self, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::load_from(Path::new(&path));
        }

        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            Self::load_from(local)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Tools the current modes depend on, as (display name, configured path)
    pub fn required_tools(&self) -> Vec<(&'static str, &str)> {
        let mut tools = vec![
            ("gamdl", self.tools.gamdl.as_str()),
            ("mp4decrypt", self.tools.mp4decrypt.as_str()),
        ];
        if self.download_mode == DownloadMode::Nm3u8dlre {
            tools.push(("N_m3u8DL-RE", self.tools.nm3u8dlre.as_str()));
        }
        match self.remux_mode {
            RemuxMode::Ffmpeg => tools.push(("ffmpeg", self.tools.ffmpeg.as_str())),
            RemuxMode::Mp4box => tools.push(("MP4Box", self.tools.mp4box.as_str())),
        }
        tools
    }
}
