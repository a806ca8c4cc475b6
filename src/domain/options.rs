use super::AppError;
use crate::logging::RunLog;

pub const LANGUAGE_OPTIONS: &[&str] = &["zh-CN", "en-US", "ja-JP", "ko-KR"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SongCodec {
    AacLegacy,
    AacHeLegacy,
    Aac,
    AacHe,
    AacBinaural,
    AacDownmix,
    AacHeBinaural,
    AacHeDownmix,
    Atmos,
    Ac3,
    Alac,
}

impl SongCodec {
    /// Display order of the codec picker; the first entry is the default.
    pub const ALL: [SongCodec; 11] = [
        SongCodec::AacLegacy,
        SongCodec::AacHeLegacy,
        SongCodec::Aac,
        SongCodec::AacHe,
        SongCodec::AacBinaural,
        SongCodec::AacDownmix,
        SongCodec::AacHeBinaural,
        SongCodec::AacHeDownmix,
        SongCodec::Atmos,
        SongCodec::Ac3,
        SongCodec::Alac,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SongCodec::AacLegacy => "aac-legacy",
            SongCodec::AacHeLegacy => "aac-he-legacy",
            SongCodec::Aac => "aac",
            SongCodec::AacHe => "aac-he",
            SongCodec::AacBinaural => "aac-binaural",
            SongCodec::AacDownmix => "aac-downmix",
            SongCodec::AacHeBinaural => "aac-he-binaural",
            SongCodec::AacHeDownmix => "aac-he-downmix",
            SongCodec::Atmos => "atmos",
            SongCodec::Ac3 => "ac3",
            SongCodec::Alac => "alac",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SongCodec::AacLegacy => "aac-legacy - AAC 256kbps 44.1kHz (稳定)",
            SongCodec::AacHeLegacy => "aac-he-legacy - AAC-HE 64kbps 44.1kHz (稳定)",
            SongCodec::Aac => "aac - AAC 256kbps up to 48kHz (实验性)",
            SongCodec::AacHe => "aac-he - AAC-HE 64kbps up to 48kHz (实验性)",
            SongCodec::AacBinaural => "aac-binaural - AAC 256kbps binaural (实验性)",
            SongCodec::AacDownmix => "aac-downmix - AAC 256kbps downmix (实验性)",
            SongCodec::AacHeBinaural => "aac-he-binaural - AAC-HE 64kbps binaural (实验性)",
            SongCodec::AacHeDownmix => "aac-he-downmix - AAC-HE 64kbps downmix (实验性)",
            SongCodec::Atmos => "atmos - Dolby Atmos 768kbps (实验性)",
            SongCodec::Ac3 => "ac3 - AC3 640kbps (实验性)",
            SongCodec::Alac => "alac - ALAC up to 24-bit/192kHz (不支持)",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|codec| codec.label() == label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncedLyricsFormat {
    Lrc,
    Srt,
    Ttml,
}

impl SyncedLyricsFormat {
    pub const ALL: [SyncedLyricsFormat; 3] = [
        SyncedLyricsFormat::Lrc,
        SyncedLyricsFormat::Srt,
        SyncedLyricsFormat::Ttml,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SyncedLyricsFormat::Lrc => "lrc",
            SyncedLyricsFormat::Srt => "srt",
            SyncedLyricsFormat::Ttml => "ttml",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|format| format.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoverFormat {
    Jpg,
    Png,
    /// Original artwork bytes; only written as a separate cover file
    Raw,
}

impl CoverFormat {
    pub const ALL: [CoverFormat; 3] = [CoverFormat::Jpg, CoverFormat::Png, CoverFormat::Raw];

    pub fn as_str(self) -> &'static str {
        match self {
            CoverFormat::Jpg => "jpg",
            CoverFormat::Png => "png",
            CoverFormat::Raw => "raw",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CoverFormat::Jpg => "jpg",
            CoverFormat::Png => "png",
            CoverFormat::Raw => "raw (需启用保存封面)",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|format| format.label() == label)
    }
}

/// Form selections as the user sees them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSelections {
    pub song_codec: String,
    pub synced_lyrics_format: String,
    pub language: String,
    pub cover_format: String,
    pub save_cover: bool,
    pub save_playlist: bool,
    pub overwrite: bool,
    pub no_synced_lyrics: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOptions {
    pub song_codec: SongCodec,
    pub synced_lyrics_format: SyncedLyricsFormat,
    pub language: String,
    pub cover_format: CoverFormat,
    pub save_cover: bool,
    pub save_playlist: bool,
    pub overwrite: bool,
    pub no_synced_lyrics: bool,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            song_codec: SongCodec::AacLegacy,
            synced_lyrics_format: SyncedLyricsFormat::Lrc,
            language: "zh-CN".to_string(),
            cover_format: CoverFormat::Jpg,
            save_cover: true,
            save_playlist: false,
            overwrite: false,
            no_synced_lyrics: false,
        }
    }
}

/// Maps form labels onto downloader selectors.
///
/// A raw cover cannot be embedded, so choosing it without "save cover" turns
/// saving on and logs one warning. The language tag is passed through as is.
pub fn resolve(raw: &RawSelections, log: &RunLog) -> Result<DownloadOptions, AppError> {
    let song_codec = SongCodec::from_label(&raw.song_codec).ok_or_else(|| {
        AppError::Configuration(format!("unknown song codec option: {}", raw.song_codec))
    })?;
    let cover_format = CoverFormat::from_label(&raw.cover_format).ok_or_else(|| {
        AppError::Configuration(format!("unknown cover format option: {}", raw.cover_format))
    })?;
    let synced_lyrics_format = SyncedLyricsFormat::from_value(&raw.synced_lyrics_format)
        .ok_or_else(|| {
            AppError::Configuration(format!(
                "unknown synced lyrics format: {}",
                raw.synced_lyrics_format
            ))
        })?;

    let mut save_cover = raw.save_cover;
    if cover_format == CoverFormat::Raw && !save_cover {
        log.warn("RAW cover format selected without saving covers, cover saving has been enabled");
        save_cover = true;
    }

    Ok(DownloadOptions {
        song_codec,
        synced_lyrics_format,
        language: raw.language.clone(),
        cover_format,
        save_cover,
        save_playlist: raw.save_playlist,
        overwrite: raw.overwrite,
        no_synced_lyrics: raw.no_synced_lyrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{LogLevel, MemorySink};
    use std::collections::HashSet;

    fn selections(codec: &str, cover: &str, save_cover: bool) -> RawSelections {
        RawSelections {
            song_codec: codec.to_string(),
            synced_lyrics_format: "lrc".to_string(),
            language: "zh-CN".to_string(),
            cover_format: cover.to_string(),
            save_cover,
            save_playlist: false,
            overwrite: false,
            no_synced_lyrics: false,
        }
    }

    #[test]
    fn test_jpg_cover_leaves_save_cover_alone() {
        let (sink, log) = MemorySink::run_log();
        let raw = selections("aac-legacy - AAC 256kbps 44.1kHz (稳定)", "jpg", false);

        let options = resolve(&raw, &log).unwrap();
        assert_eq!(options.song_codec, SongCodec::AacLegacy);
        assert_eq!(options.song_codec.as_str(), "aac-legacy");
        assert_eq!(options.cover_format, CoverFormat::Jpg);
        assert!(!options.save_cover);
        assert!(sink.records().is_empty());
    }

    #[test]
    fn test_raw_cover_forces_save_cover() {
        let (sink, log) = MemorySink::run_log();
        let raw = selections(SongCodec::Atmos.label(), "raw (需启用保存封面)", false);

        let options = resolve(&raw, &log).unwrap();
        assert_eq!(options.cover_format, CoverFormat::Raw);
        assert!(options.save_cover);
        assert_eq!(sink.messages_at(LogLevel::Warning).len(), 1);
        assert_eq!(sink.records().len(), 1);
    }

    #[test]
    fn test_raw_cover_with_save_cover_is_silent() {
        let (sink, log) = MemorySink::run_log();
        let raw = selections(SongCodec::Aac.label(), CoverFormat::Raw.label(), true);

        let options = resolve(&raw, &log).unwrap();
        assert!(options.save_cover);
        assert!(sink.records().is_empty());
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let (_sink, log) = MemorySink::run_log();
        let mut raw = selections(SongCodec::AacHeDownmix.label(), "png", true);
        raw.language = "ja-JP".to_string();
        raw.overwrite = true;

        let first = resolve(&raw, &log).unwrap();
        let second = resolve(&raw, &log).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.language, "ja-JP");
        assert!(first.overwrite);
    }

    #[test]
    fn test_unknown_labels_are_configuration_errors() {
        let (_sink, log) = MemorySink::run_log();

        let err = resolve(&selections("flac", "jpg", true), &log).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));

        let err = resolve(&selections(SongCodec::Aac.label(), "webp", true), &log).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));

        let mut raw = selections(SongCodec::Aac.label(), "jpg", true);
        raw.synced_lyrics_format = "vtt".to_string();
        assert!(matches!(
            resolve(&raw, &log).unwrap_err(),
            AppError::Configuration(_)
        ));
    }

    #[test]
    fn test_labels_are_unique_and_round_trip() {
        let labels: HashSet<&str> = SongCodec::ALL.iter().map(|c| c.label()).collect();
        assert_eq!(labels.len(), SongCodec::ALL.len());
        for codec in SongCodec::ALL {
            assert_eq!(SongCodec::from_label(codec.label()), Some(codec));
            assert!(codec.label().starts_with(codec.as_str()));
        }
        for format in CoverFormat::ALL {
            assert_eq!(CoverFormat::from_label(format.label()), Some(format));
        }
    }
}
