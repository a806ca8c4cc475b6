use iced::{
    widget::{
        button, column, pick_list, row, scrollable, text, text_editor, text_input, toggler,
        Column, Space,
    },
    Element, Font, Length,
};

use crate::domain::{CoverFormat, RawSelections, RunPhase, SongCodec, SyncedLyricsFormat};
use crate::domain::options::LANGUAGE_OPTIONS;
use crate::logging::LogRecord;
use crate::utils::default_output_path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathField {
    Cookies,
    Wvd,
    Output,
    Temp,
}

/// Main view state
pub struct DownloadView {
    pub urls: text_editor::Content,
    pub cookies_path: String,
    pub wvd_path: String,
    pub output_path: String,
    pub temp_path: String,
    pub song_codec: &'static str,
    pub synced_lyrics_format: &'static str,
    pub language: &'static str,
    pub cover_format: &'static str,
    pub save_cover: bool,
    pub save_playlist: bool,
    pub overwrite: bool,
    pub no_synced_lyrics: bool,
    pub status_message: String,
    pub is_downloading: bool,
    pub log_lines: Vec<LogRecord>,
}

impl Default for DownloadView {
    fn default() -> Self {
        Self {
            urls: text_editor::Content::new(),
            cookies_path: String::new(),
            wvd_path: String::new(),
            output_path: default_output_path().display().to_string(),
            temp_path: String::new(),
            song_codec: SongCodec::ALL[0].label(),
            synced_lyrics_format: SyncedLyricsFormat::Lrc.as_str(),
            language: LANGUAGE_OPTIONS[0],
            cover_format: CoverFormat::Jpg.label(),
            save_cover: true,
            save_playlist: false,
            overwrite: false,
            no_synced_lyrics: false,
            status_message: RunPhase::Idle.to_string(),
            is_downloading: false,
            log_lines: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum DownloadMessage {
    UrlsEdited(text_editor::Action),
    PathChanged(PathField, String),
    BrowsePressed(PathField),
    CodecSelected(&'static str),
    LyricsFormatSelected(&'static str),
    LanguageSelected(&'static str),
    CoverFormatSelected(&'static str),
    SaveCoverToggled(bool),
    SavePlaylistToggled(bool),
    OverwriteToggled(bool),
    NoSyncedLyricsToggled(bool),
    StartPressed,
}

impl DownloadView {
    pub fn update(&mut self, message: DownloadMessage) {
        match message {
            DownloadMessage::UrlsEdited(action) => self.urls.perform(action),
            DownloadMessage::PathChanged(field, value) => *self.path_mut(field) = value,
            DownloadMessage::CodecSelected(label) => self.song_codec = label,
            DownloadMessage::LyricsFormatSelected(value) => self.synced_lyrics_format = value,
            DownloadMessage::LanguageSelected(value) => self.language = value,
            DownloadMessage::CoverFormatSelected(label) => self.cover_format = label,
            DownloadMessage::SaveCoverToggled(on) => self.save_cover = on,
            DownloadMessage::SavePlaylistToggled(on) => self.save_playlist = on,
            DownloadMessage::OverwriteToggled(on) => self.overwrite = on,
            DownloadMessage::NoSyncedLyricsToggled(on) => self.no_synced_lyrics = on,
            DownloadMessage::BrowsePressed(_) | DownloadMessage::StartPressed => {
                // Will be handled by the app
            }
        }
    }

    pub fn path_mut(&mut self, field: PathField) -> &mut String {
        match field {
            PathField::Cookies => &mut self.cookies_path,
            PathField::Wvd => &mut self.wvd_path,
            PathField::Output => &mut self.output_path,
            PathField::Temp => &mut self.temp_path,
        }
    }

    fn path(&self, field: PathField) -> &str {
        match field {
            PathField::Cookies => &self.cookies_path,
            PathField::Wvd => &self.wvd_path,
            PathField::Output => &self.output_path,
            PathField::Temp => &self.temp_path,
        }
    }

    pub fn raw_selections(&self) -> RawSelections {
        RawSelections {
            song_codec: self.song_codec.to_string(),
            synced_lyrics_format: self.synced_lyrics_format.to_string(),
            language: self.language.to_string(),
            cover_format: self.cover_format.to_string(),
            save_cover: self.save_cover,
            save_playlist: self.save_playlist,
            overwrite: self.overwrite,
            no_synced_lyrics: self.no_synced_lyrics,
        }
    }

    fn path_row(&self, label: &'static str, field: PathField) -> Element<'_, DownloadMessage> {
        row![
            text(label).size(14).width(Length::Fixed(190.0)),
            text_input("", self.path(field))
                .on_input(move |value| DownloadMessage::PathChanged(field, value))
                .padding(6)
                .width(Length::Fill),
            button("Browse...")
                .on_press(DownloadMessage::BrowsePressed(field))
                .padding([6, 12]),
        ]
        .spacing(8)
        .into()
    }

    pub fn view(&self) -> Element<'_, DownloadMessage> {
        let codec_labels: Vec<&'static str> = SongCodec::ALL.iter().map(|c| c.label()).collect();
        let lyrics_formats: Vec<&'static str> =
            SyncedLyricsFormat::ALL.iter().map(|f| f.as_str()).collect();
        let cover_labels: Vec<&'static str> = CoverFormat::ALL.iter().map(|f| f.label()).collect();

        let options = column![
            row![
                text("Song codec:").size(14),
                pick_list(codec_labels, Some(self.song_codec), DownloadMessage::CodecSelected),
                text("Lyrics format:").size(14),
                pick_list(
                    lyrics_formats,
                    Some(self.synced_lyrics_format),
                    DownloadMessage::LyricsFormatSelected
                ),
            ]
            .spacing(8),
            row![
                text("Metadata language:").size(14),
                pick_list(LANGUAGE_OPTIONS, Some(self.language), DownloadMessage::LanguageSelected),
                text("Cover format:").size(14),
                pick_list(
                    cover_labels,
                    Some(self.cover_format),
                    DownloadMessage::CoverFormatSelected
                ),
            ]
            .spacing(8),
            row![
                toggler(self.save_cover)
                    .label("Save cover")
                    .on_toggle(DownloadMessage::SaveCoverToggled),
                toggler(self.save_playlist)
                    .label("Save playlist")
                    .on_toggle(DownloadMessage::SavePlaylistToggled),
                toggler(self.overwrite)
                    .label("Overwrite existing files")
                    .on_toggle(DownloadMessage::OverwriteToggled),
                toggler(self.no_synced_lyrics)
                    .label("Skip synced lyrics")
                    .on_toggle(DownloadMessage::NoSyncedLyricsToggled),
            ]
            .spacing(16),
        ]
        .spacing(10);

        let log_view = Column::with_children(self.log_lines.iter().map(|record| {
            text(record.to_string())
                .size(13)
                .font(Font::MONOSPACE)
                .into()
        }))
        .spacing(2);

        column![
            text("Gamdl GUI").size(32),
            text("Download links (one per line):").size(16),
            text_editor(&self.urls)
                .placeholder("https://music.apple.com/...")
                .on_action(DownloadMessage::UrlsEdited)
                .height(Length::Fixed(90.0)),
            self.path_row("Cookies file (.txt):", PathField::Cookies),
            self.path_row("WVD file (.wvd) [optional]:", PathField::Wvd),
            self.path_row("Save directory:", PathField::Output),
            self.path_row("Temp directory [optional]:", PathField::Temp),
            Space::new().height(Length::Fixed(10.0)),
            options,
            row![
                text(&self.status_message).size(14).width(Length::Fill),
                button("Start download")
                    .on_press_maybe((!self.is_downloading).then_some(DownloadMessage::StartPressed))
                    .padding([10, 20]),
            ]
            .spacing(10),
            text("Run log").size(16),
            scrollable(log_view).height(Length::Fill).width(Length::Fill),
        ]
        .padding(20)
        .spacing(10)
        .into()
    }
}
