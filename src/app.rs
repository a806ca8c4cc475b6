use std::path::PathBuf;

use futures::StreamExt;
use iced::Task;

use crate::api::AppleMusicClient;
use crate::application::{RunEvent, RunExecutor, RunOutcome};
use crate::config::AppConfig;
use crate::domain::{resolve, validate_start, Credentials, DownloadRequest, RunPhase};
use crate::logging::{LogLevel, LogRecord};
use crate::ui::{DownloadMessage, DownloadView, PathField};
use crate::utils::optional_path;

pub struct DownloadApp {
    view: DownloadView,
    config: AppConfig,
}

impl Default for DownloadApp {
    fn default() -> Self {
        Self::new()
    }
}

impl DownloadApp {
    pub fn new() -> Self {
        let config = match AppConfig::load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{}, using default settings", e);
                AppConfig::default()
            }
        };

        Self {
            view: DownloadView::default(),
            config,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(DownloadMessage),
    /// (Field, chosen path or None if the dialog was cancelled)
    PathSelected(PathField, Option<PathBuf>),
    Run(RunEvent),
    PromptClosed,
}

pub fn update(app: &mut DownloadApp, message: Message) -> Task<Message> {
    match message {
        Message::UiMessage(ui_msg) => {
            app.view.update(ui_msg.clone());

            match ui_msg {
                DownloadMessage::BrowsePressed(field) => return browse(field),
                DownloadMessage::StartPressed if !app.view.is_downloading => {
                    return start_download(app);
                }
                _ => {}
            }
        }
        Message::PathSelected(field, path) => {
            if let Some(path) = path {
                *app.view.path_mut(field) = path.display().to_string();
            }
        }
        Message::Run(event) => match event {
            RunEvent::Log(record) => app.view.log_lines.push(record),
            RunEvent::Phase(phase) => app.view.status_message = phase.to_string(),
            RunEvent::Finished(outcome) => {
                app.view.is_downloading = false;
                app.view.status_message = match outcome {
                    RunOutcome::Completed(result) => format!(
                        "{}: {} item(s) attempted, {} error(s)",
                        RunPhase::Done,
                        result.attempted,
                        result.failed
                    ),
                    RunOutcome::Interrupted => "Run ended unexpectedly, see log".to_string(),
                };
            }
        },
        Message::PromptClosed => {}
    }
    Task::none()
}

fn start_download(app: &mut DownloadApp) -> Task<Message> {
    let (urls, cookies_path) = match validate_start(&app.view.urls.text(), &app.view.cookies_path)
    {
        Ok(inputs) => inputs,
        Err(e) => return prompt(e.to_string()),
    };

    app.view.log_lines.clear();
    let executor = RunExecutor::new();

    let options = match resolve(&app.view.raw_selections(), executor.log()) {
        Ok(options) => options,
        Err(e) => {
            tracing::error!("{}", e);
            app.view.log_lines.push(LogRecord::now(LogLevel::Error, e.to_string()));
            return Task::none();
        }
    };
    // mirror the raw-cover correction in the form
    app.view.save_cover = options.save_cover;

    let request = DownloadRequest {
        urls,
        credentials: Credentials {
            cookies_path,
            wvd_path: optional_path(&app.view.wvd_path),
        },
        output_path: PathBuf::from(app.view.output_path.trim()),
        temp_path: optional_path(&app.view.temp_path),
        options,
    };

    app.view.is_downloading = true;
    app.view.status_message = "Starting...".to_string();

    let service = AppleMusicClient::new(app.config.clone());
    Task::stream(executor.spawn(service, request).map(Message::Run))
}

fn browse(field: PathField) -> Task<Message> {
    Task::perform(
        async move {
            let dialog = rfd::AsyncFileDialog::new();
            let handle = match field {
                PathField::Cookies => dialog.add_filter("Cookies", &["txt"]).pick_file().await,
                PathField::Wvd => dialog.add_filter("Widevine device", &["wvd"]).pick_file().await,
                PathField::Output | PathField::Temp => dialog.pick_folder().await,
            };
            handle.map(|handle| handle.path().to_path_buf())
        },
        move |path| Message::PathSelected(field, path),
    )
}

/// Modal notice for inputs that keep a run from starting
fn prompt(message: String) -> Task<Message> {
    Task::perform(
        async move {
            rfd::AsyncMessageDialog::new()
                .set_level(rfd::MessageLevel::Warning)
                .set_title("Notice")
                .set_description(message)
                .set_buttons(rfd::MessageButtons::Ok)
                .show()
                .await
        },
        |_| Message::PromptClosed,
    )
}

pub fn view(app: &DownloadApp) -> iced::Element<'_, Message> {
    app.view.view().map(Message::UiMessage)
}
