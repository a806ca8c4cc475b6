use std::ffi::{OsStr, OsString};
use std::process::Stdio;

use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, RequestBuilder, StatusCode};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use super::models::{AccountResponse, Resource, ResourceResponse, TrackPage};
use super::{cookies, media_url, ApiError, MediaKind, MusicService, QueueItem, Result, Session};
use crate::config::AppConfig;
use crate::domain::{Credentials, DownloadRequest};
use crate::logging::RunLog;

const ORIGIN: &str = "https://music.apple.com";
const REFERER: &str = "https://music.apple.com/";
const DEFAULT_STOREFRONT: &str = "us";

/// Talks to the Apple Music web API for sign-in and catalog lookups and
/// hands each item to the `gamdl` executable for the actual download.
#[derive(Clone)]
pub struct AppleMusicClient {
    config: AppConfig,
    http: Client,
}

impl AppleMusicClient {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    fn extract_index_script(&self, html: &str) -> Option<String> {
        // <script type="module" crossorigin src="/assets/index-legacy~f2a1.js">
        let re = Regex::new(r#"/(assets/index[^/"]*\.js)"#).ok()?;
        re.captures(html).map(|caps| caps[1].to_string())
    }

    fn extract_developer_token(&self, script: &str) -> Option<String> {
        let re = Regex::new(r#"eyJh[^"]+"#).ok()?;
        re.find(script).map(|m| m.as_str().to_string())
    }

    /// The web player embeds a public JWT in its main script
    async fn fetch_developer_token(&self) -> Result<String> {
        let base = self.config.api.web_base_url.trim_end_matches('/');

        let html = self
            .http
            .get(base)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| ApiError::ApiError(format!("Web player request failed: {}", e)))?
            .text()
            .await?;
        let script_path = self
            .extract_index_script(&html)
            .ok_or(ApiError::TokenExtraction)?;

        let script = self
            .http
            .get(format!("{}/{}", base, script_path))
            .send()
            .await?
            .error_for_status()
            .map_err(|e| ApiError::ApiError(format!("Web player script request failed: {}", e)))?
            .text()
            .await?;

        self.extract_developer_token(&script)
            .ok_or(ApiError::TokenExtraction)
    }

    fn amp_get(&self, developer_token: &str, media_user_token: &str, path: &str) -> RequestBuilder {
        let base = self.config.api.amp_base_url.trim_end_matches('/');
        self.http
            .get(format!("{}{}", base, path))
            .bearer_auth(developer_token)
            .header("Media-User-Token", media_user_token)
            .header("Origin", ORIGIN)
            .header("Referer", REFERER)
    }

    /// `None` when the catalog does not know the id
    async fn fetch_resource(
        &self,
        session: &Session,
        kind: MediaKind,
        id: &str,
    ) -> Result<Option<Resource>> {
        let path = format!(
            "/v1/catalog/{}/{}/{}",
            session.storefront,
            kind.catalog_type(),
            id
        );
        let mut request = self
            .amp_get(&session.developer_token, &session.media_user_token, &path)
            .query(&[("l", session.language.as_str())]);
        if matches!(kind, MediaKind::Album | MediaKind::Playlist) {
            request = request.query(&[(
                "limit[tracks]",
                self.config.api.tracks_page_limit.to_string(),
            )]);
        }

        let response = request.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response
            .error_for_status()
            .map_err(|e| ApiError::ApiError(format!("Catalog request failed: {}", e)))?;

        let body: ResourceResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("JSON decode error: {}", e)))?;

        Ok(body.data.into_iter().next())
    }

    /// Album and playlist tracks, following `next` pages
    async fn collect_tracks(&self, session: &Session, resource: Resource) -> Result<Vec<Resource>> {
        let Some(mut page) = resource.relationships.and_then(|r| r.tracks) else {
            return Ok(Vec::new());
        };
        let mut tracks = std::mem::take(&mut page.data);

        while let Some(next) = page.next.take() {
            let response = self
                .amp_get(&session.developer_token, &session.media_user_token, &next)
                .query(&[("l", session.language.as_str())])
                .send()
                .await?
                .error_for_status()
                .map_err(|e| ApiError::ApiError(format!("Track page request failed: {}", e)))?;

            page = response
                .json::<TrackPage>()
                .await
                .map_err(|e| ApiError::InvalidResponse(format!("JSON decode error: {}", e)))?;
            tracks.append(&mut page.data);
        }

        Ok(tracks)
    }

    /// Tracks without attributes are unavailable in the storefront
    fn queue_item(&self, session: &Session, resource: Resource) -> Option<QueueItem> {
        let kind = MediaKind::from_resource_type(&resource.kind)?;
        let attributes = resource.attributes?;
        let url = attributes.url.unwrap_or_else(|| {
            format!(
                "{}/{}/{}/{}",
                ORIGIN,
                session.storefront,
                kind.path_segment(),
                resource.id
            )
        });
        Some(QueueItem::new(attributes.name, kind, url))
    }
}

#[async_trait]
impl MusicService for AppleMusicClient {
    async fn authenticate(&self, credentials: &Credentials, language: &str) -> Result<Session> {
        let jar = cookies::load(&credentials.cookies_path).await?;
        let media_user_token = cookies::media_user_token(&jar)
            .ok_or(ApiError::MissingMediaUserToken)?
            .to_string();
        let developer_token = self.fetch_developer_token().await?;

        let response = self
            .amp_get(&developer_token, &media_user_token, "/v1/me/account")
            .query(&[("meta", "subscription")])
            .send()
            .await?
            .error_for_status()
            .map_err(|e| ApiError::ApiError(format!("Account request failed: {}", e)))?;

        let account: AccountResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("JSON decode error: {}", e)))?;
        let subscription = account.meta.subscription;

        Ok(Session {
            storefront: subscription
                .storefront
                .unwrap_or_else(|| DEFAULT_STOREFRONT.to_string()),
            language: language.to_string(),
            active_subscription: subscription.active,
            developer_token,
            media_user_token,
        })
    }

    async fn download_queue(&self, session: &Session, url: &str) -> Result<Vec<QueueItem>> {
        let info = media_url::parse(url)?;
        let (kind, id) = match (info.kind, info.sub_id.as_deref()) {
            (MediaKind::Album, Some(track_id)) => (MediaKind::Song, track_id),
            (kind, _) => (kind, info.id.as_str()),
        };

        let Some(resource) = self.fetch_resource(session, kind, id).await? else {
            return Ok(Vec::new());
        };
        let resources = match kind {
            MediaKind::Album | MediaKind::Playlist => self.collect_tracks(session, resource).await?,
            _ => vec![resource],
        };

        Ok(resources
            .into_iter()
            .filter_map(|resource| self.queue_item(session, resource))
            .collect())
    }

    async fn download(
        &self,
        item: &QueueItem,
        request: &DownloadRequest,
        log: &RunLog,
    ) -> Result<()> {
        let program = &self.config.tools.gamdl;
        let mut child = Command::new(program)
            .args(downloader_args(&self.config, request, item))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ApiError::ExternalTool(format!("Failed to execute {}: {}", program, e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ApiError::ExternalTool(format!("{}: stdout not captured", program)))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ApiError::ExternalTool(format!("{}: stderr not captured", program)))?;
        // raw segments: the tool's console encoding is not guaranteed to be UTF-8
        let mut stdout = BufReader::new(stdout).split(b'\n');
        let mut stderr = BufReader::new(stderr).split(b'\n');
        let (mut stdout_open, mut stderr_open) = (true, true);

        while stdout_open || stderr_open {
            tokio::select! {
                segment = stdout.next_segment(), if stdout_open => {
                    stdout_open = forward_segment(log, program, segment);
                }
                segment = stderr.next_segment(), if stderr_open => {
                    stderr_open = forward_segment(log, program, segment);
                }
            }
        }

        let status = child.wait().await?;
        if status.success() {
            Ok(())
        } else {
            Err(ApiError::ExternalTool(format!("{} exited with {}", program, status)))
        }
    }

    fn check_tools(&self, log: &RunLog) {
        for (name, path) in self.config.required_tools() {
            if which::which(path).is_err() {
                log.warn(format!(
                    "{} not found ({}), downloads that need it will fail",
                    name, path
                ));
            }
        }
    }
}

/// Logs one output line and reports whether the stream is still open.
fn forward_segment(
    log: &RunLog,
    program: &str,
    segment: std::io::Result<Option<Vec<u8>>>,
) -> bool {
    match segment {
        Ok(Some(bytes)) => {
            let line = String::from_utf8_lossy(&bytes);
            let line = line.trim();
            if !line.is_empty() {
                log.info(line);
            }
            true
        }
        Ok(None) => false,
        Err(e) => {
            tracing::warn!("stopped reading output of {}: {}", program, e);
            false
        }
    }
}

fn push_flag(args: &mut Vec<OsString>, flag: &str, value: impl AsRef<OsStr>) {
    args.push(flag.into());
    args.push(value.as_ref().to_os_string());
}

/// Command line for one item; the item URL goes last
fn downloader_args(
    config: &AppConfig,
    request: &DownloadRequest,
    item: &QueueItem,
) -> Vec<OsString> {
    let options = &request.options;
    let tools = &config.tools;
    let mut args: Vec<OsString> = vec!["--no-config-file".into()];

    push_flag(&mut args, "--cookies-path", &request.credentials.cookies_path);
    push_flag(&mut args, "--language", &options.language);
    push_flag(&mut args, "--output-path", &request.output_path);
    push_flag(&mut args, "--temp-path", request.temp_path_or_default());
    if let Some(wvd_path) = &request.credentials.wvd_path {
        push_flag(&mut args, "--wvd-path", wvd_path);
    }

    push_flag(&mut args, "--download-mode", config.download_mode.as_str());
    push_flag(&mut args, "--remux-mode", config.remux_mode.as_str());
    push_flag(&mut args, "--nm3u8dlre-path", &tools.nm3u8dlre);
    push_flag(&mut args, "--mp4decrypt-path", &tools.mp4decrypt);
    push_flag(&mut args, "--ffmpeg-path", &tools.ffmpeg);
    push_flag(&mut args, "--mp4box-path", &tools.mp4box);

    push_flag(&mut args, "--cover-format", options.cover_format.as_str());
    push_flag(&mut args, "--cover-size", config.cover_size.to_string());
    push_flag(&mut args, "--truncate", config.truncate.to_string());

    match item.kind() {
        MediaKind::MusicVideo => {
            push_flag(&mut args, "--codec-music-video", &config.music_video_codec);
        }
        MediaKind::Post => {
            push_flag(&mut args, "--quality-post", &config.uploaded_video_quality);
        }
        MediaKind::Song | MediaKind::Album | MediaKind::Playlist => {
            push_flag(&mut args, "--codec-song", options.song_codec.as_str());
            push_flag(
                &mut args,
                "--synced-lyrics-format",
                options.synced_lyrics_format.as_str(),
            );
            if options.no_synced_lyrics {
                args.push("--no-synced-lyrics".into());
            }
        }
    }

    for (enabled, flag) in [
        (options.save_cover, "--save-cover"),
        (options.save_playlist, "--save-playlist"),
        (options.overwrite, "--overwrite"),
    ] {
        if enabled {
            args.push(flag.into());
        }
    }

    args.push(item.url().into());
    args
}
