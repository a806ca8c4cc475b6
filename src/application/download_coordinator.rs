use crate::{
    api::{ApiError, MusicService, QueueItem},
    domain::{AppError, DownloadRequest, RunPhase, RunResult},
    logging::RunLog,
};

/// Drives one run: sign in, then every link and every item strictly in order.
pub struct DownloadCoordinator<S> {
    service: S,
    log: RunLog,
}

impl<S: MusicService> DownloadCoordinator<S> {
    pub fn new(service: S, log: RunLog) -> Self {
        Self { service, log }
    }

    /// Runs the request and always finishes with the summary line.
    ///
    /// Fatal errors are logged here once; the tally of a run that never got
    /// past sign-in is zero.
    pub async fn execute(&self, request: &DownloadRequest) -> RunResult {
        let result = match self.run(request).await {
            Ok(result) => result,
            // already reported at critical level
            Err(AppError::NoActiveSubscription) => RunResult::default(),
            Err(e) => {
                self.log.error(e.to_string());
                RunResult::default()
            }
        };

        self.log.info(format!("All tasks finished, errors: {}", result.failed));
        self.log.phase(RunPhase::Done);
        result
    }

    pub async fn run(&self, request: &DownloadRequest) -> Result<RunResult, AppError> {
        let language = &request.options.language;
        self.log.phase(RunPhase::Authenticating);
        self.log.info(format!(
            "Initialising Apple Music API (language: {})...",
            language
        ));

        let session = self
            .service
            .authenticate(&request.credentials, language)
            .await
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        if !session.active_subscription {
            self.log.critical(AppError::NoActiveSubscription.to_string());
            return Err(AppError::NoActiveSubscription);
        }
        self.log.info(format!(
            "Signed in (storefront: {}, language: {})",
            session.storefront, session.language
        ));
        self.service.check_tools(&self.log);

        let mut result = RunResult::default();
        let url_count = request.urls.len();

        for (index, url) in request.urls.iter().enumerate() {
            let url_index = index + 1;
            self.log.phase(RunPhase::Processing {
                url_index,
                url_count,
            });
            self.log
                .info(format!("Processing ({}/{}): {}", url_index, url_count, url));

            let queue = match self.service.download_queue(&session, url).await {
                Ok(queue) if queue.is_empty() => {
                    self.log
                        .warn(format!("No downloadable media found: {}", url));
                    continue;
                }
                Ok(queue) => queue,
                Err(ApiError::UnsupportedUrl(_)) => {
                    self.log.warn(format!("Unable to parse URL: {}", url));
                    continue;
                }
                Err(e) => {
                    let error = AppError::Resolution {
                        url: url.clone(),
                        message: e.to_string(),
                    };
                    self.log.error(error.to_string());
                    continue;
                }
            };

            self.download_queue(&queue, request, &mut result).await;
        }

        Ok(result)
    }

    /// One failed item never stops the rest of the queue
    async fn download_queue(
        &self,
        queue: &[QueueItem],
        request: &DownloadRequest,
        result: &mut RunResult,
    ) {
        let item_count = queue.len();

        for (index, item) in queue.iter().enumerate() {
            let title = item.title();
            self.log.info(format!(
                "Downloading [{}/{}]: {}",
                index + 1,
                item_count,
                title
            ));
            result.attempted += 1;

            match self.service.download(item, request, &self.log).await {
                Ok(()) => self.log.info(format!("Download complete: {}", title)),
                Err(e) => {
                    let error = AppError::ItemDownload {
                        title: title.to_string(),
                        message: e.to_string(),
                    };
                    self.log.error(error.to_string());
                    result.failed += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MediaKind, Session};
    use crate::domain::{Credentials, DownloadOptions};
    use crate::logging::{LogLevel, MemorySink};
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    enum Script {
        Items(Vec<&'static str>),
        Unsupported,
        Broken,
    }

    struct ScriptedService {
        subscription: bool,
        queues: HashMap<&'static str, Script>,
        failing: HashSet<&'static str>,
        calls: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl ScriptedService {
        fn new(subscription: bool) -> Self {
            Self {
                subscription,
                queues: HashMap::new(),
                failing: HashSet::new(),
                calls: Mutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }

        fn with_queue(mut self, url: &'static str, script: Script) -> Self {
            self.queues.insert(url, script);
            self
        }

        fn failing(mut self, title: &'static str) -> Self {
            self.failing.insert(title);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        async fn enter(&self, call: String) {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            self.calls.lock().unwrap().push(call);
            tokio::task::yield_now().await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl MusicService for ScriptedService {
        async fn authenticate(
            &self,
            _credentials: &Credentials,
            language: &str,
        ) -> crate::api::Result<Session> {
            self.enter("auth".to_string()).await;
            Ok(Session {
                storefront: "us".to_string(),
                language: language.to_string(),
                active_subscription: self.subscription,
                developer_token: String::new(),
                media_user_token: String::new(),
            })
        }

        async fn download_queue(
            &self,
            _session: &Session,
            url: &str,
        ) -> crate::api::Result<Vec<QueueItem>> {
            self.enter(format!("resolve:{}", url)).await;
            match self.queues.get(url) {
                Some(Script::Items(titles)) => Ok(titles
                    .iter()
                    .map(|t| {
                        QueueItem::new(t.to_string(), MediaKind::Song, format!("{}#{}", url, t))
                    })
                    .collect()),
                Some(Script::Unsupported) => Err(ApiError::UnsupportedUrl(url.to_string())),
                Some(Script::Broken) => Err(ApiError::ApiError("503".to_string())),
                None => Ok(Vec::new()),
            }
        }

        async fn download(
            &self,
            item: &QueueItem,
            _request: &DownloadRequest,
            _log: &RunLog,
        ) -> crate::api::Result<()> {
            self.enter(format!("download:{}", item.title())).await;
            if self.failing.contains(item.title()) {
                Err(ApiError::ExternalTool("exit status: 1".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn request(urls: &[&str]) -> DownloadRequest {
        DownloadRequest {
            urls: urls.iter().map(|u| u.to_string()).collect(),
            credentials: Credentials {
                cookies_path: PathBuf::from("cookies.txt"),
                wvd_path: None,
            },
            output_path: PathBuf::from("out"),
            temp_path: None,
            options: DownloadOptions::default(),
        }
    }

    #[tokio::test]
    async fn test_urls_and_items_processed_in_order() {
        let service = ScriptedService::new(true)
            .with_queue("u1", Script::Items(vec!["a", "b"]))
            .with_queue("u2", Script::Items(vec!["c"]))
            .failing("b");
        let (sink, log) = MemorySink::run_log();
        let coordinator = DownloadCoordinator::new(service, log);

        let result = coordinator.execute(&request(&["u1", "u2", "u1"])).await;

        assert_eq!(
            coordinator.service.calls(),
            vec![
                "auth",
                "resolve:u1",
                "download:a",
                "download:b",
                "resolve:u2",
                "download:c",
                "resolve:u1",
                "download:a",
                "download:b",
            ]
        );
        assert_eq!(coordinator.service.max_in_flight.load(Ordering::SeqCst), 1);
        assert_eq!(result, RunResult { attempted: 5, failed: 2 });

        let errors = sink.messages_at(LogLevel::Error);
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.contains(" b: ")));
        assert_eq!(
            sink.records().last().unwrap().message,
            "All tasks finished, errors: 2"
        );
    }

    #[tokio::test]
    async fn test_empty_queue_then_failing_item() {
        let service = ScriptedService::new(true)
            .with_queue("empty", Script::Items(vec![]))
            .with_queue("one", Script::Items(vec!["Broken Song"]))
            .failing("Broken Song");
        let (sink, log) = MemorySink::run_log();
        let coordinator = DownloadCoordinator::new(service, log);

        let result = coordinator.execute(&request(&["empty", "one"])).await;

        assert_eq!(result.failed, 1);
        let warnings = sink.messages_at(LogLevel::Warning);
        assert_eq!(warnings, vec!["No downloadable media found: empty"]);
        let errors = sink.messages_at(LogLevel::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Broken Song"));
        assert!(errors[0].contains("exit status: 1"));
    }

    #[tokio::test]
    async fn test_resolution_failures_are_skipped_not_counted() {
        let service = ScriptedService::new(true)
            .with_queue("bad", Script::Unsupported)
            .with_queue("down", Script::Broken)
            .with_queue("ok", Script::Items(vec!["x"]));
        let (sink, log) = MemorySink::run_log();
        let coordinator = DownloadCoordinator::new(service, log);

        let result = coordinator.execute(&request(&["bad", "down", "ok"])).await;

        assert_eq!(result, RunResult { attempted: 1, failed: 0 });
        assert_eq!(sink.messages_at(LogLevel::Warning), vec!["Unable to parse URL: bad"]);
        let errors = sink.messages_at(LogLevel::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("down"));
        assert!(coordinator.service.calls().contains(&"download:x".to_string()));
    }

    #[tokio::test]
    async fn test_no_subscription_stops_before_any_download() {
        let service = ScriptedService::new(false).with_queue("u1", Script::Items(vec!["a"]));
        let (sink, log) = MemorySink::run_log();
        let coordinator = DownloadCoordinator::new(service, log);

        let result = coordinator.execute(&request(&["u1"])).await;

        assert_eq!(result, RunResult::default());
        assert_eq!(coordinator.service.calls(), vec!["auth"]);
        assert_eq!(sink.messages_at(LogLevel::Critical).len(), 1);
        assert!(sink.messages_at(LogLevel::Error).is_empty());
        assert_eq!(
            sink.records().last().unwrap().message,
            "All tasks finished, errors: 0"
        );
        assert_eq!(
            sink.phases(),
            vec![RunPhase::Authenticating, RunPhase::Done]
        );
    }

    #[tokio::test]
    async fn test_run_reports_no_subscription_error() {
        let coordinator =
            DownloadCoordinator::new(ScriptedService::new(false), MemorySink::run_log().1);

        let err = coordinator.run(&request(&["u1"])).await.unwrap_err();
        assert!(matches!(err, AppError::NoActiveSubscription));
    }

    #[tokio::test]
    async fn test_phases_follow_urls() {
        let service = ScriptedService::new(true);
        let (sink, log) = MemorySink::run_log();
        let coordinator = DownloadCoordinator::new(service, log);

        coordinator.execute(&request(&["u1", "u2"])).await;

        assert_eq!(
            sink.phases(),
            vec![
                RunPhase::Authenticating,
                RunPhase::Processing { url_index: 1, url_count: 2 },
                RunPhase::Processing { url_index: 2, url_count: 2 },
                RunPhase::Done,
            ]
        );
    }
}
