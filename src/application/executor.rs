use std::any::Any;
use std::sync::Arc;

use futures::{stream::BoxStream, StreamExt};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::{
    api::MusicService,
    application::DownloadCoordinator,
    domain::{AppError, DownloadRequest, RunPhase, RunResult},
    logging::{LogRecord, LogSink, RunLog},
};

#[derive(Debug, Clone)]
pub enum RunEvent {
    Log(LogRecord),
    Phase(RunPhase),
    Finished(RunOutcome),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(RunResult),
    /// The worker went away without a result (panic or startup failure)
    Interrupted,
}

struct ChannelSink {
    tx: UnboundedSender<RunEvent>,
}

impl LogSink for ChannelSink {
    fn emit(&self, record: LogRecord) {
        // the receiver only disappears when the window is closing
        let _ = self.tx.send(RunEvent::Log(record));
    }

    fn phase(&self, phase: RunPhase) {
        let _ = self.tx.send(RunEvent::Phase(phase));
    }
}

/// Runs a download request on its own worker thread.
///
/// The interactive side only ever sees [`RunEvent`]s; it never shares state
/// with the worker.
pub struct RunExecutor {
    tx: UnboundedSender<RunEvent>,
    rx: UnboundedReceiver<RunEvent>,
    log: RunLog,
}

impl Default for RunExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl RunExecutor {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let log = RunLog::new(Arc::new(ChannelSink { tx: tx.clone() }));
        Self { tx, rx, log }
    }

    /// Log of the upcoming run; lines written before `spawn` are delivered first.
    pub fn log(&self) -> &RunLog {
        &self.log
    }

    pub fn spawn<S>(self, service: S, request: DownloadRequest) -> BoxStream<'static, RunEvent>
    where
        S: MusicService + 'static,
    {
        let RunExecutor { tx, rx, log } = self;
        let worker_tx = tx.clone();
        let worker_log = log.clone();

        let spawned = std::thread::Builder::new()
            .name("download-worker".to_string())
            .spawn(move || {
                let outcome = run_on_worker(service, request, worker_log);
                let _ = worker_tx.send(RunEvent::Finished(outcome));
            });

        if let Err(e) = spawned {
            log.critical(
                AppError::Unclassified(format!("failed to start worker thread: {}", e)).to_string(),
            );
            let _ = tx.send(RunEvent::Finished(RunOutcome::Interrupted));
        }
        drop(log);
        drop(tx);

        events(rx)
    }
}

fn run_on_worker<S>(service: S, request: DownloadRequest, log: RunLog) -> RunOutcome
where
    S: MusicService + 'static,
{
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            log.critical(
                AppError::Unclassified(format!("failed to start runtime: {}", e)).to_string(),
            );
            return RunOutcome::Interrupted;
        }
    };

    runtime.block_on(async move {
        let coordinator = DownloadCoordinator::new(service, log.clone());
        let handle = tokio::spawn(async move { coordinator.execute(&request).await });

        match handle.await {
            Ok(result) => RunOutcome::Completed(result),
            Err(e) => {
                let detail = if e.is_panic() {
                    panic_message(e.into_panic())
                } else {
                    e.to_string()
                };
                log.critical(AppError::Unclassified(detail).to_string());
                RunOutcome::Interrupted
            }
        }
    })
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Drains the channel, guaranteeing exactly one trailing `Finished`
fn events(rx: UnboundedReceiver<RunEvent>) -> BoxStream<'static, RunEvent> {
    futures::stream::unfold((rx, false), |(mut rx, finished)| async move {
        if finished {
            return None;
        }
        match rx.recv().await {
            Some(event) => {
                let finished = matches!(event, RunEvent::Finished(_));
                Some((event, (rx, finished)))
            }
            None => Some((RunEvent::Finished(RunOutcome::Interrupted), (rx, true))),
        }
    })
    .boxed()
}
