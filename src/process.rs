use std::path::PathBuf;

use chrono::Local;
use tokio::time::{sleep, timeout};
use tracing::warn;

use crate::guard::RunGuard;
use crate::load::{LoadController, LoadReport};
use crate::parse::RecordExtractor;
use crate::persist::Persist;
use crate::source::{DocumentSource, SourceProvider};
use crate::status::Reporter;
use crate::{info_time, Error, Phase, Result, RunConfig};

/// How a run that got past validation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Saved(PathBuf),
    /// The document held no listing entries.
    Empty,
    Failed,
}

#[derive(Debug)]
pub struct PipelineResult {
    pub record_count: usize,
    pub outcome: RunOutcome,
    /// `None` when the run failed.
    pub load: Option<LoadReport>,
    pub error: Option<Error>,
}

/// Sequences one scraping run: acquire, navigate, settle, load, extract, persist.
///
/// Runs are single-flight. The document source is released on every exit path
/// and every run ends with exactly one terminal status event.
pub struct Pipeline<P, W> {
    provider: P,
    persist: W,
    extractor: RecordExtractor,
    status: Reporter,
    guard: RunGuard,
}

struct Completed {
    load: LoadReport,
    record_count: usize,
    saved: Option<PathBuf>,
}

impl<P, W> Pipeline<P, W>
where
    P: SourceProvider,
    W: Persist,
{
    pub fn new(provider: P, persist: W, extractor: RecordExtractor, status: Reporter) -> Self {
        Self {
            provider,
            persist,
            extractor,
            status,
            guard: RunGuard::default(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.guard.is_running()
    }

    /// Performs one full pass.
    ///
    /// Returns `Err` only when the run never started: another run is active
    /// or `config` is invalid. Failures during the run are reported through
    /// [`PipelineResult::error`].
    pub async fn run_once(&self, config: &RunConfig) -> Result<PipelineResult> {
        let Some(_permit) = self.guard.try_acquire() else {
            self.status.emit("a run is already in progress");
            return Err(Error::AlreadyRunning);
        };
        if let Err(e) = config.validate() {
            self.status.emit(format!("error: {e}"));
            return Err(e);
        }

        let start_time = Local::now();
        self.status.emit("scraping started");

        let mut source: Option<P::Source> = None;
        let result = match config.deadline() {
            Some(limit) => timeout(limit, self.drive(config, &mut source))
                .await
                .unwrap_or(Err(Error::DeadlineExceeded(limit))),
            None => self.drive(config, &mut source).await,
        };

        if let Some(mut source) = source {
            source.release().await;
            self.status.emit("document source released");
        }

        let result = match result {
            Ok(done) => {
                match &done.saved {
                    Some(path) => self.status.emit(format!(
                        "saved {} records to {}",
                        done.record_count,
                        path.display()
                    )),
                    None => self.status.emit("no records were extracted"),
                }
                PipelineResult {
                    record_count: done.record_count,
                    outcome: done.saved.map_or(RunOutcome::Empty, RunOutcome::Saved),
                    load: Some(done.load),
                    error: None,
                }
            }
            Err(e) => {
                warn!("run failed: {e}");
                self.status
                    .emit(format!("fatal error ({}): {e}", e.kind()));
                PipelineResult {
                    record_count: 0,
                    outcome: RunOutcome::Failed,
                    load: None,
                    error: Some(e),
                }
            }
        };
        info_time!(start_time, "run finished: {:?}", result.outcome);
        Ok(result)
    }

    /// The phases proper. The acquired source is parked in `slot` so the
    /// caller can release it however this future ends.
    async fn drive(&self, config: &RunConfig, slot: &mut Option<P::Source>) -> Result<Completed> {
        let controller = LoadController::from_config(config)?;

        self.status.emit("starting the document source...");
        let source = self
            .provider
            .acquire()
            .await
            .map_err(|e| Error::in_phase(Phase::Acquire, e))?;
        let source = slot.insert(source);

        self.status
            .emit(format!("navigating to {}", config.target_url));
        source
            .navigate(&config.target_url)
            .await
            .map_err(|e| Error::in_phase(Phase::Navigate, e))?;
        self.status.emit("waiting for the page to settle...");
        sleep(config.wait_interval()).await;

        let load = controller.run(source, &self.status).await?;

        self.status.emit("extracting data from the loaded page...");
        let load_time = Local::now();
        let html = source
            .document()
            .await
            .map_err(|e| Error::in_phase(Phase::Extract, e))?;
        let batch = self.extractor.extract_blocking(html).await?;
        info_time!(load_time, "extracted {} records", batch.len());
        self.status
            .emit(format!("found {} listings in the page", batch.len()));

        if batch.is_empty() {
            return Ok(Completed {
                load,
                record_count: 0,
                saved: None,
            });
        }
        self.status.emit(format!("saving {} records...", batch.len()));
        let path = self
            .persist
            .persist(&batch, Local::now().date_naive())
            .await?;
        Ok(Completed {
            load,
            record_count: batch.len(),
            saved: Some(path),
        })
    }
}
