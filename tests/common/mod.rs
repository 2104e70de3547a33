#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use scroll_scrap::{
    DocumentSource, ExtentSignal, ExtractionBatch, Persist, RunConfig, SourceError,
    SourceProvider,
};
use tokio::sync::Notify;

/// What the scripted page does during a run.
#[derive(Clone, Default)]
pub struct Script {
    pub signals: Vec<u64>,
    pub html: String,
    pub fail_acquire: bool,
    pub fail_navigate: bool,
    pub fail_growth_at: Option<u32>,
    /// Navigation blocks until this is notified.
    pub hold_navigate: Option<Arc<Notify>>,
    /// Navigation never completes.
    pub hang_navigate: bool,
}

/// Counters shared between a provider and the test.
#[derive(Default)]
pub struct Probe {
    pub acquired: AtomicU32,
    pub released: AtomicU32,
    pub growths: AtomicU32,
    pub navigating: Notify,
}

impl Probe {
    pub fn acquired(&self) -> u32 {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> u32 {
        self.released.load(Ordering::SeqCst)
    }

    pub fn growths(&self) -> u32 {
        self.growths.load(Ordering::SeqCst)
    }
}

pub struct ScriptedProvider {
    pub script: Script,
    pub probe: Arc<Probe>,
}

impl ScriptedProvider {
    pub fn new(script: Script) -> (Self, Arc<Probe>) {
        let probe = Arc::new(Probe::default());
        (
            Self {
                script,
                probe: Arc::clone(&probe),
            },
            probe,
        )
    }
}

#[async_trait]
impl SourceProvider for ScriptedProvider {
    type Source = ScriptedSource;

    async fn acquire(&self) -> Result<ScriptedSource, SourceError> {
        if self.script.fail_acquire {
            return Err(SourceError::Connect("connection refused".into()));
        }
        self.probe.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(ScriptedSource {
            signals: self.script.signals.iter().copied().collect(),
            script: self.script.clone(),
            probe: Arc::clone(&self.probe),
            released: false,
        })
    }
}

pub struct ScriptedSource {
    signals: VecDeque<u64>,
    script: Script,
    probe: Arc<Probe>,
    released: bool,
}

#[async_trait]
impl DocumentSource for ScriptedSource {
    async fn navigate(&mut self, url: &str) -> Result<(), SourceError> {
        self.probe.navigating.notify_one();
        if let Some(hold) = &self.script.hold_navigate {
            hold.notified().await;
        }
        if self.script.hang_navigate {
            std::future::pending::<()>().await;
        }
        if self.script.fail_navigate {
            return Err(SourceError::Navigation {
                url: url.into(),
                reason: "host unreachable".into(),
            });
        }
        Ok(())
    }

    async fn prime(&mut self, _discovery_timeout: Duration) -> Result<bool, SourceError> {
        Ok(false)
    }

    async fn trigger_growth(&mut self) -> Result<(), SourceError> {
        let n = self.probe.growths.fetch_add(1, Ordering::SeqCst) + 1;
        if self.script.fail_growth_at == Some(n) {
            return Err(SourceError::Interaction("scroll target detached".into()));
        }
        Ok(())
    }

    async fn extent_signal(&mut self) -> Result<ExtentSignal, SourceError> {
        self.signals
            .pop_front()
            .map(ExtentSignal)
            .ok_or_else(|| SourceError::Read("no more readings".into()))
    }

    async fn document(&mut self) -> Result<String, SourceError> {
        Ok(self.script.html.clone())
    }

    async fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.probe.released.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Keeps every persisted batch in memory.
#[derive(Clone, Default)]
pub struct MemoryPersist {
    pub batches: Arc<Mutex<Vec<ExtractionBatch>>>,
}

impl MemoryPersist {
    pub fn batches(&self) -> Vec<ExtractionBatch> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl Persist for MemoryPersist {
    async fn persist(
        &self,
        batch: &ExtractionBatch,
        run_date: NaiveDate,
    ) -> scroll_scrap::Result<PathBuf> {
        self.batches.lock().unwrap().push(batch.clone());
        Ok(PathBuf::from(format!("memory_{}.csv", run_date.format("%Y%m%d"))))
    }
}

pub fn card(id: u32, title: &str, owner: Option<&str>, amount: Option<&str>) -> String {
    let owner = owner
        .map(|o| format!(r#"<span class="_tc--lighter">by {o}</span>"#))
        .unwrap_or_default();
    let amount = amount
        .map(|a| format!(r#"<div data-qa="project-card:FundsGathered"> {a} </div>"#))
        .unwrap_or_default();
    format!(
        r#"<div data-qa="search-result-project:{id}">
             <h3 data-qa="project-card:ProjectName"><a href="/projects/{id}">{title}</a></h3>
             {owner}
             {amount}
           </div>"#
    )
}

pub fn page(cards: &[String]) -> String {
    format!(
        "<!DOCTYPE html><html><head><title>Search</title></head><body><main>{}</main></body></html>",
        cards.concat()
    )
}

pub fn config() -> RunConfig {
    RunConfig {
        wait_secs: 1.0,
        max_loads: 5,
        target_url: "http://listing.test/search".into(),
        ..RunConfig::default()
    }
}
