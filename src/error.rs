use std::fmt;
use std::time::Duration;

use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

/// The pipeline step an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Acquire,
    Navigate,
    Settle,
    Load,
    Extract,
    Persist,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Acquire => "acquire",
            Phase::Navigate => "navigate",
            Phase::Settle => "settle",
            Phase::Load => "load",
            Phase::Extract => "extract",
            Phase::Persist => "persist",
        };
        f.write_str(name)
    }
}

/// Failures reported by a `DocumentSource` implementation.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Couldn't connect to the renderer: {0}")]
    Connect(String),

    #[error("Couldn't navigate to {url}: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Interaction with the page failed: {0}")]
    Interaction(String),

    #[error("Couldn't read the document: {0}")]
    Read(String),
}

impl SourceError {
    pub fn kind(&self) -> &'static str {
        match self {
            SourceError::Connect(_) => "connect",
            SourceError::Navigation { .. } => "navigation",
            SourceError::Interaction(_) => "interaction",
            SourceError::Read(_) => "read",
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Validation(String),

    #[error("A run is already in progress.")]
    AlreadyRunning,

    #[error(
        "{phase} phase failed{}: {source}",
        .attempt.map(|n| format!(" at attempt {n}")).unwrap_or_default()
    )]
    Source {
        phase: Phase,
        attempt: Option<u32>,
        #[source]
        source: SourceError,
    },

    #[error("The selector you are trying to scrape for is invalid. Selector: {0}")]
    ParseMissingSelector(String),

    #[error("Run exceeded its deadline of {0:?}")]
    DeadlineExceeded(Duration),

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Csv Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Tokio Join Error, couldn't await a task! {0}")]
    RuntimeJoin(#[from] tokio::task::JoinError),
}

impl Error {
    /// Wraps a source failure with the phase it happened in.
    pub fn in_phase(phase: Phase, source: SourceError) -> Self {
        Error::Source {
            phase,
            attempt: None,
            source,
        }
    }

    /// Wraps a source failure raised inside the load loop.
    pub fn at_attempt(attempt: u32, source: SourceError) -> Self {
        Error::Source {
            phase: Phase::Load,
            attempt: Some(attempt),
            source,
        }
    }

    /// Short label naming the failure kind, used in terminal status events.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation",
            Error::AlreadyRunning => "already running",
            Error::Source { source, .. } => source.kind(),
            Error::ParseMissingSelector(_) => "selector",
            Error::DeadlineExceeded(_) => "deadline",
            Error::Io(_) => "io",
            Error::Csv(_) => "csv",
            Error::RuntimeJoin(_) => "runtime",
        }
    }
}
