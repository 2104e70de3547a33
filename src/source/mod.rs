//! The renderer-facing side of the pipeline.
//!
//! A [`DocumentSource`] is a live handle on a rendered page: it can navigate,
//! perform growth actions (scroll-to-end, "load more" clicks), measure how much
//! content is currently rendered and hand out a snapshot of the document.

mod http;
mod webdriver;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::SourceError;

pub use http::{HttpProvider, HttpSource};
pub use webdriver::{WebDriverProvider, WebDriverSource};

/// A comparable measurement of how much content is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExtentSignal(pub u64);

impl fmt::Display for ExtentSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[async_trait]
pub trait DocumentSource: Send {
    async fn navigate(&mut self, url: &str) -> Result<(), SourceError>;

    /// Looks for an explicit "load more" control for at most `discovery_timeout`
    /// and activates it. Returns `false` when there is none.
    async fn prime(&mut self, _discovery_timeout: Duration) -> Result<bool, SourceError> {
        Ok(false)
    }

    /// Performs one growth action.
    async fn trigger_growth(&mut self) -> Result<(), SourceError>;

    async fn extent_signal(&mut self) -> Result<ExtentSignal, SourceError>;

    /// Snapshot of the currently rendered markup.
    async fn document(&mut self) -> Result<String, SourceError>;

    /// Gives the underlying renderer back. Must be safe to call more than once
    /// and after any earlier failure.
    async fn release(&mut self);
}

/// Hands out a fresh [`DocumentSource`] for every run.
#[async_trait]
pub trait SourceProvider: Send + Sync {
    type Source: DocumentSource;

    async fn acquire(&self) -> Result<Self::Source, SourceError>;
}
