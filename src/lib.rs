//! Incrementally loads a dynamically paginated listing page, extracts every
//! loaded entry and saves the result as a dated CSV file.

pub mod config;
pub mod error;
pub mod guard;
pub mod load;
mod macros;
pub mod parse;
pub mod persist;
pub mod process;
pub mod record;
pub mod source;
pub mod status;

pub use config::RunConfig;
pub use error::{Error, Phase, Result, SourceError};
pub use guard::{RunGuard, RunPermit};
pub use load::{LoadController, LoadOutcome, LoadReport};
pub use parse::{ListingSelectors, RecordExtractor};
pub use persist::{CsvExporter, Persist};
pub use process::{Pipeline, PipelineResult, RunOutcome};
pub use record::{ExtractionBatch, Record};
pub use source::{DocumentSource, ExtentSignal, SourceProvider};
pub use status::{Reporter, StatusEvent, StatusSink};

pub const TARGET_URL: &str =
    "https://www.indiegogo.com/en/projects/search?SortType=MostPopular&Source=Filtered";
/// Prefix of the exported file name.
pub const SOURCE_NAME: &str = "indiegogo";
pub const DEFAULT_WAIT_SECS: f64 = 3.0;
pub const DEFAULT_MAX_LOADS: u32 = 50;
/// How long priming looks for an explicit "load more" control.
pub const DISCOVERY_TIMEOUT_SECS: u64 = 10;
/// Placeholder for a field that couldn't be resolved.
pub const NOT_AVAILABLE: &str = "N/A";
pub const COLUMN_LABELS: [&str; 3] = ["商品名", "販売元", "金額"];
