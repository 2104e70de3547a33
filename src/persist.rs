use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::{fs::File, io::AsyncWriteExt};

use crate::record::ExtractionBatch;
use crate::{Result, RunConfig};

/// UTF-8 byte-order mark, so spreadsheet tools pick the right encoding.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Receives the finished batch of a run.
#[async_trait]
pub trait Persist: Send + Sync {
    /// Stores `batch` and returns where it went.
    async fn persist(&self, batch: &ExtractionBatch, run_date: NaiveDate) -> Result<PathBuf>;
}

/// Writes `<source_name>_<YYYYMMDD>.csv` into a directory.
///
/// A second run on the same day overwrites that day's file.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    dir: PathBuf,
    source_name: String,
    labels: [String; 3],
}

impl CsvExporter {
    pub fn new(dir: impl Into<PathBuf>, source_name: impl Into<String>, labels: [String; 3]) -> Self {
        Self {
            dir: dir.into(),
            source_name: source_name.into(),
            labels,
        }
    }

    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(
            &config.output_dir,
            &config.source_name,
            config.column_labels.clone(),
        )
    }

    pub fn file_name(&self, run_date: NaiveDate) -> String {
        format!("{}_{}.csv", self.source_name, run_date.format("%Y%m%d"))
    }

    pub fn path_for(&self, run_date: NaiveDate) -> PathBuf {
        self.dir.join(self.file_name(run_date))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Header row, then one row per record in batch order.
    pub fn write_batch<W: Write>(&self, mut out: W, batch: &ExtractionBatch) -> Result<()> {
        out.write_all(UTF8_BOM)?;
        let mut wtr = csv::Writer::from_writer(out);
        wtr.write_record(&self.labels)?;
        for record in batch {
            wtr.write_record(record.fields())?;
        }
        wtr.flush()?;
        Ok(())
    }
}

#[async_trait]
impl Persist for CsvExporter {
    async fn persist(&self, batch: &ExtractionBatch, run_date: NaiveDate) -> Result<PathBuf> {
        let path = self.path_for(run_date);
        let mut bytes = Vec::with_capacity(64 * (batch.len() + 1));
        self.write_batch(&mut bytes, batch)?;

        let mut file = File::create(&path).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        Ok(path)
    }
}
