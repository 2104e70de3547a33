use scraper::{ElementRef, Html, Selector};
use tokio::task::spawn_blocking;

use crate::record::{ExtractionBatch, Record};
use crate::{Error, Result};

/// CSS selectors describing one listing entry and its fields.
///
/// The defaults match the project-card markup of the target listing. Item and
/// field markers are `data-qa` attributes rather than styling classes.
#[derive(Debug, Clone)]
pub struct ListingSelectors {
    pub item: String,
    pub title: String,
    /// Candidates for the owner line; the first whose text starts with
    /// `owner_marker` followed by any whitespace wins.
    pub owner: String,
    pub owner_marker: String,
    pub amount: String,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            item: r#"div[data-qa^="search-result-project:"]"#.into(),
            title: r#"h3[data-qa="project-card:ProjectName"] a"#.into(),
            owner: "span".into(),
            owner_marker: "by".into(),
            amount: r#"[data-qa="project-card:FundsGathered"]"#.into(),
        }
    }
}

/// Turns a rendered document into records. Holds no state between calls.
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    item: Selector,
    title: Selector,
    owner: Selector,
    owner_marker: String,
    amount: Selector,
}

impl RecordExtractor {
    pub fn new(selectors: &ListingSelectors) -> Result<Self> {
        Ok(Self {
            item: create_selector(&selectors.item)?,
            title: create_selector(&selectors.title)?,
            owner: create_selector(&selectors.owner)?,
            owner_marker: selectors.owner_marker.trim().to_string(),
            amount: create_selector(&selectors.amount)?,
        })
    }

    /// Extracts one record per listing entry, in document order.
    ///
    /// A document without entries yields an empty batch.
    pub fn extract(&self, html: &str) -> ExtractionBatch {
        let doc = Html::parse_document(html);
        doc.select(&self.item)
            .map(|item| self.extract_item(item))
            .collect()
    }

    /// Same as [`extract`](Self::extract), off the async worker.
    pub async fn extract_blocking(&self, html: String) -> Result<ExtractionBatch> {
        let extractor = self.clone();
        let batch = spawn_blocking(move || extractor.extract(&html)).await?;
        Ok(batch)
    }

    fn extract_item(&self, item: ElementRef<'_>) -> Record {
        let title = item.select(&self.title).next().map(trimmed_text);
        let owner = item.select(&self.owner).find_map(|el| {
            let text = trimmed_text(el);
            text.strip_prefix(self.owner_marker.as_str())
                .filter(|rest| rest.starts_with(char::is_whitespace))
                .map(|name| name.trim().to_string())
        });
        let amount_text = item.select(&self.amount).next().map(trimmed_text);

        Record::from_parts(title, owner, amount_text)
    }
}

#[inline]
fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str).map_err(|_| Error::ParseMissingSelector(sel_str.into()))
}

#[inline]
fn trimmed_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}
