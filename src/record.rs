use crate::NOT_AVAILABLE;

/// One listing entry. Unresolved fields hold [`NOT_AVAILABLE`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    pub title: String,
    pub owner: String,
    /// Left exactly as rendered, currency and locale formatting included.
    pub amount_text: String,
}

impl Record {
    /// Builds a record, collapsing missing fields to the sentinel.
    pub fn from_parts(
        title: Option<String>,
        owner: Option<String>,
        amount_text: Option<String>,
    ) -> Self {
        let or_sentinel = |field: Option<String>| field.unwrap_or_else(|| NOT_AVAILABLE.into());
        Self {
            title: or_sentinel(title),
            owner: or_sentinel(owner),
            amount_text: or_sentinel(amount_text),
        }
    }

    pub fn fields(&self) -> [&str; 3] {
        [&self.title, &self.owner, &self.amount_text]
    }
}

/// All records of one run, in document order.
pub type ExtractionBatch = Vec<Record>;
