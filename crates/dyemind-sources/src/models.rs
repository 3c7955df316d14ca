//! Data models shared by the source connectors.

use serde::{Deserialize, Serialize};

/// Sentinel title for records missing an `ArticleTitle`.
pub const NO_TITLE: &str = "No title";
/// Sentinel abstract for records missing an `AbstractText`.
pub const NO_ABSTRACT: &str = "No abstract available.";
/// Sentinel journal for records missing a `Journal/Title`.
pub const UNKNOWN_JOURNAL: &str = "Unknown Journal";
/// Authors are truncated to this many entries for display.
pub const MAX_DISPLAY_AUTHORS: usize = 4;

/// Outcome of a single connector fetch. `Empty` and `Failed` are both
/// non-fatal; downstream fusion treats them identically (omit the source)
/// while observability keeps them distinguishable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceResult<T> {
    Success(T),
    Empty,
    Failed(String),
}

impl<T> SourceResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, SourceResult::Success(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, SourceResult::Empty)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SourceResult::Failed(_))
    }

    /// Borrow the payload if this result succeeded.
    pub fn payload(&self) -> Option<&T> {
        match self {
            SourceResult::Success(p) => Some(p),
            _ => None,
        }
    }

    /// Structured tag for programmatic callers and response assembly.
    pub fn tag(&self) -> SourceTag {
        match self {
            SourceResult::Success(_) => SourceTag::Success,
            SourceResult::Empty => SourceTag::Empty,
            SourceResult::Failed(reason) => SourceTag::Failed {
                reason: reason.clone(),
            },
        }
    }
}

/// Serializable per-source outcome tag carried in the assembled response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceTag {
    Success,
    Empty,
    Failed { reason: String },
}

/// Encyclopedia lead text and canonical deep link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncyclopediaPayload {
    pub extract: String,
    pub canonical_url: Option<String>,
}

/// Canonical structure lookup result. `compound_id` is the first token of
/// the newline-delimited CID list returned by the identifier step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructurePayload {
    pub compound_id: String,
    pub image_url: String,
    pub canonical_smiles: String,
}

/// Ordered literature records in search relevance order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiteraturePayload {
    pub records: Vec<LiteratureRecord>,
}

/// One normalized bibliographic record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiteratureRecord {
    pub title: String,
    pub abstract_text: String,
    pub journal: String,
    /// "LastName ForeName" strings, at most [`MAX_DISPLAY_AUTHORS`] entries.
    pub authors: Vec<String>,
    pub doi: Option<String>,
}

impl Default for LiteratureRecord {
    fn default() -> Self {
        Self {
            title: NO_TITLE.to_string(),
            abstract_text: NO_ABSTRACT.to_string(),
            journal: UNKNOWN_JOURNAL.to_string(),
            authors: Vec::new(),
            doi: None,
        }
    }
}
