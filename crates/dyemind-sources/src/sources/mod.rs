//! Source connector clients.

pub mod pubchem;
pub mod pubmed;
pub mod wikipedia;

use async_trait::async_trait;

use crate::models::SourceResult;

pub use pubchem::PubChemConnector;
pub use pubmed::PubMedConnector;
pub use wikipedia::WikipediaConnector;

/// Common interface for all source connectors.
///
/// Single attempt per call; implementations must catch every transport
/// error, non-success status and malformed body internally and convert it
/// to [`SourceResult::Failed`] — `fetch` never raises.
#[async_trait]
pub trait SourceConnector: Send + Sync {
    type Payload;

    /// Connector name for logging and provenance.
    fn name(&self) -> &'static str;

    /// Fetch the source's contribution for a user query.
    async fn fetch(&self, query: &str) -> SourceResult<Self::Payload>;
}
