//! PubMed E-utilities client (literature connector).
//!
//! Two sequential calls:
//!   esearch: relevance-ranked PMID search, capped, abstract-only records
//!   efetch:  batch detail fetch for all PMIDs in one request (XML)

use async_trait::async_trait;
use dyemind_common::error::DyeMindError;
use dyemind_common::sandbox::SandboxClient as Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::SourceConnector;
use crate::models::{LiteraturePayload, SourceResult};
use crate::parser::parse_pubmed_xml;

const ESEARCH_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esearch.fcgi";
const EFETCH_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/efetch.fcgi";

/// Default search result cap.
pub const DEFAULT_MAX_RESULTS: usize = 3;

pub struct PubMedConnector {
    client: Client,
    max_results: usize,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EsearchResponse {
    esearchresult: EsearchResult,
}

#[derive(Debug, Deserialize)]
struct EsearchResult {
    #[serde(default)]
    idlist: Vec<String>,
}

impl PubMedConnector {
    pub fn new(
        timeout: Duration,
        max_results: usize,
        api_key: Option<String>,
    ) -> Result<Self, DyeMindError> {
        Ok(Self {
            client: Client::with_timeout(timeout)?,
            max_results,
            api_key,
        })
    }

    /// Search PubMed and return PMIDs in relevance order, restricted to
    /// records that carry an abstract.
    #[instrument(skip(self))]
    async fn esearch(&self, query: &str) -> Result<Vec<String>, DyeMindError> {
        let term = format!("{} AND hasabstract[text]", query);
        let mut params = vec![
            ("db", "pubmed".to_string()),
            ("retmode", "json".to_string()),
            ("term", term),
            ("sort", "relevance".to_string()),
            ("retmax", self.max_results.to_string()),
            ("usehistory", "n".to_string()),
        ];
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.clone()));
        }

        let resp = self.client.get(ESEARCH_URL)?.query(&params).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DyeMindError::UpstreamStatus(status.as_u16()));
        }

        let parsed: EsearchResponse = resp.json().await?;
        debug!(ids = ?parsed.esearchresult.idlist, "PubMed esearch returned PMIDs");
        Ok(parsed.esearchresult.idlist)
    }

    /// Fetch PubMed XML for the PMIDs in a single batch request and parse
    /// it into ordered records.
    #[instrument(skip(self))]
    async fn efetch(&self, pmids: &[String]) -> Result<LiteraturePayload, DyeMindError> {
        let mut params = vec![
            ("db", "pubmed".to_string()),
            ("id", pmids.join(",")),
            ("rettype", "abstract".to_string()),
            ("retmode", "xml".to_string()),
        ];
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.clone()));
        }

        let resp = self.client.get(EFETCH_URL)?.query(&params).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DyeMindError::UpstreamStatus(status.as_u16()));
        }

        let xml = resp.text().await?;
        let records = parse_pubmed_xml(&xml)?;
        Ok(LiteraturePayload { records })
    }
}

#[async_trait]
impl SourceConnector for PubMedConnector {
    type Payload = LiteraturePayload;

    fn name(&self) -> &'static str {
        "pubmed"
    }

    async fn fetch(&self, query: &str) -> SourceResult<LiteraturePayload> {
        let pmids = match self.esearch(query).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(query = query, error = %e, "PubMed search failed");
                return SourceResult::Failed(e.to_string());
            }
        };

        if pmids.is_empty() {
            debug!(query = query, "PubMed search returned no identifiers");
            return SourceResult::Empty;
        }

        match self.efetch(&pmids).await {
            Ok(payload) => SourceResult::Success(payload),
            Err(e) => {
                warn!(query = query, error = %e, "PubMed detail fetch failed");
                SourceResult::Failed(e.to_string())
            }
        }
    }
}
