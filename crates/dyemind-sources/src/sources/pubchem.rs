//! PubChem PUG REST client (structure connector).
//!
//! Two sequential calls:
//!   name → CID list:  /rest/pug/compound/name/{name}/cids/TXT
//!   CID  → SMILES:    /rest/pug/compound/cid/{cid}/property/CanonicalSMILES/JSON
//!
//! The structure image is referenced through the image service
//! (imgsrv.fcgi?cid={cid}) so the presentation layer can embed it directly.

use async_trait::async_trait;
use dyemind_common::error::DyeMindError;
use dyemind_common::sandbox::SandboxClient as Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::SourceConnector;
use crate::models::{SourceResult, StructurePayload};

const PUG_BASE_URL: &str = "https://pubchem.ncbi.nlm.nih.gov/rest/pug";
const IMG_BASE_URL: &str = "https://pubchem.ncbi.nlm.nih.gov/image/imgsrv.fcgi";

pub struct PubChemConnector {
    client: Client,
}

#[derive(Debug, Deserialize)]
struct PropertyResponse {
    #[serde(rename = "PropertyTable")]
    property_table: PropertyTable,
}

#[derive(Debug, Deserialize)]
struct PropertyTable {
    #[serde(rename = "Properties")]
    properties: Vec<CompoundProperties>,
}

#[derive(Debug, Deserialize)]
struct CompoundProperties {
    #[serde(rename = "CanonicalSMILES")]
    canonical_smiles: String,
}

impl PubChemConnector {
    pub fn new(timeout: Duration) -> Result<Self, DyeMindError> {
        Ok(Self {
            client: Client::with_timeout(timeout)?,
        })
    }

    /// First token of the newline-delimited CID list, if any.
    fn first_cid(cid_list: &str) -> Option<String> {
        cid_list
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(String::from)
    }

    fn image_url(cid: &str) -> String {
        format!("{}?cid={}&t=l", IMG_BASE_URL, cid)
    }

    /// Resolve the query to a first-match CID. PubChem answers 404 when
    /// the name matches nothing; that is an empty result, not a failure.
    #[instrument(skip(self))]
    async fn resolve_cid(&self, query: &str) -> Result<Option<String>, DyeMindError> {
        let url = format!("{}/compound/name/{}/cids/TXT", PUG_BASE_URL, query.trim());

        let resp = self.client.get(&url)?.send().await?;

        let status = resp.status();
        if status.as_u16() == 404 {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(DyeMindError::UpstreamStatus(status.as_u16()));
        }

        let body = resp.text().await?;
        Ok(Self::first_cid(&body))
    }

    /// Fetch the canonical SMILES for a resolved CID.
    #[instrument(skip(self))]
    async fn fetch_smiles(&self, cid: &str) -> Result<String, DyeMindError> {
        let url = format!(
            "{}/compound/cid/{}/property/CanonicalSMILES/JSON",
            PUG_BASE_URL, cid
        );

        let resp = self.client.get(&url)?.send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DyeMindError::UpstreamStatus(status.as_u16()));
        }

        let props: PropertyResponse = resp.json().await?;
        props
            .property_table
            .properties
            .into_iter()
            .next()
            .map(|p| p.canonical_smiles)
            .ok_or_else(|| DyeMindError::Config("PubChem property table is empty".to_string()))
    }

    async fn lookup(&self, query: &str) -> Result<SourceResult<StructurePayload>, DyeMindError> {
        let Some(cid) = self.resolve_cid(query).await? else {
            debug!(query = query, "No PubChem CID for query");
            return Ok(SourceResult::Empty);
        };

        let smiles = self.fetch_smiles(&cid).await?;

        debug!(query = query, cid = %cid, "Resolved PubChem structure");

        Ok(SourceResult::Success(StructurePayload {
            image_url: Self::image_url(&cid),
            compound_id: cid,
            canonical_smiles: smiles,
        }))
    }
}

#[async_trait]
impl SourceConnector for PubChemConnector {
    type Payload = StructurePayload;

    fn name(&self) -> &'static str {
        "pubchem"
    }

    async fn fetch(&self, query: &str) -> SourceResult<StructurePayload> {
        match self.lookup(query).await {
            Ok(result) => result,
            Err(e) => {
                warn!(query = query, error = %e, "PubChem lookup failed");
                SourceResult::Failed(e.to_string())
            }
        }
    }
}
