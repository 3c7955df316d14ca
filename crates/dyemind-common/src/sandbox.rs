use reqwest::{Client, ClientBuilder};
use std::collections::HashSet;
use std::time::Duration;
use tracing::warn;
use url::Url;

use crate::error::DyeMindError;

/// Default per-call timeout. Every connector call must be bounded so the
/// orchestrator can never stall on one slow source.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// A capped HTTP client that only allows requests to approved domains.
/// All external traffic in DyeMind (encyclopedia, structure, literature,
/// generative backends) goes through this wrapper.
#[derive(Debug, Clone)]
pub struct SandboxClient {
    client: Client,
    allowlist: HashSet<String>,
}

impl SandboxClient {
    /// Creates a new SandboxClient with the default allowlist and timeout.
    pub fn new() -> Result<Self, DyeMindError> {
        Self::with_timeout(Duration::from_millis(DEFAULT_TIMEOUT_MS))
    }

    /// Creates a new SandboxClient with an explicit per-request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, DyeMindError> {
        let mut allowlist = HashSet::new();
        let domains = vec![
            "en.wikipedia.org",             // Wikipedia REST summaries
            "pubchem.ncbi.nlm.nih.gov",     // PubChem PUG
            "eutils.ncbi.nlm.nih.gov",      // PubMed E-utilities
            "api-inference.huggingface.co", // Hugging Face Inference API
            "api.openai.com",               // OpenAI-compatible remote
            "localhost",                    // local OpenAI-compatible server
            "127.0.0.1",                    // localhost alt
        ];

        for d in domains {
            allowlist.insert(d.to_string());
        }

        let client = ClientBuilder::new()
            .timeout(timeout)
            .build()
            .map_err(|e| DyeMindError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, allowlist })
    }

    /// Appends an exact hostname to the allowlist.
    pub fn allow_domain(&mut self, domain: &str) {
        self.allowlist.insert(domain.to_string());
    }

    /// Validates if a URL is permitted under the current sandbox policy.
    pub fn is_allowed(&self, url: &str) -> bool {
        if let Ok(parsed) = Url::parse(url) {
            if let Some(host) = parsed.host_str() {
                // Exact match or subdomain of an allowed domain
                for allowed in &self.allowlist {
                    if host == allowed || host.ends_with(&format!(".{}", allowed)) {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Exposes the inner `reqwest::Client` builder pattern safely for GET requests.
    pub fn get(&self, url: &str) -> Result<reqwest::RequestBuilder, DyeMindError> {
        if !self.is_allowed(url) {
            warn!(url = url, "Blocked GET to unlisted domain");
            return Err(DyeMindError::Security(format!(
                "Network capabilities capped: domain not in allowlist for URL {}",
                url
            )));
        }

        Ok(self.client.get(url))
    }

    /// Exposes the inner `reqwest::Client` builder pattern safely for POST requests.
    pub fn post(&self, url: &str) -> Result<reqwest::RequestBuilder, DyeMindError> {
        if !self.is_allowed(url) {
            warn!(url = url, "Blocked POST to unlisted domain");
            return Err(DyeMindError::Security(format!(
                "Network capabilities capped: domain not in allowlist for URL {}",
                url
            )));
        }

        Ok(self.client.post(url))
    }
}
