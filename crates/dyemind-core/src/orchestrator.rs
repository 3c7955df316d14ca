//! Aggregation orchestrator — fan-out over the three source connectors,
//! literature expansion, fusion, response assembly.
//!
//! There is no failure path that aborts a request: every individual
//! failure degrades to an omitted section or a sentinel value and the
//! orchestrator always returns a completed report.

use std::sync::Arc;

use futures_util::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use dyemind_llm::{LlmBackend, LlmRequest};
use dyemind_sources::models::{
    EncyclopediaPayload, LiteraturePayload, LiteratureRecord, SourceTag, StructurePayload,
};
use dyemind_sources::sources::{
    PubChemConnector, PubMedConnector, SourceConnector, WikipediaConnector,
};

use crate::config::{build_backend, CoreConfig};
use crate::fusion::{FusionSynthesizer, FUSION_FAILED};
use crate::summarizer::AbstractSummarizer;

/// Fixed narrative substituted when every source failed and generation
/// could not produce a degraded narrative either.
pub const INSUFFICIENT_DATA: &str =
    "Insufficient data: none of the configured sources answered for this query.";

pub type EncyclopediaSource = dyn SourceConnector<Payload = EncyclopediaPayload>;
pub type StructureSource = dyn SourceConnector<Payload = StructurePayload>;
pub type LiteratureSource = dyn SourceConnector<Payload = LiteraturePayload>;

/// One literature record with its generated summary and presentation data.
#[derive(Debug, Clone, Serialize)]
pub struct LiteratureInsight {
    pub record: LiteratureRecord,
    pub summary: String,
    /// Hyperlink target, omitted when the record carries no DOI.
    pub doi_url: Option<String>,
}

/// Per-source outcome tags, exposed for programmatic callers alongside the
/// human-readable narrative sentinels.
#[derive(Debug, Clone, Serialize)]
pub struct SourceTags {
    pub encyclopedia: SourceTag,
    pub structure: SourceTag,
    pub literature: SourceTag,
}

/// The assembled response for one query. Created fresh per request and
/// discarded once delivered.
#[derive(Debug, Clone, Serialize)]
pub struct CompoundReport {
    pub query: String,
    pub narrative: String,
    pub encyclopedia: Option<EncyclopediaPayload>,
    pub structure: Option<StructurePayload>,
    pub literature: Vec<LiteratureInsight>,
    pub sources: SourceTags,
}

impl CompoundReport {
    /// Download-ready copy of the narrative with a source footer.
    pub fn download_text(&self) -> String {
        let mut out = format!("DyeMind report: {}\n\n{}\n", self.query, self.narrative);
        if let Some(enc) = &self.encyclopedia {
            if let Some(url) = &enc.canonical_url {
                out.push_str(&format!("\nEncyclopedia: {}\n", url));
            }
        }
        if let Some(s) = &self.structure {
            out.push_str(&format!("\nPubChem CID {}: {}\n", s.compound_id, s.canonical_smiles));
        }
        for insight in &self.literature {
            out.push_str(&format!("\n- {} ({})", insight.record.title, insight.record.journal));
            if let Some(doi) = &insight.doi_url {
                out.push_str(&format!(" {}", doi));
            }
        }
        out
    }
}

/// Optional AI rewrite of the user query into connector-friendly keywords.
/// Any failure falls back to the raw query.
pub struct QueryRefiner {
    backend: Arc<dyn LlmBackend>,
    model: Option<String>,
}

impl QueryRefiner {
    pub fn new(backend: Arc<dyn LlmBackend>, model: Option<String>) -> Self {
        Self { backend, model }
    }

    pub async fn refine(&self, query: &str) -> String {
        let mut req = LlmRequest::user_text(format!(
            "Rewrite this fluorophore search query as short keywords suitable \
             for encyclopedia and literature lookups. Answer with the keywords \
             only.\n\nQuery: {}",
            query
        ));
        if let Some(model) = &self.model {
            req = req.with_model(model.clone());
        }

        match self.backend.complete(req).await {
            Ok(resp) if !resp.content.trim().is_empty() => resp.content.trim().to_string(),
            Ok(_) => query.to_string(),
            Err(e) => {
                warn!(error = %e, "Query refinement failed, using raw query");
                query.to_string()
            }
        }
    }
}

pub struct Orchestrator {
    encyclopedia: Arc<EncyclopediaSource>,
    structure: Arc<StructureSource>,
    literature: Arc<LiteratureSource>,
    summarizer: AbstractSummarizer,
    fusion: FusionSynthesizer,
    refiner: Option<QueryRefiner>,
}

impl Orchestrator {
    pub fn new(
        encyclopedia: Arc<EncyclopediaSource>,
        structure: Arc<StructureSource>,
        literature: Arc<LiteratureSource>,
        summarizer: AbstractSummarizer,
        fusion: FusionSynthesizer,
        refiner: Option<QueryRefiner>,
    ) -> Self {
        Self {
            encyclopedia,
            structure,
            literature,
            summarizer,
            fusion,
            refiner,
        }
    }

    /// Wire up the real connectors and backend from configuration.
    pub fn from_config(config: &CoreConfig) -> anyhow::Result<Self> {
        let timeout = config.per_source_timeout();
        let backend = build_backend(config)?;

        let encyclopedia = Arc::new(WikipediaConnector::new(timeout)?);
        let structure = Arc::new(PubChemConnector::new(timeout)?);
        let literature = Arc::new(PubMedConnector::new(
            timeout,
            config.search_result_cap,
            config.ncbi_api_key.clone(),
        )?);

        let summarizer =
            AbstractSummarizer::new(backend.clone(), Some(config.summarize_model.clone()));
        let fusion = FusionSynthesizer::new(backend.clone(), Some(config.fusion_model.clone()));
        let refiner = config
            .refine_queries
            .then(|| QueryRefiner::new(backend, Some(config.answer_model.clone())));

        Ok(Self::new(
            encyclopedia,
            structure,
            literature,
            summarizer,
            fusion,
            refiner,
        ))
    }

    /// Run the full pipeline for one query. Always completes.
    pub async fn run(&self, query: &str) -> CompoundReport {
        let query = query.trim();

        let effective_query = match &self.refiner {
            Some(refiner) => refiner.refine(query).await,
            None => query.to_string(),
        };
        if effective_query != query {
            debug!(raw = query, refined = %effective_query, "Query refined");
        }

        // Fan-out: the three connectors are mutually independent, so
        // end-to-end latency is bounded by the slowest source.
        let (encyclopedia, structure, literature) = tokio::join!(
            self.encyclopedia.fetch(&effective_query),
            self.structure.fetch(&effective_query),
            self.literature.fetch(&effective_query),
        );

        info!(
            query = query,
            encyclopedia = ?encyclopedia.tag(),
            structure = ?structure.tag(),
            literature = ?literature.tag(),
            "Source fan-out complete"
        );

        // Literature expansion: summarize each abstract; join_all keeps
        // search relevance order regardless of completion order.
        let records: Vec<LiteratureRecord> = literature
            .payload()
            .map(|p| p.records.clone())
            .unwrap_or_default();
        let summaries: Vec<String> = join_all(
            records
                .iter()
                .map(|r| self.summarizer.summarize(&r.abstract_text)),
        )
        .await;

        let extract = encyclopedia.payload().map(|p| p.extract.as_str()).unwrap_or("");
        let smiles = structure
            .payload()
            .map(|p| p.canonical_smiles.as_str())
            .unwrap_or("");

        let mut narrative = self.fusion.fuse(extract, smiles, &summaries).await;

        let all_failed =
            encyclopedia.is_failed() && structure.is_failed() && literature.is_failed();
        if all_failed && narrative == FUSION_FAILED {
            narrative = INSUFFICIENT_DATA.to_string();
        }

        let insights: Vec<LiteratureInsight> = records
            .into_iter()
            .zip(summaries)
            .map(|(record, summary)| LiteratureInsight {
                doi_url: record.doi.as_ref().map(|d| format!("https://doi.org/{}", d)),
                record,
                summary,
            })
            .collect();

        let sources = SourceTags {
            encyclopedia: encyclopedia.tag(),
            structure: structure.tag(),
            literature: literature.tag(),
        };

        CompoundReport {
            query: query.to_string(),
            narrative,
            encyclopedia: match encyclopedia {
                dyemind_sources::SourceResult::Success(p) => Some(p),
                _ => None,
            },
            structure: match structure {
                dyemind_sources::SourceResult::Success(p) => Some(p),
                _ => None,
            },
            literature: insights,
            sources,
        }
    }
}
