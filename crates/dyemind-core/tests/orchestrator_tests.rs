//! End-to-end pipeline tests with mocked connectors and backends.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use dyemind_core::fusion::FUSION_FAILED;
use dyemind_core::orchestrator::{Orchestrator, INSUFFICIENT_DATA};
use dyemind_core::summarizer::SUMMARY_UNAVAILABLE;
use dyemind_core::{AbstractSummarizer, FusionSynthesizer};
use dyemind_llm::{LlmBackend, LlmError, LlmRequest, LlmResponse};
use dyemind_sources::models::{
    EncyclopediaPayload, LiteraturePayload, LiteratureRecord, SourceTag, StructurePayload,
};
use dyemind_sources::sources::SourceConnector;
use dyemind_sources::SourceResult;

// ── Mocks ────────────────────────────────────────────────────────────────────

struct StaticConnector<T: Clone + Send + Sync> {
    result: SourceResult<T>,
}

impl<T: Clone + Send + Sync> StaticConnector<T> {
    fn new(result: SourceResult<T>) -> Arc<Self> {
        Arc::new(Self { result })
    }
}

#[async_trait]
impl<T: Clone + Send + Sync> SourceConnector for StaticConnector<T> {
    type Payload = T;

    fn name(&self) -> &'static str {
        "static"
    }

    async fn fetch(&self, _query: &str) -> SourceResult<T> {
        self.result.clone()
    }
}

/// Echoes the last user message back, prefixed, so tests can verify which
/// text reached the backend.
struct EchoBackend;

#[async_trait]
impl LlmBackend for EchoBackend {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        let text = req
            .messages
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .map(|m| m.content.clone())
            .unwrap_or_default();
        Ok(LlmResponse {
            content: format!("echo: {}", text),
            model: "echo".to_string(),
            prompt_tokens: 0,
            completion_tokens: 0,
        })
    }

    fn model_id(&self) -> &str {
        "echo"
    }
}

struct FailingBackend;

#[async_trait]
impl LlmBackend for FailingBackend {
    async fn complete(&self, _req: LlmRequest) -> Result<LlmResponse, LlmError> {
        Err(LlmError::Unavailable("model loading".to_string()))
    }

    fn model_id(&self) -> &str {
        "failing"
    }
}

/// Records every request for later inspection.
struct CapturingBackend {
    requests: Mutex<Vec<LlmRequest>>,
    reply: String,
}

impl CapturingBackend {
    fn new(reply: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            reply: reply.into(),
        })
    }

    fn captured(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmBackend for CapturingBackend {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(req);
        Ok(LlmResponse {
            content: self.reply.clone(),
            model: "capturing".to_string(),
            prompt_tokens: 0,
            completion_tokens: 0,
        })
    }

    fn model_id(&self) -> &str {
        "capturing"
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

fn encyclopedia_payload() -> EncyclopediaPayload {
    EncyclopediaPayload {
        extract: "Rhodamine B is a chemical compound and a dye.".to_string(),
        canonical_url: Some("https://en.wikipedia.org/wiki/Rhodamine_B".to_string()),
    }
}

fn structure_payload() -> StructurePayload {
    StructurePayload {
        compound_id: "6689".to_string(),
        image_url: "https://pubchem.ncbi.nlm.nih.gov/image/imgsrv.fcgi?cid=6689&t=l".to_string(),
        canonical_smiles: "CCN(CC)C1=CC2=C(C=C1)".to_string(),
    }
}

fn record(title: &str, abstract_text: &str, doi: Option<&str>) -> LiteratureRecord {
    LiteratureRecord {
        title: title.to_string(),
        abstract_text: abstract_text.to_string(),
        doi: doi.map(str::to_string),
        ..Default::default()
    }
}

fn literature_payload() -> LiteraturePayload {
    LiteraturePayload {
        records: vec![
            record("Paper A", "Abstract A", Some("10.1000/a")),
            record("Paper B", "Abstract B", None),
            record("Paper C", "Abstract C", Some("10.1000/c")),
        ],
    }
}

fn orchestrator_with(
    encyclopedia: SourceResult<EncyclopediaPayload>,
    structure: SourceResult<StructurePayload>,
    literature: SourceResult<LiteraturePayload>,
    backend: Arc<dyn LlmBackend>,
) -> Orchestrator {
    Orchestrator::new(
        StaticConnector::new(encyclopedia),
        StaticConnector::new(structure),
        StaticConnector::new(literature),
        AbstractSummarizer::new(backend.clone(), None),
        FusionSynthesizer::new(backend, None),
        None,
    )
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_all_sources_succeed() {
    let orchestrator = orchestrator_with(
        SourceResult::Success(encyclopedia_payload()),
        SourceResult::Success(structure_payload()),
        SourceResult::Success(literature_payload()),
        Arc::new(EchoBackend),
    );

    let report = orchestrator.run("Rhodamine B").await;

    assert_eq!(report.query, "Rhodamine B");
    assert!(report.encyclopedia.is_some());
    assert!(report.structure.is_some());
    assert_eq!(report.literature.len(), 3);
    assert_eq!(report.sources.encyclopedia, SourceTag::Success);
    assert_eq!(report.sources.structure, SourceTag::Success);
    assert_eq!(report.sources.literature, SourceTag::Success);
    assert!(report.narrative.starts_with("echo: "));
}

#[tokio::test]
async fn test_summaries_preserve_record_order() {
    let orchestrator = orchestrator_with(
        SourceResult::Empty,
        SourceResult::Empty,
        SourceResult::Success(literature_payload()),
        Arc::new(EchoBackend),
    );

    let report = orchestrator.run("cyanine").await;

    let summaries: Vec<&str> = report.literature.iter().map(|i| i.summary.as_str()).collect();
    assert_eq!(
        summaries,
        vec!["echo: Abstract A", "echo: Abstract B", "echo: Abstract C"]
    );
}

#[tokio::test]
async fn test_doi_links_only_where_doi_present() {
    let orchestrator = orchestrator_with(
        SourceResult::Empty,
        SourceResult::Empty,
        SourceResult::Success(literature_payload()),
        Arc::new(EchoBackend),
    );

    let report = orchestrator.run("cyanine").await;

    assert_eq!(
        report.literature[0].doi_url.as_deref(),
        Some("https://doi.org/10.1000/a")
    );
    assert!(report.literature[1].doi_url.is_none());
    assert_eq!(
        report.literature[2].doi_url.as_deref(),
        Some("https://doi.org/10.1000/c")
    );
}

#[tokio::test]
async fn test_failed_source_degrades_without_aborting() {
    let orchestrator = orchestrator_with(
        SourceResult::Failed("upstream returned status 503".to_string()),
        SourceResult::Success(structure_payload()),
        SourceResult::Success(literature_payload()),
        Arc::new(EchoBackend),
    );

    let report = orchestrator.run("fluorescein").await;

    assert!(report.encyclopedia.is_none());
    assert!(report.structure.is_some());
    assert_eq!(
        report.sources.encyclopedia,
        SourceTag::Failed {
            reason: "upstream returned status 503".to_string()
        }
    );
    assert!(!report.narrative.is_empty());
}

#[tokio::test]
async fn test_fusion_prompt_embeds_extract_and_smiles() {
    let backend = CapturingBackend::new("narrative");
    let orchestrator = orchestrator_with(
        SourceResult::Success(encyclopedia_payload()),
        SourceResult::Success(structure_payload()),
        SourceResult::Empty,
        backend.clone(),
    );

    orchestrator.run("Rhodamine B").await;

    let requests = backend.captured();
    // No literature records means no summarizer calls; the single request
    // is the fusion call.
    assert_eq!(requests.len(), 1);
    let user = requests[0]
        .messages
        .iter()
        .find(|m| m.role == "user")
        .expect("fusion request has a user message");
    assert!(user.content.contains("Rhodamine B is a chemical compound"));
    assert!(user.content.contains("CCN(CC)C1=CC2=C(C=C1)"));
}

#[tokio::test]
async fn test_all_failed_substitutes_insufficient_data() {
    let orchestrator = orchestrator_with(
        SourceResult::Failed("timeout".to_string()),
        SourceResult::Failed("timeout".to_string()),
        SourceResult::Failed("timeout".to_string()),
        Arc::new(FailingBackend),
    );

    let report = orchestrator.run("zzqx").await;

    assert_eq!(report.narrative, INSUFFICIENT_DATA);
    assert!(report.literature.is_empty());
}

#[tokio::test]
async fn test_all_failed_but_fusion_succeeds_keeps_narrative() {
    let orchestrator = orchestrator_with(
        SourceResult::Failed("timeout".to_string()),
        SourceResult::Failed("timeout".to_string()),
        SourceResult::Failed("timeout".to_string()),
        Arc::new(EchoBackend),
    );

    let report = orchestrator.run("zzqx").await;

    assert_ne!(report.narrative, INSUFFICIENT_DATA);
    assert!(report.narrative.starts_with("echo: "));
}

#[tokio::test]
async fn test_backend_failure_yields_sentinels_not_errors() {
    let orchestrator = orchestrator_with(
        SourceResult::Success(encyclopedia_payload()),
        SourceResult::Success(structure_payload()),
        SourceResult::Success(literature_payload()),
        Arc::new(FailingBackend),
    );

    let report = orchestrator.run("Rhodamine B").await;

    for insight in &report.literature {
        assert_eq!(insight.summary, SUMMARY_UNAVAILABLE);
    }
    // Sources succeeded, so the fusion sentinel stands as-is.
    assert_eq!(report.narrative, FUSION_FAILED);
    assert!(report.encyclopedia.is_some());
}

#[tokio::test]
async fn test_empty_literature_produces_no_insights() {
    let orchestrator = orchestrator_with(
        SourceResult::Success(encyclopedia_payload()),
        SourceResult::Success(structure_payload()),
        SourceResult::Empty,
        Arc::new(EchoBackend),
    );

    let report = orchestrator.run("Rhodamine B").await;

    assert!(report.literature.is_empty());
    assert_eq!(report.sources.literature, SourceTag::Empty);
}

#[tokio::test]
async fn test_query_is_trimmed() {
    let orchestrator = orchestrator_with(
        SourceResult::Empty,
        SourceResult::Empty,
        SourceResult::Empty,
        Arc::new(EchoBackend),
    );

    let report = orchestrator.run("  Rhodamine B  ").await;
    assert_eq!(report.query, "Rhodamine B");
}

#[tokio::test]
async fn test_download_text_carries_narrative_and_citations() {
    let orchestrator = orchestrator_with(
        SourceResult::Success(encyclopedia_payload()),
        SourceResult::Success(structure_payload()),
        SourceResult::Success(literature_payload()),
        Arc::new(EchoBackend),
    );

    let report = orchestrator.run("Rhodamine B").await;
    let text = report.download_text();

    assert!(text.contains(&report.narrative));
    assert!(text.contains("https://en.wikipedia.org/wiki/Rhodamine_B"));
    assert!(text.contains("PubChem CID 6689"));
    assert!(text.contains("Paper A"));
    assert!(text.contains("https://doi.org/10.1000/a"));
}
