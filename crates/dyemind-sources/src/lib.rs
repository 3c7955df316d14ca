//! dyemind-sources — Source connectors for the fluorophore aggregation
//! pipeline: encyclopedia (Wikipedia), chemical structure (PubChem) and
//! biomedical literature (PubMed), plus the PubMed record parser.
//!
//! Every connector returns a [`models::SourceResult`]; failures never
//! propagate past the connector boundary.

pub mod models;
pub mod parser;
pub mod sources;

pub use models::{
    EncyclopediaPayload, LiteraturePayload, LiteratureRecord, SourceResult, SourceTag,
    StructurePayload,
};
pub use sources::SourceConnector;
