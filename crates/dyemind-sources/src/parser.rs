//! PubMed efetch XML parser.
//!
//! Turns a `<PubmedArticleSet>` document into an ordered sequence of
//! [`LiteratureRecord`]s. Records are never dropped for missing fields;
//! missing title/abstract/journal fall back to the documented sentinels.
//! Output order follows document order, which efetch guarantees to match
//! the requested identifier order.

use quick_xml::events::Event;
use quick_xml::Reader;

use dyemind_common::error::DyeMindError;

use crate::models::{
    LiteratureRecord, MAX_DISPLAY_AUTHORS, NO_ABSTRACT, NO_TITLE, UNKNOWN_JOURNAL,
};

#[derive(Default)]
struct RecordBuilder {
    title: Option<String>,
    abstract_text: Option<String>,
    journal: Option<String>,
    authors: Vec<String>,
    doi: Option<String>,
}

impl RecordBuilder {
    /// Authors lacking a last name are skipped before this point, so the
    /// truncation operates on the already-filtered list.
    fn build(mut self) -> LiteratureRecord {
        self.authors.truncate(MAX_DISPLAY_AUTHORS);
        LiteratureRecord {
            title: self.title.unwrap_or_else(|| NO_TITLE.to_string()),
            abstract_text: self.abstract_text.unwrap_or_else(|| NO_ABSTRACT.to_string()),
            journal: self.journal.unwrap_or_else(|| UNKNOWN_JOURNAL.to_string()),
            authors: self.authors,
            doi: self.doi,
        }
    }
}

/// Parse PubMed XML (efetch abstract mode) into an ordered record list.
/// Handles the `<PubmedArticleSet><PubmedArticle>` structure.
pub fn parse_pubmed_xml(xml: &str) -> Result<Vec<LiteratureRecord>, DyeMindError> {
    let mut records = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    // State machine for XML parsing
    let mut current: Option<RecordBuilder> = None;
    let mut in_title     = false;
    let mut in_abstract  = false;
    let mut in_author    = false;
    let mut in_last_name = false;
    let mut in_fore_name = false;
    let mut in_journal   = false;
    let mut in_doi       = false;
    let mut current_last = String::new();
    let mut current_fore = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let record_open = current.is_some();
                match e.name().as_ref() {
                    b"PubmedArticle" => current = Some(RecordBuilder::default()),
                    b"ArticleTitle" if record_open => in_title = true,
                    b"AbstractText" if record_open => in_abstract = true,
                    b"Author" if record_open => {
                        in_author = true;
                        current_last.clear();
                        current_fore.clear();
                    }
                    b"LastName" if in_author => in_last_name = true,
                    b"ForeName" if in_author => in_fore_name = true,
                    b"Title" if record_open => in_journal = true,
                    b"ArticleId" if record_open => {
                        // First identifier of kind "doi" wins
                        let is_doi = e
                            .try_get_attribute("IdType")
                            .map_err(|err| DyeMindError::Xml(err.to_string()))?
                            .map(|attr| attr.unescape_value().unwrap_or_default() == "doi")
                            .unwrap_or(false);
                        if is_doi {
                            in_doi = true;
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) => {
                let text = e.unescape().unwrap_or_default().to_string();
                if let Some(ref mut rec) = current {
                    if in_title && rec.title.is_none() {
                        rec.title = Some(text.clone());
                    }
                    if in_abstract && rec.abstract_text.is_none() {
                        rec.abstract_text = Some(text.clone());
                    }
                    if in_journal && rec.journal.is_none() {
                        rec.journal = Some(text.clone());
                    }
                    if in_doi && rec.doi.is_none() {
                        rec.doi = Some(text.clone());
                    }
                    if in_last_name {
                        current_last = text.clone();
                    }
                    if in_fore_name {
                        current_fore = text.clone();
                    }
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"ArticleTitle" => in_title = false,
                b"AbstractText" => in_abstract = false,
                b"LastName"     => in_last_name = false,
                b"ForeName"     => in_fore_name = false,
                b"Title"        => in_journal = false,
                b"ArticleId"    => in_doi = false,
                b"Author" => {
                    if in_author {
                        if let Some(ref mut rec) = current {
                            // An author entry without a last name is skipped,
                            // not defaulted.
                            if !current_last.is_empty() {
                                let name = if current_fore.is_empty() {
                                    current_last.clone()
                                } else {
                                    format!("{} {}", current_last, current_fore)
                                };
                                rec.authors.push(name);
                            }
                        }
                        in_author = false;
                    }
                }
                b"PubmedArticle" => {
                    if let Some(rec) = current.take() {
                        records.push(rec.build());
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(DyeMindError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(records)
}
