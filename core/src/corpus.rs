use crate::error::{ExtractionError, SourceError};
use crate::index::{DocId, InvertedIndex};
use crate::ngram::NGramTable;
use crate::source::TextSource;
use crate::tokenizer::tokenize;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

const VOCABULARY_SAMPLE: usize = 50;

/// Inverted index, n-gram table and vocabulary for one corpus snapshot.
///
/// Built once, then only read. Build a fresh value for every snapshot; feeding
/// the same documents twice double-counts them.
#[derive(Debug, Default)]
pub struct CorpusIndex {
    index: InvertedIndex,
    ngrams: NGramTable,
    vocabulary: BTreeSet<String>,
    docs: Vec<String>,
    doc_ids: HashMap<String, DocId>,
    skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub documents: usize,
    pub skipped: usize,
    pub unique_terms: usize,
    pub ngrams: usize,
}

impl CorpusIndex {
    pub fn new() -> Self { Self::default() }

    /// Build from `(identifier, extraction result)` pairs. Failed extractions are
    /// logged and skipped.
    pub fn build<I>(documents: I) -> Self
    where
        I: IntoIterator<Item = (String, Result<String, ExtractionError>)>,
    {
        tracing::info!("building corpus index");
        let mut corpus = Self::new();
        for (id, text) in documents {
            match text {
                Ok(text) => {
                    if !corpus.add_document(id, &text) {
                        corpus.skipped += 1;
                    }
                }
                Err(err) => {
                    tracing::error!(document = %id, error = %err, "skipping document");
                    corpus.skipped += 1;
                }
            }
        }
        corpus.log_summary();
        corpus
    }

    /// Enumerate `source` and build from every document it lists.
    pub fn from_source<S: TextSource + ?Sized>(source: &S) -> Result<Self, SourceError> {
        let ids = source.list_documents()?;
        Ok(Self::build(ids.into_iter().map(|id| {
            let text = source.extract_text(&id);
            (id, text)
        })))
    }

    /// Returns `false` when the document could not be given a `DocId`.
    fn add_document(&mut self, id: String, text: &str) -> bool {
        let Some(doc_id) = next_doc_id(self.docs.len()) else {
            tracing::error!(document = %id, "document id space exhausted, skipping document");
            return false;
        };
        let tokens = tokenize(text).to_vec();
        tracing::debug!(document = %id, tokens = tokens.len(), "indexing document");

        self.index.index_document(doc_id, tokens.iter().map(String::as_str));
        self.ngrams.count_ngrams(tokens.as_slice());
        self.vocabulary.extend(tokens);
        self.doc_ids.insert(id.clone(), doc_id);
        self.docs.push(id);
        true
    }

    fn log_summary(&self) {
        let stats = self.stats();
        tracing::info!(
            documents = stats.documents,
            skipped = stats.skipped,
            unique_words = self.vocabulary.len(),
            ngrams = stats.ngrams,
            "index built"
        );
        tracing::info!(sample = ?self.vocabulary_sample(VOCABULARY_SAMPLE), "sample indexed words");
    }

    pub fn inverted_index(&self) -> &InvertedIndex { &self.index }

    pub fn ngrams(&self) -> &NGramTable { &self.ngrams }

    pub fn vocabulary(&self) -> &BTreeSet<String> { &self.vocabulary }

    /// First `n` words of the vocabulary in lexicographic order.
    pub fn vocabulary_sample(&self, n: usize) -> Vec<&str> {
        self.vocabulary.iter().take(n).map(String::as_str).collect()
    }

    /// Identifiers of indexed documents in build order.
    pub fn documents(&self) -> &[String] { &self.docs }

    pub fn document_name(&self, doc_id: DocId) -> Option<&str> {
        self.docs.get(doc_id as usize).map(String::as_str)
    }

    pub fn doc_id(&self, name: &str) -> Option<DocId> { self.doc_ids.get(name).copied() }

    pub fn contains_document(&self, name: &str) -> bool { self.doc_ids.contains_key(name) }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            documents: self.docs.len(),
            skipped: self.skipped,
            unique_terms: self.index.num_terms(),
            ngrams: self.ngrams.len(),
        }
    }
}

fn next_doc_id(assigned: usize) -> Option<DocId> {
    DocId::try_from(assigned).ok()
}
