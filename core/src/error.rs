use std::io;
use thiserror::Error;

/// Failure to obtain a document's text from a [`crate::TextSource`].
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("failed to read {id}: {source}")]
    Io {
        id: String,
        #[source]
        source: io::Error,
    },
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("invalid document id: {0}")]
    InvalidId(String),
    #[error("document is not valid UTF-8: {0}")]
    Encoding(String),
}

/// Failure to enumerate the documents of a source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to list documents under {root}: {source}")]
    Listing {
        root: String,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("query contains no terms")]
pub struct InvalidQuery;
