pub mod corpus;
pub mod error;
pub mod index;
pub mod ngram;
pub mod query;
pub mod source;
pub mod tokenizer;

pub use corpus::{CorpusIndex, IndexStats};
pub use error::{ExtractionError, InvalidQuery, SourceError};
pub use index::{DocId, InvertedIndex};
pub use ngram::{NGram, NGramTable};
pub use query::{Query, QueryEngine, SearchResult, Snippet};
pub use source::{CachingSource, DirectorySource, MemorySource, TextSource};
