use std::collections::HashMap;

/// Dense internal document number, assigned in build order.
pub type DocId = u32;

/// Term -> document occurrences.
///
/// Every occurrence of a term appends one entry to that term's list, so the
/// number of entries equal to a given `DocId` is the term frequency of the term
/// in that document. Lists are ordered by document, then by position.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    postings: HashMap<String, Vec<DocId>>,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    /// Append `doc_id` once per token. Indexing the same document twice counts its
    /// occurrences twice.
    pub fn index_document<'a, I>(&mut self, doc_id: DocId, tokens: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for token in tokens {
            match self.postings.get_mut(token) {
                Some(list) => list.push(doc_id),
                None => { self.postings.insert(token.to_string(), vec![doc_id]); }
            }
        }
    }

    pub fn occurrences(&self, term: &str) -> Option<&[DocId]> {
        self.postings.get(term).map(Vec::as_slice)
    }

    pub fn contains_term(&self, term: &str) -> bool { self.postings.contains_key(term) }

    pub fn num_terms(&self) -> usize { self.postings.len() }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.postings.keys().map(String::as_str)
    }
}
