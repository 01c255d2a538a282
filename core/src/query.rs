//! Read-only queries against a built [`CorpusIndex`].

use crate::corpus::CorpusIndex;
use crate::error::InvalidQuery;
use crate::index::DocId;
use crate::source::TextSource;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Lines of context kept on each side of a matching line.
const CONTEXT_LINES: usize = 2;

/// Lowercased, whitespace-split query terms. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    terms: Vec<String>,
}

impl Query {
    /// Duplicates are kept and no stopwords are removed; a query without any
    /// non-whitespace term is rejected.
    pub fn parse(raw: &str) -> Result<Self, InvalidQuery> {
        let terms: Vec<String> = raw.to_lowercase().split_whitespace().map(str::to_string).collect();
        if terms.is_empty() {
            return Err(InvalidQuery);
        }
        Ok(Self { terms })
    }

    pub fn terms(&self) -> &[String] { &self.terms }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snippet {
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub document_id: String,
    pub match_percentage: f64,
    pub matches: Vec<Snippet>,
}

/// Query operations over a corpus index and the source its text came from.
pub struct QueryEngine<'a, S: ?Sized> {
    corpus: &'a CorpusIndex,
    source: &'a S,
}

impl<'a, S: TextSource + ?Sized> QueryEngine<'a, S> {
    pub fn new(corpus: &'a CorpusIndex, source: &'a S) -> Self {
        Self { corpus, source }
    }

    /// Rank documents by total occurrences of the query terms.
    ///
    /// A document is credited once per occurrence of every query term (repeated
    /// query terms count again), and the score is capped at 100.
    pub fn search(&self, query: &Query) -> Vec<SearchResult> {
        let index = self.corpus.inverted_index();
        let mut counts: BTreeMap<DocId, usize> = BTreeMap::new();
        for term in query.terms() {
            if let Some(list) = index.occurrences(term) {
                for &doc in list {
                    *counts.entry(doc).or_insert(0) += 1;
                }
            }
        }

        let n = query.terms().len() as f64;
        let scored = counts
            .into_iter()
            .map(|(doc, count)| (doc, (count as f64 / n * 100.0).min(100.0)));
        self.rank(scored, query)
    }

    /// Rank documents by how many query terms they contain at all.
    pub fn alternative_search(&self, query: &Query) -> Vec<SearchResult> {
        let index = self.corpus.inverted_index();
        let per_term: Vec<BTreeSet<DocId>> = query
            .terms()
            .iter()
            .map(|term| index.occurrences(term).map(|l| l.iter().copied().collect::<BTreeSet<DocId>>()).unwrap_or_default())
            .collect();
        let matched: BTreeSet<DocId> = per_term.iter().flatten().copied().collect();

        let n = query.terms().len() as f64;
        let scored = matched.into_iter().map(|doc| {
            let distinct = per_term.iter().filter(|docs| docs.contains(&doc)).count();
            (doc, distinct as f64 / n * 100.0)
        });
        self.rank(scored, query)
    }

    /// Rendered n-grams starting with the lowercased `prefix`, sorted lexicographically.
    pub fn autocomplete(&self, prefix: &str) -> Vec<String> {
        let suggestions = self.corpus.ngrams().complete(&prefix.to_lowercase());
        tracing::debug!(prefix, count = suggestions.len(), "autocomplete");
        suggestions
    }

    /// Windows of surrounding lines for each line that contains a query term as a
    /// substring. Overlapping windows are all kept. A document whose text can no
    /// longer be fetched has no snippets.
    pub fn context_matches(&self, document_id: &str, terms: &[String]) -> Vec<Snippet> {
        let text = match self.source.extract_text(document_id) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(document = document_id, error = %err, "snippet text unavailable");
                return Vec::new();
            }
        };

        let lines = split_lines(&text);
        lines
            .iter()
            .enumerate()
            .filter(|(_, line)| {
                let lower = line.to_lowercase();
                terms.iter().any(|t| lower.contains(t.as_str()))
            })
            .map(|(i, _)| {
                let start = i.saturating_sub(CONTEXT_LINES);
                let end = (i + CONTEXT_LINES + 1).min(lines.len());
                Snippet { context: lines[start..end].join(" ") }
            })
            .collect()
    }

    fn rank<I>(&self, scored: I, query: &Query) -> Vec<SearchResult>
    where
        I: Iterator<Item = (DocId, f64)>,
    {
        // `scored` arrives in DocId order, and the stable sort keeps it for ties.
        let mut ranked: Vec<(DocId, f64)> = scored.collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked
            .into_iter()
            .filter_map(|(doc, pct)| {
                let name = self.corpus.document_name(doc)?;
                Some(SearchResult {
                    document_id: name.to_string(),
                    match_percentage: pct,
                    matches: self.context_matches(name, query.terms()),
                })
            })
            .collect()
    }
}

/// Split on every line boundary (`\n`, `\r\n`, `\r`, form feed, vertical tab,
/// file/group/record separators, NEL, LS, PS). A trailing boundary does not
/// produce an empty last line.
fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let boundary = matches!(
            c,
            '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
        );
        if !boundary {
            continue;
        }
        lines.push(&text[start..i]);
        let mut next = i + c.len_utf8();
        if c == '\r' {
            if let Some(&(j, '\n')) = chars.peek() {
                chars.next();
                next = j + 1;
            }
        }
        start = next;
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}
