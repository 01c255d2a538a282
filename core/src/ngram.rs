use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// One to three consecutive tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NGram {
    Uni(String),
    Bi(String, String),
    Tri(String, String, String),
}

impl fmt::Display for NGram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NGram::Uni(a) => write!(f, "{a}"),
            NGram::Bi(a, b) => write!(f, "{a} {b}"),
            NGram::Tri(a, b, c) => write!(f, "{a} {b} {c}"),
        }
    }
}

/// Corpus-wide unigram, bigram and trigram counts.
#[derive(Debug, Default)]
pub struct NGramTable {
    counts: HashMap<NGram, u64>,
}

impl NGramTable {
    pub fn new() -> Self { Self::default() }

    /// Count every unigram, bigram and trigram starting at each position of `tokens`.
    pub fn count_ngrams<S: AsRef<str>>(&mut self, tokens: &[S]) {
        for (i, tok) in tokens.iter().enumerate() {
            let a = tok.as_ref();
            self.bump(NGram::Uni(a.to_string()));
            if let Some(b) = tokens.get(i + 1) {
                self.bump(NGram::Bi(a.to_string(), b.as_ref().to_string()));
                if let Some(c) = tokens.get(i + 2) {
                    self.bump(NGram::Tri(a.to_string(), b.as_ref().to_string(), c.as_ref().to_string()));
                }
            }
        }
    }

    fn bump(&mut self, gram: NGram) {
        *self.counts.entry(gram).or_insert(0) += 1;
    }

    pub fn count(&self, gram: &NGram) -> u64 {
        self.counts.get(gram).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize { self.counts.len() }

    pub fn is_empty(&self) -> bool { self.counts.is_empty() }

    /// Rendered n-grams starting with `prefix`, deduplicated and sorted
    /// lexicographically. `prefix` is expected to be lowercase already.
    pub fn complete(&self, prefix: &str) -> Vec<String> {
        let matches: BTreeSet<String> = self
            .counts
            .keys()
            .map(NGram::to_string)
            .filter(|rendered| rendered.starts_with(prefix))
            .collect();
        matches.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uni(a: &str) -> NGram { NGram::Uni(a.into()) }
    fn bi(a: &str, b: &str) -> NGram { NGram::Bi(a.into(), b.into()) }
    fn tri(a: &str, b: &str, c: &str) -> NGram { NGram::Tri(a.into(), b.into(), c.into()) }

    #[test]
    fn counts_all_orders() {
        let mut t = NGramTable::new();
        t.count_ngrams(&["a", "b", "c"]);
        assert_eq!(t.count(&uni("a")), 1);
        assert_eq!(t.count(&uni("c")), 1);
        assert_eq!(t.count(&bi("a", "b")), 1);
        assert_eq!(t.count(&bi("b", "c")), 1);
        assert_eq!(t.count(&tri("a", "b", "c")), 1);
        assert_eq!(t.len(), 6);
    }

    #[test]
    fn counts_accumulate_across_calls() {
        let mut t = NGramTable::new();
        t.count_ngrams(&["x", "y"]);
        t.count_ngrams(&["x", "y", "x"]);
        assert_eq!(t.count(&uni("x")), 3);
        assert_eq!(t.count(&bi("x", "y")), 2);
        assert_eq!(t.count(&bi("y", "x")), 1);
        assert_eq!(t.count(&tri("x", "y", "x")), 1);
    }

    #[test]
    fn short_sequences() {
        let mut t = NGramTable::new();
        t.count_ngrams::<&str>(&[]);
        assert!(t.is_empty());
        t.count_ngrams(&["solo"]);
        assert_eq!(t.len(), 1);
        assert_eq!(t.count(&uni("solo")), 1);
    }

    #[test]
    fn complete_is_sorted_and_deduplicated() {
        let mut t = NGramTable::new();
        for _ in 0..5 {
            t.count_ngrams(&["owner", "ship", "own"]);
        }
        assert_eq!(
            t.complete("own"),
            vec!["own", "owner", "owner ship", "owner ship own"]
        );
        assert!(t.complete("zzz").is_empty());
    }
}
