//! Collaborators that enumerate documents and hand back their extracted text.
//!
//! The engine never keeps full document text after a build; snippet extraction
//! goes back to the source for each result.

use crate::error::{ExtractionError, SourceError};
use parking_lot::Mutex;
use std::borrow::Cow;
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub trait TextSource: Send + Sync {
    /// Identifiers of every document available for indexing.
    fn list_documents(&self) -> Result<Vec<String>, SourceError>;

    /// Full plain text of one document.
    fn extract_text(&self, id: &str) -> Result<String, ExtractionError>;
}

/// Plain-text files sitting directly inside one directory.
///
/// Identifiers are file names; only files with the configured extension are
/// listed, in lexicographic order.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    extension: String,
}

impl DirectorySource {
    pub fn new<P: AsRef<Path>>(root: P, extension: &str) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            extension: extension.trim_start_matches('.').to_ascii_lowercase(),
        }
    }

    fn has_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .map(|ext| ext.eq_ignore_ascii_case(&self.extension))
            .unwrap_or(false)
    }
}

impl TextSource for DirectorySource {
    fn list_documents(&self) -> Result<Vec<String>, SourceError> {
        let mut ids = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => {
                    return Err(SourceError::Listing {
                        root: self.root.display().to_string(),
                        source: err.into(),
                    });
                }
                Err(err) => {
                    tracing::warn!(root = %self.root.display(), error = %err, "unreadable directory entry");
                    // Listed anyway so the failed read is counted as a skipped document.
                    if let Some(name) = err.path().filter(|p| self.has_extension(p)).and_then(Path::file_name) {
                        ids.push(name.to_string_lossy().into_owned());
                    }
                    continue;
                }
            };
            if !entry.file_type().is_file() || !self.has_extension(entry.path()) {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if let Cow::Owned(_) = name {
                tracing::warn!(path = %entry.path().display(), "file name is not valid UTF-8");
            }
            ids.push(name.into_owned());
        }
        ids.sort();
        Ok(ids)
    }

    fn extract_text(&self, id: &str) -> Result<String, ExtractionError> {
        if id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\']) {
            return Err(ExtractionError::InvalidId(id.to_string()));
        }
        let bytes = fs::read(self.root.join(id)).map_err(|source| match source.kind() {
            ErrorKind::NotFound => ExtractionError::NotFound(id.to_string()),
            _ => ExtractionError::Io { id: id.to_string(), source },
        })?;
        String::from_utf8(bytes).map_err(|_| ExtractionError::Encoding(id.to_string()))
    }
}

/// Documents held in memory, listed in insertion order.
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    docs: Vec<(String, String)>,
}

impl MemorySource {
    pub fn new() -> Self { Self::default() }

    pub fn with_document(mut self, id: &str, text: &str) -> Self {
        self.insert(id, text);
        self
    }

    pub fn insert(&mut self, id: &str, text: &str) {
        match self.docs.iter_mut().find(|(d, _)| d == id) {
            Some((_, t)) => *t = text.to_string(),
            None => self.docs.push((id.to_string(), text.to_string())),
        }
    }

    pub fn remove(&mut self, id: &str) {
        self.docs.retain(|(d, _)| d != id);
    }
}

impl TextSource for MemorySource {
    fn list_documents(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.docs.iter().map(|(id, _)| id.clone()).collect())
    }

    fn extract_text(&self, id: &str) -> Result<String, ExtractionError> {
        self.docs
            .iter()
            .find(|(d, _)| d == id)
            .map(|(_, t)| t.clone())
            .ok_or_else(|| ExtractionError::NotFound(id.to_string()))
    }
}

/// Bounded FIFO cache of extracted text in front of another source.
///
/// A cache is tied to one built index; build a new `CachingSource` whenever the
/// index is rebuilt.
pub struct CachingSource<S> {
    inner: S,
    capacity: usize,
    cache: Mutex<TextCache>,
}

#[derive(Default)]
struct TextCache {
    texts: HashMap<String, String>,
    order: VecDeque<String>,
}

impl<S: TextSource> CachingSource<S> {
    pub fn new(inner: S, capacity: usize) -> Self {
        Self { inner, capacity, cache: Mutex::new(TextCache::default()) }
    }

    pub fn inner(&self) -> &S { &self.inner }

    pub fn cached(&self) -> usize { self.cache.lock().texts.len() }
}

impl<S: TextSource> TextSource for CachingSource<S> {
    fn list_documents(&self) -> Result<Vec<String>, SourceError> {
        self.inner.list_documents()
    }

    fn extract_text(&self, id: &str) -> Result<String, ExtractionError> {
        if self.capacity == 0 {
            return self.inner.extract_text(id);
        }
        if let Some(text) = self.cache.lock().texts.get(id) {
            return Ok(text.clone());
        }
        let text = self.inner.extract_text(id)?;
        let mut cache = self.cache.lock();
        if !cache.texts.contains_key(id) {
            while cache.order.len() >= self.capacity {
                match cache.order.pop_front() {
                    Some(old) => { cache.texts.remove(&old); }
                    None => break,
                }
            }
            cache.order.push_back(id.to_string());
            cache.texts.insert(id.to_string(), text.clone());
        }
        Ok(text)
    }
}
