use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The set of distinct terms observed across all indexed documents, each
/// assigned a stable column index.
///
/// Indices are stable within one build cycle; `build_index` recomputes the
/// vocabulary from scratch, so indices may be renumbered across rebuilds.
/// Raw indices never escape the engine's public API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vocabulary {
    #[serde(with = "indexmap::map::serde_seq")]
    terms: IndexMap<String, usize>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Vocabulary::default()
    }

    /// Column index for a term, assigning the next free index on first sight.
    pub fn term_index(&mut self, term: &str) -> usize {
        if let Some(index) = self.terms.get(term) {
            return *index;
        }
        let index = self.terms.len();
        self.terms.insert(term.to_string(), index);
        index
    }

    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.terms.get(term).copied()
    }

    pub fn term_at(&self, index: usize) -> Option<&str> {
        self.terms.get_index(index).map(|(term, _)| term.as_str())
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn clear(&mut self) {
        self.terms.clear();
    }
}
