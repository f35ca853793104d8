use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Stable identity of an indexed document. Allocated from a monotone counter
/// and never reused within one engine instance, so removing and re-adding
/// equal text yields a distinct id.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct NodeId(pub(crate) u64);

/// One indexed document: its text, the term-frequency mapping extracted at
/// add time, its category labels, and the reduced-space vector cached by the
/// last `build_index`.
///
/// Nodes never compute similarity themselves; all geometry lives in the
/// engine. The category list is plain metadata and may be edited in place
/// without invalidating the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentNode {
    text: String,
    #[serde(with = "indexmap::map::serde_seq")]
    term_counts: IndexMap<String, u32>,
    categories: Vec<String>,
    /// Row of U·Σ restricted to the retained rank. Valid only between
    /// rebuilds.
    semantic: Option<Vec<f64>>,
    /// Unit-normalized copy of `semantic`, so cosine similarity is a plain
    /// dot product.
    semantic_unit: Option<Vec<f64>>,
}

impl ContentNode {
    pub(crate) fn new(
        text: String,
        term_counts: IndexMap<String, u32>,
        categories: Vec<String>,
    ) -> Self {
        ContentNode {
            text,
            term_counts,
            categories,
            semantic: None,
            semantic_unit: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn term_counts(&self) -> &IndexMap<String, u32> {
        &self.term_counts
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn categories_mut(&mut self) -> &mut Vec<String> {
        &mut self.categories
    }

    /// The document's position in the reduced semantic space, if the index
    /// has been built since this node was added.
    pub fn semantic_vector(&self) -> Option<&[f64]> {
        self.semantic.as_deref()
    }

    pub(crate) fn semantic_unit(&self) -> Option<&[f64]> {
        self.semantic_unit.as_deref()
    }

    pub(crate) fn set_semantic_vector(&mut self, vector: Vec<f64>) {
        self.semantic_unit = Some(super::unit(&vector));
        self.semantic = Some(vector);
    }

    pub(crate) fn clear_semantic(&mut self) {
        self.semantic = None;
        self.semantic_unit = None;
    }
}
