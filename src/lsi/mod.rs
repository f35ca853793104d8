//! Latent semantic indexing engine.
//!
//! Documents are indexed as rows of a term-document matrix, decomposed with
//! SVD, and projected into a rank-reduced semantic space in which cosine
//! similarity captures topical association rather than surface term overlap.

pub mod node;
pub mod serde;
mod svd;
pub mod vocabulary;

use std::fmt;

use ::serde::{Deserialize, Serialize};
use indexmap::IndexMap;
use log::{debug, trace};
use nalgebra::{DMatrix, DVector};

use crate::error::Error;
use crate::extractor::{self, ExtractorConfig};

pub use node::{ContentNode, NodeId};
pub use vocabulary::Vocabulary;

/// Dimensionality-reduction policy applied to the singular value spectrum
/// after decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RankCutoff {
    /// Keep singular values at or above this fraction of the largest one.
    Fraction(f64),
    /// Keep a fixed number of leading singular values.
    Count(usize),
}

impl Default for RankCutoff {
    fn default() -> Self {
        RankCutoff::Fraction(0.5)
    }
}

impl RankCutoff {
    /// Retained rank for a descending spectrum. At least one dimension is
    /// always kept.
    fn select(&self, singular: &[f64]) -> usize {
        let available = singular.len();
        let rank = match *self {
            RankCutoff::Count(count) => count,
            RankCutoff::Fraction(fraction) => {
                let largest = singular.first().copied().unwrap_or(0.0);
                let threshold = largest * fraction;
                singular.iter().take_while(|s| **s >= threshold).count()
            }
        };
        rank.max(1).min(available.max(1))
    }
}

/// Engine configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LsiConfig {
    /// Whether mutating operations and queries implicitly trigger
    /// `build_index`. Off, callers control rebuild timing themselves and
    /// queries run against the last built snapshot.
    pub auto_rebuild: bool,
    pub rank_cutoff: RankCutoff,
    pub extractor: ExtractorConfig,
}

impl Default for LsiConfig {
    fn default() -> Self {
        LsiConfig {
            auto_rebuild: true,
            rank_cutoff: RankCutoff::default(),
            extractor: ExtractorConfig::default(),
        }
    }
}

/// Ranked hits from a similarity query: (node id, cosine score).
#[derive(Clone)]
pub struct Hits {
    pub list: Vec<(NodeId, f64)>,
}

impl Hits {
    pub fn new(list: Vec<(NodeId, f64)>) -> Self {
        Hits { list }
    }

    /// Sort by descending score. NaN scores are removed; equal scores keep
    /// insertion order (the sort is stable).
    pub fn sort_by_score(&mut self) -> &mut Self {
        self.list.retain(|(_, score)| !score.is_nan());
        self.list.sort_by(|a, b| b.1.total_cmp(&a.1));
        self
    }
}

impl fmt::Debug for Hits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Hits [")?;
            for (id, score) in &self.list {
                writeln!(f, "    {:?}: {:.6}", id, score)?;
            }
            write!(f, "]")
        } else {
            f.debug_list().entries(&self.list).finish()
        }
    }
}

/// The LSI engine: owns the vocabulary and the arena of content nodes,
/// assembles the term-document matrix, consumes the SVD primitive and
/// answers search/classification/ranking queries in the reduced space.
///
/// State machine: `Empty -> Dirty` on any add/remove, `Dirty -> Built` on
/// `build_index`, back to `Dirty` on the next mutation. Category edits are
/// metadata only and never dirty the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LsiEngine {
    config: LsiConfig,
    #[serde(with = "indexmap::map::serde_seq")]
    nodes: IndexMap<NodeId, ContentNode>,
    vocabulary: Vocabulary,
    /// Right singular vectors of the last build, terms x rank. Projects any
    /// term vector into the semantic space.
    projection: Option<DMatrix<f64>>,
    /// Retained singular values of the last build, descending.
    singular: Vec<f64>,
    next_id: u64,
    needs_rebuild: bool,
}

impl LsiEngine {
    pub fn new() -> Self {
        LsiEngine::with_config(LsiConfig::default())
    }

    pub fn with_config(config: LsiConfig) -> Self {
        LsiEngine {
            config,
            nodes: IndexMap::new(),
            vocabulary: Vocabulary::new(),
            projection: None,
            singular: Vec::new(),
            next_id: 0,
            needs_rebuild: false,
        }
    }

    pub fn config(&self) -> &LsiConfig {
        &self.config
    }

    /// Index a document with zero or more category labels. Equal text is
    /// never merged: adding the same text twice yields two distinct nodes.
    pub fn add_item(&mut self, text: &str, categories: &[&str]) -> Result<NodeId, Error> {
        let counts = extractor::term_frequencies(text, &self.config.extractor);
        let id = NodeId(self.next_id);
        self.next_id += 1;
        let categories = categories.iter().map(|c| c.to_string()).collect();
        self.nodes
            .insert(id, ContentNode::new(text.to_string(), counts, categories));
        self.needs_rebuild = true;
        if self.config.auto_rebuild {
            self.build_index()?;
        }
        Ok(id)
    }

    /// Shorthand for `add_item` with no categories.
    pub fn append(&mut self, text: &str) -> Result<NodeId, Error> {
        self.add_item(text, &[])
    }

    /// Remove a document by identity.
    pub fn remove_item(&mut self, id: NodeId) -> Result<Option<ContentNode>, Error> {
        let removed = self.nodes.shift_remove(&id);
        if removed.is_some() {
            self.needs_rebuild = true;
            if self.config.auto_rebuild {
                self.build_index()?;
            }
        }
        Ok(removed)
    }

    pub fn node(&self, id: NodeId) -> Option<&ContentNode> {
        self.nodes.get(&id)
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(&id).map(ContentNode::text)
    }

    /// Id of the first node holding exactly this text.
    pub fn item_id(&self, text: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.text() == text)
            .map(|(id, _)| *id)
    }

    pub fn categories_for(&self, id: NodeId) -> Option<&[String]> {
        self.nodes.get(&id).map(ContentNode::categories)
    }

    /// Mutable access to a node's labels. Reclassification is pure metadata:
    /// it changes subsequent `classify` results without requiring a rebuild.
    pub fn categories_for_mut(&mut self, id: NodeId) -> Option<&mut Vec<String>> {
        self.nodes.get_mut(&id).map(ContentNode::categories_mut)
    }

    pub fn needs_rebuild(&self) -> bool {
        self.needs_rebuild
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn items(&self) -> impl Iterator<Item = (NodeId, &ContentNode)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    /// Rebuild vocabulary, term-document matrix, SVD factors and every
    /// node's semantic vector. Idempotent: a second call with no intervening
    /// mutation leaves the state untouched.
    pub fn build_index(&mut self) -> Result<(), Error> {
        if !self.needs_rebuild {
            return Ok(());
        }

        self.vocabulary.clear();
        for node in self.nodes.values() {
            for term in node.term_counts().keys() {
                self.vocabulary.term_index(term);
            }
        }

        if self.nodes.is_empty() || self.vocabulary.is_empty() {
            self.projection = None;
            self.singular.clear();
            for node in self.nodes.values_mut() {
                node.clear_semantic();
            }
            self.needs_rebuild = false;
            return Ok(());
        }

        let doc_count = self.nodes.len();
        let term_count = self.vocabulary.len();
        let mut matrix = DMatrix::zeros(doc_count, term_count);
        for (row, node) in self.nodes.values().enumerate() {
            let vector = weighted_vector(node.term_counts(), &self.vocabulary);
            for (col, value) in vector.iter().enumerate() {
                matrix[(row, col)] = *value;
            }
        }

        let decomposition = svd::decompose(matrix)?;
        let rank = self
            .config
            .rank_cutoff
            .select(decomposition.singular.as_slice());

        self.projection = Some(decomposition.v_t.rows(0, rank).transpose());
        self.singular = decomposition.singular.as_slice()[..rank].to_vec();
        for (row, node) in self.nodes.values_mut().enumerate() {
            let semantic: Vec<f64> = (0..rank)
                .map(|j| decomposition.u[(row, j)] * decomposition.singular[j])
                .collect();
            node.set_semantic_vector(semantic);
        }

        self.needs_rebuild = false;
        debug!("rebuilt index: {doc_count} documents, {term_count} terms, rank {rank}");
        Ok(())
    }

    /// Rank all indexed documents by descending cosine similarity to the
    /// query and return the `count` closest texts. Ties keep insertion
    /// order.
    pub fn search(&mut self, query: &str, count: usize) -> Result<Vec<String>, Error> {
        self.ensure_built()?;
        let counts = extractor::term_frequencies(query, &self.config.extractor);
        let mut hits = self.proximity(&counts);
        hits.sort_by_score();
        Ok(hits
            .list
            .into_iter()
            .take(count)
            .filter_map(|(id, _)| self.nodes.get(&id).map(|node| node.text().to_string()))
            .collect())
    }

    /// As `search`, but nodes whose text equals the query document are
    /// excluded from their own result set.
    pub fn find_related(&mut self, text: &str, count: usize) -> Result<Vec<String>, Error> {
        self.ensure_built()?;
        let counts = extractor::term_frequencies(text, &self.config.extractor);
        let mut hits = self.proximity(&counts);
        hits.sort_by_score();
        Ok(hits
            .list
            .into_iter()
            .filter_map(|(id, _)| self.nodes.get(&id))
            .filter(|node| node.text() != text)
            .take(count)
            .map(|node| node.text().to_string())
            .collect())
    }

    /// Nearest category centroid by cosine similarity. Centroids are the
    /// mean of the unit semantic vectors of the nodes currently carrying a
    /// label, recomputed per call, so reclassifying nodes takes effect
    /// immediately. `None` when no indexed node carries a category, or when
    /// the query shares no terms with the vocabulary.
    pub fn classify(&mut self, text: &str) -> Result<Option<String>, Error> {
        self.ensure_built()?;
        let counts = extractor::term_frequencies(text, &self.config.extractor);
        let Some(query) = self.project(&counts) else {
            return Ok(None);
        };
        // no vocabulary overlap projects to the origin, which is equally
        // distant from every centroid
        if query.iter().all(|value| *value == 0.0) {
            return Ok(None);
        }
        let query = unit(&query);
        let rank = query.len();

        let mut centroids: IndexMap<&str, Vec<f64>> = IndexMap::new();
        for node in self.nodes.values() {
            if let Some(vector) = node.semantic_unit() {
                for category in node.categories() {
                    let sum = centroids
                        .entry(category.as_str())
                        .or_insert_with(|| vec![0.0; rank]);
                    for (j, value) in vector.iter().enumerate() {
                        sum[j] += value;
                    }
                }
            }
        }

        let mut best: Option<(&str, f64)> = None;
        for (label, sum) in &centroids {
            let score = dot(&query, &unit(sum));
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((*label, score));
            }
        }
        Ok(best.map(|(label, _)| label.to_string()))
    }

    /// Rank indexed documents by semantic density: the sum of cosine
    /// similarity to every indexed document. The summarizer uses this to
    /// pick the most representative chunks of a larger text.
    pub fn highest_relative_content(&mut self, count: usize) -> Result<Vec<String>, Error> {
        self.ensure_built()?;
        let units: Vec<(NodeId, &[f64])> = self
            .nodes
            .iter()
            .filter_map(|(id, node)| node.semantic_unit().map(|u| (*id, u)))
            .collect();
        let densities = units
            .iter()
            .map(|(id, u)| (*id, units.iter().map(|(_, v)| dot(u, v)).sum()))
            .collect();
        let mut hits = Hits::new(densities);
        hits.sort_by_score();
        Ok(hits
            .list
            .into_iter()
            .take(count)
            .filter_map(|(id, _)| self.nodes.get(&id).map(|node| node.text().to_string()))
            .collect())
    }

    /// Terms contributing most to a document's position in semantic space,
    /// computed from its rank-reduced term vector. Useful for keyword
    /// extraction.
    pub fn highest_ranked_stems(&mut self, id: NodeId, count: usize) -> Result<Vec<String>, Error> {
        self.ensure_built()?;
        let node = self.nodes.get(&id).ok_or(Error::ItemNotIndexed(id))?;
        let semantic = node.semantic_vector().ok_or(Error::ItemNotIndexed(id))?;
        let projection = self.projection.as_ref().ok_or(Error::ItemNotIndexed(id))?;

        let reconstructed = projection * DVector::from_column_slice(semantic);
        let mut ranked: Vec<(usize, f64)> = reconstructed.iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        Ok(ranked
            .into_iter()
            .take(count)
            .filter_map(|(index, _)| self.vocabulary.term_at(index).map(str::to_string))
            .collect())
    }

    /// Cosine scores of every indexed document against a query term-count
    /// mapping. Documents without a semantic vector (added after the last
    /// build while auto-rebuild is off) are skipped.
    fn proximity(&self, counts: &IndexMap<String, u32>) -> Hits {
        let Some(query) = self.project(counts) else {
            return Hits::new(Vec::new());
        };
        let query = unit(&query);
        let list = self
            .nodes
            .iter()
            .filter_map(|(id, node)| node.semantic_unit().map(|u| (*id, dot(&query, u))))
            .collect();
        Hits::new(list)
    }

    /// Project a term-count mapping into the current semantic space using
    /// the transform of the last build. Terms outside the vocabulary
    /// contribute zero; no SVD is recomputed.
    fn project(&self, counts: &IndexMap<String, u32>) -> Option<Vec<f64>> {
        let projection = self.projection.as_ref()?;
        let raw = weighted_vector(counts, &self.vocabulary);
        let projected = projection.tr_mul(&raw);
        trace!("projected query into {} dimensions", projected.len());
        Some(projected.as_slice().to_vec())
    }

    fn ensure_built(&mut self) -> Result<(), Error> {
        if self.config.auto_rebuild {
            self.build_index()
        } else {
            // Stale queries against the last built snapshot are the
            // documented contract when auto-rebuild is off.
            Ok(())
        }
    }
}

impl Default for LsiEngine {
    fn default() -> Self {
        LsiEngine::new()
    }
}

/// Term vector over the current vocabulary with the log-entropy transform:
/// raw counts become `ln(count + 1)` scaled by the inverse entropy of the
/// document's term distribution, which down-weights terms spread evenly
/// through a document.
fn weighted_vector(counts: &IndexMap<String, u32>, vocabulary: &Vocabulary) -> DVector<f64> {
    let mut vector = DVector::zeros(vocabulary.len());
    let mut total = 0.0;
    for (term, count) in counts {
        if let Some(index) = vocabulary.index_of(term) {
            vector[index] = *count as f64;
            total += *count as f64;
        }
    }
    if total > 1.0 {
        let mut entropy = 0.0;
        for (term, count) in counts {
            if vocabulary.index_of(term).is_some() {
                let p = *count as f64 / total;
                entropy += p * p.ln();
            }
        }
        if entropy < 0.0 {
            vector.apply(|value| *value = (*value + 1.0).ln() / -entropy);
        }
    }
    vector
}

pub(crate) fn unit(vector: &[f64]) -> Vec<f64> {
    let magnitude = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
    if magnitude > 0.0 {
        vector.iter().map(|v| v / magnitude).collect()
    } else {
        vector.to_vec()
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
