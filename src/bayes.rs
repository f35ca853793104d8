//! Multinomial naive Bayes classifier.
//!
//! Follows the textbook formulation from Manning, Raghavan and Schütze,
//! *Introduction to Information Retrieval* (2008): a log document-frequency
//! prior per label plus add-one smoothed log likelihoods over the terms the
//! classifier has seen anywhere. Derived quantities are cached between
//! mutations to keep repeated `classify` calls cheap.

use std::cmp::Ordering;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::extractor::{self, ExtractorConfig};

#[derive(Debug, Clone)]
struct ScoreCache {
    total_docs_log: f64,
    /// Every term with a positive trained count in any label.
    observed_terms: IndexSet<String>,
}

/// Bayesian classifier for arbitrary text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bayes {
    /// label -> term -> count. Counts may go negative through `untrain`;
    /// scoring clamps them at zero.
    #[serde(with = "indexmap::map::serde_seq")]
    classifications: IndexMap<String, IndexMap<String, i64>>,
    #[serde(with = "indexmap::map::serde_seq")]
    doc_counts: IndexMap<String, i64>,
    config: ExtractorConfig,
    #[serde(skip)]
    cache: Option<ScoreCache>,
}

impl Bayes {
    /// Create a classifier with zero or more registered labels.
    pub fn new<L: AsRef<str>>(labels: &[L], config: ExtractorConfig) -> Self {
        let mut bayes = Bayes {
            classifications: IndexMap::new(),
            doc_counts: IndexMap::new(),
            config,
            cache: None,
        };
        for label in labels {
            bayes.add_classification(label.as_ref());
        }
        bayes
    }

    /// Train the classifier on a (label, text) pair.
    pub fn train(&mut self, label: &str, text: &str) -> Result<(), Error> {
        let counts = self
            .classifications
            .get_mut(label)
            .ok_or_else(|| Error::UnknownClassification(label.to_string()))?;
        for (term, count) in extractor::term_frequencies(text, &self.config) {
            *counts.entry(term).or_insert(0) += count as i64;
        }
        *self.doc_counts.entry(label.to_string()).or_insert(0) += 1;
        self.cache = None;
        Ok(())
    }

    /// Remove a (label, text) pair from the trained state. Only counts that
    /// already exist are decremented, mirroring `train` exactly so that a
    /// train/untrain round trip leaves scores unchanged.
    pub fn untrain(&mut self, label: &str, text: &str) -> Result<(), Error> {
        let counts = self
            .classifications
            .get_mut(label)
            .ok_or_else(|| Error::UnknownClassification(label.to_string()))?;
        for (term, count) in extractor::term_frequencies(text, &self.config) {
            if let Some(existing) = counts.get_mut(&term) {
                *existing -= count as i64;
            }
        }
        *self.doc_counts.entry(label.to_string()).or_insert(0) -= 1;
        self.cache = None;
        Ok(())
    }

    /// Log score of the text against every registered label. The label
    /// closest to zero is the one `classify` picks. A label with no trained
    /// documents scores negative infinity, the lowest possible score, rather
    /// than producing a numeric fault.
    pub fn calculate_scores(&mut self, text: &str) -> IndexMap<String, f64> {
        let query = extractor::term_frequencies(text, &self.config);
        let classifications = &self.classifications;
        let doc_counts = &self.doc_counts;
        let cache: &ScoreCache = self
            .cache
            .get_or_insert_with(|| ScoreCache::build(classifications, doc_counts));

        let mut scores = IndexMap::with_capacity(classifications.len());
        for (label, term_counts) in classifications {
            let docs = doc_counts.get(label).copied().unwrap_or(0);
            if docs <= 0 || !cache.total_docs_log.is_finite() {
                scores.insert(label.clone(), f64::NEG_INFINITY);
                continue;
            }

            // prior
            let mut score = (docs as f64).ln() - cache.total_docs_log;

            // likelihood with add-one smoothing
            let label_total: i64 = term_counts.values().sum();
            let denominator =
                (label_total.max(0) as f64 + cache.observed_terms.len() as f64).ln();
            for (term, count) in &query {
                if cache.observed_terms.contains(term.as_str()) {
                    let count = *count as f64;
                    let term_count = term_counts.get(term).copied().unwrap_or(0).max(0);
                    score += count * ((term_count as f64 + 1.0).ln() - denominator);
                }
            }
            scores.insert(label.clone(), score);
        }
        scores
    }

    /// The registered label with the highest score, or `None` when no label
    /// has been registered.
    pub fn classify(&mut self, text: &str) -> Option<String> {
        self.calculate_scores(text)
            .into_iter()
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
            .map(|(label, _)| label)
    }

    /// Registered label names, in registration order.
    pub fn classifications(&self) -> Vec<&str> {
        self.classifications.keys().map(String::as_str).collect()
    }

    /// Register a label. A repeat registration keeps the existing trained
    /// counts. Returns the label.
    pub fn add_classification<'a>(&mut self, label: &'a str) -> &'a str {
        self.classifications.entry(label.to_string()).or_default();
        self.invalidate_cache();
        label
    }

    /// Drop a label and its trained counts. Returns the label if it existed.
    pub fn remove_classification<'a>(&mut self, label: &'a str) -> Option<&'a str> {
        let existed = self.classifications.shift_remove(label).is_some();
        self.doc_counts.shift_remove(label);
        self.invalidate_cache();
        existed.then_some(label)
    }

    /// True once a scoring pass has filled the derived-quantity cache.
    pub fn cache_set(&self) -> bool {
        self.cache.is_some()
    }

    /// Drop the derived-quantity cache. Done automatically on every mutation.
    pub fn invalidate_cache(&mut self) {
        self.cache = None;
    }

}

impl ScoreCache {
    fn build(
        classifications: &IndexMap<String, IndexMap<String, i64>>,
        doc_counts: &IndexMap<String, i64>,
    ) -> Self {
        let total_docs: i64 = doc_counts.values().sum();
        // untrain can leave a term keyed at zero; such terms must not count
        // toward the smoothing vocabulary, or a train/untrain round trip
        // would shift every subsequent score
        let mut totals: IndexMap<&str, i64> = IndexMap::new();
        for term_counts in classifications.values() {
            for (term, count) in term_counts {
                *totals.entry(term.as_str()).or_insert(0) += *count;
            }
        }
        let observed_terms = totals
            .into_iter()
            .filter(|(_, total)| *total > 0)
            .map(|(term, _)| term.to_string())
            .collect();
        ScoreCache {
            total_docs_log: (total_docs.max(0) as f64).ln(),
            observed_terms,
        }
    }
}

impl Default for Bayes {
    fn default() -> Self {
        Bayes::new::<&str>(&[], ExtractorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn china_classifier() -> Bayes {
        let mut bayes = Bayes::new(&["in_china", "not_in_china"], ExtractorConfig::default());
        bayes.train("in_china", "Chinese Beijing Chinese").unwrap();
        bayes.train("in_china", "Chinese Chinese Shanghai").unwrap();
        bayes.train("in_china", "Chinese Macao").unwrap();
        bayes.train("not_in_china", "Tokyo Japan Chinese").unwrap();
        bayes
    }

    #[test]
    fn classifications_returns_registered_labels() {
        let bayes = Bayes::new(&["interesting", "uninteresting"], ExtractorConfig::default());
        assert_eq!(bayes.classifications(), vec!["interesting", "uninteresting"]);
    }

    #[test]
    fn train_rejects_unknown_labels() {
        let mut bayes = Bayes::default();
        assert!(matches!(
            bayes.train("blargle", ""),
            Err(Error::UnknownClassification(_))
        ));
        assert!(matches!(
            bayes.untrain("blargle", ""),
            Err(Error::UnknownClassification(_))
        ));
    }

    #[test]
    fn reference_scores_match() {
        let mut bayes = china_classifier();
        let scores = bayes.calculate_scores("Chinese Chinese Chinese Tokyo Japan");
        assert!((scores["in_china"] - -8.107690312843907).abs() < TOLERANCE);
        assert!((scores["not_in_china"] - -8.906681345001262).abs() < TOLERANCE);
        assert_eq!(bayes.classify("Chinese Chinese Chinese Tokyo Japan").as_deref(), Some("in_china"));
    }

    #[test]
    fn untrain_reverses_train() {
        let mut bayes = china_classifier();
        let before = bayes.calculate_scores("Chinese Tokyo");

        bayes.train("in_china", "Chinese Chongqing").unwrap();
        bayes.untrain("in_china", "Chinese Chongqing").unwrap();

        let after = bayes.calculate_scores("Chinese Tokyo");
        for (label, score) in before {
            assert!((score - after[&label]).abs() < TOLERANCE, "{label} drifted");
        }
    }

    #[test]
    fn fully_untrained_terms_stop_affecting_scores() {
        let mut bayes = china_classifier();
        bayes.train("in_china", "Chongqing").unwrap();
        bayes.untrain("in_china", "Chongqing").unwrap();

        // a term trained and then fully untrained is no longer observed, so
        // a query of only that term scores the bare prior
        let scores = bayes.calculate_scores("Chongqing");
        let priors = bayes.calculate_scores("");
        assert!((scores["in_china"] - priors["in_china"]).abs() < TOLERANCE);
        assert!((scores["not_in_china"] - priors["not_in_china"]).abs() < TOLERANCE);
    }

    #[test]
    fn untrain_shifts_classification() {
        let mut bayes = Bayes::new(&["in_china", "not_in_china"], ExtractorConfig::default());
        bayes.train("in_china", "Chinese Chinese").unwrap();
        bayes.train("not_in_china", "Chinese Macao").unwrap();
        assert_eq!(bayes.classify("Chinese").as_deref(), Some("in_china"));

        bayes.untrain("in_china", "Chinese Chinese").unwrap();
        assert_eq!(bayes.classify("Chinese").as_deref(), Some("not_in_china"));
    }

    #[test]
    fn training_order_is_commutative() {
        let query = "xylophone yacht";
        let mut one = Bayes::new(&["a"], ExtractorConfig::default());
        one.train("a", "xylophone practice").unwrap();
        one.train("a", "yacht racing").unwrap();

        let mut two = Bayes::new(&["a"], ExtractorConfig::default());
        two.train("a", "yacht racing").unwrap();
        two.train("a", "xylophone practice").unwrap();

        let s1 = one.calculate_scores(query);
        let s2 = two.calculate_scores(query);
        assert!((s1["a"] - s2["a"]).abs() < TOLERANCE);
    }

    #[test]
    fn add_classification_is_idempotent() {
        let mut bayes = Bayes::default();
        assert!(bayes.classifications().is_empty());

        assert_eq!(bayes.add_classification("niner"), "niner");
        bayes.train("niner", "nine niner").unwrap();
        assert_eq!(bayes.add_classification("niner"), "niner");

        assert_eq!(bayes.classifications(), vec!["niner"]);
        // repeat registration must not wipe trained counts
        assert_eq!(bayes.classifications["niner"].len(), 2);
    }

    #[test]
    fn remove_classification_restores_label_set() {
        let mut bayes = Bayes::new(&["keep"], ExtractorConfig::default());
        bayes.add_classification("niner");
        assert_eq!(bayes.remove_classification("niner"), Some("niner"));
        assert_eq!(bayes.classifications(), vec!["keep"]);
        assert_eq!(bayes.remove_classification("niner"), None);
    }

    #[test]
    fn clean_mode_drops_punctuation() {
        let mut bayes = Bayes::new(&["one", "other"], ExtractorConfig { clean: true });
        bayes.train("one", "! ! ! ! bbb").unwrap();
        bayes.train("other", "aaa").unwrap();
        assert_eq!(bayes.classify("! aaa !").as_deref(), Some("other"));
    }

    #[test]
    fn raw_mode_keeps_punctuation() {
        let mut bayes = Bayes::new(&["one", "other"], ExtractorConfig { clean: false });
        bayes.train("one", "! ! ! ! bbb").unwrap();
        bayes.train("other", "aaa").unwrap();
        assert_eq!(bayes.classify("! aaa !").as_deref(), Some("one"));
    }

    #[test]
    fn empty_corpus_scores_are_lowest_not_faulting() {
        let mut bayes = Bayes::new(&["a", "b"], ExtractorConfig::default());
        let scores = bayes.calculate_scores("anything");
        assert_eq!(scores["a"], f64::NEG_INFINITY);
        assert_eq!(scores["b"], f64::NEG_INFINITY);
    }

    #[test]
    fn untrained_label_never_wins() {
        let mut bayes = Bayes::new(&["trained", "empty"], ExtractorConfig::default());
        bayes.train("trained", "Chinese Beijing").unwrap();
        let scores = bayes.calculate_scores("Chinese Beijing");
        assert_eq!(scores["empty"], f64::NEG_INFINITY);
        assert_eq!(bayes.classify("Chinese Beijing").as_deref(), Some("trained"));
    }

    #[test]
    fn cache_lifecycle() {
        let mut bayes = Bayes::new(&["one", "other"], ExtractorConfig::default());
        bayes.train("one", "bbb").unwrap();
        bayes.train("other", "aaa").unwrap();
        assert!(!bayes.cache_set());

        bayes.classify("aaa");
        assert!(bayes.cache_set());

        bayes.invalidate_cache();
        assert!(!bayes.cache_set());

        bayes.classify("aaa");
        assert!(bayes.cache_set());
        bayes.train("one", "ccc").unwrap();
        assert!(!bayes.cache_set());
    }
}
