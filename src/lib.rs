//! Text classification and latent semantic indexing.
//!
//! Two classifiers over the same feature extractor: a multinomial naive
//! Bayes baseline and an LSI engine that decomposes the term-document
//! matrix with SVD and answers search, related-document, classification
//! and keyword queries in a rank-reduced semantic space.
//!
//! ```
//! use lsi_classifier::LsiEngine;
//!
//! # fn main() -> Result<(), lsi_classifier::Error> {
//! let mut engine = LsiEngine::new();
//! engine.add_item("This text deals with dogs. Dogs.", &["Dog"])?;
//! engine.add_item("This text involves dogs too. Dogs!", &["Dog"])?;
//! engine.add_item("This text revolves around cats. Cats.", &["Cat"])?;
//! engine.add_item("This text also involves cats. Cats!", &["Cat"])?;
//!
//! let label = engine.classify("A story about a dog")?;
//! assert_eq!(label.as_deref(), Some("Dog"));
//! # Ok(())
//! # }
//! ```

pub mod bayes;
pub mod error;
pub mod extractor;
pub mod lsi;
pub mod summarize;

/// Latent Semantic Indexing engine
/// The top-level struct of this crate. It owns the indexed corpus, builds
/// the term-document matrix, reduces it with SVD and answers queries in the
/// resulting semantic space.
///
/// Internally, it holds:
/// - The content-node arena (text, term counts, categories, cached vectors)
/// - The corpus vocabulary
/// - The projection matrix and singular values of the last build
/// - The dirty flag driving the rebuild state machine
///
/// # Serialization
/// Supported: the full state round-trips through `to_bytes`/`from_bytes`
/// (CBOR), and a restored engine answers queries without rebuilding.
pub use lsi::LsiEngine;

/// Engine configuration: automatic-rebuild policy, rank cutoff and feature
/// extraction mode.
pub use lsi::LsiConfig;

/// Dimensionality-reduction policy: keep singular values above a fraction
/// of the largest, or keep a fixed count.
pub use lsi::RankCutoff;

/// Stable identity of an indexed document, allocated from a monotone
/// counter and never reused within one engine.
pub use lsi::NodeId;

/// One indexed document: text, extracted term counts, category labels and
/// the semantic vector cached by the last build.
pub use lsi::ContentNode;

/// The term -> column-index assignment shared by all indexed documents.
pub use lsi::Vocabulary;

/// Ranked similarity hits: (node id, cosine score) pairs with score-ordered
/// sorting.
pub use lsi::Hits;

/// Multinomial naive Bayes classifier
/// The textbook baseline: log document-frequency priors plus add-one
/// smoothed term likelihoods. Cheaper than LSI and a useful cross-check,
/// but blind to term co-occurrence.
pub use bayes::Bayes;

/// Feature extraction configuration shared by both classifiers: `clean`
/// mode strips punctuation, stop-words and short words before stemming.
pub use extractor::ExtractorConfig;

/// Map raw text to a stemmed term -> count mapping.
pub use extractor::term_frequencies;

/// Crate-wide error type.
pub use error::Error;

/// Extractive summarization helpers built on a throwaway engine.
pub use summarize::{paragraph_summary, split_paragraphs, split_sentences, summary};
