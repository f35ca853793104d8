use thiserror::Error;

use crate::lsi::NodeId;

/// Errors surfaced by the classifiers and the index engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Training or untraining against a label that was never registered.
    #[error("unknown classification: {0}")]
    UnknownClassification(String),

    /// The SVD primitive failed to converge on the term-document matrix.
    /// No graceful degradation is defined for this case.
    #[error("singular value decomposition did not converge")]
    Decomposition,

    /// An operation referenced a node id that is not part of the index.
    #[error("item {0:?} is not indexed")]
    ItemNotIndexed(NodeId),

    /// Binary state encode/decode failure.
    #[error("engine state codec error: {0}")]
    Codec(#[from] serde_cbor::Error),
}
