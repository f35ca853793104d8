//! Binary dump and restore of the full engine state.
//!
//! The blob carries nodes, vocabulary, projection matrix, singular values
//! and configuration, so a restored engine answers queries without a
//! rebuild and matches the original byte for byte on the same input.

use super::LsiEngine;
use crate::error::Error;

impl LsiEngine {
    /// Serialize the complete engine state to a CBOR blob.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        Ok(serde_cbor::to_vec(self)?)
    }

    /// Restore an engine from a blob produced by [`LsiEngine::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<LsiEngine, Error> {
        Ok(serde_cbor::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_input_is_a_codec_error() {
        let result = LsiEngine::from_bytes(&[0xff, 0x00, 0x13, 0x37]);
        assert!(matches!(result, Err(Error::Codec(_))));
    }

    #[test]
    fn empty_engine_round_trips() {
        let engine = LsiEngine::new();
        let bytes = engine.to_bytes().unwrap();
        let restored = LsiEngine::from_bytes(&bytes).unwrap();
        assert!(restored.is_empty());
        assert!(!restored.needs_rebuild());
    }
}
