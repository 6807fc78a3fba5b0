//! Scoring-model collaborators used by the expansion strategies.
//!
//! The strategies treat the underlying neural networks as opaque functions.
//! Each trait below captures the one primitive a strategy needs:
//!
//! - [`Seq2SeqModel`]: encoder pass plus next-token logits for decoding.
//! - [`SparseEncoder`]: document to sparse vocabulary-weight vector.
//! - [`MaskedLanguageModel`]: batched forward pass returning the vocabulary
//!   distribution at the leading position of every sequence.
//!
//! Real implementations live in the `candle` module (feature `candle`).
//! Implementations are used behind `&self`; a backend that needs mutable
//! state during inference guards it internally.

use std::fmt;

use crate::error::{DocExpandError, Result};
use crate::tokenization::BatchEncoding;

/// A sequence-to-sequence model driven one decoding step at a time.
pub trait Seq2SeqModel: Send + Sync {
    /// Encoder output kept alive across the decoding steps of one document.
    type EncoderState;

    /// Run the encoder over the document's token ids.
    fn encode(&self, input_ids: &[u32]) -> Result<Self::EncoderState>;

    /// Logits over the vocabulary for the token following `decoder_ids`.
    fn next_token_logits(&self, state: &Self::EncoderState, decoder_ids: &[u32])
    -> Result<Vec<f32>>;

    /// First token fed to the decoder.
    fn decoder_start_token_id(&self) -> u32;

    /// Token that terminates a decode.
    fn eos_token_id(&self) -> u32;
}

/// Sparse weighted vector over a vocabulary.
///
/// Only non-zero entries are materialized. Entries keep the order in which
/// the encoder produced them; the sparse strategy relies on that order to
/// break ties between equal weights.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    indices: Vec<u32>,
    values: Vec<f32>,
}

impl SparseVector {
    /// Create a sparse vector from parallel index and value lists.
    pub fn new(indices: Vec<u32>, values: Vec<f32>) -> Result<Self> {
        if indices.len() != values.len() {
            return Err(DocExpandError::length_mismatch(indices.len(), values.len()));
        }
        Ok(Self { indices, values })
    }

    /// Build a sparse vector from a dense one, keeping weights above `threshold`.
    ///
    /// Entries are emitted in ascending index order.
    pub fn from_dense(dense: &[f32], threshold: f32) -> Self {
        let (indices, values) = dense
            .iter()
            .enumerate()
            .filter(|(_, w)| **w > threshold)
            .map(|(i, w)| (i as u32, *w))
            .unzip();
        Self { indices, values }
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterate over `(token id, weight)` entries in stored order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, f32)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }
}

/// A model mapping documents to sparse vocabulary-weight vectors.
pub trait SparseEncoder: Send + Sync {
    /// Encode each document; one vector per document, in input order.
    fn encode(&self, documents: &[&str]) -> Result<Vec<SparseVector>>;
}

/// A masked language model queried at the leading position.
pub trait MaskedLanguageModel: Send + Sync {
    /// Run one forward pass over the batch.
    ///
    /// Returns, for every row, the vocabulary scores at position 0.
    fn leading_logits(&self, batch: &BatchEncoding) -> Result<Vec<Vec<f32>>>;
}

impl fmt::Display for SparseVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SparseVector(nnz={})", self.len())
    }
}
