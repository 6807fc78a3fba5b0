//! Tokenizer abstraction shared by every expansion strategy.
//!
//! Strategies never talk to a concrete tokenizer library. They go through the
//! [`TextTokenizer`] trait, which covers the operations the expansion
//! algorithms need: single and pair encoding, decoding, and vocabulary
//! introspection. Batches are padded here, not by the backend, so every
//! backend produces the same [`BatchEncoding`] layout.
//!
//! Two implementations ship with the crate:
//!
//! - [`WordPieceTokenizer`]: a self-contained greedy WordPiece tokenizer
//!   built from an in-memory vocabulary. Useful offline and in tests.
//! - `HfTokenizer` (feature `candle`): an adapter over the `tokenizers` crate
//!   loading `tokenizer.json` files from the Hugging Face Hub.

pub mod wordpiece;

use ahash::AHashSet;

use crate::error::{DocExpandError, Result};

pub use wordpiece::WordPieceTokenizer;

/// Token ids and segment ids for one encoded text (or text pair).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Encoding {
    /// Token ids, including special tokens when they were requested.
    pub ids: Vec<u32>,
    /// Segment (token type) ids, same length as `ids`.
    pub type_ids: Vec<u32>,
}

impl Encoding {
    /// Create an encoding whose tokens all belong to the first segment.
    pub fn single(ids: Vec<u32>) -> Self {
        let type_ids = vec![0; ids.len()];
        Self { ids, type_ids }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// A padded batch of encodings with its attention mask.
///
/// Every row has the same length. Padding positions carry the tokenizer's pad
/// id and an attention mask value of `0`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchEncoding {
    pub input_ids: Vec<Vec<u32>>,
    pub token_type_ids: Vec<Vec<u32>>,
    pub attention_mask: Vec<Vec<u32>>,
}

impl BatchEncoding {
    /// Pad a list of encodings to the length of the longest one.
    pub fn from_encodings(encodings: Vec<Encoding>, pad_token_id: u32) -> Self {
        let seq_len = encodings.iter().map(Encoding::len).max().unwrap_or(0);
        let mut batch = BatchEncoding {
            input_ids: Vec::with_capacity(encodings.len()),
            token_type_ids: Vec::with_capacity(encodings.len()),
            attention_mask: Vec::with_capacity(encodings.len()),
        };

        for encoding in encodings {
            let real = encoding.len();
            let mut ids = encoding.ids;
            let mut type_ids = encoding.type_ids;
            ids.resize(seq_len, pad_token_id);
            type_ids.resize(seq_len, 0);

            let mut mask = vec![1u32; real];
            mask.resize(seq_len, 0);

            batch.input_ids.push(ids);
            batch.token_type_ids.push(type_ids);
            batch.attention_mask.push(mask);
        }

        batch
    }

    /// Number of rows in the batch.
    pub fn len(&self) -> usize {
        self.input_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input_ids.is_empty()
    }

    /// Padded sequence length shared by all rows.
    pub fn seq_len(&self) -> usize {
        self.input_ids.first().map(Vec::len).unwrap_or(0)
    }

    /// Overwrite the first token of every non-empty row.
    pub fn set_leading_token(&mut self, token_id: u32) {
        for row in &mut self.input_ids {
            if let Some(first) = row.first_mut() {
                *first = token_id;
            }
        }
    }

    /// Ids of the non-padding tokens of row `index`.
    pub fn row_token_set(&self, index: usize) -> Result<AHashSet<u32>> {
        let ids = self.input_ids.get(index).ok_or_else(|| {
            DocExpandError::invalid_argument(format!(
                "row {index} out of range for batch of {}",
                self.len()
            ))
        })?;
        let mask = &self.attention_mask[index];

        Ok(ids
            .iter()
            .zip(mask)
            .filter(|(_, m)| **m != 0)
            .map(|(id, _)| *id)
            .collect())
    }
}

/// Tokenizer operations needed by the expansion strategies.
///
/// Implementations must be deterministic: the same text always encodes to the
/// same ids. Truncation, if any, is the implementation's responsibility.
pub trait TextTokenizer: Send + Sync {
    /// Encode one text.
    fn encode(&self, text: &str, add_special_tokens: bool) -> Result<Encoding>;

    /// Encode a (first, second) text pair with special tokens.
    fn encode_pair(&self, first: &str, second: &str) -> Result<Encoding>;

    /// Decode token ids back into text.
    fn decode(&self, ids: &[u32], skip_special_tokens: bool) -> Result<String>;

    /// Every (token string, token id) pair of the base vocabulary.
    fn vocabulary(&self) -> Vec<(String, u32)>;

    /// Size of the base vocabulary (ids `0..vocab_size`).
    fn vocab_size(&self) -> usize;

    /// Id used to pad batched sequences.
    fn pad_token_id(&self) -> u32;

    /// Encode several texts and pad them into one batch.
    fn encode_batch(&self, texts: &[&str], add_special_tokens: bool) -> Result<BatchEncoding> {
        let encodings = texts
            .iter()
            .map(|text| self.encode(text, add_special_tokens))
            .collect::<Result<Vec<_>>>()?;
        Ok(BatchEncoding::from_encodings(encodings, self.pad_token_id()))
    }

    /// Encode several text pairs and pad them into one batch.
    fn encode_pairs(&self, pairs: &[(&str, &str)]) -> Result<BatchEncoding> {
        let encodings = pairs
            .iter()
            .map(|(first, second)| self.encode_pair(first, second))
            .collect::<Result<Vec<_>>>()?;
        Ok(BatchEncoding::from_encodings(encodings, self.pad_token_id()))
    }
}
