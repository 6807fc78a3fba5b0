//! [`TextTokenizer`] adapter over Hugging Face `tokenizers`.

use std::path::Path;

use tokenizers::{Tokenizer, TruncationParams};

use crate::error::{DocExpandError, Result};
use crate::tokenization::{Encoding, TextTokenizer};

const PAD_TOKENS: &[&str] = &["[PAD]", "<pad>"];

/// A `tokenizers` tokenizer with optional truncation and no padding.
///
/// Padding is applied by [`BatchEncoding`](crate::tokenization::BatchEncoding).
#[derive(Clone)]
pub struct HfTokenizer {
    inner: Tokenizer,
    pad_token_id: u32,
}

impl HfTokenizer {
    /// Wrap a tokenizer, truncating encodings to `max_length` tokens if set.
    pub fn new(mut inner: Tokenizer, max_length: Option<usize>) -> Result<Self> {
        let truncation = max_length.map(|max_length| TruncationParams {
            max_length,
            ..Default::default()
        });
        inner
            .with_truncation(truncation)
            .map_err(|e| DocExpandError::tokenization(format!("Invalid truncation: {e}")))?;
        inner.with_padding(None);

        let pad_token_id = PAD_TOKENS
            .iter()
            .find_map(|token| inner.token_to_id(token))
            .unwrap_or(0);

        Ok(Self { inner, pad_token_id })
    }

    pub fn from_file<P: AsRef<Path>>(path: P, max_length: Option<usize>) -> Result<Self> {
        let inner = Tokenizer::from_file(path)
            .map_err(|e| DocExpandError::tokenization(format!("Tokenizer load failed: {e}")))?;
        Self::new(inner, max_length)
    }

    pub fn inner(&self) -> &Tokenizer {
        &self.inner
    }
}

fn to_encoding(encoding: tokenizers::Encoding) -> Encoding {
    Encoding {
        ids: encoding.get_ids().to_vec(),
        type_ids: encoding.get_type_ids().to_vec(),
    }
}

impl TextTokenizer for HfTokenizer {
    fn encode(&self, text: &str, add_special_tokens: bool) -> Result<Encoding> {
        self.inner
            .encode(text, add_special_tokens)
            .map(to_encoding)
            .map_err(|e| DocExpandError::tokenization(format!("Tokenization failed: {e}")))
    }

    fn encode_pair(&self, first: &str, second: &str) -> Result<Encoding> {
        self.inner
            .encode((first, second), true)
            .map(to_encoding)
            .map_err(|e| DocExpandError::tokenization(format!("Tokenization failed: {e}")))
    }

    fn decode(&self, ids: &[u32], skip_special_tokens: bool) -> Result<String> {
        self.inner
            .decode(ids, skip_special_tokens)
            .map_err(|e| DocExpandError::tokenization(format!("Decoding failed: {e}")))
    }

    fn vocabulary(&self) -> Vec<(String, u32)> {
        let mut vocab: Vec<(String, u32)> = self.inner.get_vocab(false).into_iter().collect();
        vocab.sort_by_key(|(_, id)| *id);
        vocab
    }

    fn vocab_size(&self) -> usize {
        self.inner.get_vocab_size(false)
    }

    fn pad_token_id(&self) -> u32 {
        self.pad_token_id
    }
}
