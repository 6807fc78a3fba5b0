//! Greedy WordPiece tokenizer over an in-memory vocabulary.
//!
//! Follows the BERT recipe: lowercase, split on whitespace and punctuation,
//! then split every word into the longest vocabulary pieces from left to
//! right, marking non-initial pieces with the `##` continuation prefix.
//! Words that cannot be covered by vocabulary pieces become `[UNK]`.

use ahash::AHashMap;

use crate::error::{DocExpandError, Result};
use crate::tokenization::{Encoding, TextTokenizer};

const CONTINUATION_PREFIX: &str = "##";
const MAX_CHARS_PER_WORD: usize = 100;

/// A WordPiece tokenizer built from an ordered vocabulary.
///
/// Token ids are positions in the vocabulary list. The vocabulary must contain
/// `[PAD]`, `[UNK]`, `[CLS]` and `[SEP]`.
#[derive(Debug, Clone)]
pub struct WordPieceTokenizer {
    tokens: Vec<String>,
    ids: AHashMap<String, u32>,
    pad_id: u32,
    unk_id: u32,
    cls_id: u32,
    sep_id: u32,
    special_ids: Vec<u32>,
    max_length: Option<usize>,
}

impl WordPieceTokenizer {
    /// Build a tokenizer from vocabulary entries, in id order.
    pub fn from_vocab<I, S>(vocab: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = vocab.into_iter().map(Into::into).collect();
        let mut ids = AHashMap::with_capacity(tokens.len());
        for (id, token) in tokens.iter().enumerate() {
            ids.entry(token.clone()).or_insert(id as u32);
        }

        let lookup = |token: &str| {
            ids.get(token).copied().ok_or_else(|| {
                DocExpandError::tokenization(format!("vocabulary has no {token} token"))
            })
        };
        let pad_id = lookup("[PAD]")?;
        let unk_id = lookup("[UNK]")?;
        let cls_id = lookup("[CLS]")?;
        let sep_id = lookup("[SEP]")?;

        let mut special_ids = vec![pad_id, unk_id, cls_id, sep_id];
        if let Some(mask_id) = ids.get("[MASK]") {
            special_ids.push(*mask_id);
        }

        Ok(Self {
            tokens,
            ids,
            pad_id,
            unk_id,
            cls_id,
            sep_id,
            special_ids,
            max_length: None,
        })
    }

    /// Truncate encodings to at most `max_length` ids, special tokens included.
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Look up the id of a vocabulary entry.
    pub fn token_to_id(&self, token: &str) -> Option<u32> {
        self.ids.get(token).copied()
    }

    /// Look up the vocabulary entry of an id.
    pub fn id_to_token(&self, id: u32) -> Option<&str> {
        self.tokens.get(id as usize).map(String::as_str)
    }

    fn split_words(text: &str) -> Vec<String> {
        let mut words = Vec::new();
        let mut current = String::new();

        for c in text.chars() {
            if c.is_whitespace() {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            } else if c.is_ascii_punctuation() || (!c.is_alphanumeric() && !c.is_ascii()) {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
                words.push(c.to_string());
            } else {
                current.extend(c.to_lowercase());
            }
        }
        if !current.is_empty() {
            words.push(current);
        }

        words
    }

    fn word_pieces(&self, word: &str, out: &mut Vec<u32>) {
        let chars: Vec<char> = word.chars().collect();
        if chars.len() > MAX_CHARS_PER_WORD {
            out.push(self.unk_id);
            return;
        }

        let mut pieces = Vec::new();
        let mut start = 0;
        while start < chars.len() {
            let mut end = chars.len();
            let mut found = None;
            while start < end {
                let mut candidate: String = chars[start..end].iter().collect();
                if start > 0 {
                    candidate.insert_str(0, CONTINUATION_PREFIX);
                }
                if let Some(id) = self.ids.get(&candidate) {
                    found = Some(*id);
                    break;
                }
                end -= 1;
            }

            match found {
                Some(id) => {
                    pieces.push(id);
                    start = end;
                }
                None => {
                    out.push(self.unk_id);
                    return;
                }
            }
        }

        out.extend(pieces);
    }

    fn content_ids(&self, text: &str) -> Vec<u32> {
        let mut ids = Vec::new();
        for word in Self::split_words(text) {
            self.word_pieces(&word, &mut ids);
        }
        ids
    }
}

impl TextTokenizer for WordPieceTokenizer {
    fn encode(&self, text: &str, add_special_tokens: bool) -> Result<Encoding> {
        let mut content = self.content_ids(text);

        if !add_special_tokens {
            if let Some(max) = self.max_length {
                content.truncate(max);
            }
            return Ok(Encoding::single(content));
        }

        if let Some(max) = self.max_length {
            content.truncate(max.saturating_sub(2));
        }
        let mut ids = Vec::with_capacity(content.len() + 2);
        ids.push(self.cls_id);
        ids.extend(content);
        ids.push(self.sep_id);

        Ok(Encoding::single(ids))
    }

    fn encode_pair(&self, first: &str, second: &str) -> Result<Encoding> {
        let mut a = self.content_ids(first);
        let mut b = self.content_ids(second);

        if let Some(max) = self.max_length {
            // Longest-first truncation.
            let budget = max.saturating_sub(3);
            while a.len() + b.len() > budget {
                if a.len() >= b.len() {
                    a.pop();
                } else {
                    b.pop();
                }
            }
        }

        let mut ids = Vec::with_capacity(a.len() + b.len() + 3);
        let mut type_ids = Vec::with_capacity(a.len() + b.len() + 3);
        ids.push(self.cls_id);
        ids.extend(&a);
        ids.push(self.sep_id);
        type_ids.resize(ids.len(), 0);
        ids.extend(&b);
        ids.push(self.sep_id);
        type_ids.resize(ids.len(), 1);

        Ok(Encoding { ids, type_ids })
    }

    fn decode(&self, ids: &[u32], skip_special_tokens: bool) -> Result<String> {
        let mut text = String::new();

        for (position, id) in ids
            .iter()
            .filter(|id| !(skip_special_tokens && self.special_ids.contains(id)))
            .enumerate()
        {
            let token = self.id_to_token(*id).ok_or_else(|| {
                DocExpandError::tokenization(format!("token id {id} is outside the vocabulary"))
            })?;

            if position == 0 {
                text.push_str(token);
            } else if let Some(rest) = token.strip_prefix(CONTINUATION_PREFIX) {
                text.push_str(rest);
            } else {
                text.push(' ');
                text.push_str(token);
            }
        }

        Ok(text)
    }

    fn vocabulary(&self) -> Vec<(String, u32)> {
        self.tokens
            .iter()
            .enumerate()
            .map(|(id, token)| (token.clone(), id as u32))
            .collect()
    }

    fn vocab_size(&self) -> usize {
        self.tokens.len()
    }

    fn pad_token_id(&self) -> u32 {
        self.pad_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenizer() -> WordPieceTokenizer {
        WordPieceTokenizer::from_vocab([
            "[PAD]", "[unused0]", "[UNK]", "[CLS]", "[SEP]", "the", "play", "##ing", "don", "'",
            "t", "cat", ".",
        ])
        .unwrap()
    }

    #[test]
    fn test_encode_with_special_tokens() {
        let tokenizer = tokenizer();
        let encoding = tokenizer.encode("The cat playing.", true).unwrap();

        assert_eq!(encoding.ids, vec![3, 5, 11, 6, 7, 12, 4]);
        assert_eq!(encoding.type_ids, vec![0; 7]);
    }

    #[test]
    fn test_encode_splits_punctuation() {
        let tokenizer = tokenizer();
        let encoding = tokenizer.encode("don't", false).unwrap();

        assert_eq!(encoding.ids, vec![8, 9, 10]);
    }

    #[test]
    fn test_unknown_word() {
        let tokenizer = tokenizer();
        let encoding = tokenizer.encode("zebra", false).unwrap();

        assert_eq!(encoding.ids, vec![2]);
    }

    #[test]
    fn test_encode_pair_segments() {
        let tokenizer = tokenizer();
        let encoding = tokenizer.encode_pair("the cat", "playing").unwrap();

        assert_eq!(encoding.ids, vec![3, 5, 11, 4, 6, 7, 4]);
        assert_eq!(encoding.type_ids, vec![0, 0, 0, 0, 1, 1, 1]);
    }

    #[test]
    fn test_truncation_keeps_special_tokens() {
        let tokenizer = tokenizer().with_max_length(4);
        let encoding = tokenizer.encode("the cat the cat", true).unwrap();

        assert_eq!(encoding.ids, vec![3, 5, 11, 4]);

        let pair = tokenizer.encode_pair("the cat the", "cat").unwrap();
        assert_eq!(pair.len(), 4);
    }

    #[test]
    fn test_decode() {
        let tokenizer = tokenizer();

        assert_eq!(tokenizer.decode(&[3, 6, 7, 11, 4], true).unwrap(), "playing cat");
        assert_eq!(
            tokenizer.decode(&[3, 6, 4], false).unwrap(),
            "[CLS] play [SEP]"
        );
        assert_eq!(tokenizer.decode(&[7], true).unwrap(), "##ing");
        assert!(tokenizer.decode(&[99], true).is_err());
    }

    #[test]
    fn test_missing_special_token() {
        let result = WordPieceTokenizer::from_vocab(["[PAD]", "[CLS]", "[SEP]"]);
        assert!(result.is_err());
    }
}
