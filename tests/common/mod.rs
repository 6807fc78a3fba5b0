//! Shared vocabulary and mock backends for integration tests.
#![allow(dead_code)]

use std::collections::HashMap;

use docexpand::error::Result;
use docexpand::model::{MaskedLanguageModel, Seq2SeqModel, SparseEncoder, SparseVector};
use docexpand::tokenization::{BatchEncoding, TextTokenizer, WordPieceTokenizer};

pub const VOCAB_SIZE: usize = 120;

/// Named entries; every other id holds an alphabetic filler token.
pub const NAMED: &[(u32, &str)] = &[
    (0, "[PAD]"),
    (1, "[unused0]"),
    (2, "[UNK]"),
    (3, "[CLS]"),
    (4, "[SEP]"),
    (5, "[MASK]"),
    (55, "cat"),
    (56, "sat"),
    (57, "on"),
    (58, "mat"),
    (60, "pet"),
    (61, "animal"),
    (62, "feline"),
    (63, "##s"),
    (64, "rug"),
    (65, "home"),
    (66, "kitten"),
    (67, "42"),
    (68, "dog"),
    (100, "the"),
];

fn filler(id: usize) -> String {
    let mut name = String::from("zq");
    let mut n = id;
    loop {
        name.push((b'a' + (n % 26) as u8) as char);
        n /= 26;
        if n == 0 {
            break;
        }
    }
    name
}

pub fn vocab() -> Vec<String> {
    let named: HashMap<u32, &str> = NAMED.iter().copied().collect();
    (0..VOCAB_SIZE)
        .map(|id| match named.get(&(id as u32)) {
            Some(token) => token.to_string(),
            None => filler(id),
        })
        .collect()
}

pub fn tokenizer() -> WordPieceTokenizer {
    WordPieceTokenizer::from_vocab(vocab()).unwrap()
}

pub fn id(token: &str) -> u32 {
    tokenizer().token_to_id(token).unwrap()
}

/// Decodes random words among `words` until `length` tokens, then stops.
pub struct MockSeq2Seq {
    pub words: Vec<u32>,
    pub length: usize,
}

impl Seq2SeqModel for MockSeq2Seq {
    type EncoderState = ();

    fn encode(&self, _input_ids: &[u32]) -> Result<()> {
        Ok(())
    }

    fn next_token_logits(&self, _state: &(), decoder_ids: &[u32]) -> Result<Vec<f32>> {
        let mut logits = vec![f32::NEG_INFINITY; VOCAB_SIZE];
        if decoder_ids.len() > self.length {
            logits[self.eos_token_id() as usize] = 0.0;
        } else {
            for word in &self.words {
                logits[*word as usize] = 0.0;
            }
        }
        Ok(logits)
    }

    fn decoder_start_token_id(&self) -> u32 {
        0
    }

    fn eos_token_id(&self) -> u32 {
        4
    }
}

/// Weights every document with the same (token, weight) entries plus its own
/// tokens at weight 0.9.
pub struct MockSparse {
    pub tokenizer: WordPieceTokenizer,
    pub entries: Vec<(u32, f32)>,
}

impl SparseEncoder for MockSparse {
    fn encode(&self, documents: &[&str]) -> Result<Vec<SparseVector>> {
        documents
            .iter()
            .map(|document| {
                let mut dense = vec![0.0; VOCAB_SIZE];
                for (id, weight) in &self.entries {
                    dense[*id as usize] = *weight;
                }
                for id in self.tokenizer.encode(document, false)?.ids {
                    dense[id as usize] = 0.9;
                }
                Ok(SparseVector::from_dense(&dense, 0.0))
            })
            .collect()
    }
}

/// Ranks tokens in a fixed preference order for every row.
pub struct MockMlm {
    pub scores: Vec<f32>,
}

impl MockMlm {
    pub fn preferring(tokens: &[&str]) -> Self {
        let mut scores: Vec<f32> = (0..VOCAB_SIZE).map(|i| -(i as f32) / 1000.0).collect();
        for (rank, token) in tokens.iter().enumerate() {
            scores[id(token) as usize] = 10.0 - rank as f32;
        }
        Self { scores }
    }
}

impl MaskedLanguageModel for MockMlm {
    fn leading_logits(&self, batch: &BatchEncoding) -> Result<Vec<Vec<f32>>> {
        Ok(vec![self.scores.clone(); batch.len()])
    }
}
