//! Deterministic tokenizer and model doubles shared by unit tests.

use ahash::AHashMap;
use parking_lot::Mutex;

use crate::error::{DocExpandError, Result};
use crate::expansion::progress::ProgressReporter;
use crate::expansion::{Expander, Expansion, ExpansionType};
use crate::model::{MaskedLanguageModel, Seq2SeqModel, SparseEncoder, SparseVector};
use crate::tokenization::{BatchEncoding, WordPieceTokenizer};

pub const TEST_VOCAB: &[&str] = &[
    "[PAD]", "[unused0]", "[UNK]", "[CLS]", "[SEP]", "[MASK]", "the", "a", "cat", "dog", "play",
    "##ing", "don", "'", "t", "2024", "house", "garden", "pet", "animal", "food", "is", "and",
    "e-mail", "##s", "run", "green", ".",
];

pub fn test_tokenizer() -> WordPieceTokenizer {
    WordPieceTokenizer::from_vocab(TEST_VOCAB.iter().copied()).unwrap()
}

pub fn id(token: &str) -> u32 {
    TEST_VOCAB
        .iter()
        .position(|t| *t == token)
        .unwrap_or_else(|| panic!("{token} not in test vocabulary")) as u32
}

/// Returns the document's words in reverse order, capped at `k`.
pub struct EchoExpander;

impl Expander for EchoExpander {
    fn expansion_type(&self) -> ExpansionType {
        ExpansionType::Sparse
    }

    fn expand_documents(
        &self,
        documents: &[&str],
        k: Option<usize>,
        progress: &dyn ProgressReporter,
    ) -> Result<Vec<Expansion>> {
        let mut out = Vec::new();
        for document in documents {
            let mut words: Vec<String> =
                document.split_whitespace().rev().map(String::from).collect();
            words.truncate(k.unwrap_or(usize::MAX));
            out.push(words);
            progress.advance(1);
        }
        Ok(out)
    }
}

/// Emits `words` random content tokens, then end-of-sequence.
pub struct RandomWordsSeq2Seq {
    pub words: usize,
    pub encoded: Mutex<Vec<Vec<u32>>>,
}

impl RandomWordsSeq2Seq {
    pub fn new(words: usize) -> Self {
        Self {
            words,
            encoded: Mutex::new(Vec::new()),
        }
    }
}

impl Seq2SeqModel for RandomWordsSeq2Seq {
    type EncoderState = usize;

    fn encode(&self, input_ids: &[u32]) -> Result<usize> {
        self.encoded.lock().push(input_ids.to_vec());
        Ok(input_ids.len())
    }

    fn next_token_logits(&self, _state: &usize, decoder_ids: &[u32]) -> Result<Vec<f32>> {
        let mut logits = vec![f32::NEG_INFINITY; TEST_VOCAB.len()];
        if decoder_ids.len() > self.words {
            logits[self.eos_token_id() as usize] = 0.0;
        } else {
            for word in ["cat", "dog", "pet", "animal", "garden", "house"] {
                logits[id(word) as usize] = 1.0;
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

/// Returns a fixed sparse vector per document.
pub struct FixedSparseEncoder {
    pub vectors: AHashMap<String, SparseVector>,
}

impl SparseEncoder for FixedSparseEncoder {
    fn encode(&self, documents: &[&str]) -> Result<Vec<SparseVector>> {
        documents
            .iter()
            .map(|document| {
                self.vectors.get(*document).cloned().ok_or_else(|| {
                    DocExpandError::model(format!("no vector for document '{document}'"))
                })
            })
            .collect()
    }
}

/// Scores every row with the same vocabulary distribution and records batches.
pub struct FixedScoresMlm {
    pub scores: Vec<f32>,
    pub batches: Mutex<Vec<BatchEncoding>>,
}

impl FixedScoresMlm {
    pub fn new(scores: Vec<f32>) -> Self {
        Self {
            scores,
            batches: Mutex::new(Vec::new()),
        }
    }

    /// Scores that rank the vocabulary in the given token order, highest first.
    pub fn ranking(tokens: &[&str]) -> Self {
        let mut scores = vec![0.0; TEST_VOCAB.len()];
        for (rank, token) in tokens.iter().enumerate() {
            scores[id(token) as usize] = 100.0 - rank as f32;
        }
        Self::new(scores)
    }
}

impl MaskedLanguageModel for FixedScoresMlm {
    fn leading_logits(&self, batch: &BatchEncoding) -> Result<Vec<Vec<f32>>> {
        self.batches.lock().push(batch.clone());
        Ok(vec![self.scores.clone(); batch.len()])
    }
}
