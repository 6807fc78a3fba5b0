//! Generative expansion with a sequence-to-sequence model (doc2query).
//!
//! Every document is encoded once, then decoded `k` independent times with
//! top-k sampling. Each decode stops at the end-of-sequence token or after
//! `max_length` tokens. Samples are returned in decode order and are not
//! deduplicated; repeated calls give different queries unless the sampler is
//! seeded.

use tracing::debug;

use crate::error::Result;
use crate::expansion::config::GenerativeConfig;
use crate::expansion::expander::Expander;
use crate::expansion::progress::ProgressReporter;
use crate::expansion::sampling::TopKSampler;
use crate::expansion::types::{Expansion, ExpansionType};
use crate::model::Seq2SeqModel;
use crate::tokenization::TextTokenizer;

/// Expands documents into queries sampled from a sequence-to-sequence model.
pub struct GenerativeExpander<M, T> {
    model: M,
    tokenizer: T,
    sampler: TopKSampler,
    max_length: usize,
    num_candidates: usize,
}

impl<M, T> GenerativeExpander<M, T>
where
    M: Seq2SeqModel,
    T: TextTokenizer,
{
    /// Create an expander from a loaded model and tokenizer.
    pub fn new(model: M, tokenizer: T, config: &GenerativeConfig) -> Result<Self> {
        config.validate()?;
        let sampler = TopKSampler::new(config.top_k, config.temperature, config.seed)?;

        Ok(Self {
            model,
            tokenizer,
            sampler,
            max_length: config.max_length,
            num_candidates: config.num_candidates,
        })
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn top_k(&self) -> usize {
        self.sampler.top_k()
    }

    pub fn num_candidates(&self) -> usize {
        self.num_candidates
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Run one stochastic decode and return the generated token ids.
    fn sample_sequence(&self, state: &M::EncoderState) -> Result<Vec<u32>> {
        let eos = self.model.eos_token_id();
        let mut decoded = vec![self.model.decoder_start_token_id()];

        while decoded.len() < self.max_length {
            let logits = self.model.next_token_logits(state, &decoded)?;
            let next = self.sampler.sample(&logits)?;
            decoded.push(next);
            if next == eos {
                break;
            }
        }

        Ok(decoded)
    }

    fn expand_document(&self, document: &str, k: usize) -> Result<Expansion> {
        let encoding = self.tokenizer.encode(document, true)?;
        let state = self.model.encode(&encoding.ids)?;

        let mut queries = Vec::with_capacity(k);
        for _ in 0..k {
            let ids = self.sample_sequence(&state)?;
            queries.push(self.tokenizer.decode(&ids, true)?);
        }

        Ok(queries)
    }
}

impl<M, T> Expander for GenerativeExpander<M, T>
where
    M: Seq2SeqModel,
    T: TextTokenizer,
{
    fn expansion_type(&self) -> ExpansionType {
        ExpansionType::Generative
    }

    fn expand_documents(
        &self,
        documents: &[&str],
        k: Option<usize>,
        progress: &dyn ProgressReporter,
    ) -> Result<Vec<Expansion>> {
        let k = k.unwrap_or(self.num_candidates);
        debug!(documents = documents.len(), k, "generative expansion");

        let mut expansions = Vec::with_capacity(documents.len());
        for document in documents {
            expansions.push(self.expand_document(document, k)?);
            progress.advance(1);
        }

        Ok(expansions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{test_tokenizer, RandomWordsSeq2Seq};

    fn expander(words: usize, max_length: usize) -> GenerativeExpander<RandomWordsSeq2Seq, crate::tokenization::WordPieceTokenizer> {
        let config = GenerativeConfig {
            max_length,
            top_k: 10,
            ..GenerativeConfig::default()
        };
        GenerativeExpander::new(RandomWordsSeq2Seq::new(words), test_tokenizer(), &config).unwrap()
    }

    #[test]
    fn test_generates_k_queries() {
        let expander = expander(3, 64);
        let queries = expander.expand("the cat is green", Some(3)).unwrap();

        assert_eq!(queries.len(), 3);
        for query in &queries {
            assert!(!query.is_empty());
            assert_eq!(query.split_whitespace().count(), 3, "{query}");
        }
    }

    #[test]
    fn test_default_candidate_count() {
        let expander = expander(2, 64);
        assert_eq!(expander.expand("a dog", None).unwrap().len(), 5);
    }

    #[test]
    fn test_max_length_bounds_decoding() {
        // Start token plus four sampled tokens.
        let expander = expander(50, 5);
        let queries = expander.expand("the house", Some(2)).unwrap();

        for query in queries {
            assert_eq!(query.split_whitespace().count(), 4, "{query}");
        }
    }

    #[test]
    fn test_each_document_encoded_once() {
        let expander = expander(1, 64);
        let expansions = expander
            .expand_batch(&["the cat", "a dog", "the garden"], Some(4), false)
            .unwrap();

        assert_eq!(expansions.len(), 3);
        assert!(expansions.iter().all(|e| e.len() == 4));

        let encoded = expander.model().encoded.lock();
        assert_eq!(encoded.len(), 3);
        assert_eq!(encoded[1], test_tokenizer().encode("a dog", true).unwrap().ids);
    }

    #[test]
    fn test_empty_input() {
        let expander = expander(2, 64);
        assert!(expander.expand_batch(&[], Some(3), false).unwrap().is_empty());
        assert!(expander.expand("the cat", Some(0)).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_config() {
        let config = GenerativeConfig {
            top_k: 0,
            ..GenerativeConfig::default()
        };
        let result = GenerativeExpander::new(RandomWordsSeq2Seq::new(1), test_tokenizer(), &config);
        assert!(result.is_err());
    }
}
