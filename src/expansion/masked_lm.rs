//! Masked-LM expansion (TILDE).
//!
//! Construction builds a [`VocabularyFilter`] once from the configured
//! stopwords and the tokenizer vocabulary. Expansion then runs in fixed-size
//! batches:
//!
//! 1. Tokenize the batch with padding.
//! 2. Overwrite the first token of every row with the passage marker, which
//!    asks the model for passage expansion at the leading position.
//! 3. Run one forward pass and keep only the leading-position scores.
//! 4. Per row, drop filtered ids and the row's own tokens, select the top `k`
//!    remaining ids and decode them.
//!
//! Rows may yield fewer than `k` terms when too few valid ids remain.

use ahash::AHashSet;
use tracing::debug;

use crate::error::{DocExpandError, Result};
use crate::expansion::config::{MaskedLmConfig, SelectionPolicy};
use crate::expansion::expander::{ensure_same_length, Expander};
use crate::expansion::progress::ProgressReporter;
use crate::expansion::topk::{top_k_by_score, top_k_of_row};
use crate::expansion::types::{Expansion, ExpansionType};
use crate::expansion::vocabulary::VocabularyFilter;
use crate::model::MaskedLanguageModel;
use crate::tokenization::TextTokenizer;

/// Expands documents with the top vocabulary scores of a masked language model.
pub struct MaskedLmExpander<M, T> {
    model: M,
    tokenizer: T,
    filter: VocabularyFilter,
    k: usize,
    batch_size: usize,
    passage_token_id: u32,
    selection: SelectionPolicy,
}

impl<M, T> MaskedLmExpander<M, T>
where
    M: MaskedLanguageModel,
    T: TextTokenizer,
{
    /// Create an expander and build its vocabulary filter.
    pub fn new(model: M, tokenizer: T, config: &MaskedLmConfig) -> Result<Self> {
        config.validate()?;

        let filter = if config.filter_vocabulary {
            VocabularyFilter::build(&config.stopwords, &tokenizer)?
        } else {
            VocabularyFilter::unfiltered(tokenizer.vocab_size())
        };

        if config.passage_token_id as usize >= tokenizer.vocab_size() {
            return Err(DocExpandError::config(format!(
                "passage token id {} is outside the vocabulary of {} tokens",
                config.passage_token_id,
                tokenizer.vocab_size()
            )));
        }

        Ok(Self {
            model,
            tokenizer,
            filter,
            k: config.k,
            batch_size: config.batch_size,
            passage_token_id: config.passage_token_id,
            selection: config.selection,
        })
    }

    pub fn vocabulary_filter(&self) -> &VocabularyFilter {
        &self.filter
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn selection(&self) -> SelectionPolicy {
        self.selection
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Select up to `k` term ids from one row of leading-position scores.
    pub fn select_ids(&self, scores: &[f32], own_ids: &AHashSet<u32>, k: usize) -> Vec<u32> {
        let in_range = |id: &u32| (*id as usize) < scores.len();

        match self.selection {
            SelectionPolicy::MaskBeforeTopK => {
                let candidates = self
                    .filter
                    .valid_ids()
                    .iter()
                    .filter(|id| in_range(id) && !own_ids.contains(id))
                    .map(|id| (*id, scores[*id as usize]));

                top_k_by_score(candidates, k)
                    .into_iter()
                    .map(|(id, _)| id)
                    .collect()
            }
            SelectionPolicy::WidenThenFilter { pool_factor } => {
                top_k_of_row(scores, k.saturating_mul(pool_factor))
                    .into_iter()
                    .map(|(id, _)| id)
                    .filter(|id| self.filter.is_valid(*id) && !own_ids.contains(id))
                    .take(k)
                    .collect()
            }
        }
    }

    fn expand_chunk(&self, chunk: &[&str], k: usize) -> Result<Vec<Expansion>> {
        let mut batch = self.tokenizer.encode_batch(chunk, true)?;
        batch.set_leading_token(self.passage_token_id);

        let logits = self.model.leading_logits(&batch)?;
        ensure_same_length(chunk.len(), logits.len()).map_err(|e| {
            DocExpandError::model(format!("masked LM returned a malformed batch: {e}"))
        })?;

        let mut expansions = Vec::with_capacity(chunk.len());
        for (row, scores) in logits.iter().enumerate() {
            let own_ids = batch.row_token_set(row)?;
            let terms = self
                .select_ids(scores, &own_ids, k)
                .into_iter()
                .map(|id| self.tokenizer.decode(&[id], false))
                .collect::<Result<Expansion>>()?;
            expansions.push(terms);
        }

        Ok(expansions)
    }
}

impl<M, T> Expander for MaskedLmExpander<M, T>
where
    M: MaskedLanguageModel,
    T: TextTokenizer,
{
    fn expansion_type(&self) -> ExpansionType {
        ExpansionType::MaskedLm
    }

    fn expand_documents(
        &self,
        documents: &[&str],
        k: Option<usize>,
        progress: &dyn ProgressReporter,
    ) -> Result<Vec<Expansion>> {
        let k = k.unwrap_or(self.k);
        debug!(
            documents = documents.len(),
            k,
            batch_size = self.batch_size,
            "masked-LM expansion"
        );

        let mut expansions = Vec::with_capacity(documents.len());
        for chunk in documents.chunks(self.batch_size) {
            expansions.extend(self.expand_chunk(chunk, k)?);
            progress.advance(chunk.len() as u64);
        }

        Ok(expansions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{id, test_tokenizer, FixedScoresMlm, TEST_VOCAB};
    use crate::tokenization::WordPieceTokenizer;

    fn expander(model: FixedScoresMlm, config: MaskedLmConfig) -> MaskedLmExpander<FixedScoresMlm, WordPieceTokenizer> {
        MaskedLmExpander::new(model, test_tokenizer(), &config).unwrap()
    }

    #[test]
    fn test_stopword_never_returned() {
        let model = FixedScoresMlm::ranking(&["the", "pet", "animal", "food"]);
        let config = MaskedLmConfig {
            stopwords: vec!["the".to_string()],
            ..MaskedLmConfig::default()
        };
        let expander = expander(model, config);

        assert!(expander.vocabulary_filter().is_excluded(id("the")));

        let terms = expander.expand("a dog", Some(3)).unwrap();
        assert_eq!(terms, vec!["pet", "animal", "food"]);
    }

    #[test]
    fn test_self_terms_and_subtokens_excluded() {
        let model = FixedScoresMlm::ranking(&["##ing", "dog", "2024", ".", "pet", "garden"]);
        let expander = expander(model, MaskedLmConfig::default());

        let terms = expander.expand("a dog", Some(2)).unwrap();
        assert_eq!(terms, vec!["pet", "garden"]);
    }

    #[test]
    fn test_mask_before_top_k_fills_k() {
        // The three best-scoring ids are all excluded; masking still finds k valid ids.
        let model = FixedScoresMlm::ranking(&["the", "cat", "##s", "pet", "animal", "food"]);
        let expander = expander(model, MaskedLmConfig::default());

        let terms = expander.expand("the cat", Some(3)).unwrap();
        assert_eq!(terms, vec!["pet", "animal", "food"]);
    }

    #[test]
    fn test_widen_then_filter_can_return_fewer() {
        let model = FixedScoresMlm::ranking(&["the", "cat", "##s", "pet", "animal", "food"]);
        let config = MaskedLmConfig {
            selection: SelectionPolicy::WidenThenFilter { pool_factor: 2 },
            ..MaskedLmConfig::default()
        };
        let expander = expander(model, config);

        // Pool of 4 = the, cat, ##s, pet; only pet survives.
        let terms = expander.expand("the cat", Some(2)).unwrap();
        assert_eq!(terms, vec!["pet"]);
    }

    #[test]
    fn test_fewer_valid_ids_than_k() {
        let model = FixedScoresMlm::ranking(&["pet"]);
        let expander = expander(model, MaskedLmConfig::default());

        let terms = expander.expand("the cat", Some(1000)).unwrap();
        assert!(terms.len() < 1000);
        assert_eq!(terms.len(), expander.vocabulary_filter().valid_ids().len() - 1);
        assert_eq!(terms[0], "pet");
    }

    #[test]
    fn test_passage_marker_and_batching() {
        let model = FixedScoresMlm::ranking(&["pet"]);
        let config = MaskedLmConfig {
            batch_size: 2,
            ..MaskedLmConfig::default()
        };
        let expander = expander(model, config);

        let documents = ["cat", "dog", "the house", "garden", "food"];
        let expansions = expander.expand_batch(&documents, Some(1), false).unwrap();
        assert_eq!(expansions.len(), 5);

        let batches = expander.model().batches.lock();
        assert_eq!(batches.iter().map(|b| b.len()).collect::<Vec<_>>(), vec![2, 2, 1]);
        for batch in batches.iter() {
            assert!(batch.input_ids.iter().all(|row| row[0] == 1));
        }
        // Padded rows share a length within a batch.
        assert_eq!(batches[1].input_ids[0].len(), batches[1].input_ids[1].len());
    }

    #[test]
    fn test_unfiltered_vocabulary() {
        let model = FixedScoresMlm::ranking(&["the", "##ing", "pet"]);
        let config = MaskedLmConfig {
            filter_vocabulary: false,
            ..MaskedLmConfig::default()
        };
        let expander = expander(model, config);

        assert_eq!(expander.vocabulary_filter().valid_ids().len(), TEST_VOCAB.len());
        assert_eq!(expander.expand("a dog", Some(2)).unwrap(), vec!["the", "##ing"]);
    }

    #[test]
    fn test_invalid_passage_token() {
        let config = MaskedLmConfig {
            passage_token_id: 10_000,
            ..MaskedLmConfig::default()
        };
        let result = MaskedLmExpander::new(FixedScoresMlm::ranking(&[]), test_tokenizer(), &config);
        assert!(result.is_err());
    }
}
