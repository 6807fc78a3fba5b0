//! Sparse expansion with a SPLADE-style encoder.
//!
//! The encoder maps a document to weights over the vocabulary. Expansion
//! terms are the highest-weighted entries whose token does not already occur
//! in the document's own tokenization.
//!
//! Equal weights keep the order in which the encoder emitted the entries
//! (ascending token id for dense-to-sparse conversion), since the sort used
//! here is stable.

use ahash::AHashSet;
use tracing::debug;

use crate::error::{DocExpandError, Result};
use crate::expansion::config::SparseConfig;
use crate::expansion::expander::{ensure_same_length, Expander};
use crate::expansion::progress::ProgressReporter;
use crate::expansion::types::{Expansion, ExpansionType};
use crate::model::{SparseEncoder, SparseVector};
use crate::tokenization::TextTokenizer;

/// Expands documents with the top-weighted terms of a sparse encoding.
pub struct SparseExpander<E, T> {
    encoder: E,
    tokenizer: T,
    k: Option<usize>,
    threshold: Option<f32>,
    batch_size: usize,
}

impl<E, T> SparseExpander<E, T>
where
    E: SparseEncoder,
    T: TextTokenizer,
{
    /// Create an expander from a loaded encoder and its tokenizer.
    pub fn new(encoder: E, tokenizer: T, config: &SparseConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            encoder,
            tokenizer,
            k: config.k,
            threshold: config.threshold,
            batch_size: config.batch_size,
        })
    }

    pub fn k(&self) -> Option<usize> {
        self.k
    }

    pub fn threshold(&self) -> Option<f32> {
        self.threshold
    }

    fn expand_vector(&self, document: &str, vector: &SparseVector, k: Option<usize>) -> Result<Expansion> {
        let own: AHashSet<u32> = self.tokenizer.encode(document, true)?.ids.into_iter().collect();

        select_sparse_terms(vector, &own, k, self.threshold)
            .into_iter()
            .map(|id| self.tokenizer.decode(&[id], false))
            .collect()
    }
}

/// Select the ids of the top `k` entries that are not self-terms.
///
/// Entries below `threshold` are dropped. `k = None` keeps every remaining
/// entry. Fewer than `k` qualifying entries yields a shorter result.
pub fn select_sparse_terms(
    vector: &SparseVector,
    own_ids: &AHashSet<u32>,
    k: Option<usize>,
    threshold: Option<f32>,
) -> Vec<u32> {
    let mut entries: Vec<(u32, f32)> = vector
        .iter()
        .filter(|(id, _)| !own_ids.contains(id))
        .filter(|(_, weight)| threshold.is_none_or(|t| *weight >= t))
        .collect();

    entries.sort_by(|a, b| b.1.total_cmp(&a.1));
    if let Some(k) = k {
        entries.truncate(k);
    }

    entries.into_iter().map(|(id, _)| id).collect()
}

impl<E, T> Expander for SparseExpander<E, T>
where
    E: SparseEncoder,
    T: TextTokenizer,
{
    fn expansion_type(&self) -> ExpansionType {
        ExpansionType::Sparse
    }

    fn expand_documents(
        &self,
        documents: &[&str],
        k: Option<usize>,
        progress: &dyn ProgressReporter,
    ) -> Result<Vec<Expansion>> {
        let k = k.or(self.k);
        debug!(documents = documents.len(), ?k, "sparse expansion");

        let mut expansions = Vec::with_capacity(documents.len());
        for chunk in documents.chunks(self.batch_size) {
            let vectors = self.encoder.encode(chunk)?;
            ensure_same_length(chunk.len(), vectors.len()).map_err(|e| {
                DocExpandError::model(format!("sparse encoder returned a malformed batch: {e}"))
            })?;

            for (document, vector) in chunk.iter().zip(&vectors) {
                expansions.push(self.expand_vector(document, vector, k)?);
            }
            progress.advance(chunk.len() as u64);
        }

        Ok(expansions)
    }
}

#[cfg(test)]
mod tests {
    use ahash::AHashMap;

    use super::*;
    use crate::fixtures::{id, test_tokenizer, FixedSparseEncoder};

    fn encoder(entries: &[(&str, Vec<(&str, f32)>)]) -> FixedSparseEncoder {
        let mut vectors = AHashMap::new();
        for (document, weights) in entries {
            let (indices, values) = weights.iter().map(|(t, w)| (id(t), *w)).unzip();
            vectors.insert(document.to_string(), SparseVector::new(indices, values).unwrap());
        }
        FixedSparseEncoder { vectors }
    }

    #[test]
    fn test_self_terms_excluded() {
        let encoder = encoder(&[(
            "the cat",
            vec![("cat", 0.9), ("pet", 0.7), ("animal", 0.5), ("the", 0.3)],
        )]);
        let expander = SparseExpander::new(encoder, test_tokenizer(), &SparseConfig::default()).unwrap();

        let terms = expander.expand("the cat", None).unwrap();
        assert_eq!(terms, vec!["pet", "animal"]);
    }

    #[test]
    fn test_top_k_and_short_results() {
        let encoder = encoder(&[(
            "a dog",
            vec![("pet", 0.2), ("animal", 0.8), ("garden", 0.5), ("house", 0.1)],
        )]);
        let expander = SparseExpander::new(encoder, test_tokenizer(), &SparseConfig::default()).unwrap();

        assert_eq!(expander.expand("a dog", Some(2)).unwrap(), vec!["animal", "garden"]);
        assert_eq!(expander.expand("a dog", Some(10)).unwrap().len(), 4);
    }

    #[test]
    fn test_ties_keep_encoder_order() {
        let vector = SparseVector::new(vec![20, 8, 19, 9], vec![0.5, 0.5, 0.9, 0.5]).unwrap();
        let ids = select_sparse_terms(&vector, &AHashSet::new(), Some(3), None);

        assert_eq!(ids, vec![19, 20, 8]);
    }

    #[test]
    fn test_threshold() {
        let vector = SparseVector::new(vec![1, 2, 3], vec![0.05, 0.5, 0.1]).unwrap();
        let ids = select_sparse_terms(&vector, &AHashSet::new(), None, Some(0.1));

        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_configured_k() {
        let encoder = encoder(&[("dog", vec![("pet", 0.9), ("animal", 0.8), ("food", 0.7)])]);
        let config = SparseConfig {
            k: Some(1),
            ..SparseConfig::default()
        };
        let expander = SparseExpander::new(encoder, test_tokenizer(), &config).unwrap();

        assert_eq!(expander.expand("dog", None).unwrap(), vec!["pet"]);
        assert_eq!(expander.expand("dog", Some(2)).unwrap().len(), 2);
    }

    #[test]
    fn test_batches_preserve_order() {
        let encoder = encoder(&[
            ("cat", vec![("pet", 0.9)]),
            ("dog", vec![("animal", 0.9)]),
            ("house", vec![("garden", 0.9)]),
        ]);
        let config = SparseConfig {
            batch_size: 2,
            ..SparseConfig::default()
        };
        let expander = SparseExpander::new(encoder, test_tokenizer(), &config).unwrap();

        let expansions = expander
            .expand_batch(&["cat", "dog", "house"], None, false)
            .unwrap();
        assert_eq!(expansions, vec![vec!["pet"], vec!["animal"], vec!["garden"]]);
    }
}
