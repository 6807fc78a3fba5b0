//! Top-k sampling for stochastic decoding.
//!
//! At every decoding step the sampler keeps the `top_k` most probable next
//! tokens, renormalizes their softmax probabilities and draws one of them.
//! Unless a seed is given, repeated runs produce different sequences.

use parking_lot::Mutex;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{DocExpandError, Result};
use crate::expansion::topk::top_k_of_row;

/// Draws next-token ids from the `top_k` highest logits.
#[derive(Debug)]
pub struct TopKSampler {
    top_k: usize,
    temperature: f64,
    rng: Mutex<StdRng>,
}

impl TopKSampler {
    /// Create a sampler.
    ///
    /// # Arguments
    /// * `top_k` - Number of candidate tokens kept at every step (must be > 0)
    /// * `temperature` - Softmax temperature (must be > 0)
    /// * `seed` - Fixed RNG seed for reproducible decoding, or `None`
    pub fn new(top_k: usize, temperature: f64, seed: Option<u64>) -> Result<Self> {
        if top_k == 0 {
            return Err(DocExpandError::invalid_argument("top_k must be positive"));
        }
        if !(temperature > 0.0 && temperature.is_finite()) {
            return Err(DocExpandError::invalid_argument(format!(
                "temperature must be a positive number, got {temperature}"
            )));
        }

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(Self {
            top_k,
            temperature,
            rng: Mutex::new(rng),
        })
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Sample one token id from a logits row.
    pub fn sample(&self, logits: &[f32]) -> Result<u32> {
        let candidates = top_k_of_row(logits, self.top_k);
        let Some(&(best_id, best)) = candidates.first() else {
            return Err(DocExpandError::model(
                "logits contain no finite scores to sample from",
            ));
        };
        if candidates.len() == 1 || best == f32::INFINITY {
            return Ok(best_id);
        }

        let max = best as f64;
        let weights: Vec<f64> = candidates
            .iter()
            .map(|(_, logit)| ((*logit as f64 - max) / self.temperature).exp())
            .collect();
        let distribution = WeightedIndex::new(&weights)
            .map_err(|e| DocExpandError::model(format!("invalid sampling weights: {e}")))?;

        let index = distribution.sample(&mut *self.rng.lock());
        Ok(candidates[index].0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameters() {
        assert!(TopKSampler::new(0, 1.0, None).is_err());
        assert!(TopKSampler::new(5, 0.0, None).is_err());
        assert!(TopKSampler::new(5, f64::NAN, None).is_err());
    }

    #[test]
    fn test_top_one_is_greedy() {
        let sampler = TopKSampler::new(1, 1.0, None).unwrap();
        for _ in 0..20 {
            assert_eq!(sampler.sample(&[0.1, 3.0, 2.9, -1.0]).unwrap(), 1);
        }
    }

    #[test]
    fn test_samples_stay_within_top_k() {
        let sampler = TopKSampler::new(2, 1.0, Some(7)).unwrap();
        let logits = [5.0, 0.0, 4.5, 1.0, -2.0];
        for _ in 0..200 {
            let id = sampler.sample(&logits).unwrap();
            assert!(id == 0 || id == 2, "sampled {id} outside the top 2");
        }
    }

    #[test]
    fn test_seeded_sampling_is_reproducible() {
        let logits = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0];
        let a = TopKSampler::new(6, 1.0, Some(42)).unwrap();
        let b = TopKSampler::new(6, 1.0, Some(42)).unwrap();

        let first: Vec<u32> = (0..32).map(|_| a.sample(&logits).unwrap()).collect();
        let second: Vec<u32> = (0..32).map(|_| b.sample(&logits).unwrap()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_masked_logits_are_never_sampled() {
        let sampler = TopKSampler::new(3, 1.0, Some(1)).unwrap();
        let logits = [f32::NEG_INFINITY, 0.5, f32::NEG_INFINITY];
        assert_eq!(sampler.sample(&logits).unwrap(), 1);

        assert!(sampler.sample(&[f32::NEG_INFINITY; 3]).is_err());
    }
}
