//! Configuration for the expansion strategies.
//!
//! Every struct has a `Default` carrying the known-good settings used by
//! `from_default` constructors, and can be loaded from JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DocExpandError, Result};
use crate::expansion::types::DeviceSpec;
use crate::expansion::vocabulary::DEFAULT_STOPWORDS;

pub const DEFAULT_GENERATIVE_MODEL: &str = "castorini/doc2query-t5-base-msmarco";
pub const DEFAULT_GENERATIVE_TOKENIZER: &str = "t5-base";
pub const DEFAULT_SPARSE_MODEL: &str = "naver/splade-v3";
pub const DEFAULT_SPARSE_REVISION: &str = "refs/pr/6";
pub const DEFAULT_MASKED_LM_MODEL: &str = "ielab/TILDE";
pub const DEFAULT_MASKED_LM_TOKENIZER: &str = "bert-base-uncased";

/// Tokenizer repository to use for a model whose own repository ships none.
pub fn tokenizer_for_model(model: &str) -> Option<&'static str> {
    match model {
        DEFAULT_MASKED_LM_MODEL => Some(DEFAULT_MASKED_LM_TOKENIZER),
        DEFAULT_GENERATIVE_MODEL => Some(DEFAULT_GENERATIVE_TOKENIZER),
        _ => None,
    }
}

/// Configuration for generative (doc2query) expansion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerativeConfig {
    /// Model repository identifier.
    pub model: String,
    /// Model revision (branch, tag or commit).
    pub revision: Option<String>,
    /// Tokenizer repository, if different from the model repository.
    pub tokenizer: Option<String>,
    pub device: DeviceSpec,
    /// Maximum decoded length in tokens, decoder start token included.
    pub max_length: usize,
    /// Number of most probable tokens sampled from at each step.
    pub top_k: usize,
    pub temperature: f64,
    /// Queries generated per document when no `k` is passed.
    pub num_candidates: usize,
    /// Fixed sampling seed for reproducible output.
    pub seed: Option<u64>,
}

impl Default for GenerativeConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_GENERATIVE_MODEL.to_string(),
            revision: None,
            tokenizer: None,
            device: DeviceSpec::Cpu,
            max_length: 64,
            top_k: 10,
            temperature: 1.0,
            num_candidates: 5,
            seed: None,
        }
    }
}

impl GenerativeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_length < 2 {
            return Err(DocExpandError::config("generative max_length must be at least 2"));
        }
        if self.top_k == 0 {
            return Err(DocExpandError::config("generative top_k must be positive"));
        }
        if !(self.temperature > 0.0) {
            return Err(DocExpandError::config("generative temperature must be positive"));
        }
        Ok(())
    }
}

/// Configuration for sparse (SPLADE) expansion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SparseConfig {
    pub model: String,
    pub revision: Option<String>,
    pub tokenizer: Option<String>,
    pub device: DeviceSpec,
    /// Maximum number of terms per document; `None` keeps every qualifying term.
    pub k: Option<usize>,
    /// Minimum weight for a term to qualify.
    pub threshold: Option<f32>,
    /// Documents encoded per forward pass.
    pub batch_size: usize,
    /// Maximum tokenized document length.
    pub max_length: usize,
}

impl Default for SparseConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_SPARSE_MODEL.to_string(),
            revision: Some(DEFAULT_SPARSE_REVISION.to_string()),
            tokenizer: None,
            device: DeviceSpec::Cpu,
            k: None,
            threshold: None,
            batch_size: 32,
            max_length: 512,
        }
    }
}

impl SparseConfig {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(DocExpandError::config("sparse batch_size must be positive"));
        }
        if self.max_length == 0 {
            return Err(DocExpandError::config("sparse max_length must be positive"));
        }
        if let Some(threshold) = self.threshold {
            if threshold.is_nan() {
                return Err(DocExpandError::config("sparse threshold must be a number"));
            }
        }
        Ok(())
    }
}

/// How masked-LM scores are turned into at most `k` valid terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Excluded and self-term ids are scored negative infinity before top-k.
    ///
    /// Returns `k` terms whenever at least `k` valid candidates exist.
    #[default]
    MaskBeforeTopK,
    /// Take the top `pool_factor * k` ids, then drop excluded and self-term ids.
    ///
    /// May return fewer than `k` terms even when more valid ids exist further
    /// down the ranking.
    WidenThenFilter { pool_factor: usize },
}

fn default_stopwords() -> Vec<String> {
    DEFAULT_STOPWORDS.iter().map(|s| s.to_string()).collect()
}

/// Configuration for masked-LM (TILDE) expansion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskedLmConfig {
    pub model: String,
    pub revision: Option<String>,
    pub tokenizer: Option<String>,
    pub device: DeviceSpec,
    /// Terms per document when no `k` is passed.
    pub k: usize,
    /// Documents per forward pass.
    pub batch_size: usize,
    /// Id written over the first token of every sequence.
    pub passage_token_id: u32,
    /// Maximum tokenized document length.
    pub max_length: usize,
    /// Stopwords excluded from the output.
    pub stopwords: Vec<String>,
    /// Build the stopword/subtoken filter. When false only self-terms are excluded.
    pub filter_vocabulary: bool,
    pub selection: SelectionPolicy,
}

impl Default for MaskedLmConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MASKED_LM_MODEL.to_string(),
            revision: None,
            tokenizer: Some(DEFAULT_MASKED_LM_TOKENIZER.to_string()),
            device: DeviceSpec::Cpu,
            k: 100,
            batch_size: 32,
            passage_token_id: 1,
            max_length: 512,
            stopwords: default_stopwords(),
            filter_vocabulary: true,
            selection: SelectionPolicy::MaskBeforeTopK,
        }
    }
}

impl MaskedLmConfig {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(DocExpandError::config("masked-LM batch_size must be positive"));
        }
        if self.max_length == 0 {
            return Err(DocExpandError::config("masked-LM max_length must be positive"));
        }
        if let SelectionPolicy::WidenThenFilter { pool_factor } = self.selection {
            if pool_factor == 0 {
                return Err(DocExpandError::config("masked-LM pool_factor must be positive"));
            }
        }
        Ok(())
    }
}

/// Configuration for all expansion strategies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionConfig {
    pub generative: GenerativeConfig,
    pub sparse: SparseConfig,
    pub masked_lm: MaskedLmConfig,
}

impl ExpansionConfig {
    /// Parse a JSON configuration. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ExpansionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DocExpandError::config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        self.generative.validate()?;
        self.sparse.validate()?;
        self.masked_lm.validate()
    }
}
