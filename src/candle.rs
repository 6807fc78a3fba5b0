//! Candle backends for the expansion strategies.
//!
//! Requires the `candle` feature. Models and tokenizers are fetched from the
//! Hugging Face Hub (cached under `HF_HOME`) and run locally:
//!
//! - [`CandleT5`]: T5 sequence-to-sequence model for generative expansion.
//! - [`CandleMaskedLm`]: BERT masked-LM head scored at the leading position,
//!   for masked-LM expansion.
//! - [`CandleSplade`]: BERT masked-LM head pooled into a sparse vocabulary
//!   vector, for sparse expansion.
//!
//! Each strategy gains `from_pretrained(&config)` and `from_default()`
//! constructors for its candle instantiation, and
//! [`ExpanderRegistry::from_config`] registers all three.

pub mod bert;
pub mod device;
pub mod hub;
pub mod t5;
pub mod tokenizer;

pub use bert::{CandleMaskedLm, CandleSplade};
pub use device::to_device;
pub use t5::CandleT5;
pub use tokenizer::HfTokenizer;

use tracing::info;

use crate::error::{DocExpandError, Result};
use crate::expansion::config::{ExpansionConfig, GenerativeConfig, MaskedLmConfig, SparseConfig};
use crate::expansion::{
    Expander, ExpanderRegistry, ExpansionType, GenerativeExpander, MaskedLmExpander,
    SparseExpander,
};

impl From<candle_core::Error> for DocExpandError {
    fn from(err: candle_core::Error) -> Self {
        DocExpandError::model(err.to_string())
    }
}

/// Generative expander backed by candle T5.
pub type PretrainedGenerativeExpander = GenerativeExpander<CandleT5, HfTokenizer>;

/// Sparse expander backed by a candle SPLADE encoder.
pub type PretrainedSparseExpander = SparseExpander<CandleSplade, HfTokenizer>;

/// Masked-LM expander backed by candle BERT.
pub type PretrainedMaskedLmExpander = MaskedLmExpander<CandleMaskedLm, HfTokenizer>;

impl GenerativeExpander<CandleT5, HfTokenizer> {
    /// Download (if needed) and load the configured model.
    pub fn from_pretrained(config: &GenerativeConfig) -> Result<Self> {
        config.validate()?;
        info!(model = %config.model, device = %config.device, "loading generative model");

        let files = hub::ModelFiles::fetch(
            &config.model,
            config.revision.as_deref(),
            config.tokenizer.as_deref(),
        )?;
        let device = to_device(config.device)?;
        let model = CandleT5::load(&files, &device)?;
        let tokenizer = HfTokenizer::from_file(&files.tokenizer, None)?;

        Self::new(model, tokenizer, config)
    }

    pub fn from_default() -> Result<Self> {
        Self::from_pretrained(&GenerativeConfig::default())
    }
}

impl SparseExpander<CandleSplade, HfTokenizer> {
    /// Download (if needed) and load the configured model.
    pub fn from_pretrained(config: &SparseConfig) -> Result<Self> {
        config.validate()?;
        info!(model = %config.model, device = %config.device, "loading sparse model");

        let files = hub::ModelFiles::fetch(
            &config.model,
            config.revision.as_deref(),
            config.tokenizer.as_deref(),
        )?;
        let device = to_device(config.device)?;
        let tokenizer = HfTokenizer::from_file(&files.tokenizer, Some(config.max_length))?;
        let encoder = CandleSplade::load(&files, tokenizer.clone(), &device)?;

        Self::new(encoder, tokenizer, config)
    }

    pub fn from_default() -> Result<Self> {
        Self::from_pretrained(&SparseConfig::default())
    }
}

impl MaskedLmExpander<CandleMaskedLm, HfTokenizer> {
    /// Download (if needed) and load the configured model.
    pub fn from_pretrained(config: &MaskedLmConfig) -> Result<Self> {
        config.validate()?;
        info!(model = %config.model, device = %config.device, "loading masked-LM model");

        let files = hub::ModelFiles::fetch(
            &config.model,
            config.revision.as_deref(),
            config.tokenizer.as_deref(),
        )?;
        let device = to_device(config.device)?;
        let model = CandleMaskedLm::load(&files, &device)?;
        let tokenizer = HfTokenizer::from_file(&files.tokenizer, Some(config.max_length))?;

        Self::new(model, tokenizer, config)
    }

    pub fn from_default() -> Result<Self> {
        Self::from_pretrained(&MaskedLmConfig::default())
    }
}

impl ExpanderRegistry {
    /// Registry with a pretrained loader for every expansion type.
    pub fn from_config(config: &ExpansionConfig) -> Self {
        let generative = config.generative.clone();
        let sparse = config.sparse.clone();
        let masked_lm = config.masked_lm.clone();

        Self::new()
            .with(ExpansionType::Generative, move || {
                let expander = PretrainedGenerativeExpander::from_pretrained(&generative)?;
                Ok(Box::new(expander) as Box<dyn Expander>)
            })
            .with(ExpansionType::Sparse, move || {
                let expander = PretrainedSparseExpander::from_pretrained(&sparse)?;
                Ok(Box::new(expander) as Box<dyn Expander>)
            })
            .with(ExpansionType::MaskedLm, move || {
                let expander = PretrainedMaskedLmExpander::from_pretrained(&masked_lm)?;
                Ok(Box::new(expander) as Box<dyn Expander>)
            })
    }
}
