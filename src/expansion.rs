//! Document expansion.
//!
//! Document expansion enriches a document with terms or queries it does not
//! contain but is likely relevant to, before the document is indexed. Three
//! strategies are provided, each behind the [`Expander`] trait:
//!
//! - [`GenerativeExpander`]: queries sampled from a sequence-to-sequence model.
//! - [`SparseExpander`]: top-weighted terms of a sparse vocabulary encoding.
//! - [`MaskedLmExpander`]: top-scoring vocabulary terms of a masked language
//!   model, with stopwords, subtokens and non-alphabetic tokens filtered out.
//!
//! Strategies are generic over their scoring collaborators (see
//! [`crate::model`]) and the tokenizer, so they run against any backend.
//! [`ExpanderRegistry`] maps expansion-type identifiers to factories and
//! [`DocumentExpander`] runs several strategies over the same documents.

pub mod config;
pub mod document;
pub mod expander;
pub mod generative;
pub mod masked_lm;
pub mod progress;
pub mod registry;
pub mod sampling;
pub mod sparse;
pub mod topk;
pub mod types;
pub mod vocabulary;

pub use config::{
    ExpansionConfig, GenerativeConfig, MaskedLmConfig, SelectionPolicy, SparseConfig,
};
pub use document::{DocumentExpander, ExpansionMap};
pub use expander::{encode_expansion_pairs, join_expansions, Expander};
pub use generative::GenerativeExpander;
pub use masked_lm::MaskedLmExpander;
pub use progress::{NoProgress, ProgressBarReporter, ProgressReporter};
pub use registry::{ExpanderFactory, ExpanderRegistry};
pub use sampling::TopKSampler;
pub use sparse::{select_sparse_terms, SparseExpander};
pub use types::{DeviceSpec, Expansion, ExpansionType};
pub use vocabulary::{VocabularyFilter, DEFAULT_STOPWORDS};
