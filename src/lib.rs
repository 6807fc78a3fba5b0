//! # docexpand
//!
//! Document expansion for retrieval indexing.
//!
//! Before a document is indexed, an expander predicts terms or queries the
//! document is relevant to but does not contain, so that lexical retrieval
//! can match them.
//!
//! ## Features
//!
//! - Generative expansion: queries sampled from a doc2query model
//! - Sparse expansion: top-weighted terms of a SPLADE encoding
//! - Masked-LM expansion: top-scoring TILDE vocabulary terms with stopword
//!   and subtoken filtering
//! - One `Expander` contract for single documents, batches, joined strings
//!   and tokenized `(document, expansion)` pairs
//! - Pluggable model backends; candle backends behind the `candle` feature
//!
//! ## Example
//!
//! ```rust,no_run
//! # #[cfg(feature = "candle")]
//! # fn main() -> docexpand::error::Result<()> {
//! use docexpand::prelude::*;
//!
//! let expander = ExpanderRegistry::default().get_expander("tilde")?;
//! let expanded = expander.expand_as_strings(&["the cat sat on the mat"], Some(20), false)?;
//! println!("{}", expanded[0]);
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "candle"))]
//! # fn main() {}
//! ```

#[cfg(feature = "candle")]
pub mod candle;
pub mod cli;
pub mod error;
pub mod expansion;
pub mod model;
pub mod tokenization;

#[cfg(test)]
mod fixtures;

pub mod prelude {
    pub use crate::error::{DocExpandError, Result};
    pub use crate::expansion::{
        DocumentExpander, Expander, ExpanderRegistry, Expansion, ExpansionConfig, ExpansionType,
        GenerativeExpander, MaskedLmExpander, SparseExpander,
    };
    pub use crate::model::{MaskedLanguageModel, Seq2SeqModel, SparseEncoder, SparseVector};
    pub use crate::tokenization::{BatchEncoding, Encoding, TextTokenizer, WordPieceTokenizer};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
