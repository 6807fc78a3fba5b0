//! Document expander trait definition.

use crate::error::{DocExpandError, Result};
use crate::expansion::progress::{self, NoProgress, ProgressReporter};
use crate::expansion::types::{Expansion, ExpansionType};
use crate::tokenization::{BatchEncoding, TextTokenizer};

/// Document expansion strategy trait.
///
/// Implementations provide [`expand_documents`](Expander::expand_documents),
/// the strategy-specific term selection over a batch of documents. The
/// provided methods build the public calling convention on top of it:
///
/// - [`expand`](Expander::expand) takes one document and returns one
///   [`Expansion`]; it runs the batch path on a one-element slice and
///   unwraps the single result.
/// - [`expand_batch`](Expander::expand_batch) takes many documents and
///   returns one expansion per document, in input order.
/// - [`expand_as_strings`](Expander::expand_as_strings) and
///   [`expand_as_tokens`](Expander::expand_as_tokens) derive indexing-ready
///   output from the expansions.
///
/// `k` caps the number of terms per document. `None` selects the strategy's
/// configured default.
pub trait Expander: Send + Sync {
    /// The kind of expansion this strategy produces.
    fn expansion_type(&self) -> ExpansionType;

    /// Expand a batch of documents.
    ///
    /// Must return exactly one expansion per document, in input order, and an
    /// empty vector for an empty batch.
    fn expand_documents(
        &self,
        documents: &[&str],
        k: Option<usize>,
        progress: &dyn ProgressReporter,
    ) -> Result<Vec<Expansion>>;

    /// Name used in logs and progress output.
    fn name(&self) -> &str {
        self.expansion_type().as_str()
    }

    /// Expand a single document.
    fn expand(&self, document: &str, k: Option<usize>) -> Result<Expansion> {
        let mut expansions = self.expand_documents(&[document], k, &NoProgress)?;
        ensure_same_length(1, expansions.len())?;
        Ok(expansions.remove(0))
    }

    /// Expand several documents, optionally drawing a progress bar.
    fn expand_batch(
        &self,
        documents: &[&str],
        k: Option<usize>,
        show_progress: bool,
    ) -> Result<Vec<Expansion>> {
        let progress = progress::reporter(show_progress, self.name());
        progress.start(documents.len() as u64);
        let expansions = self.expand_documents(documents, k, progress.as_ref())?;
        progress.finish();

        ensure_same_length(documents.len(), expansions.len())?;
        Ok(expansions)
    }

    /// Expand documents and append the terms to each document.
    ///
    /// Each result is `"{document} {terms joined by spaces}"`.
    fn expand_as_strings(
        &self,
        documents: &[&str],
        k: Option<usize>,
        show_progress: bool,
    ) -> Result<Vec<String>> {
        let expansions = self.expand_batch(documents, k, show_progress)?;
        join_expansions(documents, &expansions)
    }

    /// Expand documents and encode `(document, expansion)` pairs.
    ///
    /// `tokenizer` is the downstream consumer's tokenizer, not the one the
    /// strategy scores with.
    fn expand_as_tokens(
        &self,
        tokenizer: &dyn TextTokenizer,
        documents: &[&str],
        k: Option<usize>,
        show_progress: bool,
    ) -> Result<BatchEncoding> {
        let expansions = self.expand_batch(documents, k, show_progress)?;
        encode_expansion_pairs(tokenizer, documents, &expansions)
    }
}

/// Fail unless two paired sequences have the same length.
pub fn ensure_same_length(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(DocExpandError::length_mismatch(expected, actual));
    }
    Ok(())
}

/// Join each document with its space-separated expansion terms.
pub fn join_expansions(documents: &[&str], expansions: &[Expansion]) -> Result<Vec<String>> {
    ensure_same_length(documents.len(), expansions.len())?;

    Ok(documents
        .iter()
        .zip(expansions)
        .map(|(document, terms)| format!("{} {}", document, terms.join(" ")))
        .collect())
}

/// Encode `(document, joined expansion)` pairs with a downstream tokenizer.
pub fn encode_expansion_pairs(
    tokenizer: &dyn TextTokenizer,
    documents: &[&str],
    expansions: &[Expansion],
) -> Result<BatchEncoding> {
    ensure_same_length(documents.len(), expansions.len())?;

    let joined: Vec<String> = expansions.iter().map(|terms| terms.join(" ")).collect();
    let pairs: Vec<(&str, &str)> = documents
        .iter()
        .copied()
        .zip(joined.iter().map(String::as_str))
        .collect();

    tokenizer.encode_pairs(&pairs)
}
