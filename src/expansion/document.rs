//! Multi-strategy document expansion.

use std::collections::BTreeMap;

use tracing::info;

use crate::error::{DocExpandError, Result};
use crate::expansion::expander::{ensure_same_length, Expander};
use crate::expansion::registry::ExpanderRegistry;
use crate::expansion::types::{Expansion, ExpansionType};

/// Expansions of one document keyed by expander name.
pub type ExpansionMap = BTreeMap<String, Expansion>;

/// Runs several expanders over the same documents.
///
/// Results are keyed by expander name, which for expanders built from a
/// registry is the expansion-type identifier (`splade`, `t5doc2query`,
/// `tilde`).
#[derive(Default)]
pub struct DocumentExpander {
    expanders: Vec<(String, Box<dyn Expander>)>,
}

impl DocumentExpander {
    pub fn new() -> Self {
        Self {
            expanders: Vec::new(),
        }
    }

    /// Build one expander per type from `registry`.
    ///
    /// Repeated types are built once.
    pub fn from_expansion_types(
        types: &[ExpansionType],
        registry: &ExpanderRegistry,
    ) -> Result<Self> {
        let mut expander = Self::new();
        for expansion_type in types {
            if expander.contains(expansion_type.as_str()) {
                continue;
            }
            info!(expansion_type = %expansion_type, "loading expander");
            expander.add_expander(expansion_type.as_str(), registry.build(*expansion_type)?)?;
        }
        Ok(expander)
    }

    /// Add an expander under `name`. Names must be unique.
    pub fn add_expander<S: Into<String>>(&mut self, name: S, expander: Box<dyn Expander>) -> Result<()> {
        let name = name.into();
        if self.contains(&name) {
            return Err(DocExpandError::invalid_argument(format!(
                "an expander named '{name}' is already present"
            )));
        }
        self.expanders.push((name, expander));
        Ok(())
    }

    /// Builder-style [`add_expander`](Self::add_expander).
    pub fn with_expander<S: Into<String>>(mut self, name: S, expander: Box<dyn Expander>) -> Result<Self> {
        self.add_expander(name, expander)?;
        Ok(self)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.expanders.iter().any(|(n, _)| n == name)
    }

    /// Expander names in insertion order.
    pub fn names(&self) -> Vec<&str> {
        self.expanders.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.expanders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expanders.is_empty()
    }

    /// Expand one document with every expander.
    pub fn expand(&self, document: &str, k: Option<usize>) -> Result<ExpansionMap> {
        let mut results = ExpansionMap::new();
        for (name, expander) in &self.expanders {
            results.insert(name.clone(), expander.expand(document, k)?);
        }
        Ok(results)
    }

    /// Expand many documents with every expander.
    ///
    /// Each expander sees the whole batch. The result holds one map per
    /// document, in input order.
    pub fn expand_batch(
        &self,
        documents: &[&str],
        k: Option<usize>,
        show_progress: bool,
    ) -> Result<Vec<ExpansionMap>> {
        let mut results = vec![ExpansionMap::new(); documents.len()];

        for (name, expander) in &self.expanders {
            let expansions = expander.expand_batch(documents, k, show_progress)?;
            ensure_same_length(documents.len(), expansions.len())?;

            for (result, expansion) in results.iter_mut().zip(expansions) {
                result.insert(name.clone(), expansion);
            }
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expansion::progress::ProgressReporter;
    use crate::fixtures::EchoExpander;

    struct UpperExpander;

    impl Expander for UpperExpander {
        fn expansion_type(&self) -> ExpansionType {
            ExpansionType::Generative
        }

        fn expand_documents(
            &self,
            documents: &[&str],
            _k: Option<usize>,
            _progress: &dyn ProgressReporter,
        ) -> Result<Vec<Expansion>> {
            Ok(documents.iter().map(|d| vec![d.to_uppercase()]).collect())
        }
    }

    fn registry() -> ExpanderRegistry {
        ExpanderRegistry::new()
            .with(ExpansionType::Sparse, || Ok(Box::new(EchoExpander)))
            .with(ExpansionType::Generative, || Ok(Box::new(UpperExpander)))
    }

    #[test]
    fn test_from_expansion_types() {
        let expander = DocumentExpander::from_expansion_types(
            &[ExpansionType::Generative, ExpansionType::Sparse, ExpansionType::Sparse],
            &registry(),
        )
        .unwrap();

        assert_eq!(expander.names(), vec!["t5doc2query", "splade"]);

        let results = expander.expand("the cat", Some(1)).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results["splade"], vec!["cat"]);
        assert_eq!(results["t5doc2query"], vec!["THE CAT"]);
    }

    #[test]
    fn test_missing_type_fails() {
        let result =
            DocumentExpander::from_expansion_types(&[ExpansionType::MaskedLm], &registry());
        assert!(matches!(result, Err(DocExpandError::NotImplemented(_))));
    }

    #[test]
    fn test_expand_batch_preserves_order() {
        let expander = DocumentExpander::new()
            .with_expander("echo", Box::new(EchoExpander))
            .unwrap()
            .with_expander("upper", Box::new(UpperExpander))
            .unwrap();

        let results = expander.expand_batch(&["a b", "c"], None, false).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["echo"], vec!["b", "a"]);
        assert_eq!(results[1]["upper"], vec!["C"]);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut expander = DocumentExpander::new();
        expander.add_expander("echo", Box::new(EchoExpander)).unwrap();

        let result = expander.add_expander("echo", Box::new(UpperExpander));
        assert!(matches!(result, Err(DocExpandError::InvalidArgument(_))));
        assert_eq!(expander.len(), 1);
    }

    #[test]
    fn test_empty() {
        let expander = DocumentExpander::new();
        assert!(expander.is_empty());
        assert!(expander.expand("the cat", None).unwrap().is_empty());
        assert_eq!(expander.expand_batch(&["a", "b"], None, false).unwrap().len(), 2);
    }
}
