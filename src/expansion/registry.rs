//! Lookup from expansion-type identifiers to expander factories.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::error::{DocExpandError, Result};
use crate::expansion::expander::Expander;
use crate::expansion::types::ExpansionType;

/// Factory producing a ready-to-use expander.
pub type ExpanderFactory = Box<dyn Fn() -> Result<Box<dyn Expander>> + Send + Sync>;

/// Registry of expander factories keyed by [`ExpansionType`].
///
/// Factories run lazily: nothing is loaded until [`build`](Self::build) or
/// [`get_expander`](Self::get_expander) is called.
///
/// # Example
///
/// ```rust,no_run
/// use docexpand::expansion::{ExpanderRegistry, ExpansionType};
///
/// # fn main() -> docexpand::error::Result<()> {
/// let registry = ExpanderRegistry::default();
/// let expander = registry.get_expander("tilde")?;
/// let terms = expander.expand("the cat sat on the mat", Some(10))?;
/// # Ok(())
/// # }
/// ```
pub struct ExpanderRegistry {
    factories: HashMap<ExpansionType, ExpanderFactory>,
}

impl ExpanderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a factory, replacing any previous one for the same type.
    pub fn register<F>(&mut self, expansion_type: ExpansionType, factory: F)
    where
        F: Fn() -> Result<Box<dyn Expander>> + Send + Sync + 'static,
    {
        self.factories.insert(expansion_type, Box::new(factory));
    }

    /// Builder-style [`register`](Self::register).
    pub fn with<F>(mut self, expansion_type: ExpansionType, factory: F) -> Self
    where
        F: Fn() -> Result<Box<dyn Expander>> + Send + Sync + 'static,
    {
        self.register(expansion_type, factory);
        self
    }

    pub fn contains(&self, expansion_type: ExpansionType) -> bool {
        self.factories.contains_key(&expansion_type)
    }

    /// Registered types in identifier order.
    pub fn registered_types(&self) -> Vec<ExpansionType> {
        let mut types: Vec<ExpansionType> = self.factories.keys().copied().collect();
        types.sort_by_key(|t| t.as_str());
        types
    }

    /// Build an expander of the given type.
    pub fn build(&self, expansion_type: ExpansionType) -> Result<Box<dyn Expander>> {
        let factory = self.factories.get(&expansion_type).ok_or_else(|| {
            DocExpandError::not_implemented(format!(
                "no expander registered for expansion type '{expansion_type}'"
            ))
        })?;

        debug!(expansion_type = %expansion_type, "building expander");
        factory()
    }

    /// Parse an identifier such as `"splade"` and build the matching expander.
    pub fn get_expander(&self, identifier: &str) -> Result<Box<dyn Expander>> {
        let expansion_type: ExpansionType = identifier.parse()?;
        self.build(expansion_type)
    }
}

impl Default for ExpanderRegistry {
    /// The pretrained loaders for every expansion type when the `candle`
    /// feature is enabled; an empty registry otherwise.
    fn default() -> Self {
        #[cfg(feature = "candle")]
        {
            Self::from_config(&crate::expansion::config::ExpansionConfig::default())
        }
        #[cfg(not(feature = "candle"))]
        {
            Self::new()
        }
    }
}

impl fmt::Debug for ExpanderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpanderRegistry")
            .field("types", &self.registered_types())
            .finish()
    }
}
