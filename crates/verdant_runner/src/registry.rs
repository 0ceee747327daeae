//! Measure Registry - stable keys to measure constructors
//!
//! Populated explicitly at load time; there is no discovery.

use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

use crate::measure::Measure;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("Measure '{0}' is already registered")]
    Duplicate(String),

    #[error("Unknown measure: '{key}' (available: {available})")]
    NotFound { key: String, available: String },
}

type Factory<M> = Box<dyn Fn() -> Box<dyn Measure<M>> + Send + Sync>;

/// Registry of measures for models of type `M`
pub struct MeasureRegistry<M> {
    factories: BTreeMap<String, Factory<M>>,
}

impl<M> MeasureRegistry<M> {
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Register a constructor under `key`
    pub fn register<F>(&mut self, key: impl Into<String>, factory: F) -> Result<(), RegistryError>
    where
        F: Fn() -> Box<dyn Measure<M>> + Send + Sync + 'static,
    {
        let key = key.into();
        if self.factories.contains_key(&key) {
            return Err(RegistryError::Duplicate(key));
        }
        debug!("Registering measure: {}", key);
        self.factories.insert(key, Box::new(factory));
        Ok(())
    }

    /// Build a fresh measure
    pub fn create(&self, key: &str) -> Result<Box<dyn Measure<M>>, RegistryError> {
        self.factories
            .get(key)
            .map(|factory| factory())
            .ok_or_else(|| RegistryError::NotFound {
                key: key.to_string(),
                available: self.keys().join(", "),
            })
    }

    /// Registered keys, sorted
    pub fn keys(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.factories.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl<M> Default for MeasureRegistry<M> {
    fn default() -> Self {
        Self::new()
    }
}
