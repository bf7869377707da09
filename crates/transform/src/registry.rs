//! Modulator Registry - Explicit name to factory map
//!
//! The registry is built once at process start and passed to whatever
//! needs to turn configuration into a [`ModulatorChain`]. Nothing registers
//! itself globally.
//!
//! # Example
//!
//! ```ignore
//! let registry = spool_transform::default_registry();
//! let chain = registry.build_chain(&config.modulators)?;
//! ```

use crate::{Modulator, ModulatorChain, TransformError, TransformResult};
use spool_config::ModulatorInstanceConfig;
use std::collections::HashMap;

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;

/// Factory trait for creating modulators from configuration
pub trait ModulatorFactory: Send + Sync {
    /// Create a modulator instance
    ///
    /// # Errors
    /// Returns `TransformError::Config` if the options are invalid
    fn create(&self, config: &ModulatorInstanceConfig) -> TransformResult<Modulator>;

    /// Type name this factory handles
    fn name(&self) -> &'static str;
}

/// Registry of modulator factories keyed by type name
pub struct ModulatorRegistry {
    factories: HashMap<String, Box<dyn ModulatorFactory>>,
}

impl ModulatorRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a factory
    ///
    /// # Panics
    /// Panics if a factory is already registered with this name.
    /// Use `try_register` for fallible registration.
    pub fn register<F: ModulatorFactory + 'static>(&mut self, type_name: &str, factory: F) {
        if !self.try_register(type_name, factory) {
            panic!("modulator factory '{}' already registered", type_name);
        }
    }

    /// Try to register a factory
    ///
    /// Returns `false` if a factory is already registered with this name.
    pub fn try_register<F: ModulatorFactory + 'static>(
        &mut self,
        type_name: &str,
        factory: F,
    ) -> bool {
        if self.factories.contains_key(type_name) {
            return false;
        }
        self.factories.insert(type_name.to_string(), Box::new(factory));
        true
    }

    /// Create a modulator from its configuration
    ///
    /// # Errors
    /// - `TransformError::Config` if the type is not registered
    /// - whatever the factory reports for invalid options
    pub fn create(&self, config: &ModulatorInstanceConfig) -> TransformResult<Modulator> {
        let factory = self.factories.get(&config.modulator_type).ok_or_else(|| {
            TransformError::config(format!(
                "unknown modulator type '{}', available: [{}]",
                config.modulator_type,
                self.available_types().join(", ")
            ))
        })?;

        factory.create(config)
    }

    /// Build a chain from instance configs, skipping disabled ones
    pub fn build_chain(
        &self,
        configs: &[ModulatorInstanceConfig],
    ) -> TransformResult<ModulatorChain> {
        let modulators = configs
            .iter()
            .filter(|c| c.enabled)
            .map(|c| self.create(c))
            .collect::<TransformResult<Vec<_>>>()?;

        let chain = ModulatorChain::new(modulators);
        tracing::debug!(modulators = ?chain.names(), "built modulator chain");
        Ok(chain)
    }

    /// Check if a type is registered
    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    /// Registered type names, sorted
    pub fn available_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.factories.keys().map(|s| s.as_str()).collect();
        types.sort_unstable();
        types
    }

    /// Number of registered factories
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Default for ModulatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
