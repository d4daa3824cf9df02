//! Converter registry
//!
//! An explicit, ordered catalog of converter descriptors. Registration order is
//! output column order.

use crate::converter::ConverterDescriptor;
use crate::converter::builtin;

/// Error while building a registry
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Converter already registered: {0}")]
    Duplicate(String),
    #[error("Invalid converter identifier: {0:?}")]
    InvalidIdentifier(String),
}

/// Ordered catalog of known converters
#[derive(Debug, Clone, Default)]
pub struct Registry {
    descriptors: Vec<ConverterDescriptor>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in converter
    pub fn builtin() -> Self {
        Self {
            descriptors: builtin::catalog(),
        }
    }

    /// Append a descriptor. Identifiers must be unique and usable as column names.
    pub fn register(&mut self, descriptor: ConverterDescriptor) -> Result<(), RegistryError> {
        let id = descriptor.identifier;
        if id.trim().is_empty() || id.contains(char::is_whitespace) {
            return Err(RegistryError::InvalidIdentifier(id.to_string()));
        }
        if self.get(id).is_some() {
            return Err(RegistryError::Duplicate(id.to_string()));
        }
        self.descriptors.push(descriptor);
        Ok(())
    }

    /// Copy of this registry without the named converters
    pub fn without(&self, identifiers: &[String]) -> Self {
        Self {
            descriptors: self
                .descriptors
                .iter()
                .filter(|d| !identifiers.iter().any(|id| id == d.identifier))
                .copied()
                .collect(),
        }
    }

    pub fn list_known(&self) -> &[ConverterDescriptor] {
        &self.descriptors
    }

    pub fn get(&self, identifier: &str) -> Option<&ConverterDescriptor> {
        self.descriptors.iter().find(|d| d.identifier == identifier)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
