//! Converter capability and descriptors
//!
//! A converter is a single text-to-text transformation. Every implementation is
//! reached through the [`Converter`] trait so discovery and row processing can
//! treat them uniformly.

pub mod builtin;

use std::fmt;
use std::time::Duration;

use crate::mode::Mode;

/// Error raised while building or running a converter
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    #[error("Instantiation failed: {0}")]
    Instantiation(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Converter returned empty output")]
    EmptyOutput,
    #[error("Unsupported: {0}")]
    Unsupported(String),
    #[error("Conversion failed: {0}")]
    Failed(String),
    #[error("Converter panicked: {0}")]
    Panicked(String),
}

/// A pluggable text transformation
pub trait Converter: Send + Sync {
    /// Transform `text`. Human-gated converters must not block when `mode`
    /// is [`Mode::NonInteractive`].
    fn transform(&self, text: &str, mode: Mode) -> Result<String, ConversionError>;

    /// Whether this converter models a human-in-the-loop gate
    fn requires_interaction(&self) -> bool {
        false
    }
}

/// Zero-argument constructor for a converter instance
pub type ConverterFactory = fn() -> Result<Box<dyn Converter>, ConversionError>;

/// Catalog entry for a known converter
#[derive(Clone, Copy)]
pub struct ConverterDescriptor {
    /// Unique identifier, used as the output column prefix
    pub identifier: &'static str,
    /// Builds a fresh instance
    pub factory: ConverterFactory,
    /// Probe budget for this converter, overriding the discovery default
    pub probe_timeout: Option<Duration>,
}

impl ConverterDescriptor {
    pub const fn new(identifier: &'static str, factory: ConverterFactory) -> Self {
        Self {
            identifier,
            factory,
            probe_timeout: None,
        }
    }

    pub const fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = Some(timeout);
        self
    }

    /// Name of the output column holding this converter's results
    pub fn column_name(&self) -> String {
        output_column(self.identifier)
    }

    pub fn instantiate(&self) -> Result<Box<dyn Converter>, ConversionError> {
        (self.factory)()
    }
}

impl fmt::Debug for ConverterDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterDescriptor")
            .field("identifier", &self.identifier)
            .field("probe_timeout", &self.probe_timeout)
            .finish_non_exhaustive()
    }
}

/// Whitespace-only output counts as no output, both when probing and per cell
pub fn is_blank_output(output: &str) -> bool {
    output.trim().is_empty()
}

/// `<identifier>_output`
pub fn output_column(identifier: &str) -> String {
    format!("{}_output", identifier)
}

/// Render a caught panic payload as a reason string
pub(crate) fn panic_reason(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
