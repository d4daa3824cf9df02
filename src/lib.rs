//! Prompt Enricher - batch application of pluggable prompt converters
//!
//! Provides:
//! - A static registry of text-to-text converters
//! - Discovery that probes each converter and keeps the usable ones
//! - A row processor with per-cell fault isolation
//! - A batch pipeline over CSV/XLSX datasets with CSV fallback on write failure

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod converter;
pub mod discovery;
pub mod mode;
pub mod pipeline;
pub mod registry;
pub mod row;
pub mod table;

// Re-export commonly used types
pub use config::{ConfigError, EnricherConfig};
pub use converter::{ConversionError, Converter, ConverterDescriptor};
pub use discovery::{
    ConverterStatus, Discovery, DiscoveryConfig, DiscoveryError, DiscoveryReport, ProbeResult,
    UsableConverter, discover,
};
pub use mode::{Mode, ModeController};
pub use pipeline::{BatchOptions, PersistOutcome, Pipeline, PipelineError, RunReport};
pub use registry::{Registry, RegistryError};
pub use row::{CellValue, ConversionOutcome, ErrorMarker, InputRecord, OutputRecord, RecordId};
pub use table::{Table, TableError, TableFormat, TableWriter};
