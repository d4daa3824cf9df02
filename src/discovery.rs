//! Converter discovery and validation
//!
//! Every registered converter is built and probed with a short canary input.
//! Converters that build, answer within their time budget, and return a
//! non-empty string are kept; everything else is recorded with a reason and
//! dropped. One broken converter never stops discovery of the others.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crate::converter::{
    ConversionError, Converter, ConverterDescriptor, is_blank_output, output_column, panic_reason,
};
use crate::mode::Mode;
use crate::registry::Registry;

/// Default canary text
pub const DEFAULT_CANARY: &str = "test";

/// Default probe budget
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Failures listed in verbose summaries
pub const MAX_LISTED_FAILURES: usize = 20;

/// Reason recorded when a probe exceeds its budget
pub const TIMEOUT_REASON: &str = "timeout";

/// Probe classification of a converter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConverterStatus {
    #[default]
    Untested,
    Usable,
    Unusable,
}

/// Result of probing one converter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub status: ConverterStatus,
    pub failure_reason: Option<String>,
    pub elapsed: Duration,
}

impl ProbeResult {
    fn usable(elapsed: Duration) -> Self {
        Self {
            status: ConverterStatus::Usable,
            failure_reason: None,
            elapsed,
        }
    }

    fn unusable(reason: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            status: ConverterStatus::Unusable,
            failure_reason: Some(reason.into()),
            elapsed,
        }
    }
}

/// Probe result tagged with the converter it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub identifier: String,
    pub result: ProbeResult,
}

/// Discovery tuning
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Input used for every probe
    pub canary: String,
    /// Default probe budget
    pub probe_timeout: Duration,
    /// Per-converter budgets, keyed by identifier
    pub timeout_overrides: BTreeMap<String, Duration>,
    /// Log failure reasons at warn level instead of debug
    pub verbose: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            canary: DEFAULT_CANARY.to_string(),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            timeout_overrides: BTreeMap::new(),
            verbose: false,
        }
    }
}

impl DiscoveryConfig {
    /// Budget for `descriptor`: configured override, then descriptor override, then default
    pub fn timeout_for(&self, descriptor: &ConverterDescriptor) -> Duration {
        self.timeout_overrides
            .get(descriptor.identifier)
            .copied()
            .or(descriptor.probe_timeout)
            .unwrap_or(self.probe_timeout)
    }
}

/// A converter that passed its probe, ready for row processing
#[derive(Clone)]
pub struct UsableConverter {
    pub identifier: String,
    pub instance: Arc<dyn Converter>,
}

impl UsableConverter {
    pub fn column_name(&self) -> String {
        output_column(&self.identifier)
    }
}

impl std::fmt::Debug for UsableConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsableConverter")
            .field("identifier", &self.identifier)
            .finish_non_exhaustive()
    }
}

/// Per-converter probe outcomes in registry order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    pub outcomes: Vec<ProbeOutcome>,
}

impl DiscoveryReport {
    pub fn usable_count(&self) -> usize {
        self.count(ConverterStatus::Usable)
    }

    pub fn unusable_count(&self) -> usize {
        self.count(ConverterStatus::Unusable)
    }

    fn count(&self, status: ConverterStatus) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.result.status == status)
            .count()
    }

    /// `(identifier, reason)` for every unusable converter
    pub fn failures(&self) -> Vec<(String, String)> {
        self.outcomes
            .iter()
            .filter(|o| o.result.status == ConverterStatus::Unusable)
            .map(|o| {
                (
                    o.identifier.clone(),
                    o.result.failure_reason.clone().unwrap_or_default(),
                )
            })
            .collect()
    }

    pub fn status_of(&self, identifier: &str) -> Option<ConverterStatus> {
        self.outcomes
            .iter()
            .find(|o| o.identifier == identifier)
            .map(|o| o.result.status)
    }
}

/// Frozen set of usable converters plus the probe report
#[derive(Debug, Clone)]
pub struct Discovery {
    pub usable: Vec<UsableConverter>,
    pub report: DiscoveryReport,
}

impl Discovery {
    /// Output column names, in registry order
    pub fn column_names(&self) -> Vec<String> {
        self.usable.iter().map(UsableConverter::column_name).collect()
    }
}

/// Fatal discovery outcome
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("No usable converters found ({} probed)", .report.outcomes.len())]
    NoUsableConverters { report: DiscoveryReport },
}

/// Build and probe every converter in `registry`
pub fn discover(registry: &Registry, config: &DiscoveryConfig) -> Result<Discovery, DiscoveryError> {
    tracing::info!(
        "Starting converter discovery ({} registered)",
        registry.len()
    );

    let mut usable = Vec::new();
    let mut report = DiscoveryReport {
        outcomes: Vec::with_capacity(registry.len()),
    };

    for descriptor in registry.list_known() {
        let (result, instance) = probe_descriptor(descriptor, config);

        match (&result.status, instance) {
            (ConverterStatus::Usable, Some(instance)) => {
                let note = if instance.requires_interaction() {
                    " (non-interactive pass-through)"
                } else {
                    ""
                };
                tracing::info!(
                    "  ✅ {} ({} ms){}",
                    descriptor.identifier,
                    result.elapsed.as_millis(),
                    note
                );
                usable.push(UsableConverter {
                    identifier: descriptor.identifier.to_string(),
                    instance,
                });
            }
            _ => {
                let reason = result.failure_reason.as_deref().unwrap_or("unknown");
                if config.verbose {
                    tracing::warn!("  ❌ {}: {}", descriptor.identifier, reason);
                } else {
                    tracing::debug!("  ❌ {}: {}", descriptor.identifier, reason);
                }
            }
        }

        report.outcomes.push(ProbeOutcome {
            identifier: descriptor.identifier.to_string(),
            result,
        });
    }

    tracing::info!(
        "Discovery finished: {} usable, {} unusable",
        report.usable_count(),
        report.unusable_count()
    );

    if usable.is_empty() {
        return Err(DiscoveryError::NoUsableConverters { report });
    }

    Ok(Discovery { usable, report })
}

fn probe_descriptor(
    descriptor: &ConverterDescriptor,
    config: &DiscoveryConfig,
) -> (ProbeResult, Option<Arc<dyn Converter>>) {
    let start = Instant::now();

    let built = panic::catch_unwind(AssertUnwindSafe(|| descriptor.instantiate()));
    let instance: Arc<dyn Converter> = match built {
        Ok(Ok(instance)) => Arc::from(instance),
        Ok(Err(e)) => return (ProbeResult::unusable(e.to_string(), start.elapsed()), None),
        Err(payload) => {
            let reason = format!("Instantiation panicked: {}", panic_reason(payload.as_ref()));
            return (ProbeResult::unusable(reason, start.elapsed()), None);
        }
    };

    let timeout = config.timeout_for(descriptor);
    match run_probe(descriptor.identifier, &instance, &config.canary, timeout) {
        Ok(()) => (ProbeResult::usable(start.elapsed()), Some(instance)),
        Err(reason) => (ProbeResult::unusable(reason, start.elapsed()), None),
    }
}

/// Run the canary on a worker thread and wait at most `timeout`.
///
/// A timed-out worker is left detached; its instance is never used again.
fn run_probe(
    identifier: &str,
    instance: &Arc<dyn Converter>,
    canary: &str,
    timeout: Duration,
) -> Result<(), String> {
    let (tx, rx) = mpsc::channel();
    let worker = Arc::clone(instance);
    let text = canary.to_string();

    thread::Builder::new()
        .name(format!("probe-{}", identifier))
        .spawn(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                worker.transform(&text, Mode::NonInteractive)
            }));
            let _ = tx.send(result);
        })
        .map_err(|e| format!("Failed to spawn probe: {}", e))?;

    match rx.recv_timeout(timeout) {
        Ok(Ok(Ok(output))) if is_blank_output(&output) => {
            Err(ConversionError::EmptyOutput.to_string())
        }
        Ok(Ok(Ok(_))) => Ok(()),
        Ok(Ok(Err(e))) => Err(e.to_string()),
        Ok(Err(payload)) => Err(format!("Probe panicked: {}", panic_reason(payload.as_ref()))),
        Err(RecvTimeoutError::Timeout) => Err(TIMEOUT_REASON.to_string()),
        Err(RecvTimeoutError::Disconnected) => {
            Err("Probe worker exited without a result".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::ConversionError;

    struct Fixed(&'static str);

    impl Converter for Fixed {
        fn transform(&self, _text: &str, _mode: Mode) -> Result<String, ConversionError> {
            Ok(self.0.to_string())
        }
    }

    struct Slow;

    impl Converter for Slow {
        fn transform(&self, text: &str, _mode: Mode) -> Result<String, ConversionError> {
            thread::sleep(Duration::from_millis(500));
            Ok(text.to_string())
        }
    }

    fn ok() -> Result<Box<dyn Converter>, ConversionError> {
        Ok(Box::new(Fixed("ok")))
    }

    fn empty() -> Result<Box<dyn Converter>, ConversionError> {
        Ok(Box::new(Fixed("  ")))
    }

    fn slow() -> Result<Box<dyn Converter>, ConversionError> {
        Ok(Box::new(Slow))
    }

    fn broken() -> Result<Box<dyn Converter>, ConversionError> {
        Err(ConversionError::Instantiation("missing resource".to_string()))
    }

    fn exploding() -> Result<Box<dyn Converter>, ConversionError> {
        panic!("constructor exploded")
    }

    #[test]
    fn test_timeout_resolution_order() {
        let descriptor =
            ConverterDescriptor::new("Slow", slow).with_probe_timeout(Duration::from_secs(2));
        let mut config = DiscoveryConfig::default();
        assert_eq!(config.timeout_for(&descriptor), Duration::from_secs(2));

        config
            .timeout_overrides
            .insert("Slow".to_string(), Duration::from_millis(10));
        assert_eq!(config.timeout_for(&descriptor), Duration::from_millis(10));

        let plain = ConverterDescriptor::new("Ok", ok);
        assert_eq!(config.timeout_for(&plain), DEFAULT_PROBE_TIMEOUT);
    }

    #[test]
    fn test_discover_classifies_every_converter() {
        let mut registry = Registry::new();
        registry.register(ConverterDescriptor::new("Ok", ok)).unwrap();
        registry.register(ConverterDescriptor::new("Empty", empty)).unwrap();
        registry.register(ConverterDescriptor::new("Broken", broken)).unwrap();
        registry
            .register(ConverterDescriptor::new("Exploding", exploding))
            .unwrap();
        registry
            .register(
                ConverterDescriptor::new("Slow", slow).with_probe_timeout(Duration::from_millis(20)),
            )
            .unwrap();

        let discovery = discover(&registry, &DiscoveryConfig::default()).unwrap();

        assert_eq!(discovery.usable.len(), 1);
        assert_eq!(discovery.column_names(), vec!["Ok_output".to_string()]);
        assert_eq!(discovery.report.outcomes.len(), 5);
        assert!(
            discovery
                .report
                .outcomes
                .iter()
                .all(|o| o.result.status != ConverterStatus::Untested)
        );

        let failures: BTreeMap<_, _> = discovery.report.failures().into_iter().collect();
        assert_eq!(failures["Slow"], TIMEOUT_REASON);
        assert!(failures["Broken"].contains("missing resource"));
        assert!(failures["Exploding"].contains("constructor exploded"));
        assert!(failures["Empty"].contains("empty"));
    }

    #[test]
    fn test_discover_with_nothing_usable_is_fatal() {
        let mut registry = Registry::new();
        registry.register(ConverterDescriptor::new("Broken", broken)).unwrap();

        match discover(&registry, &DiscoveryConfig::default()) {
            Err(DiscoveryError::NoUsableConverters { report }) => {
                assert_eq!(report.unusable_count(), 1);
                assert_eq!(report.status_of("Broken"), Some(ConverterStatus::Unusable));
            }
            Ok(_) => panic!("discovery should fail without usable converters"),
        }
    }
}
