//! List command: probe every converter and print the classification

use std::path::Path;

use crate::cli::commands::{configured_registry, load_config};
use crate::cli::error::CliError;
use crate::discovery::{
    ConverterStatus, DiscoveryConfig, DiscoveryError, DiscoveryReport, discover,
};
use crate::registry::Registry;

/// Handle `--list`
pub fn handle_list(config_path: Option<&Path>, verbose: bool) -> Result<DiscoveryReport, CliError> {
    let config = load_config(config_path)?;
    let registry = configured_registry(&config);
    list_with(&registry, &config.discovery_config(verbose))
}

/// Probe `registry` and print one line per converter. The report is printed
/// even when nothing is usable.
pub fn list_with(
    registry: &Registry,
    config: &DiscoveryConfig,
) -> Result<DiscoveryReport, CliError> {
    match discover(registry, config) {
        Ok(discovery) => {
            for line in report_lines(&discovery.report) {
                println!("{}", line);
            }
            Ok(discovery.report)
        }
        Err(DiscoveryError::NoUsableConverters { report }) => {
            for line in report_lines(&report) {
                println!("{}", line);
            }
            Err(DiscoveryError::NoUsableConverters { report }.into())
        }
    }
}

pub fn report_lines(report: &DiscoveryReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .outcomes
        .iter()
        .map(|outcome| {
            let result = &outcome.result;
            match result.status {
                ConverterStatus::Usable => format!(
                    "✅ {:<20} {:>6}ms",
                    outcome.identifier,
                    result.elapsed.as_millis()
                ),
                ConverterStatus::Unusable => format!(
                    "❌ {:<20} {:>6}ms  {}",
                    outcome.identifier,
                    result.elapsed.as_millis(),
                    result.failure_reason.as_deref().unwrap_or("")
                ),
                ConverterStatus::Untested => format!("·  {:<20}", outcome.identifier),
            }
        })
        .collect();
    lines.push(format!(
        "{} usable, {} unusable",
        report.usable_count(),
        report.unusable_count()
    ));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::{ConversionError, Converter, ConverterDescriptor};

    fn broken() -> Result<Box<dyn Converter>, ConversionError> {
        Err(ConversionError::Instantiation("missing model".to_string()))
    }

    #[test]
    fn test_list_builtin() {
        let report = list_with(&Registry::builtin(), &DiscoveryConfig::default()).unwrap();
        assert_eq!(report.outcomes.len(), Registry::builtin().len());
        assert_eq!(report.status_of("Tone"), Some(ConverterStatus::Unusable));
        assert_eq!(report.status_of("Base64"), Some(ConverterStatus::Usable));

        let lines = report_lines(&report);
        assert!(lines.iter().any(|l| l.starts_with("❌ Tone")));
        assert!(lines.last().unwrap().ends_with("unusable"));
    }

    #[test]
    fn test_list_nothing_usable() {
        let mut registry = Registry::new();
        registry
            .register(ConverterDescriptor::new("Broken", broken))
            .unwrap();

        let result = list_with(&registry, &DiscoveryConfig::default());
        assert!(matches!(result, Err(CliError::Discovery(_))));
    }
}
