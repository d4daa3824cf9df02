//! List command tests

use std::io::Write;

use prompt_enricher::ConverterStatus;
use prompt_enricher::cli::commands::list::handle_list;
use prompt_enricher::cli::error::CliError;
use tempfile::NamedTempFile;

#[test]
fn test_cli_list_respects_disabled() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"[discovery]
disabled = ["Morse", "Flip"]
probe_timeout_secs = 2.0"#
    )
    .unwrap();
    file.flush().unwrap();

    let report = handle_list(Some(file.path()), false).unwrap();

    assert!(report.status_of("Morse").is_none());
    assert!(report.status_of("Flip").is_none());
    assert_eq!(report.status_of("Base64"), Some(ConverterStatus::Usable));
}

#[test]
fn test_cli_list_missing_config() {
    let result = handle_list(Some(std::path::Path::new("/no/such/config.toml")), false);
    assert!(matches!(result, Err(CliError::Config(_))));
}
