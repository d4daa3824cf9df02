//! Row processing
//!
//! Applies the frozen converter set to one record. Each (record, converter)
//! cell is isolated: a converter error or panic becomes an `ERROR:` cell and
//! never touches the other cells of the row.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::converter::{ConversionError, is_blank_output, panic_reason};
use crate::discovery::UsableConverter;
use crate::mode::Mode;

/// Prefix of error cells
pub const ERROR_PREFIX: &str = "ERROR: ";

/// Where a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordId {
    /// Zero-based data row of a dataset
    Row(usize),
    /// Single prompt passed on the command line
    AdHoc,
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Row(i) => write!(f, "row {}", i + 1),
            RecordId::AdHoc => write!(f, "ad-hoc prompt"),
        }
    }
}

/// One input row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRecord {
    pub id: RecordId,
    /// Text handed to every converter
    pub source_text: String,
    /// All source cells, in source column order
    pub fields: Vec<String>,
}

impl InputRecord {
    /// Record for a single ad-hoc prompt
    pub fn ad_hoc(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            id: RecordId::AdHoc,
            fields: vec![text.clone()],
            source_text: text,
        }
    }

    /// Blank records are not sent to converters
    pub fn is_blank(&self) -> bool {
        self.source_text.trim().is_empty()
    }
}

/// Reason a single cell failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMarker {
    pub reason: String,
}

impl fmt::Display for ErrorMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", ERROR_PREFIX, self.reason)
    }
}

/// Content of one converter cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Text(String),
    Error(ErrorMarker),
}

impl CellValue {
    pub fn is_error(&self) -> bool {
        matches!(self, CellValue::Error(_))
    }

    /// Table cell text; errors render as `ERROR: <reason>`
    pub fn render(&self) -> String {
        match self {
            CellValue::Text(text) => text.clone(),
            CellValue::Error(marker) => marker.to_string(),
        }
    }
}

/// Result of one converter on one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOutcome {
    pub converter: String,
    pub value: CellValue,
}

/// Source cells followed by one outcome per usable converter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRecord {
    pub id: RecordId,
    pub source: Vec<String>,
    pub outcomes: Vec<ConversionOutcome>,
    /// Converters were not invoked because the source text was blank
    pub skipped: bool,
    /// The source row could not be decoded; every cell of it is a placeholder
    pub unreadable: bool,
}

impl OutputRecord {
    pub fn error_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.value.is_error()).count()
    }

    pub fn outcome(&self, converter: &str) -> Option<&CellValue> {
        self.outcomes
            .iter()
            .find(|o| o.converter == converter)
            .map(|o| &o.value)
    }

    /// Flatten into table cells
    pub fn cells(&self) -> Vec<String> {
        self.source
            .iter()
            .cloned()
            .chain(self.outcomes.iter().map(|o| o.value.render()))
            .collect()
    }
}

/// Apply every usable converter to `record`. Always returns one outcome per converter.
pub fn apply(record: &InputRecord, usable: &[UsableConverter], mode: Mode) -> OutputRecord {
    if record.is_blank() {
        tracing::debug!("Skipping {}: blank text", record.id);
        return OutputRecord {
            id: record.id,
            source: record.fields.clone(),
            outcomes: usable
                .iter()
                .map(|c| ConversionOutcome {
                    converter: c.identifier.clone(),
                    value: CellValue::Text(String::new()),
                })
                .collect(),
            skipped: true,
            unreadable: false,
        };
    }

    let outcomes = usable
        .iter()
        .map(|converter| {
            let value = match convert_cell(converter, &record.source_text, mode) {
                Ok(text) => CellValue::Text(text),
                Err(e) => {
                    tracing::warn!("  ⚠️  {} failed on {}: {}", converter.identifier, record.id, e);
                    CellValue::Error(ErrorMarker {
                        reason: e.to_string(),
                    })
                }
            };
            ConversionOutcome {
                converter: converter.identifier.clone(),
                value,
            }
        })
        .collect();

    OutputRecord {
        id: record.id,
        source: record.fields.clone(),
        outcomes,
        skipped: false,
        unreadable: false,
    }
}

/// Placeholder for a source row that could not be decoded.
///
/// Keeps the table rectangular: `width` empty source cells and one error cell
/// per converter.
pub fn unreadable(
    id: RecordId,
    width: usize,
    usable: &[UsableConverter],
    reason: &str,
) -> OutputRecord {
    let marker = ErrorMarker {
        reason: format!("Unreadable source row: {}", reason),
    };
    OutputRecord {
        id,
        source: vec![String::new(); width],
        outcomes: usable
            .iter()
            .map(|c| ConversionOutcome {
                converter: c.identifier.clone(),
                value: CellValue::Error(marker.clone()),
            })
            .collect(),
        skipped: false,
        unreadable: true,
    }
}

fn convert_cell(
    converter: &UsableConverter,
    text: &str,
    mode: Mode,
) -> Result<String, ConversionError> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| converter.instance.transform(text, mode)))
        .map_err(|payload| ConversionError::Panicked(panic_reason(payload.as_ref())))??;

    if is_blank_output(&result) {
        return Err(ConversionError::EmptyOutput);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::Converter;
    use std::sync::Arc;

    struct Upper;

    impl Converter for Upper {
        fn transform(&self, text: &str, _mode: Mode) -> Result<String, ConversionError> {
            Ok(text.to_uppercase())
        }
    }

    struct Failing;

    impl Converter for Failing {
        fn transform(&self, _text: &str, _mode: Mode) -> Result<String, ConversionError> {
            Err(ConversionError::Failed("bad input".to_string()))
        }
    }

    struct Panicking;

    impl Converter for Panicking {
        fn transform(&self, _text: &str, _mode: Mode) -> Result<String, ConversionError> {
            panic!("converter bug")
        }
    }

    struct Spaces;

    impl Converter for Spaces {
        fn transform(&self, _text: &str, _mode: Mode) -> Result<String, ConversionError> {
            Ok("  \n".to_string())
        }
    }

    struct Empty;

    impl Converter for Empty {
        fn transform(&self, _text: &str, _mode: Mode) -> Result<String, ConversionError> {
            Ok(String::new())
        }
    }

    fn usable(identifier: &str, instance: Arc<dyn Converter>) -> UsableConverter {
        UsableConverter {
            identifier: identifier.to_string(),
            instance,
        }
    }

    fn record(text: &str) -> InputRecord {
        InputRecord {
            id: RecordId::Row(0),
            source_text: text.to_string(),
            fields: vec![text.to_string()],
        }
    }

    #[test]
    fn test_apply_isolates_failures() {
        let converters = vec![
            usable("Upper", Arc::new(Upper)),
            usable("Failing", Arc::new(Failing)),
            usable("Panicking", Arc::new(Panicking)),
            usable("Empty", Arc::new(Empty)),
            usable("Upper2", Arc::new(Upper)),
        ];

        let output = apply(&record("abc"), &converters, Mode::NonInteractive);

        assert_eq!(output.outcomes.len(), 5);
        assert_eq!(output.error_count(), 3);
        assert_eq!(output.outcome("Upper"), Some(&CellValue::Text("ABC".to_string())));
        assert_eq!(output.outcome("Upper2"), Some(&CellValue::Text("ABC".to_string())));

        let cells = output.cells();
        assert_eq!(cells[0], "abc");
        assert_eq!(cells[2], "ERROR: Conversion failed: bad input");
        assert!(cells[3].starts_with(ERROR_PREFIX));
        assert!(cells[3].contains("converter bug"));
        assert!(cells[4].starts_with(ERROR_PREFIX));
    }

    #[test]
    fn test_apply_blank_record_keeps_shape() {
        let converters = vec![
            usable("Upper", Arc::new(Upper)),
            usable("Failing", Arc::new(Failing)),
        ];

        let output = apply(&record("   "), &converters, Mode::NonInteractive);

        assert!(output.skipped);
        assert_eq!(output.cells(), vec!["   ", "", ""]);
        assert_eq!(output.error_count(), 0);
    }

    #[test]
    fn test_whitespace_output_is_empty_output() {
        let converters = vec![usable("Spaces", Arc::new(Spaces))];

        let output = apply(&record("abc"), &converters, Mode::NonInteractive);

        assert_eq!(
            output.outcome("Spaces"),
            Some(&CellValue::Error(ErrorMarker {
                reason: ConversionError::EmptyOutput.to_string()
            }))
        );
    }

    #[test]
    fn test_unreadable_row_keeps_width() {
        let converters = vec![
            usable("Upper", Arc::new(Upper)),
            usable("Failing", Arc::new(Failing)),
        ];

        let output = unreadable(RecordId::Row(4), 2, &converters, "invalid utf-8");

        assert!(output.unreadable);
        assert_eq!(output.error_count(), 2);
        let cells = output.cells();
        assert_eq!(cells.len(), 4);
        assert_eq!(&cells[..2], &["", ""]);
        assert_eq!(cells[2], "ERROR: Unreadable source row: invalid utf-8");
    }

    #[test]
    fn test_ad_hoc_record() {
        let record = InputRecord::ad_hoc("hello");
        assert_eq!(record.id, RecordId::AdHoc);
        assert_eq!(record.fields, vec!["hello".to_string()]);
        assert_eq!(record.id.to_string(), "ad-hoc prompt");
        assert_eq!(RecordId::Row(0).to_string(), "row 1");
    }
}
