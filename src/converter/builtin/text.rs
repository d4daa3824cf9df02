//! Character-level rewrites

use crate::converter::{ConversionError, Converter};
use crate::mode::Mode;

/// Characters separated by single spaces
#[derive(Debug, Clone, Copy, Default)]
pub struct CharacterSpaceConverter;

impl Converter for CharacterSpaceConverter {
    fn transform(&self, text: &str, _mode: Mode) -> Result<String, ConversionError> {
        Ok(join_chars(text, " "))
    }
}

/// Characters joined by a fixed separator
#[derive(Debug, Clone)]
pub struct StringJoinConverter {
    separator: String,
}

impl StringJoinConverter {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }
}

impl Converter for StringJoinConverter {
    fn transform(&self, text: &str, _mode: Mode) -> Result<String, ConversionError> {
        Ok(join_chars(text, &self.separator))
    }
}

fn join_chars(text: &str, separator: &str) -> String {
    text.chars()
        .map(String::from)
        .collect::<Vec<_>>()
        .join(separator)
}

/// Reversed character order
#[derive(Debug, Clone, Copy, Default)]
pub struct FlipConverter;

impl Converter for FlipConverter {
    fn transform(&self, text: &str, _mode: Mode) -> Result<String, ConversionError> {
        Ok(text.chars().rev().collect())
    }
}

/// Deterministic leetspeak substitution
#[derive(Debug, Clone, Copy, Default)]
pub struct LeetspeakConverter;

impl Converter for LeetspeakConverter {
    fn transform(&self, text: &str, _mode: Mode) -> Result<String, ConversionError> {
        Ok(text
            .chars()
            .map(|c| match c.to_ascii_lowercase() {
                'a' => '4',
                'e' => '3',
                'i' => '1',
                'o' => '0',
                's' => '5',
                't' => '7',
                _ => c,
            })
            .collect())
    }
}

/// Latin letters swapped for Cyrillic and Greek look-alikes
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeConfusableConverter;

fn confusable(c: char) -> char {
    match c {
        'a' => '\u{0430}',
        'c' => '\u{0441}',
        'e' => '\u{0435}',
        'i' => '\u{0456}',
        'o' => '\u{043E}',
        'p' => '\u{0440}',
        'x' => '\u{0445}',
        'y' => '\u{0443}',
        'A' => '\u{0391}',
        'B' => '\u{0392}',
        'C' => '\u{0421}',
        'E' => '\u{0395}',
        'H' => '\u{0397}',
        'K' => '\u{039A}',
        'M' => '\u{039C}',
        'O' => '\u{039F}',
        'P' => '\u{03A1}',
        'T' => '\u{03A4}',
        'X' => '\u{03A7}',
        _ => c,
    }
}

impl Converter for UnicodeConfusableConverter {
    fn transform(&self, text: &str, _mode: Mode) -> Result<String, ConversionError> {
        Ok(text.chars().map(confusable).collect())
    }
}
