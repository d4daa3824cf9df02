//! Substitution ciphers

use crate::converter::{ConversionError, Converter};
use crate::mode::Mode;

fn shift_letter(c: char, offset: u8) -> char {
    let base = match c {
        'a'..='z' => b'a',
        'A'..='Z' => b'A',
        _ => return c,
    };
    let rotated = (c as u8 - base + offset) % 26;
    (base + rotated) as char
}

/// Caesar shift over ASCII letters, case preserved
#[derive(Debug, Clone, Copy)]
pub struct CaesarConverter {
    offset: u8,
}

impl CaesarConverter {
    /// Offsets must lie in `0..=25`
    pub fn new(offset: i32) -> Result<Self, ConversionError> {
        if !(0..=25).contains(&offset) {
            return Err(ConversionError::Instantiation(format!(
                "caesar offset must be between 0 and 25, got {}",
                offset
            )));
        }
        Ok(Self {
            offset: offset as u8,
        })
    }

    pub fn offset(&self) -> u8 {
        self.offset
    }
}

impl Converter for CaesarConverter {
    fn transform(&self, text: &str, _mode: Mode) -> Result<String, ConversionError> {
        Ok(text.chars().map(|c| shift_letter(c, self.offset)).collect())
    }
}

/// ROT13
#[derive(Debug, Clone, Copy)]
pub struct Rot13Converter {
    inner: CaesarConverter,
}

impl Rot13Converter {
    pub fn new() -> Self {
        Self {
            inner: CaesarConverter { offset: 13 },
        }
    }
}

impl Default for Rot13Converter {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter for Rot13Converter {
    fn transform(&self, text: &str, mode: Mode) -> Result<String, ConversionError> {
        self.inner.transform(text, mode)
    }
}

/// Mirror-alphabet substitution (a <-> z)
#[derive(Debug, Clone, Copy, Default)]
pub struct AtbashConverter;

impl Converter for AtbashConverter {
    fn transform(&self, text: &str, _mode: Mode) -> Result<String, ConversionError> {
        Ok(text
            .chars()
            .map(|c| match c {
                'a'..='z' => (b'z' - (c as u8 - b'a')) as char,
                'A'..='Z' => (b'Z' - (c as u8 - b'A')) as char,
                _ => c,
            })
            .collect())
    }
}
