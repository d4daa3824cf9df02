//! Encodings: base64, binary, percent-encoding and Morse code

use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use once_cell::sync::Lazy;

use crate::converter::{ConversionError, Converter};
use crate::mode::Mode;

/// Standard base64 with padding
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64Converter;

impl Converter for Base64Converter {
    fn transform(&self, text: &str, _mode: Mode) -> Result<String, ConversionError> {
        Ok(STANDARD.encode(text.as_bytes()))
    }
}

/// Space-separated 8-bit groups, one per UTF-8 byte
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryConverter;

impl Converter for BinaryConverter {
    fn transform(&self, text: &str, _mode: Mode) -> Result<String, ConversionError> {
        Ok(text
            .bytes()
            .map(|b| format!("{:08b}", b))
            .collect::<Vec<_>>()
            .join(" "))
    }
}

/// Percent-encoding of every reserved character
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlConverter;

impl Converter for UrlConverter {
    fn transform(&self, text: &str, _mode: Mode) -> Result<String, ConversionError> {
        Ok(urlencoding::encode(text).into_owned())
    }
}

/// Morse error signal, used for characters without a code
const MORSE_ERROR: &str = "........";

static MORSE_TABLE: Lazy<HashMap<char, &'static str>> = Lazy::new(|| {
    [
        ('A', ".-"),
        ('B', "-..."),
        ('C', "-.-."),
        ('D', "-.."),
        ('E', "."),
        ('F', "..-."),
        ('G', "--."),
        ('H', "...."),
        ('I', ".."),
        ('J', ".---"),
        ('K', "-.-"),
        ('L', ".-.."),
        ('M', "--"),
        ('N', "-."),
        ('O', "---"),
        ('P', ".--."),
        ('Q', "--.-"),
        ('R', ".-."),
        ('S', "..."),
        ('T', "-"),
        ('U', "..-"),
        ('V', "...-"),
        ('W', ".--"),
        ('X', "-..-"),
        ('Y', "-.--"),
        ('Z', "--.."),
        ('0', "-----"),
        ('1', ".----"),
        ('2', "..---"),
        ('3', "...--"),
        ('4', "....-"),
        ('5', "....."),
        ('6', "-...."),
        ('7', "--..."),
        ('8', "---.."),
        ('9', "----."),
        ('.', ".-.-.-"),
        (',', "--..--"),
        ('?', "..--.."),
        ('\'', ".----."),
        ('!', "-.-.--"),
        ('/', "-..-."),
        ('(', "-.--."),
        (')', "-.--.-"),
        ('&', ".-..."),
        (':', "---..."),
        (';', "-.-.-."),
        ('=', "-...-"),
        ('+', ".-.-."),
        ('-', "-....-"),
        ('_', "..--.-"),
        ('"', ".-..-."),
        ('$', "...-..-"),
        ('@', ".--.-."),
    ]
    .into_iter()
    .collect()
});

/// ITU Morse code; letters separated by spaces, words by `/`
#[derive(Debug, Clone, Copy, Default)]
pub struct MorseConverter;

impl Converter for MorseConverter {
    fn transform(&self, text: &str, _mode: Mode) -> Result<String, ConversionError> {
        let words: Vec<String> = text
            .split_whitespace()
            .map(|word| {
                word.chars()
                    .map(|c| {
                        MORSE_TABLE
                            .get(&c.to_ascii_uppercase())
                            .copied()
                            .unwrap_or(MORSE_ERROR)
                    })
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();
        Ok(words.join(" / "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64() {
        assert_eq!(
            Base64Converter.transform("test", Mode::NonInteractive).unwrap(),
            "dGVzdA=="
        );
        assert_eq!(
            Base64Converter.transform("hello", Mode::NonInteractive).unwrap(),
            "aGVsbG8="
        );
    }

    #[test]
    fn test_binary() {
        assert_eq!(
            BinaryConverter.transform("Hi", Mode::NonInteractive).unwrap(),
            "01001000 01101001"
        );
    }

    #[test]
    fn test_url() {
        assert_eq!(
            UrlConverter.transform("a b&c", Mode::NonInteractive).unwrap(),
            "a%20b%26c"
        );
    }

    #[test]
    fn test_morse() {
        assert_eq!(
            MorseConverter.transform("sos hi", Mode::NonInteractive).unwrap(),
            "... --- ... / .... .."
        );
    }

    #[test]
    fn test_morse_unknown_character() {
        assert_eq!(
            MorseConverter.transform("a#", Mode::NonInteractive).unwrap(),
            ".- ........"
        );
    }
}
