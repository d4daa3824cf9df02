//! Built-in converter catalog
//!
//! The catalog order is the output column order and must stay stable.

mod cipher;
mod encoding;
mod human;
mod llm;
mod text;

pub use cipher::{AtbashConverter, CaesarConverter, Rot13Converter};
pub use encoding::{Base64Converter, BinaryConverter, MorseConverter, UrlConverter};
pub use human::HumanInTheLoopConverter;
pub use text::{
    CharacterSpaceConverter, FlipConverter, LeetspeakConverter, StringJoinConverter,
    UnicodeConfusableConverter,
};

use super::{Converter, ConverterDescriptor, ConversionError};

use llm::{tense, tone};

type Built = Result<Box<dyn Converter>, ConversionError>;

fn atbash() -> Built {
    Ok(Box::new(AtbashConverter))
}

fn base64() -> Built {
    Ok(Box::new(Base64Converter))
}

fn binary() -> Built {
    Ok(Box::new(BinaryConverter))
}

fn caesar() -> Built {
    Ok(Box::new(CaesarConverter::new(13)?))
}

fn character_space() -> Built {
    Ok(Box::new(CharacterSpaceConverter))
}

fn flip() -> Built {
    Ok(Box::new(FlipConverter))
}

fn human_in_the_loop() -> Built {
    Ok(Box::new(HumanInTheLoopConverter))
}

fn leetspeak() -> Built {
    Ok(Box::new(LeetspeakConverter))
}

fn morse() -> Built {
    Ok(Box::new(MorseConverter))
}

fn rot13() -> Built {
    Ok(Box::new(Rot13Converter::new()))
}

fn string_join() -> Built {
    Ok(Box::new(StringJoinConverter::new("-")))
}

fn unicode_confusable() -> Built {
    Ok(Box::new(UnicodeConfusableConverter))
}

fn url() -> Built {
    Ok(Box::new(UrlConverter))
}

/// Every converter shipped with the crate, in column order
pub fn catalog() -> Vec<ConverterDescriptor> {
    vec![
        ConverterDescriptor::new("Atbash", atbash),
        ConverterDescriptor::new("Base64", base64),
        ConverterDescriptor::new("Binary", binary),
        ConverterDescriptor::new("Caesar", caesar),
        ConverterDescriptor::new("CharacterSpace", character_space),
        ConverterDescriptor::new("Flip", flip),
        ConverterDescriptor::new("HumanInTheLoop", human_in_the_loop),
        ConverterDescriptor::new("Leetspeak", leetspeak),
        ConverterDescriptor::new("Morse", morse),
        ConverterDescriptor::new("Rot13", rot13),
        ConverterDescriptor::new("StringJoin", string_join),
        ConverterDescriptor::new("Tense", tense),
        ConverterDescriptor::new("Tone", tone),
        ConverterDescriptor::new("UnicodeConfusable", unicode_confusable),
        ConverterDescriptor::new("Url", url),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::Mode;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_identifiers_unique() {
        let catalog = catalog();
        let ids: HashSet<_> = catalog.iter().map(|d| d.identifier).collect();
        assert_eq!(ids.len(), catalog.len(), "identifiers must be unique");
    }

    #[test]
    fn test_catalog_is_sorted() {
        let ids: Vec<_> = catalog().iter().map(|d| d.identifier).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_llm_converters_fail_to_instantiate() {
        for descriptor in catalog() {
            let built = descriptor.instantiate();
            match descriptor.identifier {
                "Tense" | "Tone" => {
                    assert!(matches!(built, Err(ConversionError::Instantiation(_))))
                }
                _ => assert!(built.is_ok(), "{} should build", descriptor.identifier),
            }
        }
    }

    #[test]
    fn test_buildable_converters_handle_canary() {
        for descriptor in catalog() {
            if let Ok(converter) = descriptor.instantiate() {
                let out = converter.transform("test", Mode::NonInteractive).unwrap();
                assert!(!out.is_empty(), "{} returned empty", descriptor.identifier);
            }
        }
    }
}
