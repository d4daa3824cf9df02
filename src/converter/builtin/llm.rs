//! Factories for converters that delegate the rewrite to a chat model.
//!
//! No chat target is ever wired into this crate, so both factories fail and
//! discovery drops them.

use crate::converter::ConversionError;

use super::Built;

fn missing_target(converter: &str) -> ConversionError {
    ConversionError::Instantiation(format!(
        "{} requires a chat target and none is configured",
        converter
    ))
}

/// Rewrites a prompt into another grammatical tense
pub(super) fn tense() -> Built {
    Err(missing_target("Tense"))
}

/// Rewrites a prompt in a different tone
pub(super) fn tone() -> Built {
    Err(missing_target("Tone"))
}
