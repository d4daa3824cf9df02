//! Human review gate

use std::io::{BufRead, Write};

use crate::converter::{ConversionError, Converter};
use crate::mode::Mode;

/// Lets an operator rewrite each prompt by hand.
///
/// In non-interactive mode the prompt passes through unchanged. In interactive
/// mode the operator is asked on stderr; a blank answer (or end of input) keeps
/// the original text.
#[derive(Debug, Clone, Copy, Default)]
pub struct HumanInTheLoopConverter;

impl HumanInTheLoopConverter {
    fn ask(&self, text: &str) -> Result<String, ConversionError> {
        let mut stderr = std::io::stderr().lock();
        writeln!(stderr, "\n[HumanInTheLoop] {}", text)
            .and_then(|_| write!(stderr, "Replacement (blank to keep): "))
            .and_then(|_| stderr.flush())
            .map_err(|e| ConversionError::Failed(format!("prompt write failed: {}", e)))?;

        let mut answer = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut answer)
            .map_err(|e| ConversionError::Failed(format!("prompt read failed: {}", e)))?;

        let answer = answer.trim_end_matches(['\r', '\n']);
        if answer.trim().is_empty() {
            Ok(text.to_string())
        } else {
            Ok(answer.to_string())
        }
    }
}

impl Converter for HumanInTheLoopConverter {
    fn transform(&self, text: &str, mode: Mode) -> Result<String, ConversionError> {
        match mode {
            Mode::Interactive => self.ask(text),
            Mode::NonInteractive => Ok(text.to_string()),
        }
    }

    fn requires_interaction(&self) -> bool {
        true
    }
}
