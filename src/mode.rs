//! Interactive vs. non-interactive execution mode
//!
//! The mode is decided once per process and threaded into the components that
//! need it. Converters that model a human gate consult it on every call.

/// Whether a human can be asked for input during conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Prompts may block on a human answer. Only reachable through
    /// [`ModeController::fixed`].
    Interactive,
    /// Batch execution; human gates must resolve without asking
    #[default]
    NonInteractive,
}

impl Mode {
    pub fn is_interactive(self) -> bool {
        matches!(self, Mode::Interactive)
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Interactive => write!(f, "interactive"),
            Mode::NonInteractive => write!(f, "non-interactive"),
        }
    }
}

/// Process-wide mode decision, fixed once built
#[derive(Debug, Clone, Copy)]
pub struct ModeController {
    mode: Mode,
}

impl ModeController {
    /// Mode for dataset and single-prompt runs alike.
    ///
    /// Both are batch executions and must never wait on a human, whatever
    /// terminal happens to be attached.
    pub fn detect() -> Self {
        let mode = Mode::NonInteractive;
        tracing::debug!("Execution mode: {}", mode);
        Self { mode }
    }

    /// Use a fixed mode regardless of the environment
    pub fn fixed(mode: Mode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_interactive(&self) -> bool {
        self.mode.is_interactive()
    }
}

impl Default for ModeController {
    fn default() -> Self {
        Self::fixed(Mode::NonInteractive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detected_mode_is_never_interactive() {
        let controller = ModeController::detect();
        assert!(!controller.is_interactive());
        assert_eq!(controller.mode(), Mode::NonInteractive);
    }

    #[test]
    fn test_fixed_mode() {
        assert!(ModeController::fixed(Mode::Interactive).is_interactive());
        assert!(!ModeController::fixed(Mode::NonInteractive).is_interactive());
        assert!(!ModeController::default().is_interactive());
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(Mode::Interactive.to_string(), "interactive");
        assert_eq!(Mode::NonInteractive.to_string(), "non-interactive");
    }
}
