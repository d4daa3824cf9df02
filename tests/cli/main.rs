//! CLI tests module

#[cfg(feature = "cli")]
mod list_tests;
#[cfg(feature = "cli")]
mod run_tests;
