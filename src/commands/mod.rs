//! Command implementations for the CLI.

pub mod analyze;
