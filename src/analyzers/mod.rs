//! Source model providers.
//!
//! A provider turns one source unit into declarations with structured
//! expression trees; the analysis passes never touch the file system or the
//! parser directly.

pub mod go;

pub use go::{MethodDecl, ParsedUnit};
