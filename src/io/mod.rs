//! Diagram serialization and file output.

pub mod output;

pub use output::{diagram_path, render, write_diagram};
