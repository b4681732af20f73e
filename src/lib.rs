// Export modules for library usage
pub mod analysis;
pub mod analyzers;
pub mod cli;
pub mod commands;
pub mod core;
pub mod io;

// Re-export commonly used types
pub use crate::core::{
    CallTarget, Diagram, EdgeStyle, Element, FnState, MigrationDirective, Result, StateGraph,
    StepmapError, Transition, TransitionKind,
};

pub use crate::analysis::{build_graph, classify_return_value, is_step_function, propagate};
pub use crate::analyzers::{MethodDecl, ParsedUnit};
pub use crate::commands::analyze::analyze_unit;
pub use crate::io::{diagram_path, render, write_diagram};
