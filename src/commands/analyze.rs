//! Pipeline orchestration: parse, build, propagate, render, write.

use std::path::Path;

use crate::analysis::{build_graph, propagate};
use crate::analyzers::ParsedUnit;
use crate::core::Result;
use crate::io::{render, write_diagram};

/// Run the full pipeline on one source unit and return the rendered
/// diagram text. Nothing is written; callers decide what to do with it.
pub fn analyze_unit(path: &Path) -> Result<String> {
    let unit = ParsedUnit::from_path(path)?;
    let mut graph = build_graph(&unit);
    let diagram = propagate(&mut graph)?;
    Ok(render(&diagram))
}

/// Analyze a source unit and write the diagram next to it. No partial
/// diagram is written when the analysis fails.
pub fn run(path: &Path, console: bool) -> Result<()> {
    let uml = analyze_unit(path)?;

    if console {
        println!("\n\n\n\n\n~~~~~~~~~~~~~~~~~\n{}", uml);
    }

    let written = write_diagram(path, &uml)?;
    println!("Uml saved: {}", written.display());
    Ok(())
}
