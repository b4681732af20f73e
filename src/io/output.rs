//! PlantUML rendering and output file writing.
//!
//! The renderer is a straight serialization of [`Diagram`] elements; it
//! adds no information of its own. The notation is byte-stable so that
//! re-running the pipeline on unchanged input produces identical output.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::{Diagram, EdgeStyle, Element, Result};

/// Extension of the written diagram file.
const DIAGRAM_EXTENSION: &str = "plantuml";

/// Serialize a diagram to PlantUML text.
pub fn render(diagram: &Diagram) -> String {
    let mut uml = String::from("@startuml");
    for element in &diagram.elements {
        uml.push('\n');
        match element {
            Element::Label { state, text } => {
                uml.push_str(&format!("{} : {}", state, text));
            }
            Element::Edge {
                from,
                to,
                style,
                label,
            } => {
                uml.push_str(&format!("{} {} {}", from, arrow(*style), to));
                if let Some(label) = label {
                    uml.push_str(&format!(" : {}", label));
                }
            }
            Element::Terminal { state } => {
                uml.push_str(&format!("{} --> [*]", state));
            }
        }
    }
    uml.push_str("\n@enduml\n");
    uml
}

fn arrow(style: EdgeStyle) -> &'static str {
    match style {
        EdgeStyle::Plain => "-->",
        EdgeStyle::Migration => "-[#blue]->",
        EdgeStyle::StepMigration => "-[#DarkGreen]->",
        EdgeStyle::RepeatBranch => "-[#RoyalBlue]->",
        EdgeStyle::ElseBranch => "-[#DarkGreen]->",
    }
}

/// Output path: sibling of the input, same stem, diagram extension.
pub fn diagram_path(input: &Path) -> PathBuf {
    input.with_extension(DIAGRAM_EXTENSION)
}

/// Write the rendered diagram next to the analyzed source file and return
/// the written path.
pub fn write_diagram(input: &Path, uml: &str) -> Result<PathBuf> {
    let path = diagram_path(input);
    fs::write(&path, uml)?;
    Ok(path)
}
