//! Go source model provider.
//!
//! Parses a single Go file with tree-sitter and surfaces method declarations
//! (`func (recv T) Name(params) result`) as [`MethodDecl`] records. Source
//! text is available for any node via [`ParsedUnit::text`], which is how the
//! downstream passes extract type text and chained-callee spans.

use std::fs;
use std::path::{Path, PathBuf};

use tree_sitter::{Node, Parser, Tree};

use crate::core::{Result, StepmapError};

/// Placeholder name for unnamed parameters.
const UNNAMED_PARAM: &str = "unnamed-param";

/// One parsed source unit: the file path, its bytes and the syntax tree.
pub struct ParsedUnit {
    path: PathBuf,
    source: Vec<u8>,
    tree: Tree,
}

/// A method declaration surfaced by the provider. Only what the filter and
/// builder need: name, receiver, parameters, result shape and the body node.
pub struct MethodDecl<'t> {
    pub name: String,
    /// Receiver name and declared type text; absent for plain functions and
    /// for anonymous receivers.
    pub receiver: Option<(String, String)>,
    /// Parameter name to declared type text, in declaration order.
    pub parameters: Vec<(String, String)>,
    /// Whether the declaration has a result list at all.
    pub has_results: bool,
    /// First result as a (qualifier, name) pair when it is a dotted type
    /// reference such as `smachine.StateUpdate`.
    pub first_result: Option<(String, String)>,
    pub body: Option<Node<'t>>,
}

impl ParsedUnit {
    /// Read and parse one Go file. Read and parse failures are fatal.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| StepmapError::ReadSource {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path.to_path_buf())
    }

    /// Parse Go source text. A tree containing syntax errors is rejected:
    /// the analysis has no use for a partially recognized unit.
    pub fn parse(content: &str, path: PathBuf) -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_go::LANGUAGE.into())
            .map_err(|e| StepmapError::TreeSitter(e.to_string()))?;

        let tree = parser
            .parse(content, None)
            .ok_or_else(|| StepmapError::Parse { path: path.clone() })?;
        if tree.root_node().has_error() {
            return Err(StepmapError::Parse { path });
        }

        Ok(Self {
            path,
            source: content.as_bytes().to_vec(),
            tree,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Source text of a node.
    pub fn text(&self, node: Node) -> &str {
        node.utf8_text(&self.source).unwrap_or("")
    }

    /// All top-level method declarations in the unit, in source order.
    pub fn methods(&self) -> Vec<MethodDecl<'_>> {
        let root = self.tree.root_node();
        let mut cursor = root.walk();
        let mut decls = Vec::new();

        for child in root.named_children(&mut cursor) {
            if child.kind() == "method_declaration" {
                if let Some(decl) = self.extract_method(child) {
                    decls.push(decl);
                }
            }
        }
        decls
    }

    fn extract_method<'t>(&'t self, node: Node<'t>) -> Option<MethodDecl<'t>> {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())?;

        let receiver = node
            .child_by_field_name("receiver")
            .and_then(|r| self.extract_receiver(r));

        let parameters = node
            .child_by_field_name("parameters")
            .map(|p| self.extract_param_list(p))
            .unwrap_or_default();

        let result = node.child_by_field_name("result");
        let first_result = result.and_then(|r| self.first_result_ref(r));

        Some(MethodDecl {
            name,
            receiver,
            parameters,
            has_results: result.is_some(),
            first_result,
            body: node.child_by_field_name("body"),
        })
    }

    /// Receiver name and type from the receiver parameter list. Anonymous
    /// receivers (`func (*SM) ...`) yield `None`.
    fn extract_receiver(&self, list: Node) -> Option<(String, String)> {
        let mut cursor = list.walk();
        for child in list.children(&mut cursor) {
            if child.kind() != "parameter_declaration" {
                continue;
            }
            let name = child
                .child_by_field_name("name")
                .map(|n| self.text(n).to_string())?;
            let ty = child
                .child_by_field_name("type")
                .map(|n| self.text(n).to_string())
                .unwrap_or_default();
            return Some((name, ty));
        }
        None
    }

    /// Flatten a parameter list into (name, type text) pairs. Grouped names
    /// (`a, b Type`) each get an entry; unnamed parameters get a
    /// placeholder name.
    fn extract_param_list(&self, list: Node) -> Vec<(String, String)> {
        let mut params = Vec::new();
        let mut cursor = list.walk();

        for child in list.children(&mut cursor) {
            match child.kind() {
                "parameter_declaration" => {
                    let ty = child
                        .child_by_field_name("type")
                        .map(|n| self.text(n).to_string())
                        .unwrap_or_default();

                    let mut names = Vec::new();
                    let mut inner = child.walk();
                    for part in child.children(&mut inner) {
                        if part.kind() == "identifier" {
                            names.push(self.text(part).to_string());
                        }
                    }

                    if names.is_empty() {
                        params.push((UNNAMED_PARAM.to_string(), ty));
                    } else {
                        for name in names {
                            params.push((name, ty.clone()));
                        }
                    }
                }
                "variadic_parameter_declaration" => {
                    let name = child
                        .child_by_field_name("name")
                        .map(|n| self.text(n).to_string())
                        .unwrap_or_else(|| UNNAMED_PARAM.to_string());
                    let ty = child
                        .child_by_field_name("type")
                        .map(|n| format!("...{}", self.text(n)))
                        .unwrap_or_default();
                    params.push((name, ty));
                }
                _ => {}
            }
        }
        params
    }

    /// First declared result as a (qualifier, name) pair when it is a dotted
    /// type reference. Handles both bare results (`smachine.StateUpdate`)
    /// and parenthesized result lists.
    fn first_result_ref(&self, result: Node) -> Option<(String, String)> {
        let ty = match result.kind() {
            "qualified_type" => result,
            "parameter_list" => {
                let mut cursor = result.walk();
                let first = result
                    .children(&mut cursor)
                    .find(|c| c.kind() == "parameter_declaration")?;
                first.child_by_field_name("type")?
            }
            _ => return None,
        };
        if ty.kind() != "qualified_type" {
            return None;
        }
        let package = ty.child_by_field_name("package")?;
        let name = ty.child_by_field_name("name")?;
        Some((self.text(package).to_string(), self.text(name).to_string()))
    }
}
