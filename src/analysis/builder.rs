//! Graph builder.
//!
//! Walks each qualifying method body: return statements at any nesting
//! depth feed the classifier, and non-return statements are scanned for the
//! `SetDefaultMigration` directive. Produces one [`FnState`] per method,
//! keyed by function name. Successor states are not resolved here; lookup
//! is lazy, during propagation.

use log::debug;
use tree_sitter::Node;

use crate::analysis::classify::{classify_return_value, return_values};
use crate::analysis::filter;
use crate::analyzers::ParsedUnit;
use crate::core::{FnState, MigrationDirective, StateGraph, Transition};

/// Method name of the default-migration directive call.
const SET_DEFAULT_MIGRATION: &str = "SetDefaultMigration";

/// Build the state graph for one parsed unit.
pub fn build_graph(unit: &ParsedUnit) -> StateGraph {
    let mut graph = StateGraph::new();

    for decl in unit.methods() {
        if !filter::is_step_function(&decl) {
            continue;
        }
        let body = match decl.body {
            Some(body) => body,
            None => continue,
        };
        // The filter guarantees a context parameter exists.
        let ctx_name = filter::context_param_name(&decl.parameters).unwrap_or("ctx");

        let mut transitions = Vec::new();
        let mut directive = MigrationDirective::Unset;

        let mut cursor = body.walk();
        for stmt in body.named_children(&mut cursor) {
            if stmt.kind() == "return_statement" {
                collect_transitions(unit, stmt, &mut transitions);
            } else {
                scan_statement(unit, stmt, ctx_name, &mut transitions, &mut directive);
            }
        }

        debug!(
            "state {}: {} transitions, directive {:?}",
            decl.name,
            transitions.len(),
            directive
        );
        graph.insert(FnState {
            name: decl.name,
            receiver: decl.receiver.unwrap_or_default(),
            parameters: decl.parameters,
            transitions,
            directive,
            inherited: Vec::new(),
        });
    }
    graph
}

fn collect_transitions(unit: &ParsedUnit, ret: Node, out: &mut Vec<Transition>) {
    for value in return_values(ret) {
        out.push(classify_return_value(unit, value));
    }
}

/// Recursive scan of one non-return statement: picks up return statements
/// nested in conditionals, loops, blocks and closure bodies, and
/// `SetDefaultMigration` calls at any depth.
fn scan_statement(
    unit: &ParsedUnit,
    node: Node,
    ctx_name: &str,
    transitions: &mut Vec<Transition>,
    directive: &mut MigrationDirective,
) {
    let mut returns = Vec::new();
    find_returns_deep(node, &mut returns);
    for ret in returns {
        collect_transitions(unit, ret, transitions);
    }
    scan_directive(unit, node, ctx_name, directive);
}

/// Return statements at any depth below `node`, closure bodies included.
/// The walk stops at each return statement: closures inside its value
/// expressions are consumed by the classifier's own recursion, and
/// re-scanning them would double-count their transitions.
fn find_returns_deep<'t>(node: Node<'t>, out: &mut Vec<Node<'t>>) {
    if node.kind() == "return_statement" {
        out.push(node);
        return;
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        find_returns_deep(child, out);
    }
}

/// Find `ctx.SetDefaultMigration(X)` expression statements below `node`,
/// closure bodies included. A selector argument records an explicit
/// target; a bare identifier (the `nil` sentinel) clears migrations. The
/// last call in scan order wins; branch structure is deliberately ignored.
fn scan_directive(unit: &ParsedUnit, node: Node, ctx_name: &str, directive: &mut MigrationDirective) {
    if node.kind() == "expression_statement" {
        if let Some(call) = node.named_child(0).filter(|c| c.kind() == "call_expression") {
            apply_directive_call(unit, call, ctx_name, directive);
        }
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        scan_directive(unit, child, ctx_name, directive);
    }
}

fn apply_directive_call(
    unit: &ParsedUnit,
    call: Node,
    ctx_name: &str,
    directive: &mut MigrationDirective,
) {
    let selector = match call
        .child_by_field_name("function")
        .filter(|f| f.kind() == "selector_expression")
    {
        Some(sel) => sel,
        None => return,
    };
    let is_directive = selector
        .child_by_field_name("operand")
        .filter(|op| op.kind() == "identifier")
        .map(|op| unit.text(op) == ctx_name)
        .unwrap_or(false)
        && selector
            .child_by_field_name("field")
            .map(|f| unit.text(f) == SET_DEFAULT_MIGRATION)
            .unwrap_or(false);
    if !is_directive {
        return;
    }

    let args = match call.child_by_field_name("arguments") {
        Some(args) => args,
        None => return,
    };
    let mut cursor = args.walk();
    for arg in args.named_children(&mut cursor) {
        match arg.kind() {
            "selector_expression" => {
                if let Some(field) = arg.child_by_field_name("field") {
                    let target = unit.text(field).to_string();
                    debug!("default migration target: {}", target);
                    *directive = MigrationDirective::Target(target);
                }
            }
            "identifier" | "nil" => {
                debug!("default migration cleared");
                *directive = MigrationDirective::Cleared;
            }
            _ => {}
        }
    }
}
