//! Transition classifier.
//!
//! Turns one return-value expression into a [`Transition`]. The recognized
//! shape is a call with a dotted callee (`object.Method(...)`); anything
//! else is `Unrecognized` and only warned about, never fatal. Closures
//! passed as call arguments are classified recursively and their callees
//! spliced into the outer argument list.

use log::{debug, warn};
use tree_sitter::Node;

use crate::analyzers::ParsedUnit;
use crate::core::{CallTarget, Transition, TransitionKind};

/// Hard cap on closure nesting. The analyzed convention never nests deeper
/// than two or three levels; the cap keeps a degenerate input from
/// recursing without bound.
const MAX_CLOSURE_DEPTH: usize = 32;

/// `JumpExt` struct literal field naming the primary target.
const LITERAL_TRANSITION_FIELD: &str = "Transition";
/// `JumpExt` struct literal field naming the step-migration target.
const LITERAL_MIGRATION_FIELD: &str = "Migration";

/// Classify a single return-value expression.
pub fn classify_return_value(unit: &ParsedUnit, value: Node) -> Transition {
    classify_at_depth(unit, value, 0)
}

fn classify_at_depth(unit: &ParsedUnit, value: Node, depth: usize) -> Transition {
    if value.kind() != "call_expression" {
        warn!(
            "unrecognized return value shape `{}` (not a call)",
            unit.text(value)
        );
        return Transition::unrecognized(CallTarget::default());
    }

    let selector = match value
        .child_by_field_name("function")
        .filter(|f| f.kind() == "selector_expression")
    {
        Some(sel) => sel,
        None => {
            warn!(
                "unrecognized return call `{}` (callee is not a dotted reference)",
                unit.text(value)
            );
            return Transition::unrecognized(CallTarget::default());
        }
    };

    let method = selector
        .child_by_field_name("field")
        .map(|f| unit.text(f).to_string())
        .unwrap_or_default();
    let kind = TransitionKind::from_method(&method);

    let object = match selector.child_by_field_name("operand") {
        Some(op) if op.kind() == "identifier" => unit.text(op).to_string(),
        Some(op) if op.kind() == "call_expression" => {
            // Chained builder callee, e.g. `ctx.Sleep().ThenRepeat()`.
            if !kind.expects_chained_callee() {
                warn!(
                    "unexpected chained callee for `{}` in `{}`",
                    method,
                    unit.text(value)
                );
            }
            unit.text(op).to_string()
        }
        Some(op) => {
            debug!(
                "unrecognized callee operand `{}` in `{}`",
                unit.text(op),
                unit.text(value)
            );
            unit.text(op).to_string()
        }
        None => String::new(),
    };
    let callee = CallTarget::new(object, method.clone());

    if kind == TransitionKind::Unrecognized {
        warn!(
            "unknown transition method `{}.{}` in `{}`",
            callee.object,
            callee.function,
            unit.text(value)
        );
    }

    let mut transition = Transition {
        kind,
        callee,
        arguments: Vec::new(),
        secondary_target: None,
    };

    if let Some(args) = value.child_by_field_name("arguments") {
        let mut cursor = args.walk();
        for arg in args.named_children(&mut cursor) {
            classify_argument(unit, arg, depth, &mut transition);
        }
    }
    transition
}

fn classify_argument(unit: &ParsedUnit, arg: Node, depth: usize, transition: &mut Transition) {
    match arg.kind() {
        "selector_expression" => {
            if let Some(target) = selector_target(unit, arg) {
                transition.arguments.push(target);
            }
        }
        "composite_literal" => {
            if transition.kind == TransitionKind::JumpExt {
                classify_literal(unit, arg, transition);
            } else {
                warn!(
                    "struct literal argument is only valid for JumpExt, found in `{}.{}`",
                    transition.callee.object, transition.callee.function
                );
            }
        }
        "func_literal" => {
            if depth >= MAX_CLOSURE_DEPTH {
                warn!(
                    "closure nesting exceeds {} levels in `{}.{}`, not descending",
                    MAX_CLOSURE_DEPTH, transition.callee.object, transition.callee.function
                );
                return;
            }
            // Flatten the closure: every transition returned inside it
            // contributes its own callee descriptor as if it had been
            // passed directly.
            if let Some(body) = arg.child_by_field_name("body") {
                let mut returns = Vec::new();
                find_return_statements(body, &mut returns);
                for ret in returns {
                    for value in return_values(ret) {
                        let nested = classify_at_depth(unit, value, depth + 1);
                        transition.arguments.push(nested.callee);
                    }
                }
            }
        }
        _ => {
            warn!(
                "unsupported argument `{}` in `{}.{}`, omitted",
                unit.text(arg),
                transition.callee.object,
                transition.callee.function
            );
        }
    }
}

/// `JumpExt` struct literal: `{Transition: s.stepX, Migration: s.migY}`.
fn classify_literal(unit: &ParsedUnit, literal: Node, transition: &mut Transition) {
    let body = match literal.child_by_field_name("body") {
        Some(b) => b,
        None => return,
    };
    let mut cursor = body.walk();
    for element in body.named_children(&mut cursor) {
        if element.kind() != "keyed_element" {
            continue;
        }
        let (key, val) = match (element.named_child(0), element.named_child(1)) {
            (Some(k), Some(v)) => (unwrap_literal_element(k), unwrap_literal_element(v)),
            _ => continue,
        };
        match unit.text(key) {
            LITERAL_TRANSITION_FIELD => {
                if let Some(target) = selector_target(unit, val) {
                    debug!("literal transition target: {}", target.function);
                    transition.arguments.push(target);
                }
            }
            LITERAL_MIGRATION_FIELD => {
                if let Some(target) = selector_target(unit, val) {
                    debug!("literal migration target: {}", target.function);
                    transition.secondary_target = Some(target.function);
                }
            }
            other => {
                warn!(
                    "unknown field `{}` in `{}.{}` literal",
                    other, transition.callee.object, transition.callee.function
                );
            }
        }
    }
}

/// The Go grammar wraps keyed-element keys and values in `literal_element`
/// nodes; unwrap to reach the expression itself.
fn unwrap_literal_element(node: Node) -> Node {
    if node.kind() == "literal_element" {
        node.named_child(0).unwrap_or(node)
    } else {
        node
    }
}

fn selector_target(unit: &ParsedUnit, node: Node) -> Option<CallTarget> {
    if node.kind() != "selector_expression" {
        return None;
    }
    let operand = node.child_by_field_name("operand")?;
    let field = node.child_by_field_name("field")?;
    Some(CallTarget::new(unit.text(operand), unit.text(field)))
}

/// Collect `return_statement` nodes at any depth below `node`, without
/// descending into `func_literal` bodies: those belong to the closure and
/// are consumed by the classifier's own recursion.
pub(crate) fn find_return_statements<'t>(node: Node<'t>, out: &mut Vec<Node<'t>>) {
    if node.kind() == "func_literal" {
        return;
    }
    if node.kind() == "return_statement" {
        out.push(node);
        return;
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        find_return_statements(child, out);
    }
}

/// The value expressions of a return statement, in source order.
pub(crate) fn return_values(ret: Node) -> Vec<Node> {
    let mut values = Vec::new();
    let mut cursor = ret.walk();
    for child in ret.named_children(&mut cursor) {
        if child.kind() == "expression_list" {
            let mut inner = child.walk();
            values.extend(child.named_children(&mut inner));
        }
    }
    values
}
