//! Migration propagator.
//!
//! Forward worklist traversal from the entry state. For every reachable
//! node it resolves the effective migration set (clear / override / inherit
//! precedence), emits diagram elements for migrations and transitions, and
//! unions the effective set forward into successors across plain jump
//! edges.
//!
//! Each node is processed exactly once, on first visitation. Migration
//! sets unioned into an already-visited node are recorded on the node but
//! never re-propagated, so results are traversal-order-sensitive for
//! cyclic graphs. This matches the analyzed convention's tooling and is
//! deliberately not a fixed-point solver.

use std::collections::{HashSet, VecDeque};

use log::{debug, warn};

use crate::core::{
    Diagram, EdgeStyle, MigrationDirective, Result, StateGraph, StepmapError, TransitionKind,
    ENTRY_STATE, FALLBACK_ENTRY_STATE, TERMINAL_STATE,
};

/// Label line for states whose migrations were explicitly cleared.
const NIL_LABEL: &str = "NIL";
/// Label line for states relying on inherited migrations.
const INHERITED_LABEL: &str = "INHERITED";

/// Traverse the graph from the entry state and produce the diagram.
///
/// Fails when no entry state exists or when a transition target is
/// declared nowhere in the unit; both are contract violations of the
/// analyzed code, not soft warnings.
pub fn propagate(graph: &mut StateGraph) -> Result<Diagram> {
    let entry = resolve_entry(graph)?;
    let mut diagram = Diagram::default();
    let mut unvisited: VecDeque<String> = VecDeque::from([entry.to_string()]);
    let mut visited: HashSet<String> = HashSet::new();

    while let Some(name) = unvisited.pop_front() {
        if visited.contains(&name) {
            continue;
        }
        let (directive, inherited, mut transitions) = {
            let state = graph
                .get(&name)
                .ok_or_else(|| StepmapError::UnknownState(name.clone()))?;
            debug!("fn: {}", state.name);
            for (par_name, par_type) in &state.parameters {
                debug!("par name: {} | type: {}", par_name, par_type);
            }
            (
                state.directive.clone(),
                state.inherited.clone(),
                state.transitions.clone(),
            )
        };
        visited.insert(name.clone());

        // Effective migrations: an explicit clear beats anything inherited,
        // an explicit target is the only possibility, otherwise whatever
        // predecessors have propagated in so far.
        let effective: Vec<String> = match directive {
            MigrationDirective::Cleared => {
                diagram.label(&name, NIL_LABEL);
                Vec::new()
            }
            MigrationDirective::Target(target) => vec![target],
            MigrationDirective::Unset => {
                diagram.label(&name, INHERITED_LABEL);
                inherited
            }
        };
        for target in &effective {
            diagram.label(&name, target);
            diagram.edge(&name, target, EdgeStyle::Migration, None);
            if !visited.contains(target) {
                unvisited.push_back(target.clone());
            }
        }

        // Deterministic rendering order: arguments by function name, then
        // transitions by primary target name (stable, ties keep source
        // order).
        for transition in &mut transitions {
            transition.arguments.sort_by(|a, b| a.function.cmp(&b.function));
        }
        transitions.sort_by(|a, b| a.primary_target().cmp(b.primary_target()));

        for transition in &transitions {
            match transition.kind {
                TransitionKind::Stop => diagram.terminal(&name),
                TransitionKind::Jump | TransitionKind::ThenJump => {
                    let target = match transition.arguments.first() {
                        Some(target) => target,
                        None => {
                            warn!("{}: {} without a target", name, transition.kind.label());
                            continue;
                        }
                    };
                    if target.function == TERMINAL_STATE {
                        diagram.terminal(&name);
                        continue;
                    }
                    diagram.edge(
                        &name,
                        &target.function,
                        EdgeStyle::Plain,
                        Some(transition.kind.label()),
                    );
                    unvisited.push_back(target.function.clone());
                    // Migration directives propagate forward only across
                    // plain jump edges.
                    if !effective.is_empty() {
                        let successor = graph
                            .get_mut(&target.function)
                            .ok_or_else(|| StepmapError::UnknownState(target.function.clone()))?;
                        union_into(&mut successor.inherited, &effective);
                    }
                }
                TransitionKind::JumpExt => {
                    let target = match transition.arguments.first() {
                        Some(target) => target,
                        None => {
                            warn!("{}: JumpExt without a target", name);
                            continue;
                        }
                    };
                    if target.function == TERMINAL_STATE {
                        diagram.terminal(&name);
                        continue;
                    }
                    diagram.edge(&name, &target.function, EdgeStyle::Plain, Some("JumpExt"));
                    unvisited.push_back(target.function.clone());
                    if let Some(secondary) = &transition.secondary_target {
                        diagram.edge(
                            &name,
                            secondary,
                            EdgeStyle::StepMigration,
                            Some("JumpExt+(StepMigration)"),
                        );
                        unvisited.push_back(secondary.clone());
                    }
                }
                TransitionKind::ThenRepeat => {
                    diagram.edge(&name, &name, EdgeStyle::Plain, Some("ThenRepeat"));
                }
                TransitionKind::RepeatOrJumpElse => {
                    if transition.arguments.len() < 4 {
                        warn!(
                            "{}: RepeatOrJumpElse with {} arguments, expected 4",
                            name,
                            transition.arguments.len()
                        );
                        continue;
                    }
                    let repeat = &transition.arguments[2].function;
                    let or_else = &transition.arguments[3].function;
                    diagram.edge(&name, repeat, EdgeStyle::RepeatBranch, Some("RepeatOr(Jump)Else"));
                    diagram.edge(&name, or_else, EdgeStyle::ElseBranch, Some("RepeatOrJump(Else)"));
                    unvisited.push_back(repeat.clone());
                    unvisited.push_back(or_else.clone());
                }
                TransitionKind::Unrecognized => {
                    debug!(
                        "{}: skipping unrecognized transition {}.{}",
                        name, transition.callee.object, transition.callee.function
                    );
                }
            }
        }
    }
    Ok(diagram)
}

fn resolve_entry(graph: &StateGraph) -> Result<&'static str> {
    if graph.contains(ENTRY_STATE) {
        Ok(ENTRY_STATE)
    } else if graph.contains(FALLBACK_ENTRY_STATE) {
        debug!(
            "entry state {} not declared, falling back to {}",
            ENTRY_STATE, FALLBACK_ENTRY_STATE
        );
        Ok(FALLBACK_ENTRY_STATE)
    } else {
        Err(StepmapError::MissingEntry(ENTRY_STATE, FALLBACK_ENTRY_STATE))
    }
}

/// Set union preserving first-seen order; idempotent, no duplicates.
fn union_into(dst: &mut Vec<String>, src: &[String]) {
    for item in src {
        if !dst.iter().any(|existing| existing == item) {
            dst.push(item.clone());
        }
    }
}
