//! Core data model for the extracted state machine.
//!
//! Everything here is built once per run by the graph builder and then
//! read-only, except `FnState::inherited` which is mutated by the
//! migration propagator.

pub mod errors;

use std::collections::HashMap;

pub use errors::{Result, StepmapError};

/// Entry state name used by convention.
pub const ENTRY_STATE: &str = "Init";
/// Fallback entry state name when `Init` is not declared.
pub const FALLBACK_ENTRY_STATE: &str = "stepInit";
/// Terminal symbol: a jump whose target is named `Stop` ends the machine.
pub const TERMINAL_STATE: &str = "Stop";

/// The fixed transition vocabulary, keyed by the callee's method name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    Stop,
    Jump,
    ThenJump,
    JumpExt,
    ThenRepeat,
    RepeatOrJumpElse,
    Unrecognized,
}

impl TransitionKind {
    /// Classify a callee method name. The kind depends only on the method
    /// name, never on the receiver object.
    pub fn from_method(name: &str) -> Self {
        match name {
            "Stop" => Self::Stop,
            "Jump" => Self::Jump,
            "ThenJump" => Self::ThenJump,
            "JumpExt" => Self::JumpExt,
            "ThenRepeat" => Self::ThenRepeat,
            "RepeatOrJumpElse" => Self::RepeatOrJumpElse,
            _ => Self::Unrecognized,
        }
    }

    /// Diagram label for plain transition edges.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Stop => "Stop",
            Self::Jump => "Jump",
            Self::ThenJump => "ThenJump",
            Self::JumpExt => "JumpExt",
            Self::ThenRepeat => "ThenRepeat",
            Self::RepeatOrJumpElse => "RepeatOrJumpElse",
            Self::Unrecognized => "Unrecognized",
        }
    }

    /// Chained callees (`ctx.Sleep().ThenRepeat()`) are only expected for
    /// the continuation-builder methods.
    pub fn expects_chained_callee(&self) -> bool {
        matches!(self, Self::ThenJump | Self::ThenRepeat)
    }
}

/// Symbolic pair naming a referenced function: receiver object text and
/// function name (`s.stepFoo` -> object `s`, function `stepFoo`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallTarget {
    pub object: String,
    pub function: String,
}

impl CallTarget {
    pub fn new(object: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            object: object.into(),
            function: function.into(),
        }
    }
}

/// One classified return value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub kind: TransitionKind,
    /// The call that produced this transition; diagnostic only.
    pub callee: CallTarget,
    /// Nested target descriptors, one per call argument.
    pub arguments: Vec<CallTarget>,
    /// Step-migration target parsed from a `JumpExt` struct literal.
    pub secondary_target: Option<String>,
}

impl Transition {
    pub fn unrecognized(callee: CallTarget) -> Self {
        Self {
            kind: TransitionKind::Unrecognized,
            callee,
            arguments: Vec::new(),
            secondary_target: None,
        }
    }

    /// Name of the first argument's function component, used as the
    /// deterministic ordering key for rendering.
    pub fn primary_target(&self) -> &str {
        self.arguments
            .first()
            .map(|a| a.function.as_str())
            .unwrap_or("")
    }
}

/// Default-migration directive declared by a state, resolved by the builder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MigrationDirective {
    /// No `SetDefaultMigration` call found.
    #[default]
    Unset,
    /// Override with a concrete target.
    Target(String),
    /// `SetDefaultMigration(nil)`: no migration, overrides anything inherited.
    Cleared,
}

/// One state per qualifying step function.
#[derive(Debug, Clone)]
pub struct FnState {
    pub name: String,
    /// Receiver name and declared type text; diagnostic only.
    pub receiver: (String, String),
    /// Parameter name to declared type text, in declaration order.
    pub parameters: Vec<(String, String)>,
    /// Classified return values in source order; re-sorted by the
    /// propagator before rendering.
    pub transitions: Vec<Transition>,
    pub directive: MigrationDirective,
    /// Migration targets accumulated from predecessors; deduplicated,
    /// first-seen order. Mutated only during propagation.
    pub inherited: Vec<String>,
}

/// Owned name-keyed graph of states. Nodes may be referenced as targets
/// before their declaration is visited; lookup is lazy, at propagation time.
#[derive(Debug, Default)]
pub struct StateGraph {
    states: HashMap<String, FnState>,
}

impl StateGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, state: FnState) {
        self.states.insert(state.name.clone(), state);
    }

    pub fn get(&self, name: &str) -> Option<&FnState> {
        self.states.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FnState> {
        self.states.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.states.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// Edge styles of the rendered diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeStyle {
    /// `A --> B : label`
    Plain,
    /// `A -[#blue]-> B`, resolved default migration
    Migration,
    /// `A -[#DarkGreen]-> B : JumpExt+(StepMigration)`
    StepMigration,
    /// `A -[#RoyalBlue]-> B : RepeatOr(Jump)Else`
    RepeatBranch,
    /// `A -[#DarkGreen]-> B : RepeatOrJump(Else)`
    ElseBranch,
}

/// One line of the diagram body, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    /// `State : text` annotation (a migration target, `NIL` or `INHERITED`).
    Label { state: String, text: String },
    /// Directed edge between two states.
    Edge {
        from: String,
        to: String,
        style: EdgeStyle,
        label: Option<String>,
    },
    /// `State --> [*]`
    Terminal { state: String },
}

/// The propagator's output: an ordered list of diagram elements. The
/// renderer serializes these verbatim and adds no information.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Diagram {
    pub elements: Vec<Element>,
}

impl Diagram {
    pub fn label(&mut self, state: &str, text: &str) {
        self.elements.push(Element::Label {
            state: state.to_string(),
            text: text.to_string(),
        });
    }

    pub fn edge(&mut self, from: &str, to: &str, style: EdgeStyle, label: Option<&str>) {
        self.elements.push(Element::Edge {
            from: from.to_string(),
            to: to.to_string(),
            style,
            label: label.map(str::to_string),
        });
    }

    pub fn terminal(&mut self, state: &str) {
        self.elements.push(Element::Terminal {
            state: state.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_mapping_is_fixed() {
        assert_eq!(TransitionKind::from_method("Stop"), TransitionKind::Stop);
        assert_eq!(TransitionKind::from_method("Jump"), TransitionKind::Jump);
        assert_eq!(
            TransitionKind::from_method("ThenJump"),
            TransitionKind::ThenJump
        );
        assert_eq!(
            TransitionKind::from_method("JumpExt"),
            TransitionKind::JumpExt
        );
        assert_eq!(
            TransitionKind::from_method("ThenRepeat"),
            TransitionKind::ThenRepeat
        );
        assert_eq!(
            TransitionKind::from_method("RepeatOrJumpElse"),
            TransitionKind::RepeatOrJumpElse
        );
        assert_eq!(
            TransitionKind::from_method("WakeUp"),
            TransitionKind::Unrecognized
        );
    }

    #[test]
    fn chained_callee_expectation() {
        assert!(TransitionKind::ThenJump.expects_chained_callee());
        assert!(TransitionKind::ThenRepeat.expects_chained_callee());
        assert!(!TransitionKind::Jump.expects_chained_callee());
        assert!(!TransitionKind::JumpExt.expects_chained_callee());
    }

    #[test]
    fn primary_target_of_argument_less_transition_is_empty() {
        let t = Transition::unrecognized(CallTarget::new("ctx", "WakeUp"));
        assert_eq!(t.primary_target(), "");
    }
}
