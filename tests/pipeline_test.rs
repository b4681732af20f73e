use indoc::indoc;
use pretty_assertions::assert_eq;
use std::path::PathBuf;

use stepmap::{build_graph, propagate, render, ParsedUnit};

/// Run the full in-memory pipeline on a Go fixture.
fn diagram_for(src: &str) -> String {
    let unit = ParsedUnit::parse(src, PathBuf::from("fixture.go")).unwrap();
    let mut graph = build_graph(&unit);
    let diagram = propagate(&mut graph).unwrap();
    render(&diagram)
}

const FULL_MACHINE: &str = indoc! {r#"
    package main

    type SM struct{}

    func (s *SM) Init(ctx smachine.InitializationContext) smachine.StateUpdate {
        ctx.SetDefaultMigration(s.migrateStop)
        return ctx.Jump(s.stepExecute)
    }

    func (s *SM) stepExecute(ctx smachine.ExecutionContext) smachine.StateUpdate {
        if s.done {
            return ctx.JumpExt(smachine.SlotStep{Transition: s.stepFinish, Migration: s.migrateFast})
        }
        return ctx.Sleep().ThenRepeat()
    }

    func (s *SM) stepFinish(ctx smachine.ExecutionContext) smachine.StateUpdate {
        ctx.SetDefaultMigration(nil)
        return ctx.Stop()
    }

    func (s *SM) migrateStop(ctx smachine.MigrationContext) smachine.StateUpdate {
        return ctx.Stop()
    }

    func (s *SM) migrateFast(ctx smachine.MigrationContext) smachine.StateUpdate {
        return ctx.Jump(s.stepFinish)
    }
"#};

#[test]
fn full_machine_renders_expected_diagram() {
    let expected = indoc! {"
        @startuml
        Init : migrateStop
        Init -[#blue]-> migrateStop
        Init --> stepExecute : Jump
        migrateStop : INHERITED
        migrateStop --> [*]
        stepExecute : INHERITED
        stepExecute : migrateStop
        stepExecute -[#blue]-> migrateStop
        stepExecute --> stepExecute : ThenRepeat
        stepExecute --> stepFinish : JumpExt
        stepExecute -[#DarkGreen]-> migrateFast : JumpExt+(StepMigration)
        stepFinish : NIL
        stepFinish --> [*]
        migrateFast : INHERITED
        migrateFast --> stepFinish : Jump
        @enduml
    "};
    assert_eq!(diagram_for(FULL_MACHINE), expected);
}

#[test]
fn rerun_on_unchanged_input_is_byte_identical() {
    assert_eq!(diagram_for(FULL_MACHINE), diagram_for(FULL_MACHINE));
}

#[test]
fn fallback_entry_with_explicit_migration_and_jump() {
    // `Init` absent, `stepInit` present with an explicit migration target
    // and a jump to the same state: the target inherits itself.
    let uml = diagram_for(indoc! {r#"
        package main

        func (s *SM) stepInit(ctx smachine.InitializationContext) smachine.StateUpdate {
            ctx.SetDefaultMigration(s.stateA)
            return ctx.Jump(s.stateA)
        }

        func (s *SM) stateA(ctx smachine.ExecutionContext) smachine.StateUpdate {
            return ctx.Jump(s.stateB)
        }

        func (s *SM) stateB(ctx smachine.ExecutionContext) smachine.StateUpdate {
            return ctx.Stop()
        }
    "#});

    assert!(uml.contains("\nstepInit : stateA"));
    assert!(uml.contains("\nstepInit -[#blue]-> stateA"));
    assert!(uml.contains("\nstepInit --> stateA : Jump"));
    assert!(uml.contains("\nstateA : INHERITED"));
    assert!(uml.contains("\nstateA : stateA"));
    assert!(uml.contains("\nstateA -[#blue]-> stateA"));
    assert!(uml.contains("\nstateA --> stateB : Jump"));
    // stateB inherits the set unioned across the jump edge.
    assert!(uml.contains("\nstateB : stateA"));
}

#[test]
fn stop_only_node_has_single_terminal_edge_and_no_migrations() {
    let uml = diagram_for(indoc! {r#"
        package main

        func (s *SM) Init(ctx smachine.InitializationContext) smachine.StateUpdate {
            return ctx.Stop()
        }
    "#});

    let expected = indoc! {"
        @startuml
        Init : INHERITED
        Init --> [*]
        @enduml
    "};
    assert_eq!(uml, expected);
}

#[test]
fn jump_ext_literal_produces_primary_and_step_migration_edges() {
    let uml = diagram_for(indoc! {r#"
        package main

        func (s *SM) Init(ctx smachine.InitializationContext) smachine.StateUpdate {
            return ctx.JumpExt(smachine.SlotStep{Transition: s.stateX, Migration: s.stateY})
        }

        func (s *SM) stateX(ctx smachine.ExecutionContext) smachine.StateUpdate {
            return ctx.Stop()
        }

        func (s *SM) stateY(ctx smachine.ExecutionContext) smachine.StateUpdate {
            return ctx.Stop()
        }
    "#});

    assert!(uml.contains("\nInit --> stateX : JumpExt"));
    assert!(uml.contains("\nInit -[#DarkGreen]-> stateY : JumpExt+(StepMigration)"));
}

#[test]
fn repeat_or_jump_else_draws_exactly_two_branch_edges() {
    let uml = diagram_for(indoc! {r#"
        package main

        func (s *SM) Init(ctx smachine.InitializationContext) smachine.StateUpdate {
            return ctx.RepeatOrJumpElse(s.aFirst, s.bSecond, s.cRepeat, s.dElse)
        }

        func (s *SM) cRepeat(ctx smachine.ExecutionContext) smachine.StateUpdate {
            return ctx.Stop()
        }

        func (s *SM) dElse(ctx smachine.ExecutionContext) smachine.StateUpdate {
            return ctx.Stop()
        }
    "#});

    assert!(uml.contains("\nInit -[#RoyalBlue]-> cRepeat : RepeatOr(Jump)Else"));
    assert!(uml.contains("\nInit -[#DarkGreen]-> dElse : RepeatOrJump(Else)"));
    // The first two arguments contribute no edges of their own.
    assert!(!uml.contains("aFirst"));
    assert!(!uml.contains("bSecond"));
}

#[test]
fn jump_to_stop_symbol_renders_terminal_edge() {
    let uml = diagram_for(indoc! {r#"
        package main

        func (s *SM) Init(ctx smachine.InitializationContext) smachine.StateUpdate {
            return ctx.Jump(s.Stop)
        }
    "#});
    assert!(uml.contains("\nInit --> [*]"));
    assert!(!uml.contains("Init --> Stop"));
}

#[test]
fn then_jump_through_closure_is_flattened() {
    let uml = diagram_for(indoc! {r#"
        package main

        func (s *SM) Init(ctx smachine.InitializationContext) smachine.StateUpdate {
            return ctx.ThenJump(func(ctx smachine.ExecutionContext) smachine.StateUpdate {
                return ctx.Jump(s.Jump)
            })
        }

        func (s *SM) Jump(ctx smachine.ExecutionContext) smachine.StateUpdate {
            return ctx.Stop()
        }
    "#});
    // The closure's `ctx.Jump` callee is spliced in as the ThenJump target.
    assert!(uml.contains("\nInit --> Jump : ThenJump"));
}

#[test]
fn unrecognized_return_shape_yields_no_edge_but_does_not_abort() {
    let uml = diagram_for(indoc! {r#"
        package main

        func (s *SM) Init(ctx smachine.InitializationContext) smachine.StateUpdate {
            if s.odd {
                return s.savedUpdate
            }
            return ctx.Stop()
        }
    "#});
    let expected = indoc! {"
        @startuml
        Init : INHERITED
        Init --> [*]
        @enduml
    "};
    assert_eq!(uml, expected);
}

#[test]
fn missing_entry_state_fails() {
    let unit = ParsedUnit::parse(
        indoc! {r#"
            package main

            func (s *SM) stepLost(ctx smachine.ExecutionContext) smachine.StateUpdate {
                return ctx.Stop()
            }
        "#},
        PathBuf::from("fixture.go"),
    )
    .unwrap();
    let mut graph = build_graph(&unit);
    assert!(propagate(&mut graph).is_err());
}

#[test]
fn undeclared_target_fails() {
    let unit = ParsedUnit::parse(
        indoc! {r#"
            package main

            func (s *SM) Init(ctx smachine.InitializationContext) smachine.StateUpdate {
                return ctx.Jump(s.stepGhost)
            }
        "#},
        PathBuf::from("fixture.go"),
    )
    .unwrap();
    let mut graph = build_graph(&unit);
    assert!(propagate(&mut graph).is_err());
}
