//! Integration tests for the state-machine compiler and the front-end
//! pipeline entry point.

use rulang_compiler::{compile, CompiledProgram};
use rulang_types::FrontendError;

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

/// Compile source, panicking on error.
fn compile_ok(source: &str) -> CompiledProgram {
    compile(source, "test.ru").expect("unexpected compile failure")
}

/// Compile source expecting failure.
fn compile_err(source: &str) -> FrontendError {
    compile(source, "test.ru").expect_err("expected compile failure")
}

// ─────────────────────────────────────────────────────────────────────
// State declarations
// ─────────────────────────────────────────────────────────────────────

#[test]
fn states_get_dense_indices_in_declaration_order() {
    let compiled = compile_ok("state Order { CREATED PAID SHIPPED }");
    let machine = &compiled.machines["Order"];
    assert_eq!(machine.state_count(), 3);
    assert_eq!(machine.state_names, ["CREATED", "PAID", "SHIPPED"]);
    assert_eq!(machine.initial, 0);
    assert_eq!(machine.index_of("CREATED"), Some(0));
    assert_eq!(machine.index_of("PAID"), Some(1));
    assert_eq!(machine.index_of("SHIPPED"), Some(2));
    assert_eq!(machine.index_of("REFUNDED"), None);
}

#[test]
fn multiple_machines_compile_independently() {
    let compiled = compile_ok(
        "state Order { CREATED DONE }
         state Ticket { OPEN CLOSED }",
    );
    assert_eq!(compiled.machines.len(), 2);
    assert_eq!(compiled.machines["Order"].state_names, ["CREATED", "DONE"]);
    assert_eq!(compiled.machines["Ticket"].state_names, ["OPEN", "CLOSED"]);
}

#[test]
fn machine_with_one_state_has_empty_transitions() {
    let compiled = compile_ok("state Flag { SET }");
    let machine = &compiled.machines["Flag"];
    assert_eq!(machine.state_count(), 1);
    assert_eq!(machine.transitions.len(), 1);
    assert!(machine.transitions[0].is_empty());
}

// ─────────────────────────────────────────────────────────────────────
// Transition rules
// ─────────────────────────────────────────────────────────────────────

#[test]
fn declared_pairs_resolve_to_the_declared_target() {
    let compiled = compile_ok(
        "state Order { CREATED PAID SHIPPED }
         transition Order {
             CREATED -> PAID when pay
             PAID -> SHIPPED when ship
         }",
    );
    let machine = &compiled.machines["Order"];
    assert_eq!(machine.target(0, "pay"), Some(1));
    assert_eq!(machine.target(1, "ship"), Some(2));
    assert_eq!(machine.target(0, "ship"), None);
    assert_eq!(machine.target(2, "pay"), None);
}

#[test]
fn dotted_events_are_single_table_keys() {
    let compiled = compile_ok(
        "state Order { CREATED PAID }
         transition Order { CREATED -> PAID when payment.success }",
    );
    let machine = &compiled.machines["Order"];
    assert_eq!(machine.target(0, "payment.success"), Some(1));
    assert_eq!(machine.target(0, "payment"), None);
    assert_eq!(machine.target(0, "success"), None);
}

#[test]
fn later_duplicate_rule_overwrites_earlier() {
    let compiled = compile_ok(
        "state Door { CLOSED OPEN LOCKED }
         transition Door {
             CLOSED -> OPEN when toggle
             CLOSED -> LOCKED when toggle
         }",
    );
    let machine = &compiled.machines["Door"];
    assert_eq!(machine.target(0, "toggle"), Some(2));
}

#[test]
fn rules_may_share_a_source_state() {
    let compiled = compile_ok(
        "state Door { CLOSED OPEN LOCKED }
         transition Door {
             CLOSED -> OPEN when open
             CLOSED -> LOCKED when lock
         }",
    );
    let machine = &compiled.machines["Door"];
    assert_eq!(machine.target(0, "open"), Some(1));
    assert_eq!(machine.target(0, "lock"), Some(2));
}

#[test]
fn transition_blocks_may_be_split() {
    let compiled = compile_ok(
        "state T { A B C }
         transition T { A -> B when x }
         transition T { B -> C when y }",
    );
    let machine = &compiled.machines["T"];
    assert_eq!(machine.target(0, "x"), Some(1));
    assert_eq!(machine.target(1, "y"), Some(2));
}

// ─────────────────────────────────────────────────────────────────────
// Compile errors
// ─────────────────────────────────────────────────────────────────────

#[test]
fn unknown_machine_name_is_a_compile_error() {
    let err = compile_err("transition Ghost { A -> B when go }");
    let FrontendError::Compile(e) = err else {
        panic!("expected compile error, got {err:?}");
    };
    assert!(e.message.contains("Ghost"), "{}", e.message);
}

#[test]
fn unknown_from_state_is_a_compile_error() {
    let err = compile_err(
        "state T { A B }
         transition T { MISSING -> B when go }",
    );
    let FrontendError::Compile(e) = err else {
        panic!("expected compile error, got {err:?}");
    };
    assert!(e.message.contains("MISSING"), "{}", e.message);
    assert_eq!(e.span.start_line, 2);
}

#[test]
fn unknown_to_state_is_a_compile_error() {
    let err = compile_err(
        "state T { A B }
         transition T { A -> MISSING when go }",
    );
    let FrontendError::Compile(e) = err else {
        panic!("expected compile error, got {err:?}");
    };
    assert!(e.message.contains("MISSING"), "{}", e.message);
}

#[test]
fn transition_before_state_declaration_still_resolves() {
    // Pass 1 sees every `state` declaration before pass 2 touches rules,
    // so declaration order between the two blocks does not matter.
    let compiled = compile_ok(
        "transition T { A -> B when go }
         state T { A B }",
    );
    assert_eq!(compiled.machines["T"].target(0, "go"), Some(1));
}

// ─────────────────────────────────────────────────────────────────────
// Pipeline plumbing
// ─────────────────────────────────────────────────────────────────────

#[test]
fn lex_errors_surface_through_the_pipeline() {
    let err = compile_err("let x = @");
    assert!(matches!(err, FrontendError::Lex(_)));
}

#[test]
fn parse_errors_surface_through_the_pipeline() {
    let err = compile_err("let = 3");
    assert!(matches!(err, FrontendError::Parse(_)));
}

#[test]
fn program_body_is_preserved_untouched() {
    let compiled = compile_ok(
        "state T { A }
         let x = 1
         print x",
    );
    // state declaration + two statements, in source order
    assert_eq!(compiled.program.body.len(), 3);
}
