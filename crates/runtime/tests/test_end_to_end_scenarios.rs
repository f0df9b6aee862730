//! End-to-end interpretation scenarios: literal program in, literal stdout
//! (or exit status) out. Each test drives the VM through its public
//! `interpret` entry point exactly as the CLI would, with output captured
//! into an in-memory buffer instead of real stdout.

use slorp_runtime::{InterpretResult, Vm, VmConfig};

fn interpret(source: &str) -> (InterpretResult, String) {
    let mut buf = Vec::new();
    let mut vm = Vm::with_writer(VmConfig::default(), &mut buf);
    let result = vm.interpret(source);
    (result, String::from_utf8(buf).unwrap())
}

#[test]
fn scenario_1_arithmetic_precedence() {
    let (result, out) = interpret("print 1 + 2 * 3;");
    assert_eq!(result, InterpretResult::Ok);
    assert_eq!(out, "7\n");
}

#[test]
fn scenario_2_string_concatenation() {
    let (result, out) = interpret("print \"foo\" + \"bar\";");
    assert_eq!(result, InterpretResult::Ok);
    assert_eq!(out, "foobar\n");
}

#[test]
fn scenario_3_globals_addition() {
    let (result, out) = interpret("dat a = 1; dat b = 2; print a + b;");
    assert_eq!(result, InterpretResult::Ok);
    assert_eq!(out, "3\n");
}

#[test]
fn scenario_4_nested_block_scope_shadowing() {
    let (result, out) = interpret("{ dat x = 10; { dat x = 20; print x; } print x; }");
    assert_eq!(result, InterpretResult::Ok);
    assert_eq!(out, "20\n10\n");
}

#[test]
fn scenario_5_global_reassignment() {
    let (result, out) = interpret("dat a = 1; a = a + 41; print a;");
    assert_eq!(result, InterpretResult::Ok);
    assert_eq!(out, "42\n");
}

#[test]
fn scenario_6_self_referential_local_initializer_is_rejected() {
    let (result, _) = interpret("dat a = 1; { dat a = a; }");
    assert_eq!(result, InterpretResult::CompileError);
}

#[test]
fn scenario_7_comparison_and_equality() {
    let (result, out) = interpret("print (1 < 2) == !nil;");
    assert_eq!(result, InterpretResult::Ok);
    assert_eq!(out, "true\n");
}

#[test]
fn scenario_8_undefined_variable_is_a_runtime_error() {
    let (result, out) = interpret("print undefined_name;");
    assert_eq!(result, InterpretResult::RuntimeError);
    assert_eq!(out, "");
}

#[test]
fn scenario_9_mixed_type_addition_is_a_runtime_error() {
    let (result, out) = interpret("print \"a\" + 1;");
    assert_eq!(result, InterpretResult::RuntimeError);
    assert_eq!(out, "");
}

#[test]
fn multiple_interpret_calls_share_globals_and_intern_set() {
    let mut buf = Vec::new();
    let mut vm = Vm::with_writer(VmConfig::default(), &mut buf);
    assert_eq!(vm.interpret("dat counter = 1;"), InterpretResult::Ok);
    assert_eq!(vm.interpret("counter = counter + 1;"), InterpretResult::Ok);
    assert_eq!(vm.interpret("print counter;"), InterpretResult::Ok);
    assert_eq!(String::from_utf8(buf).unwrap(), "2\n");
}

#[test]
fn a_runtime_error_does_not_poison_later_interpret_calls() {
    let mut buf = Vec::new();
    let mut vm = Vm::with_writer(VmConfig::default(), &mut buf);
    assert_eq!(
        vm.interpret("print undefined_name;"),
        InterpretResult::RuntimeError
    );
    assert_eq!(vm.interpret("print 1 + 1;"), InterpretResult::Ok);
    assert_eq!(String::from_utf8(buf).unwrap(), "2\n");
}
