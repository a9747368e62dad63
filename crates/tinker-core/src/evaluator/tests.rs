use pretty_assertions::assert_eq;

use crate::runtime::Runtime;

use super::{EvaluatorError, Value};

fn eval(source: &str, args: &[Value]) -> Result<Value, anyhow::Error> {
    let runtime = Runtime::new()?;
    let id = runtime.define(source)?;
    runtime.call(id, args)
}

fn eval_ok(source: &str, args: &[Value]) -> Value {
    eval(source, args).unwrap()
}

#[test]
fn returns_a_constant() {
    assert_eq!(eval_ok("def f(): return 42", &[]), Value::Integer(42));
}

#[test]
fn missing_return_yields_null() {
    assert_eq!(eval_ok("def f(): pass", &[]), Value::Null);
}

#[test]
fn arguments_bind_to_parameters() {
    let out = eval_ok(
        "def add(a, b):\n    return a + b\n",
        &[Value::Integer(2), Value::Integer(3)],
    );
    assert_eq!(out, Value::Integer(5));
}

#[test]
fn arity_mismatch() {
    let err = eval("def f(a): return a", &[]).unwrap_err();
    let err = err.downcast::<EvaluatorError>().unwrap();
    assert!(matches!(err, EvaluatorError::Arity { expected: 1, got: 0, .. }));
}

#[test]
fn division_is_true_division() {
    assert_eq!(
        eval_ok("def f(): return 7 / 2", &[]),
        Value::Float(3.5)
    );
    let err = eval("def f(): return 1 / 0", &[]).unwrap_err();
    let err = err.downcast::<EvaluatorError>().unwrap();
    assert!(matches!(err, EvaluatorError::DivisionByZero));
}

#[test]
fn modulo_follows_sign_of_divisor_for_positive_divisors() {
    assert_eq!(eval_ok("def f(): return -7 % 3", &[]), Value::Integer(2));
}

#[test]
fn power_stays_integer_when_it_can() {
    assert_eq!(eval_ok("def f(): return 2 ** 10", &[]), Value::Integer(1024));
    assert_eq!(eval_ok("def f(): return 2 ** -1", &[]), Value::Float(0.5));
    assert_eq!(
        eval_ok("def f(x): return x ** 0.5", &[Value::Integer(4)]),
        Value::Float(2.0)
    );
}

#[test]
fn string_concatenation() {
    assert_eq!(
        eval_ok("def f(): return \"foo\" + \"bar\"", &[]),
        Value::String("foobar".into())
    );
}

#[test]
fn mixed_type_addition_is_an_error() {
    let err = eval("def f(): return 1 + \"x\"", &[]).unwrap_err();
    let err = err.downcast::<EvaluatorError>().unwrap();
    assert!(matches!(err, EvaluatorError::BinaryTypeError { .. }));
}

#[test]
fn branches_take_the_first_true_arm() {
    let src = "def sign(x):\n    if x > 0:\n        return 1\n    elif x < 0:\n        return -1\n    else:\n        return 0\n";
    assert_eq!(eval_ok(src, &[Value::Integer(9)]), Value::Integer(1));
    assert_eq!(eval_ok(src, &[Value::Integer(-9)]), Value::Integer(-1));
    assert_eq!(eval_ok(src, &[Value::Integer(0)]), Value::Integer(0));
}

#[test]
fn while_loops_and_reassignment() {
    let src = "def triangle(n):\n    total = 0\n    i = 1\n    while i <= n:\n        total = total + i\n        i = i + 1\n    return total\n";
    assert_eq!(eval_ok(src, &[Value::Integer(4)]), Value::Integer(10));
}

#[test]
fn return_exits_a_loop() {
    let src = "def first(n):\n    i = 0\n    while True:\n        if i >= n:\n            return i\n        i = i + 1\n";
    assert_eq!(eval_ok(src, &[Value::Integer(3)]), Value::Integer(3));
}

#[test]
fn logical_operators_short_circuit() {
    // the unknown function on the rhs must never be evaluated
    assert_eq!(
        eval_ok("def f(): return False and boom()", &[]),
        Value::Boolean(false)
    );
    assert_eq!(
        eval_ok("def f(): return 1 or boom()", &[]),
        Value::Integer(1)
    );
}

#[test]
fn unknown_identifier() {
    let err = eval("def f(): return nope", &[]).unwrap_err();
    let err = err.downcast::<EvaluatorError>().unwrap();
    assert!(matches!(err, EvaluatorError::VariableNotFound { .. }));
}

#[test]
fn unknown_function() {
    let err = eval("def f(): return nope()", &[]).unwrap_err();
    let err = err.downcast::<EvaluatorError>().unwrap();
    assert!(matches!(err, EvaluatorError::FunctionNotFound { .. }));
}

#[test]
fn functions_call_each_other_by_name() {
    let runtime = Runtime::new().unwrap();
    runtime.define("def double(x):\n    return x * 2\n").unwrap();
    let id = runtime
        .define("def quad(x):\n    return double(double(x))\n")
        .unwrap();
    assert_eq!(
        runtime.call(id, &[Value::Integer(3)]).unwrap(),
        Value::Integer(12)
    );
}

#[test]
fn recursion_hits_the_depth_guard() {
    let runtime = Runtime::new().unwrap();
    let id = runtime.define("def loop():\n    return loop()\n").unwrap();
    let err = runtime.call(id, &[]).unwrap_err();
    let err = err.downcast::<EvaluatorError>().unwrap();
    assert!(matches!(err, EvaluatorError::DepthExceeded));
}

#[test]
fn bounded_recursion_still_completes() {
    let runtime = Runtime::new().unwrap();
    let id = runtime
        .define("def fact(n):\n    if n <= 1:\n        return 1\n    return n * fact(n - 1)\n")
        .unwrap();
    assert_eq!(
        runtime.call(id, &[Value::Integer(12)]).unwrap(),
        Value::Integer(479_001_600)
    );
}

#[test]
fn depth_limit_is_configurable() {
    let runtime = Runtime::with_config(crate::TinkerConfig {
        max_eval_depth: 4,
        ..Default::default()
    })
    .unwrap();
    let id = runtime
        .define("def fact(n):\n    if n <= 1:\n        return 1\n    return n * fact(n - 1)\n")
        .unwrap();
    assert!(runtime.call(id, &[Value::Integer(3)]).is_ok());
    let err = runtime.call(id, &[Value::Integer(40)]).unwrap_err();
    let err = err.downcast::<EvaluatorError>().unwrap();
    assert!(matches!(err, EvaluatorError::DepthExceeded));
}

#[test]
fn cross_type_numeric_equality() {
    assert_eq!(eval_ok("def f(): return 1 == 1.0", &[]), Value::Boolean(true));
    assert_eq!(eval_ok("def f(): return not 0", &[]), Value::Boolean(true));
}
