use pretty_assertions::assert_eq;

use crate::ast::{BinOp, Expr, Stmt};

use super::parse_function;

#[test]
fn inline_body() {
    let f = parse_function("def f(): return 1").unwrap();
    assert_eq!(f.name, "f");
    assert!(f.params.is_empty());
    assert_eq!(
        f.body,
        vec![Stmt::Return {
            value: Some(Expr::Int(1))
        }]
    );
}

#[test]
fn indented_body_and_params() {
    let f = parse_function("def add(a, b):\n    return a + b\n").unwrap();
    assert_eq!(f.name, "add");
    assert_eq!(f.params, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(
        f.body,
        vec![Stmt::Return {
            value: Some(Expr::Binary {
                op: BinOp::Add,
                left: Box::new(Expr::Identifier("a".into())),
                right: Box::new(Expr::Identifier("b".into())),
            })
        }]
    );
}

#[test]
fn comments_and_blank_lines_are_dropped() {
    let src = "def f():\n\n    # setup\n    x = 1  # trailing\n    return x\n";
    let f = parse_function(src).unwrap();
    assert_eq!(f.body.len(), 2);
    assert!(matches!(&f.body[0], Stmt::Assign { name, .. } if name == "x"));
}

#[test]
fn hash_inside_string_is_not_a_comment() {
    let f = parse_function("def f(): return \"a#b\"").unwrap();
    assert_eq!(
        f.body,
        vec![Stmt::Return {
            value: Some(Expr::Str("a#b".into()))
        }]
    );
}

#[test]
fn if_elif_else_chain() {
    let src = "def sign(x):\n    if x > 0:\n        return 1\n    elif x < 0:\n        return -1\n    else:\n        return 0\n";
    let f = parse_function(src).unwrap();
    match &f.body[0] {
        Stmt::If { arms, otherwise } => {
            assert_eq!(arms.len(), 2);
            assert_eq!(
                otherwise,
                &vec![Stmt::Return {
                    value: Some(Expr::Int(0))
                }]
            );
        }
        other => panic!("expected if statement, got {other:?}"),
    }
}

#[test]
fn while_loop() {
    let src = "def count(n):\n    i = 0\n    while i < n:\n        i = i + 1\n    return i\n";
    let f = parse_function(src).unwrap();
    assert_eq!(f.body.len(), 3);
    assert!(matches!(&f.body[1], Stmt::While { .. }));
}

#[test]
fn operator_precedence() {
    let f = parse_function("def f(): return 1 + 2 * 3").unwrap();
    match &f.body[0] {
        Stmt::Return { value: Some(expr) } => match expr {
            Expr::Binary { op, right, .. } => {
                assert_eq!(*op, BinOp::Add);
                assert!(matches!(
                    right.as_ref(),
                    Expr::Binary { op: BinOp::Mul, .. }
                ));
            }
            other => panic!("expected binary expression, got {other:?}"),
        },
        other => panic!("expected return, got {other:?}"),
    }
}

#[test]
fn power_is_right_of_unary() {
    let f = parse_function("def f(x): return x ** 0.5").unwrap();
    match &f.body[0] {
        Stmt::Return { value: Some(expr) } => {
            assert!(matches!(expr, Expr::Binary { op: BinOp::Pow, .. }));
        }
        other => panic!("expected return, got {other:?}"),
    }
}

#[test]
fn call_with_arguments() {
    let f = parse_function("def f(): return g(1, 2 + 3)").unwrap();
    match &f.body[0] {
        Stmt::Return {
            value: Some(Expr::Call { name, args }),
        } => {
            assert_eq!(name, "g");
            assert_eq!(args.len(), 2);
        }
        other => panic!("expected call, got {other:?}"),
    }
}

#[test]
fn bad_headers_are_rejected() {
    assert!(parse_function("").is_err());
    assert!(parse_function("x = 1").is_err());
    assert!(parse_function("def f)").is_err());
    assert!(parse_function("def f()").is_err());
    assert!(parse_function("def 1f(): pass").is_err());
    assert!(parse_function("def f(1x): pass").is_err());
}

#[test]
fn missing_block_is_rejected() {
    let err = parse_function("def f():\n").unwrap_err();
    assert!(err.message.contains("indented block"));
}

#[test]
fn inconsistent_indent_is_rejected() {
    let err = parse_function("def f():\n    x = 1\n      y = 2\n").unwrap_err();
    assert_eq!(err.line, 3);
}

#[test]
fn trailing_function_is_rejected() {
    let src = "def f():\n    return 1\ndef g():\n    return 2\n";
    let err = parse_function(src).unwrap_err();
    assert!(err.message.contains("after function body"));
}

#[test]
fn dangling_expression_is_rejected() {
    let err = parse_function("def f():\n    x = 1 +\n").unwrap_err();
    assert_eq!(err.line, 2);
    assert!(err.message.contains("unexpected end of expression"));

    let err = parse_function("def f(): x =").unwrap_err();
    assert!(err.message.contains("unexpected end of expression"));
}

#[test]
fn unterminated_string() {
    assert!(parse_function("def f(): return \"oops").is_err());
}

#[test]
fn error_carries_line_number() {
    let err = parse_function("def f():\n    x = $\n").unwrap_err();
    assert_eq!(err.line, 2);
}
