//! `include` reads and evaluates a file exactly once per process, guarded by
//! a synthesized `<name>_included` global (see `src/builtin/include.rs`).
//! Grounded in the `TempDir`-per-test style used by
//! `Brahmastra-Labs-logicaffeine`'s test suite.

use std::fs;

use tempfile::tempdir;
use theory_lisp::runtime::eval::global_env;
use theory_lisp::runtime::Value;
use theory_lisp::{Expr, Parser, Scanner};

fn run(source: &str) -> Value {
    let tokens = Scanner::new(source).scan_tokens().expect("scan failed");
    let program = Parser::new(tokens).parse_program().expect("parse failed");
    let env = global_env();
    let mut last = Value::Void;
    for expr in &program {
        last = Expr::interpret(expr, &env);
    }
    last
}

#[test]
fn second_include_of_the_same_file_is_a_no_op() {
    let dir = tempdir().expect("create tempdir");
    let lib_path = dir.path().join("counter_lib.tl");
    fs::write(
        &lib_path,
        r#"(define counter (+ 1 (if (defined? "counter") counter 0)))"#,
    )
    .expect("write lib file");

    let path_str = lib_path.to_str().expect("path is valid utf-8");
    let source = format!(r#"(include "{path_str}") (include "{path_str}") counter"#);

    let result = run(&source);
    assert!(
        result.equals(&Value::Integer(1)),
        "expected counter to have been incremented exactly once, got {result:?}"
    );
}

#[test]
fn including_a_missing_file_is_an_error() {
    let dir = tempdir().expect("create tempdir");
    let missing = dir.path().join("does_not_exist.tl");
    let path_str = missing.to_str().expect("path is valid utf-8");
    let source = format!(r#"(include "{path_str}")"#);

    let result = run(&source);
    assert!(matches!(result, Value::Error(_)));
}

#[test]
fn two_different_files_are_each_included_independently() {
    let dir = tempdir().expect("create tempdir");
    let a_path = dir.path().join("a.tl");
    let b_path = dir.path().join("b.tl");
    fs::write(&a_path, r#"(define a-value 1)"#).expect("write a.tl");
    fs::write(&b_path, r#"(define b-value 2)"#).expect("write b.tl");

    let a_str = a_path.to_str().expect("utf-8 path");
    let b_str = b_path.to_str().expect("utf-8 path");
    let source = format!(r#"(include "{a_str}") (include "{b_str}") (+ a-value b-value)"#);

    let result = run(&source);
    assert!(result.equals(&Value::Integer(3)));
}
