//! Property-based tests covering the numeric promotion lattice, cons-pair
//! termination, and scan/parse robustness against arbitrary input, the way
//! `proptest_fuzz_tests.rs`-style suites do elsewhere in the Lisp-on-Rust
//! world.

use proptest::prelude::*;
use theory_lisp::runtime::eval::global_env;
use theory_lisp::runtime::Value;
use theory_lisp::{Expr, Parser, Scanner};

fn run(source: &str) -> Option<Value> {
    let tokens = Scanner::new(source).scan_tokens().ok()?;
    let program = Parser::new(tokens).parse_program().ok()?;
    let env = global_env();
    let mut last = Value::Void;
    for expr in &program {
        last = Expr::interpret(expr, &env);
    }
    Some(last)
}

fn arbitrary_source_string() -> impl Strategy<Value = String> {
    prop::string::string_regex(r"[\x00-\x7F]{0,300}").unwrap()
}

fn lisp_like_token() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("(".to_string()),
        Just(")".to_string()),
        Just("{".to_string()),
        Just("}".to_string()),
        Just("[".to_string()),
        Just("]".to_string()),
        Just("define".to_string()),
        Just("lambda".to_string()),
        Just("let".to_string()),
        Just("if".to_string()),
        Just("cond".to_string()),
        Just("set!".to_string()),
        Just("try".to_string()),
        Just("catch".to_string()),
        Just("automaton".to_string()),
        Just("null".to_string()),
        Just("#t".to_string()),
        Just("#f".to_string()),
        Just("+".to_string()),
        Just("-".to_string()),
        Just("*".to_string()),
        Just("/".to_string()),
        Just("=".to_string()),
        Just("<".to_string()),
        Just(">".to_string()),
        Just("$1".to_string()),
        Just(".".to_string()),
        (-1000i64..1000i64).prop_map(|n| n.to_string()),
        (0.0f64..100.0f64).prop_map(|f| format!("{:.3}", f)),
        r#""[a-zA-Z0-9 ]{0,20}""#.prop_map(|s| s),
        "[a-z][a-z0-9_?!]{0,8}".prop_map(|s| s),
    ]
}

fn lisp_like_source() -> impl Strategy<Value = String> {
    prop::collection::vec(lisp_like_token(), 0..60).prop_map(|tokens| tokens.join(" "))
}

fn arith_program() -> impl Strategy<Value = String> {
    let op = prop_oneof![Just("+"), Just("-"), Just("*")];
    let nums = prop::collection::vec(-1000i64..1000i64, 2..6);
    (op, nums).prop_map(|(op, nums)| {
        let args: Vec<String> = nums.iter().map(|n| n.to_string()).collect();
        format!("({} {})", op, args.join(" "))
    })
}

proptest! {
    #[test]
    fn scanner_never_panics(source in arbitrary_source_string()) {
        let _ = Scanner::new(&source).scan_tokens();
    }

    #[test]
    fn scanner_never_panics_on_lisp_like_input(source in lisp_like_source()) {
        let _ = Scanner::new(&source).scan_tokens();
    }

    #[test]
    fn parser_never_panics_on_lisp_like_input(source in lisp_like_source()) {
        if let Ok(tokens) = Scanner::new(&source).scan_tokens() {
            let _ = Parser::new(tokens).parse_program();
        }
    }

    #[test]
    fn parser_handles_unbalanced_parens_without_panic(opens in 0usize..40, closes in 0usize..40) {
        let source = format!("{}1{}", "(".repeat(opens), ")".repeat(closes));
        if let Ok(tokens) = Scanner::new(&source).scan_tokens() {
            let _ = Parser::new(tokens).parse_program();
        }
    }

    #[test]
    fn interpreting_a_valid_arithmetic_program_never_panics(source in arith_program()) {
        let _ = run(&source);
    }

    #[test]
    fn arithmetic_is_deterministic_across_runs(source in arith_program()) {
        let first = run(&source);
        let second = run(&source);
        match (first, second) {
            (Some(a), Some(b)) => prop_assert!(a.equals(&b)),
            (None, None) => {}
            _ => prop_assert!(false, "same source produced divergent scan/parse outcomes"),
        }
    }

    /// The numeric lattice treats Integer, Rational, and Real as equal
    /// whenever they denote the same mathematical value (`Value::equals`
    /// compares via `as_f64` whenever both sides are numeric).
    #[test]
    fn integer_rational_and_real_of_the_same_value_are_equal(n in -1_000_000i64..1_000_000i64) {
        let as_int = Value::Integer(n);
        let as_real = Value::Real(n as f64);
        let as_rational = Value::rational(n, 1);
        prop_assert!(as_int.equals(&as_real));
        prop_assert!(as_int.equals(&as_rational));
        prop_assert!(as_real.equals(&as_rational));
    }

    /// Addition under promotion never panics and stays within the lattice:
    /// integer + integer stays exact, anything touching a Real becomes Real.
    #[test]
    fn integer_addition_is_commutative(a in -100_000i64..100_000i64, b in -100_000i64..100_000i64) {
        let lhs = Value::Integer(a).add(&Value::Integer(b));
        let rhs = Value::Integer(b).add(&Value::Integer(a));
        prop_assert!(lhs.equals(&rhs));
    }

    /// A proper cons list's display form terminates and lists every element
    /// in order, regardless of length or element shape.
    #[test]
    fn proper_list_display_terminates_and_preserves_length(elements in prop::collection::vec(-500i64..500, 0..200)) {
        let values: Vec<Value> = elements.iter().map(|n| Value::Integer(*n)).collect();
        let list = Value::list(values.clone());
        let displayed = list.to_display_string();
        let expected_tokens = elements.len();
        let actual_tokens = if expected_tokens == 0 {
            0
        } else {
            displayed.trim_matches(|c| c == '(' || c == ')').split_whitespace().count()
        };
        prop_assert_eq!(actual_tokens, expected_tokens);
        let round_tripped = list.to_vec().expect("proper list must round-trip to a Vec");
        prop_assert_eq!(round_tripped.len(), elements.len());
        for (original, got) in elements.iter().zip(round_tripped.iter()) {
            prop_assert!(Value::Integer(*original).equals(got));
        }
    }
}
