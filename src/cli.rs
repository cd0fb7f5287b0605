//! Command-line entry point: `prog [-v] [-q] [-x] <file>`, REPL fallback
//! when no file is given. Hand-rolled argument parsing, matching the
//! example binaries `run_file.rs` and `simple_repl.rs` — no
//! argument-parsing dependency is pulled in for three boolean flags and an
//! optional path.

use std::io::{self, BufRead, Write};

use tracing::{debug, error, info, warn};

use crate::lexer::Scanner;
use crate::parser::{Expr, Parser};
use crate::runtime::eval::global_env;
use crate::runtime::{Env, Value};

/// Parsed command-line flags.
#[derive(Debug, Default)]
pub struct Options {
    /// `-v`: print each top-level expression's source and its value.
    pub verbose: bool,
    /// `-q`: suppress per-expression result printing.
    pub quiet: bool,
    /// `-x`: exit after evaluating the file instead of entering a REPL.
    pub exit_after_file: bool,
    /// The script to run, if any.
    pub file: Option<String>,
}

/// Parses `argv[1..]`. Returns a usage-error message on an unrecognized
/// flag or more than one positional argument; the caller treats this as
/// exit code 1.
pub fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut options = Options::default();
    for arg in args {
        match arg.as_str() {
            "-v" => options.verbose = true,
            "-q" => options.quiet = true,
            "-x" => options.exit_after_file = true,
            other if other.starts_with('-') => {
                return Err(format!("unrecognized flag '{other}'"));
            }
            other => {
                if options.file.is_some() {
                    return Err(format!("unexpected extra argument '{other}'"));
                }
                options.file = Some(other.to_string());
            }
        }
    }
    Ok(options)
}

/// Runs the interpreter per the parsed options and returns the process exit
/// code: 0 on success, 2 if the file could not be read.
pub fn run(options: Options) -> i32 {
    let env = global_env();

    if let Some(path) = &options.file {
        let source = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                error!(file = %path, error = %e, "could not read file");
                return 2;
            }
        };
        info!(file = %path, "evaluating file");
        run_source(&source, &env, &options);
        if options.exit_after_file {
            return 0;
        }
    }

    repl(&env, &options);
    0
}

/// Scans, parses, and interprets one chunk of source text, printing
/// per-expression output as directed by `options`. Parse/scan failures are
/// reported to stderr with line/column and the remaining expressions (if
/// any were already parsed) are simply not produced — the top-level driver
/// skips interpretation entirely on a parse error.
fn run_source(source: &str, env: &Env, options: &Options) {
    let tokens = match Scanner::new(source).scan_tokens() {
        Ok(tokens) => tokens,
        Err(e) => {
            eprintln!("{e}");
            return;
        }
    };
    let program = match Parser::new(tokens).parse_program() {
        Ok(program) => program,
        Err(e) => {
            eprintln!("{e}");
            return;
        }
    };
    for expr in &program {
        if options.verbose {
            println!("{}", Expr::to_string(expr));
        }
        let value = Expr::interpret(expr, env);
        print_result(&value, options);
    }
}

fn print_result(value: &Value, options: &Options) {
    if options.quiet {
        return;
    }
    match value {
        Value::Void => {}
        Value::Error(message) => {
            warn!(%message, "top-level expression produced an error");
            eprintln!("Error: {message}");
        }
        other => println!("{other}"),
    }
}

/// Reads one line at a time from stdin, evaluating each as a complete
/// top-level expression, until EOF.
fn repl(env: &Env, options: &Options) {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        if io::stdout().flush().is_err() {
            break;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                error!(error = %e, "failed to read from stdin");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        debug!(%line, "repl: evaluating line");
        run_source(&line, env, options);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags_in_any_order() {
        let args: Vec<String> = vec!["-x", "file.tl", "-v"]
            .into_iter()
            .map(String::from)
            .collect();
        let options = parse_args(&args).unwrap();
        assert!(options.exit_after_file);
        assert!(options.verbose);
        assert!(!options.quiet);
        assert_eq!(options.file.as_deref(), Some("file.tl"));
    }

    #[test]
    fn rejects_unknown_flag() {
        let args: Vec<String> = vec!["--bogus".to_string()];
        assert!(parse_args(&args).is_err());
    }

    #[test]
    fn rejects_a_second_positional_argument() {
        let args: Vec<String> = vec!["a.tl".to_string(), "b.tl".to_string()];
        assert!(parse_args(&args).is_err());
    }

    #[test]
    fn no_file_is_a_valid_repl_only_configuration() {
        let options = parse_args(&[]).unwrap();
        assert!(options.file.is_none());
    }
}
