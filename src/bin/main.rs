//! `theory-lisp` binary: thin wrapper around [`theory_lisp::cli`].

use std::process::ExitCode;

use theory_lisp::cli;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match cli::parse_args(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("usage: theory-lisp [-v] [-q] [-x] <file>");
            eprintln!("error: {message}");
            return ExitCode::from(1);
        }
    };

    ExitCode::from(cli::run(options) as u8)
}
