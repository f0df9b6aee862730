//! Slorp CLI
//!
//! With no arguments, runs a line-buffered REPL; with one argument, reads
//! and interprets that file. Exit codes follow the embedding contract
//! exactly, so argument parsing is hand-rolled rather than built on
//! `clap` (a derived `Cli` would claim exit code 2 for its own usage
//! errors, colliding with the 64 this CLI is required to use instead).

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::ExitCode;

use slorp_runtime::{InterpretResult, Vm, VmConfig};

const EXIT_OK: u8 = 0;
const EXIT_COMPILE_ERROR: u8 = 65;
const EXIT_RUNTIME_ERROR: u8 = 70;
const EXIT_USAGE: u8 = 64;
const EXIT_IO_ERROR: u8 = 74;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = load_config();

    let code = match args.as_slice() {
        [] => run_repl(config),
        [path] => run_file(path, config),
        _ => {
            eprintln!("Usage: slorp [path]");
            EXIT_USAGE
        }
    };
    ExitCode::from(code)
}

/// Look for `slorp.toml` in the current directory; silently fall back to
/// defaults if it's absent, and warn (not fail) if it exists but is
/// malformed, since a bad config file should never block running a
/// script.
fn load_config() -> VmConfig {
    match fs::read_to_string("slorp.toml") {
        Ok(text) => match VmConfig::from_toml_str(&text) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(%err, "ignoring malformed slorp.toml");
                VmConfig::default()
            }
        },
        Err(_) => VmConfig::default(),
    }
}

fn run_file(path: &str, config: VmConfig) -> u8 {
    let source = match fs::read_to_string(Path::new(path)) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Could not open file \"{path}\": {err}");
            return EXIT_IO_ERROR;
        }
    };

    let mut vm = Vm::with_config(config);
    match vm.interpret(&source) {
        InterpretResult::Ok => EXIT_OK,
        InterpretResult::CompileError => EXIT_COMPILE_ERROR,
        InterpretResult::RuntimeError => EXIT_RUNTIME_ERROR,
    }
}

fn run_repl(config: VmConfig) -> u8 {
    let mut vm = Vm::with_config(config);
    let stdin = io::stdin();
    let mut last = InterpretResult::Ok;

    print!("> ");
    io::stdout().flush().ok();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(_) => break,
        };
        last = vm.interpret(&line);
        print!("> ");
        io::stdout().flush().ok();
    }
    println!();

    match last {
        InterpretResult::Ok => EXIT_OK,
        InterpretResult::CompileError => EXIT_COMPILE_ERROR,
        InterpretResult::RuntimeError => EXIT_RUNTIME_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn run_file_reports_ok_for_a_valid_script() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "print 1 + 2;").unwrap();
        let code = run_file(file.path().to_str().unwrap(), VmConfig::default());
        assert_eq!(code, EXIT_OK);
    }

    #[test]
    fn run_file_reports_65_for_a_compile_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "dat = 1;").unwrap();
        let code = run_file(file.path().to_str().unwrap(), VmConfig::default());
        assert_eq!(code, EXIT_COMPILE_ERROR);
    }

    #[test]
    fn run_file_reports_70_for_a_runtime_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "print undefined_name;").unwrap();
        let code = run_file(file.path().to_str().unwrap(), VmConfig::default());
        assert_eq!(code, EXIT_RUNTIME_ERROR);
    }

    #[test]
    fn run_file_reports_74_for_a_missing_file() {
        let code = run_file("/nonexistent/path/does/not/exist.slorp", VmConfig::default());
        assert_eq!(code, EXIT_IO_ERROR);
    }

    #[test]
    fn load_config_falls_back_to_defaults_without_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir.path()).unwrap();
        let config = load_config();
        std::env::set_current_dir(original).unwrap();
        assert_eq!(config.stack_size, VmConfig::default().stack_size);
    }
}
