//! `qakc FILE` — tokenizes and parses a single Qak source file, printing
//! diagnostics to stderr if it finds any.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as ClapParser;
use qak::Compiler;
use tracing_subscriber::EnvFilter;

#[derive(Debug, ClapParser)]
#[command(name = "qakc", about = "Tokenizer and parser front end for the Qak language")]
struct Args {
    /// Path to the Qak source file to compile.
    file: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    let compiler = Compiler::new();

    let module = match compiler.compile_file(&args.file) {
        Ok(module) => module,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(1);
        }
    };

    if module.errors().is_empty() {
        ExitCode::SUCCESS
    } else {
        eprint!("{}", module.render_errors());
        ExitCode::from(2)
    }
}
