//! symcheck: check a binary's symbol table against user-defined rules.
//!
//! Thin driver over `symcheck-core`: parse arguments, load rules, resolve
//! the target's symbol table, evaluate, map the verdict to an exit code.

use std::path::{Path, PathBuf};
use std::{env, io, process};

use clap::Parser;
use symcheck_core::{evaluate_rules, load_rules, resolve, CheckError, EvalContext, Result};
use symcheck_utils::{info, init_logging};

/// Exit code for fatal setup errors (missing files, unresolvable
/// libraries, unsupported architecture). Rule violations exit with 1.
const EXIT_FATAL: i32 = 255;

/// Library directories consulted after the working directory and any
/// `--libpath` entries.
const DEFAULT_LIB_DIRS: &[&str] = &["/lib", "/lib64", "/usr/lib", "/usr/lib64", "/usr/local/lib"];

/// Eval symbols of a binary against given rules
#[derive(Parser, Debug)]
#[command(name = "symcheck")]
#[command(version)]
#[command(about = "Eval symbols of a binary against given rules", long_about = None)]
struct Cli
{
    /// Path to a rule file
    rules: PathBuf,
    /// File to parse
    file: String,
    /// ":" separated path to lookup libraries
    #[arg(long, default_value = "")]
    libpath: String,
}

fn main()
{
    // Initialize logging (reads from RUST_LOG env var)
    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {e}");
        process::exit(EXIT_FATAL);
    }

    let cli = Cli::parse();

    match run(&cli) {
        Ok(true) => process::exit(0),
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("{e}");
            process::exit(EXIT_FATAL);
        }
    }
}

fn run(cli: &Cli) -> Result<bool>
{
    if !Path::new(&cli.file).is_file() {
        return Err(CheckError::TargetNotFound(cli.file.clone()));
    }

    let rules = load_rules(&cli.rules)?;
    let roots = search_roots(&cli.libpath);

    info!(file = %cli.file, rules = rules.len(), "checking symbols");
    let table = resolve(&cli.file, &roots)?;

    let ctx = EvalContext {
        table: &table,
        file_under_test: &cli.file,
    };
    let mut diagnostics = io::stderr().lock();
    evaluate_rules(&ctx, &rules, &mut diagnostics)
}

/// Assemble the library search roots: working directory first, then the
/// `--libpath` entries in order, then the platform library directories.
fn search_roots(libpath: &str) -> Vec<PathBuf>
{
    let mut roots = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        roots.push(cwd);
    }
    roots.extend(libpath.split(':').filter(|entry| !entry.is_empty()).map(PathBuf::from));
    roots.extend(DEFAULT_LIB_DIRS.iter().map(PathBuf::from));
    roots
}
