//! sift - generate an explicit-state model checker in C.
//!
//! Pipeline: read source → parse → resolve → validate → reindex → emit.
//! All diagnostics render as `<file>:<line>:<col>: <message>` on stderr;
//! the process exits 0 on successful emission and 1 on any failure.

mod cli;

use clap::Parser;
use cli::{Cli, OnOff, SymmetryArg};
use sift_diagnostic::SourceMap;
use sift_ir::{Ast, StringInterner};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(rendered) => {
            eprintln!("{rendered}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<(), String> {
    let (source, input_name) = read_input(cli.input.as_deref())
        .map_err(|e| format!("{}: {e}", display_input(cli.input.as_deref())))?;
    let source_map = SourceMap::new(&input_name, &source);

    if cli.symmetry_reduction != SymmetryArg::Off {
        warn!("symmetry reduction is not implemented; scalarsets check as plain ranges");
    }
    if cli.smt_simplification == OnOff::On {
        warn!("no SMT solver is configured; emitting without simplification");
    }

    let mut interner = StringInterner::new();
    let mut ast = Ast::new(&mut interner);

    let mut model = sift_parse::parse(&source, &mut ast, &mut interner)
        .map_err(|d| source_map.render(&d))?;
    sift_check::analyze(&mut ast, &mut model, &interner).map_err(|d| source_map.render(&d))?;
    debug!(
        state_size_bits = model.state_size_bits,
        rules = model.rules.len(),
        "model analyzed"
    );

    let output = output_path(cli);
    let options = cli.codegen_options();
    sift_codegen::output_checker(&output, &ast, &model, &interner, &options)
        .map_err(|d| source_map.render(&d))?;

    if !cli.quiet {
        eprintln!(
            "wrote {} ({} bits of state, {} threads)",
            output.display(),
            model.state_size_bits,
            options.threads
        );
    }
    Ok(())
}

fn display_input(input: Option<&std::path::Path>) -> String {
    match input {
        Some(path) => path.display().to_string(),
        None => "<stdin>".to_owned(),
    }
}

fn read_input(input: Option<&std::path::Path>) -> std::io::Result<(String, String)> {
    match input {
        Some(path) => Ok((
            std::fs::read_to_string(path)?,
            path.display().to_string(),
        )),
        None => {
            let mut source = String::new();
            std::io::stdin().read_to_string(&mut source)?;
            Ok((source, "<stdin>".to_owned()))
        }
    }
}

fn output_path(cli: &Cli) -> PathBuf {
    if let Some(output) = &cli.output {
        return output.clone();
    }
    match &cli.input {
        Some(input) => input.with_extension("c"),
        None => PathBuf::from("model.c"),
    }
}
